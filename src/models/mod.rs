pub mod portfolio;
pub mod swap;

pub use portfolio::{NativeBalance, NftHolding, PortfolioResult, PortfolioSnapshot, TokenHolding};
pub use swap::{SwapKind, SwapRecord, SwapToken};

use std::fmt;

// ---------------------------------------------------------------------------
// WalletAddress: the sole query key
// ---------------------------------------------------------------------------

/// Solana wallet address. Only checked for non-emptiness; the provider
/// rejects malformed addresses itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `AbCdEf...wXyZ` form used in log lines.
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() > 10 {
            let head: String = chars[..6].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}...{tail}")
        } else {
            self.0.clone()
        }
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
