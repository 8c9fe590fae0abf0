use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::SwapRecord;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NativeBalance {
    /// SOL amount as a decimal string, e.g. "1.5".
    #[serde(default)]
    pub solana: String,
    #[serde(default)]
    pub lamports: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolding {
    pub mint: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub decimals: String,
    /// USD price at fetch time. `None` means the lookup failed, which is
    /// not the same as a token worth nothing.
    #[serde(default)]
    pub current_price: Option<f64>,
    /// Provider fields we don't interpret (logo, associatedTokenAddress, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftHolding {
    pub mint: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Base portfolio as returned by the provider for one wallet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    #[serde(default)]
    pub native_balance: NativeBalance,
    #[serde(default)]
    pub tokens: Vec<TokenHolding>,
    #[serde(default)]
    pub nfts: Vec<NftHolding>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Merged wallet view returned by `GET /wallet`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResult {
    #[serde(default)]
    pub native_balance: NativeBalance,
    #[serde(default)]
    pub tokens: Vec<TokenHolding>,
    #[serde(default)]
    pub nfts: Vec<NftHolding>,
    #[serde(default)]
    pub swaps: Vec<SwapRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PortfolioResult {
    pub fn merge(snapshot: PortfolioSnapshot, tokens: Vec<TokenHolding>, swaps: Vec<SwapRecord>) -> Self {
        Self {
            native_balance: snapshot.native_balance,
            tokens,
            nfts: snapshot.nfts,
            swaps,
            extra: snapshot.extra,
        }
    }
}
