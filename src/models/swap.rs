use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapKind {
    Buy,
    Sell,
    #[serde(other)]
    Other,
}

impl fmt::Display for SwapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapKind::Buy => write!(f, "buy"),
            SwapKind::Sell => write!(f, "sell"),
            SwapKind::Other => write!(f, "other"),
        }
    }
}

/// One leg of a swap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapToken {
    pub address: String,
    /// Token amount as a decimal string.
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub usd_amount: f64,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRecord {
    pub transaction_hash: String,
    pub transaction_type: SwapKind,
    #[serde(default)]
    pub block_timestamp: String,
    pub bought: SwapToken,
    pub sold: SwapToken,
    #[serde(default)]
    pub total_value_usd: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SwapRecord {
    pub fn is_buy_of(&self, mint: &str) -> bool {
        self.bought.address == mint
    }

    pub fn is_sell_of(&self, mint: &str) -> bool {
        self.sold.address == mint
    }
}
