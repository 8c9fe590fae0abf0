use serde::{Deserialize, Serialize};

use crate::models::SwapRecord;

/// `GET /token/{net}/{mint}/price` response. Only `usdPrice` is used.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTokenPrice {
    #[serde(default)]
    pub usd_price: serde_json::Value,
}

impl ApiTokenPrice {
    /// The provider sends `usdPrice` as a string, sometimes as a number.
    /// A missing, null or unparseable value in a successful response reads
    /// as 0.
    pub fn usd(&self) -> f64 {
        match &self.usd_price {
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            serde_json::Value::Number(n) => n.as_f64(),
            _ => None,
        }
        .filter(|p| p.is_finite())
        .unwrap_or(0.0)
    }
}

/// `GET /account/{net}/{address}/swaps` response page.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSwapPage {
    #[serde(default)]
    pub result: Vec<SwapRecord>,
}

/// CoinGecko `simple/price` body for `ids=solana&vs_currencies=usd`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSimplePrice {
    pub solana: ApiUsdQuote,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUsdQuote {
    pub usd: f64,
}

// ---------------------------------------------------------------------------
// Gemini generateContent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it produced any.
    pub fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
