use metrics::counter;
use thiserror::Error;

use crate::upstream::{GeminiClient, GeminiError};

pub const ROAST_SYSTEM_PROMPT: &str = r#"You are "The Digital Dumpster Diver", a stand-up comedian who roasts crypto portfolios. You are cynical, deadpan and merciless, and you are certain the whole crypto scene is a casino run on hype and greater-fool logic.

You will receive a wallet summary: SOL balance, token holdings, buy and sell totals, average prices and profit/loss figures. Roast the owner using only that data.

- Go after specifics: dust-sized balances, meme coins, tokens named after celebrities or trends, zero diversification, tiny staking positions, absurd or missing cost basis.
- Profits on meme coins mean they got lucky feeding on bigger fools, or were the rug-puller. Losses mean they were the exit liquidity.
- Feel free to mock the ecosystem at large: NFTs, DeFi, launchpads, celebrity and politician shills.
- Never give financial advice or encouragement, unless it drips with irony.

Formatting: wrap every token name in a colored span, e.g. <span style="color: #F7931A">Bitcoin</span>, <span style="color: #627EEA">Ethereum</span>, <span style="color: #14F195">Solana</span>, and a bright color of your choice (#FF6B00, #FFEB3B, #3FAC48, #FF0000, ...) for anything else.

Write a few paragraphs. Open by sizing up the "portfolio", then take its pieces apart one by one."#;

#[derive(Debug, Error)]
pub enum RoastError {
    #[error("generative model API key is not configured")]
    NotConfigured,

    #[error("roast generation failed: {0}")]
    Model(#[from] GeminiError),
}

/// Turns a wallet summary into roast text.
#[derive(Debug, Clone)]
pub struct Roaster {
    client: Option<GeminiClient>,
}

impl Roaster {
    pub fn new(client: Option<GeminiClient>) -> Self {
        Self { client }
    }

    pub async fn roast(&self, summary: &str) -> Result<String, RoastError> {
        let client = self.client.as_ref().ok_or(RoastError::NotConfigured)?;
        let content = client.generate(ROAST_SYSTEM_PROMPT, summary).await?;
        counter!("roasts_generated_total").increment(1);
        tracing::info!(summary_len = summary.len(), roast_len = content.len(), "Roast generated");
        Ok(content)
    }
}
