pub mod coingecko;
pub mod gemini;
pub mod moralis;
pub mod types;

pub use coingecko::{CoinGeckoClient, CoinGeckoError};
pub use gemini::{GeminiClient, GeminiError};
pub use moralis::{MoralisClient, MoralisError};
