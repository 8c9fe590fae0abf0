pub mod health;
pub mod metrics;
pub mod price;
pub mod roast;
pub mod wallet;
