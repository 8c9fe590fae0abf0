use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::SwapRecord;

/// Weighted-average-cost PnL for one token.
///
/// Invariant: `total == realized + unrealized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitCalculation {
    #[serde(with = "rust_decimal::serde::float")]
    pub realized: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub unrealized: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(rename = "totalBoughtUSD", with = "rust_decimal::serde::float")]
    pub total_bought_usd: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_buy_price: Decimal,
    #[serde(rename = "totalSoldUSD", with = "rust_decimal::serde::float")]
    pub total_sold_usd: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_sell_price: Decimal,
}

impl ProfitCalculation {
    /// Presentation form: USD amounts to cents. Average prices keep full
    /// precision since sub-cent token prices are common.
    pub fn rounded(&self) -> Self {
        let realized = self.realized.round_dp(2);
        let unrealized = self.unrealized.round_dp(2);
        Self {
            realized,
            unrealized,
            total: realized.saturating_add(unrealized),
            total_bought_usd: self.total_bought_usd.round_dp(2),
            average_buy_price: self.average_buy_price.normalize(),
            total_sold_usd: self.total_sold_usd.round_dp(2),
            average_sell_price: self.average_sell_price.normalize(),
        }
    }
}

/// Compute realized and unrealized PnL for `mint` from the wallet's full swap
/// history. `current_price` of `None` is valued at zero.
///
/// Sells without any recorded buy (airdrops, transfers in) produce zero
/// realized PnL. Arithmetic saturates at the `Decimal` bounds, so spam
/// tokens with absurd amounts or prices cannot abort a report.
pub fn calculate_token_profits(mint: &str, swaps: &[SwapRecord], current_price: Option<f64>) -> ProfitCalculation {
    let mut bought_amount = Decimal::ZERO;
    let mut total_cost = Decimal::ZERO;
    let mut sold_amount = Decimal::ZERO;
    let mut total_proceeds = Decimal::ZERO;

    for swap in swaps {
        if swap.is_buy_of(mint) {
            bought_amount = bought_amount.saturating_add(parse_amount(&swap.bought.amount));
            total_cost = total_cost.saturating_add(usd(swap.bought.usd_amount));
        }
        if swap.is_sell_of(mint) {
            sold_amount = sold_amount.saturating_add(parse_amount(&swap.sold.amount));
            total_proceeds = total_proceeds.saturating_add(usd(swap.sold.usd_amount));
        }
    }

    let price = current_price.map(usd).unwrap_or(Decimal::ZERO);

    let average_buy_price = ratio(total_cost, bought_amount);
    let average_sell_price = ratio(total_proceeds, sold_amount);

    let (realized, unrealized) = if bought_amount > Decimal::ZERO {
        let remaining = bought_amount.saturating_sub(sold_amount);
        let cost_of_sold = total_cost.saturating_mul(ratio(sold_amount, bought_amount));
        let cost_of_remaining = total_cost.saturating_mul(ratio(remaining, bought_amount));
        (
            total_proceeds.saturating_sub(cost_of_sold),
            remaining.saturating_mul(price).saturating_sub(cost_of_remaining),
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    ProfitCalculation {
        realized,
        unrealized,
        total: realized.saturating_add(unrealized),
        total_bought_usd: total_cost,
        average_buy_price,
        total_sold_usd: total_proceeds,
        average_sell_price,
    }
}

/// `numerator / denominator`, zero for a non-positive denominator and
/// clamped to the `Decimal` range on overflow.
fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(if numerator.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

/// Parse a provider decimal string ("12.5", "1e-7"). Garbage counts as zero.
pub fn parse_amount(raw: &str) -> Decimal {
    let raw = raw.trim();
    if raw.is_empty() {
        return Decimal::ZERO;
    }
    match Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw)) {
        Ok(v) => v,
        Err(_) => {
            tracing::debug!(raw, "Unparseable token amount, treating as zero");
            Decimal::ZERO
        }
    }
}

fn usd(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}
