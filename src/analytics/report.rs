use std::collections::HashSet;
use std::fmt::Write as _;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::pnl::{calculate_token_profits, parse_amount, ProfitCalculation};
use crate::models::{PortfolioResult, SwapKind, SwapToken, TokenHolding, WalletAddress};

const UNKNOWN_NAME: &str = "Unknown";
const UNKNOWN_SYMBOL: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HoldingStatus {
    Held,
    Sold,
}

impl HoldingStatus {
    fn as_str(&self) -> &'static str {
        match self {
            HoldingStatus::Held => "Held",
            HoldingStatus::Sold => "Sold",
        }
    }
}

/// A token the wallet holds now or fully sold in the past.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenReport {
    pub name: String,
    pub symbol: String,
    pub address: String,
    pub status: HoldingStatus,
    pub amount: String,
    pub current_price: Option<f64>,
    pub profits: ProfitCalculation,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletReport {
    pub address: String,
    pub sol_balance: String,
    pub sol_price: Option<f64>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_value_usd: Decimal,
    pub tokens: Vec<TokenReport>,
    pub summary: String,
}

pub fn build_wallet_report(address: &WalletAddress, portfolio: &PortfolioResult, sol_price: Option<f64>) -> WalletReport {
    let tokens = combined_tokens(portfolio);
    let summary = wallet_summary(address, &portfolio.native_balance.solana, &tokens);

    WalletReport {
        address: address.to_string(),
        sol_balance: portfolio.native_balance.solana.clone(),
        sol_price,
        total_value_usd: total_portfolio_value(portfolio, sol_price),
        tokens,
        summary,
    }
}

/// Held tokens followed by tokens that only appear on the sold side of
/// `sell` swaps. Past tokens are listed once with a zero price.
pub fn combined_tokens(portfolio: &PortfolioResult) -> Vec<TokenReport> {
    let mut reports: Vec<TokenReport> = portfolio.tokens.iter().map(|t| held_report(t, portfolio)).collect();
    let mut seen: HashSet<&str> = portfolio.tokens.iter().map(|t| t.mint.as_str()).collect();

    for swap in portfolio.swaps.iter().filter(|s| s.transaction_type == SwapKind::Sell) {
        if seen.insert(swap.sold.address.as_str()) {
            reports.push(past_report(&swap.sold, portfolio));
        }
    }

    reports
}

/// Every token the wallet has ever touched: held tokens, then both legs of
/// every swap regardless of type, each listed once, ordered by `sort`.
pub fn all_tokens_ever(portfolio: &PortfolioResult, sort: TokenSort) -> Vec<TokenReport> {
    let mut reports: Vec<TokenReport> = portfolio.tokens.iter().map(|t| held_report(t, portfolio)).collect();
    let mut seen: HashSet<&str> = portfolio.tokens.iter().map(|t| t.mint.as_str()).collect();

    for swap in &portfolio.swaps {
        for leg in [&swap.bought, &swap.sold] {
            if !leg.address.is_empty() && seen.insert(leg.address.as_str()) {
                reports.push(past_report(leg, portfolio));
            }
        }
    }

    sort_tokens(&mut reports, sort);
    reports
}

fn held_report(token: &TokenHolding, portfolio: &PortfolioResult) -> TokenReport {
    TokenReport {
        name: or_default(&token.name, UNKNOWN_NAME),
        symbol: or_default(&token.symbol, UNKNOWN_SYMBOL),
        address: token.mint.clone(),
        status: HoldingStatus::Held,
        amount: or_default(&token.amount, "0"),
        current_price: token.current_price,
        profits: calculate_token_profits(&token.mint, &portfolio.swaps, token.current_price).rounded(),
    }
}

fn past_report(leg: &SwapToken, portfolio: &PortfolioResult) -> TokenReport {
    TokenReport {
        name: or_default(leg.name.as_deref().unwrap_or_default(), UNKNOWN_NAME),
        symbol: or_default(leg.symbol.as_deref().unwrap_or_default(), UNKNOWN_SYMBOL),
        address: leg.address.clone(),
        status: HoldingStatus::Sold,
        amount: "0".into(),
        current_price: Some(0.0),
        profits: calculate_token_profits(&leg.address, &portfolio.swaps, Some(0.0)).rounded(),
    }
}

fn or_default(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSortKey {
    #[default]
    Value,
    Name,
    Symbol,
    Balance,
    Bought,
    Sold,
    Realized,
    Unrealized,
    Total,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Token table ordering. Defaults to value, largest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenSort {
    pub key: TokenSortKey,
    pub direction: SortDirection,
}

/// Stable sort; ties keep held-then-discovery order.
pub fn sort_tokens(tokens: &mut [TokenReport], sort: TokenSort) {
    tokens.sort_by(|a, b| {
        let ord = match sort.key {
            TokenSortKey::Value => holding_value(a).cmp(&holding_value(b)),
            TokenSortKey::Name => a.name.cmp(&b.name),
            TokenSortKey::Symbol => a.symbol.cmp(&b.symbol),
            TokenSortKey::Balance => parse_amount(&a.amount).cmp(&parse_amount(&b.amount)),
            TokenSortKey::Bought => a.profits.total_bought_usd.cmp(&b.profits.total_bought_usd),
            TokenSortKey::Sold => a.profits.total_sold_usd.cmp(&b.profits.total_sold_usd),
            TokenSortKey::Realized => a.profits.realized.cmp(&b.profits.realized),
            TokenSortKey::Unrealized => a.profits.unrealized.cmp(&b.profits.unrealized),
            TokenSortKey::Total => a.profits.total.cmp(&b.profits.total),
        };
        match sort.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

fn holding_value(token: &TokenReport) -> Decimal {
    parse_amount(&token.amount).saturating_mul(to_decimal(token.current_price))
}

/// SOL balance at spot plus every held token at its known price. Tokens with
/// no price contribute nothing. Saturates at `Decimal::MAX`.
pub fn total_portfolio_value(portfolio: &PortfolioResult, sol_price: Option<f64>) -> Decimal {
    let sol = parse_amount(&portfolio.native_balance.solana).saturating_mul(to_decimal(sol_price));
    portfolio
        .tokens
        .iter()
        .map(|t| parse_amount(&t.amount).saturating_mul(to_decimal(t.current_price)))
        .fold(sol, Decimal::saturating_add)
        .round_dp(2)
}

/// Plain-text wallet summary fed to the roast model.
pub fn wallet_summary(address: &WalletAddress, sol_balance: &str, tokens: &[TokenReport]) -> String {
    let sol_balance = if sol_balance.is_empty() { "0" } else { sol_balance };

    let mut out = String::new();
    let _ = writeln!(out, "Wallet Address: {address}");
    let _ = writeln!(out, "SOL Balance: {sol_balance} SOL");
    let _ = writeln!(out);
    let _ = writeln!(out, "Token Holdings:");

    for token in tokens {
        let p = &token.profits;
        let amount = if token.amount.is_empty() { "0" } else { token.amount.as_str() };
        let _ = write!(
            out,
            "\n- {} ({})\n  Address: {}\n  Status: {}\n  Amount: {}\n  Current Price: ${:.4}\n  Bought: ${:.2} (Avg: {})\n  Sold: ${:.2} (Avg: {})\n  PNL:\n    Realized: ${:.2}\n    Unrealized: ${:.2}\n    Total: ${:.2}\n",
            token.name,
            token.symbol,
            token.address,
            token.status.as_str(),
            amount,
            to_decimal(token.current_price),
            p.total_bought_usd,
            format_price_plain(p.average_buy_price),
            p.total_sold_usd,
            format_price_plain(p.average_sell_price),
            p.realized,
            p.unrealized,
            p.total,
        );
    }

    out
}

/// Compact price string: zeros right after the decimal point are collapsed
/// to a count, e.g. `0.00000123` → `$0.0(5)123`. Otherwise up to four
/// decimals with trailing zeros dropped.
pub fn format_price_plain(price: Decimal) -> String {
    if price.is_zero() {
        return "$0.0".into();
    }

    let fixed = format!("{:.10}", price.round_dp(10));
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');
    let leading_zeros = frac.len() - frac.trim_start_matches('0').len();

    if leading_zeros > 0 {
        format!("${}.0({}){}", int_part, leading_zeros, &frac[leading_zeros..])
    } else {
        let four = format!("{:.4}", price.round_dp(4));
        let trimmed = four.trim_end_matches('0').trim_end_matches('.');
        format!("${trimmed}")
    }
}

fn to_decimal(value: Option<f64>) -> Decimal {
    value.and_then(Decimal::from_f64).unwrap_or(Decimal::ZERO)
}
