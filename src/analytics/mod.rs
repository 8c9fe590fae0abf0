pub mod pnl;
pub mod report;

pub use pnl::{calculate_token_profits, ProfitCalculation};
pub use report::{
    all_tokens_ever, build_wallet_report, combined_tokens, HoldingStatus, SortDirection, TokenReport, TokenSort,
    TokenSortKey, WalletReport,
};
