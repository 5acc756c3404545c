pub mod equity;
pub mod returns;
pub mod summary;

pub use equity::PriceSeriesMetrics;
pub use returns::{log_returns, round_to, TRADING_DAYS_PER_YEAR};
pub use summary::EquitySummary;
