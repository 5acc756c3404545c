pub mod holding;
pub mod report;

pub use holding::Holding;
pub use report::{HoldingOutcome, HoldingReport, PortfolioReport, PortfolioTotals};
