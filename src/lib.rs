//equity metrics and portfolio reporting over end-of-day market data

pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod portfolio;

pub use error::{MetricsError, Result};

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ReportConfiguration, API_KEY_ENV};
    pub use crate::data::{
        load_csv, CsvDirectorySource, InMemorySource, MarketDataSource, PriceRecord,
        PriceSeries, SourceError, TiingoSource,
    };
    pub use crate::error::MetricsError;
    pub use crate::metrics::{EquitySummary, PriceSeriesMetrics};
    pub use crate::portfolio::{Holding, HoldingOutcome, PortfolioReport};
}
