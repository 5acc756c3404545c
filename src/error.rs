use crate::data::source::SourceError;
use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetricsError>;

//errors raised while building or querying equity metrics
#[derive(Error, Debug)]
pub enum MetricsError {
    //construction failed because the provider returned nothing usable
    #[error("No price data available for {symbol}")]
    DataUnavailable { symbol: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed price series: duplicate record for {date}")]
    DuplicateDate { date: NaiveDate },

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl MetricsError {
    pub(crate) fn insufficient(message: impl Into<String>) -> Self {
        MetricsError::InsufficientData(message.into())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        MetricsError::InvalidArgument(message.into())
    }
}
