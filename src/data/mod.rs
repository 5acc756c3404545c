pub mod loader;
pub mod price;
pub mod series;
pub mod source;
pub mod tiingo;

pub use loader::{load_csv, read_csv};
pub use price::{PriceRecord, PriceRecordError};
pub use series::PriceSeries;
pub use source::{CsvDirectorySource, InMemorySource, MarketDataSource, SourceError};
pub use tiingo::TiingoSource;
