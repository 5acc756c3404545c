pub mod report_config;

pub use report_config::{ReportConfiguration, API_KEY_ENV};
