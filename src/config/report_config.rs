use crate::data::{CsvDirectorySource, MarketDataSource, TiingoSource};
use crate::portfolio::Holding;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

//environment variable consulted when no api key is configured
pub const API_KEY_ENV: &str = "TIINGO_API_KEY";

fn default_timeout_secs() -> u64 {
    30
}

//complete portfolio report configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfiguration {
    //market data: a csv directory takes precedence over the remote provider
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    //years of history used for volatility (all history when absent)
    #[serde(default)]
    pub volatility_years: Option<u32>,

    pub holdings: Vec<Holding>,

    //optional output path for the json report
    #[serde(default)]
    pub output_json: Option<PathBuf>,
}

impl Default for ReportConfiguration {
    fn default() -> Self {
        ReportConfiguration {
            data_dir: None,
            api_key: None,
            request_timeout_secs: default_timeout_secs(),
            volatility_years: Some(1),
            holdings: vec![
                Holding::new("VTI", 200.0),
                Holding::new("TLT", 100.0),
                Holding::new("GLD", 170.0),
            ],
            output_json: None,
        }
    }
}

impl ReportConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: ReportConfiguration = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.holdings.is_empty() {
            bail!("configuration lists no holdings");
        }
        if self.volatility_years == Some(0) {
            bail!("volatility_years must be at least 1");
        }
        for holding in &self.holdings {
            if holding.symbol().is_empty() {
                bail!("holding with empty ticker");
            }
            if !holding.cost_basis.is_finite() || holding.cost_basis <= 0.0 {
                bail!(
                    "holding {} has non-positive cost basis {}",
                    holding.symbol(),
                    holding.cost_basis
                );
            }
        }
        Ok(())
    }

    //configured key first, then the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_api_key(self.api_key.clone(), std::env::var(API_KEY_ENV).ok())
    }

    //creates the market data source the configuration describes
    pub fn build_source(&self) -> anyhow::Result<Box<dyn MarketDataSource>> {
        if let Some(dir) = &self.data_dir {
            return Ok(Box::new(CsvDirectorySource::new(dir)));
        }

        let key = self.resolve_api_key().with_context(|| {
            format!(
                "no data_dir configured and no api key given (set api_key or {})",
                API_KEY_ENV
            )
        })?;
        let source =
            TiingoSource::with_timeout(key, Duration::from_secs(self.request_timeout_secs))?;
        Ok(Box::new(source))
    }
}

pub fn resolve_api_key(configured: Option<String>, from_env: Option<String>) -> Option<String> {
    configured
        .into_iter()
        .chain(from_env)
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config: ReportConfiguration = serde_json::from_str(
            r#"{"holdings":[{"ticker":"spy","cost_basis":400.0,"shares":3}]}"#,
        )
        .unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.volatility_years, None);
        assert_eq!(config.holdings[0].shares, Some(3.0));
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_bad_holdings() {
        let mut config = ReportConfiguration::default();
        config.holdings[0].cost_basis = 0.0;
        assert!(config.validate().is_err());

        let config = ReportConfiguration {
            holdings: vec![],
            ..ReportConfiguration::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let config = ReportConfiguration {
            data_dir: Some(PathBuf::from("prices")),
            ..ReportConfiguration::default()
        };
        config.to_json_file(&path).unwrap();
        assert_eq!(ReportConfiguration::from_json_file(&path).unwrap(), config);
    }

    #[test]
    fn api_key_prefers_config_and_skips_blanks() {
        assert_eq!(
            resolve_api_key(Some("abc".into()), Some("env".into())),
            Some("abc".to_string())
        );
        assert_eq!(
            resolve_api_key(Some("  ".into()), Some("env".into())),
            Some("env".to_string())
        );
        assert_eq!(resolve_api_key(None, None), None);
    }

    #[test]
    fn data_dir_selects_csv_source() {
        let config = ReportConfiguration {
            data_dir: Some(PathBuf::from("prices")),
            ..ReportConfiguration::default()
        };
        assert_eq!(config.build_source().unwrap().name(), "csv");
    }
}
