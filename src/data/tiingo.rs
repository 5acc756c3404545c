use crate::data::loader::parse_iso_date;
use crate::data::price::PriceRecord;
use crate::data::source::{MarketDataSource, SourceError};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.tiingo.com";
pub const DEFAULT_START_DATE: &str = "1900-01-01";

//one row of /tiingo/daily/<ticker>/prices
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TiingoDailyPrice {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    adj_close: f64,
    #[serde(default)]
    div_cash: f64,
    #[serde(default = "one")]
    split_factor: f64,
}

fn one() -> f64 {
    1.0
}

//blocking client for the tiingo daily prices endpoint
#[derive(Debug, Clone)]
pub struct TiingoSource {
    api_key: String,
    base_url: String,
    start_date: String,
    client: reqwest::blocking::Client,
}

impl TiingoSource {
    pub fn new(api_key: impl Into<String>) -> Result<Self, SourceError> {
        Self::with_timeout(api_key, Duration::from_secs(30))
    }

    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("lowtide/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Network(format!("failed to build http client: {}", e)))?;

        Ok(TiingoSource {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            start_date: DEFAULT_START_DATE.to_string(),
            client,
        })
    }

    //points the client at a different host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = start_date.into();
        self
    }

    pub fn prices_url(&self, symbol: &str) -> String {
        format!(
            "{}/tiingo/daily/{}/prices",
            self.base_url,
            symbol.to_lowercase()
        )
    }
}

impl MarketDataSource for TiingoSource {
    fn fetch_history(&self, symbol: &str) -> Result<Vec<PriceRecord>, SourceError> {
        let url = self.prices_url(symbol);
        tracing::info!(symbol, %url, "requesting daily price history");

        let response = self
            .client
            .get(&url)
            .query(&[("startDate", self.start_date.as_str()), ("format", "json")])
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", "application/json")
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Network(format!("request timeout: {}", e))
                } else if e.is_connect() {
                    SourceError::Network(format!("connection failed: {}", e))
                } else {
                    SourceError::Network(format!("request failed: {}", e))
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| SourceError::Network(format!("failed to read response body: {}", e)))?;

        check_status(symbol, status, body.as_str())?;

        let records = parse_prices(&body)?;
        tracing::debug!(symbol, count = records.len(), "received daily prices");
        Ok(records)
    }

    fn name(&self) -> &str {
        "tiingo"
    }
}

fn check_status(symbol: &str, status: u16, body: &str) -> Result<(), SourceError> {
    match status {
        200..=299 => Ok(()),
        401 | 403 => Err(SourceError::InvalidCredential { status }),
        404 => Err(SourceError::UnknownSymbol(symbol.to_string())),
        _ => Err(SourceError::Http {
            status,
            body: body.chars().take(200).collect(),
        }),
    }
}

//parses a daily prices response body
pub fn parse_prices(body: &str) -> Result<Vec<PriceRecord>, SourceError> {
    let rows: Vec<TiingoDailyPrice> =
        serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

    rows.into_iter()
        .map(|row| {
            let date = parse_iso_date(&row.date)
                .ok_or_else(|| SourceError::Parse(format!("bad date '{}'", row.date)))?;
            let record = PriceRecord::new(
                date,
                row.open,
                row.high,
                row.low,
                row.close,
                row.adj_close,
                row.volume,
                row.div_cash,
            )?
            .with_split_factor(row.split_factor);
            Ok(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const BODY: &str = r#"[
        {"date":"2024-01-09T00:00:00.000Z","close":185.14,"high":185.15,"low":182.73,"open":183.92,
         "volume":42841809,"adjClose":184.35,"adjHigh":184.36,"adjLow":181.95,"adjOpen":183.13,
         "adjVolume":42841809,"divCash":0.0,"splitFactor":1.0},
        {"date":"2024-01-10T00:00:00.000Z","close":186.19,"high":187.05,"low":183.62,"open":184.35,
         "volume":46792908,"adjClose":185.39,"adjHigh":186.25,"adjLow":182.83,"adjOpen":183.56,
         "adjVolume":46792908,"divCash":0.24,"splitFactor":1.0}
    ]"#;

    #[test]
    fn parses_daily_prices() {
        let records = parse_prices(BODY).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(records[1].close, 186.19);
        assert_eq!(records[1].adj_close, 185.39);
        assert_eq!(records[1].dividend, 0.24);
    }

    #[test]
    fn empty_array_is_not_an_error_here() {
        assert!(parse_prices("[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_json_body() {
        assert!(matches!(
            parse_prices("Not found"),
            Err(SourceError::Parse(_))
        ));
    }

    #[test]
    fn maps_status_codes() {
        assert!(check_status("AAPL", 200, "").is_ok());
        assert!(matches!(
            check_status("AAPL", 401, ""),
            Err(SourceError::InvalidCredential { status: 401 })
        ));
        assert!(matches!(
            check_status("NOPE", 404, ""),
            Err(SourceError::UnknownSymbol(s)) if s == "NOPE"
        ));
        assert!(matches!(
            check_status("AAPL", 500, "boom"),
            Err(SourceError::Http { status: 500, .. })
        ));
    }

    //serves one canned http response and hands back the raw request head
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, std::thread::JoinHandle<String>) {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = stream.read(&mut buf).unwrap();
                if read == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..read]);
            }
            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });
        (base_url, handle)
    }

    #[test]
    fn fetches_history_over_http() {
        let (base_url, server) = serve_once("HTTP/1.1 200 OK", BODY);
        let source = TiingoSource::new("secret").unwrap().with_base_url(base_url);

        let records = source.fetch_history("AAPL").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].close, 185.14);

        let head = server.join().unwrap();
        assert!(head.starts_with("GET /tiingo/daily/aapl/prices?startDate=1900-01-01"), "{}", head);
        assert!(head.to_lowercase().contains("authorization: token secret"), "{}", head);
    }

    #[test]
    fn fetch_maps_not_found_to_unknown_symbol() {
        let (base_url, server) = serve_once("HTTP/1.1 404 Not Found", "{}");
        let source = TiingoSource::new("secret").unwrap().with_base_url(base_url);

        assert!(matches!(
            source.fetch_history("zzzz"),
            Err(SourceError::UnknownSymbol(s)) if s == "zzzz"
        ));
        server.join().unwrap();
    }

    #[test]
    fn closed_port_is_a_network_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let source = TiingoSource::with_timeout("secret", Duration::from_secs(5))
            .unwrap()
            .with_base_url(format!("http://127.0.0.1:{}", port));

        assert!(matches!(
            source.fetch_history("AAPL"),
            Err(SourceError::Network(_))
        ));
    }

    #[test]
    fn builds_lowercase_prices_url() {
        let source = TiingoSource::new("key")
            .unwrap()
            .with_base_url("http://localhost:8080/");
        assert_eq!(
            source.prices_url("AAPL"),
            "http://localhost:8080/tiingo/daily/aapl/prices"
        );
    }
}
