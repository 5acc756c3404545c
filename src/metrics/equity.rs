use crate::data::{MarketDataSource, PriceRecord, PriceSeries};
use crate::error::{MetricsError, Result};
use crate::metrics::returns::{log_returns, round_to, total_return, TRADING_DAYS_PER_YEAR};
use crate::metrics::summary::EquitySummary;
use chrono::{Datelike, Duration, Local, NaiveDate};
use statrs::statistics::Statistics;

pub const WEEK_CALENDAR_DAYS: u32 = 5;
pub const MONTH_CALENDAR_DAYS: u32 = 30;
pub const YEAR_CALENDAR_DAYS: u32 = TRADING_DAYS_PER_YEAR as u32;
pub const WEEK_TRADING_DAYS: usize = 5;

//date format accepted by price_on
pub const QUERY_DATE_FORMAT: &str = "%m-%d-%Y";

//read-only metrics over one security's price history
//the series always holds at least one record, index 0 is the most recent day
#[derive(Debug, Clone)]
pub struct PriceSeriesMetrics {
    symbol: String,
    series: PriceSeries,
}

impl PriceSeriesMetrics {
    //retrieves the full history for a symbol and builds the view
    pub fn fetch(symbol: &str, source: &dyn MarketDataSource) -> Result<Self> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(MetricsError::invalid("security identifier is empty"));
        }

        let records = source.fetch_history(&symbol).map_err(|e| {
            tracing::warn!(symbol = %symbol, source = source.name(), error = %e, "price retrieval failed");
            e
        })?;

        let metrics = Self::from_records(symbol, records)?;
        tracing::info!(
            symbol = %metrics.symbol,
            source = source.name(),
            records = metrics.series.len(),
            latest = %metrics.latest().date,
            "loaded price history"
        );
        Ok(metrics)
    }

    //builds the view from already retrieved records in any date order
    pub fn from_records(symbol: impl Into<String>, records: Vec<PriceRecord>) -> Result<Self> {
        let symbol = symbol.into().to_uppercase();
        if records.is_empty() {
            return Err(MetricsError::DataUnavailable { symbol });
        }

        let series = PriceSeries::new(records)?;
        Ok(PriceSeriesMetrics { symbol, series })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    //non-empty by construction
    fn latest(&self) -> &PriceRecord {
        &self.series.records()[0]
    }

    pub fn latest_date(&self) -> NaiveDate {
        self.latest().date
    }

    //close on an exact mm-dd-yyyy date, none when unparseable or not a trading day
    pub fn price_on(&self, date: &str) -> Option<f64> {
        let date = NaiveDate::parse_from_str(date.trim(), QUERY_DATE_FORMAT).ok()?;
        self.price_on_date(date)
    }

    pub fn price_on_date(&self, date: NaiveDate) -> Option<f64> {
        self.series.find(date).map(|r| r.close)
    }

    pub fn latest_close(&self) -> f64 {
        self.latest().close
    }

    pub fn latest_adjusted_close(&self) -> f64 {
        self.latest().adj_close
    }

    //mean adjusted close over the n most recent trading days
    pub fn average_close_last_n_trading_days(&self, n: usize) -> Result<f64> {
        if n == 0 {
            return Err(MetricsError::invalid("trading-day window must be positive"));
        }
        if n > self.series.len() {
            return Err(MetricsError::insufficient(format!(
                "{}: {} trading days requested, {} available",
                self.symbol,
                n,
                self.series.len()
            )));
        }

        Ok(self.series.iter().take(n).map(|r| r.adj_close).mean())
    }

    //mean adjusted close over records within n calendar days of the latest
    pub fn average_close_last_calendar_days(&self, n: u32) -> Result<f64> {
        if n == 0 {
            return Err(MetricsError::invalid("calendar-day window must be positive"));
        }

        let latest = self.latest_date();
        let window = i64::from(n);

        //index 0 is always inside the window, so the mean is never over an empty set
        Ok(self
            .series
            .iter()
            .take_while(|r| (latest - r.date).num_days() <= window)
            .map(|r| r.adj_close)
            .mean())
    }

    pub fn average_price_week(&self) -> Result<f64> {
        self.average_close_last_n_trading_days(WEEK_TRADING_DAYS)
    }

    pub fn average_price_month(&self) -> Result<f64> {
        self.average_close_last_calendar_days(MONTH_CALENDAR_DAYS)
    }

    //total return since the first record at least n calendar days before the latest
    pub fn return_over_calendar_window(&self, n: u32) -> Result<f64> {
        if n == 0 {
            return Err(MetricsError::invalid("return window must be positive"));
        }

        let no_record = || {
            MetricsError::insufficient(format!(
                "{}: no record {} or more calendar days before {} (history starts {})",
                self.symbol,
                n,
                self.latest_date(),
                self.series.oldest().map_or(self.latest_date(), |r| r.date)
            ))
        };

        //a window reaching past the calendar's range cannot be covered by any history
        let cutoff = self
            .latest_date()
            .checked_sub_signed(Duration::days(i64::from(n)))
            .ok_or_else(&no_record)?;
        let boundary = self
            .series
            .position_on_or_before(cutoff)
            .ok_or_else(&no_record)?;

        self.return_since(boundary)
    }

    pub fn weekly_return(&self) -> Result<f64> {
        self.return_over_calendar_window(WEEK_CALENDAR_DAYS)
    }

    pub fn monthly_return(&self) -> Result<f64> {
        self.return_over_calendar_window(MONTH_CALENDAR_DAYS)
    }

    pub fn annual_return(&self) -> Result<f64> {
        self.return_over_calendar_window(YEAR_CALENDAR_DAYS)
    }

    pub fn return_year_to_date(&self) -> Result<f64> {
        self.return_year_to_date_as_of(Local::now().date_naive())
    }

    //boundary is the last record dated on or before january 1 of today's year
    pub fn return_year_to_date_as_of(&self, today: NaiveDate) -> Result<f64> {
        let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1)
            .ok_or_else(|| MetricsError::invalid(format!("no January 1 in year {}", today.year())))?;

        let boundary = self.series.position_on_or_before(year_start).ok_or_else(|| {
            MetricsError::insufficient(format!(
                "{}: history does not reach back to {}",
                self.symbol, year_start
            ))
        })?;

        //no trading day inside the year yet
        if boundary == 0 {
            return Err(MetricsError::insufficient(format!(
                "{}: no records after {} (latest is {})",
                self.symbol,
                year_start,
                self.latest_date()
            )));
        }

        self.return_since(boundary)
    }

    //(latest close + dividends after the boundary) / boundary close - 1
    fn return_since(&self, boundary: usize) -> Result<f64> {
        let records = self.series.records();
        let end_price = records[boundary].close;
        if end_price == 0.0 {
            return Err(MetricsError::invalid(format!(
                "{}: close on {} is zero",
                self.symbol, records[boundary].date
            )));
        }

        let dividends: f64 = records[..boundary].iter().map(|r| r.dividend).sum();
        let gain = total_return(self.latest_close(), dividends, end_price)?;
        Ok(round_to(gain, 4))
    }

    //annualised sample std dev of daily log returns over the last period_years * 251 records
    pub fn daily_volatility(&self, period_years: Option<u32>) -> Result<f64> {
        let available = self.series.len();
        let nodes = match period_years {
            None => available,
            Some(0) => return Err(MetricsError::invalid("volatility period must be positive")),
            Some(years) => available.min((years as usize).saturating_mul(TRADING_DAYS_PER_YEAR)),
        };

        let closes: Vec<f64> = self.series.iter().take(nodes).map(|r| r.close).collect();
        let logs = log_returns(&closes)?;
        if logs.len() < 2 {
            return Err(MetricsError::insufficient(format!(
                "{}: volatility needs at least 2 log returns, have {}",
                self.symbol,
                logs.len()
            )));
        }

        let annualised = logs.iter().std_dev() * (TRADING_DAYS_PER_YEAR as f64).sqrt();
        Ok(round_to(annualised, 4))
    }

    //latest adjusted close relative to the price paid
    pub fn relative_shareholder_return(&self, cost_basis: f64) -> Result<f64> {
        if !cost_basis.is_finite() || cost_basis <= 0.0 {
            return Err(MetricsError::invalid(format!(
                "cost basis must be a positive number, got {}",
                cost_basis
            )));
        }
        Ok(round_to(self.latest_adjusted_close() / cost_basis, 4))
    }

    pub fn summary(&self, cost_basis: Option<f64>, period_years: Option<u32>) -> Result<EquitySummary> {
        self.summary_as_of(Local::now().date_naive(), cost_basis, period_years)
    }

    //windows the history is too short for are left empty
    pub fn summary_as_of(
        &self,
        today: NaiveDate,
        cost_basis: Option<f64>,
        period_years: Option<u32>,
    ) -> Result<EquitySummary> {
        Ok(EquitySummary {
            symbol: self.symbol.clone(),
            as_of: self.latest_date(),
            close: self.latest_close(),
            adj_close: self.latest_adjusted_close(),
            avg_price_week: optional(self.average_price_week())?,
            avg_price_month: self.average_price_month()?,
            weekly_return: optional(self.weekly_return())?,
            monthly_return: optional(self.monthly_return())?,
            annual_return: optional(self.annual_return())?,
            ytd_return: optional(self.return_year_to_date_as_of(today))?,
            volatility: optional(self.daily_volatility(period_years))?,
            relative_return: cost_basis
                .map(|cost| self.relative_shareholder_return(cost))
                .transpose()?,
        })
    }
}

//turns a too-short window into a missing value
fn optional(result: Result<f64>) -> Result<Option<f64>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(MetricsError::InsufficientData(reason)) => {
            tracing::debug!(%reason, "metric skipped");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
