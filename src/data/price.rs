use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceRecordError {
    #[error("Invalid price record on {date}: high ({high}) < low ({low})")]
    InvalidHighLow { date: NaiveDate, high: f64, low: f64 },
    #[error("Invalid price record on {date}: {field} is not a finite number")]
    NonFinite { date: NaiveDate, field: &'static str },
    #[error("Invalid price record on {date}: negative volume {volume}")]
    NegativeVolume { date: NaiveDate, volume: f64 },
    #[error("Invalid price record on {date}: negative dividend {dividend}")]
    NegativeDividend { date: NaiveDate, dividend: f64 },
}

//one trading day of end-of-day market data for a security
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: f64,
    pub dividend: f64,
    #[serde(default = "default_split_factor")]
    pub split_factor: f64,
}

fn default_split_factor() -> f64 {
    1.0
}

impl PriceRecord {
    //creates a new PriceRecord with validation
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        adj_close: f64,
        volume: f64,
        dividend: f64,
    ) -> Result<Self, PriceRecordError> {
        let record = PriceRecord::new_unchecked(
            date, open, high, low, close, adj_close, volume, dividend,
        );
        record.validate()?;
        Ok(record)
    }

    //creates a PriceRecord without validation
    #[allow(clippy::too_many_arguments)]
    pub fn new_unchecked(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        adj_close: f64,
        volume: f64,
        dividend: f64,
    ) -> Self {
        PriceRecord {
            date,
            open,
            high,
            low,
            close,
            adj_close,
            volume,
            dividend,
            split_factor: 1.0,
        }
    }

    //sets the split factor reported by the provider
    pub fn with_split_factor(mut self, split_factor: f64) -> Self {
        self.split_factor = split_factor;
        self
    }

    //checks the record for values no provider should ever report
    pub fn validate(&self) -> Result<(), PriceRecordError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("adj_close", self.adj_close),
            ("volume", self.volume),
            ("dividend", self.dividend),
            ("split_factor", self.split_factor),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(PriceRecordError::NonFinite {
                    date: self.date,
                    field,
                });
            }
        }

        if self.high < self.low {
            return Err(PriceRecordError::InvalidHighLow {
                date: self.date,
                high: self.high,
                low: self.low,
            });
        }

        if self.volume < 0.0 {
            return Err(PriceRecordError::NegativeVolume {
                date: self.date,
                volume: self.volume,
            });
        }

        if self.dividend < 0.0 {
            return Err(PriceRecordError::NegativeDividend {
                date: self.date,
                dividend: self.dividend,
            });
        }

        Ok(())
    }

    //true when a cash dividend was paid on this date
    pub fn pays_dividend(&self) -> bool {
        self.dividend > 0.0
    }

    //returns the range (high - low)
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn accepts_well_formed_record() {
        let record = PriceRecord::new(day(2), 10.0, 11.0, 9.5, 10.5, 10.4, 1_000.0, 0.0).unwrap();
        assert_eq!(record.split_factor, 1.0);
        assert!(!record.pays_dividend());
        assert_eq!(record.range(), 1.5);
    }

    #[test]
    fn rejects_inverted_high_low() {
        let err = PriceRecord::new(day(2), 10.0, 9.0, 11.0, 10.0, 10.0, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, PriceRecordError::InvalidHighLow { .. }));
    }

    #[test]
    fn rejects_nan_close() {
        let err =
            PriceRecord::new(day(2), 10.0, 11.0, 9.0, f64::NAN, 10.0, 0.0, 0.0).unwrap_err();
        assert_eq!(
            err,
            PriceRecordError::NonFinite {
                date: day(2),
                field: "close"
            }
        );
    }

    #[test]
    fn rejects_negative_volume_and_dividend() {
        let err = PriceRecord::new(day(2), 10.0, 11.0, 9.0, 10.0, 10.0, -1.0, 0.0).unwrap_err();
        assert!(matches!(err, PriceRecordError::NegativeVolume { .. }));

        let err = PriceRecord::new(day(2), 10.0, 11.0, 9.0, 10.0, 10.0, 1.0, -0.2).unwrap_err();
        assert!(matches!(err, PriceRecordError::NegativeDividend { .. }));
    }
}
