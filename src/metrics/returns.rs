use crate::error::{MetricsError, Result};

//trading days used to annualise and to approximate a year of history
pub const TRADING_DAYS_PER_YEAR: usize = 251;

//rounds to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

//simple return including cash paid out over the window
//newer_price is the later close, older_price the close the window is measured from
pub fn total_return(newer_price: f64, dividends: f64, older_price: f64) -> Result<f64> {
    if older_price == 0.0 {
        return Err(MetricsError::invalid(
            "window start close is zero, return is undefined",
        ));
    }
    Ok((newer_price + dividends) / older_price - 1.0)
}

//day-over-day log returns for closes ordered most recent first
pub fn log_returns(closes: &[f64]) -> Result<Vec<f64>> {
    closes
        .windows(2)
        .map(|pair| {
            let (newer, older) = (pair[0], pair[1]);
            if newer <= 0.0 || older <= 0.0 {
                return Err(MetricsError::invalid(format!(
                    "log return needs positive closes, got {} and {}",
                    newer, older
                )));
            }
            Ok((newer / older).ln())
        })
        .collect()
}
