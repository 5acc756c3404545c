use serde::{Deserialize, Serialize};

//one line of the portfolio: a security bought at a known price
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    //ticker symbol (eg aapl, spy)
    pub ticker: String,

    //price paid per share
    pub cost_basis: f64,

    //shares held, when known
    #[serde(default)]
    pub shares: Option<f64>,
}

impl Holding {
    pub fn new(ticker: impl Into<String>, cost_basis: f64) -> Self {
        Holding {
            ticker: ticker.into().to_uppercase(),
            cost_basis,
            shares: None,
        }
    }

    pub fn with_shares(mut self, shares: f64) -> Self {
        self.shares = Some(shares);
        self
    }

    //ticker as used for lookups
    pub fn symbol(&self) -> String {
        self.ticker.trim().to_uppercase()
    }

    //total paid for the position, if the share count is known
    pub fn cost(&self) -> Option<f64> {
        self.shares.map(|s| s * self.cost_basis)
    }

    //value of the position at the given price, if the share count is known
    pub fn market_value(&self, price: f64) -> Option<f64> {
        self.shares.map(|s| s * price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_position_only_with_shares() {
        let holding = Holding::new("vti", 200.0);
        assert_eq!(holding.ticker, "VTI");
        assert_eq!(holding.cost(), None);
        assert_eq!(holding.market_value(250.0), None);

        let holding = holding.with_shares(4.0);
        assert_eq!(holding.cost(), Some(800.0));
        assert_eq!(holding.market_value(250.0), Some(1000.0));
    }

    #[test]
    fn deserializes_without_shares() {
        let holding: Holding = serde_json::from_str(r#"{"ticker":" gld ","cost_basis":170.5}"#).unwrap();
        assert_eq!(holding.symbol(), "GLD");
        assert_eq!(holding.shares, None);
    }
}
