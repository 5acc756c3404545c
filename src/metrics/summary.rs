use chrono::NaiveDate;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};

//snapshot of every metric for one security
//windowed values are None when the history is too short for them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquitySummary {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub close: f64,
    pub adj_close: f64,
    pub avg_price_week: Option<f64>,
    pub avg_price_month: f64,
    pub weekly_return: Option<f64>,
    pub monthly_return: Option<f64>,
    pub annual_return: Option<f64>,
    pub ytd_return: Option<f64>,
    pub volatility: Option<f64>,
    pub relative_return: Option<f64>,
}

pub(crate) fn fmt_price(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("${:.2}", v))
}

pub(crate) fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v * 100.0))
}

impl EquitySummary {
    //builds a two-column metric/value table
    pub fn table(&self) -> Table {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        let rows = [
            ("Symbol", self.symbol.clone()),
            ("As Of", self.as_of.format("%m-%d-%Y").to_string()),
            ("Close", fmt_price(Some(self.close))),
            ("Adjusted Close", fmt_price(Some(self.adj_close))),
            ("Avg Price (5 days)", fmt_price(self.avg_price_week)),
            ("Avg Price (30 days)", fmt_price(Some(self.avg_price_month))),
            ("Weekly Return", fmt_pct(self.weekly_return)),
            ("Monthly Return", fmt_pct(self.monthly_return)),
            ("Annual Return", fmt_pct(self.annual_return)),
            ("YTD Return", fmt_pct(self.ytd_return)),
            ("Volatility", fmt_pct(self.volatility)),
            (
                "Relative TSR",
                self.relative_return
                    .map_or_else(|| "n/a".to_string(), |v| format!("{:.4}x", v)),
            ),
        ];

        for (name, value) in rows {
            table.add_row(Row::new(vec![Cell::new(name), Cell::new(&value)]));
        }

        table
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        self.table().printstd();
    }
}
