use crate::data::MarketDataSource;
use crate::error::{MetricsError, Result};
use crate::metrics::summary::{fmt_pct, fmt_price};
use crate::metrics::{EquitySummary, PriceSeriesMetrics};
use crate::portfolio::holding::Holding;
use chrono::{Local, NaiveDate};
use indexmap::IndexMap;
use prettytable::{Cell, Row, Table};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

//what happened when one holding was evaluated
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HoldingOutcome {
    Ok { summary: EquitySummary },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoldingReport {
    pub holding: Holding,
    pub outcome: HoldingOutcome,
}

impl HoldingReport {
    pub fn summary(&self) -> Option<&EquitySummary> {
        match &self.outcome {
            HoldingOutcome::Ok { summary } => Some(summary),
            HoldingOutcome::Failed { .. } => None,
        }
    }

    //current value of the position, when both a price and share count exist
    pub fn market_value(&self) -> Option<f64> {
        self.summary()
            .and_then(|s| self.holding.market_value(s.close))
    }
}

//aggregates over holdings that have a share count and a price
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PortfolioTotals {
    pub market_value: f64,
    pub cost: f64,
    pub total_return: Option<f64>,
    pub valued_holdings: usize,
    pub failed_holdings: usize,
}

//portfolio view: one entry per holding, in input order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioReport {
    pub entries: IndexMap<String, HoldingReport>,
    pub totals: PortfolioTotals,
}

impl PortfolioReport {
    pub fn build(
        holdings: &[Holding],
        source: &dyn MarketDataSource,
        period_years: Option<u32>,
    ) -> Result<Self> {
        Self::build_as_of(holdings, source, period_years, Local::now().date_naive())
    }

    //evaluates every holding independently and in parallel
    pub fn build_as_of(
        holdings: &[Holding],
        source: &dyn MarketDataSource,
        period_years: Option<u32>,
        today: NaiveDate,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for holding in holdings {
            if !seen.insert(holding.symbol()) {
                return Err(MetricsError::invalid(format!(
                    "holding {} is listed more than once",
                    holding.symbol()
                )));
            }
        }

        tracing::info!(
            holdings = holdings.len(),
            source = source.name(),
            "building portfolio report"
        );

        let evaluated: Vec<HoldingReport> = holdings
            .par_iter()
            .map(|holding| evaluate(holding, source, period_years, today))
            .collect();

        let entries: IndexMap<String, HoldingReport> = evaluated
            .into_iter()
            .map(|report| (report.holding.symbol(), report))
            .collect();

        let totals = compute_totals(&entries);
        Ok(PortfolioReport { entries, totals })
    }

    pub fn get(&self, symbol: &str) -> Option<&HoldingReport> {
        self.entries.get(&symbol.to_uppercase())
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new();

        table.add_row(Row::new(
            [
                "Ticker", "Close", "Weekly", "Monthly", "Annual", "YTD", "Volatility",
                "Rel. TSR", "Value",
            ]
            .iter()
            .map(|h| Cell::new(h))
            .collect(),
        ));

        for (symbol, entry) in &self.entries {
            let cells = match &entry.outcome {
                HoldingOutcome::Ok { summary } => vec![
                    symbol.clone(),
                    fmt_price(Some(summary.close)),
                    fmt_pct(summary.weekly_return),
                    fmt_pct(summary.monthly_return),
                    fmt_pct(summary.annual_return),
                    fmt_pct(summary.ytd_return),
                    fmt_pct(summary.volatility),
                    summary
                        .relative_return
                        .map_or_else(|| "n/a".to_string(), |v| format!("{:.4}x", v)),
                    fmt_price(entry.market_value()),
                ],
                HoldingOutcome::Failed { error } => vec![symbol.clone(), format!("error: {}", error)],
            };
            table.add_row(Row::new(cells.iter().map(|c| Cell::new(c)).collect()));
        }

        table.add_row(Row::new(vec![
            Cell::new("Total"),
            Cell::new(&fmt_price(Some(self.totals.market_value))),
            Cell::new(&format!("cost {}", fmt_price(Some(self.totals.cost)))),
            Cell::new(&format!("return {}", fmt_pct(self.totals.total_return))),
        ]));

        table
    }

    pub fn pretty_print_table(&self) {
        self.table().printstd();
    }
}

fn evaluate(
    holding: &Holding,
    source: &dyn MarketDataSource,
    period_years: Option<u32>,
    today: NaiveDate,
) -> HoldingReport {
    let outcome = PriceSeriesMetrics::fetch(&holding.symbol(), source)
        .and_then(|metrics| metrics.summary_as_of(today, Some(holding.cost_basis), period_years));

    let outcome = match outcome {
        Ok(summary) => HoldingOutcome::Ok { summary },
        Err(e) => {
            tracing::warn!(ticker = %holding.symbol(), error = %e, "holding skipped");
            HoldingOutcome::Failed {
                error: e.to_string(),
            }
        }
    };

    HoldingReport {
        holding: holding.clone(),
        outcome,
    }
}

fn compute_totals(entries: &IndexMap<String, HoldingReport>) -> PortfolioTotals {
    let mut totals = PortfolioTotals::default();

    for entry in entries.values() {
        if entry.summary().is_none() {
            totals.failed_holdings += 1;
            continue;
        }

        if let (Some(value), Some(cost)) = (entry.market_value(), entry.holding.cost()) {
            totals.market_value += value;
            totals.cost += cost;
            totals.valued_holdings += 1;
        }
    }

    totals.total_return = (totals.cost > 0.0).then(|| totals.market_value / totals.cost - 1.0);
    totals
}
