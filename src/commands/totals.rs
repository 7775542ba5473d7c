use crate::commands::Out;
use crate::ingest::Severity;
use crate::model::{Amount, Category, Finances};
use crate::source::{load_finances, load_year, Ledger};
use crate::{Config, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::warn;

/// Per-category figures for the years that were read.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Totals {
    pub years: Vec<i32>,
    pub months: usize,
    pub categories: Vec<CategoryTotal>,
    pub balance: Decimal,
    /// Rows that were skipped while reading the ledger.
    pub skipped: usize,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Decimal,
    /// The monthly average over every month read.
    pub average: Decimal,
}

/// Reads the ledger, or only `year` when given, and totals it by category.
///
/// # Errors
/// - The ledger cannot be read, or `year` has no worksheets.
/// - A worksheet's header does not match its layout.
pub async fn totals(config: &Config, ledger: &dyn Ledger, year: Option<i32>) -> Result<Out<Totals>> {
    let (finances, diagnostics) = match year {
        Some(year) => {
            let (loaded, diagnostics) = load_year(ledger, year, config.variant(year)).await?;
            anyhow::ensure!(!loaded.months().is_empty(), "There are no worksheets for {year}");
            let mut finances = Finances::new();
            finances.insert(loaded)?;
            (finances, diagnostics)
        }
        None => load_finances(ledger, |y| config.variant(y)).await?,
    };

    let skipped = diagnostics
        .iter()
        .filter(|(_, d)| d.severity() == Severity::Error)
        .count();
    if skipped > 0 {
        warn!("{skipped} rows were skipped, run ingest on a month to see why");
    }

    let categories: Vec<CategoryTotal> = finances
        .totals()
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category,
            total,
            average: finances.average(category),
        })
        .collect();

    let t = Totals {
        years: finances.years().iter().map(|y| y.index()).collect(),
        months: finances.years().iter().map(|y| y.months().len()).sum(),
        categories,
        balance: finances.balance(),
        skipped,
    };
    Ok(Out::new(render(&t), t))
}

fn render(t: &Totals) -> String {
    let mut message = match (t.years.first(), t.years.last()) {
        (Some(first), Some(last)) if first != last => {
            format!("Totals for {first} to {last} ({} months)", t.months)
        }
        (Some(only), _) => format!("Totals for {only} ({} months)", t.months),
        _ => String::from("The ledger is empty"),
    };
    for c in &t.categories {
        let _ = write!(
            message,
            "\n  {:<16} {:>14} {:>12}/month",
            c.category.to_string(),
            Amount::new(c.total).to_string(),
            Amount::new(c.average).to_string()
        );
    }
    let _ = write!(message, "\n  {:<16} {:>14}", "balance", Amount::new(t.balance).to_string());
    message
}
