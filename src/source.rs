//! Where worksheets come from.
//!
//! The `Ledger` trait hands out the raw rows of a month's worksheet. `CsvLedger` reads them from
//! `<ledger_dir>/<year>/<MM>.csv` files and `TestLedger` holds them in memory.

use crate::ingest::{ingest_worksheet, Diagnostic, SchemaVariant};
use crate::model::{Finances, Period, Year};
use crate::{utils, Result};
use anyhow::Context;
use std::collections::{BTreeSet, HashMap};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A worksheet's rows, header row first.
pub type Table = Vec<Vec<String>>;

/// A diagnostic along with the worksheet it came from.
pub type SourcedDiagnostic = (Period, Diagnostic);

/// A collection of monthly worksheets grouped by year.
#[async_trait::async_trait]
pub trait Ledger: Send + Sync {
    /// The years that have at least one worksheet, in ascending order.
    async fn years(&self) -> Result<Vec<i32>>;

    /// The worksheet for `period`, or `None` if there isn't one.
    async fn worksheet(&self, period: Period) -> Result<Option<Table>>;
}

/// Reads worksheets saved as headerless CSV files, one directory per year.
#[derive(Debug, Clone)]
pub struct CsvLedger {
    dir: PathBuf,
}

impl CsvLedger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn worksheet_path(&self, period: Period) -> PathBuf {
        self.dir
            .join(period.year().to_string())
            .join(format!("{:02}.csv", period.month()))
    }
}

#[async_trait::async_trait]
impl Ledger for CsvLedger {
    async fn years(&self) -> Result<Vec<i32>> {
        let mut years = Vec::new();
        for name in utils::list_dir(&self.dir).await? {
            let is_dir = utils::is_dir(self.dir.join(&name)).await;
            match name.parse::<i32>() {
                Ok(year) if name.len() == 4 && is_dir => years.push(year),
                _ => trace!("Ignoring '{name}' in the ledger directory"),
            }
        }
        years.sort();
        Ok(years)
    }

    async fn worksheet(&self, period: Period) -> Result<Option<Table>> {
        let path = self.worksheet_path(period);
        if !utils::is_file(&path).await {
            trace!("No worksheet at {}", path.display());
            return Ok(None);
        }
        let data = utils::read(&path).await?;
        let table =
            load_csv(&data).with_context(|| format!("Unable to parse {}", path.display()))?;
        Ok(Some(table))
    }
}

/// Loads rows from CSV text. Every record is a row, including the first, and rows may differ in
/// length.
pub(crate) fn load_csv(csv_data: &str) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

/// An implementation of `Ledger` that holds its worksheets in memory.
#[derive(Debug, Clone, Default)]
pub struct TestLedger {
    worksheets: HashMap<Period, Table>,
}

impl TestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S, R, I>(&mut self, period: Period, rows: I)
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
        I: IntoIterator<Item = R>,
    {
        let table = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        self.worksheets.insert(period, table);
    }
}

#[async_trait::async_trait]
impl Ledger for TestLedger {
    async fn years(&self) -> Result<Vec<i32>> {
        let years: BTreeSet<i32> = self.worksheets.keys().map(|p| p.year()).collect();
        Ok(years.into_iter().collect())
    }

    async fn worksheet(&self, period: Period) -> Result<Option<Table>> {
        Ok(self.worksheets.get(&period).cloned())
    }
}

/// Ingests every worksheet of `year`. Months without a worksheet are left out of the `Year`.
///
/// # Errors
/// - The ledger cannot be read.
/// - A worksheet's header does not match `variant`.
pub async fn load_year(
    ledger: &dyn Ledger,
    year: i32,
    variant: SchemaVariant,
) -> Result<(Year, Vec<SourcedDiagnostic>)> {
    let mut loaded = Year::new(year)?;
    let mut diagnostics = Vec::new();
    for month in 1..=12 {
        let period = Period::new(year, month)?;
        let table = match ledger.worksheet(period).await? {
            Some(table) => table,
            None => continue,
        };
        let ingested = ingest_worksheet(table, variant, period)
            .with_context(|| format!("Unable to ingest the worksheet for {period}"))?;
        let (month, found) = ingested.into_parts();
        loaded.insert(month)?;
        diagnostics.extend(found.into_iter().map(|d| (period, d)));
    }
    debug!(
        "Loaded {} months of {year} with {} diagnostics",
        loaded.months().len(),
        diagnostics.len()
    );
    Ok((loaded, diagnostics))
}

/// Ingests every year in the ledger, using `variant` to choose each year's layout.
pub async fn load_finances<F>(
    ledger: &dyn Ledger,
    variant: F,
) -> Result<(Finances, Vec<SourcedDiagnostic>)>
where
    F: Fn(i32) -> SchemaVariant,
{
    let mut finances = Finances::new();
    let mut diagnostics = Vec::new();
    for year in ledger.years().await? {
        let (loaded, found) = load_year(ledger, year, variant(year)).await?;
        finances.insert(loaded)?;
        diagnostics.extend(found);
    }
    Ok((finances, diagnostics))
}
