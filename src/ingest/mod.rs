//! Turns the raw rows of a monthly worksheet into a [`Month`] of transactions.
//!
//! A worksheet is never rejected because of a bad row. Each row either becomes a transaction,
//! changes the category applied to the rows below it, or is skipped; anything worth knowing is
//! recorded as a [`Diagnostic`]. The only error returned to the caller is a [`HeaderMismatch`],
//! which means the wrong [`SchemaVariant`] was chosen for the worksheet.

mod classify;
mod layout;

use crate::model::{Category, Month, Period, UnknownCategory, UnknownTransactionType};
use crate::Result;
use classify::{classify_row, Classified, Note};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

pub use layout::{AmountColumns, CategorySource, DatePolicy, Layout, SchemaVariant};

/// Why a row could not be turned into a transaction.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("unknown category '{0}'")]
    UnresolvedCategory(String),
    #[error("unknown transaction type '{0}'")]
    UnresolvedTransactionType(String),
    #[error("invalid row: {0}")]
    InvalidRow(String),
    #[error("'{0}' is not a date")]
    DateParse(String),
    #[error("'{0}' is not an amount")]
    InvalidAmount(String),
}

impl RowError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            RowError::UnresolvedCategory(_) => DiagnosticKind::UnresolvedCategory,
            RowError::UnresolvedTransactionType(_) => DiagnosticKind::UnresolvedTransactionType,
            RowError::InvalidRow(_) => DiagnosticKind::InvalidRow,
            RowError::DateParse(_) => DiagnosticKind::DateParseFailure,
            RowError::InvalidAmount(_) => DiagnosticKind::InvalidAmount,
        }
    }
}

impl From<UnknownCategory> for RowError {
    fn from(e: UnknownCategory) -> Self {
        RowError::UnresolvedCategory(e.0)
    }
}

impl From<UnknownTransactionType> for RowError {
    fn from(e: UnknownTransactionType) -> Self {
        RowError::UnresolvedTransactionType(e.0)
    }
}

/// The worksheet's first row is not the header its layout requires.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("The {variant} layout expects the header {expected:?} but the worksheet has {found:?}")]
pub struct HeaderMismatch {
    pub variant: SchemaVariant,
    pub expected: Vec<String>,
    pub found: Vec<String>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Debug,
    Warning,
    Error,
}

serde_plain::derive_display_from_serialize!(Severity);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnresolvedCategory,
    UnresolvedTransactionType,
    InvalidRow,
    DateParseFailure,
    InvalidAmount,
    /// The transaction was kept but its date is far from the worksheet's month.
    DateOutOfRange,
    /// The transaction was kept; both credit and debit were filled in.
    AmountConflict,
    /// The transaction was kept with the first day of the month as its date.
    DateDefaulted,
    /// The row set the category for the rows below it.
    CategoryHeader,
    BlankRow,
}

serde_plain::derive_display_from_serialize!(DiagnosticKind);

/// An observation about one row of a worksheet.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Diagnostic {
    /// Index of the row in the worksheet, where the header row is 0.
    row: usize,
    severity: Severity,
    kind: DiagnosticKind,
    message: String,
    raw: Vec<String>,
}

impl Diagnostic {
    fn new(
        row: usize,
        severity: Severity,
        kind: DiagnosticKind,
        message: impl Into<String>,
        raw: &[String],
    ) -> Self {
        Self {
            row,
            severity,
            kind,
            message: message.into(),
            raw: raw.to_vec(),
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn raw(&self) -> &[String] {
        &self.raw
    }

    fn trace(&self) {
        match self.severity {
            Severity::Debug => debug!("Row {}: {} {:?}", self.row, self.message, self.raw),
            Severity::Warning => warn!("Row {}: {} {:?}", self.row, self.message, self.raw),
            Severity::Error => error!("Skipping row {}: {} {:?}", self.row, self.message, self.raw),
        }
    }
}

/// The result of ingesting one worksheet.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Ingested {
    month: Month,
    diagnostics: Vec<Diagnostic>,
}

impl Ingested {
    pub fn month(&self) -> &Month {
        &self.month
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics at or above `severity`.
    pub fn diagnostics_at(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity() >= severity)
    }

    pub fn into_parts(self) -> (Month, Vec<Diagnostic>) {
        (self.month, self.diagnostics)
    }
}

/// Ingests the rows of one worksheet, whose first row is its header, into the `Month` described
/// by `period`.
///
/// The category carried from section header rows starts out unset on every call.
///
/// # Errors
/// - [`HeaderMismatch`] when the layout requires a specific header and the first row differs.
/// - An empty table is not an error; it gives an empty `Month`.
pub fn ingest_worksheet<S, R, I>(rows: I, variant: SchemaVariant, period: Period) -> Result<Ingested>
where
    S: Into<String>,
    R: IntoIterator<Item = S>,
    I: IntoIterator<Item = R>,
{
    let layout = variant.layout();
    let month = Month::new(period.month())?;
    let mut rows = rows
        .into_iter()
        .map(|row| row.into_iter().map(Into::into).collect::<Vec<String>>());

    match rows.next() {
        Some(header) => check_header(variant, layout, &header)?,
        None => {
            debug!("Worksheet for {period} is empty");
            return Ok(Ingested {
                month,
                diagnostics: Vec::new(),
            });
        }
    }

    let done = rows
        .enumerate()
        .map(|(ix, row)| (ix + 1, row))
        .fold(Accumulator::new(month), |acc, (ix, row)| {
            acc.step(layout, period, ix, row)
        });

    debug!(
        "Ingested {} transactions for {period} using the {variant} layout, {} diagnostics",
        done.month.len(),
        done.diagnostics.len()
    );
    Ok(Ingested {
        month: done.month,
        diagnostics: done.diagnostics,
    })
}

fn check_header(variant: SchemaVariant, layout: &Layout, header: &[String]) -> Result<()> {
    let expected = match layout.header {
        Some(expected) => expected,
        None => {
            trace!("Not checking header {header:?} for the {variant} layout");
            return Ok(());
        }
    };
    // The sheets API drops trailing empty cells, and exports sometimes pad them.
    let found = match header.iter().rposition(|h| !h.is_empty()) {
        Some(last) => &header[..=last],
        None => &header[..0],
    };
    if found.iter().map(String::as_str).ne(expected.iter().copied()) {
        return Err(HeaderMismatch {
            variant,
            expected: expected.iter().map(|s| s.to_string()).collect(),
            found: header.to_vec(),
        }
        .into());
    }
    Ok(())
}

/// State threaded through the rows of one worksheet.
struct Accumulator {
    current_category: Option<Category>,
    month: Month,
    diagnostics: Vec<Diagnostic>,
}

impl Accumulator {
    fn new(month: Month) -> Self {
        Self {
            current_category: None,
            month,
            diagnostics: Vec::new(),
        }
    }

    fn step(mut self, layout: &Layout, period: Period, ix: usize, row: Vec<String>) -> Self {
        match classify_row(layout, period, self.current_category, &row) {
            Classified::Blank => {
                self.report(Diagnostic::new(
                    ix,
                    Severity::Debug,
                    DiagnosticKind::BlankRow,
                    "blank row",
                    &row,
                ));
            }
            Classified::Header(category) => {
                self.current_category = Some(category);
                self.report(Diagnostic::new(
                    ix,
                    Severity::Debug,
                    DiagnosticKind::CategoryHeader,
                    format!("category set to {category}"),
                    &row,
                ));
            }
            Classified::Transaction(transaction, notes) => {
                for Note {
                    severity,
                    kind,
                    message,
                } in notes
                {
                    self.report(Diagnostic::new(ix, severity, kind, message, &row));
                }
                self.month.push(transaction);
            }
            Classified::Skipped(e) => {
                self.report(Diagnostic::new(
                    ix,
                    Severity::Error,
                    e.kind(),
                    e.to_string(),
                    &row,
                ));
            }
        }
        self
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        diagnostic.trace();
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn period(y: i32, m: u32) -> Period {
        Period::new(y, m).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn kinds(ingested: &Ingested) -> Vec<DiagnosticKind> {
        ingested.diagnostics().iter().map(|d| d.kind()).collect()
    }

    #[test]
    fn test_current_layout_end_to_end() {
        let table = vec![
            vec!["Date", "Type", "Category", "Description", "Amount", "Note"],
            vec!["03/01/2024", "POS", "shopping", "Tesco", "-45.20", "weekly shop"],
        ];
        let ingested = ingest_worksheet(table, SchemaVariant::Current, period(2024, 1)).unwrap();
        let month = ingested.month();
        assert_eq!(month.index(), 1);
        assert_eq!(month.len(), 1);
        let t = &month.transactions()[0];
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(t.transaction_type(), TransactionType::Pos);
        assert_eq!(t.category(), Category::Shopping);
        assert_eq!(t.amount().unwrap().value(), dec("-45.20"));
        assert!(ingested.diagnostics().is_empty());
    }

    #[test]
    fn test_old_layout_end_to_end() {
        let table = vec![
            vec!["Date", "Type", "Description", "In", "Out", "Note"],
            vec!["Bills", "", "", "", "", ""],
            vec!["05/03/2020", "DD", "Energy supplier", "89.50", "", "monthly"],
        ];
        let ingested = ingest_worksheet(table, SchemaVariant::Old, period(2020, 3)).unwrap();
        assert_eq!(kinds(&ingested), vec![DiagnosticKind::CategoryHeader]);
        let t = &ingested.month().transactions()[0];
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2020, 3, 5).unwrap());
        assert_eq!(t.transaction_type(), TransactionType::Dd);
        assert_eq!(t.category(), Category::Bills);
        assert_eq!(t.amount().unwrap().value(), dec("89.50"));
    }

    #[test]
    fn test_oldest_layout_end_to_end() {
        let table = vec![
            vec!["Type", "Description", "In", "Out", "Note", "Date"],
            vec!["Cash", "", "", "", "", ""],
            vec!["ATM", "Withdrawal", "50.00", "", "note", ""],
        ];
        let ingested = ingest_worksheet(table, SchemaVariant::Oldest, period(2017, 6)).unwrap();
        let month = ingested.month();
        assert_eq!(month.len(), 1);
        assert_eq!(
            month.transactions()[0].date(),
            NaiveDate::from_ymd_opt(2017, 6, 1).unwrap()
        );
        assert_eq!(month.transactions()[0].category(), Category::Cash);
        assert_eq!(
            kinds(&ingested),
            vec![DiagnosticKind::CategoryHeader, DiagnosticKind::DateDefaulted]
        );
    }

    #[test]
    fn test_oldest_type_codes_keep_their_section() {
        let table = vec![
            vec!["Type", "Description", "In", "Out", "Note", "Date"],
            vec!["Shopping", "", "", "", "", ""],
            vec!["Card payment", "Tesco", "", "12.00", "", ""],
            vec!["Transfer", "To savings", "", "100.00", "", ""],
            vec!["POS", "Boots", "", "5.00", "", ""],
        ];
        let ingested = ingest_worksheet(table, SchemaVariant::Oldest, period(2017, 6)).unwrap();
        let month = ingested.month();
        assert_eq!(month.len(), 3);
        assert!(month
            .transactions()
            .iter()
            .all(|t| t.category() == Category::Shopping));
        assert_eq!(month.total(Category::Shopping), dec("-117.00"));
        assert!(!kinds(&ingested)[1..].contains(&DiagnosticKind::CategoryHeader));
    }

    #[test]
    fn test_unknown_label_before_header_does_not_stop_ingestion() {
        let table = vec![
            vec!["Date", "Type", "Description", "In", "Out", "Note"],
            vec!["gadgets", "", "", "", "", ""],
            vec!["Shopping", "", "", "", "", ""],
            vec!["07/03/2020", "POS", "Shoes", "", "60.00", ""],
        ];
        let ingested = ingest_worksheet(table, SchemaVariant::Old, period(2020, 3)).unwrap();
        let first = &ingested.diagnostics()[0];
        assert_eq!(first.row(), 1);
        assert_eq!(first.kind(), DiagnosticKind::InvalidRow);
        assert_eq!(first.severity(), Severity::Error);
        assert!(first.message().contains("gadgets"));
        assert_eq!(first.raw()[0], "gadgets");

        let month = ingested.month();
        assert_eq!(month.len(), 1);
        assert_eq!(month.transactions()[0].category(), Category::Shopping);
        assert_eq!(month.transactions()[0].amount().unwrap().value(), dec("-60.00"));
    }

    #[test]
    fn test_category_does_not_carry_across_worksheets() {
        let first = vec![
            vec!["Date", "Type", "Description", "In", "Out", "Note"],
            vec!["Shopping", "", "", "", "", ""],
            vec!["07/03/2020", "POS", "Shoes", "", "60.00", ""],
        ];
        let second = vec![
            vec!["Date", "Type", "Description", "In", "Out", "Note"],
            vec!["02/04/2020", "POS", "Socks", "", "6.00", ""],
        ];
        let a = ingest_worksheet(first, SchemaVariant::Old, period(2020, 3)).unwrap();
        assert_eq!(a.month().len(), 1);
        let b = ingest_worksheet(second, SchemaVariant::Old, period(2020, 4)).unwrap();
        assert!(b.month().is_empty());
        assert_eq!(kinds(&b), vec![DiagnosticKind::InvalidRow]);
    }

    #[test]
    fn test_sections_switch_category() {
        let table = vec![
            vec!["Date", "Type", "Description", "In", "Out", "Note"],
            vec!["Income", "", "", "", "", ""],
            vec!["01/05/2021", "BAC", "Salary", "2,500.00", "", ""],
            vec!["", "", "", "", "", ""],
            vec!["Food, cafes, pub", "", "", "", "", ""],
            vec!["02/05/2021", "POS", "Cafe", "", "3.40", ""],
            vec!["03/05/2021", "POS", "Pub", "", "12.00", ""],
        ];
        let ingested = ingest_worksheet(table, SchemaVariant::Old, period(2021, 5)).unwrap();
        let month = ingested.month();
        assert_eq!(month.len(), 3);
        assert_eq!(month.total(Category::Income), dec("2500.00"));
        assert_eq!(month.total(Category::FoodAndDrink), dec("-15.40"));
        assert_eq!(
            kinds(&ingested),
            vec![
                DiagnosticKind::CategoryHeader,
                DiagnosticKind::BlankRow,
                DiagnosticKind::CategoryHeader
            ]
        );
        assert_eq!(ingested.diagnostics()[1].row(), 3);
    }

    #[test]
    fn test_bad_rows_are_reported_and_skipped() {
        let table = vec![
            vec!["Date", "Type", "Category", "Description", "Amount", "Note"],
            vec!["03/01/2024", "XYZ", "shopping", "Tesco", "-45.20", ""],
            vec!["someday", "POS", "shopping", "Tesco", "-45.20", ""],
            vec!["04/01/2024", "POS", "gadgets", "Phone", "-300", ""],
            vec!["05/01/2024", "POS", "shopping", "Boots", "a fiver", ""],
            vec!["06/07/2024", "POS", "shopping", "Late entry", "-1.00", ""],
            vec!["07/01/2024", "POS", "shopping", "Argos", "-9.99", ""],
        ];
        let ingested = ingest_worksheet(table, SchemaVariant::Current, period(2024, 1)).unwrap();
        assert_eq!(
            kinds(&ingested),
            vec![
                DiagnosticKind::UnresolvedTransactionType,
                DiagnosticKind::DateParseFailure,
                DiagnosticKind::UnresolvedCategory,
                DiagnosticKind::InvalidAmount,
                DiagnosticKind::DateOutOfRange,
            ]
        );
        assert_eq!(ingested.month().len(), 2);
        assert_eq!(ingested.diagnostics_at(Severity::Error).count(), 4);
        assert_eq!(ingested.diagnostics_at(Severity::Warning).count(), 5);
    }

    #[test]
    fn test_header_mismatch_is_fatal() {
        let table = vec![
            vec!["Date", "Type", "Description", "Amount", "Note"],
            vec!["03/01/2024", "POS", "Tesco", "-45.20", ""],
        ];
        let err = ingest_worksheet(table, SchemaVariant::Current, period(2024, 1)).unwrap_err();
        let mismatch = err.downcast_ref::<HeaderMismatch>().unwrap();
        assert_eq!(mismatch.variant, SchemaVariant::Current);
        assert_eq!(mismatch.found.len(), 5);
    }

    #[test]
    fn test_header_trailing_empty_cells() {
        let table = vec![vec![
            "Date",
            "Type",
            "Category",
            "Description",
            "Amount",
            "Note",
            "",
            "",
        ]];
        let ingested = ingest_worksheet(table, SchemaVariant::Current, period(2024, 1)).unwrap();
        assert!(ingested.month().is_empty());
    }

    #[test]
    fn test_empty_worksheet() {
        let table: Vec<Vec<String>> = Vec::new();
        let ingested = ingest_worksheet(table, SchemaVariant::Current, period(2024, 2)).unwrap();
        assert_eq!(ingested.month().index(), 2);
        assert!(ingested.month().is_empty());
        assert!(ingested.diagnostics().is_empty());
    }

    #[test]
    fn test_old_layouts_ignore_header() {
        let table = vec![
            vec!["anything at all"],
            vec!["Misc"],
            vec!["09/02/2019", "ONL", "Gift", "", "20"],
        ];
        let ingested = ingest_worksheet(table, SchemaVariant::Old, period(2019, 2)).unwrap();
        assert_eq!(ingested.month().len(), 1);
    }
}
