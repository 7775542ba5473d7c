//! Decides what a single worksheet row is and, for transaction rows, builds the `Transaction`.

use crate::ingest::layout::{AmountColumns, CategorySource, DatePolicy, Layout};
use crate::ingest::{DiagnosticKind, RowError, Severity};
use crate::model::{
    both_filled, parse_date, resolve_amount, resolve_single_amount, validate_date, Category,
    Period, Transaction, TransactionType,
};

/// The outcome of looking at one row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Classified {
    /// Nothing but whitespace.
    Blank,
    /// A section label; the rows that follow belong to this category.
    Header(Category),
    /// A transaction, along with anything odd noticed while reading it.
    Transaction(Transaction, Vec<Note>),
    /// Not usable as a transaction.
    Skipped(RowError),
}

/// Something worth reporting about a row that was still accepted.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct Note {
    pub(crate) severity: Severity,
    pub(crate) kind: DiagnosticKind,
    pub(crate) message: String,
}

/// Classifies `row` given the category carried over from the rows above it.
pub(crate) fn classify_row(
    layout: &Layout,
    period: Period,
    current_category: Option<Category>,
    row: &[String],
) -> Classified {
    if row.iter().all(|c| c.trim().is_empty()) {
        return Classified::Blank;
    }

    let carried = match layout.category {
        CategorySource::HeaderRows => {
            let label = cell(row, 0);
            // In the oldest layout column 0 is also the type column, and codes like "Transfer"
            // read as labels, so a header row must have no transaction data.
            if is_section_row(layout, row) {
                if let Ok(category) = Category::from_label(label) {
                    return Classified::Header(category);
                }
            }
            match current_category {
                Some(category) => Some(category),
                None => {
                    return Classified::Skipped(RowError::InvalidRow(format!(
                        "transaction row before any category header: '{}'",
                        label.trim()
                    )))
                }
            }
        }
        CategorySource::Column(_) => None,
    };

    match build_transaction(layout, period, carried, row) {
        Ok((transaction, notes)) => Classified::Transaction(transaction, notes),
        Err(e) => Classified::Skipped(e),
    }
}

fn build_transaction(
    layout: &Layout,
    period: Period,
    carried: Option<Category>,
    row: &[String],
) -> Result<(Transaction, Vec<Note>), RowError> {
    let missing: Vec<String> = layout
        .required
        .iter()
        .filter(|&&ix| cell(row, ix).trim().is_empty())
        .map(|ix| ix.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(RowError::InvalidRow(format!(
            "required column(s) {} empty",
            missing.join(", ")
        )));
    }

    let category = match (layout.category, carried) {
        (CategorySource::Column(ix), _) => Category::from_label(cell(row, ix))?,
        (CategorySource::HeaderRows, Some(category)) => category,
        (CategorySource::HeaderRows, None) => {
            return Err(RowError::InvalidRow(String::from(
                "no category header seen yet",
            )))
        }
    };

    let mut notes = Vec::new();

    let date_text = cell(row, layout.date);
    let date = match (parse_date(date_text), layout.date_policy) {
        (Ok(date), _) => {
            notes.extend(validate_date(date, period).into_iter().map(|anomaly| Note {
                severity: Severity::Warning,
                kind: DiagnosticKind::DateOutOfRange,
                message: format!("{date} is outside {period}: {anomaly}"),
            }));
            date
        }
        (Err(e), DatePolicy::Strict) => return Err(e),
        (Err(_), DatePolicy::FirstOfMonth) => {
            let fallback = period.first_day();
            notes.push(Note {
                severity: Severity::Debug,
                kind: DiagnosticKind::DateDefaulted,
                message: format!(
                    "no usable date in '{}', using {fallback}",
                    date_text.trim()
                ),
            });
            fallback
        }
    };

    let transaction_type = TransactionType::from_code(cell(row, layout.transaction_type))?;

    let amount = match layout.amount {
        AmountColumns::CreditDebit { credit, debit } => {
            let (credit, debit) = (cell(row, credit), cell(row, debit));
            if both_filled(credit, debit) {
                notes.push(Note {
                    severity: Severity::Warning,
                    kind: DiagnosticKind::AmountConflict,
                    message: format!(
                        "both credit '{}' and debit '{}' are filled, using the credit",
                        credit.trim(),
                        debit.trim()
                    ),
                });
            }
            resolve_amount(credit, debit)?
        }
        AmountColumns::Signed(ix) => resolve_single_amount(cell(row, ix))?,
    };

    let transaction = Transaction::new(
        date,
        transaction_type,
        category,
        cell(row, layout.description).trim(),
        amount,
        cell(row, layout.note).trim(),
    );
    Ok((transaction, notes))
}

fn is_section_row(layout: &Layout, row: &[String]) -> bool {
    layout
        .data_columns()
        .into_iter()
        .all(|ix| cell(row, ix).trim().is_empty())
}

/// Rows from a sheet are often ragged; a missing cell reads as empty.
fn cell(row: &[String], ix: usize) -> &str {
    row.get(ix).map(String::as_str).unwrap_or_default()
}
