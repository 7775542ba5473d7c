use crate::model::{Amount, Category, TransactionType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A single normalized ledger entry. Once built it does not change.
///
/// `amount` is positive for money coming in and negative for money going out. It is `None` for
/// rows that name a transaction but never had an amount filled in.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    date: NaiveDate,
    transaction_type: TransactionType,
    category: Category,
    description: String,
    amount: Option<Amount>,
    note: String,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        transaction_type: TransactionType,
        category: Category,
        description: impl Into<String>,
        amount: Option<Amount>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            date,
            transaction_type,
            category,
            description: description.into(),
            amount,
            note: note.into(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    /// The values of this transaction in the order of [`TRANSACTION_HEADERS`].
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.format("%d-%m-%Y").to_string(),
            self.transaction_type.to_string(),
            self.category.to_string(),
            self.description.clone(),
            self.amount.map(|a| a.to_string()).unwrap_or_default(),
            self.note.clone(),
        ]
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_row().join(" "))
    }
}

/// The column headers of the current worksheet layout, which is also the shape of
/// [`Transaction::to_row`].
pub const TRANSACTION_HEADERS: [&str; 6] =
    ["Date", "Type", "Category", "Description", "Amount", "Note"];
