use crate::model::{Category, Transaction};
use crate::Result;
use anyhow::bail;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The transactions of one worksheet, in the order they were read.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Month {
    /// 1-based calendar month.
    index: u32,
    transactions: Vec<Transaction>,
}

impl Month {
    pub fn new(index: u32) -> Result<Self> {
        if !(1..=12).contains(&index) {
            bail!("A month index must be between 1 and 12, got {index}");
        }
        Ok(Self {
            index,
            transactions: Vec::new(),
        })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn push(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Groups the transactions by category, each group keeping the order of the worksheet.
    pub fn by_category(&self) -> BTreeMap<Category, Vec<&Transaction>> {
        let mut map: BTreeMap<Category, Vec<&Transaction>> = BTreeMap::new();
        for t in &self.transactions {
            map.entry(t.category()).or_default().push(t);
        }
        map
    }

    /// Sum of the amounts in `category`. Transactions without an amount count as nothing.
    pub fn total(&self, category: Category) -> Decimal {
        sum(self
            .transactions
            .iter()
            .filter(|t| t.category() == category))
    }

    /// Totals for each category that has at least one transaction.
    pub fn totals(&self) -> BTreeMap<Category, Decimal> {
        let mut map = BTreeMap::new();
        for t in &self.transactions {
            let entry = map.entry(t.category()).or_insert(Decimal::ZERO);
            *entry += value(t);
        }
        map
    }

    /// Money in minus money out.
    pub fn balance(&self) -> Decimal {
        sum(self.transactions.iter())
    }

    /// Sum of the positive amounts.
    pub fn income(&self) -> Decimal {
        self.transactions
            .iter()
            .map(value)
            .filter(|v| v.is_sign_positive())
            .sum()
    }

    /// Sum of the negative amounts (a negative number, or zero).
    pub fn spending(&self) -> Decimal {
        self.transactions
            .iter()
            .map(value)
            .filter(|v| v.is_sign_negative())
            .sum()
    }

    /// The transactions as `Date, Type, Category, Description, Amount, Note` rows, grouped by
    /// category.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.by_category()
            .values()
            .flatten()
            .map(|t| t.to_row())
            .collect()
    }
}

fn value(t: &Transaction) -> Decimal {
    t.amount().map(|a| a.value()).unwrap_or_default()
}

fn sum<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> Decimal {
    transactions.map(value).sum()
}
