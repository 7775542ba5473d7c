use crate::model::{Category, Month};
use crate::Result;
use anyhow::bail;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The months of one ledger spreadsheet. Months may be missing; at most one per calendar month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Year {
    index: i32,
    months: Vec<Month>,
}

impl Year {
    pub fn new(index: i32) -> Result<Self> {
        if !(1000..=9999).contains(&index) {
            bail!("A year index must have four digits, got {index}");
        }
        Ok(Self {
            index,
            months: Vec::new(),
        })
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    /// Adds a month, keeping the months sorted by index.
    pub fn insert(&mut self, month: Month) -> Result<()> {
        match self
            .months
            .binary_search_by_key(&month.index(), |m| m.index())
        {
            Ok(_) => bail!(
                "Month {} has already been added to year {}",
                month.index(),
                self.index
            ),
            Err(pos) => self.months.insert(pos, month),
        }
        Ok(())
    }

    pub fn months(&self) -> &[Month] {
        &self.months
    }

    pub fn month(&self, index: u32) -> Option<&Month> {
        self.months.iter().find(|m| m.index() == index)
    }

    pub fn total(&self, category: Category) -> Decimal {
        self.months.iter().map(|m| m.total(category)).sum()
    }

    /// The monthly average for `category` over the months present in this year.
    pub fn average(&self, category: Category) -> Decimal {
        average(self.total(category), self.months.len())
    }

    pub fn totals(&self) -> BTreeMap<Category, Decimal> {
        merge(self.months.iter().map(|m| m.totals()))
    }

    pub fn balance(&self) -> Decimal {
        self.months.iter().map(|m| m.balance()).sum()
    }
}

pub(super) fn average(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count)
    }
}

pub(super) fn merge(
    maps: impl Iterator<Item = BTreeMap<Category, Decimal>>,
) -> BTreeMap<Category, Decimal> {
    let mut merged = BTreeMap::new();
    for map in maps {
        for (category, total) in map {
            *merged.entry(category).or_insert(Decimal::ZERO) += total;
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Transaction, TransactionType};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn month(index: u32, amounts: &[(Category, &str)]) -> Month {
        let mut m = Month::new(index).unwrap();
        for (category, amount) in amounts {
            m.push(Transaction::new(
                NaiveDate::from_ymd_opt(2021, index, 1).unwrap(),
                TransactionType::Dd,
                *category,
                "",
                Some(Amount::from_str(amount).unwrap()),
                "",
            ));
        }
        m
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_year_index() {
        assert!(Year::new(21).is_err());
        assert_eq!(Year::new(2021).unwrap().index(), 2021);
    }

    #[test]
    fn test_months_are_sparse_and_sorted() {
        let mut y = Year::new(2021).unwrap();
        y.insert(month(5, &[])).unwrap();
        y.insert(month(2, &[])).unwrap();
        assert!(y.insert(month(5, &[])).is_err());
        let indexes: Vec<u32> = y.months().iter().map(|m| m.index()).collect();
        assert_eq!(indexes, vec![2, 5]);
        assert!(y.month(3).is_none());
        assert!(y.month(2).is_some());
    }

    #[test]
    fn test_year_queries() {
        let mut y = Year::new(2021).unwrap();
        y.insert(month(1, &[(Category::Bills, "-100"), (Category::Income, "1000")]))
            .unwrap();
        y.insert(month(2, &[(Category::Bills, "-50")])).unwrap();
        y.insert(month(3, &[])).unwrap();

        assert_eq!(y.total(Category::Bills), dec("-150"));
        assert_eq!(y.average(Category::Bills), dec("-50"));
        assert_eq!(y.balance(), dec("850"));
        assert_eq!(y.totals()[&Category::Income], dec("1000"));
    }

    #[test]
    fn test_average_of_nothing() {
        let y = Year::new(2021).unwrap();
        assert_eq!(y.average(Category::Bills), Decimal::ZERO);
    }
}
