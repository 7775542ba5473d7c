use crate::model::year::{average, merge};
use crate::model::{Category, Year};
use crate::Result;
use anyhow::bail;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every year of the ledger. This is what reports are built from.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Finances {
    years: Vec<Year>,
}

impl Finances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a year, keeping the years sorted by index.
    pub fn insert(&mut self, year: Year) -> Result<()> {
        match self.years.binary_search_by_key(&year.index(), |y| y.index()) {
            Ok(_) => bail!("Year {} has already been added", year.index()),
            Err(pos) => self.years.insert(pos, year),
        }
        Ok(())
    }

    pub fn years(&self) -> &[Year] {
        &self.years
    }

    pub fn year(&self, index: i32) -> Option<&Year> {
        self.years.iter().find(|y| y.index() == index)
    }

    pub fn total(&self, category: Category) -> Decimal {
        self.years.iter().map(|y| y.total(category)).sum()
    }

    /// The monthly average for `category` across every month of every year.
    pub fn average(&self, category: Category) -> Decimal {
        let months = self.years.iter().map(|y| y.months().len()).sum();
        average(self.total(category), months)
    }

    pub fn totals(&self) -> BTreeMap<Category, Decimal> {
        merge(self.years.iter().map(|y| y.totals()))
    }

    pub fn balance(&self) -> Decimal {
        self.years.iter().map(|y| y.balance()).sum()
    }
}
