use crate::model::TRANSACTION_HEADERS;
use serde::{Deserialize, Serialize};

/// The row layouts the ledger has used over the years.
///
/// Nothing in a worksheet says which layout it uses, so the caller picks one, usually with
/// [`SchemaVariant::for_year`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    /// Before 2018: category header rows, type first, optional date in the last column.
    Oldest,
    /// 2018 to 2023: category header rows, date first, credit and debit columns.
    Old,
    /// 2024 onwards: a category column and a single signed amount column.
    Current,
}

serde_plain::derive_display_from_serialize!(SchemaVariant);
serde_plain::derive_fromstr_from_deserialize!(SchemaVariant);

impl SchemaVariant {
    /// The layout that was in use in `year`.
    pub fn for_year(year: i32) -> Self {
        match year {
            i32::MIN..=2017 => SchemaVariant::Oldest,
            2018..=2023 => SchemaVariant::Old,
            _ => SchemaVariant::Current,
        }
    }

    pub fn layout(&self) -> &'static Layout {
        match self {
            SchemaVariant::Oldest => &OLDEST,
            SchemaVariant::Old => &OLD,
            SchemaVariant::Current => &CURRENT,
        }
    }
}

/// Where a row's category comes from.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CategorySource {
    /// A row whose first cell is a category label starts a section; the rows after it belong to
    /// that category until the next label.
    HeaderRows,
    /// Each row names its category in this column.
    Column(usize),
}

/// What to do when a row's date cell cannot be read.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DatePolicy {
    /// Skip the row.
    Strict,
    /// Use the first day of the worksheet's month.
    FirstOfMonth,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AmountColumns {
    /// The column an amount is written in decides its sign.
    CreditDebit { credit: usize, debit: usize },
    /// The sign is written in the cell.
    Signed(usize),
}

/// Column positions and parsing rules for one [`SchemaVariant`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Layout {
    pub category: CategorySource,
    pub date: usize,
    pub date_policy: DatePolicy,
    pub transaction_type: usize,
    pub description: usize,
    pub amount: AmountColumns,
    pub note: usize,
    /// Columns that must have content for a row to be a transaction.
    pub required: &'static [usize],
    /// When set, the worksheet's first row must be exactly this.
    pub header: Option<&'static [&'static str]>,
}

impl Layout {
    /// The description, amount and date columns, less column 0. A section header row has
    /// nothing in any of them.
    pub fn data_columns(&self) -> Vec<usize> {
        let amount = match self.amount {
            AmountColumns::CreditDebit { credit, debit } => vec![credit, debit],
            AmountColumns::Signed(ix) => vec![ix],
        };
        [self.description, self.date]
            .into_iter()
            .chain(amount)
            .filter(|&ix| ix != 0)
            .collect()
    }
}

const OLDEST: Layout = Layout {
    category: CategorySource::HeaderRows,
    date: 5,
    date_policy: DatePolicy::FirstOfMonth,
    transaction_type: 0,
    description: 1,
    amount: AmountColumns::CreditDebit {
        credit: 2,
        debit: 3,
    },
    note: 4,
    required: &[],
    header: None,
};

const OLD: Layout = Layout {
    category: CategorySource::HeaderRows,
    date: 0,
    date_policy: DatePolicy::Strict,
    transaction_type: 1,
    description: 2,
    amount: AmountColumns::CreditDebit {
        credit: 3,
        debit: 4,
    },
    note: 5,
    required: &[0],
    header: None,
};

const CURRENT: Layout = Layout {
    category: CategorySource::Column(2),
    date: 0,
    date_policy: DatePolicy::Strict,
    transaction_type: 1,
    description: 3,
    amount: AmountColumns::Signed(4),
    note: 5,
    required: &[0, 2],
    header: Some(&TRANSACTION_HEADERS),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_year() {
        assert_eq!(SchemaVariant::for_year(2016), SchemaVariant::Oldest);
        assert_eq!(SchemaVariant::for_year(2017), SchemaVariant::Oldest);
        assert_eq!(SchemaVariant::for_year(2018), SchemaVariant::Old);
        assert_eq!(SchemaVariant::for_year(2023), SchemaVariant::Old);
        assert_eq!(SchemaVariant::for_year(2024), SchemaVariant::Current);
        assert_eq!(SchemaVariant::for_year(2030), SchemaVariant::Current);
    }

    #[test]
    fn test_only_current_checks_its_header() {
        assert!(SchemaVariant::Oldest.layout().header.is_none());
        assert!(SchemaVariant::Old.layout().header.is_none());
        assert_eq!(
            SchemaVariant::Current.layout().header.unwrap(),
            &["Date", "Type", "Category", "Description", "Amount", "Note"]
        );
    }

    #[test]
    fn test_data_columns() {
        assert_eq!(SchemaVariant::Oldest.layout().data_columns(), vec![1, 5, 2, 3]);
        // The date is column 0, where the label goes.
        assert_eq!(SchemaVariant::Old.layout().data_columns(), vec![2, 3, 4]);
        assert_eq!(SchemaVariant::Current.layout().data_columns(), vec![3, 4]);
    }

    #[test]
    fn test_oldest_requires_nothing() {
        assert!(SchemaVariant::Oldest.layout().required.is_empty());
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(SchemaVariant::Oldest.to_string(), "oldest");
        assert_eq!("current".parse::<SchemaVariant>().unwrap(), SchemaVariant::Current);
        assert!("newest".parse::<SchemaVariant>().is_err());
    }
}
