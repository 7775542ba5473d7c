use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};

/// The bank transaction codes found in the ledger's "Type" column.
///
/// `Unknown` is a real code: the worksheets use it (or leave the cell blank) when the bank export
/// did not say. A code that is not recognised at all is an [`UnknownTransactionType`] instead.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// BACS credit.
    Bac,
    /// Credit card.
    Cc,
    /// Bank charge.
    Chg,
    /// Direct debit.
    Dd,
    /// Outgoing faster payment.
    Fp,
    /// Incoming faster payment.
    Fpib,
    /// Transfer between own accounts.
    Itfib,
    /// Online banking payment.
    Onl,
    /// Card payment at a point of sale.
    Pos,
    /// Cash machine withdrawal.
    Cash,
    /// Cheque.
    Chq,
    /// Interest.
    Int,
    /// Manual correction.
    Cor,
    /// Standing order.
    So,
    Unknown,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

impl TransactionType {
    /// Resolves a code as written in a worksheet. The code is trimmed, upper-cased and has
    /// spaces and hyphens folded to underscores, then looked up in [`TYPE_ALIASES`].
    ///
    /// ```
    /// # use finances::model::TransactionType;
    /// assert_eq!(TransactionType::from_code("dep").unwrap(), TransactionType::Fpib);
    /// assert_eq!(TransactionType::from_code("").unwrap(), TransactionType::Unknown);
    /// assert!(TransactionType::from_code("XYZ").is_err());
    /// ```
    pub fn from_code(code: &str) -> Result<TransactionType, UnknownTransactionType> {
        let normalized: String = code
            .trim()
            .to_uppercase()
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        TYPE_ALIASES
            .iter()
            .find(|(aliases, _)| aliases.contains(&normalized.as_str()))
            .map(|(_, t)| *t)
            .ok_or_else(|| UnknownTransactionType(code.trim().to_string()))
    }
}

/// A transaction code that is not part of the known vocabulary.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct UnknownTransactionType(pub String);

impl Display for UnknownTransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown transaction type '{}'", self.0)
    }
}

impl StdError for UnknownTransactionType {}

/// Every spelling of every code seen across the bank exports, in lookup order.
pub const TYPE_ALIASES: &[(&[&str], TransactionType)] = &[
    (&["BAC", "BACS"], TransactionType::Bac),
    (&["CC"], TransactionType::Cc),
    (&["CHG", "CHARGE"], TransactionType::Chg),
    (&["DD", "DDR", "DIRECT_DEBIT"], TransactionType::Dd),
    (&["FP", "FPO", "FASTER_PAYMENTS_OUTGOING"], TransactionType::Fp),
    (
        &["FPIB", "FPI", "DEP", "FASTER_PAYMENTS_INCOMING"],
        TransactionType::Fpib,
    ),
    (&["ITFIB", "TFR", "TRF", "TRANSFER"], TransactionType::Itfib),
    (&["ONL", "ONLINE"], TransactionType::Onl),
    (&["POS", "DEB", "DEBIT", "CARD_PAYMENT"], TransactionType::Pos),
    (&["ATM", "CSH", "CASH", "CASHPOINT"], TransactionType::Cash),
    (&["CHQ", "CHEQUE"], TransactionType::Chq),
    (&["INT", "INTEREST"], TransactionType::Int),
    (&["COR", "CORRECTION", "ADJ"], TransactionType::Cor),
    (&["SO", "STO", "STANDING_ORDER"], TransactionType::So),
    (&["", "UNKNOWN"], TransactionType::Unknown),
];
