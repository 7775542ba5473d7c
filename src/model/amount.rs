//! Amount type for handling monetary values written by hand in the ledger.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may or may not include a pound sign, thousands separators or a trailing `CR` marker. It also
//! resolves a signed amount from the credit/debit column pairs used by the older worksheets.

use crate::ingest::RowError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents how pound amounts were (or should be) formatted.
///
/// # Examples
///  - `AmountFormat{ pound: true, commas: true }` -> `-£60,000.00`
///  - `AmountFormat{ pound: false, commas: true }` -> `-60,000.00`
///  - `AmountFormat{ pound: false, commas: false }` -> `-60000.00`
///  - `AmountFormat{ pound: true, commas: false }` -> `-£60000.00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountFormat {
    /// Whether a pound sign is present in the formatting.
    pound: bool,
    /// Whether commas are present as thousands separators in the formatting.
    commas: bool,
}

impl Default for AmountFormat {
    fn default() -> Self {
        DEFAULT_FORMAT
    }
}

/// The default format has a pound sign and commas: e.g. `-£60,000.00`.
const DEFAULT_FORMAT: AmountFormat = AmountFormat {
    pound: true,
    commas: true,
};

const POUND: char = '£';

/// Represents a sterling amount.
///
/// Formatting is considered significant for the purposes of equality, so for numeric comparisons,
/// you should access the `Decimal` value and use that.
///
/// # Examples
///
/// ```
/// # use finances::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-£1,250.00").unwrap();
/// assert_eq!(amount.to_string(), "-£1,250.00");
///
/// let credit = Amount::from_str("50.00CR").unwrap();
/// assert_eq!(credit.to_string(), "50.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    /// The parsed numerical value.
    value: Decimal,
    /// The way the numerical value was parsed from, or should be written to, a `String`.
    format: AmountFormat,
}

impl Amount {
    /// Creates a new Amount from a Decimal value with default `String` formatting.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: DEFAULT_FORMAT,
        }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value().is_sign_positive()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }

    /// The amount as money going out: always negative or zero, keeping its format.
    pub fn as_debit(&self) -> Self {
        Self {
            value: -self.value.abs(),
            format: self.format,
        }
    }
}

/// An error that can occur when parsing ledger text into an `Amount`.
pub struct AmountError {
    text: String,
    source: Option<rust_decimal::Error>,
}

impl AmountError {
    /// The text that failed to parse.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmountError")
            .field("text", &self.text)
            .field("source", &self.source)
            .finish()
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(e) => write!(f, "'{}' is not an amount: {e}", self.text),
            None => write!(f, "'{}' is not an amount", self.text),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn Error + 'static))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |source| AmountError {
            text: s.to_string(),
            source,
        };

        let mut text = s.trim();
        if text.is_empty() {
            return Err(fail(None));
        }

        // Bank statements mark credits with a trailing "CR".
        let split = text.len().saturating_sub(2);
        if let (Some(head), Some(suffix)) = (text.get(..split), text.get(split..)) {
            if suffix.eq_ignore_ascii_case("cr") {
                text = head.trim_end();
            }
        }

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, text),
        };

        // "£-5.00" shows up as often as "-£5.00"
        let (pound, unsigned, negative) = match unsigned.strip_prefix(POUND) {
            Some(rest) => match rest.trim_start().strip_prefix('-') {
                Some(after_minus) if !negative => (true, after_minus, true),
                _ => (true, rest.trim_start(), negative),
            },
            None => (false, unsigned, negative),
        };

        let without_commas = unsigned.replace(',', "");
        let commas = without_commas.len() < unsigned.len();
        if without_commas.is_empty() {
            return Err(fail(None));
        }

        let value = Decimal::from_str(&without_commas).map_err(|e| fail(Some(e)))?;
        Ok(Amount {
            value: if negative { -value } else { value },
            format: AmountFormat { pound, commas },
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, num) = if self.is_negative() {
            (String::from("-"), self.value().abs())
        } else {
            (String::new(), self.value())
        };

        let pound = if self.format.pound {
            String::from(POUND)
        } else {
            String::new()
        };

        if self.format.commas {
            write!(
                f,
                "{sign}{pound}{}",
                format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
            )
        } else {
            write!(f, "{sign}{pound}{num}")
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

/// Resolves a signed amount from the two-column convention of the older worksheets, where the
/// column an amount is written in decides its sign.
///
/// - `credit` non-empty: the amount as written (a credit).
/// - otherwise `debit` non-empty: a debit, always negative, even when the cell already has a
///   minus sign.
/// - otherwise `None`, which is normal for placeholder rows and is not an error.
///
/// When both cells hold something the credit cell wins. Callers that care should check
/// [`both_filled`] and report it.
pub fn resolve_amount(credit: &str, debit: &str) -> Result<Option<Amount>, RowError> {
    if is_filled(credit) {
        parse_cell(credit).map(Some)
    } else if is_filled(debit) {
        parse_cell(debit).map(|a| Some(a.as_debit()))
    } else {
        Ok(None)
    }
}

/// Resolves an amount from a single column whose sign is written in the cell.
pub fn resolve_single_amount(cell: &str) -> Result<Option<Amount>, RowError> {
    if is_filled(cell) {
        parse_cell(cell).map(Some)
    } else {
        Ok(None)
    }
}

/// True when both the credit and the debit cell have content.
pub fn both_filled(credit: &str, debit: &str) -> bool {
    is_filled(credit) && is_filled(debit)
}

fn is_filled(cell: &str) -> bool {
    !cell.trim().is_empty()
}

fn parse_cell(cell: &str) -> Result<Amount, RowError> {
    Amount::from_str(cell).map_err(|e| RowError::InvalidAmount(e.text().to_string()))
}
