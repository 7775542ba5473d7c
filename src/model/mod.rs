//! Types that represent the core data model, such as `Transaction`, `Category` and `Month`.
mod amount;
mod category;
mod date;
mod finances;
mod month;
mod transaction;
mod transaction_type;
mod year;

pub use amount::{
    both_filled, resolve_amount, resolve_single_amount, Amount, AmountError, AmountFormat,
};
pub use category::{Category, LabelRule, MatchKind, UnknownCategory, LABEL_RULES};
pub use date::{parse_date, validate_date, DateAnomaly, Period};
pub use finances::Finances;
pub use month::Month;
pub use transaction::{Transaction, TRANSACTION_HEADERS};
pub use transaction_type::{TransactionType, UnknownTransactionType, TYPE_ALIASES};
pub use year::Year;
