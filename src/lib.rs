//! Reads a personal ledger of monthly worksheets into typed transactions.
//!
//! The ledger's row layout changed over the years. [`ingest::ingest_worksheet`] reads one
//! worksheet with a given [`ingest::SchemaVariant`], and [`source`] loads whole years from a
//! [`source::Ledger`].

pub mod args;
pub mod commands;
mod config;
mod error;
pub mod ingest;
pub mod model;
pub mod source;
mod utils;


pub use config::Config;
pub use error::Error;
pub use error::Result;
