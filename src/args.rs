//! These structs provide the CLI interface for the finances CLI.

use crate::ingest::SchemaVariant;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// finances: A command-line tool for reading a personal ledger.
///
/// The ledger is a set of monthly worksheets, saved as CSV files under
/// $FINANCES_HOME/ledger/<year>/<MM>.csv. The row layout of the worksheets changed over the
/// years; each year is read with the layout it was written in.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the ledger directory and the configuration file.
    Init,
    /// Read one monthly worksheet and report its transactions and any problems with its rows.
    Ingest(IngestArgs),
    /// Read the whole ledger, or one year of it, and report totals per category.
    Totals(TotalsArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger and configuration are held. Defaults to ~/finances
    #[arg(long, env = "FINANCES_HOME", default_value_t = default_finances_home())]
    finances_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, finances_home: PathBuf) -> Self {
        Self {
            log_level,
            finances_home: finances_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn finances_home(&self) -> &DisplayPath {
        &self.finances_home
    }
}

/// (Not shown): Args for the `finances ingest` command.
#[derive(Debug, Parser, Clone)]
pub struct IngestArgs {
    /// The year of the worksheet, e.g. 2020
    #[arg(long)]
    year: i32,

    /// The month of the worksheet, 1 through 12
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: u32,

    /// The row layout to read the worksheet with. Defaults to the configured layout for the year.
    #[arg(long)]
    variant: Option<SchemaVariant>,
}

impl IngestArgs {
    pub fn new(year: i32, month: u32, variant: Option<SchemaVariant>) -> Self {
        Self {
            year,
            month,
            variant,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn variant(&self) -> Option<SchemaVariant> {
        self.variant
    }
}

/// (Not shown): Args for the `finances totals` command.
#[derive(Debug, Parser, Clone)]
pub struct TotalsArgs {
    /// Only report this year.
    #[arg(long)]
    year: Option<i32>,
}

impl TotalsArgs {
    pub fn new(year: Option<i32>) -> Self {
        Self { year }
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }
}

fn default_finances_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("finances"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --finances-home or FINANCES_HOME instead of relying on the \
                default finances home directory.",
            );
            PathBuf::from("finances")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
