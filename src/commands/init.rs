use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, the ledger directory and a default `config.json`.
///
/// # Errors
/// - Returns an error if any file operations fail or if `finances_home` already has a config.
pub async fn init(finances_home: &Path) -> Result<Out<()>> {
    let config = Config::create(finances_home)
        .await
        .context("Unable to create the data directory and config")?;
    Ok(format!(
        "Created {}; save worksheets as {}/<year>/<MM>.csv",
        config.config_path().display(),
        config.ledger_dir().display()
    )
    .into())
}
