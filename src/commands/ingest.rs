use crate::commands::Out;
use crate::ingest::{ingest_worksheet, Ingested, SchemaVariant, Severity};
use crate::model::{Amount, Period};
use crate::source::Ledger;
use crate::{Config, Result};
use anyhow::{anyhow, Context};
use tracing::debug;

/// Ingests the worksheet for `period` and reports its transactions and diagnostics.
///
/// # Arguments
/// - `variant` - The layout to read the worksheet with. `None` uses the configured layout for
///   the year.
///
/// # Errors
/// - The worksheet does not exist or cannot be read.
/// - The worksheet's header does not match the layout.
pub async fn ingest(
    config: &Config,
    ledger: &dyn Ledger,
    period: Period,
    variant: Option<SchemaVariant>,
) -> Result<Out<Ingested>> {
    let variant = variant.unwrap_or_else(|| config.variant(period.year()));
    debug!("Ingesting {period} with the {variant} layout");
    let table = ledger
        .worksheet(period)
        .await?
        .ok_or_else(|| anyhow!("There is no worksheet for {period}"))?;
    let ingested = ingest_worksheet(table, variant, period)
        .with_context(|| format!("Unable to ingest the worksheet for {period}"))?;

    let skipped = ingested.diagnostics_at(Severity::Error).count();
    let warnings = ingested.diagnostics_at(Severity::Warning).count() - skipped;
    let month = ingested.month();
    let message = format!(
        "Ingested {} transactions for {period}, balance {}; {skipped} rows skipped, {warnings} \
        warnings",
        month.len(),
        Amount::new(month.balance()),
    );
    Ok(Out::new(message, ingested))
}
