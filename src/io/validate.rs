//! Structural validation of the input tables.
//!
//! Runs before scoring and fails the build on:
//!
//! - missing required columns (all missing columns of a file reported at once)
//! - records referencing a provider that is not in the providers table

use std::collections::BTreeSet;

use crate::domain::{Provider, Record};
use crate::error::AppError;
use crate::io::ingest::{CsvTable, RawDatasets};

pub const REQUIRED_RECORDS_COLS: &[&str] = &[
    "provider_id",
    "provider_name",
    "system_family",
    "indicator_id",
    "indicator_value",
    "evidence_url",
    "evidence_excerpt",
    "coder_email_or_id",
    "date_coded_utc",
    "last_reviewed_utc",
];

pub const REQUIRED_PROVIDERS_COLS: &[&str] = &[
    "provider_id",
    "provider_name",
    "entity_type",
    "hq_country",
    "provider_website",
    "system_family",
    "license_or_terms",
    "open_weights",
    "model_family_source_url",
    "notes",
    "last_verified_utc",
];

pub const REQUIRED_CODEBOOK_COLS: &[&str] = &[
    "indicator_id",
    "pillar",
    "subpillar",
    "indicator_name",
    "definition",
    "operationalization",
    "allowed_values",
    "evidence_required",
    "coding_instructions",
    "version",
    "last_updated_utc",
];

/// Check every table for its required columns.
pub fn validate_schemas(raw: &RawDatasets) -> Result<(), AppError> {
    for (table, required) in [
        (&raw.records, REQUIRED_RECORDS_COLS),
        (&raw.providers, REQUIRED_PROVIDERS_COLS),
        (&raw.codebook, REQUIRED_CODEBOOK_COLS),
    ] {
        ensure_required_columns_exist(table, required)?;
    }
    Ok(())
}

fn ensure_required_columns_exist(table: &CsvTable, required: &[&str]) -> Result<(), AppError> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !table.has_column(col))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::input(format!(
        "Missing columns in {}: {}",
        table.name,
        missing.join(", ")
    )))
}

/// Every provider referenced by a record must exist in the providers table.
pub fn validate_references(records: &[Record], providers: &[Provider]) -> Result<(), AppError> {
    let known: BTreeSet<&str> = providers.iter().map(|p| p.provider_id.as_str()).collect();
    let missing: BTreeSet<&str> = records
        .iter()
        .map(|r| r.provider_id.as_str())
        .filter(|id| !known.contains(id))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::input(format!(
        "Providers referenced in records missing in providers table: {}",
        missing.into_iter().collect::<Vec<_>>().join(", ")
    )))
}
