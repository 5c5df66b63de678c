//! CSV ingest.
//!
//! This module turns the three input CSVs into typed tables:
//!
//! - `ai_records.csv` -> [`Record`]
//! - `ai_providers_and_families.csv` -> [`Provider`]
//! - `ai_codebook.csv` -> [`IndicatorDefinition`]
//!
//! Reading is split from typing so the validator can check the raw header sets
//! first and report every missing column at once. No scoring logic here.
//!
//! Headers and identity cells are trimmed; `indicator_value` is kept verbatim
//! because categorical tokens are matched exactly.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{IndicatorDefinition, IndicatorDocs, Provider, Record, ValueDomain};
use crate::error::AppError;
use crate::io::validate::REQUIRED_RECORDS_COLS;

pub const RECORDS_FILE: &str = "ai_records.csv";
pub const PROVIDERS_FILE: &str = "ai_providers_and_families.csv";
pub const CODEBOOK_FILE: &str = "ai_codebook.csv";

/// A CSV file held as raw string rows plus a normalized header lookup.
#[derive(Debug, Clone)]
pub struct CsvTable {
    /// File name, used in error messages.
    pub name: String,
    header_map: HashMap<String, usize>,
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl CsvTable {
    pub fn from_reader<R: std::io::Read>(name: &str, reader: R) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let header_record = reader
            .headers()
            .map_err(|e| AppError::input(format!("Failed to read CSV headers of {name}: {e}")))?
            .clone();
        let headers: Vec<String> = header_record.iter().map(normalize_header_name).collect();
        let header_map = headers
            .iter()
            .enumerate()
            .map(|(idx, h)| (h.clone(), idx))
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            // +2: header line, and CSV lines are 1-based.
            let line = idx + 2;
            let row = result
                .map_err(|e| AppError::input(format!("CSV parse error in {name} line {line}: {e}")))?;
            rows.push(row);
        }

        Ok(Self {
            name: name.to_string(),
            header_map,
            headers,
            rows,
        })
    }

    pub fn open(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path)
            .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let table = Self::from_reader(&name, file)?;
        debug!(file = %name, rows = table.len(), "read csv");
        Ok(table)
    }

    /// Header names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.header_map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(move |record| RowView {
            record,
            header_map: &self.header_map,
        })
    }
}

/// A row borrowed from a [`CsvTable`] with column lookup by name.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    record: &'a StringRecord,
    header_map: &'a HashMap<String, usize>,
}

impl<'a> RowView<'a> {
    /// Trimmed cell text, or `""` when the column or cell is missing.
    pub fn text(&self, name: &str) -> &'a str {
        self.raw(name).trim()
    }

    /// Cell text exactly as written in the file.
    pub fn raw(&self, name: &str) -> &'a str {
        self.header_map
            .get(name)
            .and_then(|idx| self.record.get(*idx))
            .unwrap_or("")
    }

    /// Cell text if present and non-empty.
    pub fn optional(&self, name: &str) -> Option<String> {
        let s = self.text(name);
        (!s.is_empty()).then(|| s.to_string())
    }
}

/// The three input tables, unvalidated.
#[derive(Debug, Clone)]
pub struct RawDatasets {
    pub records: CsvTable,
    pub providers: CsvTable,
    pub codebook: CsvTable,
}

/// Read all three input CSVs from `data_dir`.
pub fn load_datasets(data_dir: &Path) -> Result<RawDatasets, AppError> {
    let records = CsvTable::open(&data_dir.join(RECORDS_FILE))?;
    let providers = CsvTable::open(&data_dir.join(PROVIDERS_FILE))?;
    let codebook = CsvTable::open(&data_dir.join(CODEBOOK_FILE))?;
    info!(
        records = records.len(),
        providers = providers.len(),
        indicators = codebook.len(),
        data_dir = %data_dir.display(),
        "loaded datasets"
    );
    Ok(RawDatasets {
        records,
        providers,
        codebook,
    })
}

/// Type the records table. Columns beyond the known set are carried through
/// in file order so the detail export can reproduce them.
pub fn parse_records(table: &CsvTable) -> Vec<Record> {
    let extra_columns: Vec<&str> = table
        .headers()
        .iter()
        .map(String::as_str)
        .filter(|h| !h.is_empty() && !REQUIRED_RECORDS_COLS.contains(h))
        .collect();

    table
        .rows()
        .map(|row| Record {
            provider_id: row.text("provider_id").to_string(),
            provider_name: row.text("provider_name").to_string(),
            system_family: row.text("system_family").to_string(),
            indicator_id: row.text("indicator_id").to_string(),
            indicator_value: row.raw("indicator_value").to_string(),
            evidence_url: row.optional("evidence_url"),
            evidence_excerpt: row.optional("evidence_excerpt"),
            coder: row.optional("coder_email_or_id"),
            date_coded_utc: row.optional("date_coded_utc"),
            last_reviewed_utc: row.optional("last_reviewed_utc"),
            extra: extra_columns
                .iter()
                .map(|col| (col.to_string(), row.raw(col).to_string()))
                .collect(),
        })
        .collect()
}

pub fn parse_providers(table: &CsvTable) -> Vec<Provider> {
    table
        .rows()
        .map(|row| Provider {
            provider_id: row.text("provider_id").to_string(),
            provider_name: row.text("provider_name").to_string(),
            system_family: row.text("system_family").to_string(),
            entity_type: row.optional("entity_type"),
            hq_country: row.optional("hq_country"),
            provider_website: row.optional("provider_website"),
            license_or_terms: row.optional("license_or_terms"),
            open_weights: row.optional("open_weights"),
            model_family_source_url: row.optional("model_family_source_url"),
            notes: row.optional("notes"),
            last_verified_utc: row.optional("last_verified_utc"),
        })
        .collect()
}

/// Type the codebook, resolving each indicator's value domain once.
pub fn parse_codebook(table: &CsvTable) -> Vec<IndicatorDefinition> {
    table
        .rows()
        .map(|row| {
            let allowed_values = row.text("allowed_values").to_string();
            IndicatorDefinition {
                id: row.text("indicator_id").to_string(),
                pillar: row.text("pillar").to_string(),
                subpillar: row.optional("subpillar"),
                name: row.text("indicator_name").to_string(),
                domain: ValueDomain::from_allowed_values(&allowed_values),
                allowed_values,
                docs: IndicatorDocs {
                    definition: row.optional("definition"),
                    operationalization: row.optional("operationalization"),
                    evidence_required: row.optional("evidence_required"),
                    coding_instructions: row.optional("coding_instructions"),
                    version: row.optional("version"),
                    last_updated_utc: row.optional("last_updated_utc"),
                },
            }
        })
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM; left
    // in place it would make that column look missing.
    name.trim().trim_start_matches('\u{feff}').to_string()
}
