//! Shared build pipeline used by the `build`, `rank` and `sensitivity` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> validate -> score -> aggregate (2 policies x 2 levels)
//!
//! The commands can then focus on presentation (printing vs writing files).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    BuildConfig, IndicatorDefinition, NormalizedRecord, Policy, Provider, RankedTable, Record,
};
use crate::error::{AppError, EXIT_EMPTY};
use crate::io::{self, MetaDocument};
use crate::scoring::{self, ScoreDiagnostics};

/// Validated, typed input tables.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub records: Vec<Record>,
    pub providers: Vec<Provider>,
    pub codebook: Vec<IndicatorDefinition>,
}

/// Everything a build produces, computed in full before anything is written.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Every input record with placement and both score columns, in input order.
    pub detail: Vec<NormalizedRecord>,
    pub diagnostics: ScoreDiagnostics,
    pub systems_evidence: RankedTable,
    pub systems_known: RankedTable,
    pub providers_evidence: RankedTable,
    pub providers_known: RankedTable,
}

impl BuildOutput {
    /// The four ranked tables in artifact order.
    pub fn tables(&self) -> [&RankedTable; 4] {
        [
            &self.systems_evidence,
            &self.systems_known,
            &self.providers_evidence,
            &self.providers_known,
        ]
    }

    pub fn systems(&self, policy: Policy) -> &RankedTable {
        match policy {
            Policy::Evidence => &self.systems_evidence,
            Policy::KnownOnly => &self.systems_known,
        }
    }

    pub fn providers(&self, policy: Policy) -> &RankedTable {
        match policy {
            Policy::Evidence => &self.providers_evidence,
            Policy::KnownOnly => &self.providers_known,
        }
    }
}

/// Inputs plus the computed build.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub inputs: Inputs,
    pub build: BuildOutput,
}

/// Read, validate and type the three input tables from `data_dir`.
pub fn load_inputs(data_dir: &Path) -> Result<Inputs, AppError> {
    let raw = io::load_datasets(data_dir)?;
    io::validate_schemas(&raw)?;

    let records = io::parse_records(&raw.records);
    let providers = io::parse_providers(&raw.providers);
    let codebook = io::parse_codebook(&raw.codebook);
    io::validate_references(&records, &providers)?;

    Ok(Inputs {
        records,
        providers,
        codebook,
    })
}

/// Score once, then aggregate under both policies at both levels.
pub fn build_all(records: &[Record], codebook: &[IndicatorDefinition]) -> BuildOutput {
    let scored = scoring::compute_scores(records, codebook);

    let systems_evidence = scoring::aggregate_systems(&scored.records, Policy::Evidence);
    let systems_known = scoring::aggregate_systems(&scored.records, Policy::KnownOnly);
    let providers_evidence = scoring::aggregate_providers(&systems_evidence);
    let providers_known = scoring::aggregate_providers(&systems_known);

    BuildOutput {
        detail: scored.records,
        diagnostics: scored.diagnostics,
        systems_evidence,
        systems_known,
        providers_evidence,
        providers_known,
    }
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_build(config: &BuildConfig) -> Result<RunOutput, AppError> {
    let inputs = load_inputs(&config.data_dir())?;
    if inputs.records.is_empty() {
        return Err(AppError::new(EXIT_EMPTY, "No records to score in ai_records.csv."));
    }

    let build = build_all(&inputs.records, &inputs.codebook);
    info!(
        systems = build.systems_evidence.rows.len(),
        providers = build.providers_evidence.rows.len(),
        pillars = build.systems_evidence.pillars.len(),
        "scored and ranked"
    );

    Ok(RunOutput { inputs, build })
}

/// Metadata document for a finished build, stamped with the current time and a fresh id.
pub fn build_meta(inputs: &Inputs, build: &BuildOutput) -> MetaDocument {
    io::build_meta(&inputs.codebook, &build.diagnostics, Utc::now(), Uuid::new_v4())
}

/// Write all artifacts to `build_dir`; returns the paths written.
pub fn write_artifacts(
    build_dir: &Path,
    build: &BuildOutput,
    meta: &MetaDocument,
) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(build_dir).map_err(|e| {
        AppError::output(format!(
            "Failed to create build directory '{}': {e}",
            build_dir.display()
        ))
    })?;

    let mut written = Vec::new();

    for table in build.tables() {
        let path = build_dir.join(table.csv_file_name());
        io::write_file(&path, |f| io::write_ranked_csv(f, table))?;
        written.push(path);
    }

    let path = build_dir.join(io::DETAIL_FILE);
    io::write_file(&path, |f| io::write_detail_csv(f, &build.detail))?;
    written.push(path);

    let path = build_dir.join(io::META_FILE);
    io::write_file(&path, |f| {
        serde_json::to_writer_pretty(f, meta)
            .map_err(|e| AppError::output(format!("Failed to write {}: {e}", io::META_FILE)))
    })?;
    written.push(path);

    for table in [&build.providers_evidence, &build.systems_evidence] {
        let path = build_dir.join(format!("{}.json", table.level.file_stem()));
        io::write_file(&path, |f| io::write_rows_json(f, table))?;
        written.push(path);
    }

    info!(files = written.len(), build_dir = %build_dir.display(), "wrote build artifacts");
    Ok(written)
}
