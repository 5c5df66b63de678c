//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during scoring and aggregation
//! - exported to JSON/CSV build artifacts
//! - reloaded by the query service

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Value domain of an indicator, resolved once from its `allowed_values` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueDomain {
    /// `Yes|No|Unknown`.
    Binary,
    /// `0|1|2|Unknown`.
    Ordinal3,
    /// Unbounded non-negative count (`0..inf`), log-scaled against a cap.
    Count,
    /// Anything else: the coded value is expected to already lie in `[0, 1]`.
    UnitInterval,
}

impl ValueDomain {
    /// Resolve the domain from a codebook `allowed_values` cell.
    ///
    /// Resolution order matters: a spec mentioning both the binary token set and
    /// a count range is treated as binary.
    pub fn from_allowed_values(spec: &str) -> Self {
        if spec.contains("Yes|No|Unknown") {
            ValueDomain::Binary
        } else if spec.trim() == "0|1|2|Unknown" {
            ValueDomain::Ordinal3
        } else if spec.contains("0..inf") {
            ValueDomain::Count
        } else {
            ValueDomain::UnitInterval
        }
    }
}

/// A normalized indicator value: a score in `[0, 1]` or explicitly unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    Known(f64),
    Unknown,
}

impl Score {
    pub fn is_known(self) -> bool {
        matches!(self, Score::Known(_))
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Score::Known(v) => Some(v),
            Score::Unknown => None,
        }
    }

    /// Evidence-policy view: unknown counts as no evidence.
    pub fn or_zero(self) -> f64 {
        self.value().unwrap_or(0.0)
    }
}

/// How unknown indicator values enter the averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Unknown is scored as 0 (worst case).
    Evidence,
    /// Unknown is left out of every mean.
    KnownOnly,
}

impl Policy {
    pub const ALL: [Policy; 2] = [Policy::Evidence, Policy::KnownOnly];

    /// Suffix used in artifact file names.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Policy::Evidence => "evidence",
            Policy::KnownOnly => "known_only",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Policy::Evidence => "evidence",
            Policy::KnownOnly => "known-only",
        }
    }
}

/// Granularity of a ranked table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    System,
    Provider,
}

impl Level {
    pub fn file_stem(self) -> &'static str {
        match self {
            Level::System => "systems",
            Level::Provider => "providers",
        }
    }
}

/// One codebook row.
///
/// Only `id`, `pillar`, `subpillar`, `name` and the resolved `domain` drive
/// scoring; the descriptive columns are carried so the metadata document can
/// publish the full indicator catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDefinition {
    #[serde(rename = "indicator_id")]
    pub id: String,
    pub pillar: String,
    pub subpillar: Option<String>,
    #[serde(rename = "indicator_name")]
    pub name: String,
    pub allowed_values: String,
    pub domain: ValueDomain,
    #[serde(flatten)]
    pub docs: IndicatorDocs,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDocs {
    pub definition: Option<String>,
    pub operationalization: Option<String>,
    pub evidence_required: Option<String>,
    pub coding_instructions: Option<String>,
    pub version: Option<String>,
    pub last_updated_utc: Option<String>,
}

/// One coded observation from `ai_records.csv`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub provider_id: String,
    pub provider_name: String,
    pub system_family: String,
    pub indicator_id: String,
    /// Raw coded value, kept verbatim (normalization decides what it means).
    pub indicator_value: String,
    pub evidence_url: Option<String>,
    pub evidence_excerpt: Option<String>,
    pub coder: Option<String>,
    pub date_coded_utc: Option<String>,
    pub last_reviewed_utc: Option<String>,
    /// Any further input columns as `(column, raw cell)`, in file order.
    pub extra: Vec<(String, String)>,
}

impl Record {
    pub fn system_key(&self) -> SystemKey {
        SystemKey {
            provider_id: self.provider_id.clone(),
            provider_name: self.provider_name.clone(),
            system_family: self.system_family.clone(),
        }
    }
}

/// One row of `ai_providers_and_families.csv`. Unused by scoring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Provider {
    pub provider_id: String,
    pub provider_name: String,
    pub system_family: String,
    pub entity_type: Option<String>,
    pub hq_country: Option<String>,
    pub provider_website: Option<String>,
    pub license_or_terms: Option<String>,
    pub open_weights: Option<String>,
    pub model_family_source_url: Option<String>,
    pub notes: Option<String>,
    pub last_verified_utc: Option<String>,
}

/// Identity of a scored system; ordering matches the grouped pivot order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemKey {
    pub provider_id: String,
    pub provider_name: String,
    pub system_family: String,
}

/// A record annotated with its codebook placement and both score columns.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub record: Record,
    /// `None` when the record references an indicator missing from the codebook.
    pub pillar: Option<String>,
    pub subpillar: Option<String>,
    pub indicator_name: Option<String>,
    pub known: Score,
    pub evidence: f64,
}

impl NormalizedRecord {
    /// Score column selected by the policy; `None` means "leave out of the mean".
    pub fn score(&self, policy: Policy) -> Option<f64> {
        match policy {
            Policy::Evidence => Some(self.evidence),
            Policy::KnownOnly => self.known.value(),
        }
    }
}

/// Mean score of one pillar for one system under a policy.
#[derive(Debug, Clone, PartialEq)]
pub struct PillarScore {
    pub system: SystemKey,
    pub pillar: String,
    pub score: f64,
}

/// One ranked row (system or provider level).
///
/// Exported flat, one column per pillar of the owning table; see
/// `io::export`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
    pub provider_id: String,
    pub provider_name: String,
    /// `None` at provider level.
    pub system_family: Option<String>,
    /// Present pillar cells only; an absent pillar has no entry.
    pub pillars: BTreeMap<String, f64>,
    pub aipi: f64,
    pub coverage: f64,
    pub rank: usize,
}

/// A ranked table plus its pillar columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTable {
    pub level: Level,
    pub policy: Policy,
    /// Sorted pillar column names.
    pub pillars: Vec<String>,
    /// Rows in rank order.
    pub rows: Vec<RankedRow>,
}

impl RankedTable {
    /// Artifact file name, e.g. `systems_ranking_known_only.csv`.
    pub fn csv_file_name(&self) -> String {
        format!(
            "{}_ranking_{}.csv",
            self.level.file_stem(),
            self.policy.file_suffix()
        )
    }
}

/// Build configuration as understood by the pipeline.
///
/// This is derived from CLI flags, environment, and defaults.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Repository root; inputs live under `<root>/data`.
    pub root: PathBuf,
    /// Where artifacts are written.
    pub build_dir: PathBuf,
    /// Rows shown per table in terminal output.
    pub top_n: usize,
}

impl BuildConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }
}

/// Query service configuration.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub build_dir: PathBuf,
    pub bind: String,
}
