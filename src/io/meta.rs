//! The `meta.json` build document.
//!
//! Describes a build for consumers of the query service: when it was generated,
//! the pillar list, the full indicator catalog, how values were normalized and
//! weighted, and a per-build dataset identifier.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::IndicatorDefinition;
use crate::scoring::ScoreDiagnostics;
use crate::scoring::normalize::COUNT_CAP;

pub const META_FILE: &str = "meta.json";

/// Artifact schema version.
pub const SCHEMA_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize)]
pub struct MetaDocument {
    pub generated_utc: String,
    pub version: String,
    pub pillars: Vec<String>,
    pub indicators: Vec<IndicatorDefinition>,
    pub weighting: Weighting,
    pub dataset_hash: String,
    pub diagnostics: ScoreDiagnostics,
}

#[derive(Debug, Clone, Serialize)]
pub struct Weighting {
    /// Pillar weights in the composite index (equal).
    pub pillars: BTreeMap<String, f64>,
    pub indicator_normalization: String,
}

/// Assemble the metadata document.
///
/// Time and id are passed in so a build can be reproduced in tests.
pub fn build_meta(
    codebook: &[IndicatorDefinition],
    diagnostics: &ScoreDiagnostics,
    generated: DateTime<Utc>,
    dataset_hash: Uuid,
) -> MetaDocument {
    let pillars: Vec<String> = codebook
        .iter()
        .map(|d| d.pillar.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let weight = if pillars.is_empty() {
        0.0
    } else {
        1.0 / pillars.len() as f64
    };

    MetaDocument {
        generated_utc: generated.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
        version: SCHEMA_VERSION.to_string(),
        weighting: Weighting {
            pillars: pillars.iter().map(|p| (p.clone(), weight)).collect(),
            indicator_normalization: normalization_description(),
        },
        pillars,
        indicators: codebook.to_vec(),
        dataset_hash: dataset_hash.to_string(),
        diagnostics: diagnostics.clone(),
    }
}

fn normalization_description() -> String {
    format!(
        "Yes=1, No=0; 0|1|2 -> 0.0,0.5,1.0; counts log2(1+n)/log2({}); \
         Unknown treated as 0 for 'evidence' score, ignored for 'known-only'.",
        1.0 + COUNT_CAP
    )
}
