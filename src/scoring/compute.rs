//! Per-record scoring.
//!
//! Applies the normalizer to every record and attaches the record's codebook
//! placement. The only difference between the two policies downstream is the
//! substitution made here: `evidence = known`, or `0.0` when known is unknown.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{IndicatorDefinition, NormalizedRecord, Record, Score, ValueDomain};
use crate::scoring::normalize::normalize;

/// Data-hygiene findings from a scoring pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreDiagnostics {
    /// Records whose indicator is missing from the codebook (dropped from pillar rollups).
    pub unmatched_records: usize,
    /// Distinct indicator ids missing from the codebook, sorted.
    pub unmatched_indicators: Vec<String>,
    /// `(provider_id, system_family, indicator_id)` keys coded more than once, with counts.
    pub duplicates: Vec<DuplicateKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateKey {
    pub provider_id: String,
    pub system_family: String,
    pub indicator_id: String,
    pub count: usize,
}

/// Scored records in input order plus diagnostics.
#[derive(Debug, Clone)]
pub struct ScoredRecords {
    pub records: Vec<NormalizedRecord>,
    pub diagnostics: ScoreDiagnostics,
}

/// Score every record against the codebook.
pub fn compute_scores(records: &[Record], codebook: &[IndicatorDefinition]) -> ScoredRecords {
    let by_id: HashMap<&str, &IndicatorDefinition> =
        codebook.iter().map(|def| (def.id.as_str(), def)).collect();

    let mut unmatched: BTreeMap<String, usize> = BTreeMap::new();
    let mut seen: BTreeMap<(&str, &str, &str), usize> = BTreeMap::new();

    let scored: Vec<NormalizedRecord> = records
        .iter()
        .map(|record| {
            *seen
                .entry((
                    record.provider_id.as_str(),
                    record.system_family.as_str(),
                    record.indicator_id.as_str(),
                ))
                .or_default() += 1;

            let def = by_id.get(record.indicator_id.as_str()).copied();
            if def.is_none() {
                *unmatched.entry(record.indicator_id.clone()).or_default() += 1;
            }
            // An unknown indicator has an empty allowed-values spec.
            let domain = def.map_or(ValueDomain::UnitInterval, |d| d.domain);
            score_record(record, def, domain)
        })
        .collect();

    let duplicates: Vec<DuplicateKey> = seen
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|((provider_id, system_family, indicator_id), count)| DuplicateKey {
            provider_id: provider_id.to_string(),
            system_family: system_family.to_string(),
            indicator_id: indicator_id.to_string(),
            count,
        })
        .collect();

    let diagnostics = ScoreDiagnostics {
        unmatched_records: unmatched.values().sum(),
        unmatched_indicators: unmatched.into_keys().collect(),
        duplicates,
    };

    if diagnostics.unmatched_records > 0 {
        warn!(
            records = diagnostics.unmatched_records,
            indicators = ?diagnostics.unmatched_indicators,
            "records reference indicators missing from the codebook; excluded from pillar scores"
        );
    }
    for dup in &diagnostics.duplicates {
        warn!(
            provider_id = %dup.provider_id,
            system_family = %dup.system_family,
            indicator_id = %dup.indicator_id,
            count = dup.count,
            "indicator coded more than once for a system; duplicates are averaged"
        );
    }
    debug!(
        records = scored.len(),
        known = scored.iter().filter(|r| r.known.is_known()).count(),
        "scored records"
    );

    ScoredRecords {
        records: scored,
        diagnostics,
    }
}

fn score_record(
    record: &Record,
    def: Option<&IndicatorDefinition>,
    domain: ValueDomain,
) -> NormalizedRecord {
    let known = normalize(&record.indicator_value, domain);
    NormalizedRecord {
        record: record.clone(),
        pillar: def.map(|d| d.pillar.clone()),
        subpillar: def.and_then(|d| d.subpillar.clone()),
        indicator_name: def.map(|d| d.name.clone()),
        known,
        evidence: evidence_score(known),
    }
}

/// Evidence-policy score for a known-only score.
pub fn evidence_score(known: Score) -> f64 {
    known.or_zero()
}
