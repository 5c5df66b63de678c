//! Fixture builders shared by the scoring tests.

use crate::domain::{IndicatorDefinition, IndicatorDocs, NormalizedRecord, Record, Score, ValueDomain};

pub fn definition(id: &str, pillar: &str, allowed_values: &str) -> IndicatorDefinition {
    IndicatorDefinition {
        id: id.to_string(),
        pillar: pillar.to_string(),
        subpillar: None,
        name: format!("{id} name"),
        allowed_values: allowed_values.to_string(),
        domain: ValueDomain::from_allowed_values(allowed_values),
        docs: IndicatorDocs::default(),
    }
}

pub fn record(provider_id: &str, system_family: &str, indicator_id: &str, value: &str) -> Record {
    Record {
        provider_id: provider_id.to_string(),
        provider_name: provider_id.to_uppercase(),
        system_family: system_family.to_string(),
        indicator_id: indicator_id.to_string(),
        indicator_value: value.to_string(),
        ..Record::default()
    }
}

/// A scored record placed directly in `pillar`.
pub fn normalized(provider_id: &str, system_family: &str, pillar: &str, known: Score) -> NormalizedRecord {
    NormalizedRecord {
        record: record(provider_id, system_family, &format!("{pillar}1"), ""),
        pillar: Some(pillar.to_string()),
        subpillar: None,
        indicator_name: None,
        known,
        evidence: known.or_zero(),
    }
}
