//! Pillar rollups, composite index, coverage and ranking.
//!
//! System level:
//!
//! 1. mean of the policy's score column per (system, pillar)
//! 2. pivot to one row per system, one cell per pillar
//! 3. composite index (AIPI) across pillar cells
//!    - evidence: absent cells count as 0.0
//!    - known-only: absent cells are skipped
//! 4. coverage over all of the system's records
//! 5. stable sort by descending AIPI, rank 1..N
//!
//! Provider level averages a system table per provider with the same
//! skip-absent semantics, then ranks again.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::{Level, NormalizedRecord, PillarScore, Policy, RankedRow, RankedTable, SystemKey};

/// Running arithmetic mean.
#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    n: usize,
}

impl Mean {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.n += 1;
    }

    fn value(self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

/// Per-(system, pillar) means in pivot order.
///
/// Records without a pillar are skipped, and under [`Policy::KnownOnly`] so are
/// unknown values. A group left with nothing to average produces no entry.
pub fn pillar_scores(records: &[NormalizedRecord], policy: Policy) -> Vec<PillarScore> {
    let mut groups: BTreeMap<(SystemKey, &str), Mean> = BTreeMap::new();
    for r in records {
        let Some(pillar) = r.pillar.as_deref() else {
            continue;
        };
        let Some(score) = r.score(policy) else {
            continue;
        };
        groups.entry((r.record.system_key(), pillar)).or_default().push(score);
    }

    groups
        .into_iter()
        .filter_map(|((system, pillar), mean)| {
            Some(PillarScore {
                system,
                pillar: pillar.to_string(),
                score: mean.value()?,
            })
        })
        .collect()
}

/// Fraction of each system's records that normalized to a known value.
pub fn coverage_by_system(records: &[NormalizedRecord]) -> HashMap<SystemKey, f64> {
    let mut acc: HashMap<SystemKey, Mean> = HashMap::new();
    for r in records {
        let known = if r.known.is_known() { 1.0 } else { 0.0 };
        acc.entry(r.record.system_key()).or_default().push(known);
    }
    acc.into_iter()
        .filter_map(|(key, mean)| Some((key, mean.value()?)))
        .collect()
}

/// Build the ranked system table for a policy.
pub fn aggregate_systems(records: &[NormalizedRecord], policy: Policy) -> RankedTable {
    let scores = pillar_scores(records, policy);
    let coverage = coverage_by_system(records);

    let pillars: Vec<String> = scores
        .iter()
        .map(|s| s.pillar.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut pivot: BTreeMap<SystemKey, BTreeMap<String, f64>> = BTreeMap::new();
    for s in scores {
        pivot.entry(s.system).or_default().insert(s.pillar, s.score);
    }

    let rows = pivot
        .into_iter()
        .map(|(key, cells)| {
            let aipi = composite_index(&cells, &pillars, policy);
            RankedRow {
                coverage: coverage.get(&key).copied().unwrap_or(0.0),
                provider_id: key.provider_id,
                provider_name: key.provider_name,
                system_family: Some(key.system_family),
                pillars: cells,
                aipi,
                rank: 0,
            }
        })
        .collect();

    RankedTable {
        level: Level::System,
        policy,
        pillars,
        rows: rank_rows(rows),
    }
}

/// Mean across pillar columns under the policy's missing-cell rule.
///
/// `cells` never holds a pillar outside `pillars`, and is non-empty for every
/// pivot row, so the known-only mean is always defined.
pub fn composite_index(cells: &BTreeMap<String, f64>, pillars: &[String], policy: Policy) -> f64 {
    match policy {
        Policy::Evidence => {
            if pillars.is_empty() {
                return 0.0;
            }
            let sum: f64 = pillars
                .iter()
                .map(|p| cells.get(p).copied().unwrap_or(0.0))
                .sum();
            sum / pillars.len() as f64
        }
        Policy::KnownOnly => {
            let mut mean = Mean::default();
            for p in pillars {
                if let Some(v) = cells.get(p) {
                    mean.push(*v);
                }
            }
            mean.value().unwrap_or(0.0)
        }
    }
}

/// Average a system table per provider and rank the result.
///
/// Every column (each pillar, AIPI, coverage) is a skip-absent mean over the
/// provider's systems, so a provider's pillar cell is absent only when it is
/// absent for all of its systems.
pub fn aggregate_providers(systems: &RankedTable) -> RankedTable {
    #[derive(Default)]
    struct ProviderAcc {
        pillars: BTreeMap<String, Mean>,
        aipi: Mean,
        coverage: Mean,
    }

    let mut groups: BTreeMap<(String, String), ProviderAcc> = BTreeMap::new();
    // Rank order, so the sums accumulate in the same order as the system table.
    for row in &systems.rows {
        let acc = groups
            .entry((row.provider_id.clone(), row.provider_name.clone()))
            .or_default();
        for (pillar, v) in &row.pillars {
            acc.pillars.entry(pillar.clone()).or_default().push(*v);
        }
        acc.aipi.push(row.aipi);
        acc.coverage.push(row.coverage);
    }

    let rows = groups
        .into_iter()
        .map(|((provider_id, provider_name), acc)| RankedRow {
            provider_id,
            provider_name,
            system_family: None,
            pillars: acc
                .pillars
                .into_iter()
                .filter_map(|(p, m)| Some((p, m.value()?)))
                .collect(),
            aipi: acc.aipi.value().unwrap_or(0.0),
            coverage: acc.coverage.value().unwrap_or(0.0),
            rank: 0,
        })
        .collect();

    RankedTable {
        level: Level::Provider,
        policy: systems.policy,
        pillars: systems.pillars.clone(),
        rows: rank_rows(rows),
    }
}

/// Stable sort by descending AIPI and assign ranks 1..N.
pub fn rank_rows(mut rows: Vec<RankedRow>) -> Vec<RankedRow> {
    rows.sort_by(|a, b| b.aipi.partial_cmp(&a.aipi).unwrap_or(std::cmp::Ordering::Equal));
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Score;
    use crate::scoring::compute::compute_scores;
    use crate::scoring::test_support::{definition, normalized, record};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn three_pillar_codebook() -> Vec<crate::domain::IndicatorDefinition> {
        vec![
            definition("GOV1", "Participatory governance", "Yes|No|Unknown"),
            definition("TRA2", "Transparency", "Yes|No|Unknown"),
            definition("ACC1", "Accountability", "Yes|No|Unknown"),
        ]
    }

    #[test]
    fn yes_no_unknown_across_three_pillars() {
        let records = vec![
            record("p", "S", "GOV1", "Yes"),
            record("p", "S", "TRA2", "No"),
            record("p", "S", "ACC1", "Unknown"),
        ];
        let scored = compute_scores(&records, &three_pillar_codebook()).records;

        let known: Vec<Score> = scored.iter().map(|r| r.known).collect();
        assert_eq!(known, vec![Score::Known(1.0), Score::Known(0.0), Score::Unknown]);
        let evidence: Vec<f64> = scored.iter().map(|r| r.evidence).collect();
        assert_eq!(evidence, vec![1.0, 0.0, 0.0]);

        let ev = aggregate_systems(&scored, Policy::Evidence);
        assert_eq!(ev.pillars.len(), 3);
        assert!(approx(ev.rows[0].aipi, 1.0 / 3.0));
        assert!(approx(ev.rows[0].coverage, 2.0 / 3.0));

        let ko = aggregate_systems(&scored, Policy::KnownOnly);
        assert_eq!(ko.pillars, vec!["Participatory governance", "Transparency"]);
        assert!(approx(ko.rows[0].aipi, 0.5));
        assert!(!ko.rows[0].pillars.contains_key("Accountability"));
        assert!(approx(ko.rows[0].coverage, 2.0 / 3.0));

        let pe = aggregate_providers(&ev);
        assert_eq!(pe.rows.len(), 1);
        assert!(approx(pe.rows[0].aipi, 1.0 / 3.0));
        assert_eq!(pe.rows[0].system_family, None);
    }

    #[test]
    fn pillar_mean_within_group() {
        let scored = vec![
            normalized("p", "S", "A", Score::Known(1.0)),
            normalized("p", "S", "A", Score::Known(0.5)),
            normalized("p", "S", "A", Score::Unknown),
        ];
        let ev = pillar_scores(&scored, Policy::Evidence);
        assert_eq!(ev.len(), 1);
        assert!(approx(ev[0].score, 0.5));

        let ko = pillar_scores(&scored, Policy::KnownOnly);
        assert!(approx(ko[0].score, 0.75));
    }

    #[test]
    fn evidence_zero_fills_pillars_a_system_never_coded() {
        // S1 has pillars A and B; S2 only A. Both pillars are table columns.
        let scored = vec![
            normalized("p", "S1", "A", Score::Known(1.0)),
            normalized("p", "S1", "B", Score::Known(1.0)),
            normalized("q", "S2", "A", Score::Known(1.0)),
        ];
        let ev = aggregate_systems(&scored, Policy::Evidence);
        let s2 = ev.rows.iter().find(|r| r.provider_id == "q").unwrap();
        assert!(approx(s2.aipi, 0.5));

        let ko = aggregate_systems(&scored, Policy::KnownOnly);
        let s2 = ko.rows.iter().find(|r| r.provider_id == "q").unwrap();
        assert!(approx(s2.aipi, 1.0));
    }

    #[test]
    fn all_unknown_system_is_absent_from_known_only_table() {
        let scored = vec![
            normalized("p", "S", "A", Score::Known(0.4)),
            normalized("q", "T", "A", Score::Unknown),
        ];
        let ev = aggregate_systems(&scored, Policy::Evidence);
        assert_eq!(ev.rows.len(), 2);
        let ko = aggregate_systems(&scored, Policy::KnownOnly);
        assert_eq!(ko.rows.len(), 1);
        assert_eq!(ko.rows[0].provider_id, "p");
    }

    #[test]
    fn records_without_pillar_count_toward_coverage_only() {
        let mut orphan = normalized("p", "S", "A", Score::Unknown);
        orphan.pillar = None;
        let scored = vec![normalized("p", "S", "A", Score::Known(1.0)), orphan];

        let ev = aggregate_systems(&scored, Policy::Evidence);
        assert_eq!(ev.pillars, vec!["A"]);
        assert!(approx(ev.rows[0].aipi, 1.0));
        assert!(approx(ev.rows[0].coverage, 0.5));
    }

    #[test]
    fn coverage_is_one_iff_all_known() {
        let all_known = vec![
            normalized("p", "S", "A", Score::Known(0.0)),
            normalized("p", "S", "B", Score::Known(0.2)),
        ];
        let cov = coverage_by_system(&all_known);
        assert_eq!(cov.values().copied().collect::<Vec<_>>(), vec![1.0]);

        let partial = vec![
            normalized("p", "S", "A", Score::Known(0.0)),
            normalized("p", "S", "B", Score::Unknown),
        ];
        let cov = coverage_by_system(&partial);
        let v = cov.values().next().copied().unwrap();
        assert!(v < 1.0 && v >= 0.0);
    }

    #[test]
    fn ranks_are_contiguous_and_descending() {
        let scored = vec![
            normalized("a", "S", "A", Score::Known(0.2)),
            normalized("b", "S", "A", Score::Known(0.9)),
            normalized("c", "S", "A", Score::Known(0.5)),
            normalized("d", "S", "A", Score::Known(0.9)),
            normalized("e", "S", "A", Score::Known(0.0)),
        ];
        let table = aggregate_systems(&scored, Policy::Evidence);
        let ranks: Vec<usize> = table.rows.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        for pair in table.rows.windows(2) {
            assert!(pair[0].aipi >= pair[1].aipi);
        }
        // Tie between b and d keeps pivot (key) order.
        let ids: Vec<&str> = table.rows.iter().map(|r| r.provider_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "c", "a", "e"]);
    }

    #[test]
    fn provider_rollup_averages_systems_and_skips_absent_cells() {
        let scored = vec![
            normalized("p", "S1", "A", Score::Known(1.0)),
            normalized("p", "S1", "B", Score::Unknown),
            normalized("p", "S2", "A", Score::Known(0.5)),
            normalized("p", "S2", "B", Score::Unknown),
            normalized("q", "T", "A", Score::Known(0.0)),
            normalized("q", "T", "B", Score::Known(1.0)),
        ];
        let ko = aggregate_systems(&scored, Policy::KnownOnly);
        let providers = aggregate_providers(&ko);

        assert_eq!(providers.level, Level::Provider);
        assert_eq!(providers.pillars, vec!["A", "B"]);
        let p = providers.rows.iter().find(|r| r.provider_id == "p").unwrap();
        assert!(approx(p.pillars["A"], 0.75));
        assert!(!p.pillars.contains_key("B"));
        assert!(approx(p.aipi, 0.75));
        assert!(approx(p.coverage, 0.5));

        let q = providers.rows.iter().find(|r| r.provider_id == "q").unwrap();
        assert!(approx(q.aipi, 0.5));
        assert_eq!(providers.rows[0].provider_id, "p");
        assert_eq!(providers.rows[0].rank, 1);
        assert_eq!(providers.rows[1].rank, 2);
    }

    #[test]
    fn empty_input_gives_empty_tables() {
        let table = aggregate_systems(&[], Policy::Evidence);
        assert!(table.rows.is_empty());
        assert!(table.pillars.is_empty());
        assert!(aggregate_providers(&table).rows.is_empty());
    }
}
