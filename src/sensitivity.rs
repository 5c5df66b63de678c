//! Robustness checks on the provider ranking.
//!
//! - how strongly the evidence and known-only rankings agree (Spearman rho)
//! - how much each pillar moves the evidence ranking when its indicators are
//!   dropped (pillar ablation)

use std::collections::HashMap;

use tracing::debug;

use crate::app::pipeline::BuildOutput;
use crate::domain::{NormalizedRecord, Policy, RankedTable};
use crate::scoring::{aggregate_providers, aggregate_systems};

#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityReport {
    /// Spearman rho between evidence and known-only provider AIPI.
    pub policy_rho: Option<f64>,
    /// Providers present in both tables.
    pub n_providers: usize,
    pub ablations: Vec<Ablation>,
}

/// Effect of dropping one pillar on the evidence provider ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Ablation {
    pub pillar: String,
    /// Spearman rho between the full and the ablated AIPI.
    pub rho: Option<f64>,
    /// Largest absolute rank change of any provider.
    pub max_rank_shift: usize,
    /// Providers still ranked after the drop.
    pub n_providers: usize,
}

pub fn analyze(build: &BuildOutput) -> SensitivityReport {
    let (policy_rho, n_providers) = compare_tables(
        build.providers(Policy::Evidence),
        build.providers(Policy::KnownOnly),
    );
    let ablations = pillar_ablation(&build.detail, build.providers(Policy::Evidence));
    SensitivityReport {
        policy_rho,
        n_providers,
        ablations,
    }
}

/// Re-rank providers (evidence policy) once per pillar with that pillar removed.
pub fn pillar_ablation(detail: &[NormalizedRecord], full: &RankedTable) -> Vec<Ablation> {
    full.pillars
        .iter()
        .map(|pillar| {
            let kept: Vec<NormalizedRecord> = detail
                .iter()
                .filter(|r| r.pillar.as_deref() != Some(pillar.as_str()))
                .cloned()
                .collect();
            let ablated = aggregate_providers(&aggregate_systems(&kept, Policy::Evidence));

            let (rho, n_providers) = compare_tables(full, &ablated);
            let max_rank_shift = max_rank_shift(full, &ablated);
            debug!(pillar = %pillar, ?rho, max_rank_shift, "pillar ablation");
            Ablation {
                pillar: pillar.clone(),
                rho,
                max_rank_shift,
                n_providers,
            }
        })
        .collect()
}

/// Spearman rho of AIPI over providers present in both tables, and that count.
fn compare_tables(a: &RankedTable, b: &RankedTable) -> (Option<f64>, usize) {
    let b_by_id: HashMap<&str, f64> = b
        .rows
        .iter()
        .map(|r| (r.provider_id.as_str(), r.aipi))
        .collect();

    let (xs, ys): (Vec<f64>, Vec<f64>) = a
        .rows
        .iter()
        .filter(|r| r.aipi.is_finite())
        .filter_map(|r| {
            let y = *b_by_id.get(r.provider_id.as_str())?;
            y.is_finite().then_some((r.aipi, y))
        })
        .unzip();

    (spearman(&xs, &ys), xs.len())
}

fn max_rank_shift(a: &RankedTable, b: &RankedTable) -> usize {
    let b_rank: HashMap<&str, usize> = b
        .rows
        .iter()
        .map(|r| (r.provider_id.as_str(), r.rank))
        .collect();
    a.rows
        .iter()
        .filter_map(|r| Some(r.rank.abs_diff(*b_rank.get(r.provider_id.as_str())?)))
        .max()
        .unwrap_or(0)
}

/// Spearman rank correlation with average ranks for ties.
///
/// `None` for fewer than two pairs or when either side is constant.
pub fn spearman(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    pearson(&average_ranks(xs), &average_ranks(ys))
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// 1-based ranks; tied values share the mean of the ranks they span.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // Positions i..=j (0-based) share rank mean((i+1)..=(j+1)).
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }
    ranks
}
