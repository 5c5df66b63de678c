//! Scoring core: value normalization, per-record scores, and aggregation.

pub mod aggregate;
pub mod compute;
pub mod normalize;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregate::{aggregate_providers, aggregate_systems, rank_rows};
pub use compute::{ScoreDiagnostics, ScoredRecords, compute_scores};
pub use normalize::normalize;
