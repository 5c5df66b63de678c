//! Formatted terminal output.
//!
//! Formatting lives in one place so the scoring code stays free of
//! presentation concerns and output changes stay localized.

use std::path::PathBuf;

use crate::app::pipeline::RunOutput;
use crate::domain::{Level, Policy, RankedTable};
use crate::sensitivity::SensitivityReport;

/// Dataset counts, diagnostics, and the top of both provider rankings.
pub fn format_build_summary(run: &RunOutput, written: &[PathBuf], top_n: usize) -> String {
    let mut out = String::new();
    let build = &run.build;

    out.push_str("=== aipi - AI Pluralism Index ===\n");
    out.push_str(&format!(
        "Inputs: records={} | providers={} | indicators={}\n",
        run.inputs.records.len(),
        run.inputs.providers.len(),
        run.inputs.codebook.len(),
    ));
    out.push_str(&format!(
        "Ranked: systems={} | providers={} | pillars={}\n",
        build.systems_evidence.rows.len(),
        build.providers_evidence.rows.len(),
        build.systems_evidence.pillars.len(),
    ));

    let diag = &build.diagnostics;
    if diag.unmatched_records > 0 {
        out.push_str(&format!(
            "Warning: {} record(s) reference unknown indicators: {}\n",
            diag.unmatched_records,
            diag.unmatched_indicators.join(", ")
        ));
    }
    for dup in &diag.duplicates {
        out.push_str(&format!(
            "Warning: {} records for {}/{}/{} (averaged)\n",
            dup.count, dup.provider_id, dup.system_family, dup.indicator_id
        ));
    }

    for policy in Policy::ALL {
        out.push('\n');
        out.push_str(&format_ranked_table(build.providers(policy), top_n));
    }

    if !written.is_empty() {
        out.push_str("\nWrote:\n");
        for path in written {
            out.push_str(&format!("- {}\n", path.display()));
        }
    }

    out
}

/// Top-N rows of a ranked table with one column per pillar.
pub fn format_ranked_table(table: &RankedTable, top_n: usize) -> String {
    let mut out = String::new();
    let level = match table.level {
        Level::Provider => "Providers",
        Level::System => "Systems",
    };
    out.push_str(&format!(
        "{level} by AIPI ({}), top {} of {}:\n",
        table.policy.display_name(),
        top_n.min(table.rows.len()),
        table.rows.len()
    ));

    let mut header = format!("{:>4} {:<24}", "rank", "provider");
    if table.level == Level::System {
        header.push_str(&format!(" {:<20}", "system"));
    }
    for pillar in &table.pillars {
        header.push_str(&format!(" {:>12}", truncate(pillar, 12)));
    }
    header.push_str(&format!(" {:>7} {:>8}", "AIPI", "coverage"));
    out.push_str(header.trim_end());
    out.push('\n');

    for row in table.rows.iter().take(top_n) {
        let mut line = format!("{:>4} {:<24}", row.rank, truncate(&row.provider_name, 24));
        if table.level == Level::System {
            let system = row.system_family.as_deref().unwrap_or("");
            line.push_str(&format!(" {:<20}", truncate(system, 20)));
        }
        for pillar in &table.pillars {
            let cell = row
                .pillars
                .get(pillar)
                .map(|v| format!("{v:.3}"))
                .unwrap_or_else(|| "-".to_string());
            line.push_str(&format!(" {cell:>12}"));
        }
        line.push_str(&format!(" {:>7.3} {:>8.3}", row.aipi, row.coverage));
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

pub fn format_sensitivity(report: &SensitivityReport) -> String {
    let mut out = String::new();

    out.push_str("Policy agreement (providers, evidence vs known-only):\n");
    out.push_str(&format!(
        "- spearman rho = {} (n={})\n",
        fmt_rho(report.policy_rho),
        report.n_providers
    ));

    out.push_str("\nPillar ablation (evidence policy):\n");
    out.push_str(&format!(
        "{:<28} {:>8} {:>10} {:>4}\n",
        "dropped pillar", "rho", "max shift", "n"
    ));
    for a in &report.ablations {
        out.push_str(&format!(
            "{:<28} {:>8} {:>10} {:>4}\n",
            truncate(&a.pillar, 28),
            fmt_rho(a.rho),
            a.max_rank_shift,
            a.n_providers
        ));
    }

    out
}

fn fmt_rho(rho: Option<f64>) -> String {
    rho.map(|r| format!("{r:.3}"))
        .unwrap_or_else(|| "n/a".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::RankedRow;
    use crate::sensitivity::Ablation;

    fn row(id: &str, name: &str, transparency: Option<f64>, aipi: f64, rank: usize) -> RankedRow {
        RankedRow {
            provider_id: id.to_string(),
            provider_name: name.to_string(),
            system_family: None,
            pillars: transparency
                .map(|v| BTreeMap::from([("Transparency".to_string(), v)]))
                .unwrap_or_default(),
            aipi,
            coverage: 1.0,
            rank,
        }
    }

    #[test]
    fn ranked_table_respects_top_n_and_marks_missing_cells() {
        let table = RankedTable {
            level: Level::Provider,
            policy: Policy::KnownOnly,
            pillars: vec!["Transparency".to_string()],
            rows: vec![
                row("a", "Alpha", Some(0.75), 0.75, 1),
                row("b", "Beta", None, 0.5, 2),
                row("c", "Gamma", Some(0.1), 0.1, 3),
            ],
        };
        let text = format_ranked_table(&table, 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Providers by AIPI (known-only), top 2 of 3:");
        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains("Alpha") && lines[2].contains("0.750"));
        assert!(lines[3].contains(" -"));
        assert!(!text.contains("Gamma"));
    }

    #[test]
    fn sensitivity_prints_undefined_rho() {
        let report = SensitivityReport {
            policy_rho: None,
            n_providers: 1,
            ablations: vec![Ablation {
                pillar: "Accountability".to_string(),
                rho: Some(0.5),
                max_rank_shift: 2,
                n_providers: 1,
            }],
        };
        let text = format_sensitivity(&report);
        assert!(text.contains("rho = n/a (n=1)"));
        assert!(text.contains("Accountability"));
        assert!(text.contains("0.500"));
    }

    #[test]
    fn truncate_keeps_short_and_marks_long() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdefgh", 5), "abcd.");
    }
}
