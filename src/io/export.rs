//! Export ranked tables and the per-indicator detail table.
//!
//! CSV exports are meant to be easy to consume in spreadsheets or downstream
//! scripts; the JSON exports feed the query service.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde_json::{Map, Value, json};

use crate::domain::{Level, NormalizedRecord, RankedRow, RankedTable};
use crate::error::AppError;
use crate::io::validate::REQUIRED_RECORDS_COLS;

pub const DETAIL_FILE: &str = "scores_by_indicator.csv";

/// Columns appended to the record columns in the detail table.
pub const DETAIL_SCORE_COLUMNS: &[&str] = &[
    "norm_known",
    "norm_evidence",
    "pillar",
    "subpillar",
    "indicator_name",
];

/// Write a ranked table as CSV: identity, one column per pillar, AIPI, coverage, rank.
pub fn write_ranked_csv<W: Write>(writer: W, table: &RankedTable) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = vec!["provider_id", "provider_name"];
    if table.level == Level::System {
        header.push("system_family");
    }
    header.extend(table.pillars.iter().map(String::as_str));
    header.extend(["AIPI", "coverage", "rank"]);
    out.write_record(&header).map_err(write_err)?;

    for row in &table.rows {
        let mut cells: Vec<String> = vec![row.provider_id.clone(), row.provider_name.clone()];
        if table.level == Level::System {
            cells.push(row.system_family.clone().unwrap_or_default());
        }
        cells.extend(
            table
                .pillars
                .iter()
                .map(|p| row.pillars.get(p).map(|v| fmt_float(*v)).unwrap_or_default()),
        );
        cells.push(fmt_float(row.aipi));
        cells.push(fmt_float(row.coverage));
        cells.push(row.rank.to_string());
        out.write_record(&cells).map_err(write_err)?;
    }

    out.flush()
        .map_err(|e| AppError::output(format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

/// Write every scored record with its placement and both score columns.
///
/// Layout: the known record columns, any extra input columns in file order,
/// then [`DETAIL_SCORE_COLUMNS`].
pub fn write_detail_csv<W: Write>(writer: W, records: &[NormalizedRecord]) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);

    // Every record comes from the same file, so the first one names the extras.
    let extra_columns: Vec<&str> = records
        .first()
        .map(|r| r.record.extra.iter().map(|(col, _)| col.as_str()).collect())
        .unwrap_or_default();

    let mut header: Vec<&str> = REQUIRED_RECORDS_COLS.to_vec();
    header.extend(&extra_columns);
    header.extend(DETAIL_SCORE_COLUMNS);
    out.write_record(&header).map_err(write_err)?;

    for r in records {
        let rec = &r.record;
        let known = r.known.value().map(fmt_float).unwrap_or_default();
        let evidence = fmt_float(r.evidence);

        let mut cells: Vec<&str> = vec![
            rec.provider_id.as_str(),
            rec.provider_name.as_str(),
            rec.system_family.as_str(),
            rec.indicator_id.as_str(),
            rec.indicator_value.as_str(),
            rec.evidence_url.as_deref().unwrap_or(""),
            rec.evidence_excerpt.as_deref().unwrap_or(""),
            rec.coder.as_deref().unwrap_or(""),
            rec.date_coded_utc.as_deref().unwrap_or(""),
            rec.last_reviewed_utc.as_deref().unwrap_or(""),
        ];
        cells.extend(extra_columns.iter().map(|col| {
            rec.extra
                .iter()
                .find(|(name, _)| name.as_str() == *col)
                .map_or("", |(_, cell)| cell.as_str())
        }));
        cells.extend([
            known.as_str(),
            evidence.as_str(),
            r.pillar.as_deref().unwrap_or(""),
            r.subpillar.as_deref().unwrap_or(""),
            r.indicator_name.as_deref().unwrap_or(""),
        ]);
        out.write_record(&cells).map_err(write_err)?;
    }

    out.flush()
        .map_err(|e| AppError::output(format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

/// Write a ranked table as a pretty JSON array of flat row objects, with the
/// same columns as the CSV export. An absent pillar cell is `null`.
pub fn write_rows_json<W: Write>(writer: W, table: &RankedTable) -> Result<(), AppError> {
    let rows: Vec<Value> = table.rows.iter().map(|row| row_json(table, row)).collect();
    serde_json::to_writer_pretty(writer, &rows)
        .map_err(|e| AppError::output(format!("Failed to write JSON: {e}")))
}

fn row_json(table: &RankedTable, row: &RankedRow) -> Value {
    let mut obj = Map::new();
    obj.insert("provider_id".to_string(), json!(row.provider_id));
    obj.insert("provider_name".to_string(), json!(row.provider_name));
    if table.level == Level::System {
        obj.insert("system_family".to_string(), json!(row.system_family));
    }
    for pillar in &table.pillars {
        let cell = row.pillars.get(pillar).map_or(Value::Null, |v| json!(v));
        obj.insert(pillar.clone(), cell);
    }
    obj.insert("AIPI".to_string(), json!(row.aipi));
    obj.insert("coverage".to_string(), json!(row.coverage));
    obj.insert("rank".to_string(), json!(row.rank));
    Value::Object(obj)
}

/// Create `path` and hand it to `write`.
pub fn write_file<F>(path: &Path, write: F) -> Result<(), AppError>
where
    F: FnOnce(File) -> Result<(), AppError>,
{
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create '{}': {e}", path.display())))?;
    write(file)
}

/// Float formatting used by every CSV artifact: shortest round-trip text, and
/// integral values keep one decimal (`1.0`, not `1`).
pub fn fmt_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

fn write_err(e: csv::Error) -> AppError {
    AppError::output(format!("Failed to write CSV row: {e}"))
}
