//! Route handlers.

use std::io::ErrorKind;
use std::path::Path;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use tracing::error;

use super::AppState;
use crate::io::{DETAIL_FILE, META_FILE};

/// Longest `evidence_excerpt` returned by `/v1/detail`, in characters.
pub const EXCERPT_LIMIT: usize = 400;

/// Detail columns returned as numbers rather than text.
const NUMERIC_COLUMNS: &[&str] = &["norm_known", "norm_evidence"];

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found" }))).into_response()
            }
            ApiError::Internal(message) => {
                error!(%message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": message })),
                )
                    .into_response()
            }
        }
    }
}

/// GET /v1/health
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// GET /v1/meta
pub async fn meta(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    read_json(&state.build_dir.join(META_FILE)).await.map(Json)
}

/// GET /v1/providers
pub async fn providers(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    read_json(&state.build_dir.join("providers.json")).await.map(Json)
}

/// GET /v1/systems
pub async fn systems(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    read_json(&state.build_dir.join("systems.json")).await.map(Json)
}

/// GET /v1/detail
///
/// The per-indicator CSV as an array of objects, with excerpts shortened to
/// keep the payload small.
pub async fn detail(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let bytes = read_bytes(&state.build_dir.join(DETAIL_FILE)).await?;
    detail_rows(&bytes).map(Json)
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>, ApiError> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => ApiError::NotFound,
        _ => ApiError::Internal(format!("Failed to read '{}': {e}", path.display())),
    })
}

async fn read_json(path: &Path) -> Result<Value, ApiError> {
    let bytes = read_bytes(path).await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::Internal(format!("Invalid JSON in '{}': {e}", path.display())))
}

/// Convert detail CSV bytes into JSON rows.
///
/// Empty cells become `null`; score columns become numbers.
pub fn detail_rows(bytes: &[u8]) -> Result<Value, ApiError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(|e| ApiError::Internal(format!("Invalid detail CSV header: {e}")))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| ApiError::Internal(format!("Invalid detail CSV row: {e}")))?;

        let mut obj = Map::with_capacity(headers.len());
        for (name, cell) in headers.iter().zip(record.iter()) {
            obj.insert(name.to_string(), cell_value(name, cell));
        }
        rows.push(Value::Object(obj));
    }
    Ok(Value::Array(rows))
}

fn cell_value(column: &str, cell: &str) -> Value {
    if column == "evidence_excerpt" {
        return Value::String(cell.chars().take(EXCERPT_LIMIT).collect());
    }
    if cell.is_empty() {
        return Value::Null;
    }
    if NUMERIC_COLUMNS.contains(&column) {
        if let Some(n) = cell.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
            return Value::Number(n);
        }
    }
    Value::String(cell.to_string())
}
