use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::{db, error::AppResult, seed, AppState};

#[derive(Debug, Deserialize)]
pub struct SeedParams {
    pub count: Option<usize>,
}

/// Populate the catalog with sample sweets for demos. Existing sweet ids
/// are skipped, so the endpoint is safe to call repeatedly.
pub async fn seed_catalog(
    State(state): State<AppState>,
    Query(params): Query<SeedParams>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let count = params.count.unwrap_or(12).min(500);

    let inserted = seed::seed_sweets(&state.db, count).await?;
    let total = db::count_sweets(&state.db).await?;

    info!(inserted = inserted.len(), total, "Seeded catalog");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "inserted": inserted.len(),
            "total": total,
        })),
    ))
}
