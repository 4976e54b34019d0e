use axum::{extract::State, Json};

use crate::{
    error::AppError,
    handlers::AppState,
    quote::{self, SheetSummary},
};

/// Handle `GET /api/debug`: live sheet diagnostics
pub async fn sheet_debug(State(state): State<AppState>) -> Result<Json<SheetSummary>, AppError> {
    let summary = quote::summarize(state.rows.as_ref()).await?;

    tracing::info!(
        rows = summary.row_count,
        headers = summary.headers.len(),
        "Served sheet diagnostics"
    );

    Ok(Json(summary))
}
