use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::{
    auth::AdminSession,
    error::{error_type_name, AppError},
    handlers::AppState,
    metrics,
    quote::{self, AdminQuote, Quote},
};

/// Handle `GET /api/price/{model}`
pub async fn get_price(
    State(state): State<AppState>,
    Path(model): Path<String>,
) -> Result<Json<Quote>, AppError> {
    tracing::info!(model = %model, "Handling price lookup");

    let result = quote::lookup(state.rows.as_ref(), &model).await;
    metrics::record_lookup("/api/price", outcome(&result));

    result.map(Json)
}

/// Handle `GET /api/admin/price/{model}`; runs behind [`crate::auth::require_admin`]
pub async fn get_admin_price(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(model): Path<String>,
) -> Result<Json<AdminQuote>, AppError> {
    tracing::info!(
        model = %model,
        role = %session.claims.role,
        "Handling admin price lookup"
    );

    let result = quote::lookup_admin(state.rows.as_ref(), &model).await;
    metrics::record_lookup("/api/admin/price", outcome(&result));

    result.map(Json)
}

fn outcome<T>(result: &Result<T, AppError>) -> &'static str {
    match result {
        Ok(_) => "found",
        Err(e) => error_type_name(e),
    }
}
