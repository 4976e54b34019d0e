use serde::Serialize;

use crate::{
    error::AppError,
    sheet::{find_by_model, quote_price, Row, RowSource},
};

/// Currency of the `quote price` column
pub const CURRENCY: &str = "INR";

const FX_OVERRIDE_COLUMN: &str = "FX_OVERRIDE (for testing)";
const LIVE_CURRENCY_COLUMNS: [&str; 2] = ["chinese live currency", "live currency"];

/// Public price answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub model: String,
    pub quote_price_inr: Option<i64>,
    pub currency: &'static str,
}

/// Price answer with raw sheet fields for admins
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminQuote {
    pub model: String,
    pub quote_price_inr: Option<i64>,
    pub fx_override: Option<String>,
    pub live_currency: Option<String>,
}

/// Sheet snapshot summary for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSummary {
    pub sheet_csv: String,
    pub row_count: usize,
    pub headers: Vec<String>,
    pub sample_models: Vec<Option<String>>,
}

/// Number of model values included in [`SheetSummary`]
const SAMPLE_MODELS: usize = 10;

impl Quote {
    pub fn from_row(model: &str, row: &Row) -> Self {
        Self {
            model: model.to_string(),
            quote_price_inr: quote_price(row),
            currency: CURRENCY,
        }
    }
}

impl AdminQuote {
    pub fn from_row(model: &str, row: &Row) -> Self {
        Self {
            model: model.to_string(),
            quote_price_inr: quote_price(row),
            fx_override: row.get(FX_OVERRIDE_COLUMN).map(str::to_string),
            live_currency: LIVE_CURRENCY_COLUMNS
                .iter()
                .find_map(|column| row.get(column))
                .map(str::to_string),
        }
    }
}

/// Fetch the sheet and return the row matching `model`
pub async fn find_row(source: &dyn RowSource, model: &str) -> Result<Row, AppError> {
    let rows = source.fetch_rows().await?;

    let row = find_by_model(&rows, model).cloned().ok_or_else(|| {
        tracing::info!(model = %model, rows = rows.len(), "No sheet row matches model");
        AppError::ModelNotFound(model.to_string())
    })?;

    tracing::debug!(model = %model, matched = row.model().unwrap_or(""), "Matched sheet row");
    Ok(row)
}

pub async fn lookup(source: &dyn RowSource, model: &str) -> Result<Quote, AppError> {
    let row = find_row(source, model).await?;
    Ok(Quote::from_row(model, &row))
}

pub async fn lookup_admin(source: &dyn RowSource, model: &str) -> Result<AdminQuote, AppError> {
    let row = find_row(source, model).await?;
    Ok(AdminQuote::from_row(model, &row))
}

/// Row count, header names and the first model values of the live sheet
pub async fn summarize(source: &dyn RowSource) -> Result<SheetSummary, AppError> {
    let sheet_csv = source.csv_url()?;
    let rows = source.fetch_rows().await?;

    Ok(SheetSummary {
        sheet_csv,
        row_count: rows.len(),
        headers: rows
            .first()
            .map(|row| row.keys().map(str::to_string).collect())
            .unwrap_or_default(),
        sample_models: rows
            .iter()
            .take(SAMPLE_MODELS)
            .map(|row| row.model().map(str::to_string))
            .collect(),
    })
}
