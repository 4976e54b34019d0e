use async_trait::async_trait;
use reqwest::Client;
use std::time::Instant;

use super::{decode, Row, SheetError};
use crate::{config::SheetConfig, metrics};

/// Maximum number of body characters carried in a fetch error
const ERROR_SNIPPET_CHARS: usize = 180;

/// Anything that can produce the current rows of the price sheet.
#[async_trait]
pub trait RowSource: Send + Sync + 'static {
    /// CSV export URL the rows are read from
    fn csv_url(&self) -> Result<String, SheetError>;

    /// Fetch and decode the current rows
    async fn fetch_rows(&self) -> Result<Vec<Row>, SheetError>;
}

/// Reads the published Google Sheet export on every call.
///
/// No retry and no timeout beyond the client defaults.
#[derive(Clone)]
pub struct LiveRowSource {
    client: Client,
    sheet: SheetConfig,
}

impl LiveRowSource {
    pub fn new(client: Client, sheet: SheetConfig) -> Self {
        Self { client, sheet }
    }
}

#[async_trait]
impl RowSource for LiveRowSource {
    fn csv_url(&self) -> Result<String, SheetError> {
        let sheet_id = self
            .sheet
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(SheetError::MissingSheetId)?;

        Ok(format!(
            "{}/spreadsheets/d/{}/gviz/tq?tqx=out:csv&gid={}",
            self.sheet.base_url.trim_end_matches('/'),
            sheet_id,
            self.sheet.gid
        ))
    }

    async fn fetch_rows(&self) -> Result<Vec<Row>, SheetError> {
        let url = self.csv_url()?;
        let start = Instant::now();

        let result = fetch_text(&self.client, &url).await;
        metrics::record_sheet_fetch(fetch_outcome(&result), start.elapsed());

        let text = result?;
        let rows = decode(&text);

        tracing::debug!(
            rows = rows.len(),
            bytes = text.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Decoded sheet export"
        );

        Ok(rows)
    }
}

async fn fetch_text(client: &Client, url: &str) -> Result<String, SheetError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        tracing::warn!(status = %status, "Sheet export returned an error status");
        return Err(SheetError::Fetch {
            status,
            snippet: text.chars().take(ERROR_SNIPPET_CHARS).collect(),
        });
    }

    if looks_like_html(&text) {
        tracing::warn!("Sheet export returned HTML, link sharing is probably off");
        return Err(SheetError::SharingNotEnabled);
    }

    Ok(text)
}

/// Google serves a sign-in page instead of CSV when the sheet is private
fn looks_like_html(text: &str) -> bool {
    let head: String = text.trim_start().chars().take(9).collect();
    head.eq_ignore_ascii_case("<!doctype") || text.contains("<html")
}

fn fetch_outcome(result: &Result<String, SheetError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(SheetError::Fetch { .. }) => "http_error",
        Err(SheetError::SharingNotEnabled) => "not_shared",
        Err(SheetError::Transport(_)) => "transport_error",
        Err(SheetError::MissingSheetId) => "config_error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn sheet_config(base_url: &str, id: Option<&str>) -> SheetConfig {
        SheetConfig {
            id: id.map(str::to_string),
            gid: "0".to_string(),
            base_url: base_url.to_string(),
        }
    }

    #[test]
    fn test_csv_url() {
        let source = LiveRowSource::new(
            Client::new(),
            SheetConfig {
                id: Some("abc123".to_string()),
                gid: "42".to_string(),
                base_url: "https://docs.google.com/".to_string(),
            },
        );
        assert_eq!(
            source.csv_url().unwrap(),
            "https://docs.google.com/spreadsheets/d/abc123/gviz/tq?tqx=out:csv&gid=42"
        );
    }

    #[test]
    fn test_csv_url_requires_sheet_id() {
        let missing = LiveRowSource::new(Client::new(), sheet_config("https://x", None));
        assert!(matches!(missing.csv_url(), Err(SheetError::MissingSheetId)));

        let blank = LiveRowSource::new(Client::new(), sheet_config("https://x", Some("  ")));
        assert!(matches!(blank.csv_url(), Err(SheetError::MissingSheetId)));
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("  <!DOCTYPE html><html></html>"));
        assert!(looks_like_html("<!doctype html>"));
        assert!(looks_like_html("junk <html lang=en>"));
        assert!(!looks_like_html("model,price\nA,1\n"));
        assert!(!looks_like_html(""));
    }

    #[tokio::test]
    async fn test_fetch_rows_decodes_csv() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spreadsheets/d/sheet-1/gviz/tq"))
            .and(query_param("tqx", "out:csv"))
            .and(query_param("gid", "0"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("\"model\",\"quote price\"\n\"DUKE R9\",\"123000\"\n"),
            )
            .mount(&server)
            .await;

        let source = LiveRowSource::new(Client::new(), sheet_config(&server.uri(), Some("sheet-1")));
        let rows = source.fetch_rows().await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].model(), Some("DUKE R9"));
        assert_eq!(rows[0].get("quote price"), Some("123000"));
    }

    #[tokio::test]
    async fn test_fetch_rows_reports_status_and_snippet() {
        let server = MockServer::start().await;
        let body = "x".repeat(500);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string(body))
            .mount(&server)
            .await;

        let source = LiveRowSource::new(Client::new(), sheet_config(&server.uri(), Some("gone")));
        match source.fetch_rows().await {
            Err(SheetError::Fetch { status, snippet }) => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(snippet.len(), ERROR_SNIPPET_CHARS);
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_rows_detects_private_sheet() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<!DOCTYPE html><html><body>Sign in</body></html>"),
            )
            .mount(&server)
            .await;

        let source = LiveRowSource::new(Client::new(), sheet_config(&server.uri(), Some("private")));
        assert!(matches!(
            source.fetch_rows().await,
            Err(SheetError::SharingNotEnabled)
        ));
    }

    #[tokio::test]
    async fn test_fetch_rows_without_sheet_id_skips_network() {
        let source = LiveRowSource::new(Client::new(), sheet_config("http://127.0.0.1:9", None));
        assert!(matches!(
            source.fetch_rows().await,
            Err(SheetError::MissingSheetId)
        ));
    }
}
