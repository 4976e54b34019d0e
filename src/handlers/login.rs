use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    auth::{password_matches, ADMIN_ROLE},
    error::AppError,
    handlers::AppState,
    metrics,
};

/// Submitted password, taken from the `password` field of any JSON body
#[derive(Debug, PartialEq)]
pub enum SubmittedPassword {
    /// Field absent, null, or falsy (`""`, `false`, `0`)
    Missing,
    Text(String),
    /// A non-string value such as a number; it can never match
    Other,
}

impl SubmittedPassword {
    pub fn from_body(body: &[u8]) -> Self {
        let value = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|mut body| body.get_mut("password").map(Value::take))
            .unwrap_or(Value::Null);

        match value {
            Value::Null | Value::Bool(false) => Self::Missing,
            Value::String(s) if s.is_empty() => Self::Missing,
            Value::String(s) => Self::Text(s),
            Value::Number(n) if n.as_f64() == Some(0.0) => Self::Missing,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Handle `POST /api/login`
///
/// A missing or unparsable body is treated like a missing password. A
/// non-string password is a wrong password.
pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LoginResponse>, AppError> {
    let password = match SubmittedPassword::from_body(&body) {
        SubmittedPassword::Missing => {
            metrics::record_login("missing_password");
            return Err(AppError::BadRequest("Password required".to_string()));
        }
        SubmittedPassword::Text(p) => Some(p),
        SubmittedPassword::Other => None,
    };

    let expected = state.config.auth.admin_password.as_deref();
    let matched = match (password.as_deref(), expected) {
        (Some(password), Some(expected)) => password_matches(password, expected),
        _ => false,
    };
    if !matched {
        metrics::record_login("wrong_password");
        tracing::warn!("Admin login failed: wrong password");
        return Err(AppError::Unauthorized("Wrong password".to_string()));
    }

    let signer = state
        .tokens
        .as_ref()
        .ok_or_else(|| AppError::ConfigError("Admin login is not configured".to_string()))?;

    metrics::record_login("success");
    tracing::info!(ttl_hours = state.config.auth.token_ttl_hours, "Admin login succeeded");

    Ok(Json(LoginResponse {
        token: signer.issue(ADMIN_ROLE),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{AuthConfig, Config},
        sheet::{LiveRowSource, RowSource},
    };
    use axum::{http::StatusCode, response::IntoResponse};
    use std::sync::Arc;

    fn create_test_state(password: Option<&str>, secret: Option<&str>) -> AppState {
        let config = Config {
            auth: AuthConfig {
                admin_password: password.map(str::to_string),
                token_secret: secret.map(str::to_string),
                token_ttl_hours: 12,
            },
            ..Config::default()
        };
        let rows: Arc<dyn RowSource> =
            Arc::new(LiveRowSource::new(reqwest::Client::new(), config.sheet.clone()));
        AppState::new(Arc::new(config), rows)
    }

    async fn status_of(state: AppState, body: &'static str) -> StatusCode {
        match login(State(state), Bytes::from_static(body.as_bytes())).await {
            Ok(response) => response.into_response().status(),
            Err(err) => err.into_response().status(),
        }
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let state = create_test_state(Some("hunter2"), Some("secret"));
        let Json(response) = login(State(state.clone()), Bytes::from_static(br#"{"password":"hunter2"}"#))
            .await
            .unwrap();

        let claims = state.tokens.unwrap().verify(&response.token).unwrap();
        assert_eq!(claims.role, ADMIN_ROLE);
    }

    #[tokio::test]
    async fn test_login_requires_password() {
        let state = create_test_state(Some("hunter2"), Some("secret"));
        assert_eq!(status_of(state.clone(), "").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_of(state.clone(), "{}").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_of(state.clone(), r#"{"password":""}"#).await, StatusCode::BAD_REQUEST);
        assert_eq!(status_of(state, "not json").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let state = create_test_state(Some("hunter2"), Some("secret"));
        assert_eq!(
            status_of(state.clone(), r#"{"password":"hunter3"}"#).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(state.clone(), r#"{"password":123}"#).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(state, r#"{"password":["hunter2"]}"#).await, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_submitted_password_from_body() {
        assert_eq!(
            SubmittedPassword::from_body(br#"{"password":"pw"}"#),
            SubmittedPassword::Text("pw".to_string())
        );
        assert_eq!(SubmittedPassword::from_body(br#"{"password":7}"#), SubmittedPassword::Other);
        assert_eq!(SubmittedPassword::from_body(br#"{"password":true}"#), SubmittedPassword::Other);
        assert_eq!(SubmittedPassword::from_body(br#"{"password":0}"#), SubmittedPassword::Missing);
        assert_eq!(SubmittedPassword::from_body(br#"{"password":false}"#), SubmittedPassword::Missing);
        assert_eq!(SubmittedPassword::from_body(br#"{"password":null}"#), SubmittedPassword::Missing);
        assert_eq!(SubmittedPassword::from_body(b"[1,2]"), SubmittedPassword::Missing);
        assert_eq!(SubmittedPassword::from_body(b""), SubmittedPassword::Missing);
    }

    #[tokio::test]
    async fn test_login_without_configured_password_always_fails() {
        let state = create_test_state(None, Some("secret"));
        assert_eq!(
            status_of(state, r#"{"password":"anything"}"#).await,
            StatusCode::UNAUTHORIZED
        );
    }
}
