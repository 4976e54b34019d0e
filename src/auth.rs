use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::{
    config::MAX_TOKEN_TTL_HOURS, error::AppError, handlers::AppState, logging::SensitiveValue,
};

type HmacSha256 = Hmac<Sha256>;

/// Role carried by tokens issued at login
pub const ADMIN_ROLE: &str = "admin";

/// Fixed JOSE header: HS256-signed JWT
const TOKEN_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Claims carried inside a login token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub role: String,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Why a token was rejected. Callers only ever see "invalid".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

/// Issues and verifies HMAC-SHA256 signed, JWT-shaped tokens
pub struct TokenSigner {
    key: Vec<u8>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_hours: u64) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
            ttl: Duration::hours(ttl_hours.min(MAX_TOKEN_TTL_HOURS) as i64),
        }
    }

    pub fn issue(&self, role: &str) -> String {
        self.issue_at(role, Utc::now())
    }

    pub fn issue_at(&self, role: &str, now: DateTime<Utc>) -> String {
        let claims = Claims {
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        // Claims is plain data; serialization cannot fail
        let payload = serde_json::to_vec(&claims).unwrap_or_default();
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(TOKEN_HEADER),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes()));

        format!("{}.{}", signing_input, signature)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let (signing_input, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        let (_header, payload) = signing_input.split_once('.').ok_or(TokenError::Malformed)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac();
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length")
    }
}

/// Constant-time comparison of a submitted password against the configured one
pub fn password_matches(submitted: &str, expected: &str) -> bool {
    submitted.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Admin session attached to requests that passed [`require_admin`]
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub claims: Claims,
}

/// Authentication middleware for admin routes.
/// Extracts the Bearer token from the Authorization header and verifies it
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or_else(|| AppError::Unauthorized("Not logged in".to_string()))?;

    // without a secret no token can be valid
    let signer = state.tokens.as_ref().ok_or_else(|| {
        tracing::debug!("Rejected admin token: no token secret configured");
        AppError::Unauthorized("Invalid/expired login".to_string())
    })?;

    let claims = signer.verify(token).map_err(|e| {
        tracing::debug!(reason = %e, token = %SensitiveValue::new(token), "Rejected admin token");
        AppError::Unauthorized("Invalid/expired login".to_string())
    })?;

    if claims.role != ADMIN_ROLE {
        tracing::debug!(role = %claims.role, "Rejected token without admin role");
        return Err(AppError::Unauthorized("Invalid/expired login".to_string()));
    }

    req.extensions_mut().insert(AdminSession { claims });

    Ok(next.run(req).await)
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    const BEARER_PREFIX: &str = "Bearer ";

    auth_header
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
}
