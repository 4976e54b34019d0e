use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment prefix for nested overrides, e.g. `SHEET_PRICE__SHEET__ID`
const ENV_PREFIX: &str = "SHEET_PRICE";

/// Upper bound for `auth.token_ttl_hours` (one year)
pub const MAX_TOKEN_TTL_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sheet: SheetConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Directory with the browser frontend, served as a fallback when set
    #[serde(default)]
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            static_dir: None,
        }
    }
}

/// Which published spreadsheet to read
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SheetConfig {
    /// Spreadsheet identifier; lookups fail with a config error while unset
    #[serde(default)]
    pub id: Option<String>,
    /// Tab identifier within the spreadsheet
    #[serde(default = "default_gid")]
    pub gid: String,
    #[serde(default = "default_sheet_base_url")]
    pub base_url: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            id: None,
            gid: default_gid(),
            base_url: default_sheet_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub admin_password: Option<String>,
    /// HMAC key for login tokens
    #[serde(default)]
    pub token_secret: Option<String>,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_password: None,
            token_secret: None,
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_origin_suffixes")]
    pub allowed_origin_suffixes: Vec<String>,
    #[serde(default = "default_origin_prefixes")]
    pub allowed_origin_prefixes: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin_suffixes: default_origin_suffixes(),
            allowed_origin_prefixes: default_origin_prefixes(),
        }
    }
}

impl CorsConfig {
    /// Whether a browser origin may call the API
    pub fn allows(&self, origin: &str) -> bool {
        self.allowed_origin_suffixes
            .iter()
            .any(|suffix| origin.ends_with(suffix.as_str()))
            || self
                .allowed_origin_prefixes
                .iter()
                .any(|prefix| origin.starts_with(prefix.as_str()))
    }
}

/// Row memo; `ttl_seconds = 0` refetches on every lookup
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_endpoint")]
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            endpoint: default_metrics_endpoint(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_gid() -> String {
    "0".to_string()
}

fn default_sheet_base_url() -> String {
    "https://docs.google.com".to_string()
}

fn default_token_ttl_hours() -> u64 {
    12
}

fn default_origin_suffixes() -> Vec<String> {
    vec![".app.github.dev".to_string()]
}

fn default_origin_prefixes() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://127.0.0.1".to_string(),
    ]
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_endpoint() -> String {
    "/metrics".to_string()
}

/// Load configuration from `config.toml` (optional), `SHEET_PRICE__*`
/// variables and the flat `SHEET_ID`/`SHEET_GID`/`PORT`/`ADMIN_PASSWORD`/
/// `JWT_SECRET` variables, in increasing precedence.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .set_override_option("sheet.id", env_var("SHEET_ID"))?
        .set_override_option("sheet.gid", env_var("SHEET_GID"))?
        .set_override_option("server.port", env_var("PORT"))?
        .set_override_option("auth.admin_password", env_var("ADMIN_PASSWORD"))?
        .set_override_option("auth.token_secret", env_var("JWT_SECRET"))?
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("server.port must be non-zero");
    }

    match cfg.server.log_format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid server.log_format '{}' (expected text or json)", other),
    }

    if cfg.sheet.gid.trim().is_empty() {
        anyhow::bail!("sheet.gid cannot be empty");
    }

    if cfg.auth.token_ttl_hours == 0 {
        anyhow::bail!("auth.token_ttl_hours must be at least 1");
    }

    if cfg.auth.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
        anyhow::bail!(
            "auth.token_ttl_hours must be at most {} (got {})",
            MAX_TOKEN_TTL_HOURS,
            cfg.auth.token_ttl_hours
        );
    }

    if cfg.auth.admin_password.is_some() && cfg.auth.token_secret.is_none() {
        anyhow::bail!("auth.admin_password is set but auth.token_secret (JWT_SECRET) is missing");
    }

    if cfg.metrics.enabled && !cfg.metrics.endpoint.starts_with('/') {
        anyhow::bail!("metrics.endpoint must start with '/'");
    }

    Ok(())
}
