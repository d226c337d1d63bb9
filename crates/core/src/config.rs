use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;

/// Environment variables prefixed with this override file settings.
pub const ENV_PREFIX: &str = "BOOKSHELF";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_seconds: i64,
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_seconds: i64,
    /// Re-check the token subject against the users table on every request.
    #[serde(default)]
    pub verify_subject: bool,
}

// Hand-written so the signing secret never reaches a log line.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_token_expiry_seconds", &self.access_token_expiry_seconds)
            .field("refresh_token_expiry_seconds", &self.refresh_token_expiry_seconds)
            .field("verify_subject", &self.verify_subject)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Which `published_year` rule the book routes enforce.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PublishedYearRule {
    /// Any year >= 0.
    #[default]
    NonNegative,
    /// 1800 up to the current year.
    Historical,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogConfig {
    #[serde(default)]
    pub published_year_policy: PublishedYearRule,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default = "default_authors_per_window")]
    pub authors_per_window: u32,
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            authors_per_window: default_authors_per_window(),
            window_seconds: default_window_seconds(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_access_token_expiry() -> i64 {
    1800 // 30 minutes
}

fn default_refresh_token_expiry() -> i64 {
    7 * 24 * 3600 // 7 days
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_authors_per_window() -> u32 {
    10
}

fn default_window_seconds() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Environment variable and the config key it overrides.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("BOOKSHELF_DATABASE__URL", "database.url"),
    ("BOOKSHELF_DATABASE__MAX_CONNECTIONS", "database.max_connections"),
    ("BOOKSHELF_AUTH__JWT_SECRET", "auth.jwt_secret"),
    ("BOOKSHELF_AUTH__ACCESS_TOKEN_EXPIRY_SECONDS", "auth.access_token_expiry_seconds"),
    ("BOOKSHELF_AUTH__REFRESH_TOKEN_EXPIRY_SECONDS", "auth.refresh_token_expiry_seconds"),
    ("BOOKSHELF_AUTH__VERIFY_SUBJECT", "auth.verify_subject"),
    ("BOOKSHELF_SERVER__HOST", "server.host"),
    ("BOOKSHELF_SERVER__PORT", "server.port"),
    ("BOOKSHELF_CATALOG__PUBLISHED_YEAR_POLICY", "catalog.published_year_policy"),
    ("BOOKSHELF_RATE_LIMIT__AUTHORS_PER_WINDOW", "rate_limit.authors_per_window"),
    ("BOOKSHELF_RATE_LIMIT__WINDOW_SECONDS", "rate_limit.window_seconds"),
    ("BOOKSHELF_LOGGING__LEVEL", "logging.level"),
    ("BOOKSHELF_LOGGING__JSON", "logging.json"),
];

fn overridden_keys(is_set: impl Fn(&str) -> bool) -> Vec<String> {
    ENV_OVERRIDES
        .iter()
        .filter(|(env_var, _)| is_set(env_var))
        .map(|(_, key)| (*key).to_string())
        .collect()
}

impl AppConfig {
    /// Parse configuration from an in-memory TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration with environment variable overrides
    /// Environment variables are prefixed with BOOKSHELF_ and use `__` between
    /// section and key, e.g. BOOKSHELF_DATABASE__URL, BOOKSHELF_AUTH__JWT_SECRET
    ///
    /// Returns the config and the list of keys overridden from the environment
    pub fn load_with_env() -> Result<(Self, Vec<String>), ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("bookshelf").required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;


        let overrides = overridden_keys(|env_var| std::env::var(env_var).is_ok());

        let app_config = config.try_deserialize()?;
        Ok((app_config, overrides))
    }
}
