pub mod config;
pub mod database;
pub mod migrations;

pub use config::{
    AppConfig, AuthConfig, CatalogConfig, DatabaseConfig, LoggingConfig, PublishedYearRule,
    RateLimitConfig, ServerConfig,
};
pub use database::{Database, connect, connect_in_memory};
pub use migrations::{Migration, run_migrations};
