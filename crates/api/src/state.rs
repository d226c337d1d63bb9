use auth::{AuthService, SubjectCheck, TokenCodec};
use bookshelf_core::{AppConfig, Database, PublishedYearRule};
use catalog::{AuthorRegistry, BookCatalog, YearPolicy};
use std::time::Duration;

use crate::rate_limit::RateLimiter;

/// Application state shared across all handlers
pub struct AppState {
    pub auth_service: AuthService,
    pub authors: AuthorRegistry,
    pub books: BookCatalog,
    pub year_policy: YearPolicy,
    pub authors_limiter: RateLimiter,
}

impl AppState {
    pub fn new(
        auth_service: AuthService,
        authors: AuthorRegistry,
        books: BookCatalog,
        year_policy: YearPolicy,
        authors_limiter: RateLimiter,
    ) -> Self {
        Self {
            auth_service,
            authors,
            books,
            year_policy,
            authors_limiter,
        }
    }

    /// Wire every service onto one pool using the loaded configuration
    pub fn from_config(db: Database, config: &AppConfig) -> Self {
        let codec = TokenCodec::new(
            &config.auth.jwt_secret,
            config.auth.access_token_expiry_seconds,
            config.auth.refresh_token_expiry_seconds,
        );
        let subject_check = if config.auth.verify_subject {
            SubjectCheck::Directory
        } else {
            SubjectCheck::TrustToken
        };
        let year_policy = match config.catalog.published_year_policy {
            PublishedYearRule::NonNegative => YearPolicy::NonNegative,
            PublishedYearRule::Historical => YearPolicy::historical(),
        };
        let limiter = RateLimiter::new(
            config.rate_limit.authors_per_window,
            Duration::from_secs(config.rate_limit.window_seconds),
        );

        Self::new(
            AuthService::new(db.clone(), codec, subject_check),
            AuthorRegistry::new(db.clone()),
            BookCatalog::new(db),
            year_policy,
            limiter,
        )
    }
}
