pub mod auth_handlers;
pub mod author_handlers;
pub mod book_handlers;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod rate_limit;
pub mod router;
pub mod state;
pub mod upload;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use rate_limit::RateLimiter;
pub use state::AppState;
