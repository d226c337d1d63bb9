// Core modules
mod error;
mod jwt;
mod password;

// Store-backed modules
pub mod directory;
pub mod model;
pub mod service;

// Re-export error types
pub use error::{AuthError, Result};

// Re-export crypto primitives
pub use jwt::{Claims, TokenCodec, TokenKind, TokenPair};
pub use password::{hash_password, verify_password};

pub use directory::UserDirectory;
pub use model::{CurrentUser, Role, User, UserView};
pub use service::{AuthService, SubjectCheck};
