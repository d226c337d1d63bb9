use crate::{
    directory::UserDirectory,
    error::{AuthError, Result},
    jwt::{TokenCodec, TokenKind, TokenPair},
    model::{CurrentUser, Role, UserView},
    password::{hash_password, verify_password},
};
use sqlx::SqlitePool;

/// How much an access token is trusted when resolving the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubjectCheck {
    /// A valid signature and expiry are enough; no store round-trip.
    #[default]
    TrustToken,
    /// The subject must still exist in the user directory.
    Directory,
}

/// Registration, login and token lifecycle over the user directory
#[derive(Debug, Clone)]
pub struct AuthService {
    directory: UserDirectory,
    codec: TokenCodec,
    subject_check: SubjectCheck,
}

impl AuthService {
    /// Create a new AuthService
    ///
    /// # Arguments
    /// * `db` - Connection pool holding the `users` table
    /// * `codec` - Token codec carrying the signing secret
    /// * `subject_check` - Whether to re-validate token subjects per request
    pub fn new(db: SqlitePool, codec: TokenCodec, subject_check: SubjectCheck) -> Self {
        Self {
            directory: UserDirectory::new(db),
            codec,
            subject_check,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Register a new user with the default role
    pub async fn register(&self, email: &str, password: &str) -> Result<UserView> {
        if self.directory.find_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let hashed = hash_password(password)?;
        let user = self.directory.create(email, &hashed, Role::User).await?;

        tracing::info!(user_id = user.id, "registered user");
        Ok(user.view())
    }

    /// Check credentials and issue an access/refresh pair.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        let user = self
            .directory
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.hashed_password) {
            return Err(AuthError::InvalidCredentials);
        }

        self.codec.issue_pair(&user.email)
    }

    /// Mint a fresh access token from a refresh token. The refresh token
    /// itself stays valid until it expires.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        let claims = self.codec.decode(refresh_token, TokenKind::Refresh)?;
        self.codec.issue_access(&claims.sub)
    }

    /// Resolve the caller behind an access token
    pub async fn resolve_current_user(&self, access_token: &str) -> Result<CurrentUser> {
        let claims = self
            .codec
            .decode(access_token, TokenKind::Access)
            .map_err(|_| AuthError::Unauthenticated)?;

        if self.subject_check == SubjectCheck::Directory
            && self.directory.find_by_email(&claims.sub).await?.is_none()
        {
            tracing::warn!("access token subject no longer exists");
            return Err(AuthError::Unauthenticated);
        }

        Ok(CurrentUser { email: claims.sub })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service(subject_check: SubjectCheck) -> AuthService {
        let db = bookshelf_core::connect_in_memory().await.unwrap();
        AuthService::new(db, TokenCodec::new("test_secret", 1800, 604_800), subject_check)
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let service = service(SubjectCheck::TrustToken).await;

        let user = service.register("test@example.com", "password123").await.unwrap();
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.role, Role::User);

        let pair = service.login("test@example.com", "password123").await.unwrap();
        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());

        let current = service.resolve_current_user(&pair.access_token).await.unwrap();
        assert_eq!(current.email, "test@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let service = service(SubjectCheck::TrustToken).await;

        service.register("dup@example.com", "strongpass").await.unwrap();
        let second = service.register("dup@example.com", "anotherpass").await;

        assert!(matches!(second, Err(AuthError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = service(SubjectCheck::TrustToken).await;
        service.register("known@example.com", "password123").await.unwrap();

        let unknown = service.login("unknown@example.com", "password123").await;
        let wrong = service.login("known@example.com", "wrong").await;

        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_refresh_issues_access_token() {
        let service = service(SubjectCheck::TrustToken).await;
        service.register("refresh@example.com", "password123").await.unwrap();
        let pair = service.login("refresh@example.com", "password123").await.unwrap();

        let access = service.refresh(&pair.refresh_token).await.unwrap();
        let claims = service.codec().decode(&access, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, "refresh@example.com");

        // Not rotated: the same refresh token keeps working
        assert!(service.refresh(&pair.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let service = service(SubjectCheck::TrustToken).await;
        service.register("kind@example.com", "password123").await.unwrap();
        let pair = service.login("kind@example.com", "password123").await.unwrap();

        let result = service.refresh(&pair.access_token).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_current_user_rejects_refresh_token() {
        let service = service(SubjectCheck::TrustToken).await;
        service.register("me@example.com", "password123").await.unwrap();
        let pair = service.login("me@example.com", "password123").await.unwrap();

        let result = service.resolve_current_user(&pair.refresh_token).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_subject_check_policies() {
        let trusting = service(SubjectCheck::TrustToken).await;
        let strict = service(SubjectCheck::Directory).await;
        let ghost = trusting.codec().issue_access("ghost@example.com").unwrap();

        let trusted = trusting.resolve_current_user(&ghost).await.unwrap();
        assert_eq!(trusted.email, "ghost@example.com");

        let rejected = strict.resolve_current_user(&ghost).await;
        assert!(matches!(rejected, Err(AuthError::Unauthenticated)));

        strict.register("real@example.com", "password123").await.unwrap();
        let pair = strict.login("real@example.com", "password123").await.unwrap();
        assert!(strict.resolve_current_user(&pair.access_token).await.is_ok());
    }
}
