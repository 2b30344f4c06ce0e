use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use crate::{
    auth::{
        claims::TokenTtl,
        dto::{LoginRequest, SignupRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::{NewUser, User},
    },
    error::AppError,
    store::{CredentialStore, StoreError},
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Result of a successful login.
#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub token: String,
    pub ttl: TokenTtl,
}

pub async fn sign_up(users: &dyn CredentialStore, req: SignupRequest) -> Result<User, AppError> {
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    if req.password.is_empty() {
        return Err(AppError::Validation("Password is required".into()));
    }

    let password_hash = hash_password(&req.password).await?;

    let user = users
        .create(NewUser {
            email,
            name: name.to_string(),
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict => {
                warn!("email already registered");
                AppError::DuplicateUser
            }
            e => {
                error!(error = %e, "create user failed");
                AppError::from(e)
            }
        })?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(user)
}

pub async fn log_in(
    users: &dyn CredentialStore,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<Session, AppError> {
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    let user = match users.find_by_email(&email).await? {
        Some(u) => u,
        None => {
            warn!(%email, "login unknown email");
            return Err(AppError::UserNotFound);
        }
    };

    let ok = verify_password(&req.password, &user.password_hash)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = user.id, "verify_password failed");
            AppError::Internal(e)
        })?;
    if !ok || user.email != email {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let ttl = TokenTtl::from_choice(&req.time_token);
    let token = keys.issue(user.id, &user.email, ttl)?;

    info!(user_id = user.id, ttl = ?ttl, "user logged in");
    Ok(Session { user, token, ttl })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    fn signup(email: &str, password: &str, name: &str) -> SignupRequest {
        SignupRequest {
            email: email.into(),
            password: password.into(),
            name: name.into(),
        }
    }

    fn login(email: &str, password: &str, ttl: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
            time_token: ttl.into(),
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@x.com"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("not an email"));
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }

    #[tokio::test]
    async fn signup_then_login_yields_verifiable_token() {
        let store = InMemoryStore::new();
        let keys = JwtKeys::from_secret(b"service-test-secret");

        let user = sign_up(&store, signup("A@x.com", "p1", "A")).await.unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_ne!(user.password_hash, "p1");

        let session = log_in(&store, &keys, login("a@x.com", "p1", "1h")).await.unwrap();
        assert_eq!(session.ttl, TokenTtl::Short);
        let claims = keys.verify(&session.token).unwrap();
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.email, "a@x.com");
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected() {
        let store = InMemoryStore::new();
        sign_up(&store, signup("a@x.com", "p1", "A")).await.unwrap();
        let err = sign_up(&store, signup("A@X.COM", "p2", "B")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUser));
    }

    #[tokio::test]
    async fn signup_validates_fields() {
        let store = InMemoryStore::new();
        for req in [
            signup("nope", "p1", "A"),
            signup("a@x.com", "", "A"),
            signup("a@x.com", "p1", "  "),
        ] {
            let err = sign_up(&store, req).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email() {
        let store = InMemoryStore::new();
        let keys = JwtKeys::from_secret(b"service-test-secret");
        sign_up(&store, signup("a@x.com", "p1", "A")).await.unwrap();

        let err = log_in(&store, &keys, login("a@x.com", "wrong", "1h"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));

        let err = log_in(&store, &keys, login("b@x.com", "p1", "1h"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound));
    }
}
