use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::OffsetDateTime;
use tracing::debug;

use crate::{
    auth::claims::{Claims, TokenTtl},
    config::JwtConfig,
};

#[derive(Debug, thiserror::Error)]
pub enum InvalidToken {
    #[error("token rejected: {0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),
    #[error("token expired")]
    Expired,
}

/// HS256 signing and verification keys, built once from the configured secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self::from_secret(config.secret.as_bytes())
    }

    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn issue(&self, user_id: i32, email: &str, ttl: TokenTtl) -> anyhow::Result<String> {
        self.issue_at(user_id, email, ttl, OffsetDateTime::now_utc())
    }

    pub fn issue_at(
        &self,
        user_id: i32,
        email: &str,
        ttl: TokenTtl,
        now: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let exp = now + ttl.duration();
        let claims = Claims {
            id: user_id,
            email: email.to_string(),
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id, ttl = ?ttl, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// Checks the signature and requires `exp` to be strictly after `now`.
    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Claims, InvalidToken> {
        // Expiry is checked against `now` below instead of the library's wall clock.
        let mut validation = Validation::default();
        validation.validate_exp = false;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        if data.claims.exp <= now.unix_timestamp() {
            return Err(InvalidToken::Expired);
        }
        debug!(user_id = data.claims.id, "jwt verified");
        Ok(data.claims)
    }
}
