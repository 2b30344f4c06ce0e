use anyhow::{bail, Context};
use serde::Deserialize;

/// Shortest accepted `JWT_SECRET`, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub cookie_name: String,
}

/// Switches between the behaviours the service used to ship as separate builds.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    pub signup: bool,
    pub login_cookie: bool,
    pub enforce_ownership: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            signup: true,
            login_cookie: false,
            enforce_ownership: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub allowed_origins: Vec<String>,
    pub features: FeatureFlags,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").context("JWT_SECRET is not set")?;
        if secret.len() < MIN_SECRET_LEN {
            bail!("JWT_SECRET must be at least {MIN_SECRET_LEN} bytes");
        }

        let port = lookup("APP_PORT")
            .or_else(|| lookup("PORT"))
            .map(|v| v.parse::<u16>().with_context(|| format!("invalid port {v:?}")))
            .transpose()?
            .unwrap_or(8080);

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let defaults = FeatureFlags::default();
        let features = FeatureFlags {
            signup: flag(&lookup, "SIGNUP_ENABLED", defaults.signup)?,
            login_cookie: flag(&lookup, "LOGIN_COOKIE", defaults.login_cookie)?,
            enforce_ownership: flag(&lookup, "ENFORCE_OWNERSHIP", defaults.enforce_ownership)?,
        };

        Ok(Self {
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            database_url: lookup("DATABASE_URL").filter(|v| !v.is_empty()),
            jwt: JwtConfig {
                secret,
                cookie_name: lookup("AUTH_COOKIE_NAME").unwrap_or_else(|| "token".into()),
            },
            allowed_origins,
            features,
        })
    }
}

fn flag<F>(lookup: &F, key: &str, default: bool) -> anyhow::Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some("1") | Some("true") | Some("yes") | Some("on") => Ok(true),
        Some("0") | Some("false") | Some("no") | Some("off") => Ok(false),
        Some(other) => bail!("{key} must be a boolean, got {other:?}"),
    }
}
