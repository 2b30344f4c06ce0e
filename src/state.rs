use std::sync::Arc;

use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::db::PgStore;
use crate::store::{memory::InMemoryStore, CredentialStore, LedgerStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: Arc<JwtKeys>,
    pub users: Arc<dyn CredentialStore>,
    pub ledger: Arc<dyn LedgerStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let (users, ledger): (Arc<dyn CredentialStore>, Arc<dyn LedgerStore>) =
            match config.database_url.as_deref() {
                Some(url) => {
                    let store = Arc::new(PgStore::connect(url).await?);
                    if let Err(e) = store.migrate().await {
                        tracing::warn!(error = %e, "migration failed; continuing");
                    }
                    (store.clone() as Arc<dyn CredentialStore>, store as Arc<dyn LedgerStore>)
                }
                None => {
                    tracing::warn!("DATABASE_URL not set; using the in-memory store");
                    let store = Arc::new(InMemoryStore::with_default_categories());
                    (store.clone() as Arc<dyn CredentialStore>, store as Arc<dyn LedgerStore>)
                }
            };

        Ok(Self::from_parts(config, users, ledger))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn CredentialStore>,
        ledger: Arc<dyn LedgerStore>,
    ) -> Self {
        let keys = Arc::new(JwtKeys::new(&config.jwt));
        Self {
            config,
            keys,
            users,
            ledger,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with(crate::config::FeatureFlags::default())
    }

    /// In-memory state with the default categories seeded.
    #[cfg(test)]
    pub fn fake_with(features: crate::config::FeatureFlags) -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database_url: None,
            jwt: crate::config::JwtConfig {
                secret: "test-secret-test-secret-test-secret".into(),
                cookie_name: "token".into(),
            },
            allowed_origins: Vec::new(),
            features,
        });
        let store = Arc::new(InMemoryStore::with_default_categories());
        Self::from_parts(config, store.clone(), store)
    }
}
