//! Persistence seams. Handlers only see these traits; Postgres and the
//! in-memory store both implement them.

use async_trait::async_trait;

use crate::auth::repo_types::{NewUser, User};
use crate::ledger::repo_types::{
    Category, CategoryType, NewTransaction, Transaction, TransactionUpdate,
};

pub mod memory;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No row matched the key.
    #[error("record not found")]
    NotFound,

    /// A unique constraint rejected the write.
    #[error("record already exists")]
    Conflict,

    /// A foreign key did not point at an existing row.
    #[error("referenced record does not exist")]
    InvalidReference,

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// The in-memory store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = err {
            return StoreError::NotFound;
        }
        let kind = err.as_database_error().map(|db| db.kind());
        match kind {
            Some(sqlx::error::ErrorKind::UniqueViolation) => StoreError::Conflict,
            Some(sqlx::error::ErrorKind::ForeignKeyViolation) => StoreError::InvalidReference,
            _ => StoreError::Database(err),
        }
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Fails with [`StoreError::Conflict`] when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
    async fn set_avatar(
        &self,
        id: i32,
        avatar_url: &str,
        delete_url: &str,
    ) -> Result<User, StoreError>;
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;
    async fn list_categories_by_type(
        &self,
        kind: CategoryType,
    ) -> Result<Vec<Category>, StoreError>;

    async fn find_transaction(&self, id: i32) -> Result<Option<Transaction>, StoreError>;
    /// Newest first.
    async fn list_transactions(&self, user_id: i32) -> Result<Vec<Transaction>, StoreError>;
    async fn list_transactions_by_category_type(
        &self,
        user_id: i32,
        kind: CategoryType,
    ) -> Result<Vec<Transaction>, StoreError>;
    async fn create_transaction(&self, tx: NewTransaction) -> Result<Transaction, StoreError>;
    async fn update_transaction(
        &self,
        update: TransactionUpdate,
    ) -> Result<Transaction, StoreError>;
    async fn delete_transaction(&self, id: i32) -> Result<Transaction, StoreError>;
}
