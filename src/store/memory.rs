use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;

use super::{CredentialStore, LedgerStore, StoreError};
use crate::auth::repo_types::{NewUser, User};
use crate::ledger::repo_types::{
    Category, CategoryType, NewTransaction, Transaction, TransactionUpdate,
};

/// Same rows the bootstrap migration inserts.
const DEFAULT_CATEGORIES: &[(&str, CategoryType)] = &[
    ("Salary", CategoryType::Deposit),
    ("Freelance", CategoryType::Deposit),
    ("Investments", CategoryType::Deposit),
    ("Groceries", CategoryType::Withdrawal),
    ("Rent", CategoryType::Withdrawal),
    ("Transport", CategoryType::Withdrawal),
    ("Leisure", CategoryType::Withdrawal),
    ("Health", CategoryType::Withdrawal),
];

#[derive(Default)]
struct Inner {
    users: BTreeMap<i32, User>,
    categories: Vec<Category>,
    transactions: BTreeMap<i32, Transaction>,
    next_user_id: i32,
    next_transaction_id: i32,
}

/// Process-local store used when no `DATABASE_URL` is configured and in tests.
/// Enforces the same unique and foreign-key rules as the Postgres schema.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_categories() -> Self {
        let categories = DEFAULT_CATEGORIES
            .iter()
            .zip(1..)
            .map(|(&(name, kind), id)| Category {
                id,
                name: name.to_string(),
                kind,
            })
            .collect();
        Self {
            inner: Mutex::new(Inner {
                categories,
                ..Inner::default()
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl Inner {
    fn category(&self, id: i32) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
}

fn newest_first(mut rows: Vec<Transaction>) -> Vec<Transaction> {
    rows.sort_by(|a, b| {
        b.transaction_date
            .cmp(&a.transaction_date)
            .then_with(|| b.id.cmp(&a.id))
    });
    rows
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.lock()?;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict);
        }
        inner.next_user_id += 1;
        let created = User {
            id: inner.next_user_id,
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            avatar_url: None,
            delete_url: None,
        };
        inner.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn set_avatar(
        &self,
        id: i32,
        avatar_url: &str,
        delete_url: &str,
    ) -> Result<User, StoreError> {
        let mut inner = self.lock()?;
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.avatar_url = Some(avatar_url.to_string());
        user.delete_url = Some(delete_url.to_string());
        Ok(user.clone())
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.lock()?.categories.clone())
    }

    async fn list_categories_by_type(
        &self,
        kind: CategoryType,
    ) -> Result<Vec<Category>, StoreError> {
        Ok(self
            .lock()?
            .categories
            .iter()
            .filter(|c| c.kind == kind)
            .cloned()
            .collect())
    }

    async fn find_transaction(&self, id: i32) -> Result<Option<Transaction>, StoreError> {
        Ok(self.lock()?.transactions.get(&id).cloned())
    }

    async fn list_transactions(&self, user_id: i32) -> Result<Vec<Transaction>, StoreError> {
        let rows = self
            .lock()?
            .transactions
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows))
    }

    async fn list_transactions_by_category_type(
        &self,
        user_id: i32,
        kind: CategoryType,
    ) -> Result<Vec<Transaction>, StoreError> {
        let inner = self.lock()?;
        let rows = inner
            .transactions
            .values()
            .filter(|t| t.user_id == user_id)
            .filter(|t| inner.category(t.category_id).map(|c| c.kind) == Some(kind))
            .cloned()
            .collect();
        Ok(newest_first(rows))
    }

    async fn create_transaction(&self, tx: NewTransaction) -> Result<Transaction, StoreError> {
        let mut inner = self.lock()?;
        if inner.category(tx.category_id).is_none() || !inner.users.contains_key(&tx.user_id) {
            return Err(StoreError::InvalidReference);
        }
        inner.next_transaction_id += 1;
        let created = Transaction {
            id: inner.next_transaction_id,
            user_id: tx.user_id,
            category_id: tx.category_id,
            description: tx.description,
            amount: tx.amount,
            transaction_date: tx
                .transaction_date
                .unwrap_or_else(OffsetDateTime::now_utc),
        };
        inner.transactions.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_transaction(
        &self,
        update: TransactionUpdate,
    ) -> Result<Transaction, StoreError> {
        let mut inner = self.lock()?;
        if !inner.transactions.contains_key(&update.id) {
            return Err(StoreError::NotFound);
        }
        if inner.category(update.category_id).is_none() {
            return Err(StoreError::InvalidReference);
        }
        let row = inner
            .transactions
            .get_mut(&update.id)
            .ok_or(StoreError::NotFound)?;
        row.category_id = update.category_id;
        row.description = update.description;
        row.amount = update.amount;
        row.transaction_date = update.transaction_date;
        Ok(row.clone())
    }

    async fn delete_transaction(&self, id: i32) -> Result<Transaction, StoreError> {
        self.lock()?
            .transactions
            .remove(&id)
            .ok_or(StoreError::NotFound)
    }
}
