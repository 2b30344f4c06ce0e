use async_trait::async_trait;

use crate::db::PgStore;
use crate::ledger::repo_types::{
    Category, CategoryType, NewTransaction, Transaction, TransactionUpdate,
};
use crate::store::{LedgerStore, StoreError};

#[async_trait]
impl LedgerStore for PgStore {
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT id, name, type FROM categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_categories_by_type(
        &self,
        kind: CategoryType,
    ) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT id, name, type FROM categories WHERE type = $1 ORDER BY id",
        )
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_transaction(&self, id: i32) -> Result<Option<Transaction>, StoreError> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, user_id, category_id, description, amount, transaction_date
              FROM transactions
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_transactions(&self, user_id: i32) -> Result<Vec<Transaction>, StoreError> {
        let rows = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, user_id, category_id, description, amount, transaction_date
              FROM transactions
             WHERE user_id = $1
             ORDER BY transaction_date DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_transactions_by_category_type(
        &self,
        user_id: i32,
        kind: CategoryType,
    ) -> Result<Vec<Transaction>, StoreError> {
        let rows = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT t.id, t.user_id, t.category_id, t.description, t.amount, t.transaction_date
              FROM transactions t
              JOIN categories c ON c.id = t.category_id
             WHERE t.user_id = $1 AND c.type = $2
             ORDER BY t.transaction_date DESC, t.id DESC
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_transaction(&self, tx: NewTransaction) -> Result<Transaction, StoreError> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (user_id, category_id, description, amount, transaction_date)
            VALUES ($1, $2, $3, $4, COALESCE($5, now()))
            RETURNING id, user_id, category_id, description, amount, transaction_date
            "#,
        )
        .bind(tx.user_id)
        .bind(tx.category_id)
        .bind(&tx.description)
        .bind(tx.amount)
        .bind(tx.transaction_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_transaction(
        &self,
        update: TransactionUpdate,
    ) -> Result<Transaction, StoreError> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
               SET category_id = $2, description = $3, amount = $4, transaction_date = $5
             WHERE id = $1
            RETURNING id, user_id, category_id, description, amount, transaction_date
            "#,
        )
        .bind(update.id)
        .bind(update.category_id)
        .bind(&update.description)
        .bind(update.amount)
        .bind(update.transaction_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_transaction(&self, id: i32) -> Result<Transaction, StoreError> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            DELETE FROM transactions
             WHERE id = $1
            RETURNING id, user_id, category_id, description, amount, transaction_date
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
