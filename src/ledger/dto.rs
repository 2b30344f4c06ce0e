use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ledger::repo_types::{Category, Transaction};

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub user_id: i32,
    pub category_id: i32,
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub transaction_date: Option<OffsetDateTime>,
}

/// Full record; every field is replaced.
#[derive(Debug, Deserialize)]
pub struct UpdateTransactionRequest {
    pub id: i32,
    pub user_id: i32,
    pub category_id: i32,
    pub description: String,
    pub amount: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub transaction_date: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTransactionQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryTypeQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub saldo: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub transaction: Transaction,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

/// The key name is what deployed clients read.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedTransactionResponse {
    #[serde(rename = "deleteUser")]
    pub deleted: Transaction,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}
