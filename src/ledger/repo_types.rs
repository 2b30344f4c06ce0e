use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Whether a category adds to the balance or takes from it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Withdrawal,
    Deposit,
}

impl CategoryType {
    /// Accepts the numeric codes the web client sends (`0` withdrawal, `1` deposit)
    /// as well as the type names.
    pub fn from_query(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "0" | "withdrawal" => Some(Self::Withdrawal),
            "1" | "deposit" => Some(Self::Deposit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Category {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: CategoryType,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Transaction {
    pub id: i32,
    pub user_id: i32,
    pub category_id: i32,
    pub description: String,
    pub amount: Decimal, // magnitude; the category decides the sign
    #[serde(with = "time::serde::rfc3339")]
    pub transaction_date: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: i32,
    pub category_id: i32,
    pub description: String,
    pub amount: Decimal,
    pub transaction_date: Option<OffsetDateTime>,
}

/// Full replacement of a transaction's mutable fields. The owner never changes.
#[derive(Debug, Clone)]
pub struct TransactionUpdate {
    pub id: i32,
    pub category_id: i32,
    pub description: String,
    pub amount: Decimal,
    pub transaction_date: OffsetDateTime,
}
