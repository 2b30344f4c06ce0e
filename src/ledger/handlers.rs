use axum::{
    extract::{Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use tracing::{error, instrument};

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    ledger::{
        dto::{
            BalanceResponse, CategoriesResponse, CategoryTypeQuery, CreateTransactionRequest,
            DeleteTransactionQuery, DeletedTransactionResponse, TransactionResponse,
            TransactionsResponse, UpdateTransactionRequest,
        },
        repo_types::CategoryType,
        services,
    },
    state::AppState,
};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/calculaSaldo", get(calcula_saldo))
        .route("/getTransactions", get(list_transactions))
        .route("/getCategories", get(list_categories))
        .route("/getCategoriesByType", get(list_categories_by_type))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/createTransaction", post(create_transaction))
        .route("/updateTransaction", put(update_transaction))
        .route("/deleteTransaction", delete(delete_transaction))
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn calcula_saldo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<BalanceResponse>, AppError> {
    let saldo = services::compute_balance(state.ledger.as_ref(), user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "balance failed");
            e
        })?;
    Ok(Json(BalanceResponse { saldo }))
}

#[instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TransactionsResponse>, AppError> {
    let transactions = state.ledger.list_transactions(user_id).await?;
    Ok(Json(TransactionsResponse { transactions }))
}

#[instrument(skip(state, payload))]
pub async fn create_transaction(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateTransactionRequest>, AppError>,
) -> Result<Json<TransactionResponse>, AppError> {
    let transaction = services::create_transaction(
        state.ledger.as_ref(),
        &state.config.features,
        caller,
        payload,
    )
    .await?;
    Ok(Json(TransactionResponse { transaction }))
}

#[instrument(skip(state, payload))]
pub async fn update_transaction(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateTransactionRequest>, AppError>,
) -> Result<Json<TransactionResponse>, AppError> {
    let transaction = services::update_transaction(
        state.ledger.as_ref(),
        &state.config.features,
        caller,
        payload,
    )
    .await?;
    Ok(Json(TransactionResponse { transaction }))
}

#[instrument(skip(state))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    WithRejection(Query(q), _): WithRejection<Query<DeleteTransactionQuery>, AppError>,
) -> Result<Json<DeletedTransactionResponse>, AppError> {
    let id = q
        .id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("id is required".into()))?
        .parse::<i32>()
        .map_err(|_| AppError::Validation("id must be an integer".into()))?;

    let deleted =
        services::delete_transaction(state.ledger.as_ref(), &state.config.features, caller, id)
            .await?;
    Ok(Json(DeletedTransactionResponse { deleted }))
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let categories = state.ledger.list_categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}

#[instrument(skip(state))]
pub async fn list_categories_by_type(
    State(state): State<AppState>,
    WithRejection(Query(q), _): WithRejection<Query<CategoryTypeQuery>, AppError>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let kind = q
        .kind
        .as_deref()
        .and_then(CategoryType::from_query)
        .ok_or_else(|| AppError::Validation("type must be 0 (withdrawal) or 1 (deposit)".into()))?;
    let categories = state.ledger.list_categories_by_type(kind).await?;
    Ok(Json(CategoriesResponse { categories }))
}
