use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::{
    auth::extractors::AuthUser,
    config::FeatureFlags,
    error::AppError,
    ledger::{
        dto::{CreateTransactionRequest, UpdateTransactionRequest},
        repo_types::{CategoryType, NewTransaction, Transaction, TransactionUpdate},
    },
    store::LedgerStore,
};

/// Fractional digits the `NUMERIC(14, 2)` column keeps.
const AMOUNT_SCALE: u32 = 2;

/// Largest value the `NUMERIC(14, 2)` column holds.
const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, AMOUNT_SCALE);

/// Deposits minus withdrawals over every transaction of `user_id`.
///
/// Recomputed from scratch on each call. The two sums come from separate
/// reads, so a write landing between them can be counted in only one.
pub async fn compute_balance(
    ledger: &dyn LedgerStore,
    user_id: i32,
) -> Result<Decimal, AppError> {
    let spent = total(
        &ledger
            .list_transactions_by_category_type(user_id, CategoryType::Withdrawal)
            .await?,
    )?;
    let deposited = total(
        &ledger
            .list_transactions_by_category_type(user_id, CategoryType::Deposit)
            .await?,
    )?;
    let saldo = deposited
        .checked_sub(spent)
        .ok_or_else(|| anyhow::anyhow!("balance of user {user_id} overflows"))?;
    debug!(user_id, %spent, %deposited, "balance computed");
    Ok(saldo)
}

fn total(rows: &[Transaction]) -> Result<Decimal, AppError> {
    rows.iter()
        .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(t.amount))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("transaction total overflows")))
}

/// Checks `amount` against the column and returns it at the stored scale.
fn validate_amount(amount: Decimal) -> Result<Decimal, AppError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AppError::Validation("Amount must not be negative".into()));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(AppError::Validation(format!(
            "Amount must have at most {AMOUNT_SCALE} decimal places"
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(AppError::Validation(format!(
            "Amount must not exceed {MAX_AMOUNT}"
        )));
    }
    let mut stored = amount;
    stored.rescale(AMOUNT_SCALE);
    Ok(stored)
}

/// With ownership enforcement on, the caller must be authenticated as `owner`.
fn check_owner(
    features: &FeatureFlags,
    caller: Option<AuthUser>,
    owner: i32,
) -> Result<(), AppError> {
    if !features.enforce_ownership {
        return Ok(());
    }
    match caller {
        None => Err(AppError::Unauthenticated),
        Some(AuthUser(id)) if id == owner => Ok(()),
        Some(AuthUser(id)) => {
            warn!(caller = id, owner, "cross-user transaction access");
            Err(AppError::Forbidden)
        }
    }
}

/// Loads `id` and, when enforcing ownership, hides it from everyone but its owner.
async fn owned_transaction(
    ledger: &dyn LedgerStore,
    features: &FeatureFlags,
    caller: Option<AuthUser>,
    id: i32,
) -> Result<(), AppError> {
    if !features.enforce_ownership {
        return Ok(());
    }
    let Some(AuthUser(caller_id)) = caller else {
        return Err(AppError::Unauthenticated);
    };
    match ledger.find_transaction(id).await? {
        Some(existing) if existing.user_id == caller_id => Ok(()),
        _ => Err(AppError::NotFound),
    }
}

pub async fn create_transaction(
    ledger: &dyn LedgerStore,
    features: &FeatureFlags,
    caller: Option<AuthUser>,
    req: CreateTransactionRequest,
) -> Result<Transaction, AppError> {
    check_owner(features, caller, req.user_id)?;
    let amount = validate_amount(req.amount)?;

    let created = ledger
        .create_transaction(NewTransaction {
            user_id: req.user_id,
            category_id: req.category_id,
            description: req.description,
            amount,
            transaction_date: req.transaction_date,
        })
        .await?;
    info!(id = created.id, user_id = created.user_id, "transaction created");
    Ok(created)
}

pub async fn update_transaction(
    ledger: &dyn LedgerStore,
    features: &FeatureFlags,
    caller: Option<AuthUser>,
    req: UpdateTransactionRequest,
) -> Result<Transaction, AppError> {
    check_owner(features, caller, req.user_id)?;
    let amount = validate_amount(req.amount)?;
    owned_transaction(ledger, features, caller, req.id).await?;

    let updated = ledger
        .update_transaction(TransactionUpdate {
            id: req.id,
            category_id: req.category_id,
            description: req.description,
            amount,
            transaction_date: req.transaction_date,
        })
        .await?;
    info!(id = updated.id, "transaction updated");
    Ok(updated)
}

pub async fn delete_transaction(
    ledger: &dyn LedgerStore,
    features: &FeatureFlags,
    caller: Option<AuthUser>,
    id: i32,
) -> Result<Transaction, AppError> {
    owned_transaction(ledger, features, caller, id).await?;
    let deleted = ledger.delete_transaction(id).await?;
    info!(id, user_id = deleted.user_id, "transaction deleted");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::NewUser;
    use crate::store::{memory::InMemoryStore, CredentialStore};
    use rust_decimal_macros::dec;

    // Seeded category ids: 1 = Salary (deposit), 4 = Groceries (withdrawal).
    const DEPOSIT: i32 = 1;
    const WITHDRAWAL: i32 = 4;

    async fn store_with_user() -> (InMemoryStore, i32) {
        let store = InMemoryStore::with_default_categories();
        let user = store
            .create(NewUser {
                email: "a@x.com".into(),
                name: "A".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap();
        (store, user.id)
    }

    async fn add(store: &InMemoryStore, user_id: i32, category_id: i32, amount: Decimal) {
        store
            .create_transaction(NewTransaction {
                user_id,
                category_id,
                description: String::new(),
                amount,
                transaction_date: None,
            })
            .await
            .unwrap();
    }

    fn create_req(user_id: i32, category_id: i32, amount: Decimal) -> CreateTransactionRequest {
        CreateTransactionRequest {
            user_id,
            category_id,
            description: "coffee".into(),
            amount,
            transaction_date: None,
        }
    }

    #[tokio::test]
    async fn balance_without_transactions_is_zero() {
        let (store, user_id) = store_with_user().await;
        assert_eq!(compute_balance(&store, user_id).await.unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn balance_is_deposits_minus_withdrawals() {
        let (store, user_id) = store_with_user().await;
        add(&store, user_id, DEPOSIT, dec!(100.00)).await;
        add(&store, user_id, WITHDRAWAL, dec!(30.00)).await;
        assert_eq!(compute_balance(&store, user_id).await.unwrap(), dec!(70.00));

        add(&store, user_id, WITHDRAWAL, dec!(1000000000.01)).await;
        assert_eq!(
            compute_balance(&store, user_id).await.unwrap(),
            dec!(-999999930.01)
        );
    }

    #[tokio::test]
    async fn many_small_amounts_do_not_drift() {
        let (store, user_id) = store_with_user().await;
        for _ in 0..1000 {
            add(&store, user_id, DEPOSIT, dec!(0.10)).await;
        }
        add(&store, user_id, WITHDRAWAL, dec!(0.30)).await;
        assert_eq!(compute_balance(&store, user_id).await.unwrap(), dec!(99.70));
    }

    #[tokio::test]
    async fn balance_ignores_other_users() {
        let (store, user_id) = store_with_user().await;
        let other = store
            .create(NewUser {
                email: "b@x.com".into(),
                name: "B".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap();
        add(&store, other.id, DEPOSIT, dec!(500)).await;
        add(&store, user_id, DEPOSIT, dec!(5)).await;
        assert_eq!(compute_balance(&store, user_id).await.unwrap(), dec!(5));
    }

    #[test]
    fn amount_validation() {
        assert!(validate_amount(dec!(0)).is_ok());
        assert!(validate_amount(dec!(12.50)).is_ok());
        assert!(validate_amount(dec!(-1)).is_err());
        assert!(validate_amount(dec!(0.001)).is_err());
    }

    #[test]
    fn amounts_are_bounded_by_the_column() {
        assert_eq!(MAX_AMOUNT, dec!(999999999999.99));
        assert!(validate_amount(dec!(999999999999.99)).is_ok());
        assert!(matches!(
            validate_amount(dec!(1000000000000)),
            Err(AppError::Validation(_))
        ));
        assert!(validate_amount(dec!(50000000000000000000000000000)).is_err());
    }

    #[test]
    fn amounts_come_back_at_two_decimal_places() {
        assert_eq!(validate_amount(dec!(12.500)).unwrap().to_string(), "12.50");
        assert_eq!(validate_amount(dec!(7)).unwrap().to_string(), "7.00");
        assert_eq!(validate_amount(dec!(0.1)).unwrap().to_string(), "0.10");
    }

    #[tokio::test]
    async fn balance_overflow_is_an_error_not_a_panic() {
        let (store, user_id) = store_with_user().await;
        add(&store, user_id, DEPOSIT, dec!(50000000000000000000000000000)).await;
        add(&store, user_id, DEPOSIT, dec!(50000000000000000000000000000)).await;
        let err = compute_balance(&store, user_id).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn oversized_amount_is_rejected_before_the_store() {
        let (store, user_id) = store_with_user().await;
        let err = create_transaction(
            &store,
            &FeatureFlags::default(),
            Some(AuthUser(user_id)),
            create_req(user_id, DEPOSIT, dec!(50000000000000000000000000000)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.list_transactions(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_category_fails() {
        let (store, user_id) = store_with_user().await;
        let err = create_transaction(
            &store,
            &FeatureFlags::default(),
            Some(AuthUser(user_id)),
            create_req(user_id, 999, dec!(1)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidReference));
    }

    #[tokio::test]
    async fn ownership_is_enforced_by_default() {
        let (store, user_id) = store_with_user().await;
        let flags = FeatureFlags::default();

        let err = create_transaction(&store, &flags, None, create_req(user_id, DEPOSIT, dec!(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));

        let err = create_transaction(
            &store,
            &flags,
            Some(AuthUser(user_id + 1)),
            create_req(user_id, DEPOSIT, dec!(1)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let created = create_transaction(
            &store,
            &flags,
            Some(AuthUser(user_id)),
            create_req(user_id, DEPOSIT, dec!(1)),
        )
        .await
        .unwrap();

        let err = delete_transaction(&store, &flags, Some(AuthUser(user_id + 1)), created.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn unchecked_mode_allows_anonymous_mutation() {
        let (store, user_id) = store_with_user().await;
        let flags = FeatureFlags {
            enforce_ownership: false,
            ..FeatureFlags::default()
        };

        let created = create_transaction(&store, &flags, None, create_req(user_id, DEPOSIT, dec!(2)))
            .await
            .unwrap();
        let deleted = delete_transaction(&store, &flags, None, created.id)
            .await
            .unwrap();
        assert_eq!(deleted.id, created.id);
    }
}
