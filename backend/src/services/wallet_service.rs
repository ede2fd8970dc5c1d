use crate::error::AppError;
use crate::models::User;
use bid_lotto_shared::{is_storable_amount, ERROR_USER_NOT_FOUND, MAX_AMOUNT};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::info;

// Postgres SQLSTATE numeric_value_out_of_range
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Per-user balance ledger. Balances never go negative.
#[derive(Clone)]
pub struct WalletService {
    db_pool: PgPool,
}

impl WalletService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    pub async fn get_balance(&self, user_id: i64) -> Result<Decimal, AppError> {
        User::wallet_balance(&self.db_pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_USER_NOT_FOUND.to_string()))
    }

    pub async fn increase(&self, user_id: i64, amount: Decimal) -> Result<Decimal, AppError> {
        ensure_positive(amount)?;

        let mut tx = self.db_pool.begin().await?;
        let balance = User::credit_wallet(&mut *tx, user_id, amount)
            .await
            .map_err(map_balance_overflow)?
            .ok_or_else(|| AppError::NotFound(ERROR_USER_NOT_FOUND.to_string()))?;
        tx.commit().await?;

        info!("Credited {} to wallet of user {}, balance {}", amount, user_id, balance);
        Ok(balance)
    }

    pub async fn decrease(&self, user_id: i64, amount: Decimal) -> Result<Decimal, AppError> {
        ensure_positive(amount)?;

        let mut tx = self.db_pool.begin().await?;
        let balance = debit(&mut *tx, user_id, amount).await?;
        tx.commit().await?;

        info!("Debited {} from wallet of user {}, balance {}", amount, user_id, balance);
        Ok(balance)
    }
}

/// Conditional debit inside an open transaction.
///
/// When no row was updated, the user row is re-read in the same transaction to tell
/// an unknown user (`NotFound`) from a short balance (`InsufficientFunds`).
pub(crate) async fn debit(conn: &mut PgConnection, user_id: i64, amount: Decimal) -> Result<Decimal, AppError> {
    if let Some(balance) = User::debit_wallet(&mut *conn, user_id, amount).await? {
        return Ok(balance);
    }

    match User::wallet_balance(&mut *conn, user_id).await? {
        Some(available) => Err(AppError::InsufficientFunds {
            available,
            required: amount,
        }),
        None => Err(AppError::NotFound(ERROR_USER_NOT_FOUND.to_string())),
    }
}

fn ensure_positive(amount: Decimal) -> Result<(), AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation("Amount must be a positive number".to_string()));
    }
    if !is_storable_amount(&amount) {
        return Err(AppError::Validation(format!(
            "Amount must have at most two decimals and not exceed {}",
            MAX_AMOUNT
        )));
    }
    Ok(())
}

/// A credit that would push the balance past the column's range is bad input, not a server fault.
pub(crate) fn map_balance_overflow(err: AppError) -> AppError {
    match err {
        AppError::Database(sqlx::Error::Database(db_err))
            if db_err.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) =>
        {
            AppError::Validation(format!("Wallet balance cannot exceed {}", MAX_AMOUNT))
        }
        other => other,
    }
}
