use chrono::{DateTime, Utc};
use bid_lotto_shared::{UserResponse, UserRole};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

use crate::error::AppError;

const USER_COLUMNS: &str =
    "id, email, phone, first_name, last_name, password_hash, role, wallet, created_at, updated_at";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub wallet: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a user row.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
    pub role: UserRole,
}

/// Profile fields a user may change. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges<'a> {
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub async fn create<'e, E: PgExecutor<'e>>(executor: E, new_user: NewUser<'_>) -> Result<Self, AppError> {
        let sql = format!(
            "INSERT INTO users (email, phone, first_name, last_name, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(new_user.email)
            .bind(new_user.phone)
            .bind(new_user.first_name)
            .bind(new_user.last_name)
            .bind(new_user.password_hash)
            .bind(new_user.role)
            .fetch_one(executor)
            .await?;

        Ok(user)
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<Option<Self>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(executor).await?;
        Ok(user)
    }

    pub async fn find_by_email<'e, E: PgExecutor<'e>>(executor: E, email: &str) -> Result<Option<Self>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(executor).await?;
        Ok(user)
    }

    pub async fn find_by_phone<'e, E: PgExecutor<'e>>(executor: E, phone: &str) -> Result<Option<Self>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE phone = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql).bind(phone).fetch_optional(executor).await?;
        Ok(user)
    }

    pub async fn list_all<'e, E: PgExecutor<'e>>(executor: E) -> Result<Vec<Self>, AppError> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(executor).await?;
        Ok(users)
    }

    /// Whether another user already uses this email.
    pub async fn email_taken<'e, E: PgExecutor<'e>>(
        executor: E,
        email: &str,
        except_id: Option<i64>,
    ) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(except_id)
        .fetch_one(executor)
        .await?;
        Ok(taken)
    }

    /// Whether another user already uses this phone number.
    pub async fn phone_taken<'e, E: PgExecutor<'e>>(
        executor: E,
        phone: &str,
        except_id: Option<i64>,
    ) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE phone = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(phone)
        .bind(except_id)
        .fetch_one(executor)
        .await?;
        Ok(taken)
    }

    pub async fn update_profile<'e, E: PgExecutor<'e>>(
        executor: E,
        id: i64,
        changes: ProfileChanges<'_>,
    ) -> Result<Option<Self>, AppError> {
        let sql = format!(
            "UPDATE users SET \
                email = COALESCE($2, email), \
                phone = COALESCE($3, phone), \
                first_name = COALESCE($4, first_name), \
                last_name = COALESCE($5, last_name), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.email)
            .bind(changes.phone)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .fetch_optional(executor)
            .await?;

        Ok(user)
    }

    pub async fn wallet_balance<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<Option<Decimal>, AppError> {
        let balance = sqlx::query_scalar::<_, Decimal>("SELECT wallet FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(balance)
    }

    /// Add `amount` to the wallet and return the new balance, or `None` for an unknown user.
    pub async fn credit_wallet<'e, E: PgExecutor<'e>>(
        executor: E,
        id: i64,
        amount: Decimal,
    ) -> Result<Option<Decimal>, AppError> {
        let balance = sqlx::query_scalar::<_, Decimal>(
            "UPDATE users SET wallet = wallet + $1, updated_at = NOW() WHERE id = $2 RETURNING wallet",
        )
        .bind(amount)
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(balance)
    }

    /// Conditional debit. Returns `None` when the user is unknown or the balance is too small;
    /// the row is left untouched in both cases.
    pub async fn debit_wallet<'e, E: PgExecutor<'e>>(
        executor: E,
        id: i64,
        amount: Decimal,
    ) -> Result<Option<Decimal>, AppError> {
        let balance = sqlx::query_scalar::<_, Decimal>(
            "UPDATE users SET wallet = wallet - $1, updated_at = NOW() \
             WHERE id = $2 AND wallet >= $1 RETURNING wallet",
        )
        .bind(amount)
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(balance)
    }

    /// Create or promote the account behind `email` to admin. An existing account also takes
    /// the configured password, so whoever registered the address first cannot sign in as admin.
    pub async fn upsert_admin<'e, E: PgExecutor<'e>>(
        executor: E,
        email: &str,
        password_hash: &str,
    ) -> Result<Self, AppError> {
        let sql = format!(
            "INSERT INTO users (email, first_name, last_name, password_hash, role) \
             VALUES ($1, 'Admin', 'Admin', $2, 'admin') \
             ON CONFLICT (email) DO UPDATE \
             SET role = 'admin', password_hash = EXCLUDED.password_hash, updated_at = NOW() \
             RETURNING {}",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(password_hash)
            .fetch_one(executor)
            .await?;
        Ok(user)
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            phone: user.phone,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            wallet: user.wallet,
            created_at: user.created_at,
        }
    }
}
