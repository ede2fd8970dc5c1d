use crate::error::AppError;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

/// Row counts removed by a reset, per table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResetSummary {
    pub order_items: u64,
    pub cart_items: u64,
    pub orders: u64,
    pub draw_prizes: u64,
    pub tickets: u64,
    pub users: u64,
}

#[derive(Clone)]
pub struct AdminService {
    db_pool: PgPool,
}

impl AdminService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Wipe all business data except admin accounts.
    ///
    /// Children are deleted before parents inside one transaction; foreign keys stay enforced.
    pub async fn reset(&self) -> Result<ResetSummary, AppError> {
        let mut tx = self.db_pool.begin().await?;

        let summary = ResetSummary {
            order_items: delete(&mut tx, "DELETE FROM order_items").await?,
            cart_items: delete(&mut tx, "DELETE FROM cart_items").await?,
            orders: delete(&mut tx, "DELETE FROM orders").await?,
            draw_prizes: delete(&mut tx, "DELETE FROM draw_prizes").await?,
            tickets: delete(&mut tx, "DELETE FROM tickets").await?,
            users: delete(&mut tx, "DELETE FROM users WHERE role <> 'admin'").await?,
        };

        tx.commit().await?;

        info!("Reset complete: {:?}", summary);
        Ok(summary)
    }
}

async fn delete(tx: &mut sqlx::Transaction<'_, sqlx::Postgres>, sql: &str) -> Result<u64, AppError> {
    let result = sqlx::query(sql).execute(&mut **tx).await?;
    Ok(result.rows_affected())
}
