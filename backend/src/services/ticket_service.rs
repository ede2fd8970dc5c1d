use crate::error::AppError;
use crate::models::Ticket;
use crate::utils::lotto_number;
use chrono::{DateTime, Utc};
use bid_lotto_shared::{
    is_storable_amount, TicketStatus, UpdateTicketRequest, ERROR_TICKET_NOT_FOUND, MAX_AMOUNT, MAX_GENERATE_COUNT,
    MIN_GENERATE_COUNT,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, info};

/// Ticket inventory: bulk generation, reads and field updates.
#[derive(Clone)]
pub struct TicketService {
    db_pool: PgPool,
}

impl TicketService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Replace the whole inventory with `count` fresh tickets.
    ///
    /// Deleting the old set and inserting the new one happen in one transaction,
    /// so a failure leaves the previous inventory in place.
    pub async fn generate(
        &self,
        count: i64,
        price: Decimal,
        expired_date: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, AppError> {
        if !(MIN_GENERATE_COUNT..=MAX_GENERATE_COUNT).contains(&count) {
            return Err(AppError::Validation(format!(
                "count must be between {} and {}",
                MIN_GENERATE_COUNT, MAX_GENERATE_COUNT
            )));
        }
        if price < Decimal::ZERO {
            return Err(AppError::Validation("price cannot be negative".to_string()));
        }
        if !is_storable_amount(&price) {
            return Err(AppError::Validation(format!(
                "price must have at most two decimals and not exceed {}",
                MAX_AMOUNT
            )));
        }

        let numbers = lotto_number::unique_numbers(&mut rand::thread_rng(), count as usize)?;

        let mut tx = self.db_pool.begin().await?;
        let removed = Ticket::delete_all(&mut *tx).await?;
        let tickets = Ticket::insert_batch(&mut *tx, &numbers, price, expired_date).await?;
        tx.commit().await?;

        info!(
            "Generated {} tickets at {} expiring {} (replaced {})",
            tickets.len(),
            price,
            expired_date,
            removed
        );

        Ok(tickets)
    }

    pub async fn list_all(&self) -> Result<Vec<Ticket>, AppError> {
        Ticket::list_all(&self.db_pool).await
    }

    pub async fn list_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>, AppError> {
        Ticket::list_by_status(&self.db_pool, status).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Ticket, AppError> {
        Ticket::find_by_id(&self.db_pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_TICKET_NOT_FOUND.to_string()))
    }

    /// Merge the supplied fields onto ticket `id`.
    pub async fn update_fields(&self, id: i64, changes: UpdateTicketRequest) -> Result<Ticket, AppError> {
        if changes.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }

        debug!("Updating ticket {} fields {:?}", id, changes.field_names());

        let ticket = Ticket::update_fields(&self.db_pool, id, &changes)
            .await
            .map_err(map_number_conflict)?
            .ok_or_else(|| AppError::NotFound(ERROR_TICKET_NOT_FOUND.to_string()))?;

        info!("Updated ticket {} ({})", id, changes.field_names().join(", "));
        Ok(ticket)
    }

    /// Force one or many tickets into `status`.
    pub async fn set_status(&self, ids: &[i64], status: TicketStatus) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let updated = Ticket::set_status(&self.db_pool, ids, status).await?;
        if updated == 0 {
            return Err(AppError::NotFound(ERROR_TICKET_NOT_FOUND.to_string()));
        }

        info!("Set {} ticket(s) to {}", updated, status);
        Ok(updated)
    }
}

fn map_number_conflict(err: AppError) -> AppError {
    match err {
        AppError::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            AppError::Conflict("Another active lotto already uses this number".to_string())
        }
        other => other,
    }
}
