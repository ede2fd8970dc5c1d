use chrono::{DateTime, Utc};
use bid_lotto_shared::{TicketResponse, TicketStatus, UpdateTicketRequest};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

use crate::error::AppError;

const TICKET_COLUMNS: &str = "id, number, price, status, expired_date";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub number: String,
    pub price: Decimal,
    pub status: TicketStatus,
    pub expired_date: DateTime<Utc>,
}

impl Ticket {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == TicketStatus::Expired || self.expired_date <= now
    }

    pub async fn list_all<'e, E: PgExecutor<'e>>(executor: E) -> Result<Vec<Self>, AppError> {
        let sql = format!("SELECT {} FROM tickets ORDER BY id", TICKET_COLUMNS);
        let tickets = sqlx::query_as::<_, Ticket>(&sql).fetch_all(executor).await?;
        Ok(tickets)
    }

    pub async fn list_by_status<'e, E: PgExecutor<'e>>(
        executor: E,
        status: TicketStatus,
    ) -> Result<Vec<Self>, AppError> {
        let sql = format!("SELECT {} FROM tickets WHERE status = $1 ORDER BY id", TICKET_COLUMNS);
        let tickets = sqlx::query_as::<_, Ticket>(&sql).bind(status).fetch_all(executor).await?;
        Ok(tickets)
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<Option<Self>, AppError> {
        let sql = format!("SELECT {} FROM tickets WHERE id = $1", TICKET_COLUMNS);
        let ticket = sqlx::query_as::<_, Ticket>(&sql).bind(id).fetch_optional(executor).await?;
        Ok(ticket)
    }

    /// Row-locking read used before deciding on a state change.
    pub async fn find_by_id_for_update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: i64,
    ) -> Result<Option<Self>, AppError> {
        let sql = format!("SELECT {} FROM tickets WHERE id = $1 FOR UPDATE", TICKET_COLUMNS);
        let ticket = sqlx::query_as::<_, Ticket>(&sql).bind(id).fetch_optional(executor).await?;
        Ok(ticket)
    }

    /// The live (non-expired) ticket carrying `number`, locked for update.
    pub async fn find_active_by_number_for_update<'e, E: PgExecutor<'e>>(
        executor: E,
        number: &str,
    ) -> Result<Option<Self>, AppError> {
        let sql = format!(
            "SELECT {} FROM tickets WHERE number = $1 AND status <> 'expired' FOR UPDATE",
            TICKET_COLUMNS
        );
        let ticket = sqlx::query_as::<_, Ticket>(&sql).bind(number).fetch_optional(executor).await?;
        Ok(ticket)
    }

    pub async fn delete_all<'e, E: PgExecutor<'e>>(executor: E) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM tickets").execute(executor).await?;
        Ok(result.rows_affected())
    }

    /// Insert one row per number with a shared price and expiry.
    pub async fn insert_batch<'e, E: PgExecutor<'e>>(
        executor: E,
        numbers: &[String],
        price: Decimal,
        expired_date: DateTime<Utc>,
    ) -> Result<Vec<Self>, AppError> {
        let sql = format!(
            "INSERT INTO tickets (number, price, status, expired_date) \
             SELECT n, $2, 'available'::ticket_status, $3 FROM UNNEST($1::VARCHAR[]) AS n \
             RETURNING {}",
            TICKET_COLUMNS
        );

        let tickets = sqlx::query_as::<_, Ticket>(&sql)
            .bind(numbers)
            .bind(price)
            .bind(expired_date)
            .fetch_all(executor)
            .await?;
        Ok(tickets)
    }

    /// Merge the supplied fields onto the row. `None` when the ticket does not exist.
    pub async fn update_fields<'e, E: PgExecutor<'e>>(
        executor: E,
        id: i64,
        changes: &UpdateTicketRequest,
    ) -> Result<Option<Self>, AppError> {
        let sql = format!(
            "UPDATE tickets SET \
                number = COALESCE($2, number), \
                price = COALESCE($3, price), \
                status = COALESCE($4, status), \
                expired_date = COALESCE($5, expired_date) \
             WHERE id = $1 RETURNING {}",
            TICKET_COLUMNS
        );

        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(id)
            .bind(changes.number.as_deref())
            .bind(changes.price)
            .bind(changes.status)
            .bind(changes.expired_date)
            .fetch_optional(executor)
            .await?;
        Ok(ticket)
    }

    /// Compare-and-swap: move the ticket to `to` only while it is in `from`.
    /// Returns whether the row changed.
    pub async fn transition<'e, E: PgExecutor<'e>>(
        executor: E,
        id: i64,
        from: TicketStatus,
        to: TicketStatus,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE tickets SET status = $1 WHERE id = $2 AND status = $3")
            .bind(to)
            .bind(id)
            .bind(from)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Bulk compare-and-swap over `ids`. Returns the number of rows moved.
    pub async fn transition_many<'e, E: PgExecutor<'e>>(
        executor: E,
        ids: &[i64],
        from: TicketStatus,
        to: TicketStatus,
    ) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE tickets SET status = $1 WHERE id = ANY($2) AND status = $3")
            .bind(to)
            .bind(ids)
            .bind(from)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Unconditional status write for one or many tickets.
    pub async fn set_status<'e, E: PgExecutor<'e>>(
        executor: E,
        ids: &[i64],
        status: TicketStatus,
    ) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE tickets SET status = $1 WHERE id = ANY($2)")
            .bind(status)
            .bind(ids)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// `count` random numbers from the live inventory. Tickets past their expiry date are
    /// skipped even when nobody has flipped them to `expired` yet.
    pub async fn sample_numbers<'e, E: PgExecutor<'e>>(executor: E, count: i64) -> Result<Vec<String>, AppError> {
        let numbers = sqlx::query_scalar::<_, String>(
            "SELECT number FROM tickets WHERE status <> 'expired' AND expired_date > NOW() \
             ORDER BY RANDOM() LIMIT $1",
        )
        .bind(count)
        .fetch_all(executor)
        .await?;
        Ok(numbers)
    }
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            number: ticket.number,
            price: ticket.price,
            status: ticket.status,
            expired_date: ticket.expired_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ticket(status: TicketStatus, expired_date: DateTime<Utc>) -> Ticket {
        Ticket {
            id: 1,
            number: "123456".to_string(),
            price: Decimal::from(80),
            status,
            expired_date,
        }
    }

    #[test]
    fn expiry_follows_date_and_status() {
        let now = Utc::now();
        assert!(!ticket(TicketStatus::Available, now + Duration::days(1)).is_expired_at(now));
        assert!(ticket(TicketStatus::Available, now - Duration::seconds(1)).is_expired_at(now));
        assert!(ticket(TicketStatus::Expired, now + Duration::days(1)).is_expired_at(now));
    }
}
