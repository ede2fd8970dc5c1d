use chrono::{DateTime, Utc};
use bid_lotto_shared::{CartItemResponse, OrderItemResponse, OrderStatus, TicketStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgExecutor};

use crate::error::AppError;

const ORDER_COLUMNS: &str = "id, user_id, status, total, created_at, paid_at";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// A cart row joined with the ticket it reserves.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CartLine {
    pub cid: i64,
    pub order_id: i64,
    pub ticket_id: i64,
    pub number: String,
    pub price: Decimal,
    pub status: TicketStatus,
    pub expired_date: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub ticket_id: Option<i64>,
    pub number: String,
    pub price: Decimal,
}

/// Who holds a ticket: the order it sits in and that order's owner.
#[derive(Debug, Clone, FromRow)]
pub struct TicketHolder {
    pub order_id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
}

impl Order {
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<Option<Self>, AppError> {
        let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
        let order = sqlx::query_as::<_, Order>(&sql).bind(id).fetch_optional(executor).await?;
        Ok(order)
    }

    pub async fn find_open_for_user<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: i64,
    ) -> Result<Option<Self>, AppError> {
        let sql = format!("SELECT {} FROM orders WHERE user_id = $1 AND status = 'open'", ORDER_COLUMNS);
        let order = sqlx::query_as::<_, Order>(&sql).bind(user_id).fetch_optional(executor).await?;
        Ok(order)
    }

    pub async fn find_open_for_user_for_update<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: i64,
    ) -> Result<Option<Self>, AppError> {
        let sql = format!(
            "SELECT {} FROM orders WHERE user_id = $1 AND status = 'open' FOR UPDATE",
            ORDER_COLUMNS
        );
        let order = sqlx::query_as::<_, Order>(&sql).bind(user_id).fetch_optional(executor).await?;
        Ok(order)
    }

    /// Return the user's open order, creating it when missing.
    /// The one-open-order-per-user index makes concurrent creators converge on one row.
    pub async fn find_or_create_open(conn: &mut PgConnection, user_id: i64) -> Result<Self, AppError> {
        if let Some(order) = Self::find_open_for_user_for_update(&mut *conn, user_id).await? {
            return Ok(order);
        }

        let sql = format!(
            "INSERT INTO orders (user_id, status) VALUES ($1, 'open') \
             ON CONFLICT (user_id) WHERE status = 'open' DO NOTHING \
             RETURNING {}",
            ORDER_COLUMNS
        );
        if let Some(order) = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?
        {
            return Ok(order);
        }

        Self::find_open_for_user_for_update(&mut *conn, user_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Open order for user {} vanished", user_id)))
    }

    /// Orders past the cart stage, newest first.
    pub async fn list_completed_for_user<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: i64,
    ) -> Result<Vec<Self>, AppError> {
        let sql = format!(
            "SELECT {} FROM orders WHERE user_id = $1 AND status <> 'open' ORDER BY created_at DESC, id DESC",
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, Order>(&sql).bind(user_id).fetch_all(executor).await?;
        Ok(orders)
    }

    /// Open -> Paid, recording the total. Returns whether the row changed.
    pub async fn mark_paid<'e, E: PgExecutor<'e>>(executor: E, id: i64, total: Decimal) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'paid', total = $1, paid_at = NOW() WHERE id = $2 AND status = 'open'",
        )
        .bind(total)
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Close every paid order after a draw.
    pub async fn mark_all_paid_drawn<'e, E: PgExecutor<'e>>(executor: E) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE orders SET status = 'drawn' WHERE status = 'paid'")
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Owner of the order holding `ticket_id`, whether as a cart line or a receipt line.
    pub async fn holder_of_ticket<'e, E: PgExecutor<'e>>(
        executor: E,
        ticket_id: i64,
    ) -> Result<Option<TicketHolder>, AppError> {
        let holder = sqlx::query_as::<_, TicketHolder>(
            "SELECT o.id AS order_id, o.user_id, o.status \
             FROM order_items oi JOIN orders o ON o.id = oi.order_id \
             WHERE oi.ticket_id = $1 \
             UNION ALL \
             SELECT o.id AS order_id, o.user_id, o.status \
             FROM cart_items ci JOIN orders o ON o.id = ci.order_id \
             WHERE ci.ticket_id = $1 \
             LIMIT 1",
        )
        .bind(ticket_id)
        .fetch_optional(executor)
        .await?;
        Ok(holder)
    }
}

impl CartLine {
    const SELECT: &'static str = "SELECT ci.id AS cid, ci.order_id, t.id AS ticket_id, t.number, t.price, \
         t.status, t.expired_date \
         FROM cart_items ci JOIN tickets t ON t.id = ci.ticket_id";

    pub async fn insert<'e, E: PgExecutor<'e>>(executor: E, order_id: i64, ticket_id: i64) -> Result<i64, AppError> {
        let cid = sqlx::query_scalar::<_, i64>(
            "INSERT INTO cart_items (order_id, ticket_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(order_id)
        .bind(ticket_id)
        .fetch_one(executor)
        .await?;
        Ok(cid)
    }

    pub async fn exists_in_order<'e, E: PgExecutor<'e>>(
        executor: E,
        order_id: i64,
        ticket_id: i64,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM cart_items WHERE order_id = $1 AND ticket_id = $2)",
        )
        .bind(order_id)
        .bind(ticket_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn list_for_order<'e, E: PgExecutor<'e>>(executor: E, order_id: i64) -> Result<Vec<Self>, AppError> {
        let sql = format!("{} WHERE ci.order_id = $1 ORDER BY ci.id", Self::SELECT);
        let lines = sqlx::query_as::<_, CartLine>(&sql).bind(order_id).fetch_all(executor).await?;
        Ok(lines)
    }

    /// The cart line `cid`, only if it sits in `user_id`'s open order.
    pub async fn find_owned_open<'e, E: PgExecutor<'e>>(
        executor: E,
        cid: i64,
        user_id: i64,
    ) -> Result<Option<Self>, AppError> {
        let sql = format!(
            "{} JOIN orders o ON o.id = ci.order_id \
             WHERE ci.id = $1 AND o.user_id = $2 AND o.status = 'open' \
             FOR UPDATE OF ci",
            Self::SELECT
        );
        let line = sqlx::query_as::<_, CartLine>(&sql)
            .bind(cid)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;
        Ok(line)
    }

    pub async fn delete<'e, E: PgExecutor<'e>>(executor: E, cid: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(cid)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn delete_for_order<'e, E: PgExecutor<'e>>(executor: E, order_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE order_id = $1")
            .bind(order_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

impl From<CartLine> for CartItemResponse {
    fn from(line: CartLine) -> Self {
        Self {
            cid: line.cid,
            lotto_id: line.ticket_id,
            number: line.number,
            price: line.price,
            status: line.status,
            expired_date: line.expired_date,
        }
    }
}

impl OrderItem {
    /// Snapshot the order's cart lines into receipt rows.
    pub async fn snapshot_cart<'e, E: PgExecutor<'e>>(executor: E, order_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "INSERT INTO order_items (order_id, ticket_id, number, price) \
             SELECT ci.order_id, t.id, t.number, t.price \
             FROM cart_items ci JOIN tickets t ON t.id = ci.ticket_id \
             WHERE ci.order_id = $1 ORDER BY ci.id",
        )
        .bind(order_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_for_order<'e, E: PgExecutor<'e>>(executor: E, order_id: i64) -> Result<Vec<Self>, AppError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, ticket_id, number, price FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn list_for_orders<'e, E: PgExecutor<'e>>(
        executor: E,
        order_ids: &[i64],
    ) -> Result<Vec<Self>, AppError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, ticket_id, number, price FROM order_items \
             WHERE order_id = ANY($1) ORDER BY order_id, id",
        )
        .bind(order_ids)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            // Receipts outlive regenerated inventory; 0 marks a ticket that no longer exists.
            lotto_id: item.ticket_id.unwrap_or_default(),
            number: item.number,
            price: item.price,
        }
    }
}
