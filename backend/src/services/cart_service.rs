use crate::error::AppError;
use crate::models::{CartLine, Order, OrderItem, Ticket, User};
use crate::services::wallet_service;
use chrono::Utc;
use bid_lotto_shared::{
    CartContentsResponse, CartItemResponse, OrderDetailResponse, OrderItemResponse, OrderOwner, OrderStatus,
    OrderSummaryResponse, TicketStatus, UnavailableReason, UserRole, ERROR_ALREADY_IN_CART,
    ERROR_CART_ITEM_NOT_FOUND, ERROR_NOT_OWNER, ERROR_ORDER_NOT_FOUND, ERROR_TICKET_NOT_FOUND, ERROR_USER_NOT_FOUND,
};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[cfg(test)]
mod tests;

/// Result of a successful reservation.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub cid: i64,
    pub order_id: i64,
    pub ticket: Ticket,
}

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub order_id: i64,
    pub total: Decimal,
    pub new_wallet: Decimal,
    pub ticket_ids: Vec<i64>,
}

/// Cart and order state machine: reserve, release, pay.
#[derive(Clone)]
pub struct CartService {
    db_pool: PgPool,
}

enum Reserve {
    Done(Reservation),
    Expired,
}

impl CartService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Reserve ticket `ticket_id` into the user's open order, creating the order if needed.
    pub async fn add_to_cart(&self, user_id: i64, ticket_id: i64) -> Result<Reservation, AppError> {
        let mut tx = self.db_pool.begin().await?;

        match Self::reserve_in(&mut *tx, user_id, ticket_id).await? {
            Reserve::Done(reservation) => {
                tx.commit().await?;
                info!(
                    "User {} reserved ticket {} (cart item {}, order {})",
                    user_id, ticket_id, reservation.cid, reservation.order_id
                );
                Ok(reservation)
            }
            Reserve::Expired => {
                // The expiry mark is kept even though the reservation fails.
                tx.commit().await?;
                warn!("User {} tried to reserve expired ticket {}", user_id, ticket_id);
                Err(AppError::TicketUnavailable {
                    ticket_id,
                    reason: UnavailableReason::Expired,
                })
            }
        }
    }

    async fn reserve_in(conn: &mut PgConnection, user_id: i64, ticket_id: i64) -> Result<Reserve, AppError> {
        let ticket = Ticket::find_by_id_for_update(&mut *conn, ticket_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_TICKET_NOT_FOUND.to_string()))?;

        if let Some(open) = Order::find_open_for_user(&mut *conn, user_id).await? {
            if CartLine::exists_in_order(&mut *conn, open.id, ticket_id).await? {
                return Err(AppError::Conflict(ERROR_ALREADY_IN_CART.to_string()));
            }
        }

        if let Some(reason) = UnavailableReason::from_status(ticket.status) {
            return Err(AppError::TicketUnavailable { ticket_id, reason });
        }

        if ticket.is_expired_at(Utc::now()) {
            Ticket::transition(&mut *conn, ticket_id, TicketStatus::Available, TicketStatus::Expired).await?;
            return Ok(Reserve::Expired);
        }

        let order = Order::find_or_create_open(&mut *conn, user_id).await?;

        if !Ticket::transition(&mut *conn, ticket_id, TicketStatus::Available, TicketStatus::InCart).await? {
            return Err(AppError::TicketUnavailable {
                ticket_id,
                reason: UnavailableReason::Reserved,
            });
        }

        let cid = CartLine::insert(&mut *conn, order.id, ticket_id)
            .await
            .map_err(|err| match err {
                AppError::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    AppError::TicketUnavailable {
                        ticket_id,
                        reason: UnavailableReason::Reserved,
                    }
                }
                other => other,
            })?;

        Ok(Reserve::Done(Reservation {
            cid,
            order_id: order.id,
            ticket: Ticket {
                status: TicketStatus::InCart,
                ..ticket
            },
        }))
    }

    /// Drop cart item `cid` from the user's open order and release its ticket.
    pub async fn remove_from_cart(&self, user_id: i64, cid: i64) -> Result<CartLine, AppError> {
        let mut tx = self.db_pool.begin().await?;

        let line = CartLine::find_owned_open(&mut *tx, cid, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_CART_ITEM_NOT_FOUND.to_string()))?;

        CartLine::delete(&mut *tx, cid).await?;
        let released =
            Ticket::transition(&mut *tx, line.ticket_id, TicketStatus::InCart, TicketStatus::Available).await?;

        tx.commit().await?;

        if !released {
            debug!("Ticket {} was not in_cart when cart item {} was removed", line.ticket_id, cid);
        }
        info!("User {} removed cart item {} (ticket {})", user_id, cid, line.ticket_id);

        Ok(line)
    }

    /// Pay for the user's open order in one transaction.
    pub async fn checkout(&self, user_id: i64) -> Result<CheckoutReceipt, AppError> {
        let mut tx = self.db_pool.begin().await?;
        let receipt = Self::checkout_in(&mut *tx, user_id).await?;
        tx.commit().await?;

        info!(
            "User {} paid order {} for {} ticket(s), total {}, wallet {}",
            user_id,
            receipt.order_id,
            receipt.ticket_ids.len(),
            receipt.total,
            receipt.new_wallet
        );

        Ok(receipt)
    }

    /// Checkout steps on a caller-owned connection. Nothing is committed here;
    /// any error leaves the caller's transaction to roll back.
    pub async fn checkout_in(conn: &mut PgConnection, user_id: i64) -> Result<CheckoutReceipt, AppError> {
        let order = Order::find_open_for_user_for_update(&mut *conn, user_id)
            .await?
            .ok_or(AppError::EmptyCart)?;

        let lines = CartLine::list_for_order(&mut *conn, order.id).await?;
        if lines.is_empty() {
            return Err(AppError::EmptyCart);
        }

        let total: Decimal = lines.iter().map(|line| line.price).sum();
        let ticket_ids: Vec<i64> = lines.iter().map(|line| line.ticket_id).collect();

        let available = User::wallet_balance(&mut *conn, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_USER_NOT_FOUND.to_string()))?;
        if available < total {
            return Err(AppError::InsufficientFunds {
                available,
                required: total,
            });
        }

        OrderItem::snapshot_cart(&mut *conn, order.id).await?;
        CartLine::delete_for_order(&mut *conn, order.id).await?;

        if !Order::mark_paid(&mut *conn, order.id, total).await? {
            return Err(AppError::Conflict(format!("Order {} is no longer open", order.id)));
        }

        let new_wallet = wallet_service::debit(&mut *conn, user_id, total).await?;

        let sold = Ticket::transition_many(&mut *conn, &ticket_ids, TicketStatus::InCart, TicketStatus::Sold).await?;
        if sold != ticket_ids.len() as u64 {
            return Err(AppError::Conflict(format!(
                "Only {} of {} reserved tickets could be sold",
                sold,
                ticket_ids.len()
            )));
        }

        Ok(CheckoutReceipt {
            order_id: order.id,
            total,
            new_wallet,
            ticket_ids,
        })
    }

    /// The user's open cart with its running total. An absent cart is reported as empty.
    pub async fn list_cart_contents(&self, user_id: i64) -> Result<CartContentsResponse, AppError> {
        let order = Order::find_open_for_user(&self.db_pool, user_id).await?;

        let lines = match &order {
            Some(order) => CartLine::list_for_order(&self.db_pool, order.id).await?,
            None => Vec::new(),
        };

        let total: Decimal = lines.iter().map(|line| line.price).sum();
        let items: Vec<CartItemResponse> = lines.into_iter().map(Into::into).collect();

        Ok(CartContentsResponse {
            message: if items.is_empty() {
                "Cart is empty".to_string()
            } else {
                format!("{} item(s) in cart", items.len())
            },
            order_id: order.map(|o| o.id),
            items,
            total,
        })
    }

    /// One order with its owner and lines. Customers may only read their own orders.
    pub async fn get_order_detail(
        &self,
        requester_id: i64,
        requester_role: UserRole,
        order_id: i64,
    ) -> Result<OrderDetailResponse, AppError> {
        let order = Order::find_by_id(&self.db_pool, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_ORDER_NOT_FOUND.to_string()))?;

        if requester_role != UserRole::Admin && order.user_id != requester_id {
            return Err(AppError::Authorization(ERROR_NOT_OWNER.to_string()));
        }

        let owner = User::find_by_id(&self.db_pool, order.user_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Owner of order {} not found", order_id)))?;

        let (items, total) = if order.status == OrderStatus::Open {
            let lines = CartLine::list_for_order(&self.db_pool, order.id).await?;
            let total: Decimal = lines.iter().map(|line| line.price).sum();
            let items: Vec<OrderItemResponse> = lines
                .into_iter()
                .map(|line| OrderItemResponse {
                    lotto_id: line.ticket_id,
                    number: line.number,
                    price: line.price,
                })
                .collect();
            (items, total)
        } else {
            let items: Vec<OrderItemResponse> = OrderItem::list_for_order(&self.db_pool, order.id)
                .await?
                .into_iter()
                .map(Into::into)
                .collect();
            (items, order.total)
        };

        Ok(OrderDetailResponse {
            order_id: order.id,
            user: OrderOwner {
                id: owner.id,
                name: owner.full_name(),
            },
            date: order.created_at,
            status: order.status,
            total,
            total_amount: items.len(),
            items,
        })
    }

    /// The user's paid and drawn orders, newest first, each with its lines.
    pub async fn list_my_orders(&self, user_id: i64) -> Result<Vec<OrderSummaryResponse>, AppError> {
        let orders = Order::list_completed_for_user(&self.db_pool, user_id).await?;
        let order_ids: Vec<i64> = orders.iter().map(|order| order.id).collect();

        let items = OrderItem::list_for_orders(&self.db_pool, &order_ids).await?;
        Ok(group_orders(orders, items))
    }
}

/// Attach receipt lines to their orders, keeping the order sequence.
fn group_orders(orders: Vec<Order>, items: Vec<OrderItem>) -> Vec<OrderSummaryResponse> {
    let mut by_order: HashMap<i64, Vec<OrderItemResponse>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item.into());
    }

    orders
        .into_iter()
        .map(|order| OrderSummaryResponse {
            oid: order.id,
            date: order.created_at,
            status: order.status,
            total: order.total,
            items: by_order.remove(&order.id).unwrap_or_default(),
        })
        .collect()
}
