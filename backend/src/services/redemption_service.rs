use crate::error::AppError;
use crate::models::{DrawPrize, Order, Ticket, User};
use crate::services::wallet_service;
use bid_lotto_shared::{
    OrderStatus, RedeemResponse, TicketStatus, ERROR_ALREADY_REDEEMED, ERROR_NOT_DRAWN, ERROR_NOT_OWNER, ERROR_NOT_PURCHASED,
    ERROR_TICKET_NOT_FOUND, ERROR_USER_NOT_FOUND,
};
use sqlx::PgPool;
use tracing::{debug, info};

/// Pays out winning tickets to their owners.
#[derive(Clone)]
pub struct RedemptionService {
    db_pool: PgPool,
}

impl RedemptionService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Redeem ticket `number` for `user_id`.
    ///
    /// Fails with `Authorization` when the ticket is not in one of the user's orders,
    /// `PreconditionFailed` when that order is still an unpaid cart or was paid after the
    /// latest draw, and `Conflict` when the ticket was redeemed before. A ticket with no prize
    /// is reported with `win: false`.
    pub async fn redeem(&self, user_id: i64, number: &str) -> Result<RedeemResponse, AppError> {
        let mut tx = self.db_pool.begin().await?;

        let ticket = Ticket::find_active_by_number_for_update(&mut *tx, number)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_TICKET_NOT_FOUND.to_string()))?;

        let holder = Order::holder_of_ticket(&mut *tx, ticket.id).await?;
        match holder {
            Some(holder) if holder.user_id == user_id => match holder.status {
                OrderStatus::Open => return Err(AppError::PreconditionFailed(ERROR_NOT_PURCHASED.to_string())),
                // Bought after the last draw: that draw's prizes are not for this order.
                OrderStatus::Paid => return Err(AppError::PreconditionFailed(ERROR_NOT_DRAWN.to_string())),
                OrderStatus::Drawn => {}
            },
            _ => return Err(AppError::Authorization(ERROR_NOT_OWNER.to_string())),
        }

        match ticket.status {
            TicketStatus::Redeemed => return Err(AppError::Conflict(ERROR_ALREADY_REDEEMED.to_string())),
            TicketStatus::Sold => {}
            other => {
                return Err(AppError::PreconditionFailed(format!(
                    "{} (status {})",
                    ERROR_NOT_PURCHASED, other
                )))
            }
        }

        let Some(prize) = DrawPrize::find_by_number(&mut *tx, number, None).await? else {
            let wallet = User::wallet_balance(&mut *tx, user_id)
                .await?
                .ok_or_else(|| AppError::NotFound(ERROR_USER_NOT_FOUND.to_string()))?;
            debug!("Ticket {} held by user {} has no prize", number, user_id);
            return Ok(RedeemResponse {
                message: "This lotto did not win".to_string(),
                number: number.to_string(),
                win: false,
                reward_point: None,
                seq: None,
                wallet,
            });
        };

        if !Ticket::transition(&mut *tx, ticket.id, TicketStatus::Sold, TicketStatus::Redeemed).await? {
            return Err(AppError::Conflict(ERROR_ALREADY_REDEEMED.to_string()));
        }

        let wallet = User::credit_wallet(&mut *tx, user_id, prize.reward_point)
            .await
            .map_err(wallet_service::map_balance_overflow)?
            .ok_or_else(|| AppError::NotFound(ERROR_USER_NOT_FOUND.to_string()))?;

        tx.commit().await?;

        info!(
            "User {} redeemed ticket {} (prize seq {}) for {}, wallet {}",
            user_id, number, prize.seq, prize.reward_point, wallet
        );

        Ok(RedeemResponse {
            message: "Prize redeemed successfully".to_string(),
            number: number.to_string(),
            win: true,
            reward_point: Some(prize.reward_point),
            seq: Some(prize.seq),
            wallet,
        })
    }
}
