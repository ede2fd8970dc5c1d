use crate::error::AppError;
use crate::models::{DrawPrize, Order, Ticket};
use crate::utils::lotto_number;
use crate::utils::validation::parse_draw_date;
use bid_lotto_shared::{is_storable_amount, CheckTicketResponse, DrawStrategy, MAX_AMOUNT, MAX_DRAW_COUNT};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, info};

/// What a committed draw produced.
#[derive(Debug, Clone)]
pub struct DrawOutcome {
    pub strategy: DrawStrategy,
    pub prizes: Vec<DrawPrize>,
    pub orders_closed: u64,
}

/// Draw engine: picks winning numbers and closes paid orders.
#[derive(Clone)]
pub struct DrawService {
    db_pool: PgPool,
    default_strategy: DrawStrategy,
}

impl DrawService {
    pub fn new(db_pool: PgPool, default_strategy: DrawStrategy) -> Self {
        Self {
            db_pool,
            default_strategy,
        }
    }

    pub fn default_strategy(&self) -> DrawStrategy {
        self.default_strategy
    }

    /// Run a draw with one prize per entry of `reward_points`.
    ///
    /// Earlier prizes are discarded, winners are numbered `1..=n` in pick order,
    /// and every paid order moves to drawn. All of it commits or none of it does.
    pub async fn draw(
        &self,
        reward_points: &[Decimal],
        strategy: Option<DrawStrategy>,
    ) -> Result<DrawOutcome, AppError> {
        validate_reward_points(reward_points)?;
        let strategy = strategy.unwrap_or(self.default_strategy);
        let count = reward_points.len();

        let mut tx = self.db_pool.begin().await?;

        let cleared = DrawPrize::delete_all(&mut *tx).await?;
        debug!("Cleared {} prize(s) from the previous draw", cleared);

        let numbers = match strategy {
            DrawStrategy::FromInventory => {
                let numbers = Ticket::sample_numbers(&mut *tx, count as i64).await?;
                if numbers.len() < count {
                    return Err(AppError::Validation(format!(
                        "Only {} lotto(s) in inventory, cannot draw {}",
                        numbers.len(),
                        count
                    )));
                }
                numbers
            }
            DrawStrategy::FreshNumbers => lotto_number::unique_numbers(&mut rand::thread_rng(), count)?,
        };

        let mut prizes = DrawPrize::insert_batch(&mut *tx, &numbers, reward_points).await?;
        prizes.sort_by_key(|prize| prize.seq);

        let orders_closed = Order::mark_all_paid_drawn(&mut *tx).await?;

        tx.commit().await?;

        info!(
            "Drew {} prize(s) using {}, closed {} paid order(s)",
            prizes.len(),
            strategy,
            orders_closed
        );

        Ok(DrawOutcome {
            strategy,
            prizes,
            orders_closed,
        })
    }

    /// Whether `number` won, optionally only in a draw held on `date` (`YYYY-MM-DD`).
    pub async fn check(&self, number: &str, date: Option<&str>) -> Result<CheckTicketResponse, AppError> {
        let day = date.map(parse_draw_date).transpose()?;

        let prize = DrawPrize::find_by_number(&self.db_pool, number, day).await?;

        Ok(match prize {
            Some(prize) => CheckTicketResponse {
                number: number.to_string(),
                win: true,
                checked_date: date.map(str::to_string),
                dpid: Some(prize.id),
                win_date: Some(prize.drawn_at),
                reward_point: Some(prize.reward_point),
                seq: Some(prize.seq),
            },
            None => CheckTicketResponse {
                number: number.to_string(),
                win: false,
                checked_date: date.map(str::to_string),
                dpid: None,
                win_date: None,
                reward_point: None,
                seq: None,
            },
        })
    }

    pub async fn current_prizes(&self) -> Result<Vec<DrawPrize>, AppError> {
        DrawPrize::list_all(&self.db_pool).await
    }
}

fn validate_reward_points(reward_points: &[Decimal]) -> Result<(), AppError> {
    if reward_points.is_empty() {
        return Err(AppError::Validation("rewardPoints must not be empty".to_string()));
    }
    if reward_points.len() > MAX_DRAW_COUNT {
        return Err(AppError::Validation(format!(
            "rewardPoints cannot have more than {} entries",
            MAX_DRAW_COUNT
        )));
    }
    if reward_points.iter().any(|point| *point < Decimal::ZERO) {
        return Err(AppError::Validation("Reward points cannot be negative".to_string()));
    }
    if !reward_points.iter().all(is_storable_amount) {
        return Err(AppError::Validation(format!(
            "Reward points must have at most two decimals and not exceed {}",
            MAX_AMOUNT
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_points_must_be_present_and_non_negative() {
        assert!(validate_reward_points(&[]).is_err());
        assert!(validate_reward_points(&[Decimal::from(50), Decimal::from(-1)]).is_err());
        assert!(validate_reward_points(&vec![Decimal::ONE; MAX_DRAW_COUNT + 1]).is_err());
        assert!(validate_reward_points(&[Decimal::from(50), Decimal::ZERO]).is_ok());
        assert!(validate_reward_points(&[MAX_AMOUNT + Decimal::ONE]).is_err());
    }
}
