use chrono::{DateTime, NaiveDate, Utc};
use bid_lotto_shared::DrawPrizeResponse;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

use crate::error::AppError;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DrawPrize {
    pub id: i64,
    pub drawn_at: DateTime<Utc>,
    pub number: String,
    pub reward_point: Decimal,
    pub seq: i32,
}

impl DrawPrize {
    pub async fn delete_all<'e, E: PgExecutor<'e>>(executor: E) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM draw_prizes").execute(executor).await?;
        Ok(result.rows_affected())
    }

    /// Insert prizes pairing `numbers[i]` with `reward_points[i]`, numbered `seq = i + 1`.
    pub async fn insert_batch<'e, E: PgExecutor<'e>>(
        executor: E,
        numbers: &[String],
        reward_points: &[Decimal],
    ) -> Result<Vec<Self>, AppError> {
        let prizes = sqlx::query_as::<_, DrawPrize>(
            "INSERT INTO draw_prizes (number, reward_point, seq) \
             SELECT p.number, p.reward_point, p.seq::INTEGER \
             FROM UNNEST($1::VARCHAR[], $2::NUMERIC[]) WITH ORDINALITY AS p(number, reward_point, seq) \
             ORDER BY p.seq \
             RETURNING id, drawn_at, number, reward_point, seq",
        )
        .bind(numbers)
        .bind(reward_points)
        .fetch_all(executor)
        .await?;
        Ok(prizes)
    }

    /// Most recent prize for `number`, optionally restricted to a draw day (UTC).
    pub async fn find_by_number<'e, E: PgExecutor<'e>>(
        executor: E,
        number: &str,
        date: Option<NaiveDate>,
    ) -> Result<Option<Self>, AppError> {
        let prize = sqlx::query_as::<_, DrawPrize>(
            "SELECT id, drawn_at, number, reward_point, seq FROM draw_prizes \
             WHERE number = $1 AND ($2::DATE IS NULL OR (drawn_at AT TIME ZONE 'UTC')::DATE = $2) \
             ORDER BY drawn_at DESC, seq ASC LIMIT 1",
        )
        .bind(number)
        .bind(date)
        .fetch_optional(executor)
        .await?;
        Ok(prize)
    }

    pub async fn list_all<'e, E: PgExecutor<'e>>(executor: E) -> Result<Vec<Self>, AppError> {
        let prizes = sqlx::query_as::<_, DrawPrize>(
            "SELECT id, drawn_at, number, reward_point, seq FROM draw_prizes ORDER BY seq",
        )
        .fetch_all(executor)
        .await?;
        Ok(prizes)
    }
}

impl From<DrawPrize> for DrawPrizeResponse {
    fn from(prize: DrawPrize) -> Self {
        Self {
            number: prize.number,
            reward_point: prize.reward_point,
            seq: prize.seq,
        }
    }
}
