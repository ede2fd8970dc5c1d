use bid_lotto_backend::database::Database;
use bid_lotto_backend::models::{NewUser, User};
use bid_lotto_shared::UserRole;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::PgPool;
use std::env;
use std::sync::OnceLock;
use tokio::sync::{Mutex, MutexGuard};

// Every test truncates the same tables, so they run one at a time.
static DB_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub struct TestDb {
    pub pool: PgPool,
    _guard: MutexGuard<'static, ()>,
}

/// Fresh, migrated database, or `None` when `TEST_DATABASE_URL` is unset.
pub async fn test_db() -> Option<TestDb> {
    let Ok(url) = env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return None;
    };

    let guard = DB_LOCK.get_or_init(|| Mutex::new(())).lock().await;

    let database = Database::new(&url, 5).await.expect("connect to test database");
    database.migrate().await.expect("run migrations");
    let pool = database.pool().clone();

    // Left behind if a test that blocks ticket inserts panicked midway.
    sqlx::query("DROP TRIGGER IF EXISTS reject_ticket_inserts ON tickets")
        .execute(&pool)
        .await
        .expect("drop ticket insert trigger");

    sqlx::query("TRUNCATE order_items, cart_items, orders, draw_prizes, tickets, users RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .expect("truncate tables");

    Some(TestDb { pool, _guard: guard })
}

/// Make every insert into `tickets` fail until [`allow_ticket_inserts`] runs.
pub async fn block_ticket_inserts(pool: &PgPool) {
    sqlx::query(
        "CREATE OR REPLACE FUNCTION reject_ticket_insert() RETURNS trigger AS $$ \
         BEGIN RAISE EXCEPTION 'ticket inserts are blocked'; END $$ LANGUAGE plpgsql",
    )
    .execute(pool)
    .await
    .expect("create trigger function");

    sqlx::query(
        "CREATE TRIGGER reject_ticket_inserts BEFORE INSERT ON tickets \
         FOR EACH STATEMENT EXECUTE FUNCTION reject_ticket_insert()",
    )
    .execute(pool)
    .await
    .expect("create trigger");
}

pub async fn allow_ticket_inserts(pool: &PgPool) {
    sqlx::query("DROP TRIGGER IF EXISTS reject_ticket_inserts ON tickets")
        .execute(pool)
        .await
        .expect("drop trigger");
}

pub async fn create_user(pool: &PgPool, email: &str, role: UserRole) -> User {
    User::create(
        pool,
        NewUser {
            email: Some(email),
            phone: None,
            first_name: "Test",
            last_name: "User",
            password_hash: "not-a-real-hash",
            role,
        },
    )
    .await
    .expect("create user")
}

pub fn far_future() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2099, 12, 31, 0, 0, 0).unwrap()
}

pub fn long_ago() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
}
