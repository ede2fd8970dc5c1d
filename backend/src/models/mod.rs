//! Database models and their queries.
//!
//! Query functions take any `PgExecutor`, so the same call runs on the pool
//! or inside a transaction via `&mut *tx`.

pub mod draw_prize;
pub mod order;
pub mod ticket;
pub mod user;

pub use draw_prize::DrawPrize;
pub use order::{CartLine, Order, OrderItem, TicketHolder};
pub use ticket::Ticket;
pub use user::{NewUser, ProfileChanges, User};
