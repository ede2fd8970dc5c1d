pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod draw_service;
pub mod redemption_service;
pub mod ticket_service;
pub mod user_service;
pub mod wallet_service;

pub use admin_service::{AdminService, ResetSummary};
pub use auth_service::AuthService;
pub use cart_service::{CartService, CheckoutReceipt, Reservation};
pub use draw_service::{DrawOutcome, DrawService};
pub use redemption_service::RedemptionService;
pub use ticket_service::TicketService;
pub use user_service::UserService;
pub use wallet_service::WalletService;
