use rust_decimal::Decimal;
use std::time::Duration;

// JWT Configuration
pub const JWT_ACCESS_TOKEN_EXPIRY: Duration = Duration::from_secs(3 * 60 * 60); // 3 hours

// Per client IP on /api
pub const RATE_LIMIT_MAX_REQUESTS: u32 = 1000;
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(10 * 60);
pub const JWT_MIN_SECRET_LENGTH: usize = 32;

// Ticket numbers
pub const TICKET_NUMBER_DIGITS: usize = 6;
pub const TICKET_NUMBER_SPACE: u32 = 1_000_000;
pub const MIN_GENERATE_COUNT: i64 = 1;
pub const MAX_GENERATE_COUNT: i64 = 1_000_000;

// Money columns are NUMERIC(12, 2)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2); // 9_999_999_999.99
pub const MAX_AMOUNT_SCALE: u32 = 2;

// Draws
pub const MAX_DRAW_COUNT: usize = 1_000;

// Validation patterns
pub const PERSON_NAME_PATTERN: &str = r"^[\x{0E01}-\x{0E59}a-zA-Z\s]+$";
pub const PHONE_PATTERN: &str = r"^[0-9]{10}$";
pub const TICKET_NUMBER_PATTERN: &str = r"^[0-9]{6}$";
pub const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";

// Error messages
pub const ERROR_INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const ERROR_EMAIL_ALREADY_EXISTS: &str = "Email already exists";
pub const ERROR_PHONE_ALREADY_EXISTS: &str = "Phone number already exists";
pub const ERROR_USER_NOT_FOUND: &str = "User not found";
pub const ERROR_TICKET_NOT_FOUND: &str = "Lotto not found";
pub const ERROR_ORDER_NOT_FOUND: &str = "Order not found";
pub const ERROR_CART_ITEM_NOT_FOUND: &str = "Cart item not found or not owned by this user";
pub const ERROR_ALREADY_IN_CART: &str = "This lotto is already in your cart and cannot be added again";
pub const ERROR_ALREADY_REDEEMED: &str = "This lotto has already been redeemed";
pub const ERROR_NOT_PURCHASED: &str = "This lotto has not been purchased";
pub const ERROR_NOT_DRAWN: &str = "This lotto was bought after the latest draw and has not been drawn yet";
pub const ERROR_NOT_OWNER: &str = "This lotto does not belong to you";
pub const ERROR_ADMIN_ONLY: &str = "Only administrators can access this resource";

// Success messages
pub const SUCCESS_USER_CREATED: &str = "Registered successfully";
pub const SUCCESS_LOGIN: &str = "Logged in successfully";
pub const SUCCESS_ADDED_TO_CART: &str = "Lotto added to cart and status updated successfully";
pub const SUCCESS_REMOVED_FROM_CART: &str = "Item successfully removed from cart and lotto status updated";
pub const SUCCESS_PURCHASE: &str = "Purchase successful";
pub const SUCCESS_RESET: &str = "All tables have been reset successfully, except for admin users";
