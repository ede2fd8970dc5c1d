pub mod crypto;
pub mod jwt;
pub mod lotto_number;
pub mod validation;

pub use jwt::{Claims, JwtService};
pub use validation::validation_errors_to_app_error;
