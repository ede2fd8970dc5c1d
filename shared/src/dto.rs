use crate::constants::*;
use crate::types::*;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub static PERSON_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(PERSON_NAME_PATTERN).expect("person name pattern"));
pub static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(PHONE_PATTERN).expect("phone pattern"));
pub static TICKET_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(TICKET_NUMBER_PATTERN).expect("ticket number pattern"));
pub static DATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(DATE_PATTERN).expect("date pattern"));

/// Whether `amount` fits a money column: at most two decimal places and within `MAX_AMOUNT`.
pub fn is_storable_amount(amount: &Decimal) -> bool {
    amount.normalize().scale() <= MAX_AMOUNT_SCALE && amount.abs() <= MAX_AMOUNT
}

fn validate_storable(amount: &Decimal) -> Result<(), ValidationError> {
    if !is_storable_amount(amount) {
        return Err(ValidationError::new("amount_out_of_range"));
    }
    Ok(())
}

pub fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::new("amount_not_positive"));
    }
    validate_storable(amount)
}

pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::new("amount_negative"));
    }
    validate_storable(amount)
}

pub fn validate_reward_points(points: &Vec<Decimal>) -> Result<(), ValidationError> {
    if points.iter().any(|p| p.is_sign_negative() && !p.is_zero()) {
        return Err(ValidationError::new("reward_point_negative"));
    }
    if !points.iter().all(is_storable_amount) {
        return Err(ValidationError::new("reward_point_out_of_range"));
    }
    Ok(())
}

fn validate_register_identity(request: &RegisterRequest) -> Result<(), ValidationError> {
    if request.email.is_none() && request.phone.is_none() {
        return Err(ValidationError::new("identity_required"));
    }
    Ok(())
}

fn validate_login_identity(request: &LoginRequest) -> Result<(), ValidationError> {
    match (&request.email, &request.phone) {
        (None, None) => Err(ValidationError::new("identity_required")),
        _ => Ok(()),
    }
}

// Auth DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_register_identity"))]
pub struct RegisterRequest {
    #[validate(email, length(min = 6, max = 50))]
    pub email: Option<String>,

    #[validate(regex = "PHONE_REGEX")]
    pub phone: Option<String>,

    #[validate(length(min = 2, max = 50), regex = "PERSON_NAME_REGEX")]
    pub first_name: String,

    #[validate(length(min = 2, max = 50), regex = "PERSON_NAME_REGEX")]
    pub last_name: String,

    #[validate(length(min = 8, max = 32))]
    pub password: String,

    #[validate(must_match = "password")]
    pub password_confirmation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_login_identity"))]
pub struct LoginRequest {
    pub email: Option<String>,

    pub phone: Option<String>,

    #[validate(length(min = 8, max = 32))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub wallet: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserResponse,
    pub token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email, length(min = 6, max = 50))]
    pub email: Option<String>,

    #[validate(regex = "PHONE_REGEX")]
    pub phone: Option<String>,

    #[validate(length(min = 2, max = 50), regex = "PERSON_NAME_REGEX")]
    pub first_name: Option<String>,

    #[validate(length(min = 2, max = 50), regex = "PERSON_NAME_REGEX")]
    pub last_name: Option<String>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }
}

// Ticket DTOs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketResponse {
    pub id: i64,
    pub number: String,
    pub price: Decimal,
    pub status: TicketStatus,
    pub expired_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateTicketsRequest {
    pub expired_date: DateTime<Utc>,

    #[validate(range(min = 1, max = 1000000))]
    pub count: i64,

    #[validate(custom = "validate_non_negative_amount")]
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateTicketsResponse {
    pub message: String,
    pub count: usize,
    pub numbers: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateTicketRequest {
    #[validate(regex = "TICKET_NUMBER_REGEX")]
    pub number: Option<String>,

    #[validate(custom = "validate_non_negative_amount")]
    pub price: Option<Decimal>,

    pub status: Option<TicketStatus>,

    pub expired_date: Option<DateTime<Utc>>,
}

impl UpdateTicketRequest {
    pub fn is_empty(&self) -> bool {
        self.number.is_none() && self.price.is_none() && self.status.is_none() && self.expired_date.is_none()
    }

    /// Names of the fields present in the request, in declaration order.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.number.is_some() {
            fields.push("number");
        }
        if self.price.is_some() {
            fields.push("price");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.expired_date.is_some() {
            fields.push("expired_date");
        }
        fields
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckTicketRequest {
    #[validate(regex = "TICKET_NUMBER_REGEX")]
    pub number: String,

    #[validate(regex = "DATE_REGEX")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckTicketResponse {
    pub number: String,
    pub win: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dpid: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub win_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_point: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RedeemRequest {
    #[validate(regex = "TICKET_NUMBER_REGEX")]
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemResponse {
    pub message: String,
    pub number: String,
    pub win: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_point: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<i32>,
    pub wallet: Decimal,
}

// Cart and order DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddToCartRequest {
    #[validate(range(min = 1))]
    pub lotto_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToCartResponse {
    pub message: String,
    pub cid: i64,
    pub order_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RemoveFromCartRequest {
    #[validate(range(min = 1))]
    pub cid: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemResponse {
    pub cid: i64,
    pub lotto_id: i64,
    pub number: String,
    pub price: Decimal,
    pub status: TicketStatus,
    pub expired_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartContentsResponse {
    pub message: String,
    pub order_id: Option<i64>,
    pub items: Vec<CartItemResponse>,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub message: String,
    pub order_id: i64,
    pub total_price: Decimal,
    pub new_wallet: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemResponse {
    pub lotto_id: i64,
    pub number: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummaryResponse {
    pub oid: i64,
    pub date: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderOwner {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetailResponse {
    pub order_id: i64,
    pub user: OrderOwner,
    pub date: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Decimal,
    pub total_amount: usize,
    pub items: Vec<OrderItemResponse>,
}

// Wallet DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WalletAmountRequest {
    #[validate(custom = "validate_positive_amount")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    pub wallet: Decimal,
}

// Draw DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DrawRequest {
    #[serde(rename = "rewardPoints", alias = "reward_points")]
    #[validate(length(min = 1, max = 1000), custom = "validate_reward_points")]
    pub reward_points: Vec<Decimal>,

    pub strategy: Option<DrawStrategy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawPrizeResponse {
    pub number: String,
    pub reward_point: Decimal,
    pub seq: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawResponse {
    pub message: String,
    pub strategy: DrawStrategy,
    pub prizes: Vec<DrawPrizeResponse>,
    pub orders_closed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn register(email: Option<&str>, phone: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            first_name: "Somchai".to_string(),
            last_name: "Jaidee".to_string(),
            password: "password123".to_string(),
            password_confirmation: "password123".to_string(),
        }
    }

    #[test]
    fn register_accepts_email_or_phone() {
        assert!(register(Some("somchai@example.com"), None).validate().is_ok());
        assert!(register(None, Some("0812345678")).validate().is_ok());
    }

    #[test]
    fn register_requires_some_identity() {
        assert!(register(None, None).validate().is_err());
    }

    #[test]
    fn register_rejects_mismatched_confirmation() {
        let mut request = register(Some("somchai@example.com"), None);
        request.password_confirmation = "different123".to_string();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password_confirmation"));
    }

    #[test]
    fn register_accepts_thai_names() {
        let mut request = register(Some("somchai@example.com"), None);
        request.first_name = "สมชาย".to_string();
        request.last_name = "ใจดี".to_string();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn register_rejects_digits_in_name() {
        let mut request = register(Some("somchai@example.com"), None);
        request.first_name = "R2D2".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn wallet_amount_must_be_positive() {
        let ok = WalletAmountRequest { amount: Decimal::from(10) };
        let zero = WalletAmountRequest { amount: Decimal::ZERO };
        let negative = WalletAmountRequest { amount: Decimal::from(-5) };
        assert!(ok.validate().is_ok());
        assert!(zero.validate().is_err());
        assert!(negative.validate().is_err());
    }

    #[test]
    fn draw_request_reads_camel_case_reward_points() {
        let request: DrawRequest = serde_json::from_str(r#"{"rewardPoints": [50, 10.5]}"#).unwrap();
        assert_eq!(request.reward_points, vec![Decimal::from(50), Decimal::from_str("10.5").unwrap()]);
        assert!(request.strategy.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn draw_request_rejects_empty_and_negative_points() {
        let empty = DrawRequest { reward_points: vec![], strategy: None };
        assert!(empty.validate().is_err());

        let negative = DrawRequest { reward_points: vec![Decimal::from(-1)], strategy: None };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn update_ticket_lists_present_fields() {
        let request: UpdateTicketRequest =
            serde_json::from_str(r#"{"price": 80, "status": "sold"}"#).unwrap();
        assert_eq!(request.field_names(), vec!["price", "status"]);
        assert!(!request.is_empty());
        assert!(UpdateTicketRequest::default().is_empty());
    }

    #[test]
    fn update_ticket_rejects_unknown_columns() {
        let result = serde_json::from_str::<UpdateTicketRequest>(r#"{"id": 5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn check_request_validates_number_and_date() {
        let ok = CheckTicketRequest { number: "012345".to_string(), date: Some("2024-08-16".to_string()) };
        assert!(ok.validate().is_ok());

        let short = CheckTicketRequest { number: "1234".to_string(), date: None };
        assert!(short.validate().is_err());

        let bad_date = CheckTicketRequest { number: "012345".to_string(), date: Some("16/08/2024".to_string()) };
        assert!(bad_date.validate().is_err());
    }

    #[test]
    fn generate_request_bounds_count() {
        let request = GenerateTicketsRequest {
            expired_date: Utc::now(),
            count: 0,
            price: Decimal::from(80),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn max_amount_matches_money_column() {
        assert_eq!(MAX_AMOUNT, Decimal::from_str("9999999999.99").unwrap());
        assert!(is_storable_amount(&MAX_AMOUNT));
        assert!(!is_storable_amount(&(MAX_AMOUNT + Decimal::new(1, 2))));
        assert!(is_storable_amount(&Decimal::from_str("10.500").unwrap()));
        assert!(!is_storable_amount(&Decimal::from_str("10.005").unwrap()));
    }

    #[test]
    fn wallet_amount_must_fit_the_column() {
        let too_big = WalletAmountRequest { amount: Decimal::from(10_000_000_000i64) };
        assert!(too_big.validate().is_err());

        let too_precise = WalletAmountRequest { amount: Decimal::from_str("1.001").unwrap() };
        assert!(too_precise.validate().is_err());

        let ok = WalletAmountRequest { amount: Decimal::from_str("250.75").unwrap() };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn price_and_reward_points_must_fit_the_column() {
        let request = GenerateTicketsRequest {
            expired_date: Utc::now(),
            count: 5,
            price: Decimal::from(10_000_000_000i64),
        };
        assert!(request.validate().is_err());

        let draw = DrawRequest {
            reward_points: vec![Decimal::from(50), Decimal::from(10_000_000_000i64)],
            strategy: None,
        };
        assert!(draw.validate().is_err());
    }
}
