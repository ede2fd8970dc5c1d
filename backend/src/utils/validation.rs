use chrono::NaiveDate;
use validator::ValidationErrors;

use crate::error::AppError;

/// Convert validation errors to AppError
pub fn validation_errors_to_app_error(errors: ValidationErrors) -> AppError {
    let mut error_messages = Vec::new();

    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, field_errors) in fields {
        for error in field_errors {
            let message = match error.code.as_ref() {
                "email" => "Invalid email format",
                "length" => "Invalid length",
                "range" => "Value out of range",
                "regex" => "Invalid format",
                "must_match" => "Does not match",
                "required" => "Field is required",
                "identity_required" => "Either email or phone is required",
                "amount_not_positive" => "Amount must be a positive number",
                "amount_negative" => "Amount cannot be negative",
                "reward_point_negative" => "Reward points cannot be negative",
                _ => "Validation error",
            };

            if field == "__all__" {
                error_messages.push(message.to_string());
            } else {
                error_messages.push(format!("{}: {}", field, message));
            }
        }
    }

    AppError::Validation(error_messages.join(", "))
}

/// Parse a `YYYY-MM-DD` draw date.
pub fn parse_draw_date(date: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date: {}", date)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bid_lotto_shared::{RegisterRequest, WalletAmountRequest};
    use rust_decimal::Decimal;
    use validator::Validate;

    #[test]
    fn test_field_errors_are_named() {
        let errors = WalletAmountRequest { amount: Decimal::ZERO }.validate().unwrap_err();
        match validation_errors_to_app_error(errors) {
            AppError::Validation(msg) => assert_eq!(msg, "amount: Amount must be a positive number"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_schema_errors_have_no_field_prefix() {
        let request = RegisterRequest {
            email: None,
            phone: None,
            first_name: "Somchai".to_string(),
            last_name: "Jaidee".to_string(),
            password: "password123".to_string(),
            password_confirmation: "password123".to_string(),
        };
        let errors = request.validate().unwrap_err();
        match validation_errors_to_app_error(errors) {
            AppError::Validation(msg) => assert_eq!(msg, "Either email or phone is required"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_draw_date() {
        assert_eq!(
            parse_draw_date("2024-08-16").unwrap(),
            NaiveDate::from_ymd_opt(2024, 8, 16).unwrap()
        );
        assert!(parse_draw_date("2024-13-01").is_err());
        assert!(parse_draw_date("yesterday").is_err());
    }
}
