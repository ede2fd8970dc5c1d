use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// User-related enums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Admin,
}

impl UserRole {
    /// Numeric code used by older clients (`2` means admin).
    pub fn code(&self) -> i16 {
        match self {
            UserRole::Customer => 1,
            UserRole::Admin => 2,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Customer => write!(f, "customer"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

// Ticket-related enums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Available,
    InCart,
    Sold,
    Redeemed,
    Expired,
}

impl TicketStatus {
    pub fn code(&self) -> i16 {
        match self {
            TicketStatus::Available => 0,
            TicketStatus::InCart => 1,
            TicketStatus::Sold => 2,
            TicketStatus::Redeemed => 3,
            TicketStatus::Expired => 4,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(TicketStatus::Available),
            1 => Some(TicketStatus::InCart),
            2 => Some(TicketStatus::Sold),
            3 => Some(TicketStatus::Redeemed),
            4 => Some(TicketStatus::Expired),
            _ => None,
        }
    }

    /// Whether moving from `self` to `next` is an allowed lifecycle step.
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, next),
            (Available, InCart)
                | (Available, Expired)
                | (InCart, Available)
                | (InCart, Sold)
                | (InCart, Expired)
                | (Sold, Redeemed)
                | (Sold, Expired)
        )
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketStatus::Available => write!(f, "available"),
            TicketStatus::InCart => write!(f, "in_cart"),
            TicketStatus::Sold => write!(f, "sold"),
            TicketStatus::Redeemed => write!(f, "redeemed"),
            TicketStatus::Expired => write!(f, "expired"),
        }
    }
}

/// Accepts either the status name or its numeric code.
impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<i16>() {
            return TicketStatus::from_code(code).ok_or_else(|| format!("Unknown ticket status code: {}", code));
        }

        match s.to_ascii_lowercase().as_str() {
            "available" => Ok(TicketStatus::Available),
            "in_cart" | "incart" => Ok(TicketStatus::InCart),
            "sold" => Ok(TicketStatus::Sold),
            "redeemed" | "checked" => Ok(TicketStatus::Redeemed),
            "expired" => Ok(TicketStatus::Expired),
            other => Err(format!("Unknown ticket status: {}", other)),
        }
    }
}

// Order-related enums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Paid,
    Drawn,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Open => write!(f, "open"),
            OrderStatus::Paid => write!(f, "paid"),
            OrderStatus::Drawn => write!(f, "drawn"),
        }
    }
}

// Draw-related enums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DrawStrategy {
    /// Winning numbers are sampled from the current ticket inventory.
    #[default]
    FromInventory,
    /// Winning numbers are freshly generated and may match no ticket.
    FreshNumbers,
}

impl fmt::Display for DrawStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawStrategy::FromInventory => write!(f, "from_inventory"),
            DrawStrategy::FreshNumbers => write!(f, "fresh_numbers"),
        }
    }
}

impl FromStr for DrawStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "from_inventory" | "inventory" => Ok(DrawStrategy::FromInventory),
            "fresh_numbers" | "fresh" => Ok(DrawStrategy::FreshNumbers),
            other => Err(format!("Unknown draw strategy: {}", other)),
        }
    }
}

/// Why a ticket could not be reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    Reserved,
    Sold,
    Expired,
}

impl UnavailableReason {
    pub fn from_status(status: TicketStatus) -> Option<Self> {
        match status {
            TicketStatus::Available => None,
            TicketStatus::InCart => Some(UnavailableReason::Reserved),
            TicketStatus::Sold | TicketStatus::Redeemed => Some(UnavailableReason::Sold),
            TicketStatus::Expired => Some(UnavailableReason::Expired),
        }
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::Reserved => write!(f, "reserved"),
            UnavailableReason::Sold => write!(f, "sold"),
            UnavailableReason::Expired => write!(f, "expired"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_status_parses_names_and_codes() {
        assert_eq!("available".parse::<TicketStatus>().unwrap(), TicketStatus::Available);
        assert_eq!("IN_CART".parse::<TicketStatus>().unwrap(), TicketStatus::InCart);
        assert_eq!("2".parse::<TicketStatus>().unwrap(), TicketStatus::Sold);
        assert_eq!("checked".parse::<TicketStatus>().unwrap(), TicketStatus::Redeemed);
        assert!("9".parse::<TicketStatus>().is_err());
        assert!("bogus".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn ticket_status_codes_round_trip() {
        for code in 0..=4 {
            let status = TicketStatus::from_code(code).unwrap();
            assert_eq!(status.code(), code);
        }
    }

    #[test]
    fn ticket_lifecycle_transitions() {
        assert!(TicketStatus::Available.can_transition_to(TicketStatus::InCart));
        assert!(TicketStatus::InCart.can_transition_to(TicketStatus::Available));
        assert!(TicketStatus::InCart.can_transition_to(TicketStatus::Sold));
        assert!(TicketStatus::Sold.can_transition_to(TicketStatus::Redeemed));

        assert!(!TicketStatus::Sold.can_transition_to(TicketStatus::InCart));
        assert!(!TicketStatus::InCart.can_transition_to(TicketStatus::InCart));
        assert!(!TicketStatus::Redeemed.can_transition_to(TicketStatus::Available));
    }

    #[test]
    fn unavailable_reason_follows_status() {
        assert_eq!(UnavailableReason::from_status(TicketStatus::Available), None);
        assert_eq!(
            UnavailableReason::from_status(TicketStatus::InCart),
            Some(UnavailableReason::Reserved)
        );
        assert_eq!(
            UnavailableReason::from_status(TicketStatus::Redeemed),
            Some(UnavailableReason::Sold)
        );
    }

    #[test]
    fn admin_role_code_is_two() {
        assert_eq!(UserRole::Admin.code(), 2);
        assert_eq!(UserRole::Customer.code(), 1);
    }

    #[test]
    fn draw_strategy_default_and_parse() {
        assert_eq!(DrawStrategy::default(), DrawStrategy::FromInventory);
        assert_eq!("fresh".parse::<DrawStrategy>().unwrap(), DrawStrategy::FreshNumbers);
        let json = serde_json::to_string(&DrawStrategy::FreshNumbers).unwrap();
        assert_eq!(json, "\"fresh_numbers\"");
    }
}
