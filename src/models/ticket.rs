use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle of a seat: freshly booked tickets are available for purchase,
/// purchased tickets are sold (and may be resold between users).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Available,
    Sold,
}

impl std::str::FromStr for TicketStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "available" => Ok(TicketStatus::Available),
            "sold" => Ok(TicketStatus::Sold),
            _ => Err(()),
        }
    }
}

/// A sellable seat record, keyed by theatre seat identifier (e.g. "1-A9").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub theatre_seat: String,
    pub movie: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub status: TicketStatus,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub purchase_price: Option<Decimal>,
    #[serde(default)]
    pub purchase_timestamp: Option<DateTime<Utc>>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub sale_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub previous_owner: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub original_purchase_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub previous_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_percentage: Decimal,
    pub is_discounted: bool,
    #[serde(default)]
    pub last_price_change_timestamp: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn new(theatre_seat: impl Into<String>, movie: impl Into<String>, price: Option<Decimal>) -> Self {
        Self {
            theatre_seat: theatre_seat.into(),
            movie: movie.into(),
            price,
            status: TicketStatus::Available,
            owner: None,
            purchase_price: None,
            purchase_timestamp: None,
            sale_price: None,
            sale_timestamp: None,
            previous_owner: None,
            original_purchase_price: None,
            previous_price: None,
            discount_percentage: Decimal::ZERO,
            is_discounted: false,
            last_price_change_timestamp: None,
        }
    }
}
