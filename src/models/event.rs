use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ticket::Ticket;

/// Structured messages carried by the notifier. The same channel carries
/// both directions of the price-change chain, so the consumer must treat
/// `PriceChangeProcessed` as terminal. String tags a subscriber does not
/// recognize land on `Unknown` instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
pub enum TicketEvent {
    #[serde(rename_all = "camelCase")]
    PriceChangeInitiated {
        theatre_seat: String,
        movie: String,
        #[serde(default, with = "rust_decimal::serde::float_option")]
        old_price: Option<Decimal>,
        #[serde(with = "rust_decimal::serde::float")]
        new_price: Decimal,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    PriceChangeProcessed {
        theatre_seat: String,
        movie: String,
        #[serde(with = "rust_decimal::serde::float")]
        final_price: Decimal,
        price_change_timestamp: DateTime<Utc>,
        is_discounted: bool,
        #[serde(with = "rust_decimal::serde::float")]
        discount_percentage: Decimal,
        processed_at: DateTime<Utc>,
        updated_item: Box<Ticket>,
    },
    #[serde(other)]
    Unknown,
}
