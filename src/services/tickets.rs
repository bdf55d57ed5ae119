use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::models::event::TicketEvent;
use crate::models::ticket::{Ticket, TicketStatus};
use crate::notifier::Notifier;
use crate::store::{Mutation, TicketStore};
use crate::utils::error::AppError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdateOutcome {
    pub updated_item: Ticket,
    pub price_change_event_published: bool,
}

#[derive(Clone)]
pub struct TicketService {
    tickets: Arc<dyn TicketStore>,
    notifier: Arc<dyn Notifier>,
    topic: Option<String>,
}

impl TicketService {
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        notifier: Arc<dyn Notifier>,
        topic: Option<String>,
    ) -> Self {
        Self {
            tickets,
            notifier,
            topic,
        }
    }

    /// Overwrite put, like the source system: re-creating a seat resets it.
    pub async fn create_ticket(
        &self,
        theatre_seat: &str,
        movie: &str,
        price: Option<Decimal>,
    ) -> Result<Ticket, AppError> {
        let ticket = Ticket::new(theatre_seat, movie, price);
        self.tickets.put(ticket.clone()).await?;
        info!(theatre_seat, movie, "created ticket");
        Ok(ticket)
    }

    pub async fn get_ticket(&self, theatre_seat: &str) -> Result<Option<Ticket>, AppError> {
        Ok(self.tickets.get(theatre_seat).await?)
    }

    pub async fn list_tickets(&self) -> Result<Vec<Ticket>, AppError> {
        Ok(self.tickets.scan().await?)
    }

    /// Distinct movie titles across all tickets, sorted for stable output.
    pub async fn list_movies(&self) -> Result<Vec<String>, AppError> {
        let tickets = self.tickets.scan().await?;
        let mut movies: Vec<String> = tickets.into_iter().map(|t| t.movie).collect();
        movies.sort();
        movies.dedup();
        Ok(movies)
    }

    pub async fn delete_ticket(&self, theatre_seat: &str) -> Result<Ticket, AppError> {
        self.tickets
            .delete(theatre_seat)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("ticket '{theatre_seat}'")))
    }

    /// Single-field update in the source system's updateKey/updateValue
    /// style. A price update also records the prior price and publishes a
    /// `PriceChangeInitiated` event for the downstream processor;
    /// publishing is best-effort and never fails the update.
    pub async fn update_ticket(
        &self,
        theatre_seat: &str,
        update_key: &str,
        update_value: Value,
    ) -> Result<TicketUpdateOutcome, AppError> {
        if update_key.eq_ignore_ascii_case("theatreseat") {
            return Err(AppError::ValidationError(
                "Cannot update primary key theatreSeat".to_string(),
            ));
        }

        let current = self
            .tickets
            .get(theatre_seat)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("ticket '{theatre_seat}'")))?;

        if update_key.eq_ignore_ascii_case("price") {
            return self.apply_price_change(theatre_seat, current, update_value).await;
        }

        let mutation = field_mutation(update_key, update_value)?;
        let updated = self.tickets.update(theatre_seat, mutation).await?;
        info!(theatre_seat, update_key, "updated ticket");

        Ok(TicketUpdateOutcome {
            updated_item: updated,
            price_change_event_published: false,
        })
    }

    async fn apply_price_change(
        &self,
        theatre_seat: &str,
        current: Ticket,
        update_value: Value,
    ) -> Result<TicketUpdateOutcome, AppError> {
        let new_price = decimal_from_value(&update_value)
            .ok_or_else(|| AppError::ValidationError("price must be a number".to_string()))?;
        let old_price = current.price;
        let now = Utc::now();

        let updated = self
            .tickets
            .update(
                theatre_seat,
                Box::new(move |t| {
                    t.price = Some(new_price);
                    t.previous_price = old_price;
                    t.last_price_change_timestamp = Some(now);
                }),
            )
            .await?;

        let mut published = false;
        if let Some(topic) = &self.topic {
            let event = TicketEvent::PriceChangeInitiated {
                theatre_seat: theatre_seat.to_string(),
                movie: updated.movie.clone(),
                old_price,
                new_price,
                timestamp: now,
            };
            let subject = format!("Price Change Event for {theatre_seat}");
            match self.notifier.publish(topic, &event, &subject).await {
                Ok(()) => {
                    info!(theatre_seat, "published price change event");
                    published = true;
                }
                Err(err) => {
                    warn!(theatre_seat, error = %err, "failed to publish price change event");
                }
            }
        } else {
            warn!(theatre_seat, "price change topic not configured; event not published");
        }

        Ok(TicketUpdateOutcome {
            updated_item: updated,
            price_change_event_published: published,
        })
    }
}

fn field_mutation(update_key: &str, update_value: Value) -> Result<Mutation<Ticket>, AppError> {
    match update_key.to_ascii_lowercase().as_str() {
        "movie" => {
            let movie = string_from_value(update_value, "movie")?;
            Ok(Box::new(move |t| t.movie = movie))
        }
        "status" => {
            let raw = string_from_value(update_value, "status")?;
            let status: TicketStatus = raw.parse().map_err(|()| {
                AppError::ValidationError(format!("invalid ticket status '{raw}'"))
            })?;
            Ok(Box::new(move |t| t.status = status))
        }
        "owner" => {
            let owner = match update_value {
                Value::Null => None,
                other => Some(string_from_value(other, "owner")?),
            };
            Ok(Box::new(move |t| t.owner = owner))
        }
        other => Err(AppError::ValidationError(format!(
            "unsupported update key '{other}'"
        ))),
    }
}

fn string_from_value(value: Value, field: &str) -> Result<String, AppError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| AppError::ValidationError(format!("{field} must be a string")))
}

fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.as_f64().and_then(|f| Decimal::try_from(f).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::notifier::BroadcastNotifier;
    use crate::store::InMemoryStore;

    fn service_with_topic() -> (TicketService, tokio::sync::broadcast::Receiver<TicketEvent>) {
        let store = Arc::new(InMemoryStore::new());
        let (notifier, receiver) = BroadcastNotifier::channel(8);
        let service = TicketService::new(
            store,
            Arc::new(notifier),
            Some("price-changes".to_string()),
        );
        (service, receiver)
    }

    #[tokio::test]
    async fn update_rejects_primary_key() {
        let (service, _receiver) = service_with_topic();
        let err = service
            .update_ticket("1-A9", "theatreSeat", json!("2-B1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn update_rejects_unknown_key() {
        let (service, _receiver) = service_with_topic();
        service
            .create_ticket("1-A9", "Avengers", None)
            .await
            .unwrap();
        let err = service
            .update_ticket("1-A9", "legroom", json!("extra"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn price_update_publishes_initiated_event() {
        let (service, mut receiver) = service_with_topic();
        service
            .create_ticket("1-A9", "Avengers", Some(dec!(20)))
            .await
            .unwrap();

        let outcome = service
            .update_ticket("1-A9", "price", json!(15.0))
            .await
            .unwrap();
        assert!(outcome.price_change_event_published);
        assert_eq!(outcome.updated_item.price, Some(dec!(15)));
        assert_eq!(outcome.updated_item.previous_price, Some(dec!(20)));

        match receiver.recv().await.unwrap() {
            TicketEvent::PriceChangeInitiated {
                theatre_seat,
                old_price,
                new_price,
                ..
            } => {
                assert_eq!(theatre_seat, "1-A9");
                assert_eq!(old_price, Some(dec!(20)));
                assert_eq!(new_price, dec!(15));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn price_update_without_topic_reports_unpublished() {
        let store = Arc::new(InMemoryStore::new());
        let (notifier, _receiver) = BroadcastNotifier::channel(8);
        let service = TicketService::new(store, Arc::new(notifier), None);

        service
            .create_ticket("1-A9", "Avengers", Some(dec!(20)))
            .await
            .unwrap();
        let outcome = service
            .update_ticket("1-A9", "price", json!(25.0))
            .await
            .unwrap();
        assert!(!outcome.price_change_event_published);
        assert_eq!(outcome.updated_item.price, Some(dec!(25)));
    }

    #[tokio::test]
    async fn non_price_update_mutates_single_field() {
        let (service, _receiver) = service_with_topic();
        service
            .create_ticket("1-A9", "Avengers", Some(dec!(20)))
            .await
            .unwrap();

        let outcome = service
            .update_ticket("1-A9", "status", json!("sold"))
            .await
            .unwrap();
        assert_eq!(outcome.updated_item.status, TicketStatus::Sold);
        assert!(!outcome.price_change_event_published);
        assert_eq!(outcome.updated_item.price, Some(dec!(20)));
    }
}
