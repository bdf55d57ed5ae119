use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::models::event::TicketEvent;
use crate::models::ticket::Ticket;
use crate::notifier::Notifier;
use crate::store::TicketStore;
use crate::utils::error::AppError;

/// Discount metadata derived from a price transition. Pure function of the
/// two prices, so redelivered events converge on the same fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discount {
    pub percentage: Decimal,
    pub applies: bool,
}

impl Discount {
    pub fn from_prices(old_price: Option<Decimal>, new_price: Decimal) -> Self {
        match old_price {
            Some(old) if old > Decimal::ZERO && new_price < old => Self {
                percentage: ((old - new_price) / old * Decimal::ONE_HUNDRED).round_dp(2),
                applies: true,
            },
            _ => Self {
                percentage: Decimal::ZERO,
                applies: false,
            },
        }
    }
}

/// What the processor did with an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "disposition", rename_all = "camelCase")]
pub enum EventDisposition {
    /// A `PriceChangeInitiated` event was applied to the ticket.
    #[serde(rename_all = "camelCase")]
    Processed { updated_item: Box<Ticket> },
    /// A `PriceChangeProcessed` event came back around; terminal no-op.
    Completed,
    /// Unrecognized event type; logged and skipped.
    Ignored,
}

/// Downstream consumer of price-change notifications. Applies discount
/// metadata to the ticket and publishes a completion event, best-effort.
#[derive(Clone)]
pub struct PriceChangeProcessor {
    tickets: Arc<dyn TicketStore>,
    notifier: Arc<dyn Notifier>,
    topic: Option<String>,
}

impl PriceChangeProcessor {
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

    pub async fn handle(&self, event: TicketEvent) -> Result<EventDisposition, AppError> {
        match event {
            TicketEvent::PriceChangeInitiated {
                theatre_seat,
                movie,
                old_price,
                new_price,
                ..
            } => {
                info!(%theatre_seat, ?old_price, %new_price, "processing price change");

                let discount = Discount::from_prices(old_price, new_price);
                let now = Utc::now();
                let updated = self
                    .tickets
                    .update(
                        &theatre_seat,
                        Box::new(move |t| {
                            t.previous_price = old_price;
                            t.discount_percentage = discount.percentage;
                            t.is_discounted = discount.applies;
                            t.last_price_change_timestamp = Some(now);
                        }),
                    )
                    .await?;
                info!(%theatre_seat, "added price change metadata");

                let completion = TicketEvent::PriceChangeProcessed {
                    theatre_seat: theatre_seat.clone(),
                    movie,
                    final_price: new_price,
                    price_change_timestamp: now,
                    is_discounted: discount.applies,
                    discount_percentage: discount.percentage,
                    processed_at: Utc::now(),
                    updated_item: Box::new(updated.clone()),
                };
                if let Some(topic) = &self.topic {
                    let subject = format!("Price Change Processed for {theatre_seat}");
                    if let Err(err) = self.notifier.publish(topic, &completion, &subject).await {
                        warn!(%theatre_seat, error = %err, "failed to publish completion event");
                    }
                }

                Ok(EventDisposition::Processed {
                    updated_item: Box::new(updated),
                })
            }
            TicketEvent::PriceChangeProcessed { theatre_seat, .. } => {
                // End of the chain; the same channel may deliver our own
                // output back to us.
                info!(%theatre_seat, "price change processing completed");
                Ok(EventDisposition::Completed)
            }
            TicketEvent::Unknown => {
                info!("ignoring unrecognized event type");
                Ok(EventDisposition::Ignored)
            }
        }
    }

    /// Consumer loop over the broadcast channel. Processing failures are
    /// logged and the loop continues; the transport redelivers on its own
    /// terms, not ours.
    pub async fn run(self, mut events: broadcast::Receiver<TicketEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(err) = self.handle(event).await {
                        error!(error = %err, "price change processing failed");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "price change consumer lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("price change channel closed; consumer stopping");
                    break;
                }
            }
        }
    }
}
