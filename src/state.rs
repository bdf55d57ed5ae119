use std::sync::Arc;

use crate::config::Config;
use crate::notifier::Notifier;
use crate::services::{PriceChangeProcessor, TicketService, TradeService, UserService};
use crate::store::{PayrollStore, TicketStore, TransactionStore};

/// Shared handler state: the services, wired once at startup.
#[derive(Clone)]
pub struct AppState {
    pub tickets: TicketService,
    pub users: UserService,
    pub trades: TradeService,
    pub events: PriceChangeProcessor,
}

impl AppState {
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        payroll: Arc<dyn PayrollStore>,
        transactions: Arc<dyn TransactionStore>,
        notifier: Arc<dyn Notifier>,
        config: &Config,
    ) -> Self {
        let users = UserService::new(payroll, transactions.clone());
        Self {
            tickets: TicketService::new(
                tickets.clone(),
                notifier.clone(),
                config.price_change_topic.clone(),
            ),
            trades: TradeService::new(tickets.clone(), transactions, users.clone()),
            events: PriceChangeProcessor::new(tickets, notifier, config.price_change_topic.clone()),
            users,
        }
    }
}
