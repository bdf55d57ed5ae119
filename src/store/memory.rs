use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::models::ticket::Ticket;
use crate::models::transaction::Transaction;
use crate::models::user::UserPayroll;

use super::{Init, Mutation, PayrollStore, StoreError, StoreResult, TicketStore, TransactionStore};

/// All three tables behind one handle. Single-key atomicity comes from the
/// per-table lock; the transaction log preserves append order.
#[derive(Default)]
pub struct InMemoryStore {
    tickets: RwLock<HashMap<String, Ticket>>,
    payroll: RwLock<HashMap<String, UserPayroll>>,
    transactions: RwLock<Vec<Transaction>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketStore for InMemoryStore {
    async fn get(&self, theatre_seat: &str) -> StoreResult<Option<Ticket>> {
        Ok(self.tickets.read().get(theatre_seat).cloned())
    }

    async fn put(&self, ticket: Ticket) -> StoreResult<()> {
        self.tickets
            .write()
            .insert(ticket.theatre_seat.clone(), ticket);
        Ok(())
    }

    async fn update(&self, theatre_seat: &str, mutation: Mutation<Ticket>) -> StoreResult<Ticket> {
        let mut tickets = self.tickets.write();
        let ticket = tickets
            .get_mut(theatre_seat)
            .ok_or_else(|| StoreError::MissingKey(theatre_seat.to_string()))?;
        mutation(ticket);
        Ok(ticket.clone())
    }

    async fn delete(&self, theatre_seat: &str) -> StoreResult<Option<Ticket>> {
        Ok(self.tickets.write().remove(theatre_seat))
    }

    async fn scan(&self) -> StoreResult<Vec<Ticket>> {
        Ok(self.tickets.read().values().cloned().collect())
    }
}

#[async_trait]
impl PayrollStore for InMemoryStore {
    async fn get(&self, user_id: &str) -> StoreResult<Option<UserPayroll>> {
        Ok(self.payroll.read().get(user_id).cloned())
    }

    async fn insert(&self, record: UserPayroll) -> StoreResult<bool> {
        match self.payroll.write().entry(record.user_id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(true)
            }
        }
    }

    async fn apply(
        &self,
        user_id: &str,
        init: Init<UserPayroll>,
        mutation: Mutation<UserPayroll>,
    ) -> StoreResult<UserPayroll> {
        let mut payroll = self.payroll.write();
        let record = payroll.entry(user_id.to_string()).or_insert_with(init);
        mutation(record);
        Ok(record.clone())
    }

    async fn scan(&self) -> StoreResult<Vec<UserPayroll>> {
        Ok(self.payroll.read().values().cloned().collect())
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn append(&self, transaction: Transaction) -> StoreResult<()> {
        self.transactions.write().push(transaction);
        Ok(())
    }

    async fn get(&self, transaction_id: &str) -> StoreResult<Option<Transaction>> {
        Ok(self
            .transactions
            .read()
            .iter()
            .find(|tx| tx.transaction_id == transaction_id)
            .cloned())
    }

    async fn for_user(
        &self,
        user_id: &str,
        limit: usize,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> StoreResult<Vec<Transaction>> {
        let transactions = self.transactions.read();
        let mut matches: Vec<Transaction> = transactions
            .iter()
            .filter(|tx| tx.user_id == user_id)
            .filter(|tx| match range {
                Some((start, end)) => tx.timestamp >= start && tx.timestamp <= end,
                None => true,
            })
            .cloned()
            .collect();
        // Stable sort: legs written at the same instant keep append order.
        matches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matches.truncate(limit);
        Ok(matches)
    }
}
