//! Collaborator contract for the key-value tables backing the service.
//!
//! Each table exposes single-key operations plus a full scan; the only
//! concurrency guard in the system is the store's atomic single-key
//! update, so every read-modify-write must go through `update`/`apply`
//! in one call rather than a get followed by a put.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::ticket::Ticket;
use crate::models::transaction::Transaction;
use crate::models::user::UserPayroll;

pub mod memory;

pub use memory::InMemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no record for key '{0}'")]
    MissingKey(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Single-key mutation applied under the store's atomic update.
pub type Mutation<T> = Box<dyn FnOnce(&mut T) + Send>;

/// Record constructor for get-or-create updates.
pub type Init<T> = Box<dyn FnOnce() -> T + Send>;

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn get(&self, theatre_seat: &str) -> StoreResult<Option<Ticket>>;

    /// Unconditional overwrite, like the source system's put.
    async fn put(&self, ticket: Ticket) -> StoreResult<()>;

    /// Atomically mutates an existing record and returns the new state.
    /// Fails with `MissingKey` if the seat has no record.
    async fn update(&self, theatre_seat: &str, mutation: Mutation<Ticket>) -> StoreResult<Ticket>;

    async fn delete(&self, theatre_seat: &str) -> StoreResult<Option<Ticket>>;

    async fn scan(&self) -> StoreResult<Vec<Ticket>>;
}

#[async_trait]
pub trait PayrollStore: Send + Sync {
    async fn get(&self, user_id: &str) -> StoreResult<Option<UserPayroll>>;

    /// Put-if-absent; returns whether the record was inserted.
    async fn insert(&self, record: UserPayroll) -> StoreResult<bool>;

    /// Get-or-create combinator: creates the record via `init` when the
    /// key is absent, then applies `mutation`, all under one atomic
    /// update. Returns the record as stored.
    async fn apply(
        &self,
        user_id: &str,
        init: Init<UserPayroll>,
        mutation: Mutation<UserPayroll>,
    ) -> StoreResult<UserPayroll>;

    async fn scan(&self) -> StoreResult<Vec<UserPayroll>>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Appends to the log. Transaction ids are caller-generated uuids, so
    /// collisions are not checked for.
    async fn append(&self, transaction: Transaction) -> StoreResult<()>;

    async fn get(&self, transaction_id: &str) -> StoreResult<Option<Transaction>>;

    /// Transactions for one user, most recent first, optionally restricted
    /// to a closed `[start, end]` interval, truncated to `limit`.
    async fn for_user(
        &self,
        user_id: &str,
        limit: usize,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> StoreResult<Vec<Transaction>>;
}
