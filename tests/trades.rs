//! End-to-end coverage of the purchase/sale orchestration: happy paths,
//! business-rule rejections, and partial-failure reporting when a store
//! call dies mid-sequence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use marquee_server::models::ticket::{Ticket, TicketStatus};
use marquee_server::models::transaction::TransactionType;
use marquee_server::services::{TradeError, TradeService, TradeStep, UserService};
use marquee_server::store::{
    InMemoryStore, Mutation, StoreError, StoreResult, TicketStore, TransactionStore,
};
use marquee_server::utils::error::AppError;

/// Ticket store wrapper that can be told to fail updates, leaving the
/// earlier steps of a trade committed.
struct FlakyTicketStore {
    inner: Arc<InMemoryStore>,
    fail_updates: AtomicBool,
}

impl FlakyTicketStore {
    fn new(inner: Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            fail_updates: AtomicBool::new(false),
        }
    }

    fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl TicketStore for FlakyTicketStore {
    async fn get(&self, theatre_seat: &str) -> StoreResult<Option<Ticket>> {
        TicketStore::get(&*self.inner, theatre_seat).await
    }

    async fn put(&self, ticket: Ticket) -> StoreResult<()> {
        TicketStore::put(&*self.inner, ticket).await
    }

    async fn update(&self, theatre_seat: &str, mutation: Mutation<Ticket>) -> StoreResult<Ticket> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        TicketStore::update(&*self.inner, theatre_seat, mutation).await
    }

    async fn delete(&self, theatre_seat: &str) -> StoreResult<Option<Ticket>> {
        TicketStore::delete(&*self.inner, theatre_seat).await
    }

    async fn scan(&self) -> StoreResult<Vec<Ticket>> {
        TicketStore::scan(&*self.inner).await
    }
}

struct Fixture {
    store: Arc<InMemoryStore>,
    flaky: Arc<FlakyTicketStore>,
    users: UserService,
    trades: TradeService,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let flaky = Arc::new(FlakyTicketStore::new(store.clone()));
    let users = UserService::new(store.clone(), store.clone());
    let trades = TradeService::new(flaky.clone(), store.clone(), users.clone());
    Fixture {
        store,
        flaky,
        users,
        trades,
    }
}

async fn seed_ticket(store: &InMemoryStore, seat: &str, price: Decimal) {
    TicketStore::put(store, Ticket::new(seat, "Avengers", Some(price)))
        .await
        .unwrap();
}

#[tokio::test]
async fn purchase_debits_buyer_and_marks_ticket_sold() {
    let fx = fixture();
    seed_ticket(&fx.store, "1-A9", dec!(15.99)).await;
    fx.users
        .create_user("buyer", "buyer@example.com", "Buyer", dec!(100))
        .await
        .unwrap();

    let receipt = fx
        .trades
        .process_ticket_purchase("buyer", "1-A9", dec!(15.99), "credit_card")
        .await
        .unwrap();

    // Receipt carries the snapshot as read before the mutation.
    assert_eq!(receipt.ticket_details.status, TicketStatus::Available);
    assert!(receipt.ticket_details.owner.is_none());
    assert_eq!(receipt.user_balance, dec!(84.01));

    let ticket = TicketStore::get(&*fx.store, "1-A9").await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Sold);
    assert_eq!(ticket.owner.as_deref(), Some("buyer"));
    assert_eq!(ticket.purchase_price, Some(dec!(15.99)));
    assert!(ticket.purchase_timestamp.is_some());

    let history = fx.store.for_user("buyer", 10, None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].transaction_id, receipt.transaction_id);
    assert_eq!(history[0].transaction_type, TransactionType::Purchase);
    assert_eq!(history[0].amount, dec!(15.99));
    assert_eq!(history[0].payment_method.as_deref(), Some("credit_card"));

    let payroll = fx.users.get_user_payroll("buyer").await.unwrap().unwrap();
    assert_eq!(
        payroll.current_balance,
        dec!(100) + payroll.total_sales - payroll.total_purchases
    );
    assert_eq!(payroll.last_transaction_id, Some(receipt.transaction_id));
}

#[tokio::test]
async fn purchase_of_sold_ticket_is_rejected_without_writes() {
    let fx = fixture();
    seed_ticket(&fx.store, "1-A9", dec!(15.99)).await;
    fx.trades
        .process_ticket_purchase("first", "1-A9", dec!(15.99), "credit_card")
        .await
        .unwrap();

    let err = fx
        .trades
        .process_ticket_purchase("second", "1-A9", dec!(15.99), "credit_card")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TradeError::Rejected(AppError::AlreadySold(_))
    ));

    // No log entry, no ledger record for the rejected buyer.
    assert!(fx
        .store
        .for_user("second", 10, None)
        .await
        .unwrap()
        .is_empty());
    assert!(fx.users.get_user_payroll("second").await.unwrap().is_none());

    let ticket = TicketStore::get(&*fx.store, "1-A9").await.unwrap().unwrap();
    assert_eq!(ticket.owner.as_deref(), Some("first"));
}

#[tokio::test]
async fn purchase_of_missing_ticket_is_rejected() {
    let fx = fixture();
    let err = fx
        .trades
        .process_ticket_purchase("buyer", "9-Z1", dec!(10), "credit_card")
        .await
        .unwrap_err();
    assert!(matches!(err, TradeError::Rejected(AppError::NotFound(_))));
}

#[tokio::test]
async fn sale_credits_seller_and_debits_buyer_symmetrically() {
    let fx = fixture();
    seed_ticket(&fx.store, "1-A9", dec!(20)).await;
    fx.trades
        .process_ticket_purchase("seller", "1-A9", dec!(20), "credit_card")
        .await
        .unwrap();

    let receipt = fx
        .trades
        .process_ticket_sale("seller", "buyer", "1-A9", dec!(35))
        .await
        .unwrap();

    assert_ne!(receipt.seller_transaction_id, receipt.buyer_transaction_id);
    // Seller paid 20 on the original purchase, then made 35 back.
    assert_eq!(receipt.seller_balance, dec!(15));
    assert_eq!(receipt.buyer_balance, dec!(-35));

    let seller_legs = fx.store.for_user("seller", 10, None).await.unwrap();
    let sale_leg = seller_legs
        .iter()
        .find(|tx| tx.transaction_type == TransactionType::Sale)
        .unwrap();
    let buyer_legs = fx.store.for_user("buyer", 10, None).await.unwrap();
    assert_eq!(buyer_legs.len(), 1);
    let purchase_leg = &buyer_legs[0];

    assert_eq!(sale_leg.theatre_seat, purchase_leg.theatre_seat);
    assert_eq!(sale_leg.amount, purchase_leg.amount);
    assert_eq!(sale_leg.counterparty_id.as_deref(), Some("buyer"));
    assert_eq!(purchase_leg.counterparty_id.as_deref(), Some("seller"));

    let ticket = TicketStore::get(&*fx.store, "1-A9").await.unwrap().unwrap();
    assert_eq!(ticket.owner.as_deref(), Some("buyer"));
    assert_eq!(ticket.previous_owner.as_deref(), Some("seller"));
    assert_eq!(ticket.sale_price, Some(dec!(35)));
    assert_eq!(ticket.original_purchase_price, Some(dec!(20)));

    for user_id in ["seller", "buyer"] {
        let payroll = fx.users.get_user_payroll(user_id).await.unwrap().unwrap();
        assert_eq!(
            payroll.current_balance,
            payroll.total_sales - payroll.total_purchases
        );
    }
}

#[tokio::test]
async fn sale_by_non_owner_is_rejected_without_writes() {
    let fx = fixture();
    seed_ticket(&fx.store, "1-A9", dec!(20)).await;
    fx.trades
        .process_ticket_purchase("owner", "1-A9", dec!(20), "credit_card")
        .await
        .unwrap();

    let err = fx
        .trades
        .process_ticket_sale("impostor", "buyer", "1-A9", dec!(35))
        .await
        .unwrap_err();
    assert!(matches!(err, TradeError::Rejected(AppError::NotOwner(_))));

    assert!(fx
        .store
        .for_user("impostor", 10, None)
        .await
        .unwrap()
        .is_empty());
    let ticket = TicketStore::get(&*fx.store, "1-A9").await.unwrap().unwrap();
    assert_eq!(ticket.owner.as_deref(), Some("owner"));
    assert!(ticket.sale_price.is_none());
}

#[tokio::test]
async fn purchase_reports_committed_steps_when_ticket_mutation_fails() {
    let fx = fixture();
    seed_ticket(&fx.store, "1-A9", dec!(15.99)).await;
    fx.flaky.fail_updates();

    let err = fx
        .trades
        .process_ticket_purchase("buyer", "1-A9", dec!(15.99), "credit_card")
        .await
        .unwrap_err();

    match err {
        TradeError::Aborted { completed, .. } => {
            assert_eq!(completed, vec![TradeStep::LogWrite]);
        }
        other => panic!("expected aborted trade, got {other:?}"),
    }

    // The log write committed: an orphan transaction with no matching
    // ticket mutation or ledger update.
    let history = fx.store.for_user("buyer", 10, None).await.unwrap();
    assert_eq!(history.len(), 1);
    let ticket = TicketStore::get(&*fx.store, "1-A9").await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Available);
    assert!(fx.users.get_user_payroll("buyer").await.unwrap().is_none());
}

#[tokio::test]
async fn sale_reports_committed_steps_when_ticket_mutation_fails() {
    let fx = fixture();
    seed_ticket(&fx.store, "1-A9", dec!(20)).await;
    fx.trades
        .process_ticket_purchase("seller", "1-A9", dec!(20), "credit_card")
        .await
        .unwrap();
    fx.flaky.fail_updates();

    let err = fx
        .trades
        .process_ticket_sale("seller", "buyer", "1-A9", dec!(35))
        .await
        .unwrap_err();

    match err {
        TradeError::Aborted { completed, .. } => {
            assert_eq!(
                completed,
                vec![TradeStep::SellerLogWrite, TradeStep::BuyerLogWrite]
            );
        }
        other => panic!("expected aborted trade, got {other:?}"),
    }

    // Both log legs committed; ownership and ledgers untouched.
    assert_eq!(fx.store.for_user("buyer", 10, None).await.unwrap().len(), 1);
    let ticket = TicketStore::get(&*fx.store, "1-A9").await.unwrap().unwrap();
    assert_eq!(ticket.owner.as_deref(), Some("seller"));
    assert!(fx.users.get_user_payroll("buyer").await.unwrap().is_none());
}

#[tokio::test]
async fn transaction_history_limits_and_fetches_by_id() {
    let fx = fixture();
    seed_ticket(&fx.store, "1-A9", dec!(10)).await;
    seed_ticket(&fx.store, "1-B5", dec!(12)).await;
    fx.trades
        .process_ticket_purchase("buyer", "1-A9", dec!(10), "credit_card")
        .await
        .unwrap();
    fx.trades
        .process_ticket_purchase("buyer", "1-B5", dec!(12), "credit_card")
        .await
        .unwrap();

    let all = fx
        .trades
        .get_user_transactions("buyer", 50, None)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    let seats: Vec<&str> = all.iter().map(|tx| tx.theatre_seat.as_str()).collect();
    assert!(seats.contains(&"1-A9") && seats.contains(&"1-B5"));

    let limited = fx
        .trades
        .get_user_transactions("buyer", 1, None)
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);

    let fetched = fx
        .trades
        .get_transaction(&all[0].transaction_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched, all[0]);
}
