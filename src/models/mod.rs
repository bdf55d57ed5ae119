pub mod event;
pub mod ticket;
pub mod transaction;
pub mod user;

pub use event::TicketEvent;
pub use ticket::{Ticket, TicketStatus};
pub use transaction::{Transaction, TransactionStatus, TransactionType};
pub use user::{LeaderboardEntry, SortOrder, UserPayroll, UserSummary};
