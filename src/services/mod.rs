pub mod price_change;
pub mod tickets;
pub mod trades;
pub mod users;

pub use price_change::{Discount, EventDisposition, PriceChangeProcessor};
pub use tickets::TicketService;
pub use trades::{PurchaseReceipt, SaleReceipt, TradeError, TradeService, TradeStep};
pub use users::UserService;
