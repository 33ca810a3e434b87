pub mod app_status;
pub mod cart;
pub mod menu_item;
pub mod offer;
pub mod order;
pub mod support_ticket;
pub mod user;

pub use app_status::*;
pub use cart::*;
pub use menu_item::*;
pub use offer::*;
pub use order::*;
pub use support_ticket::*;
pub use user::*;
