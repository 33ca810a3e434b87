pub mod auth_service;
pub mod cart_service;
pub mod menu_service;
pub mod notification_service;
pub mod offer_service;
pub mod order_events;
pub mod order_service;
pub mod sms_service;
pub mod status_service;
pub mod support_service;
pub mod user_service;
