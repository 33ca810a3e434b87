pub mod auth;
pub mod cart;
pub mod health;
pub mod menu;
pub mod metrics;
pub mod offers;
pub mod orders;
pub mod status;
pub mod support;
pub mod swagger;
pub mod users;
