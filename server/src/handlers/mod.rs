pub mod auth;
pub mod chat;
pub mod engagement;
pub mod events;
pub mod health;

pub use health::health_check;
