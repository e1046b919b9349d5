pub mod auth;
pub mod buyer;
pub mod health;
pub mod upload;
