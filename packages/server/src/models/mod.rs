pub mod auth;
pub mod buyer;
pub mod shared;
pub mod upload;
