pub mod buyer;
pub mod upload;
pub mod user;
