mod auth;
mod buyers;
mod common;
mod uploads;
