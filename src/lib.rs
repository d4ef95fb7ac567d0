pub mod bot;
pub mod config;
pub mod payload;
pub mod platform;
pub mod replies;
