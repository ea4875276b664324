pub mod assignments;
pub mod auth;
pub mod availability;
pub mod chat;
pub mod profile;
