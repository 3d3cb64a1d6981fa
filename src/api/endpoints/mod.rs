//! API endpoint handlers.

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod health;
pub mod patients;
pub mod reports;
