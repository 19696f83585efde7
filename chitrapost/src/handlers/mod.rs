//! HTTP handlers
//!
//! Thin adapters: extract, call one service, map the result.

pub mod health;
pub mod uploads;
pub mod users;
