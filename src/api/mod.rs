//! REST access to the queue backend.

pub mod client;
pub mod payload;

pub use client::ApiClient;
