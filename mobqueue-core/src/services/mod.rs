// File: src/services/mod.rs

pub mod queue;
pub mod discord;

pub use discord::router::{CommandRouter, Reply};
pub use queue::service::QueueService;
