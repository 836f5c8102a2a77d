// File: src/services/queue/mod.rs

pub mod store;
pub mod mute;
pub mod service;

use thiserror::Error;

pub use mute::{Advance, MuteCoordinator};
pub use service::QueueService;
pub use store::{Participant, SpeakerQueue};

/// Why a queue command was refused. The `Display` text goes straight back
/// to the user, so keep it readable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Please enter a valid integer position.")]
    Parse(String),

    #[error("There is no one at position {position}; the queue has {len} entries.")]
    OutOfRange { position: i64, len: usize },

    #[error("No one in the queue!")]
    Empty,

    #[error("You are already in the queue at position {position}.")]
    AlreadyQueued { position: usize },

    #[error("{0}")]
    Unauthorized(String),
}
