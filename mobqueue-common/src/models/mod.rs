// File: mobqueue-common/src/models/mod.rs
pub mod discord;

pub use discord::{DiscordEmbed, DiscordEmbedField, DiscordMessageEvent};
