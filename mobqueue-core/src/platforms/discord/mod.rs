pub mod gateway;
pub mod runtime;

pub use gateway::DiscordHttpGateway;
pub use runtime::DiscordPlatform;
