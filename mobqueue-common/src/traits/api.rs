use async_trait::async_trait;

use crate::error::Error;
use crate::models::discord::DiscordEmbed;

/// ---------------------------------------------------------------------------
/// DiscordGateway trait
///
/// Everything the queue bot needs from Discord. The twilight runtime
/// implements it for real; tests implement it in memory.
/// ---------------------------------------------------------------------------
#[async_trait]
pub trait DiscordGateway: Send + Sync {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<(), Error>;

    async fn send_embed(&self, channel_id: &str, embed: &DiscordEmbed) -> Result<(), Error>;

    /// One page of guild member ids, ordered by id, strictly after `after`.
    async fn list_guild_members(
        &self,
        guild_id: &str,
        after: Option<String>,
        limit: u16,
    ) -> Result<Vec<String>, Error>;

    /// Server-mutes (or unmutes) a member in voice.
    async fn set_member_muted(&self, guild_id: &str, user_id: &str, muted: bool) -> Result<(), Error>;
}
