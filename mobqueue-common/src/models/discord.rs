/// A platform-neutral embed. The Discord runtime converts this into a
/// twilight `Embed` right before sending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscordEmbed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<DiscordEmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordEmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl DiscordEmbed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Title + description, the shape used by most bot notices.
    pub fn notice(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            fields: Vec::new(),
        }
    }
}

/// One inbound chat message, as handed from a shard runner to the bot loop.
#[derive(Debug, Clone)]
pub struct DiscordMessageEvent {
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub user_id: String,
    pub username: String,
    pub text: String,
}
