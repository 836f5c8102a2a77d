use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use twilight_http::Client as HttpClient;
use twilight_model::channel::message::Embed;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, UserMarker};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder};

use crate::Error;
use mobqueue_common::models::discord::DiscordEmbed;
use mobqueue_common::traits::api::DiscordGateway;

/// REST-side implementation of [`DiscordGateway`] on top of twilight-http.
pub struct DiscordHttpGateway {
    http: Arc<HttpClient>,
}

impl DiscordHttpGateway {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }
}

/// Parses a snowflake, rejecting garbage and zero.
pub fn parse_id<T>(raw: &str, what: &str) -> Result<Id<T>, Error> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .and_then(Id::new_checked)
        .ok_or_else(|| Error::Platform(format!("Invalid {what} ID: {raw}")))
}

/// Converts our embed model into a validated twilight embed.
pub fn to_twilight_embed(embed: &DiscordEmbed) -> Result<Embed, Error> {
    let mut builder = EmbedBuilder::new();
    if let Some(title) = &embed.title {
        builder = builder.title(title.clone());
    }
    if let Some(description) = &embed.description {
        builder = builder.description(description.clone());
    }
    for field in &embed.fields {
        let mut f = EmbedFieldBuilder::new(field.name.clone(), field.value.clone());
        if field.inline {
            f = f.inline();
        }
        builder = builder.field(f);
    }

    builder
        .validate()
        .map(|b| b.build())
        .map_err(|e| Error::Platform(format!("Invalid embed: {e}")))
}

#[async_trait]
impl DiscordGateway for DiscordHttpGateway {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<(), Error> {
        let channel_id = parse_id::<ChannelMarker>(channel_id, "channel")?;
        self.http
            .create_message(channel_id)
            .content(text)
            .await
            .map_err(|e| Error::Platform(format!("Error sending Discord message: {e:?}")))?;
        Ok(())
    }

    async fn send_embed(&self, channel_id: &str, embed: &DiscordEmbed) -> Result<(), Error> {
        let channel_id = parse_id::<ChannelMarker>(channel_id, "channel")?;
        let embeds = [to_twilight_embed(embed)?];
        self.http
            .create_message(channel_id)
            .embeds(&embeds)
            .await
            .map_err(|e| Error::Platform(format!("Error sending Discord embed: {e:?}")))?;
        Ok(())
    }

    async fn list_guild_members(
        &self,
        guild_id: &str,
        after: Option<String>,
        limit: u16,
    ) -> Result<Vec<String>, Error> {
        let guild_id = parse_id::<GuildMarker>(guild_id, "guild")?;
        let mut request = self.http.guild_members(guild_id).limit(limit);
        if let Some(after) = after {
            request = request.after(parse_id::<UserMarker>(&after, "user")?);
        }

        let members = request
            .await
            .map_err(|e| Error::Platform(format!("Error listing guild members: {e:?}")))?
            .models()
            .await
            .map_err(|e| Error::Platform(format!("Error parsing guild members: {e:?}")))?;
        trace!("Fetched {} members of guild {}", members.len(), guild_id);

        Ok(members.into_iter().map(|m| m.user.id.to_string()).collect())
    }

    async fn set_member_muted(&self, guild_id: &str, user_id: &str, muted: bool) -> Result<(), Error> {
        let guild_id = parse_id::<GuildMarker>(guild_id, "guild")?;
        let user_id = parse_id::<UserMarker>(user_id, "user")?;
        self.http
            .update_guild_member(guild_id, user_id)
            .mute(muted)
            .await
            .map_err(|e| Error::Platform(format!("Error setting mute={muted} for {user_id}: {e:?}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobqueue_common::models::discord::DiscordEmbedField;

    #[test]
    fn parse_id_rejects_zero_and_text() {
        assert!(parse_id::<UserMarker>("0", "user").is_err());
        assert!(parse_id::<UserMarker>("abc", "user").is_err());
        assert_eq!(parse_id::<UserMarker>("42", "user").unwrap().get(), 42);
    }

    #[test]
    fn embed_conversion_keeps_fields_in_order() {
        let mut embed = DiscordEmbed::notice("Queue:", "");
        embed.description = None;
        embed.fields.push(DiscordEmbedField {
            name: "Now Speaking:".into(),
            value: "<@1>".into(),
            inline: false,
        });
        embed.fields.push(DiscordEmbedField {
            name: "Waiting:".into(),
            value: "No one yet!".into(),
            inline: true,
        });

        let built = to_twilight_embed(&embed).unwrap();
        assert_eq!(built.title.as_deref(), Some("Queue:"));
        assert!(built.description.is_none());
        assert_eq!(built.fields.len(), 2);
        assert_eq!(built.fields[0].name, "Now Speaking:");
        assert!(!built.fields[0].inline);
        assert!(built.fields[1].inline);
    }
}
