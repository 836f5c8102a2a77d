// File: mobqueue-core/tests/test_utils/helpers.rs

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mobqueue_common::error::Error;
use mobqueue_common::models::discord::{DiscordEmbed, DiscordMessageEvent};
use mobqueue_common::traits::api::DiscordGateway;
use mobqueue_core::services::queue::{MuteCoordinator, QueueService};
use mobqueue_core::services::CommandRouter;

pub const GUILD_ID: &str = "100";
pub const CHANNEL_ID: &str = "200";
pub const BOT_ID: &str = "999";
pub const HOST_ID: &str = "h";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Message { channel: String, text: String },
    Embed { channel: String, embed: DiscordEmbed },
    ListMembers { after: Option<String>, limit: u16 },
    Mute { user: String, muted: bool },
}

/// In-memory gateway that remembers every call and the mute state it left
/// each member in.
#[derive(Default)]
pub struct RecordingGateway {
    pub members: Vec<String>,
    pub fail_mutes_for: HashSet<String>,
    /// Embeds with one of these titles fail to send (after being recorded).
    pub fail_embed_titles: HashSet<String>,
    /// Hands control back to the runtime inside every mute call, so other
    /// tasks get polled in the middle of a broadcast.
    pub yield_on_mute: bool,
    pub calls: Mutex<Vec<Call>>,
    pub muted: Mutex<HashMap<String, bool>>,
}

impl RecordingGateway {
    pub fn with_members(members: &[&str]) -> Self {
        Self {
            members: members.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn mute_calls(&self) -> Vec<(String, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Mute { user, muted } => Some((user, muted)),
                _ => None,
            })
            .collect()
    }

    pub fn is_muted(&self, user: &str) -> Option<bool> {
        self.muted.lock().unwrap().get(user).copied()
    }

    /// Members whose last recorded state is "unmuted".
    pub fn unmuted(&self) -> Vec<String> {
        let state = self.muted.lock().unwrap();
        let mut out: Vec<String> = state
            .iter()
            .filter(|(_, muted)| !**muted)
            .map(|(user, _)| user.clone())
            .collect();
        out.sort();
        out
    }
}

#[async_trait]
impl DiscordGateway for RecordingGateway {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<(), Error> {
        self.calls.lock().unwrap().push(Call::Message {
            channel: channel_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_embed(&self, channel_id: &str, embed: &DiscordEmbed) -> Result<(), Error> {
        self.calls.lock().unwrap().push(Call::Embed {
            channel: channel_id.to_string(),
            embed: embed.clone(),
        });
        if let Some(title) = &embed.title {
            if self.fail_embed_titles.contains(title) {
                return Err(Error::Platform(format!("cannot send {title:?}")));
            }
        }
        Ok(())
    }

    async fn list_guild_members(
        &self,
        _guild_id: &str,
        after: Option<String>,
        limit: u16,
    ) -> Result<Vec<String>, Error> {
        self.calls.lock().unwrap().push(Call::ListMembers {
            after: after.clone(),
            limit,
        });
        let start = match &after {
            Some(cursor) => self
                .members
                .iter()
                .position(|m| m == cursor)
                .map(|i| i + 1)
                .unwrap_or(self.members.len()),
            None => 0,
        };
        Ok(self
            .members
            .iter()
            .skip(start)
            .take(usize::from(limit))
            .cloned()
            .collect())
    }

    async fn set_member_muted(&self, _guild_id: &str, user_id: &str, muted: bool) -> Result<(), Error> {
        if self.yield_on_mute {
            tokio::task::yield_now().await;
        }
        self.calls.lock().unwrap().push(Call::Mute {
            user: user_id.to_string(),
            muted,
        });
        if self.fail_mutes_for.contains(user_id) {
            return Err(Error::Platform(format!("missing permissions for {user_id}")));
        }
        self.muted.lock().unwrap().insert(user_id.to_string(), muted);
        Ok(())
    }
}

pub struct Harness {
    pub gateway: Arc<RecordingGateway>,
    pub queue: Arc<QueueService>,
    pub router: Arc<CommandRouter>,
}

pub fn harness(members: &[&str]) -> Harness {
    harness_with(RecordingGateway::with_members(members))
}

pub fn harness_with(gateway: RecordingGateway) -> Harness {
    let gateway = Arc::new(gateway);
    let mutes = MuteCoordinator::new(gateway.clone(), GUILD_ID);
    let queue = Arc::new(QueueService::new(mutes, Some(HOST_ID.to_string())));
    let router = Arc::new(CommandRouter::new(
        gateway.clone(),
        queue.clone(),
        ".",
        Some(BOT_ID.to_string()),
    ));
    Harness { gateway, queue, router }
}

pub fn message(user_id: &str, text: &str) -> DiscordMessageEvent {
    DiscordMessageEvent {
        channel_id: CHANNEL_ID.to_string(),
        guild_id: Some(GUILD_ID.to_string()),
        user_id: user_id.to_string(),
        username: format!("name-{user_id}"),
        text: text.to_string(),
    }
}

pub async fn queue_ids(queue: &QueueService) -> Vec<String> {
    queue
        .snapshot()
        .await
        .entries()
        .iter()
        .map(|p| p.user_id.clone())
        .collect()
}
