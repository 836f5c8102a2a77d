use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::services::queue::{Participant, QueueError, SpeakerQueue};
use mobqueue_common::traits::api::DiscordGateway;

/// Largest page Discord hands out for the list-guild-members endpoint.
pub const MEMBER_PAGE_SIZE: u16 = 1000;

/// What an advance did to the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// `previous` gave up the floor to `speaker`.
    Next {
        previous: Participant,
        speaker: Participant,
    },
    /// `previous` was the last one; everybody has been unmuted.
    Emptied { previous: Participant },
}

/// Keeps voice mutes in step with the speaker queue.
///
/// Every call is best-effort: a failing mute is logged and the rest of the
/// broadcast still goes out. Calls are issued one at a time.
pub struct MuteCoordinator {
    gateway: Arc<dyn DiscordGateway>,
    guild_id: String,
}

impl MuteCoordinator {
    pub fn new(gateway: Arc<dyn DiscordGateway>, guild_id: impl Into<String>) -> Self {
        Self {
            gateway,
            guild_id: guild_id.into(),
        }
    }

    /// The queue just went from empty to holding `head`: silence the guild,
    /// then hand `head` the floor.
    pub async fn start_session(&self, head: &Participant) {
        info!("Queue started; muting guild {} except {}", self.guild_id, head.user_id);
        self.broadcast(true).await;
        self.set_muted(&head.user_id, false).await;
    }

    /// Pops the head, moving the floor to whoever is next. Mutes the outgoing
    /// speaker before unmuting the incoming one.
    pub async fn advance(&self, queue: &mut SpeakerQueue) -> Result<Advance, QueueError> {
        let outgoing = queue.peek_head().cloned().ok_or(QueueError::Empty)?;

        if queue.len() == 1 {
            let previous = queue.pop_head()?;
            self.end_session().await;
            return Ok(Advance::Emptied { previous });
        }

        self.set_muted(&outgoing.user_id, true).await;
        let previous = queue.pop_head()?;
        let speaker = queue.peek_head().cloned().ok_or(QueueError::Empty)?;
        self.set_muted(&speaker.user_id, false).await;

        Ok(Advance::Next { previous, speaker })
    }

    /// The queue is empty again: give everybody their voice back.
    pub async fn end_session(&self) {
        info!("Queue emptied; unmuting guild {}", self.guild_id);
        self.broadcast(false).await;
    }

    /// Sets the same mute state on every guild member, sequentially.
    pub async fn broadcast(&self, muted: bool) {
        let members = self.member_ids().await;
        let mut failures = 0usize;
        for user_id in &members {
            if !self.set_muted(user_id, muted).await {
                failures += 1;
            }
        }
        debug!(
            "Broadcast mute={} to {} members of guild {} ({} failed)",
            muted,
            members.len(),
            self.guild_id,
            failures
        );
    }

    /// Returns `false` if Discord refused; never fails the caller.
    pub async fn set_muted(&self, user_id: &str, muted: bool) -> bool {
        match self.gateway.set_member_muted(&self.guild_id, user_id, muted).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to set mute={} for user {}: {}", muted, user_id, e);
                false
            }
        }
    }

    /// Walks the member list page by page. A failed page ends the walk with
    /// whatever was collected so far.
    pub async fn member_ids(&self) -> Vec<String> {
        let mut all = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let page = match self
                .gateway
                .list_guild_members(&self.guild_id, after.clone(), MEMBER_PAGE_SIZE)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!("Failed to list members of guild {}: {}", self.guild_id, e);
                    break;
                }
            };

            let short_page = page.len() < usize::from(MEMBER_PAGE_SIZE);
            after = page.last().cloned();
            all.extend(page);

            if short_page || after.is_none() {
                break;
            }
        }

        all
    }
}
