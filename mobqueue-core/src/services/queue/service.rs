use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::services::discord::format::id_to_mention;
use crate::services::queue::{Advance, MuteCoordinator, Participant, QueueError, SpeakerQueue};

/// Result of a successful `remove`.
#[derive(Debug, Clone)]
pub struct Removal {
    pub removed: Participant,
    pub position: usize,
    /// Whoever slid into `position`, if anyone did.
    pub shifted: Option<Participant>,
    /// Set when the removed entry was the current speaker.
    pub advance: Option<Advance>,
}

/// Owns the speaker queue and serializes every change to it.
///
/// The lock is held across the mute broadcast a change triggers, so two
/// commands arriving together are applied one after the other.
pub struct QueueService {
    queue: Mutex<SpeakerQueue>,
    mutes: MuteCoordinator,
    host_id: Option<String>,
}

impl QueueService {
    pub fn new(mutes: MuteCoordinator, host_id: Option<String>) -> Self {
        Self {
            queue: Mutex::new(SpeakerQueue::new()),
            mutes,
            host_id,
        }
    }

    pub fn is_host(&self, user_id: &str) -> bool {
        self.host_id.as_deref() == Some(user_id)
    }

    /// A copy of the queue as it is right now.
    pub async fn snapshot(&self) -> SpeakerQueue {
        self.queue.lock().await.clone()
    }

    /// Appends `participant`. The first entrant starts a muted session.
    pub async fn add(&self, participant: Participant) -> Result<SpeakerQueue, QueueError> {
        let mut queue = self.queue.lock().await;
        if let Some(position) = queue.position_of(&participant.user_id) {
            return Err(QueueError::AlreadyQueued { position });
        }

        let was_empty = queue.is_empty();
        info!("Adding {} ({}) to the queue", participant.username, participant.user_id);
        queue.append(participant.clone());

        if was_empty {
            self.mutes.start_session(&participant).await;
        }
        Ok(queue.clone())
    }

    /// Moves the floor on. Only the host or the current speaker may do this.
    pub async fn next(&self, caller_id: &str) -> Result<(Advance, SpeakerQueue), QueueError> {
        let mut queue = self.queue.lock().await;
        let head = queue.peek_head().ok_or(QueueError::Empty)?;

        if !self.is_host(caller_id) && head.user_id != caller_id {
            debug!("Refusing .q next from {}", caller_id);
            return Err(QueueError::Unauthorized(format!(
                "Only the current speaker ({}) or the session host ({}) can run `.q next`.",
                id_to_mention(&head.user_id),
                self.host_mention(),
            )));
        }

        let advance = self.mutes.advance(&mut queue).await?;
        Ok((advance, queue.clone()))
    }

    /// Removes the entry at `raw_position` (zero-based, 0 = current speaker).
    /// Only the host or the person at that position may do this.
    pub async fn remove(
        &self,
        caller_id: &str,
        raw_position: Option<&str>,
    ) -> Result<(Removal, SpeakerQueue), QueueError> {
        let raw = raw_position.unwrap_or_default();
        let requested: i64 = raw
            .parse()
            .map_err(|_| QueueError::Parse(raw.to_string()))?;

        let mut queue = self.queue.lock().await;
        let found = usize::try_from(requested)
            .ok()
            .and_then(|p| queue.get(p).map(|target| (p, target)));
        let Some((position, target)) = found else {
            return Err(QueueError::OutOfRange {
                position: requested,
                len: queue.len(),
            });
        };

        if !self.is_host(caller_id) && target.user_id != caller_id {
            debug!("Refusing .q remove {} from {}", position, caller_id);
            return Err(QueueError::Unauthorized(format!(
                "Only the session host ({}) or the person to be removed can run `.q remove`.",
                self.host_mention(),
            )));
        }

        let removal = if position == 0 {
            // Removing the speaker moves the floor, mutes included.
            let advance = self.mutes.advance(&mut queue).await?;
            let removed = match &advance {
                Advance::Next { previous, .. } | Advance::Emptied { previous } => previous.clone(),
            };
            Removal {
                removed,
                position,
                shifted: queue.get(position).cloned(),
                advance: Some(advance),
            }
        } else {
            let removed = queue.remove_at(position)?;
            Removal {
                removed,
                position,
                shifted: queue.get(position).cloned(),
                advance: None,
            }
        };

        info!(
            "Removed {} ({}) from position {}",
            removal.removed.username, removal.removed.user_id, position
        );
        Ok((removal, queue.clone()))
    }

    fn host_mention(&self) -> String {
        match &self.host_id {
            Some(id) => id_to_mention(id),
            None => "none configured".to_string(),
        }
    }
}
