//! Mentions and the embeds the queue commands answer with.

use mobqueue_common::models::discord::{DiscordEmbed, DiscordEmbedField};

use crate::services::queue::{Participant, QueueError, SpeakerQueue};

pub const OOPS_TITLE: &str = "Oops, that didn't work.";
pub const HELP_HINT: &str = "Type `.help` for a list of valid commands.";
pub const NOT_IMPLEMENTED: &str = "`to be implemented`";

pub fn id_to_mention(id: &str) -> String {
    format!("<@{}>", id)
}

/// "Now Speaking" plus the numbered waiting list. `None` for an empty queue.
pub fn queue_embed(queue: &SpeakerQueue) -> Option<DiscordEmbed> {
    let speaker = queue.peek_head()?;

    let waiting = if queue.waiting().is_empty() {
        "No one yet!".to_string()
    } else {
        queue
            .waiting()
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {}", i + 1, id_to_mention(&p.user_id)))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut embed = DiscordEmbed::new();
    embed.title = Some("Queue:".to_string());
    embed.fields.push(DiscordEmbedField {
        name: "Now Speaking:".to_string(),
        value: id_to_mention(&speaker.user_id),
        inline: false,
    });
    embed.fields.push(DiscordEmbedField {
        name: "Waiting:".to_string(),
        value: waiting,
        inline: false,
    });
    Some(embed)
}

pub fn empty_queue_notice() -> DiscordEmbed {
    DiscordEmbed::notice(
        "No one in the queue yet!",
        "Type `.q add` to add yourself to the queue.",
    )
}

pub fn added_notice(participant: &Participant) -> DiscordEmbed {
    DiscordEmbed::notice(
        "Added!",
        format!("{} has been added to the queue.", id_to_mention(&participant.user_id)),
    )
}

pub fn new_speaker_notice(speaker: &Participant) -> DiscordEmbed {
    DiscordEmbed::notice(
        "Popped the stack!",
        format!("{} is now the speaker.", id_to_mention(&speaker.user_id)),
    )
}

pub fn queue_emptied_notice() -> DiscordEmbed {
    DiscordEmbed::notice(
        "No one else in queue!",
        "Unmuted everyone. Type `.q add` to restart the queue.",
    )
}

pub fn removed_notice(removed: &Participant, position: usize, shifted: Option<&Participant>) -> DiscordEmbed {
    let description = match shifted {
        Some(next) => format!("{} is now at position {}", id_to_mention(&next.user_id), position),
        None => format!("{} is no longer in the queue.", id_to_mention(&removed.user_id)),
    };
    DiscordEmbed::notice(format!("Removed {} from the queue!", removed.username), description)
}

pub fn error_notice(err: &QueueError) -> DiscordEmbed {
    match err {
        QueueError::Empty => DiscordEmbed::notice(
            "No one in queue!",
            "Type `.q add` to add yourself to the queue.",
        ),
        other => DiscordEmbed::notice(OOPS_TITLE, other.to_string()),
    }
}
