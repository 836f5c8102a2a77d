use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::Error;
use crate::services::discord::format::{self, HELP_HINT, NOT_IMPLEMENTED};
use crate::services::queue::{Advance, Participant, QueueService};
use mobqueue_common::models::discord::{DiscordEmbed, DiscordMessageEvent};
use mobqueue_common::traits::api::DiscordGateway;

/// One outbound message produced by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Embed(DiscordEmbed),
}

/// Handles prefixed text commands (`.ping`, `.q add`, ...).
pub struct CommandRouter {
    gateway: Arc<dyn DiscordGateway>,
    queue: Arc<QueueService>,
    command_prefix: String,
    bot_user_id: Option<String>,
}

impl CommandRouter {
    pub fn new(
        gateway: Arc<dyn DiscordGateway>,
        queue: Arc<QueueService>,
        command_prefix: &str,
        bot_user_id: Option<String>,
    ) -> Self {
        Self {
            gateway,
            queue,
            command_prefix: command_prefix.to_string(),
            bot_user_id,
        }
    }

    /// Runs the command in `event` and sends the replies to its channel.
    /// Returns `Ok(false)` if the message was not for us.
    pub async fn handle_message(&self, event: &DiscordMessageEvent) -> Result<bool, Error> {
        let Some(replies) = self.dispatch(event).await else {
            return Ok(false);
        };

        let mut first_error = None;
        for reply in &replies {
            let sent = match reply {
                Reply::Text(text) => self.gateway.send_message(&event.channel_id, text).await,
                Reply::Embed(embed) => self.gateway.send_embed(&event.channel_id, embed).await,
            };
            if let Err(e) = sent {
                warn!("Failed to send reply in channel {}: {}", event.channel_id, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(true),
        }
    }

    /// Spawns the task that answers messages. Events sent on the returned
    /// channel are handled one at a time, in the order they were sent; the
    /// task ends once every sender is dropped and the backlog is done.
    pub fn spawn_worker(self: Arc<Self>) -> (UnboundedSender<DiscordMessageEvent>, JoinHandle<()>) {
        let (tx, mut rx) = unbounded_channel::<DiscordMessageEvent>();
        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = self.handle_message(&event).await {
                    error!(
                        "Failed to answer {:?} in channel {}: {:?}",
                        event.text, event.channel_id, e
                    );
                }
            }
            debug!("Command worker stopped.");
        });
        (tx, handle)
    }

    /// Works out the replies for `event` without sending them. `None` means
    /// the message is ignored entirely.
    pub async fn dispatch(&self, event: &DiscordMessageEvent) -> Option<Vec<Reply>> {
        let command_text = event.text.strip_prefix(&self.command_prefix)?;

        if self.bot_user_id.as_deref() == Some(event.user_id.as_str()) {
            return None;
        }
        // A lone prefix, or a prefix followed by a space, is not a command.
        if command_text.is_empty() || command_text.starts_with(char::is_whitespace) {
            return None;
        }

        let parts: Vec<&str> = command_text.split_whitespace().collect();
        let command = parts[0];
        let args = &parts[1..];
        debug!("CommandRouter: {} ran {:?} with {:?}", event.user_id, command, args);

        let replies = match command {
            "ping" => vec![Reply::Text("Pong!".to_string())],
            "pong" => vec![Reply::Text("Ping!".to_string())],
            "say" => {
                let words = args.join(" ");
                if words.is_empty() {
                    Vec::new()
                } else {
                    vec![Reply::Text(words)]
                }
            }
            "timer" | "help" => vec![Reply::Text(NOT_IMPLEMENTED.to_string())],
            "q" | "queue" => self.queue_command(args, event).await,
            _ => vec![Reply::Text(HELP_HINT.to_string())],
        };
        Some(replies)
    }

    async fn queue_command(&self, args: &[&str], event: &DiscordMessageEvent) -> Vec<Reply> {
        let Some((&sub, sub_args)) = args.split_first() else {
            let queue = self.queue.snapshot().await;
            let embed = format::queue_embed(&queue).unwrap_or_else(format::empty_queue_notice);
            return vec![Reply::Embed(embed)];
        };

        match sub {
            "add" | "+" => {
                let participant = Participant::new(event.user_id.clone(), event.username.clone());
                match self.queue.add(participant.clone()).await {
                    Ok(queue) => {
                        let mut replies = vec![Reply::Embed(format::added_notice(&participant))];
                        replies.extend(format::queue_embed(&queue).map(Reply::Embed));
                        replies
                    }
                    Err(e) => vec![Reply::Embed(format::error_notice(&e))],
                }
            }
            "next" | "pop" => match self.queue.next(&event.user_id).await {
                Ok((Advance::Next { speaker, .. }, queue)) => {
                    info!("Floor passed to {}", speaker.user_id);
                    let mut replies = vec![Reply::Embed(format::new_speaker_notice(&speaker))];
                    replies.extend(format::queue_embed(&queue).map(Reply::Embed));
                    replies
                }
                Ok((Advance::Emptied { .. }, _)) => {
                    vec![Reply::Embed(format::queue_emptied_notice())]
                }
                Err(e) => vec![Reply::Embed(format::error_notice(&e))],
            },
            "remove" | "rm" => {
                let raw_position = sub_args.first().copied();
                match self.queue.remove(&event.user_id, raw_position).await {
                    Ok((removal, queue)) => {
                        let mut replies = vec![Reply::Embed(format::removed_notice(
                            &removal.removed,
                            removal.position,
                            removal.shifted.as_ref(),
                        ))];
                        match &removal.advance {
                            Some(Advance::Emptied { .. }) => {
                                replies.push(Reply::Embed(format::queue_emptied_notice()));
                            }
                            Some(Advance::Next { speaker, .. }) => {
                                replies.push(Reply::Embed(format::new_speaker_notice(speaker)));
                            }
                            None => {}
                        }
                        replies.extend(format::queue_embed(&queue).map(Reply::Embed));
                        replies
                    }
                    Err(e) => vec![Reply::Embed(format::error_notice(&e))],
                }
            }
            _ => vec![Reply::Text(HELP_HINT.to_string())],
        }
    }
}
