use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use twilight_gateway::{
    self as gateway,
    CloseFrame,
    Config,
    Event,
    EventTypeFlags,
    Intents,
    Shard,
    MessageSender,
    StreamExt,
};
use twilight_http::Client as HttpClient;
use twilight_http::client::ClientBuilder;

use crate::Error;
use crate::platforms::{ConnectionStatus, PlatformAuth, PlatformIntegration};
use crate::platforms::discord::gateway::DiscordHttpGateway;
use mobqueue_common::models::discord::DiscordMessageEvent;

/// The shard runner:
///   - calls `shard.next_event(...)`
///   - sends inbound chat messages to `tx`.
async fn shard_runner(mut shard: Shard, tx: UnboundedSender<DiscordMessageEvent>) {
    let shard_id = shard.id().number();
    info!("(ShardRunner) Shard {shard_id} started. Listening for events.");

    let wanted = EventTypeFlags::READY | EventTypeFlags::MESSAGE_CREATE;
    while let Some(item) = shard.next_event(wanted).await {
        match item {
            Ok(Event::Ready(ready)) => {
                info!(
                    "Shard {shard_id} => READY as {} (ID={})",
                    ready.user.name, ready.user.id
                );
            }
            Ok(Event::MessageCreate(msg_create)) => {
                let msg = &msg_create;
                if msg.author.bot {
                    debug!("Ignoring bot message from {}", msg.author.name);
                    continue;
                }

                let event = DiscordMessageEvent {
                    channel_id: msg.channel_id.to_string(),
                    guild_id: msg.guild_id.map(|g| g.to_string()),
                    user_id: msg.author.id.to_string(),
                    username: msg.author.name.clone(),
                    text: msg.content.clone(),
                };
                if tx.send(event).is_err() {
                    warn!("Shard {shard_id} => event receiver dropped; stopping runner.");
                    break;
                }
            }
            Ok(other) => {
                trace!("Shard {shard_id} => unhandled event: {:?}", other.kind());
            }
            Err(err) => {
                error!("Shard {shard_id} => error receiving event: {err:?}");
            }
        }
    }

    warn!("(ShardRunner) Shard {shard_id} event loop ended.");
}

/// Owns the gateway shards and the HTTP client for one bot token.
pub struct DiscordPlatform {
    pub token: String,
    pub connection_status: ConnectionStatus,

    /// Filled in by `connect`; `None` until then.
    pub rx: Mutex<Option<UnboundedReceiver<DiscordMessageEvent>>>,

    pub shard_tasks: Vec<JoinHandle<()>>,
    pub shard_senders: Vec<MessageSender>,

    pub http: Option<Arc<HttpClient>>,

    /// The bot's own user id, resolved through `current_user` on connect.
    pub bot_user_id: Option<String>,
}

impl DiscordPlatform {
    pub fn new(token: String) -> Self {
        Self {
            token,
            connection_status: ConnectionStatus::Disconnected,
            rx: Mutex::new(None),
            shard_tasks: Vec::new(),
            shard_senders: Vec::new(),
            http: None,
            bot_user_id: None,
        }
    }

    /// Waits for the next inbound message. Returns `None` when not connected
    /// or once every shard runner has stopped.
    pub async fn next_message_event(&self) -> Option<DiscordMessageEvent> {
        let mut guard = self.rx.lock().await;
        match guard.as_mut() {
            Some(r) => r.recv().await,
            None => None,
        }
    }

    /// A cheap handle onto the REST side, for the services that send
    /// messages and change voice state.
    pub fn gateway(&self) -> Result<Arc<DiscordHttpGateway>, Error> {
        let http = self
            .http
            .clone()
            .ok_or_else(|| Error::Platform("Discord HTTP client not available; connect first".into()))?;
        Ok(Arc::new(DiscordHttpGateway::new(http)))
    }
}

#[async_trait]
impl PlatformAuth for DiscordPlatform {
    async fn authenticate(&mut self) -> Result<(), Error> {
        if self.token.trim().is_empty() {
            return Err(Error::Auth("Discord token is empty".into()));
        }
        Ok(())
    }

    async fn is_authenticated(&self) -> Result<bool, Error> {
        Ok(!self.token.trim().is_empty())
    }
}

/// Connect, create the unbounded channel, store it in `rx`, and spawn the shard runners.
#[async_trait]
impl PlatformIntegration for DiscordPlatform {
    async fn connect(&mut self) -> Result<(), Error> {
        if matches!(self.connection_status, ConnectionStatus::Connected) {
            info!("(DiscordPlatform) Already connected => skipping");
            return Ok(());
        }

        let (tx, rx) = unbounded_channel::<DiscordMessageEvent>();
        {
            let mut guard = self.rx.lock().await;
            *guard = Some(rx);
        }

        let http_client = Arc::new(
            ClientBuilder::new()
                .token(self.token.clone())
                .timeout(Duration::from_secs(30))
                .build()
        );
        self.http = Some(http_client.clone());

        let me = http_client
            .current_user()
            .await
            .map_err(|e| Error::Auth(format!("Error fetching current user: {e}")))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Error parsing current user: {e}")))?;
        info!("(DiscordPlatform) Logged in as {} (ID={})", me.name, me.id);
        self.bot_user_id = Some(me.id.to_string());

        let config = Config::new(
            self.token.clone(),
            Intents::GUILDS
                | Intents::GUILD_MESSAGES
                | Intents::GUILD_MEMBERS
                | Intents::MESSAGE_CONTENT,
        );

        let shards = match gateway::create_recommended(&http_client, config, |_, b| b.build()).await {
            Ok(shards) => shards,
            Err(e) => {
                self.connection_status = ConnectionStatus::Error(e.to_string());
                return Err(Error::Platform(format!("create_recommended error: {e}")));
            }
        };

        for shard in shards {
            self.shard_senders.push(shard.sender());

            let tx_for_shard = tx.clone();
            let handle = tokio::spawn(async move {
                shard_runner(shard, tx_for_shard).await;
            });
            self.shard_tasks.push(handle);
        }

        self.connection_status = ConnectionStatus::Connected;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), Error> {
        self.connection_status = ConnectionStatus::Disconnected;

        for sender in &self.shard_senders {
            let _ = sender.close(CloseFrame::NORMAL);
        }
        for task in self.shard_tasks.drain(..) {
            if let Err(e) = task.await {
                warn!("(DiscordPlatform) shard task ended abnormally: {e:?}");
            }
        }
        self.shard_senders.clear();

        {
            let mut guard = self.rx.lock().await;
            *guard = None;
        }

        Ok(())
    }

    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error> {
        Ok(self.connection_status.clone())
    }
}
