use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use mobqueue_common::traits::api::DiscordGateway;
use mobqueue_core::Error;
use mobqueue_core::platforms::{PlatformAuth, PlatformIntegration};
use mobqueue_core::platforms::discord::DiscordPlatform;
use mobqueue_core::services::queue::MuteCoordinator;
use mobqueue_core::services::{CommandRouter, QueueService};

mod config;
use config::{Args, BotConfig};

fn init_tracing() {
    let _ = tracing_log::LogTracer::init();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mobqueue=info"));
    let sub = fmt().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(sub) {
        eprintln!("Failed to set global subscriber: {e}");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = match BotConfig::try_from(Args::parse()) {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return Err(e.into());
        }
    };
    info!(
        "MobQueue starting. guild={}, host={:?}, prefix={:?}",
        config.guild_id, config.host_id, config.prefix
    );

    if let Err(e) = run_bot(config).await {
        error!("Bot error: {:?}", e);
        return Err(e.into());
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run_bot(config: BotConfig) -> Result<(), Error> {
    let mut platform = DiscordPlatform::new(config.token.clone());
    platform.authenticate().await?;
    platform.connect().await?;

    let gateway: Arc<dyn DiscordGateway> = platform.gateway()?;
    let mutes = MuteCoordinator::new(gateway.clone(), config.guild_id.clone());
    let queue = Arc::new(QueueService::new(mutes, config.host_id.clone()));
    let router = Arc::new(CommandRouter::new(
        gateway,
        queue,
        &config.prefix,
        platform.bot_user_id.clone(),
    ));
    let (commands, worker) = router.spawn_worker();
    info!("Bot is now running. Press CTRL-C to exit.");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            maybe_event = platform.next_message_event() => {
                let Some(event) = maybe_event else {
                    warn!("Discord event stream closed; exiting bot loop.");
                    break;
                };
                if commands.send(event).is_err() {
                    error!("Command worker stopped; exiting bot loop.");
                    break;
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signaled; exiting bot loop.");
                break;
            }
        }
    }

    drop(commands);
    if let Err(e) = worker.await {
        warn!("Command worker ended abnormally: {e:?}");
    }

    info!("Closing Discord shards...");
    platform.disconnect().await?;
    info!("Bot shutdown complete.");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {:?}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {:?}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
