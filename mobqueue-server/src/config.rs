//! mobqueue-server/src/config.rs
//!
//! Command-line / environment configuration for the bot process.

use clap::Parser;
use mobqueue_common::error::Error;

/// Command-line arguments. Every flag can also come from the environment
/// (or a `.env` file).
#[derive(Parser, Debug, Clone)]
#[command(name = "mobqueue")]
#[command(author, version, about = "MobQueue - speaker queue bot for Discord voice sessions")]
#[command(disable_help_flag = true)]
pub struct Args {
    /// Bot token
    #[arg(short = 't', long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Guild in which the voice channel exists
    #[arg(short = 'g', long, env = "MOBQUEUE_GUILD_ID")]
    pub guild: String,

    /// Host of the mob session
    #[arg(short = 'h', long, env = "MOBQUEUE_HOST_ID")]
    pub host: Option<String>,

    /// Prefix that marks a message as a command
    #[arg(long, env = "MOBQUEUE_PREFIX", default_value = ".")]
    pub prefix: String,

    /// Print help
    #[arg(long, action = clap::ArgAction::Help)]
    pub help: Option<bool>,
}

/// Validated settings the bot runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub token: String,
    pub guild_id: String,
    pub host_id: Option<String>,
    pub prefix: String,
}

impl TryFrom<Args> for BotConfig {
    type Error = Error;

    fn try_from(args: Args) -> Result<Self, Error> {
        let token = args.token.trim().to_string();
        if token.is_empty() {
            return Err(Error::Config("bot token must not be empty".into()));
        }

        let guild_id = args.guild.trim().to_string();
        match guild_id.parse::<u64>() {
            Ok(id) if id > 0 => {}
            _ => return Err(Error::Config(format!("guild id `{}` is not a valid snowflake", args.guild))),
        }

        let host_id = args
            .host
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());

        if args.prefix.is_empty() || args.prefix.chars().any(char::is_whitespace) {
            return Err(Error::Config(format!("invalid command prefix `{}`", args.prefix)));
        }

        Ok(Self {
            token,
            guild_id,
            host_id,
            prefix: args.prefix,
        })
    }
}
