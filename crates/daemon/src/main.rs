#![forbid(unsafe_code)]

//! Stock watcher daemon entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use stockwatch_daemon::{
    config::DaemonConfig,
    discord::{stock_command, DiscordClient, DiscordConfig},
    feed::{FeedClient, FeedSource},
    http::{self, AppState},
    notifier::Notifier,
    query::QueryResponder,
    scheduler,
};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stockwatch-daemon", version, about = "Grow a Garden stock and weather notifier")]
struct Cli {
    /// Bot token.
    #[arg(long, env = "TOKEN", hide_env_values = true)]
    token: String,

    /// Application (client) id.
    #[arg(long, env = "CLIENT_ID")]
    client_id: String,

    /// Guild the slash command is registered in.
    #[arg(long, env = "GUILD_ID")]
    guild_id: String,

    /// Channel that receives change announcements.
    #[arg(long, env = "CHANNEL_ID")]
    channel_id: String,

    /// Application public key (hex). Enables POST /interactions.
    #[arg(long, env = "PUBLIC_KEY")]
    public_key: Option<String>,

    /// HTTP port for liveness and interactions.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Game-status API base URL.
    #[arg(long, env = "FEED_BASE_URL", default_value = "https://growagarden.gg/api")]
    feed_base_url: String,

    /// Discord REST base URL.
    #[arg(long, env = "DISCORD_API_BASE", default_value = "https://discord.com/api/v10")]
    discord_api_base: String,

    /// Stock check period in seconds (wall-clock aligned).
    #[arg(long, default_value_t = 300)]
    stock_period_seconds: u64,

    /// Seconds past each stock boundary to fetch at.
    #[arg(long, default_value_t = 30)]
    stock_offset_seconds: u64,

    /// Weather check interval in seconds.
    #[arg(long, default_value_t = 30)]
    weather_period_seconds: u64,

    /// Announce the current state on the first cycle instead of recording it
    /// silently at startup.
    #[arg(long, default_value_t = false)]
    announce_on_start: bool,

    /// Log level (env-filter syntax).
    #[arg(long, default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::new(&cli.log))
        .init();

    let config = DaemonConfig {
        port: cli.port,
        feed_base_url: cli.feed_base_url,
        discord: DiscordConfig {
            api_base: cli.discord_api_base,
            token: cli.token,
            application_id: cli.client_id,
            guild_id: cli.guild_id,
            channel_id: cli.channel_id,
        },
        public_key: cli.public_key,
        stock_period_seconds: cli.stock_period_seconds,
        stock_offset_seconds: cli.stock_offset_seconds,
        weather_period_seconds: cli.weather_period_seconds,
        announce_on_start: cli.announce_on_start,
    };
    config.validate()?;
    let verifier = config.verifier()?;
    if verifier.is_none() {
        warn!("no public key configured; /interactions disabled");
    }

    let http_client = reqwest::Client::new();
    let feed: Arc<dyn FeedSource> =
        Arc::new(FeedClient::new(http_client.clone(), config.feed_base_url.clone()));
    let discord = Arc::new(DiscordClient::new(http_client, config.discord.clone()));

    // Registration is one-shot and must not hold up scheduling.
    {
        let discord = Arc::clone(&discord);
        tokio::spawn(async move {
            info!("registering slash commands");
            match discord.register_commands(&[stock_command()]).await {
                Ok(()) => info!("slash commands registered"),
                Err(e) => warn!(error = %e, "slash command registration failed"),
            }
        });
    }

    let notifier = Notifier::new(discord.clone());
    let _loops = scheduler::spawn_scheduler(&config, Arc::clone(&feed), notifier)?;

    let state = AppState::new(verifier, QueryResponder::new(feed), discord);
    let app = http::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown requested");
}
