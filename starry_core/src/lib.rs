mod handlers;

use crate::handlers::bot::Handler;
use crate::handlers::raw::RawHandler;
use starry_board::{Starboard, StarboardKey};
use starry_commands::groups::*;
use starry_commands::{cmd_error, CMD_HELP};
use starry_config::{BotConfig, ConfigError};
use starry_db::{set_db, PgPoolKey};
use starry_metrics::{before_hook, Metrics, METRICS, METRICS_FILE};
use starry_utils::{set_dir, BotInfo, ShardManagerWrapper};
use serenity::{
    framework::standard::{buckets::LimitedFor, BucketBuilder, Configuration},
    framework::StandardFramework,
    http::Http,
    prelude::GatewayIntents,
    Client,
};
use std::{
    sync::{atomic::AtomicBool, Arc},
    time::Instant,
};
use tracing::{error, info, subscriber::set_global_default, warn};
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` isn't set.
const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn";

fn init_logging() {
    if let Err(e) = LogTracer::init() {
        eprintln!("failed to hook into `log` crate: {}", e);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let sub = tracing_subscriber::fmt()
        .with_level(true)
        .with_env_filter(filter)
        .finish();
    if let Err(e) = set_global_default(sub) {
        eprintln!("failed to set global default logger: {}", e);
    }
}

fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT
}

/// Runs the bot until every shard has stopped. Returns `false` if it couldn't start.
pub async fn entrypoint() -> bool {
    init_logging();

    set_dir();

    info!("Loading config...");
    let config = match BotConfig::set("config.toml") {
        Ok(c) => c,
        Err(e @ ConfigError::DefaultWritten(_)) => {
            warn!("{}", e);
            return false;
        }
        Err(e) => {
            error!("{}", e);
            return false;
        }
    };
    info!("Loaded config!");

    let http = Http::new(config.token());
    let bot_info = match BotInfo::set(&http).await {
        Ok(i) => i,
        Err(e) => {
            error!("Couldn't fetch the bot's application info: {}", e);
            return false;
        }
    };
    info!("Logging in as {}", bot_info.name());

    let db = {
        info!("Loading DB...");
        let st = Instant::now();
        let db = match set_db(config).await {
            Ok(db) => db,
            Err(e) => {
                error!("Couldn't connect to the database: {}", e);
                return false;
            }
        };
        info!("Loaded DB in {}ms!", st.elapsed().as_millis());
        db
    };

    let metrics = {
        info!("Initializing metrics client...");
        let st = Instant::now();
        let metrics = match Metrics::new() {
            Ok(m) => m,
            Err(e) => {
                error!("Couldn't create the metrics registry: {}", e);
                return false;
            }
        };
        if let Err(e) = metrics.load_metrics(METRICS_FILE).await {
            warn!("Couldn't load saved metrics, starting from zero: {}", e);
        }
        let metrics = Arc::new(metrics);
        if METRICS.set(Arc::clone(&metrics)).is_err() {
            warn!("metrics were already set");
        }
        info!(
            "Initialized metrics client in {}ms!",
            st.elapsed().as_millis()
        );
        metrics
    };

    let starboard = Arc::new(Starboard::new(
        db.clone(),
        config,
        Some(Arc::clone(&metrics)),
    ));

    let client_init_start = Instant::now();
    info!("Initializing client...");

    let framework = StandardFramework::new()
        .before(before_hook)
        .on_dispatch_error(cmd_error::handle)
        .bucket(
            "general",
            BucketBuilder::default()
                .limit_for(LimitedFor::Channel)
                .await_ratelimits(1)
                .delay_action(cmd_error::delay_action)
                .time_span(600)
                .limit(10),
        )
        .await
        .bucket(
            "expensive",
            BucketBuilder::default()
                .limit_for(LimitedFor::Guild)
                .await_ratelimits(1)
                .delay_action(cmd_error::delay_action)
                .time_span(3600)
                .limit(2),
        )
        .await
        .help(&CMD_HELP)
        .group(&BOARD_GROUP)
        .group(&UTILS_GROUP)
        .group(&BOTOWNER_GROUP);
    framework.configure(
        Configuration::new()
            .prefix(config.prefix())
            .case_insensitivity(true)
            .on_mention(Some(bot_info.user()))
            .owners(bot_info.owners().clone()),
    );

    let mut client = match Client::builder(config.token(), intents())
        .event_handler(Handler {
            starboard: Arc::clone(&starboard),
            db: db.clone(),
            recalculate_on_startup: config.recalculate_on_startup(),
            is_loop_running: AtomicBool::new(false),
            start_time: client_init_start,
        })
        .raw_event_handler(RawHandler)
        .type_map_insert::<PgPoolKey>(db.clone())
        .type_map_insert::<Metrics>(Arc::clone(&metrics))
        .type_map_insert::<StarboardKey>(starboard)
        .framework(framework)
        .await
    {
        Ok(c) => c,
        Err(e) => {
            error!("Couldn't create the client: {}", e);
            return false;
        }
    };
    client
        .data
        .write()
        .await
        .insert::<ShardManagerWrapper>(Arc::clone(&client.shard_manager));
    info!(
        "Initialized client in {}ms!",
        client_init_start.elapsed().as_millis()
    );

    let server_shutdown = config.metrics_port().map(|port| {
        info!("Starting metrics server on port {}...", port);
        starry_webserver::start(port)
    });

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Couldn't listen for ctrl-c: {}", e);
            return;
        }
        info!("Got ctrl-c, shutting down...");
        shard_manager.shutdown_all().await;
    });

    info!("Starting client...");
    let started = match client.start_autosharded().await {
        Ok(()) => true,
        Err(e) => {
            error!("Couldn't start the client: {}", e);
            false
        }
    };

    if let Some(rx) = server_shutdown {
        if let Ok(shutdown) = rx.await {
            shutdown.notify();
        }
    }
    if let Err(e) = metrics.save_metrics(METRICS_FILE).await {
        warn!("Couldn't save metrics: {}", e);
    }
    db.close().await;
    info!("Bye!");

    started
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_cover_reactions_and_content() {
        let i = intents();
        assert!(i.contains(GatewayIntents::GUILD_MESSAGE_REACTIONS));
        assert!(i.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(!i.contains(GatewayIntents::GUILD_MEMBERS));
    }

    #[test]
    fn default_filter_parses() {
        assert!(DEFAULT_LOG_FILTER.parse::<EnvFilter>().is_ok());
    }
}
