use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rezz::commands::music::{
    self,
    audio_sources::youtube::YoutubeLoader,
    utils::{
        embedded_messages,
        event_handlers::run_node_events,
        music_manager::{MusicError, SessionRegistry},
        songbird_node::{SongbirdGateway, SongbirdNode},
    },
};
use rezz::{CommandResult, Context, Data, Error, config::BotConfig, events::Handler};

#[poise::command(slash_command, category = "General")]
async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, hide_in_help)]
async fn register(ctx: Context<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        // the only check we install is the voice channel one
        poise::FrameworkError::CommandCheckFailed { ctx, error: None, .. } => {
            let reply = embedded_messages::music_error(&MusicError::UserNotInVoiceChannel);
            if let Err(e) = ctx.send(reply).await {
                warn!("Failed to report check failure: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rezz=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    let config = BotConfig::from_env()?;
    info!("Starting with {:?}", config);

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let songbird = Songbird::serenity();
    let (node_events, node_events_rx) = mpsc::unbounded_channel();
    let node = SongbirdNode::new(
        Arc::clone(&songbird),
        reqwest::Client::new(),
        YoutubeLoader::default(),
        node_events,
    );
    let gateway = SongbirdGateway::new(Arc::clone(&songbird));
    let registry = SessionRegistry::new(Arc::new(node), Arc::new(gateway), config.session.clone());

    tokio::spawn(run_node_events(registry.clone(), node_events_rx));

    let mut commands = vec![register(), help()];
    commands.extend(music::commands());

    let guild_id = config.guild_id;
    let data_registry = registry.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            on_error: |error| Box::pin(on_error(error)),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("!".into()),
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                let commands = &framework.options().commands;
                match guild_id {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(ctx, commands, guild_id).await?
                    }
                    None => poise::builtins::register_globally(ctx, commands).await?,
                }
                info!("Registered {} commands as {}", commands.len(), ready.user.name);
                Ok(Data {
                    registry: data_registry,
                })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .event_handler(Handler::new(registry))
        .register_songbird_with(songbird)
        .await?;

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Could not listen for ctrl-c: {}", e);
            return;
        }
        info!("Shutting down");
        shard_manager.shutdown_all().await;
    });

    client.start().await.map_err(Into::into)
}
