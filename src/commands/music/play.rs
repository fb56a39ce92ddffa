use super::*;
use crate::commands::music::audio_sources::track_metadata::TrackInfo;
use crate::commands::music::utils::{
    button_controls::{create_pick_buttons, parse_pick_button_id},
    preconditions::{bot_can_connect, in_voice_channel, voice_target},
    search::{SearchOutcome, classify},
    session::{EnqueueOutcome, PlaybackSession},
};
use poise::serenity_prelude::{
    ComponentInteractionCollector, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseMessage, UserId,
};
use std::time::Duration;
use tracing::{debug, info};

/// How long search candidates stay clickable
const PICK_TIMEOUT: Duration = Duration::from_secs(60);

/// Play a song from a link or a search query
#[poise::command(slash_command, guild_only, category = "Music", check = "in_voice_channel")]
pub async fn play(
    ctx: Context<'_>,
    #[rename = "link-or-query"]
    #[description = "Link or query to search for"]
    query: String,
) -> CommandResult {
    info!("Received play command with query: {}", query);
    let (guild_id, channel_id) = match voice_target(ctx) {
        Ok(ids) => ids,
        Err(err) => return send_error(ctx, err).await,
    };

    // Joining and resolving can both outlast the interaction deadline
    ctx.defer().await?;

    let session = ctx.data().registry.get_or_create(guild_id);
    if let Err(err) = session.join(channel_id, bot_can_connect(ctx, channel_id)).await {
        return send_error(ctx, err).await;
    }

    let raw = match ctx.data().registry.node().search(&query).await {
        Ok(raw) => raw,
        Err(err) => return send_error(ctx, err).await,
    };
    debug!("Load result for '{}': {} ({} tracks)", query, raw.load_type, raw.tracks.len());

    match classify(raw) {
        SearchOutcome::SingleTrack(track) => {
            let embed = enqueue_embed(&session, track, ctx.author().id).await;
            ctx.send(CreateReply::default().embed(embed)).await?;
        }
        SearchOutcome::Playlist { tracks, name } => {
            match session.enqueue_playlist(tracks, ctx.author().id).await {
                Ok(outcome) => {
                    let embed = embedded_messages::playlist_enqueued(outcome.count, &name);
                    ctx.send(CreateReply::default().embed(embed)).await?;
                }
                Err(err) => return send_error(ctx, err).await,
            }
        }
        SearchOutcome::Candidates(tracks) => pick_candidate(ctx, &session, tracks).await?,
        SearchOutcome::Empty => {
            ctx.send(embedded_messages::status("No tracks were found")).await?;
        }
        SearchOutcome::Failed => {
            ctx.send(embedded_messages::error_reply("Failed to load video")).await?;
        }
        SearchOutcome::Unknown => {
            ctx.send(embedded_messages::error_reply(
                "An unknown error occurred while loading the video",
            ))
            .await?;
        }
    }

    Ok(())
}

async fn enqueue_embed(session: &PlaybackSession, track: TrackInfo, requester: UserId) -> CreateEmbed {
    match session.enqueue(track.clone(), requester).await {
        Ok(EnqueueOutcome::Started(_)) => embedded_messages::track_enqueued(&track, None),
        Ok(EnqueueOutcome::Queued { position, .. }) => {
            embedded_messages::track_enqueued(&track, Some(position))
        }
        Err(err) => embedded_messages::music_error_embed(&err),
    }
}

/// Offer the candidates as buttons and queue whichever one gets clicked first
async fn pick_candidate(
    ctx: Context<'_>,
    session: &PlaybackSession,
    tracks: Vec<TrackInfo>,
) -> CommandResult {
    let prompt_id = ctx.id();
    let reply = ctx
        .send(
            CreateReply::default()
                .embed(embedded_messages::candidate_list(&tracks))
                .components(create_pick_buttons(prompt_id, tracks.len())),
        )
        .await?;

    let prefix = format!("{}_pick_", prompt_id);
    let Some(interaction) = ComponentInteractionCollector::new(ctx.serenity_context())
        .filter(move |interaction| interaction.data.custom_id.starts_with(&prefix))
        .timeout(PICK_TIMEOUT)
        .await
    else {
        debug!("Track selection {} expired", prompt_id);
        reply
            .edit(
                ctx,
                embedded_messages::status("Selection expired").components(Vec::new()),
            )
            .await?;
        return Ok(());
    };

    let picked = parse_pick_button_id(prompt_id, &interaction.data.custom_id)
        .and_then(|index| tracks.get(index).cloned());
    let embed = match picked {
        Some(track) => {
            info!("{} picked '{}'", interaction.user.name, track.title);
            enqueue_embed(session, track, interaction.user.id).await
        }
        None => embedded_messages::error_embed("That track is no longer available"),
    };

    interaction
        .create_response(
            ctx.serenity_context(),
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(Vec::new()),
            ),
        )
        .await?;
    Ok(())
}
