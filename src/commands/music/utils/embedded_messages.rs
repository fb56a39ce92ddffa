use poise::CreateReply;
use poise::serenity_prelude::{CreateEmbed, CreateEmbedFooter, UserId};
use tracing::error;

use super::format_duration;
use super::music_manager::MusicError;
use super::queue_manager::QueuePage;
use super::session::NowPlaying;
use crate::commands::music::audio_sources::track_metadata::TrackInfo;

/// Accent color for every music embed
pub const EMBED_COLOR: u32 = 0xEB4E2F;
const ERROR_COLOR: u32 = 0xff0000;

/// Zero-width space, for fields that only need a value
const BLANK: &str = "\u{200b}";

/// A short status line, e.g. "Paused"
pub fn status(text: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(CreateEmbed::new().description(text).color(EMBED_COLOR))
}

pub fn error_embed(text: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .title("❌ Error")
        .description(text)
        .color(ERROR_COLOR)
}

/// An ephemeral error embed
pub fn error_reply(text: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(error_embed(text)).ephemeral(true)
}

/// User-facing text for a music error
pub fn describe_error(err: &MusicError) -> String {
    match err {
        MusicError::NotInGuild => "This command can only be used in a server".to_string(),
        MusicError::PermissionDenied => {
            "I need the following permissions to run this command: Connect".to_string()
        }
        MusicError::EmptyQueue => "Queue is currently empty".to_string(),
        MusicError::UserNotInVoiceChannel => {
            "You need to be connected to a voice channel to run this command".to_string()
        }
        MusicError::NotConnected => "I'm not connected to a voice channel".to_string(),
        other => other.to_string(),
    }
}

/// Render a music error, logging the ones that point at a broken node or gateway
pub fn music_error_embed(err: &MusicError) -> CreateEmbed {
    if err.is_unexpected() {
        error!("Music command failed: {}", err);
    }
    error_embed(describe_error(err))
}

pub fn music_error(err: &MusicError) -> CreateReply {
    CreateReply::default()
        .embed(music_error_embed(err))
        .ephemeral(true)
}

fn track_link(title: &str, uri: &str) -> String {
    format!("[{}]({})", title, uri)
}

/// Embed for a track that was added to the queue
pub fn track_enqueued(track: &TrackInfo, position: Option<usize>) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("Track enqueued")
        .description(track_link(&track.title, &track.uri))
        .color(EMBED_COLOR);

    if track.duration_ms > 0 {
        embed = embed.field("Duration", format!("`{}`", format_duration(track.duration_ms)), true);
    }
    if let Some(position) = position {
        embed = embed.field("Position", format!("`#{}`", position), true);
    }
    if let Some(thumbnail) = &track.thumbnail {
        embed = embed.image(thumbnail);
    }
    embed
}

pub fn playlist_enqueued(count: usize, name: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("Playlist enqueued")
        .description(format!("{} tracks from {}", count, name))
        .color(EMBED_COLOR)
}

/// Numbered list of search results, matched by the pick buttons
pub fn candidate_list(tracks: &[TrackInfo]) -> CreateEmbed {
    tracks.iter().enumerate().fold(
        CreateEmbed::new()
            .title("Choose a track from the buttons below")
            .color(EMBED_COLOR),
        |embed, (index, track)| {
            embed.field(
                BLANK,
                format!("**{}:** {}", index + 1, track_link(&track.title, &track.uri)),
                false,
            )
        },
    )
}

pub fn now_playing(now: &NowPlaying) -> CreateEmbed {
    let track = &now.track;
    let mut description = format!(
        "{} Remaining: {}",
        track_link(&track.title, &track.uri),
        format_duration(now.remaining_ms)
    );
    if now.paused {
        description.push_str(" (paused)");
    }

    let mut embed = CreateEmbed::new()
        .title("Now playing")
        .description(description)
        .field("Requested by", format!("<@{}>", track.requester), true)
        .color(EMBED_COLOR);
    if let Some(thumbnail) = &track.thumbnail {
        embed = embed.image(thumbnail);
    }
    embed
}

/// One page of upcoming tracks. `requester_name` resolves display names.
pub fn queue_page(page: &QueuePage, requester_name: impl Fn(UserId) -> String) -> CreateEmbed {
    page.tracks
        .iter()
        .enumerate()
        .fold(
            CreateEmbed::new().title("Upcoming tracks").color(EMBED_COLOR),
            |embed, (index, track)| {
                embed.field(
                    BLANK,
                    format!(
                        "**{}: {}** ({}) Requested by: {}",
                        page.offset + index + 1,
                        track.title,
                        format_duration(track.duration_ms),
                        requester_name(track.requester)
                    ),
                    false,
                )
            },
        )
        .footer(CreateEmbedFooter::new(format!(
            "Page {} out of {}",
            page.page, page.total_pages
        )))
}
