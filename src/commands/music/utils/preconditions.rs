//! Checks the command layer runs before touching a playback session.

use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;
use tracing::debug;

use super::music_manager::{MusicError, MusicResult};
use super::session::PlaybackSession;
use crate::{Context, Error};

/// The guild the command was invoked in
pub fn guild_id(ctx: Context<'_>) -> MusicResult<GuildId> {
    ctx.guild_id().ok_or(MusicError::NotInGuild)
}

/// The voice channel the invoking user currently sits in
pub fn author_voice_channel(ctx: Context<'_>) -> MusicResult<ChannelId> {
    let guild_id = guild_id(ctx)?;
    let guild = ctx
        .serenity_context()
        .cache
        .guild(guild_id)
        .ok_or(MusicError::NotInGuild)?;

    guild
        .voice_states
        .get(&ctx.author().id)
        .and_then(|state| state.channel_id)
        .ok_or(MusicError::UserNotInVoiceChannel)
}

/// Guild and voice channel for commands that bring the bot into voice
pub fn voice_target(ctx: Context<'_>) -> MusicResult<(GuildId, ChannelId)> {
    Ok((guild_id(ctx)?, author_voice_channel(ctx)?))
}

/// Whether the bot may connect to `channel_id`.
///
/// Falls back to `true` when the cache cannot answer; the gateway will reject
/// the join in that case.
pub fn bot_can_connect(ctx: Context<'_>, channel_id: ChannelId) -> bool {
    let Some(guild_id) = ctx.guild_id() else {
        return false;
    };
    let cache = &ctx.serenity_context().cache;
    let bot_id = cache.current_user().id;
    let Some(guild) = cache.guild(guild_id) else {
        return true;
    };

    match (guild.channels.get(&channel_id), guild.members.get(&bot_id)) {
        (Some(channel), Some(member)) => guild.user_permissions_in(channel, member).connect(),
        _ => {
            debug!("Permissions for channel {} not cached, assuming connect", channel_id);
            true
        }
    }
}

/// Poise check: the invoking user must be in a voice channel
pub async fn in_voice_channel(ctx: Context<'_>) -> Result<bool, Error> {
    Ok(author_voice_channel(ctx).is_ok())
}

/// The guild's existing session, if the bot has one
pub fn existing_session(ctx: Context<'_>) -> MusicResult<Arc<PlaybackSession>> {
    let guild_id = guild_id(ctx)?;
    ctx.data()
        .registry
        .get(guild_id)
        .ok_or(MusicError::NotConnected)
}
