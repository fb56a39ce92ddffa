use super::*;
use crate::commands::music::utils::preconditions::{
    author_voice_channel, existing_session, in_voice_channel,
};

/// Leave the voice channel and stop the player
#[poise::command(slash_command, guild_only, category = "Music", check = "in_voice_channel")]
pub async fn leave(ctx: Context<'_>) -> CommandResult {
    let session = match existing_session(ctx) {
        Ok(session) => session,
        Err(err) => return send_error(ctx, err).await,
    };

    let requester_channel = author_voice_channel(ctx).ok();
    match session.leave(requester_channel).await {
        Ok(()) => {
            ctx.send(embedded_messages::status("Disconnected")).await?;
            Ok(())
        }
        Err(err) => send_error(ctx, err).await,
    }
}
