use super::*;
use crate::commands::music::utils::preconditions::existing_session;
use crate::commands::music::utils::session::PauseStatus;

/// Pause the player
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    let session = match existing_session(ctx) {
        Ok(session) => session,
        Err(MusicError::NotConnected) => {
            ctx.send(embedded_messages::status("Not currently playing anything")).await?;
            return Ok(());
        }
        Err(err) => return send_error(ctx, err).await,
    };

    let text = match session.pause().await {
        Ok(PauseStatus::Paused) => "⏸️ Paused",
        Ok(PauseStatus::NotPlaying) => "Not currently playing anything",
        Err(err) => return send_error(ctx, err).await,
    };
    ctx.send(embedded_messages::status(text)).await?;
    Ok(())
}
