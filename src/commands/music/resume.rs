use super::*;
use crate::commands::music::utils::preconditions::existing_session;
use crate::commands::music::utils::session::ResumeStatus;

/// Resume the player
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn resume(ctx: Context<'_>) -> CommandResult {
    let session = match existing_session(ctx) {
        Ok(session) => session,
        Err(MusicError::NotConnected) => {
            ctx.send(embedded_messages::status("Not currently paused")).await?;
            return Ok(());
        }
        Err(err) => return send_error(ctx, err).await,
    };

    let text = match session.resume().await {
        Ok(ResumeStatus::Resumed) => "▶️ Resumed",
        Ok(ResumeStatus::NotPaused) => "Not currently paused",
        Err(err) => return send_error(ctx, err).await,
    };
    ctx.send(embedded_messages::status(text)).await?;
    Ok(())
}
