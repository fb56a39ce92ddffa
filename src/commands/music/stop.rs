use super::*;
use crate::commands::music::utils::preconditions::existing_session;

/// Stop the player and clear the queue
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let session = match existing_session(ctx) {
        Ok(session) => session,
        Err(err) => return send_error(ctx, err).await,
    };

    match session.stop().await {
        Ok(()) => {
            ctx.send(embedded_messages::status("Stopped")).await?;
            Ok(())
        }
        Err(err) => send_error(ctx, err).await,
    }
}
