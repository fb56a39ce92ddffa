use super::*;
use crate::commands::music::utils::preconditions::existing_session;

/// Shuffle the upcoming tracks
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn shuffle(ctx: Context<'_>) -> CommandResult {
    let session = match existing_session(ctx) {
        Ok(session) => session,
        Err(err) => return send_error(ctx, err).await,
    };

    match session.shuffle().await {
        Ok(_) => {
            ctx.send(embedded_messages::status("🔀 Shuffled queue")).await?;
            Ok(())
        }
        Err(err) => send_error(ctx, err).await,
    }
}
