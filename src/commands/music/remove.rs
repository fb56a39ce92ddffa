use super::*;
use crate::commands::music::utils::preconditions::existing_session;

/// Remove a track from the queue
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Position of the track in the queue"]
    #[min = 1]
    position: u32,
) -> CommandResult {
    let session = match existing_session(ctx) {
        Ok(session) => session,
        Err(err) => return send_error(ctx, err).await,
    };

    match session.remove(position as usize).await {
        Ok(track) => {
            ctx.send(embedded_messages::status(format!(
                "Removed **{}** from the queue",
                track.title
            )))
            .await?;
            Ok(())
        }
        Err(err) => send_error(ctx, err).await,
    }
}
