use super::*;
use crate::commands::music::utils::preconditions::existing_session;

/// Skip the current track, or several at once
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn skip(
    ctx: Context<'_>,
    #[description = "Number of tracks to skip"] amount: Option<i64>,
) -> CommandResult {
    let session = match existing_session(ctx) {
        Ok(session) => session,
        Err(err) => return send_error(ctx, err).await,
    };

    match session.skip(amount.unwrap_or(1)).await {
        Ok(Some(track)) => {
            ctx.send(embedded_messages::status(format!(
                "⏭️ Skipped, now playing **{}**",
                track.title
            )))
            .await?;
        }
        Ok(None) => {
            ctx.send(embedded_messages::status("⏭️ Skipped, nothing left to play"))
                .await?;
        }
        Err(MusicError::EmptyQueue) => {
            ctx.send(embedded_messages::status(
                "Unable to skip track, queue is currently empty",
            ))
            .await?;
        }
        Err(err) => return send_error(ctx, err).await,
    }
    Ok(())
}
