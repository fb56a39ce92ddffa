use super::*;
use crate::commands::music::utils::preconditions::existing_session;

/// Show the track that is currently playing
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn nowplaying(ctx: Context<'_>) -> CommandResult {
    let now = match existing_session(ctx) {
        Ok(session) => session.now_playing().await,
        Err(MusicError::NotConnected) => Ok(None),
        Err(err) => Err(err),
    };

    match now {
        Ok(Some(now)) => {
            ctx.send(CreateReply::default().embed(embedded_messages::now_playing(&now)))
                .await?;
            Ok(())
        }
        Ok(None) => {
            ctx.send(embedded_messages::status("Not currently playing anything"))
                .await?;
            Ok(())
        }
        Err(err) => send_error(ctx, err).await,
    }
}
