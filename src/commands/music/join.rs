use super::*;
use crate::commands::music::utils::preconditions::{bot_can_connect, in_voice_channel, voice_target};
use crate::commands::music::utils::session::JoinOutcome;
use tracing::info;

/// Join your current voice channel
#[poise::command(slash_command, guild_only, category = "Music", check = "in_voice_channel")]
pub async fn join(ctx: Context<'_>) -> CommandResult {
    let (guild_id, channel_id) = match voice_target(ctx) {
        Ok(ids) => ids,
        Err(err) => return send_error(ctx, err).await,
    };

    let can_connect = bot_can_connect(ctx, channel_id);
    ctx.defer().await?;
    let session = ctx.data().registry.get_or_create(guild_id);

    match session.join(channel_id, can_connect).await {
        Ok(outcome) => {
            info!("Join in guild {}: {:?}", guild_id, outcome);
            let text = match outcome {
                JoinOutcome::AlreadyConnected(id) => format!("Already in <#{}>", id),
                other => format!("Joining <#{}>", other.channel_id()),
            };
            ctx.send(embedded_messages::status(text)).await?;
            Ok(())
        }
        Err(err) => send_error(ctx, err).await,
    }
}
