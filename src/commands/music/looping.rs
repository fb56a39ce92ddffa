use super::*;
use crate::commands::music::utils::preconditions::existing_session;
use crate::commands::music::utils::queue_manager::LoopMode;

async fn set_loop(ctx: Context<'_>, mode: LoopMode, confirmation: &str) -> CommandResult {
    let session = match existing_session(ctx) {
        Ok(session) => session,
        Err(err) => return send_error(ctx, err).await,
    };

    match session.set_loop(mode).await {
        Ok(()) => {
            ctx.send(embedded_messages::status(confirmation)).await?;
            Ok(())
        }
        Err(err) => send_error(ctx, err).await,
    }
}

/// Show whether the player is looping
#[poise::command(slash_command, guild_only, rename = "loop", category = "Music")]
pub async fn loop_status(ctx: Context<'_>) -> CommandResult {
    let mode = match existing_session(ctx) {
        Ok(session) => session.loop_mode().await,
        Err(MusicError::NotConnected) => Ok(LoopMode::Off),
        Err(err) => Err(err),
    };

    match mode {
        Ok(mode) => {
            ctx.send(embedded_messages::status(format!(
                "Currently looping is set to {}",
                mode
            )))
            .await?;
            Ok(())
        }
        Err(err) => send_error(ctx, err).await,
    }
}

/// Turn looping off
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn loopoff(ctx: Context<'_>) -> CommandResult {
    set_loop(ctx, LoopMode::Off, "Turned off looping").await
}

/// Loop the current track
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn looptrack(ctx: Context<'_>) -> CommandResult {
    set_loop(ctx, LoopMode::Track, "🔂 Now looping the current track").await
}

/// Loop the queue, starting from the current track
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn loopqueue(ctx: Context<'_>) -> CommandResult {
    set_loop(ctx, LoopMode::Queue, "🔁 Now looping the queue").await
}
