use super::*;
use crate::commands::music::utils::preconditions::existing_session;
use crate::commands::music::utils::session::FilterChange;

/// Apply a low-pass filter to the player
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn lowpass(
    ctx: Context<'_>,
    #[description = "Strength of the filter. From 0 (off) to 100"] strength: f64,
) -> CommandResult {
    let session = match existing_session(ctx) {
        Ok(session) => session,
        Err(err) => return send_error(ctx, err).await,
    };

    let text = match session.set_low_pass(strength).await {
        Ok(FilterChange::Applied(_)) => "Applied **LowPass filter**",
        Ok(FilterChange::Removed) => "Removed **LowPass filter**",
        Err(err) => return send_error(ctx, err).await,
    };
    ctx.send(embedded_messages::status(text)).await?;
    Ok(())
}
