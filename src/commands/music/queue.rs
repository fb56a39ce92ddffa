use super::*;
use crate::commands::music::utils::preconditions::existing_session;
use crate::commands::music::utils::queue_manager::DEFAULT_PAGE_SIZE;

/// Show the upcoming tracks
#[poise::command(slash_command, guild_only, category = "Music")]
pub async fn queue(
    ctx: Context<'_>,
    #[description = "Page to look at"] page: Option<i64>,
) -> CommandResult {
    let session = match existing_session(ctx) {
        Ok(session) => session,
        Err(MusicError::NotConnected) => {
            ctx.send(embedded_messages::status("Queue is currently empty")).await?;
            return Ok(());
        }
        Err(err) => return send_error(ctx, err).await,
    };

    let requested = usize::try_from(page.unwrap_or(1)).unwrap_or(0);
    let page = match session.page(requested, DEFAULT_PAGE_SIZE).await {
        Ok(page) if page.tracks.is_empty() => {
            ctx.send(embedded_messages::status("Queue is currently empty")).await?;
            return Ok(());
        }
        Ok(page) => page,
        Err(MusicError::OutOfRange { max, .. }) => {
            ctx.send(embedded_messages::error_reply(format!(
                "Page out of bounds, please use a value between 1-{}",
                max
            )))
            .await?;
            return Ok(());
        }
        Err(err) => return send_error(ctx, err).await,
    };

    let embed = {
        let guild = ctx.guild();
        embedded_messages::queue_page(&page, |user_id| {
            guild
                .as_ref()
                .and_then(|guild| guild.members.get(&user_id))
                .map(|member| member.display_name().to_string())
                .unwrap_or_else(|| format!("<@{}>", user_id))
        })
    };
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}
