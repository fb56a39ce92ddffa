pub mod join;
pub mod leave;
pub mod looping;
pub mod lowpass;
pub mod now_playing;
pub mod pause;
pub mod play;
pub mod queue;
pub mod remove;
pub mod resume;
pub mod shuffle;
pub mod skip;
pub mod stop;

pub mod audio_sources;
pub mod utils;

use crate::{CommandResult, Context, Data, Error};
use poise::CreateReply;
use utils::embedded_messages;
use utils::music_manager::MusicError;

/// Every music command, in the order they show up in help
pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        join::join(),
        leave::leave(),
        play::play(),
        stop::stop(),
        pause::pause(),
        resume::resume(),
        skip::skip(),
        now_playing::nowplaying(),
        looping::loop_status(),
        looping::loopoff(),
        looping::looptrack(),
        looping::loopqueue(),
        lowpass::lowpass(),
        queue::queue(),
        shuffle::shuffle(),
        remove::remove(),
    ]
}

/// Reply with a rendered music error. The command itself still succeeds.
async fn send_error(ctx: Context<'_>, err: MusicError) -> CommandResult {
    ctx.send(embedded_messages::music_error(&err)).await?;
    Ok(())
}
