//! Rezz: a Discord music bot built on poise and songbird.
//!
//! The playback core lives under `commands::music::utils` and only talks to
//! the outside world through the `AudioNode` and `VoiceGateway` traits.

pub mod commands;
pub mod config;
pub mod events;

use commands::music::utils::music_manager::SessionRegistry;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// User data, stored and accessible in all command invocations
pub struct Data {
    pub registry: SessionRegistry,
}
