//! Sample ids and tracks used across the integration tests

use rezz::commands::music::audio_sources::track_metadata::TrackInfo;
use serenity::model::id::{ChannelId, GuildId, UserId};

pub const SAMPLE_GUILD_ID: u64 = 123456789;
pub const SAMPLE_CHANNEL_ID: u64 = 987654321;
pub const OTHER_CHANNEL_ID: u64 = 987654322;
pub const SAMPLE_USER_ID: u64 = 555;

pub fn guild() -> GuildId {
    GuildId::new(SAMPLE_GUILD_ID)
}

pub fn channel() -> ChannelId {
    ChannelId::new(SAMPLE_CHANNEL_ID)
}

pub fn other_channel() -> ChannelId {
    ChannelId::new(OTHER_CHANNEL_ID)
}

pub fn user() -> UserId {
    UserId::new(SAMPLE_USER_ID)
}

pub fn uri(name: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", name)
}

/// A three minute track called `name`
pub fn track(name: &str) -> TrackInfo {
    TrackInfo::new(name, uri(name), 180_000)
}
