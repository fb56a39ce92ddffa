//! The two capabilities the playback core drives: the audio node that plays
//! tracks and the chat gateway that owns voice state. Both are traits so the
//! core can run against songbird in production and mocks in tests.

use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};

use super::music_manager::MusicResult;
use super::search::RawLoadResult;
use crate::commands::music::audio_sources::track_metadata::QueuedTrack;

/// Audio filters the node may apply to the playing track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    /// Smooths out high frequencies. `smoothing` is in the range 0..=100.
    LowPass { smoothing: f64 },
}

/// Which gateway dispatch a voice update came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceUpdateKind {
    ServerUpdate,
    StateUpdate,
}

/// A voice update as received from the gateway, payload untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceUpdate {
    pub kind: VoiceUpdateKind,
    pub payload: serde_json::Value,
}

/// Why the node stopped playing a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The track played to the end.
    Finished,
    /// The track could not be loaded or broke during playback.
    LoadFailed,
    /// Playback was stopped on request.
    Stopped,
    /// Another track took its place.
    Replaced,
}

impl EndReason {
    /// Whether the end of a track should move the queue forward.
    pub fn advances_queue(self) -> bool {
        matches!(self, EndReason::Finished | EndReason::LoadFailed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEventKind {
    TrackStarted { uri: String },
    TrackEnded { uri: String, reason: EndReason },
    QueueEnded,
}

/// A track lifecycle event emitted by the audio node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEvent {
    pub guild_id: GuildId,
    pub kind: NodeEventKind,
}

impl NodeEvent {
    pub fn track_started(guild_id: GuildId, uri: impl Into<String>) -> Self {
        Self {
            guild_id,
            kind: NodeEventKind::TrackStarted { uri: uri.into() },
        }
    }

    pub fn track_ended(guild_id: GuildId, uri: impl Into<String>, reason: EndReason) -> Self {
        Self {
            guild_id,
            kind: NodeEventKind::TrackEnded {
                uri: uri.into(),
                reason,
            },
        }
    }

    pub fn queue_ended(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            kind: NodeEventKind::QueueEnded,
        }
    }
}

/// The remote (or embedded) player that actually streams audio.
///
/// Any transport failure is reported as `MusicError::NodeUnavailable`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioNode: Send + Sync {
    /// Resolve a URL or search query into a raw load result.
    async fn search(&self, query: &str) -> MusicResult<RawLoadResult>;

    /// Start playing `track`, replacing whatever the guild was playing.
    async fn play(&self, guild_id: GuildId, track: &QueuedTrack) -> MusicResult<()>;

    async fn stop(&self, guild_id: GuildId) -> MusicResult<()>;

    async fn set_pause(&self, guild_id: GuildId, pause: bool) -> MusicResult<()>;

    /// Apply a filter, or clear filters with `None`.
    async fn set_filter(&self, guild_id: GuildId, filter: Option<Filter>) -> MusicResult<()>;

    /// Playback position of the current track in milliseconds.
    async fn position(&self, guild_id: GuildId) -> MusicResult<Option<u64>>;

    /// Whether the node is actively outputting audio for the guild.
    async fn is_active(&self, guild_id: GuildId) -> MusicResult<bool>;

    /// Forward a gateway voice update to the node.
    async fn voice_update(&self, guild_id: GuildId, update: VoiceUpdate) -> MusicResult<()>;
}

/// Voice state operations on the chat gateway.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    async fn connect_voice(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        self_mute: bool,
        self_deaf: bool,
    ) -> MusicResult<()>;

    /// Move to `channel_id`, or leave voice entirely with `None`.
    async fn change_voice_state(
        &self,
        guild_id: GuildId,
        channel_id: Option<ChannelId>,
    ) -> MusicResult<()>;
}
