//! Defines `TrackInfo`, the display metadata the audio node reports for a
//! loadable track, and `QueuedTrack`, a track sitting in a guild's queue.

use serde::{Deserialize, Serialize};
use serenity::model::id::UserId;

/// Metadata for a playable track as returned by a search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackInfo {
    /// The title of the track.
    pub title: String,
    /// The URL the audio node plays the track from.
    pub uri: String,
    /// Track length in milliseconds. Zero for live streams or unknown lengths.
    pub duration_ms: u64,
    /// URL to a thumbnail image for the track, if available.
    pub thumbnail: Option<String>,
}

impl TrackInfo {
    pub fn new(title: impl Into<String>, uri: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
            duration_ms,
            thumbnail: None,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }
}

/// A track owned by a guild's queue, attributed to the user who asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedTrack {
    pub title: String,
    pub uri: String,
    pub duration_ms: u64,
    pub thumbnail: Option<String>,
    /// The user who queued the track.
    pub requester: UserId,
}

impl QueuedTrack {
    pub fn new(info: TrackInfo, requester: UserId) -> Self {
        Self {
            title: info.title,
            uri: info.uri,
            duration_ms: info.duration_ms,
            thumbnail: info.thumbnail,
            requester,
        }
    }
}
