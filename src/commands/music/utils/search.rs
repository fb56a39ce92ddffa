//! Classification of raw load results into the handful of outcomes the `play`
//! command knows how to present.

use serde::{Deserialize, Serialize};

use crate::commands::music::audio_sources::track_metadata::TrackInfo;

/// The most candidates a search may offer the user.
pub const MAX_CANDIDATES: usize = 5;

/// Load-type tags understood by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadType {
    /// A single video or direct URL.
    TrackLoaded,
    /// A direct URL to a playlist.
    PlaylistLoaded,
    /// A search query that produced several candidates.
    SearchResult,
    NoMatches,
    /// Most likely the source raised an error while loading.
    LoadFailed,
    #[serde(other)]
    Unknown,
}

impl LoadType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "TRACK_LOADED" => LoadType::TrackLoaded,
            "PLAYLIST_LOADED" => LoadType::PlaylistLoaded,
            "SEARCH_RESULT" => LoadType::SearchResult,
            "NO_MATCHES" => LoadType::NoMatches,
            "LOAD_FAILED" => LoadType::LoadFailed,
            _ => LoadType::Unknown,
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            LoadType::TrackLoaded => "TRACK_LOADED",
            LoadType::PlaylistLoaded => "PLAYLIST_LOADED",
            LoadType::SearchResult => "SEARCH_RESULT",
            LoadType::NoMatches => "NO_MATCHES",
            LoadType::LoadFailed => "LOAD_FAILED",
            LoadType::Unknown => "UNKNOWN",
        }
    }
}

/// What the audio node answered to a search, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLoadResult {
    pub load_type: String,
    pub tracks: Vec<TrackInfo>,
    pub playlist_name: Option<String>,
}

impl RawLoadResult {
    pub fn new(load_type: LoadType, tracks: Vec<TrackInfo>) -> Self {
        Self {
            load_type: load_type.as_tag().to_string(),
            tracks,
            playlist_name: None,
        }
    }

    pub fn playlist(name: impl Into<String>, tracks: Vec<TrackInfo>) -> Self {
        Self {
            load_type: LoadType::PlaylistLoaded.as_tag().to_string(),
            tracks,
            playlist_name: Some(name.into()),
        }
    }

    pub fn empty(load_type: LoadType) -> Self {
        Self::new(load_type, Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    SingleTrack(TrackInfo),
    Playlist { tracks: Vec<TrackInfo>, name: String },
    /// At most `MAX_CANDIDATES` tracks for the user to pick from.
    Candidates(Vec<TrackInfo>),
    Empty,
    Failed,
    Unknown,
}

/// Map a raw load result onto a `SearchOutcome`.
///
/// A successful tag with no tracks is reported as `Empty`.
pub fn classify(result: RawLoadResult) -> SearchOutcome {
    let RawLoadResult {
        load_type,
        tracks,
        playlist_name,
    } = result;

    match LoadType::from_tag(&load_type) {
        LoadType::TrackLoaded => tracks
            .into_iter()
            .next()
            .map_or(SearchOutcome::Empty, SearchOutcome::SingleTrack),
        LoadType::PlaylistLoaded if tracks.is_empty() => SearchOutcome::Empty,
        LoadType::PlaylistLoaded => SearchOutcome::Playlist {
            tracks,
            name: playlist_name.unwrap_or_else(|| "Unknown playlist".to_string()),
        },
        LoadType::SearchResult if tracks.is_empty() => SearchOutcome::Empty,
        LoadType::SearchResult => {
            SearchOutcome::Candidates(tracks.into_iter().take(MAX_CANDIDATES).collect())
        }
        LoadType::NoMatches => SearchOutcome::Empty,
        LoadType::LoadFailed => SearchOutcome::Failed,
        LoadType::Unknown => SearchOutcome::Unknown,
    }
}
