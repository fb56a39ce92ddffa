//! Resolves URLs and search queries through the `yt-dlp` command-line tool.

use serde::Deserialize;
use std::process::Command;
use tracing::{debug, info, warn};

use super::is_url;
use super::track_metadata::TrackInfo;
use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use crate::commands::music::utils::search::{LoadType, RawLoadResult};

/// How many results a plain-text search asks `yt-dlp` for.
const SEARCH_RESULTS: usize = 10;

/// The subset of `yt-dlp -J` output we care about.
#[derive(Debug, Default, Deserialize)]
struct YtDlpInfo {
    #[serde(rename = "_type")]
    kind: Option<String>,
    title: Option<String>,
    webpage_url: Option<String>,
    url: Option<String>,
    /// Seconds, sometimes fractional
    duration: Option<f64>,
    thumbnail: Option<String>,
    #[serde(default)]
    thumbnails: Vec<Thumbnail>,
    #[serde(default)]
    entries: Vec<YtDlpInfo>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl YtDlpInfo {
    fn is_playlist(&self) -> bool {
        self.kind.as_deref() == Some("playlist")
    }

    fn into_track(self) -> Option<TrackInfo> {
        let uri = self.webpage_url.or(self.url)?;
        let duration_ms = self
            .duration
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map_or(0, |secs| (secs * 1000.0) as u64);
        let thumbnail = self
            .thumbnail
            .or_else(|| self.thumbnails.into_iter().last().map(|t| t.url));

        let track = TrackInfo::new(
            self.title.unwrap_or_else(|| "Unknown title".to_string()),
            uri,
            duration_ms,
        );
        Some(match thumbnail {
            Some(thumbnail) => track.with_thumbnail(thumbnail),
            None => track,
        })
    }

    fn into_tracks(self) -> Vec<TrackInfo> {
        self.entries
            .into_iter()
            .filter_map(YtDlpInfo::into_track)
            .collect()
    }
}

/// Loads tracks with `yt-dlp`.
#[derive(Debug, Clone)]
pub struct YoutubeLoader {
    binary: String,
}

impl Default for YoutubeLoader {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YoutubeLoader {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// The argument `yt-dlp` should resolve for `query`
    pub fn target_for(query: &str) -> String {
        if is_url(query) {
            query.to_string()
        } else {
            format!("ytsearch{}:{}", SEARCH_RESULTS, query)
        }
    }

    /// Resolve `query` into a raw load result.
    ///
    /// A failed extraction is reported as `LOAD_FAILED`; only a missing or
    /// unlaunchable binary is a `NodeUnavailable` error.
    pub async fn load(&self, query: &str) -> MusicResult<RawLoadResult> {
        let query = query.trim().to_string();
        let target = Self::target_for(&query);
        let binary = self.binary.clone();
        info!("Resolving '{}' with {}", target, binary);

        let output = tokio::task::spawn_blocking(move || {
            Command::new(binary)
                .args(["-J", "--flat-playlist", "--no-warnings", &target])
                .output()
        })
        .await
        .map_err(|e| MusicError::NodeUnavailable(format!("yt-dlp task failed: {}", e)))?
        .map_err(|e| MusicError::NodeUnavailable(format!("Failed to run yt-dlp: {}", e)))?;

        if !output.status.success() {
            warn!(
                "yt-dlp failed for '{}': {}",
                query,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(RawLoadResult::empty(LoadType::LoadFailed));
        }

        Ok(parse_output(&query, &output.stdout))
    }
}

/// Turn `yt-dlp -J` output for `query` into a raw load result.
pub fn parse_output(query: &str, stdout: &[u8]) -> RawLoadResult {
    let info: YtDlpInfo = match serde_json::from_slice(stdout) {
        Ok(info) => info,
        Err(e) => {
            warn!("Unreadable yt-dlp output for '{}': {}", query, e);
            return RawLoadResult::empty(LoadType::LoadFailed);
        }
    };

    if !is_url(query) {
        let tracks = info.into_tracks();
        debug!("Search for '{}' found {} results", query, tracks.len());
        if tracks.is_empty() {
            return RawLoadResult::empty(LoadType::NoMatches);
        }
        return RawLoadResult::new(LoadType::SearchResult, tracks);
    }

    if info.is_playlist() {
        let name = info
            .title
            .clone()
            .unwrap_or_else(|| "Unknown playlist".to_string());
        return RawLoadResult::playlist(name, info.into_tracks());
    }

    match info.into_track() {
        Some(track) => RawLoadResult::new(LoadType::TrackLoaded, vec![track]),
        None => RawLoadResult::empty(LoadType::NoMatches),
    }
}
