//! Where tracks come from: metadata types and the `yt-dlp` loader.

pub mod track_metadata;
pub mod youtube;

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?.+").expect("url regex is valid")
});

/// Whether `query` should be loaded directly rather than searched for.
pub fn is_url(query: &str) -> bool {
    let query = query.trim();
    URL_REGEX.is_match(query) && Url::parse(query).is_ok()
}
