// Export music utilities
pub mod audio_node;
pub mod button_controls;
pub mod embedded_messages;
pub mod event_handlers;
pub mod idle_watchdog;
pub mod music_manager;
pub mod preconditions;
pub mod queue_manager;
pub mod search;
pub mod session;
pub mod songbird_node;
pub mod voice_bridge;

/// Format a millisecond count as "M:SS".
///
/// Minutes wrap at 60, so an hour-long remainder renders as "0:00". Hours are
/// never shown.
pub fn format_duration(ms: u64) -> String {
    let minutes = (ms / 60_000) % 60;
    let seconds = (ms / 1000) % 60;

    format!("{}:{:02}", minutes, seconds)
}
