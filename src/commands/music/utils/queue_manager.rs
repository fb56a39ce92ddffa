use rand::seq::SliceRandom;
use std::collections::VecDeque;
use std::fmt;

use super::music_manager::{MusicError, MusicResult};
use crate::commands::music::audio_sources::track_metadata::QueuedTrack;

/// Default number of tracks shown per queue page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// How the queue behaves at a track boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoopMode {
    #[default]
    Off,
    /// Replay the current track forever
    Track,
    /// Send finished tracks to the back of the queue
    Queue,
}

impl fmt::Display for LoopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopMode::Off => "off",
            LoopMode::Track => "track",
            LoopMode::Queue => "queue",
        };
        f.write_str(name)
    }
}

/// What happened at a track boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The current track plays again
    Replay(QueuedTrack),
    /// A new track was promoted to current
    Next(QueuedTrack),
    /// Nothing left to play; the current slot is now empty
    QueueEnded,
}

impl Advance {
    pub fn track(&self) -> Option<&QueuedTrack> {
        match self {
            Advance::Replay(track) | Advance::Next(track) => Some(track),
            Advance::QueueEnded => None,
        }
    }
}

/// One page of pending tracks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuePage {
    pub tracks: Vec<QueuedTrack>,
    pub page: usize,
    pub total_pages: usize,
    /// Queue index of the first track on this page
    pub offset: usize,
}

/// Queue and playback state for a single guild.
///
/// The track in the current slot is never also in `pending`; in queue-loop
/// mode a finished track only goes back to the tail once it is done.
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    pending: VecDeque<QueuedTrack>,
    current: Option<QueuedTrack>,
    loop_mode: LoopMode,
    paused: bool,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&QueuedTrack> {
        self.current.as_ref()
    }

    pub fn pending(&self) -> impl ExactSizeIterator<Item = &QueuedTrack> {
        self.pending.iter()
    }

    /// Number of tracks waiting behind the current one
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    /// Takes effect at the next track boundary.
    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// A track is loaded and not paused
    pub fn is_playing(&self) -> bool {
        self.current.is_some() && !self.paused
    }

    /// Append a track. Returns the track to start if nothing was playing.
    pub fn push(&mut self, track: QueuedTrack) -> Option<QueuedTrack> {
        self.pending.push_back(track);
        self.start_if_idle()
    }

    /// Append tracks in order. At most one track is started, the first one.
    pub fn push_all(&mut self, tracks: impl IntoIterator<Item = QueuedTrack>) -> Option<QueuedTrack> {
        self.pending.extend(tracks);
        self.start_if_idle()
    }

    fn start_if_idle(&mut self) -> Option<QueuedTrack> {
        if self.current.is_some() {
            return None;
        }
        self.promote()
    }

    fn promote(&mut self) -> Option<QueuedTrack> {
        self.current = self.pending.pop_front();
        self.current.clone()
    }

    /// Run the track-boundary algorithm after the current track finished.
    pub fn advance(&mut self) -> Advance {
        match self.loop_mode {
            LoopMode::Track => {
                if let Some(current) = &self.current {
                    return Advance::Replay(current.clone());
                }
            }
            LoopMode::Queue => {
                if let Some(finished) = self.current.take() {
                    self.pending.push_back(finished);
                }
            }
            LoopMode::Off => {}
        }
        self.advance_discarding()
    }

    /// Drop the current track and promote the next one, ignoring loop mode.
    pub fn advance_discarding(&mut self) -> Advance {
        match self.promote() {
            Some(track) => Advance::Next(track),
            None => {
                self.paused = false;
                Advance::QueueEnded
            }
        }
    }

    /// Skip `count` tracks. Skipped tracks never play; only the final step
    /// honors the loop mode.
    pub fn skip(&mut self, count: i64) -> MusicResult<Advance> {
        if self.pending.is_empty() {
            return Err(MusicError::EmptyQueue);
        }
        if count < 1 {
            return Err(MusicError::InvalidArgument(
                "Please use a value bigger than or equal to 1".to_string(),
            ));
        }

        for _ in 1..count {
            if let Advance::QueueEnded = self.advance_discarding() {
                return Ok(Advance::QueueEnded);
            }
        }
        Ok(self.advance())
    }

    /// Undo a promotion whose playback could not start.
    pub fn requeue_current(&mut self) {
        if let Some(track) = self.current.take() {
            self.pending.push_front(track);
        }
    }

    /// Empty the queue and the current slot
    pub fn clear(&mut self) {
        self.pending.clear();
        self.current = None;
        self.paused = false;
    }

    /// Randomize pending order. The current track is untouched.
    pub fn shuffle(&mut self) {
        let mut rng = rand::rng();
        self.pending.make_contiguous().shuffle(&mut rng);
    }

    /// Remove the pending track at a 1-based position
    pub fn remove(&mut self, position: usize) -> MusicResult<QueuedTrack> {
        if self.pending.is_empty() {
            return Err(MusicError::EmptyQueue);
        }
        let max = self.pending.len();
        if position == 0 {
            return Err(MusicError::OutOfRange { value: position, max });
        }
        self.pending
            .remove(position - 1)
            .ok_or(MusicError::OutOfRange { value: position, max })
    }

    /// Page count for a given page size, never less than one
    pub fn total_pages(&self, page_size: usize) -> usize {
        self.pending.len().div_ceil(page_size).max(1)
    }

    /// Read a 1-based page of pending tracks
    pub fn page(&self, page: usize, page_size: usize) -> MusicResult<QueuePage> {
        if page_size == 0 {
            return Err(MusicError::InvalidArgument(
                "Page size must be at least 1".to_string(),
            ));
        }

        let total_pages = self.total_pages(page_size);
        if page < 1 || page > total_pages {
            return Err(MusicError::OutOfRange {
                value: page,
                max: total_pages,
            });
        }

        let begin = (page - 1) * page_size;
        let end = (page * page_size).min(self.pending.len());
        let tracks = self.pending.range(begin..end).cloned().collect();

        Ok(QueuePage {
            tracks,
            page,
            total_pages,
            offset: begin,
        })
    }
}
