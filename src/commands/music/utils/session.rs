//! Per-guild playback session.
//!
//! Every mutation goes through one async mutex, so a command and a track
//! boundary for the same guild never interleave. Commands give up with
//! `MusicError::Busy` after the configured timeout; node events and the idle
//! watchdog wait as long as it takes.

use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId, UserId};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard, mpsc};
use tracing::{debug, error, info, warn};

use super::audio_node::{AudioNode, EndReason, Filter, NodeEvent, NodeEventKind, VoiceGateway, VoiceUpdate};
use super::idle_watchdog::{IdleTarget, IdleWatchdog, WatchdogState};
use super::music_manager::{MusicError, MusicResult, RegistryInner, SessionSettings};
use super::queue_manager::{Advance, LoopMode, PlaybackQueue, QueuePage};
use super::voice_bridge::{ConnectionStatus, VoiceBridge};
use crate::commands::music::audio_sources::track_metadata::{QueuedTrack, TrackInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined(ChannelId),
    Moved(ChannelId),
    AlreadyConnected(ChannelId),
}

impl JoinOutcome {
    pub fn channel_id(self) -> ChannelId {
        match self {
            JoinOutcome::Joined(id) | JoinOutcome::Moved(id) | JoinOutcome::AlreadyConnected(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Nothing was playing, so playback started right away
    Started(QueuedTrack),
    /// Appended behind other tracks; `position` is 1-based
    Queued { track: QueuedTrack, position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistOutcome {
    pub count: usize,
    pub started: Option<QueuedTrack>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseStatus {
    Paused,
    NotPlaying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeStatus {
    Resumed,
    NotPaused,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterChange {
    Applied(f64),
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub track: QueuedTrack,
    pub remaining_ms: u64,
    pub paused: bool,
}

#[derive(Debug)]
enum SessionEvent {
    Node(NodeEvent),
    /// The gateway dropped our voice connection without being asked to
    VoiceLost,
}

pub struct PlaybackSession {
    guild_id: GuildId,
    me: Weak<PlaybackSession>,
    state: Mutex<PlaybackQueue>,
    node: Arc<dyn AudioNode>,
    bridge: VoiceBridge,
    watchdog: IdleWatchdog,
    events: mpsc::UnboundedSender<SessionEvent>,
    registry: Weak<RegistryInner>,
    command_timeout: Duration,
}

impl PlaybackSession {
    pub(crate) fn spawn(
        guild_id: GuildId,
        node: Arc<dyn AudioNode>,
        gateway: Arc<dyn VoiceGateway>,
        settings: SessionSettings,
        registry: Weak<RegistryInner>,
    ) -> Arc<Self> {
        let (events, receiver) = mpsc::unbounded_channel();

        let session = Arc::new_cyclic(|me| Self {
            guild_id,
            me: me.clone(),
            state: Mutex::new(PlaybackQueue::new()),
            bridge: VoiceBridge::new(
                guild_id,
                gateway,
                Arc::clone(&node),
                settings.self_mute,
                settings.self_deaf,
            ),
            node,
            watchdog: IdleWatchdog::new(settings.idle_timeout, settings.idle_poll_interval),
            events,
            registry,
            command_timeout: settings.command_timeout,
        });

        tokio::spawn(drain_events(Arc::downgrade(&session), receiver));
        session
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    /// The voice channel the session is bound to, if any
    pub fn bound_channel(&self) -> Option<ChannelId> {
        self.bridge.channel_id()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.bridge.status()
    }

    pub fn watchdog_state(&self) -> WatchdogState {
        self.watchdog.state()
    }

    async fn lock_for_command(&self) -> MusicResult<MutexGuard<'_, PlaybackQueue>> {
        tokio::time::timeout(self.command_timeout, self.state.lock())
            .await
            .map_err(|_| {
                warn!("Session for guild {} is busy, rejecting command", self.guild_id);
                MusicError::Busy
            })
    }

    fn ensure_bound(&self) -> MusicResult<ChannelId> {
        self.bridge.channel_id().ok_or(MusicError::NotConnected)
    }

    /// Bind to `channel_id`, moving if already elsewhere.
    ///
    /// `can_connect` is the caller's verdict on the connect permission and is
    /// checked before anything changes.
    pub async fn join(&self, channel_id: ChannelId, can_connect: bool) -> MusicResult<JoinOutcome> {
        if !can_connect {
            return Err(MusicError::PermissionDenied);
        }
        let _state = self.lock_for_command().await?;

        match self.bridge.channel_id() {
            Some(bound) if bound == channel_id => Ok(JoinOutcome::AlreadyConnected(channel_id)),
            Some(_) => {
                self.bridge.move_to(channel_id).await?;
                Ok(JoinOutcome::Moved(channel_id))
            }
            None => {
                self.bridge.connect(channel_id).await?;
                Ok(JoinOutcome::Joined(channel_id))
            }
        }
    }

    pub async fn enqueue(&self, info: TrackInfo, requester: UserId) -> MusicResult<EnqueueOutcome> {
        let mut state = self.lock_for_command().await?;
        self.ensure_bound()?;

        let track = QueuedTrack::new(info, requester);
        debug!("Queueing '{}' in guild {}", track.title, self.guild_id);

        match state.push(track.clone()) {
            Some(started) => {
                self.start_playback(&mut state, &started).await?;
                Ok(EnqueueOutcome::Started(started))
            }
            None => Ok(EnqueueOutcome::Queued {
                track,
                position: state.len(),
            }),
        }
    }

    pub async fn enqueue_playlist(
        &self,
        tracks: Vec<TrackInfo>,
        requester: UserId,
    ) -> MusicResult<PlaylistOutcome> {
        let mut state = self.lock_for_command().await?;
        self.ensure_bound()?;

        let count = tracks.len();
        let started = state.push_all(
            tracks
                .into_iter()
                .map(|info| QueuedTrack::new(info, requester)),
        );
        info!("Queued {} tracks in guild {}", count, self.guild_id);

        if let Some(track) = &started {
            self.start_playback(&mut state, track).await?;
        }
        Ok(PlaylistOutcome { count, started })
    }

    /// Skip `count` tracks and return whatever is playing afterwards.
    pub async fn skip(&self, count: i64) -> MusicResult<Option<QueuedTrack>> {
        let mut state = self.lock_for_command().await?;
        let advance = state.skip(count)?;
        info!("Skipping {} track(s) in guild {}", count, self.guild_id);
        self.apply_advance(&mut state, advance).await
    }

    pub async fn pause(&self) -> MusicResult<PauseStatus> {
        let mut state = self.lock_for_command().await?;
        if !state.is_playing() {
            return Ok(PauseStatus::NotPlaying);
        }

        self.node.set_pause(self.guild_id, true).await?;
        state.set_paused(true);
        Ok(PauseStatus::Paused)
    }

    pub async fn resume(&self) -> MusicResult<ResumeStatus> {
        let mut state = self.lock_for_command().await?;
        if state.current().is_none() || !state.is_paused() {
            return Ok(ResumeStatus::NotPaused);
        }

        self.node.set_pause(self.guild_id, false).await?;
        state.set_paused(false);
        Ok(ResumeStatus::Resumed)
    }

    pub async fn set_loop(&self, mode: LoopMode) -> MusicResult<()> {
        let mut state = self.lock_for_command().await?;
        info!("Loop mode in guild {} set to {}", self.guild_id, mode);
        state.set_loop_mode(mode);
        Ok(())
    }

    pub async fn loop_mode(&self) -> MusicResult<LoopMode> {
        Ok(self.lock_for_command().await?.loop_mode())
    }

    /// Clear the queue and stop the current track. Stays connected.
    pub async fn stop(&self) -> MusicResult<()> {
        let mut state = self.lock_for_command().await?;
        state.clear();
        self.node.stop(self.guild_id).await
    }

    /// Randomize pending tracks and return how many there are
    pub async fn shuffle(&self) -> MusicResult<usize> {
        let mut state = self.lock_for_command().await?;
        state.shuffle();
        Ok(state.len())
    }

    pub async fn remove(&self, position: usize) -> MusicResult<QueuedTrack> {
        self.lock_for_command().await?.remove(position)
    }

    pub async fn page(&self, page: usize, page_size: usize) -> MusicResult<QueuePage> {
        self.lock_for_command().await?.page(page, page_size)
    }

    pub async fn now_playing(&self) -> MusicResult<Option<NowPlaying>> {
        let state = self.lock_for_command().await?;
        let Some(track) = state.current().cloned() else {
            return Ok(None);
        };

        let position = self.node.position(self.guild_id).await?.unwrap_or(0);
        Ok(Some(NowPlaying {
            remaining_ms: track.duration_ms.saturating_sub(position),
            paused: state.is_paused(),
            track,
        }))
    }

    /// Apply a low-pass filter. Strength is clamped to 0..=100; zero removes it.
    pub async fn set_low_pass(&self, strength: f64) -> MusicResult<FilterChange> {
        if strength.is_nan() {
            return Err(MusicError::InvalidArgument(
                "Strength must be a number between 0 and 100".to_string(),
            ));
        }
        let strength = strength.clamp(0.0, 100.0);
        let _state = self.lock_for_command().await?;

        if strength == 0.0 {
            self.node.set_filter(self.guild_id, None).await?;
            return Ok(FilterChange::Removed);
        }

        self.node
            .set_filter(self.guild_id, Some(Filter::LowPass { smoothing: strength }))
            .await?;
        Ok(FilterChange::Applied(strength))
    }

    /// Stop playback and release voice. The requester must share our channel.
    pub async fn leave(&self, requester_channel: Option<ChannelId>) -> MusicResult<()> {
        let mut state = self.lock_for_command().await?;
        let bound = self.bridge.channel_id();
        if requester_channel.is_none() || requester_channel != bound {
            return Err(MusicError::ChannelMismatch);
        }

        state.clear();
        self.watchdog.disarm();
        let stopped = self.node.stop(self.guild_id).await;
        let released = self.bridge.disconnect(true).await;
        drop(state);

        self.teardown();
        stopped?;
        released.map(|_| ())
    }

    /// Hand a node event to this session's event queue
    pub fn push_event(&self, event: NodeEvent) {
        if self.events.send(SessionEvent::Node(event)).is_err() {
            debug!("Event queue for guild {} is closed", self.guild_id);
        }
    }

    pub async fn relay_voice_update(&self, update: VoiceUpdate) {
        let was_bound = self.bridge.channel_id().is_some();

        if let Err(e) = self.bridge.relay(update).await {
            warn!("Failed to relay voice update for guild {}: {}", self.guild_id, e);
        }

        if was_bound && self.bridge.channel_id().is_none() {
            let _ = self.events.send(SessionEvent::VoiceLost);
        }
    }

    async fn start_playback(&self, state: &mut PlaybackQueue, track: &QueuedTrack) -> MusicResult<()> {
        match self.node.play(self.guild_id, track).await {
            Ok(()) => {
                state.set_paused(false);
                self.watchdog.disarm();
                info!("Now playing '{}' in guild {}", track.title, self.guild_id);
                Ok(())
            }
            Err(e) => {
                error!("Failed to start '{}' in guild {}: {}", track.title, self.guild_id, e);
                // the track waits at the head for the next enqueue to retry it
                state.requeue_current();
                self.watchdog.disarm();
                Err(e)
            }
        }
    }

    async fn apply_advance(
        &self,
        state: &mut PlaybackQueue,
        advance: Advance,
    ) -> MusicResult<Option<QueuedTrack>> {
        match advance {
            Advance::Replay(track) | Advance::Next(track) => {
                self.start_playback(state, &track).await?;
                Ok(Some(track))
            }
            Advance::QueueEnded => {
                info!("Queue ended in guild {}", self.guild_id);
                if let Err(e) = self.node.stop(self.guild_id).await {
                    warn!("Failed to stop player in guild {}: {}", self.guild_id, e);
                }
                self.arm_watchdog();
                Ok(None)
            }
        }
    }

    fn arm_watchdog(&self) {
        let target: Weak<dyn IdleTarget> = self.me.clone();
        self.watchdog.arm(target);
    }

    fn teardown(&self) {
        self.watchdog.disarm();
        if let Some(registry) = self.registry.upgrade() {
            registry.remove_session(self);
        }
    }

    async fn handle_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::Node(event) => self.handle_node_event(event.kind).await,
            SessionEvent::VoiceLost => {
                warn!("Lost voice connection in guild {}, tearing down", self.guild_id);
                let mut state = self.state.lock().await;
                state.clear();
                if let Err(e) = self.node.stop(self.guild_id).await {
                    warn!("Failed to stop player in guild {}: {}", self.guild_id, e);
                }
                drop(state);
                self.teardown();
            }
        }
    }

    async fn handle_node_event(&self, kind: NodeEventKind) {
        match kind {
            NodeEventKind::TrackStarted { uri } => {
                debug!("Track {} started in guild {}", uri, self.guild_id);
                self.watchdog.disarm();
            }
            NodeEventKind::TrackEnded { uri, reason } => {
                if !reason.advances_queue() {
                    debug!("Track {} ended ({:?}) in guild {}", uri, reason, self.guild_id);
                    return;
                }

                let mut state = self.state.lock().await;
                if state.current().map(|track| track.uri.as_str()) != Some(uri.as_str()) {
                    debug!("Ignoring end of stale track {} in guild {}", uri, self.guild_id);
                    return;
                }

                let advance = match reason {
                    EndReason::LoadFailed => {
                        warn!("Track {} failed in guild {}, moving on", uri, self.guild_id);
                        state.advance_discarding()
                    }
                    _ => state.advance(),
                };

                if let Err(e) = self.apply_advance(&mut state, advance).await {
                    error!("Track boundary failed in guild {}: {}", self.guild_id, e);
                }
            }
            NodeEventKind::QueueEnded => self.arm_watchdog(),
        }
    }
}

#[async_trait]
impl IdleTarget for PlaybackSession {
    async fn is_playing(&self) -> MusicResult<bool> {
        if !self.state.lock().await.is_playing() {
            return Ok(false);
        }
        self.node.is_active(self.guild_id).await
    }

    async fn on_idle_timeout(&self) {
        let mut state = self.state.lock().await;
        if state.current().is_some() || !state.is_empty() {
            debug!("Music arrived in guild {} as the idle timer fired, staying", self.guild_id);
            return;
        }
        state.clear();
        if let Err(e) = self.bridge.disconnect(true).await {
            warn!("Failed to leave voice in guild {}: {}", self.guild_id, e);
        }
        drop(state);
        self.teardown();
    }
}

async fn drain_events(session: Weak<PlaybackSession>, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
    while let Some(event) = events.recv().await {
        let Some(session) = session.upgrade() else {
            break;
        };
        session.handle_event(event).await;
    }
}
