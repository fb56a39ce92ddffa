use dashmap::DashMap;
use serenity::model::id::GuildId;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use super::audio_node::{AudioNode, NodeEvent, VoiceGateway, VoiceUpdate};
use super::session::PlaybackSession;

/// Errors that can occur during music operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("I am missing the permission to connect to your voice channel")]
    PermissionDenied,

    #[error("You need to be in the same voice channel as me to run this command")]
    ChannelMismatch,

    #[error("The queue is empty")]
    EmptyQueue,

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{value} is out of bounds, please use a value between 1-{max}")]
    OutOfRange { value: usize, max: usize },

    #[error("Still working on a previous command for this server, try again in a moment")]
    Busy,

    #[error("Audio node unavailable: {0}")]
    NodeUnavailable(String),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("{0} is not supported by the current audio backend")]
    Unsupported(&'static str),
}

impl MusicError {
    /// Errors that point at a broken collaborator rather than a user mistake
    pub fn is_unexpected(&self) -> bool {
        matches!(self, MusicError::NodeUnavailable(_) | MusicError::JoinError(_))
    }
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Tunables shared by every session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// How long an emptied session may sit idle before it disconnects
    pub idle_timeout: Duration,
    /// Cadence at which the idle watchdog checks for resumed playback
    pub idle_poll_interval: Duration,
    /// How long a command waits for a busy session before giving up
    pub command_timeout: Duration,
    pub self_mute: bool,
    pub self_deaf: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(60),
            idle_poll_interval: Duration::from_secs(1),
            command_timeout: Duration::from_secs(5),
            self_mute: false,
            self_deaf: false,
        }
    }
}

pub(crate) struct RegistryInner {
    sessions: DashMap<GuildId, Arc<PlaybackSession>>,
    node: Arc<dyn AudioNode>,
    gateway: Arc<dyn VoiceGateway>,
    settings: SessionSettings,
}

impl RegistryInner {
    /// Drop `session` from the map if it is still the registered one
    pub(crate) fn remove_session(&self, session: &PlaybackSession) {
        let removed = self
            .sessions
            .remove_if(&session.guild_id(), |_, registered| {
                std::ptr::eq(Arc::as_ptr(registered), session)
            });
        if removed.is_some() {
            info!("Tore down playback session for guild {}", session.guild_id());
        }
    }
}

/// Process-wide map of guild to playback session.
///
/// Sessions are created on first use and removed on explicit leave or when
/// the idle watchdog fires. Cloning is cheap and shares the same map.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RegistryInner>,
}

impl SessionRegistry {
    pub fn new(
        node: Arc<dyn AudioNode>,
        gateway: Arc<dyn VoiceGateway>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                sessions: DashMap::new(),
                node,
                gateway,
                settings,
            }),
        }
    }

    pub fn node(&self) -> Arc<dyn AudioNode> {
        Arc::clone(&self.inner.node)
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.inner.settings
    }

    /// Get the session for a guild, if one exists
    pub fn get(&self, guild_id: GuildId) -> Option<Arc<PlaybackSession>> {
        self.inner
            .sessions
            .get(&guild_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Get the session for a guild, creating it on first use
    pub fn get_or_create(&self, guild_id: GuildId) -> Arc<PlaybackSession> {
        let entry = self.inner.sessions.entry(guild_id).or_insert_with(|| {
            debug!("Creating playback session for guild {}", guild_id);
            PlaybackSession::spawn(
                guild_id,
                Arc::clone(&self.inner.node),
                Arc::clone(&self.inner.gateway),
                self.inner.settings.clone(),
                Arc::downgrade(&self.inner),
            )
        });
        Arc::clone(entry.value())
    }

    pub fn len(&self) -> usize {
        self.inner.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.sessions.is_empty()
    }

    /// Route a node event to its guild's session, in arrival order
    pub fn dispatch(&self, event: NodeEvent) {
        match self.get(event.guild_id) {
            Some(session) => session.push_event(event),
            None => debug!(
                "Dropping {:?} for guild {} without a session",
                event.kind, event.guild_id
            ),
        }
    }

    /// Forward a gateway voice update to the guild's session, if any
    pub async fn relay_voice_update(&self, guild_id: GuildId, update: VoiceUpdate) {
        if let Some(session) = self.get(guild_id) {
            session.relay_voice_update(update).await;
        }
    }
}
