//! Production `AudioNode` and `VoiceGateway` backed by songbird.
//!
//! Songbird listens to the gateway's voice events on its own, so voice
//! updates are only traced here.

use dashmap::DashMap;
use reqwest::Client as HttpClient;
use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use songbird::error::JoinError;
use songbird::input::YoutubeDl;
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::{Event, Songbird, TrackEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use super::audio_node::{AudioNode, Filter, NodeEvent, VoiceGateway, VoiceUpdate};
use super::event_handlers::TrackEventRelay;
use super::music_manager::{MusicError, MusicResult};
use super::search::RawLoadResult;
use crate::commands::music::audio_sources::track_metadata::QueuedTrack;
use crate::commands::music::audio_sources::youtube::YoutubeLoader;

fn unavailable(e: impl std::fmt::Display) -> MusicError {
    MusicError::NodeUnavailable(e.to_string())
}

/// Plays tracks through songbird, resolving them with `yt-dlp`.
pub struct SongbirdNode {
    songbird: Arc<Songbird>,
    http: HttpClient,
    loader: YoutubeLoader,
    handles: DashMap<GuildId, TrackHandle>,
    events: mpsc::UnboundedSender<NodeEvent>,
}

impl SongbirdNode {
    pub fn new(
        songbird: Arc<Songbird>,
        http: HttpClient,
        loader: YoutubeLoader,
        events: mpsc::UnboundedSender<NodeEvent>,
    ) -> Self {
        Self {
            songbird,
            http,
            loader,
            handles: DashMap::new(),
            events,
        }
    }

    fn handle(&self, guild_id: GuildId) -> Option<TrackHandle> {
        self.handles.get(&guild_id).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl AudioNode for SongbirdNode {
    async fn search(&self, query: &str) -> MusicResult<RawLoadResult> {
        self.loader.load(query).await
    }

    async fn play(&self, guild_id: GuildId, track: &QueuedTrack) -> MusicResult<()> {
        let call = self
            .songbird
            .get(guild_id)
            .ok_or(MusicError::NotConnected)?;

        let input = YoutubeDl::new(self.http.clone(), track.uri.clone());
        let handle = call.lock().await.play_only_input(input.into());

        for event in [TrackEvent::Play, TrackEvent::End, TrackEvent::Error] {
            let relay = TrackEventRelay {
                guild_id,
                uri: track.uri.clone(),
                events: self.events.clone(),
            };
            handle.add_event(Event::Track(event), relay).map_err(unavailable)?;
        }

        info!("Handed '{}' to songbird in guild {}", track.title, guild_id);
        self.handles.insert(guild_id, handle);
        Ok(())
    }

    async fn stop(&self, guild_id: GuildId) -> MusicResult<()> {
        if let Some((_, handle)) = self.handles.remove(&guild_id) {
            // the track may already be gone, which is what we wanted anyway
            let _ = handle.stop();
        }
        if let Some(call) = self.songbird.get(guild_id) {
            call.lock().await.stop();
        }
        Ok(())
    }

    async fn set_pause(&self, guild_id: GuildId, pause: bool) -> MusicResult<()> {
        let handle = self.handle(guild_id).ok_or(MusicError::NotConnected)?;
        let result = if pause { handle.pause() } else { handle.play() };
        result.map_err(unavailable)
    }

    async fn set_filter(&self, _guild_id: GuildId, filter: Option<Filter>) -> MusicResult<()> {
        debug!("Rejecting filter change {:?}", filter);
        Err(MusicError::Unsupported("Audio filters"))
    }

    async fn position(&self, guild_id: GuildId) -> MusicResult<Option<u64>> {
        let Some(handle) = self.handle(guild_id) else {
            return Ok(None);
        };
        match handle.get_info().await {
            Ok(state) => Ok(Some(state.position.as_millis() as u64)),
            Err(e) => {
                debug!("No position for guild {}: {}", guild_id, e);
                Ok(None)
            }
        }
    }

    async fn is_active(&self, guild_id: GuildId) -> MusicResult<bool> {
        let Some(handle) = self.handle(guild_id) else {
            return Ok(false);
        };
        Ok(handle
            .get_info()
            .await
            .is_ok_and(|state| matches!(state.playing, PlayMode::Play)))
    }

    async fn voice_update(&self, guild_id: GuildId, update: VoiceUpdate) -> MusicResult<()> {
        trace!("Voice update {:?} for guild {} handled by songbird", update.kind, guild_id);
        Ok(())
    }
}

/// Voice state changes through songbird's gateway integration.
pub struct SongbirdGateway {
    songbird: Arc<Songbird>,
}

impl SongbirdGateway {
    pub fn new(songbird: Arc<Songbird>) -> Self {
        Self { songbird }
    }
}

fn join_error(e: JoinError) -> MusicError {
    MusicError::JoinError(e.to_string())
}

#[async_trait]
impl VoiceGateway for SongbirdGateway {
    async fn connect_voice(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        self_mute: bool,
        self_deaf: bool,
    ) -> MusicResult<()> {
        let call = self
            .songbird
            .join(guild_id, channel_id)
            .await
            .map_err(join_error)?;

        let mut handler = call.lock().await;
        handler.mute(self_mute).await.map_err(join_error)?;
        handler.deafen(self_deaf).await.map_err(join_error)?;
        Ok(())
    }

    async fn change_voice_state(
        &self,
        guild_id: GuildId,
        channel_id: Option<ChannelId>,
    ) -> MusicResult<()> {
        match channel_id {
            Some(channel_id) => self
                .songbird
                .join(guild_id, channel_id)
                .await
                .map(|_| ())
                .map_err(join_error),
            None => match self.songbird.remove(guild_id).await {
                Ok(()) | Err(JoinError::NoCall) => Ok(()),
                Err(e) => Err(join_error(e)),
            },
        }
    }
}
