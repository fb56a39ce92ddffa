//! Mock implementations of the capabilities a playback session drives

use async_trait::async_trait;
use mockall::mock;
use rezz::commands::music::audio_sources::track_metadata::QueuedTrack;
use rezz::commands::music::utils::audio_node::{AudioNode, Filter, VoiceGateway, VoiceUpdate};
use rezz::commands::music::utils::music_manager::{MusicError, MusicResult};
use rezz::commands::music::utils::search::RawLoadResult;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

mock! {
    pub Node {}

    #[async_trait]
    impl AudioNode for Node {
        async fn search(&self, query: &str) -> MusicResult<RawLoadResult>;
        async fn play(&self, guild_id: GuildId, track: &QueuedTrack) -> MusicResult<()>;
        async fn stop(&self, guild_id: GuildId) -> MusicResult<()>;
        async fn set_pause(&self, guild_id: GuildId, pause: bool) -> MusicResult<()>;
        async fn set_filter(&self, guild_id: GuildId, filter: Option<Filter>) -> MusicResult<()>;
        async fn position(&self, guild_id: GuildId) -> MusicResult<Option<u64>>;
        async fn is_active(&self, guild_id: GuildId) -> MusicResult<bool>;
        async fn voice_update(&self, guild_id: GuildId, update: VoiceUpdate) -> MusicResult<()>;
    }
}

mock! {
    pub Gateway {}

    #[async_trait]
    impl VoiceGateway for Gateway {
        async fn connect_voice(
            &self,
            guild_id: GuildId,
            channel_id: ChannelId,
            self_mute: bool,
            self_deaf: bool,
        ) -> MusicResult<()>;
        async fn change_voice_state(
            &self,
            guild_id: GuildId,
            channel_id: Option<ChannelId>,
        ) -> MusicResult<()>;
    }
}

/// Default node behaviour: plays are recorded, the attempts (0-based) that
/// `refuse` picks fail, and every other call succeeds
pub fn record_plays(
    node: &mut MockNode,
    played: Arc<Mutex<Vec<String>>>,
    refuse: impl Fn(usize) -> bool + Send + 'static,
) {
    let attempts = AtomicUsize::new(0);
    node.expect_play().returning(move |_, track| {
        if refuse(attempts.fetch_add(1, Ordering::SeqCst)) {
            return Err(MusicError::NodeUnavailable("connection refused".into()));
        }
        played.lock().unwrap().push(track.uri.clone());
        Ok(())
    });
    node.expect_stop().returning(|_| Ok(()));
    node.expect_set_pause().returning(|_, _| Ok(()));
    node.expect_is_active().returning(|_| Ok(true));
    node.expect_position().returning(|_| Ok(None));
    node.expect_voice_update().returning(|_, _| Ok(()));
}

/// A gateway that always connects and counts requests to leave voice
pub fn counting_gateway(disconnects: Arc<AtomicUsize>) -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_connect_voice().returning(|_, _, _, _| Ok(()));
    gateway.expect_change_voice_state().returning(move |_, channel| {
        if channel.is_none() {
            disconnects.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    });
    gateway
}
