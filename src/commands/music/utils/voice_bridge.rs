//! Binds a guild's playback session to one voice channel and forwards the
//! gateway's voice updates to the audio node.

use serenity::model::id::{ChannelId, GuildId};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

use super::audio_node::{AudioNode, VoiceGateway, VoiceUpdate, VoiceUpdateKind};
use super::music_manager::MusicResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Default)]
struct BridgeState {
    status: ConnectionStatus,
    channel_id: Option<ChannelId>,
}

/// Per-guild voice connection.
///
/// `channel_id` is set exactly while the status is not `Disconnected`.
pub struct VoiceBridge {
    guild_id: GuildId,
    gateway: Arc<dyn VoiceGateway>,
    node: Arc<dyn AudioNode>,
    self_mute: bool,
    self_deaf: bool,
    state: Mutex<BridgeState>,
    // one voice update in flight at a time, handed out in arrival order
    relay: tokio::sync::Mutex<()>,
}

impl VoiceBridge {
    pub fn new(
        guild_id: GuildId,
        gateway: Arc<dyn VoiceGateway>,
        node: Arc<dyn AudioNode>,
        self_mute: bool,
        self_deaf: bool,
    ) -> Self {
        Self {
            guild_id,
            gateway,
            node,
            self_mute,
            self_deaf,
            state: Mutex::new(BridgeState::default()),
            relay: tokio::sync::Mutex::new(()),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut BridgeState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.with_state(|state| state.status)
    }

    pub fn channel_id(&self) -> Option<ChannelId> {
        self.with_state(|state| state.channel_id)
    }

    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    /// Open a voice connection to `channel_id`
    pub async fn connect(&self, channel_id: ChannelId) -> MusicResult<()> {
        self.with_state(|state| {
            state.status = ConnectionStatus::Connecting;
            state.channel_id = Some(channel_id);
        });

        info!("Connecting to voice channel {} in guild {}", channel_id, self.guild_id);
        let result = self
            .gateway
            .connect_voice(self.guild_id, channel_id, self.self_mute, self.self_deaf)
            .await;

        self.with_state(|state| match &result {
            Ok(()) => state.status = ConnectionStatus::Connected,
            Err(_) => *state = BridgeState::default(),
        });
        result
    }

    /// Move an existing connection to another channel
    pub async fn move_to(&self, channel_id: ChannelId) -> MusicResult<()> {
        info!("Moving to voice channel {} in guild {}", channel_id, self.guild_id);
        self.gateway
            .change_voice_state(self.guild_id, Some(channel_id))
            .await?;

        self.with_state(|state| {
            state.channel_id = Some(channel_id);
            if state.status == ConnectionStatus::Disconnected {
                state.status = ConnectionStatus::Connecting;
            }
        });
        Ok(())
    }

    /// Release the voice connection.
    ///
    /// Without `force` this is a no-op unless connected. Returns whether the
    /// gateway was asked to leave.
    pub async fn disconnect(&self, force: bool) -> MusicResult<bool> {
        if !force && !self.is_connected() {
            debug!("Not connected in guild {}, skipping disconnect", self.guild_id);
            return Ok(false);
        }

        info!("Leaving voice in guild {} (force: {})", self.guild_id, force);
        let result = self.gateway.change_voice_state(self.guild_id, None).await;
        // the binding is gone either way once we asked to leave
        self.with_state(|state| *state = BridgeState::default());

        result.map(|_| true)
    }

    /// Forward a gateway voice update to the node, unmodified.
    pub async fn relay(&self, update: VoiceUpdate) -> MusicResult<()> {
        let _in_flight = self.relay.lock().await;

        if update.kind == VoiceUpdateKind::StateUpdate {
            self.track_own_state(&update);
        }

        self.node.voice_update(self.guild_id, update.clone()).await?;

        if update.kind == VoiceUpdateKind::ServerUpdate {
            self.with_state(|state| {
                if state.status == ConnectionStatus::Connecting {
                    state.status = ConnectionStatus::Connected;
                }
            });
        }
        Ok(())
    }

    // A state update for our own user tells us where the gateway put us.
    fn track_own_state(&self, update: &VoiceUpdate) {
        let channel = update
            .payload
            .get("channel_id")
            .and_then(|value| match value {
                serde_json::Value::String(raw) => raw.parse::<u64>().ok(),
                other => other.as_u64(),
            })
            .filter(|raw| *raw != 0)
            .map(ChannelId::new);

        self.with_state(|state| match channel {
            Some(channel_id) if state.status != ConnectionStatus::Disconnected => {
                if state.channel_id != Some(channel_id) {
                    info!("Voice channel in guild {} is now {}", self.guild_id, channel_id);
                }
                state.channel_id = Some(channel_id);
            }
            Some(_) => {}
            None => {
                if state.status != ConnectionStatus::Disconnected {
                    warn!("Removed from voice in guild {}", self.guild_id);
                }
                *state = BridgeState::default();
            }
        });
    }
}
