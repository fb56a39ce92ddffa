use serenity::all::{Context, EventHandler, Ready, VoiceServerUpdateEvent, VoiceState};
use serenity::async_trait;
use serenity::model::id::{GuildId, UserId};
use tracing::{debug, info, warn};

use crate::commands::music::utils::audio_node::{VoiceUpdate, VoiceUpdateKind};
use crate::commands::music::utils::music_manager::SessionRegistry;

/// Relays the gateway's voice events to the playback sessions
pub struct Handler {
    registry: SessionRegistry,
}

impl Handler {
    pub fn new(registry: SessionRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected to {} guilds", ready.user.name, ready.guilds.len());
    }

    async fn voice_server_update(&self, _ctx: Context, event: VoiceServerUpdateEvent) {
        let Some(guild_id) = event.guild_id else {
            return;
        };
        match serde_json::to_value(&event) {
            Ok(payload) => {
                let update = VoiceUpdate {
                    kind: VoiceUpdateKind::ServerUpdate,
                    payload,
                };
                self.registry.relay_voice_update(guild_id, update).await;
            }
            Err(e) => warn!("Could not encode voice server update: {}", e),
        }
    }

    async fn voice_state_update(&self, ctx: Context, _old: Option<VoiceState>, new: VoiceState) {
        let bot_id = ctx.cache.current_user().id;
        if let Some((guild_id, update)) = own_state_update(bot_id, &new) {
            self.registry.relay_voice_update(guild_id, update).await;
        }
    }
}

/// A voice state update about the bot itself, ready to relay.
pub fn own_state_update(bot_id: UserId, state: &VoiceState) -> Option<(GuildId, VoiceUpdate)> {
    if state.user_id != bot_id {
        return None;
    }
    let guild_id = state.guild_id?;
    match serde_json::to_value(state) {
        Ok(payload) => Some((
            guild_id,
            VoiceUpdate {
                kind: VoiceUpdateKind::StateUpdate,
                payload,
            },
        )),
        Err(e) => {
            debug!("Could not encode voice state update: {}", e);
            None
        }
    }
}
