use serenity::async_trait;
use serenity::model::id::GuildId;
use songbird::tracks::PlayMode;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::audio_node::{EndReason, NodeEvent};
use super::music_manager::SessionRegistry;

/// Turns songbird track events into `NodeEvent`s for the session registry
pub struct TrackEventRelay {
    pub guild_id: GuildId,
    pub uri: String,
    pub events: mpsc::UnboundedSender<NodeEvent>,
}

impl TrackEventRelay {
    fn send(&self, event: NodeEvent) {
        if self.events.send(event).is_err() {
            warn!("Node event channel closed, dropping event for guild {}", self.guild_id);
        }
    }
}

#[async_trait]
impl songbird::EventHandler for TrackEventRelay {
    async fn act(&self, ctx: &songbird::EventContext<'_>) -> Option<songbird::Event> {
        let songbird::EventContext::Track(tracks) = ctx else {
            return None;
        };

        for (state, _handle) in tracks.iter() {
            let event = match &state.playing {
                PlayMode::Play => NodeEvent::track_started(self.guild_id, &self.uri),
                PlayMode::End => {
                    NodeEvent::track_ended(self.guild_id, &self.uri, EndReason::Finished)
                }
                PlayMode::Errored(e) => {
                    warn!("Track {} errored in guild {}: {}", self.uri, self.guild_id, e);
                    NodeEvent::track_ended(self.guild_id, &self.uri, EndReason::LoadFailed)
                }
                PlayMode::Stop => NodeEvent::track_ended(self.guild_id, &self.uri, EndReason::Stopped),
                _ => continue,
            };
            self.send(event);
        }
        None
    }
}

/// Route node events to their sessions until every sender is gone
pub async fn run_node_events(registry: SessionRegistry, mut events: mpsc::UnboundedReceiver<NodeEvent>) {
    info!("Node event loop started");
    while let Some(event) = events.recv().await {
        debug!("Node event for guild {}: {:?}", event.guild_id, event.kind);
        registry.dispatch(event);
    }
    info!("Node event loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::music::audio_sources::track_metadata::TrackInfo;
    use crate::commands::music::utils::audio_node::{MockAudioNode, MockVoiceGateway};
    use crate::commands::music::utils::music_manager::SessionSettings;
    use pretty_assertions::assert_eq;
    use serenity::model::id::{ChannelId, UserId};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn finished_tracks_advance_their_session() {
        let played = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&played);
        let mut node = MockAudioNode::new();
        node.expect_play().returning(move |_, track| {
            log.lock().unwrap().push(track.title.clone());
            Ok(())
        });
        let mut gateway = MockVoiceGateway::new();
        gateway.expect_connect_voice().returning(|_, _, _, _| Ok(()));

        let registry = SessionRegistry::new(Arc::new(node), Arc::new(gateway), SessionSettings::default());
        let guild = GuildId::new(7);
        let session = registry.get_or_create(guild);
        session.join(ChannelId::new(8), true).await.unwrap();
        for title in ["A", "B"] {
            let info = TrackInfo::new(title, format!("https://example.com/{title}"), 1_000);
            session.enqueue(info, UserId::new(9)).await.unwrap();
        }

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(NodeEvent::track_ended(guild, "https://example.com/A", EndReason::Finished)).unwrap();
        tx.send(NodeEvent::track_ended(GuildId::new(99), "https://example.com/X", EndReason::Finished))
            .unwrap();
        drop(tx);

        run_node_events(registry.clone(), rx).await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(*played.lock().unwrap(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(registry.len(), 1);
    }
}
