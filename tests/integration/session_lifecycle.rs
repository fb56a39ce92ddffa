use crate::common::fixtures::{channel, guild, other_channel, track, uri, user};
use crate::common::{Harness, settle};
use assert_matches::assert_matches;
use futures::future::join_all;
use pretty_assertions::assert_eq;
use rezz::commands::music::utils::audio_node::{EndReason, NodeEvent, VoiceUpdate, VoiceUpdateKind};
use rezz::commands::music::utils::music_manager::MusicError;
use rezz::commands::music::utils::queue_manager::LoopMode;
use rezz::commands::music::utils::session::EnqueueOutcome;
use serde_json::json;

fn finished(name: &str) -> NodeEvent {
    NodeEvent::track_ended(guild(), uri(name), EndReason::Finished)
}

#[tokio::test(start_paused = true)]
async fn first_track_starts_and_the_rest_queue_up() {
    let harness = Harness::new();
    let session = harness.registry.get_or_create(guild());
    session.join(channel(), true).await.unwrap();

    let first = session.enqueue(track("A"), user()).await.unwrap();
    let second = session.enqueue(track("B"), user()).await.unwrap();

    assert_matches!(first, EnqueueOutcome::Started(t) => assert_eq!(t.title, "A"));
    assert_matches!(second, EnqueueOutcome::Queued { position: 1, .. });
    assert_eq!(harness.played(), vec![uri("A")]);
}

#[tokio::test(start_paused = true)]
async fn queue_loop_cycles_through_every_track() {
    let harness = Harness::new();
    let session = harness.registry.get_or_create(guild());
    session.join(channel(), true).await.unwrap();
    session.enqueue(track("A"), user()).await.unwrap();
    session.enqueue(track("B"), user()).await.unwrap();
    session.set_loop(LoopMode::Queue).await.unwrap();

    harness.registry.dispatch(finished("A"));
    settle().await;
    harness.registry.dispatch(finished("B"));
    settle().await;

    assert_eq!(harness.played(), vec![uri("A"), uri("B"), uri("A")]);
    let page = session.page(1, 10).await.unwrap();
    assert_eq!(page.tracks[0].title, "B");
}

#[tokio::test(start_paused = true)]
async fn track_loop_replays_until_the_track_fails() {
    let harness = Harness::new();
    let session = harness.registry.get_or_create(guild());
    session.join(channel(), true).await.unwrap();
    session.enqueue(track("A"), user()).await.unwrap();
    session.enqueue(track("B"), user()).await.unwrap();
    session.set_loop(LoopMode::Track).await.unwrap();

    harness.registry.dispatch(finished("A"));
    settle().await;
    harness
        .registry
        .dispatch(NodeEvent::track_ended(guild(), uri("A"), EndReason::LoadFailed));
    settle().await;

    assert_eq!(harness.played(), vec![uri("A"), uri("A"), uri("B")]);
}

#[tokio::test(start_paused = true)]
async fn stale_and_stopped_track_ends_are_ignored() {
    let harness = Harness::new();
    let session = harness.registry.get_or_create(guild());
    session.join(channel(), true).await.unwrap();
    session.enqueue(track("A"), user()).await.unwrap();
    session.enqueue(track("B"), user()).await.unwrap();

    harness.registry.dispatch(finished("Z"));
    harness
        .registry
        .dispatch(NodeEvent::track_ended(guild(), uri("A"), EndReason::Stopped));
    harness
        .registry
        .dispatch(NodeEvent::track_ended(guild(), uri("A"), EndReason::Replaced));
    settle().await;

    assert_eq!(harness.played(), vec![uri("A")]);
}

#[tokio::test(start_paused = true)]
async fn skipping_several_tracks_never_plays_the_skipped_ones() {
    let harness = Harness::new();
    let session = harness.registry.get_or_create(guild());
    session.join(channel(), true).await.unwrap();
    for name in ["A", "B", "C", "D"] {
        session.enqueue(track(name), user()).await.unwrap();
    }

    let now = session.skip(2).await.unwrap();

    assert_eq!(now.map(|t| t.title), Some("C".to_string()));
    assert_eq!(harness.played(), vec![uri("A"), uri("C")]);
    assert_eq!(session.skip(0).await.unwrap_err(), MusicError::InvalidArgument(
        "Please use a value bigger than or equal to 1".to_string()
    ));
}

#[tokio::test(start_paused = true)]
async fn node_failure_leaves_the_session_usable() {
    let harness = Harness::with_failing_plays(1);
    let session = harness.registry.get_or_create(guild());
    session.join(channel(), true).await.unwrap();

    assert_matches!(
        session.enqueue(track("A"), user()).await,
        Err(MusicError::NodeUnavailable(_))
    );
    let retried = session.enqueue(track("B"), user()).await.unwrap();

    assert_matches!(retried, EnqueueOutcome::Started(t) => assert_eq!(t.title, "A"));
    assert_eq!(harness.played(), vec![uri("A")]);
    assert_eq!(session.page(1, 10).await.unwrap().tracks.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn leave_requires_the_same_channel() {
    let harness = Harness::new();
    let session = harness.registry.get_or_create(guild());
    session.join(channel(), true).await.unwrap();
    session.enqueue(track("A"), user()).await.unwrap();

    assert_eq!(
        session.leave(Some(other_channel())).await,
        Err(MusicError::ChannelMismatch)
    );
    assert_eq!(harness.disconnects(), 0);

    session.leave(Some(channel())).await.unwrap();

    assert_eq!(harness.disconnects(), 1);
    assert!(harness.registry.get(guild()).is_none());
    assert_eq!(session.now_playing().await, Ok(None));
}

#[tokio::test(start_paused = true)]
async fn being_kicked_from_voice_tears_the_session_down() {
    let harness = Harness::new();
    let session = harness.registry.get_or_create(guild());
    session.join(channel(), true).await.unwrap();
    session.enqueue(track("A"), user()).await.unwrap();

    harness
        .registry
        .relay_voice_update(
            guild(),
            VoiceUpdate {
                kind: VoiceUpdateKind::StateUpdate,
                payload: json!({ "guild_id": "1", "channel_id": null, "session_id": "s" }),
            },
        )
        .await;
    settle().await;

    assert!(harness.registry.is_empty());
    assert_eq!(session.bound_channel(), None);
}

#[tokio::test(start_paused = true)]
async fn sessions_in_different_guilds_are_independent() {
    let harness = Harness::new();
    let first = harness.registry.get_or_create(guild());
    let second = harness
        .registry
        .get_or_create(serenity::model::id::GuildId::new(42));

    first.join(channel(), true).await.unwrap();
    first.set_loop(LoopMode::Track).await.unwrap();

    assert_eq!(second.loop_mode().await, Ok(LoopMode::Off));
    assert_eq!(second.bound_channel(), None);
    assert_eq!(harness.registry.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_enqueues_are_serialized() {
    let harness = Harness::new();
    let session = harness.registry.get_or_create(guild());
    tokio_test::assert_ok!(session.join(channel(), true).await);

    let names: Vec<String> = (0..8).map(|i| format!("T{i}")).collect();
    let outcomes = join_all(names.iter().map(|name| session.enqueue(track(name), user()))).await;

    let started = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Ok(EnqueueOutcome::Started(_))))
        .count();
    let mut positions: Vec<usize> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            Ok(EnqueueOutcome::Queued { position, .. }) => Some(*position),
            _ => None,
        })
        .collect();
    positions.sort_unstable();

    assert_eq!(started, 1);
    assert_eq!(positions, (1..=7).collect::<Vec<_>>());
    assert_eq!(harness.played().len(), 1);
}
