use crate::common::fixtures::{channel, guild, track, uri, user};
use crate::common::{Harness, settle};
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rezz::commands::music::utils::audio_node::{EndReason, NodeEvent};
use rezz::commands::music::utils::idle_watchdog::WatchdogState;
use rezz::commands::music::utils::session::EnqueueOutcome;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn an_exhausted_queue_disconnects_once_after_the_grace_window() {
    let harness = Harness::new();
    let session = harness.registry.get_or_create(guild());
    session.join(channel(), true).await.unwrap();
    session.enqueue(track("A"), user()).await.unwrap();

    harness
        .registry
        .dispatch(NodeEvent::track_ended(guild(), uri("A"), EndReason::Finished));
    settle().await;
    assert_eq!(session.watchdog_state(), WatchdogState::Armed);

    tokio::time::sleep(Duration::from_secs(59)).await;
    assert_eq!(harness.disconnects(), 0);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(harness.disconnects(), 1);
    assert!(harness.registry.is_empty());

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(harness.disconnects(), 1);
}

#[tokio::test(start_paused = true)]
async fn new_music_within_the_window_keeps_the_bot_around() {
    let harness = Harness::new();
    let session = harness.registry.get_or_create(guild());
    session.join(channel(), true).await.unwrap();
    session.enqueue(track("A"), user()).await.unwrap();

    harness
        .registry
        .dispatch(NodeEvent::track_ended(guild(), uri("A"), EndReason::Finished));
    settle().await;
    tokio::time::sleep(Duration::from_secs(30)).await;

    session.enqueue(track("B"), user()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(session.watchdog_state(), WatchdogState::Idle);
    assert_eq!(harness.disconnects(), 0);
    assert_eq!(harness.registry.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_does_not_start_the_idle_timer() {
    let harness = Harness::new();
    let session = harness.registry.get_or_create(guild());
    session.join(channel(), true).await.unwrap();
    session.enqueue(track("A"), user()).await.unwrap();

    session.stop().await.unwrap();
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(session.watchdog_state(), WatchdogState::Idle);
    assert_eq!(harness.disconnects(), 0);
}

#[tokio::test(start_paused = true)]
async fn a_track_starting_within_the_window_disarms_the_timer() {
    let harness = Harness::new();
    let session = harness.registry.get_or_create(guild());
    session.join(channel(), true).await.unwrap();
    session.enqueue(track("A"), user()).await.unwrap();

    harness
        .registry
        .dispatch(NodeEvent::track_ended(guild(), uri("A"), EndReason::Finished));
    settle().await;
    assert_eq!(session.watchdog_state(), WatchdogState::Armed);

    tokio::time::sleep(Duration::from_secs(30)).await;
    harness.registry.dispatch(NodeEvent::track_started(guild(), uri("A")));
    settle().await;
    assert_eq!(session.watchdog_state(), WatchdogState::Idle);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(harness.disconnects(), 0);
    assert_eq!(harness.registry.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn queue_ended_from_the_node_arms_the_timer() {
    let harness = Harness::new();
    let session = harness.registry.get_or_create(guild());
    session.join(channel(), true).await.unwrap();

    harness.registry.dispatch(NodeEvent::queue_ended(guild()));
    settle().await;
    assert_eq!(session.watchdog_state(), WatchdogState::Armed);

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(harness.disconnects(), 1);
    assert!(harness.registry.is_empty());
}

#[tokio::test(start_paused = true)]
async fn another_queue_end_restarts_the_window() {
    let harness = Harness::new();
    let session = harness.registry.get_or_create(guild());
    session.join(channel(), true).await.unwrap();

    harness.registry.dispatch(NodeEvent::queue_ended(guild()));
    settle().await;
    tokio::time::sleep(Duration::from_secs(40)).await;
    harness.registry.dispatch(NodeEvent::queue_ended(guild()));
    settle().await;

    // 80s after the first signal, 40s after the second
    tokio::time::sleep(Duration::from_secs(40)).await;
    assert_eq!(harness.disconnects(), 0);
    assert_eq!(session.watchdog_state(), WatchdogState::Armed);

    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(harness.disconnects(), 1);
}

#[tokio::test(start_paused = true)]
async fn a_failed_start_at_a_track_boundary_keeps_the_queue() {
    // A plays, B is refused once, everything after that plays
    let harness = Harness::refusing_plays(|attempt| attempt == 1);
    let session = harness.registry.get_or_create(guild());
    session.join(channel(), true).await.unwrap();
    for name in ["A", "B", "C"] {
        session.enqueue(track(name), user()).await.unwrap();
    }

    harness
        .registry
        .dispatch(NodeEvent::track_ended(guild(), uri("A"), EndReason::Finished));
    settle().await;
    assert_eq!(session.watchdog_state(), WatchdogState::Idle);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(harness.disconnects(), 0);
    assert_eq!(harness.registry.len(), 1);
    let titles: Vec<String> = session
        .page(1, 10)
        .await
        .unwrap()
        .tracks
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["B".to_string(), "C".to_string()]);

    let retried = session.enqueue(track("D"), user()).await.unwrap();
    assert_matches!(retried, EnqueueOutcome::Started(t) => assert_eq!(t.title, "B"));
    assert_eq!(harness.played(), vec![uri("A"), uri("B")]);
}
