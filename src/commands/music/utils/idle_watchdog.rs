//! Disconnects a session that stays silent for too long after its queue ran dry.

use serenity::async_trait;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::music_manager::MusicResult;

/// Something the watchdog can poll and, eventually, shut down.
#[async_trait]
pub trait IdleTarget: Send + Sync {
    /// Whether playback resumed since the watchdog was armed.
    async fn is_playing(&self) -> MusicResult<bool>;

    /// Called once when the grace window ran out without playback.
    async fn on_idle_timeout(&self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WatchdogState {
    #[default]
    Idle,
    Armed,
    Fired,
}

#[derive(Default)]
struct Inner {
    state: WatchdogState,
    // bumped on every arm/disarm so a superseded task cannot overwrite state
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// One-shot idle timer per session.
///
/// Re-arming restarts the grace window instead of stacking timers. The poll
/// task is aborted on disarm and when the watchdog is dropped.
pub struct IdleWatchdog {
    grace: Duration,
    poll_interval: Duration,
    inner: Arc<Mutex<Inner>>,
}

impl IdleWatchdog {
    pub fn new(grace: Duration, poll_interval: Duration) -> Self {
        Self {
            grace,
            poll_interval,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub fn state(&self) -> WatchdogState {
        lock(&self.inner).state
    }

    /// Start (or restart) the grace window for `target`
    pub fn arm(&self, target: Weak<dyn IdleTarget>) {
        let mut inner = lock(&self.inner);
        if let Some(task) = inner.task.take() {
            debug!("Restarting idle window");
            task.abort();
        }
        inner.generation += 1;
        inner.state = WatchdogState::Armed;

        let generation = inner.generation;
        let shared = Arc::clone(&self.inner);
        let grace = self.grace;
        let poll_interval = self.poll_interval;

        inner.task = Some(tokio::spawn(async move {
            watch(shared, generation, target, grace, poll_interval).await;
        }));
    }

    /// Cancel a pending window. Harmless when nothing is armed.
    pub fn disarm(&self) {
        let mut inner = lock(&self.inner);
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        if inner.state == WatchdogState::Armed {
            debug!("Idle watchdog disarmed");
            inner.generation += 1;
            inner.state = WatchdogState::Idle;
        }
    }
}

impl Drop for IdleWatchdog {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.inner).task.take() {
            task.abort();
        }
    }
}

fn lock(inner: &Mutex<Inner>) -> std::sync::MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Flip the state if `generation` is still current. Returns false when superseded.
fn settle(shared: &Mutex<Inner>, generation: u64, state: WatchdogState) -> bool {
    let mut inner = lock(shared);
    if inner.generation != generation {
        return false;
    }
    inner.state = state;
    inner.task = None;
    true
}

async fn watch(
    shared: Arc<Mutex<Inner>>,
    generation: u64,
    target: Weak<dyn IdleTarget>,
    grace: Duration,
    poll_interval: Duration,
) {
    let mut waited = Duration::ZERO;

    while waited < grace {
        tokio::time::sleep(poll_interval).await;
        waited += poll_interval;

        let Some(target) = target.upgrade() else {
            debug!("Idle target dropped while armed");
            settle(&shared, generation, WatchdogState::Idle);
            return;
        };

        match target.is_playing().await {
            Ok(true) => {
                debug!("Playback resumed after {:?}, disarming", waited);
                settle(&shared, generation, WatchdogState::Idle);
                return;
            }
            Ok(false) => {}
            Err(e) => warn!("Idle poll failed, retrying next tick: {}", e),
        }
    }

    if !settle(&shared, generation, WatchdogState::Fired) {
        return;
    }
    if let Some(target) = target.upgrade() {
        info!("No playback for {:?}, disconnecting", grace);
        target.on_idle_timeout().await;
    }
}
