//! Common test utilities, fixtures, and mocks shared by the integration tests

pub mod fixtures;
pub mod mocks;

use rezz::commands::music::utils::music_manager::{SessionRegistry, SessionSettings};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mocks::{MockGateway, MockNode};

/// A registry wired to recording mocks
pub struct Harness {
    pub registry: SessionRegistry,
    /// Uris handed to `AudioNode::play`, in order
    pub played: Arc<Mutex<Vec<String>>>,
    /// How often the gateway was asked to leave voice
    pub disconnects: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_failing_plays(0)
    }

    /// A harness whose node refuses the first `failures` play requests
    pub fn with_failing_plays(failures: usize) -> Self {
        Self::refusing_plays(move |attempt| attempt < failures)
    }

    /// A harness whose node refuses the play attempts `refuse` picks, counted from 0
    pub fn refusing_plays(refuse: impl Fn(usize) -> bool + Send + 'static) -> Self {
        let played = Arc::new(Mutex::new(Vec::new()));
        let disconnects = Arc::new(AtomicUsize::new(0));

        let mut node = MockNode::new();
        mocks::record_plays(&mut node, Arc::clone(&played), refuse);

        let gateway: MockGateway = mocks::counting_gateway(Arc::clone(&disconnects));
        let registry = SessionRegistry::new(Arc::new(node), Arc::new(gateway), SessionSettings::default());

        Self {
            registry,
            played,
            disconnects,
        }
    }

    pub fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

/// Let spawned session tasks drain their queues
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}
