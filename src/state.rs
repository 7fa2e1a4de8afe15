use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{broadcast, RwLock};

use crate::config::Config;
use crate::engine::{
    EngineConfig, EngineError, MetricEmitter, SessionConfig, SessionHandle, SessionReport,
};

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    engine_config: Arc<EngineConfig>,
    emitter: MetricEmitter,
    session: Arc<RwLock<Option<SessionHandle>>>,
    sse_connections: Arc<AtomicUsize>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: &Config, shutdown_tx: broadcast::Sender<()>) -> Self {
        let engine_config = EngineConfig::from_env(&config.engine);
        let emitter = MetricEmitter::new(engine_config.snapshot_capacity.max(1));
        Self {
            config: Arc::new(config.clone()),
            engine_config: Arc::new(engine_config),
            emitter,
            session: Arc::new(RwLock::new(None)),
            sse_connections: Arc::new(AtomicUsize::new(0)),
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine_config(&self) -> &EngineConfig {
        &self.engine_config
    }

    pub fn emitter(&self) -> &MetricEmitter {
        &self.emitter
    }

    pub fn session(&self) -> &RwLock<Option<SessionHandle>> {
        &self.session
    }

    /// Start a fresh session, stopping any running one first.
    /// Returns the replaced session's final report, if there was one.
    pub async fn start_session(&self, config: SessionConfig) -> (String, Option<SessionReport>) {
        let mut slot = self.session.write().await;
        let previous = match slot.take() {
            Some(handle) => handle.stop().await.ok(),
            None => None,
        };
        let handle = SessionHandle::spawn(config, self.engine_config.clone(), self.emitter.clone());
        let id = handle.id().to_string();
        *slot = Some(handle);
        (id, previous)
    }

    /// Stop the running session. `Ok(None)` when nothing was running.
    pub async fn stop_session(&self) -> Result<Option<SessionReport>, EngineError> {
        let handle = self.session.write().await.take();
        match handle {
            Some(handle) => handle.stop().await.map(Some),
            None => Ok(None),
        }
    }

    /// Open metric event streams on this instance.
    pub fn sse_connections(&self) -> &Arc<AtomicUsize> {
        &self.sse_connections
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn shutdown_tx(&self) -> &broadcast::Sender<()> {
        &self.shutdown_tx
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
