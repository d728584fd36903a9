use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::MonitorError;

use super::config::MonitorConfig;
use super::enumerator::DeviceEnumerator;
use super::loop_worker::{enumerate_off_thread, monitor_loop};
use super::matcher::TargetMatcher;
use super::state::{ConnectionEvent, ConnectionState, ScanReport};

const EVENT_CAPACITY: usize = 16;

struct Worker {
    handle: Option<JoinHandle<()>>,
    /// Handed to the loop task on start; `None` once it has been spawned.
    state_tx: Option<watch::Sender<ConnectionState>>,
}

/// Owns the background poll task and hands out read-only views of its state.
#[derive(Clone)]
pub struct ConnectionMonitor {
    enumerator: Arc<dyn DeviceEnumerator>,
    matcher: TargetMatcher,
    config: MonitorConfig,
    state_rx: watch::Receiver<ConnectionState>,
    events_tx: broadcast::Sender<ConnectionEvent>,
    cancel_token: CancellationToken,
    worker: Arc<Mutex<Worker>>,
}

impl ConnectionMonitor {
    pub fn new(enumerator: Arc<dyn DeviceEnumerator>, config: MonitorConfig) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let matcher = TargetMatcher::new(&config.target_manufacturer, config.treat_empty_as_absent);

        Self {
            enumerator,
            matcher,
            config,
            state_rx,
            events_tx,
            cancel_token: CancellationToken::new(),
            worker: Arc::new(Mutex::new(Worker {
                handle: None,
                state_tx: Some(state_tx),
            })),
        }
    }

    /// Spawns the poll loop. The monitor can be started once.
    pub async fn start(&self) -> Result<()> {
        let mut worker = self.worker.lock().await;
        let Some(state_tx) = worker.state_tx.take() else {
            bail!("connection monitor already started");
        };

        let handle = tokio::spawn(monitor_loop(
            Arc::clone(&self.enumerator),
            self.matcher.clone(),
            self.config.clone(),
            state_tx,
            self.events_tx.clone(),
            self.cancel_token.clone(),
        ));
        worker.handle = Some(handle);
        Ok(())
    }

    /// Cancels the poll loop and waits for it to exit. Pending `await_state`
    /// calls resolve with [`MonitorError::Stopped`].
    pub async fn shutdown(&self) -> Result<()> {
        self.cancel_token.cancel();
        let mut worker = self.worker.lock().await;
        // Never started: dropping the sender releases any waiters.
        worker.state_tx.take();

        if let Some(handle) = worker.handle.take() {
            handle
                .await
                .context("connection monitor task failed to join")?;
            info!("connection monitor stopped");
        }
        Ok(())
    }

    /// Fires once the monitor is shutting down. Tasks that relay its events
    /// should stop with it.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn current(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Receives one event per confirmed transition from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events_tx.subscribe()
    }

    /// Suspends the caller until the monitored state equals `target`.
    /// Returns immediately if it already does.
    pub async fn await_state(&self, target: ConnectionState) -> Result<(), MonitorError> {
        let mut rx = self.state_rx.clone();
        rx.wait_for(|state| *state == target)
            .await
            .map(|_| ())
            .map_err(|_| MonitorError::Stopped)
    }

    /// Enumerates and matches once, outside the poll loop. Does not touch the
    /// published state.
    pub async fn scan_once(&self) -> Result<ScanReport, MonitorError> {
        let devices =
            enumerate_off_thread(Arc::clone(&self.enumerator), self.config.enumeration_timeout())
                .await?;
        let matched = self.matcher.match_target(&devices)?;
        Ok(ScanReport {
            devices,
            state: ConnectionState::from_matched(matched),
        })
    }
}
