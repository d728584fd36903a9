use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::MonitorError;

use super::config::MonitorConfig;
use super::enumerator::DeviceEnumerator;
use super::matcher::TargetMatcher;
use super::state::{ConnectionEvent, ConnectionState, DeviceDescriptor};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Drives enumeration until `cancel_token` fires. This task is the only writer
/// of the connection state; every confirmed transition is also broadcast.
pub async fn monitor_loop(
    enumerator: Arc<dyn DeviceEnumerator>,
    matcher: TargetMatcher,
    config: MonitorConfig,
    state_tx: watch::Sender<ConnectionState>,
    events_tx: broadcast::Sender<ConnectionEvent>,
    cancel_token: CancellationToken,
) {
    let mut failures: u32 = 0;
    let mut polls: u64 = 0;
    let mut query = HostQuery::new(enumerator);

    log_info!(
        "connection monitor started (target={:?}, interval={}ms)",
        matcher.target(),
        config.poll_interval_ms
    );

    loop {
        let delay = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("connection monitor shutting down");
                break;
            }
            result = poll_once(&mut query, &matcher, config.enumeration_timeout()) => {
                polls += 1;
                match result {
                    Ok(observed) => {
                        failures = 0;
                        publish(&state_tx, &events_tx, observed);
                        log_debug!("poll #{polls}: {observed:?}");
                        config.poll_interval()
                    }
                    Err(err) => {
                        failures = failures.saturating_add(1);
                        let delay = config.backoff_delay(failures);
                        log_warn!(
                            "poll #{polls} failed ({failures} in a row), retrying in {}ms: {err}",
                            delay.as_millis()
                        );
                        delay
                    }
                }
            }
        };

        tokio::select! {
            _ = cancel_token.cancelled() => {
                log_info!("connection monitor shutting down");
                break;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

async fn poll_once(
    query: &mut HostQuery,
    matcher: &TargetMatcher,
    timeout: Duration,
) -> Result<ConnectionState, MonitorError> {
    let devices = query.run(timeout).await?;
    let matched = matcher.match_target(&devices)?;
    Ok(ConnectionState::from_matched(matched))
}

type EnumerationResult = Result<Vec<DeviceDescriptor>, MonitorError>;

/// Host query on the blocking pool. A query that missed its deadline is kept
/// and awaited again on the next run instead of starting another one, so a
/// hung host call ties up at most one blocking thread.
pub(crate) struct HostQuery {
    enumerator: Arc<dyn DeviceEnumerator>,
    in_flight: Option<JoinHandle<EnumerationResult>>,
}

impl HostQuery {
    pub(crate) fn new(enumerator: Arc<dyn DeviceEnumerator>) -> Self {
        Self {
            enumerator,
            in_flight: None,
        }
    }

    pub(crate) async fn run(&mut self, timeout: Duration) -> EnumerationResult {
        let mut worker = match self.in_flight.take() {
            Some(worker) => {
                log_debug!("previous host query still running, waiting on it");
                worker
            }
            None => {
                let enumerator = Arc::clone(&self.enumerator);
                tokio::task::spawn_blocking(move || enumerator.enumerate())
            }
        };

        match tokio::time::timeout(timeout, &mut worker).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(MonitorError::Enumeration(format!(
                "enumeration worker join failed: {join_err}"
            ))),
            Err(_) => {
                self.in_flight = Some(worker);
                Err(MonitorError::Enumeration(format!(
                    "no answer from host within {}ms",
                    timeout.as_millis()
                )))
            }
        }
    }
}

/// One-off host query with a deadline.
pub(crate) async fn enumerate_off_thread(
    enumerator: Arc<dyn DeviceEnumerator>,
    timeout: Duration,
) -> EnumerationResult {
    HostQuery::new(enumerator).run(timeout).await
}

/// Stores `observed` and broadcasts it, but only when it differs from the
/// current state.
fn publish(
    state_tx: &watch::Sender<ConnectionState>,
    events_tx: &broadcast::Sender<ConnectionEvent>,
    observed: ConnectionState,
) -> bool {
    let changed = state_tx.send_if_modified(|current| {
        if *current == observed {
            return false;
        }
        *current = observed;
        true
    });

    if changed {
        let label = if observed.is_connected() {
            "connected"
        } else {
            "disconnected"
        };
        log_info!("microcontroller {label}");
        // No subscribers is fine; the watch channel still holds the state.
        let _ = events_tx.send(observed.into());
    }

    changed
}
