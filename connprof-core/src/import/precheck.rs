//! Optional connectivity precheck.
//!
//! Probes every non-skipped row's endpoint before commit. Probes run on a
//! small bounded worker pool so a large batch is not serialized behind
//! network latency, and each probe carries its own timeout so a hung host
//! cannot stall the batch. A failed or timed-out probe overrides the row's
//! disposition with `conn-test-failed`; a successful probe leaves it
//! untouched.
//!
//! Conflict resolution completes before this stage starts, so name state is
//! read-only here and each row is mutated by at most one worker.

use std::collections::HashMap;
use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;

use crate::models::ProfileInfo;

use super::row::{PlannedRow, SkipReason};

/// Default number of concurrent probes.
pub const DEFAULT_PRECHECK_CONCURRENCY: usize = 4;

/// Default per-probe timeout.
pub const DEFAULT_PRECHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// A failed connectivity probe.
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct ProbeFailure {
    /// Human-readable failure description.
    pub reason: String,
}

impl ProbeFailure {
    /// Creates a probe failure with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// External connectivity test invoked per row.
///
/// The planner only consumes pass/fail; how the endpoint is probed (TCP,
/// SSH, authenticated login) is the implementor's concern.
#[async_trait]
pub trait ConnectivityTester: Send + Sync {
    /// Tests whether the profile's endpoint is reachable.
    async fn test(&self, profile: &ProfileInfo) -> Result<(), ProbeFailure>;
}

/// Options for a precheck run.
#[derive(Debug, Clone)]
pub struct PrecheckOptions {
    /// Maximum number of concurrent probes.
    pub concurrency: usize,
    /// Timeout applied to each probe individually.
    pub timeout: Duration,
}

impl Default for PrecheckOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_PRECHECK_CONCURRENCY,
            timeout: DEFAULT_PRECHECK_TIMEOUT,
        }
    }
}

/// Handle for cancelling an in-progress precheck from another context.
///
/// Probes that finished before the signal keep their result; probes still
/// waiting for a worker slot or in flight are stopped and marked skipped
/// with the `cancelled` reason, never left pending.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancelled: Arc<watch::Sender<bool>>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            cancelled: Arc::new(tx),
        }
    }
}

impl CancelHandle {
    /// Creates a fresh, non-cancelled handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation.
    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    /// Returns true if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Resolves once cancellation has been requested, however long ago.
    async fn cancelled(&self) {
        let mut rx = self.cancelled.subscribe();
        // wait_for tests the current value first, so a signal sent before
        // this call resolves immediately
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

enum ProbeOutcome {
    Passed,
    Failed(String),
    Cancelled,
}

/// Runs the connectivity precheck over a resolved plan.
///
/// Already-skipped rows are never probed. The returned rows are the input
/// rows with failed probes converted to `conn-test-failed` skips. On
/// cancellation, probes that already finished keep their result and every
/// other probed row comes back `cancelled`; the call returns without
/// waiting out per-probe timeouts.
pub async fn precheck(
    mut rows: Vec<PlannedRow>,
    tester: Arc<dyn ConnectivityTester>,
    options: &PrecheckOptions,
    cancel: Option<&CancelHandle>,
) -> Vec<PlannedRow> {
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let mut probes: JoinSet<(usize, ProbeOutcome)> = JoinSet::new();
    let mut probe_rows: HashMap<tokio::task::Id, usize> = HashMap::new();

    for (idx, row) in rows.iter().enumerate() {
        if row.is_skipped() {
            continue;
        }

        let profile = row.profile.clone();
        let semaphore = Arc::clone(&semaphore);
        let tester = Arc::clone(&tester);
        let timeout = options.timeout;

        let handle = probes.spawn(async move {
            // The driver closes the semaphore on cancellation, which ends
            // probes still waiting for a slot here.
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return (idx, ProbeOutcome::Cancelled);
            };

            match tokio::time::timeout(timeout, tester.test(&profile)).await {
                Ok(Ok(())) => (idx, ProbeOutcome::Passed),
                Ok(Err(failure)) => (idx, ProbeOutcome::Failed(failure.reason)),
                Err(_) => (idx, ProbeOutcome::Failed("connection test timed out".to_string())),
            }
        });
        probe_rows.insert(handle.id(), idx);
    }

    // A handle that never fires stands in when the caller passed none, so
    // the drain loop below has a single shape.
    let cancel = cancel.cloned().unwrap_or_default();
    let mut cancel_seen = false;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled(), if !cancel_seen => {
                cancel_seen = true;
                tracing::info!("connectivity precheck cancelled");
                // Unblock waiting probes and stop in-flight ones; probes
                // that already finished keep their result.
                semaphore.close();
                probes.abort_all();
            }
            joined = probes.join_next() => {
                let Some(joined) = joined else { break };
                match joined {
                    Ok((idx, ProbeOutcome::Passed)) => {
                        tracing::debug!(row = rows[idx].row_num, name = %rows[idx].planned_name, "connectivity ok");
                    }
                    Ok((idx, ProbeOutcome::Failed(reason))) => {
                        tracing::warn!(
                            row = rows[idx].row_num,
                            name = %rows[idx].planned_name,
                            %reason,
                            "connectivity test failed"
                        );
                        rows[idx].mark_skipped(SkipReason::ConnTestFailed);
                    }
                    Ok((idx, ProbeOutcome::Cancelled)) => {
                        rows[idx].mark_skipped(SkipReason::Cancelled);
                    }
                    Err(e) => {
                        let Some(&idx) = probe_rows.get(&e.id()) else { continue };
                        if e.is_cancelled() {
                            rows[idx].mark_skipped(SkipReason::Cancelled);
                        } else {
                            // A crashed probe must never pass for a
                            // successful one.
                            tracing::warn!(row = rows[idx].row_num, error = %e, "connectivity probe crashed");
                            rows[idx].mark_skipped(SkipReason::ConnTestFailed);
                        }
                    }
                }
            }
        }
    }

    rows
}

/// Connectivity tester that probes the database endpoint over plain TCP.
///
/// Fast reachability feedback without a full database handshake; DNS
/// resolution failures and refused connections both count as failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnectivityTester;

#[async_trait]
impl ConnectivityTester for TcpConnectivityTester {
    async fn test(&self, profile: &ProfileInfo) -> Result<(), ProbeFailure> {
        let (host, port) = profile.endpoint();
        let addr_str = format!("{host}:{port}");

        // Resolution is blocking, but fast
        let addrs: Vec<std::net::SocketAddr> = addr_str
            .to_socket_addrs()
            .map_err(|e| ProbeFailure::new(format!("failed to resolve '{host}': {e}")))?
            .collect();

        if addrs.is_empty() {
            return Err(ProbeFailure::new(format!("no addresses found for '{host}'")));
        }

        let mut last_error = String::new();
        for addr in addrs {
            match tokio::net::TcpStream::connect(addr).await {
                Ok(_stream) => return Ok(()),
                Err(e) => last_error = e.to_string(),
            }
        }

        Err(ProbeFailure::new(format!(
            "port {port} on '{host}' is not reachable: {last_error}"
        )))
    }
}
