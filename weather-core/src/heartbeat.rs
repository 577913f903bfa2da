//! Periodic liveness probe against the API health endpoint.
//!
//! The heartbeat owns a single task that polls sequentially: a tick starts
//! only after the previous poll settled. State is published through a
//! `watch` channel, so the task is the only writer.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::{fmt, sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tokio_util::sync::CancellationToken;

use crate::{client::HealthProbe, model::HealthResponse};

pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthStatus {
    #[default]
    Unknown,
    Healthy,
    Degraded,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Unknown => "unknown",
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last known health of the API.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HealthState {
    pub status: HealthStatus,
    pub last_checked: Option<DateTime<Utc>>,
    pub details: Option<HealthResponse>,
}

impl HealthState {
    fn after_poll(&self, result: Option<HealthResponse>) -> Self {
        let status = if result.is_some() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };

        Self {
            status,
            last_checked: Some(next_stamp(self.last_checked, Utc::now())),
            details: result,
        }
    }
}

/// Keeps `last_checked` strictly increasing even if the wall clock stalls or
/// steps backwards between polls.
fn next_stamp(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match previous {
        Some(prev) if now <= prev => prev + ChronoDuration::milliseconds(1),
        _ => now,
    }
}

/// Spawns heartbeat tasks.
pub struct Heartbeat;

impl Heartbeat {
    /// Start polling `probe`: once immediately, then every `every`.
    ///
    /// Must be called from within a tokio runtime. A zero `every` falls back
    /// to [`DEFAULT_HEARTBEAT_INTERVAL`].
    pub fn spawn(probe: Arc<dyn HealthProbe>, every: Duration) -> HeartbeatHandle {
        let every = if every.is_zero() {
            tracing::warn!("zero heartbeat interval, using {DEFAULT_HEARTBEAT_INTERVAL:?}");
            DEFAULT_HEARTBEAT_INTERVAL
        } else {
            every
        };
        let (tx, rx) = watch::channel(HealthState::default());
        let shutdown = CancellationToken::new();

        let task = tokio::spawn(run(probe, every, tx, shutdown.clone()));
        tracing::info!(interval = ?every, "heartbeat started");

        HeartbeatHandle {
            state: rx,
            shutdown,
            task: Some(task),
        }
    }
}

async fn run(
    probe: Arc<dyn HealthProbe>,
    every: Duration,
    tx: watch::Sender<HealthState>,
    shutdown: CancellationToken,
) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let poll = shutdown.child_token();
        let result = probe.check(&poll).await;

        if shutdown.is_cancelled() {
            tracing::debug!("heartbeat stopped mid-poll, discarding result");
            break;
        }

        let details = match result {
            Ok(details) => Some(details),
            Err(err) => {
                tracing::warn!(code = err.code(), status = ?err.status(), "Health check failed: {err}");
                None
            }
        };

        tx.send_modify(|state| *state = state.after_poll(details));
        tracing::debug!(status = %tx.borrow().status, "heartbeat tick");
    }
}

/// Handle to a running heartbeat. Dropping it stops the heartbeat.
#[derive(Debug)]
pub struct HeartbeatHandle {
    state: watch::Receiver<HealthState>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl HeartbeatHandle {
    pub fn current(&self) -> HealthState {
        self.state.borrow().clone()
    }

    /// Receiver notified after every completed poll.
    pub fn subscribe(&self) -> watch::Receiver<HealthState> {
        self.state.clone()
    }

    /// Cancel the in-flight poll, stop the ticker and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!("heartbeat task ended abnormally: {err}");
            }
        }
        tracing::info!("heartbeat stopped");
    }
}

impl Drop for HeartbeatHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
