//! Long-lived notification stream.
//!
//! The listener connects to the stream endpoint with the session token,
//! decodes server-sent frames into [`RealtimeEvent`]s and publishes them on
//! the [`EventBus`]. Dropped connections are retried with exponential
//! backoff; after too many consecutive failures the listener gives up and
//! tells the user.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use shared_types::{EventKind, RealtimeConfig, RealtimeEvent};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::bus::EventBus;
use crate::notify::{Notice, Notifier};
use crate::session::Session;
use crate::sse::SseDecoder;

pub const GAVE_UP_MESSAGE: &str =
    "Live updates are unavailable. Refresh the page to reconnect.";

/// Capped exponential backoff with a failure budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial: Duration,
    pub max: Duration,
    pub max_failures: u32,
}

impl ReconnectPolicy {
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self {
            initial: Duration::from_millis(config.initial_retry_ms),
            max: Duration::from_millis(config.max_retry_ms.max(config.initial_retry_ms)),
            max_failures: config.max_failures.max(1),
        }
    }

    /// Wait before the attempt that follows `failures` consecutive failures.
    pub fn delay_for(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(16);
        self.initial
            .saturating_mul(1u32 << exponent)
            .min(self.max)
    }

    pub fn exhausted(&self, failures: u32) -> bool {
        failures >= self.max_failures
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_config(&RealtimeConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerStatus {
    Connecting,
    Connected,
    /// Waiting to retry after `failures` consecutive failures.
    Reconnecting { failures: u32 },
    /// Failure budget spent; the user has been told.
    GaveUp,
    /// The server rejected the token.
    Unauthorized,
    Stopped,
}

impl ListenerStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ListenerStatus::GaveUp | ListenerStatus::Unauthorized | ListenerStatus::Stopped
        )
    }
}

/// What happened to one inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Delivered(EventKind),
    Ignored,
    Malformed,
}

/// Decode one frame and publish it when recognized. Unknown types and
/// malformed frames are logged and dropped.
pub fn dispatch_message(bus: &EventBus, data: &str) -> DispatchOutcome {
    match RealtimeEvent::decode(data) {
        Ok(Some(event)) => {
            let kind = event.kind();
            tracing::debug!(?kind, "realtime event received");
            bus.publish(event);
            DispatchOutcome::Delivered(kind)
        }
        Ok(None) => {
            tracing::info!(payload = %data, "ignoring realtime message of unrecognized type");
            DispatchOutcome::Ignored
        }
        Err(e) => {
            tracing::warn!(error = %e, payload = %data, "ignoring malformed realtime message");
            DispatchOutcome::Malformed
        }
    }
}

enum StreamEnd {
    /// Never connected.
    Failed,
    /// Connected, then the stream ended.
    Disconnected,
    Unauthorized,
}

struct ListenerTask {
    transport: reqwest::Client,
    url: String,
    session: Arc<Session>,
    bus: EventBus,
    notifier: Arc<dyn Notifier>,
    policy: ReconnectPolicy,
    status: watch::Sender<ListenerStatus>,
}

impl ListenerTask {
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut failures: u32 = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }
            self.status.send_replace(ListenerStatus::Connecting);

            let end = tokio::select! {
                end = self.stream_once() => end,
                _ = shutdown.changed() => break,
            };

            match end {
                StreamEnd::Unauthorized => {
                    tracing::warn!("realtime stream rejected the session token, stopping");
                    self.status.send_replace(ListenerStatus::Unauthorized);
                    return;
                }
                StreamEnd::Disconnected => failures = 1,
                StreamEnd::Failed => failures += 1,
            }

            if self.policy.exhausted(failures) {
                tracing::error!(failures, "realtime stream unavailable, giving up");
                self.status.send_replace(ListenerStatus::GaveUp);
                self.notifier.notify(Notice::error(GAVE_UP_MESSAGE));
                return;
            }

            let delay = self.policy.delay_for(failures);
            tracing::info!(
                failures,
                delay_ms = delay.as_millis() as u64,
                "reconnecting realtime stream"
            );
            self.status
                .send_replace(ListenerStatus::Reconnecting { failures });
            tokio::select! {
                _ = sleep(delay) => {},
                _ = shutdown.changed() => break,
            }
        }

        self.status.send_replace(ListenerStatus::Stopped);
    }

    async fn stream_once(&self) -> StreamEnd {
        let Some(token) = self.session.token() else {
            return StreamEnd::Unauthorized;
        };

        let response = match self
            .transport
            .get(&self.url)
            .query(&[("token", token.as_str())])
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "realtime connection failed");
                return StreamEnd::Failed;
            }
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return StreamEnd::Unauthorized;
        }
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "realtime endpoint refused connection");
            return StreamEnd::Failed;
        }

        tracing::info!("realtime stream connected");
        self.status.send_replace(ListenerStatus::Connected);

        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => {
                    for frame in decoder.feed(&bytes) {
                        dispatch_message(&self.bus, &frame.data);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "realtime stream interrupted");
                    break;
                }
            }
        }
        StreamEnd::Disconnected
    }
}

/// Handle to a running listener task.
pub struct RealtimeListener {
    status: watch::Receiver<ListenerStatus>,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl RealtimeListener {
    /// Start listening on `url`. Must be called inside a Tokio runtime.
    pub fn spawn(
        transport: reqwest::Client,
        url: String,
        session: Arc<Session>,
        bus: EventBus,
        notifier: Arc<dyn Notifier>,
        policy: ReconnectPolicy,
    ) -> Self {
        let (status_tx, status_rx) = watch::channel(ListenerStatus::Connecting);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = ListenerTask {
            transport,
            url,
            session,
            bus,
            notifier,
            policy,
            status: status_tx,
        };
        let handle = tokio::spawn(task.run(shutdown_rx));
        Self {
            status: status_rx,
            shutdown: shutdown_tx,
            handle,
        }
    }

    pub fn status(&self) -> ListenerStatus {
        *self.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<ListenerStatus> {
        self.status.clone()
    }

    /// Wait until the status satisfies `pred`, or the task ends.
    pub async fn wait_for(&self, pred: impl Fn(&ListenerStatus) -> bool) -> ListenerStatus {
        let mut rx = self.status.clone();
        let reached = rx.wait_for(|s| pred(s)).await.map(|status| *status);
        reached.unwrap_or_else(|_| *self.status.borrow())
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the task and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "realtime listener task failed");
        }
    }
}
