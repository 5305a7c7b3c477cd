//! Change notifications for settings forms.
//!
//! Views subscribe to a [`ChangeNotifier`] instead of relying on implicit
//! re-rendering. Each notification carries a sequential identifier and an
//! emission timestamp. Internally it uses `tokio::broadcast` with a bounded
//! buffer; slow subscribers skip the oldest notifications rather than stalling
//! the form.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::{Receiver, Sender};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

/// Identifier assigned to each notification.
pub type ChangeId = u64;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Typed notifications emitted by the draft store and the submit coordinator.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettingsEvent {
    /// A field received a local edit.
    FieldChanged {
        /// Edited field.
        field: String,
    },
    /// A local edit was dropped without saving.
    FieldDiscarded {
        /// Field whose draft was dropped.
        field: String,
    },
    /// A fresh server snapshot was applied.
    Reconciled {
        /// Number of fields in the snapshot.
        fields: usize,
        /// Number of fields still shadowed by drafts.
        dirty: usize,
    },
    /// A snapshot request was issued.
    RequestStarted,
    /// A snapshot request resolved.
    RequestFinished {
        /// Whether the request succeeded.
        ok: bool,
    },
    /// A save request was issued.
    SaveStarted {
        /// Fields included in the payload.
        fields: Vec<String>,
    },
    /// A save request was confirmed.
    SaveSucceeded {
        /// Fields whose drafts were cleared.
        saved: Vec<String>,
        /// Payload fields edited again while the request was in flight.
        still_dirty: Vec<String>,
    },
    /// A save request failed; drafts were preserved.
    SaveFailed {
        /// Fields included in the failed payload.
        fields: Vec<String>,
        /// Transport failure detail.
        message: String,
    },
    /// The form was torn down.
    Disposed,
}

impl SettingsEvent {
    /// Machine-friendly discriminator for subscribers and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FieldChanged { .. } => "field_changed",
            Self::FieldDiscarded { .. } => "field_discarded",
            Self::Reconciled { .. } => "reconciled",
            Self::RequestStarted => "request_started",
            Self::RequestFinished { .. } => "request_finished",
            Self::SaveStarted { .. } => "save_started",
            Self::SaveSucceeded { .. } => "save_succeeded",
            Self::SaveFailed { .. } => "save_failed",
            Self::Disposed => "disposed",
        }
    }
}

/// Metadata wrapper around a notification.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChangeEnvelope {
    /// Sequential identifier.
    pub id: ChangeId,
    /// Emission timestamp.
    pub timestamp: DateTime<Utc>,
    /// Notification payload.
    pub event: SettingsEvent,
}

/// Shared notification channel built on top of `tokio::broadcast`.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: Sender<ChangeEnvelope>,
    next_id: Arc<AtomicU64>,
}

impl ChangeNotifier {
    /// Construct a notifier buffering up to `capacity` notifications per subscriber.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Construct a notifier with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Publish a notification, returning its identifier.
    ///
    /// Publishing with no subscribers is not an error.
    #[must_use]
    pub fn publish(&self, event: SettingsEvent) -> ChangeId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = ChangeEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };
        let _ = self.sender.send(envelope);
        id
    }

    /// Subscribe to notifications published from now on.
    #[must_use]
    pub fn subscribe(&self) -> ChangeStream {
        ChangeStream {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscriber side of a [`ChangeNotifier`].
#[derive(Debug)]
pub struct ChangeStream {
    receiver: Receiver<ChangeEnvelope>,
}

impl ChangeStream {
    /// Wait for the next notification; `None` once every notifier is dropped.
    pub async fn next(&mut self) -> Option<ChangeEnvelope> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => return Some(envelope),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next buffered notification without waiting.
    pub fn try_next(&mut self) -> Option<ChangeEnvelope> {
        loop {
            match self.receiver.try_recv() {
                Ok(envelope) => return Some(envelope),
                Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drain every buffered notification.
    pub fn drain(&mut self) -> Vec<ChangeEnvelope> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Adapt into a `Stream`, skipping lagged gaps.
    pub fn into_stream(self) -> impl Stream<Item = ChangeEnvelope> + Send + 'static {
        BroadcastStream::new(self.receiver).filter_map(Result::ok)
    }
}
