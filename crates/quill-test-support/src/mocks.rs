//! Scripted collaborators for settings form tests.
//!
//! Both mocks answer from a queue of scripted responses and can optionally
//! hold each request until the test releases it, which makes in-flight
//! behaviour observable.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use quill_settings::{
    FieldSet, SaveConfirmation, SaveTransport, SnapshotProvider, TransportError,
};
use tokio::sync::Notify;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct Gate {
    hold: bool,
    started: Notify,
    release: Notify,
}

impl Gate {
    fn held() -> Self {
        Self {
            hold: true,
            ..Self::default()
        }
    }

    async fn pass(&self) {
        self.started.notify_one();
        if self.hold {
            self.release.notified().await;
        }
    }
}

/// Save transport answering from a scripted response queue.
///
/// With an empty queue every save succeeds without echoing values.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<SaveConfirmation, TransportError>>>,
    payloads: Mutex<Vec<FieldSet>>,
    gate: Gate,
}

impl ScriptedTransport {
    /// Transport that answers immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that holds every request until [`release`](Self::release).
    #[must_use]
    pub fn held() -> Self {
        Self {
            gate: Gate::held(),
            ..Self::default()
        }
    }

    /// Queue a successful response echoing `updated`.
    pub fn respond_with(&self, updated: FieldSet) {
        lock(&self.responses).push_back(Ok(SaveConfirmation { updated }));
    }

    /// Queue a failure.
    pub fn fail_with(&self, error: TransportError) {
        lock(&self.responses).push_back(Err(error));
    }

    /// Payloads received so far, in arrival order.
    #[must_use]
    pub fn payloads(&self) -> Vec<FieldSet> {
        lock(&self.payloads).clone()
    }

    /// Number of save requests received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.payloads).len()
    }

    /// Wait until a request has arrived.
    pub async fn wait_for_request(&self) {
        self.gate.started.notified().await;
    }

    /// Let one held request proceed.
    pub fn release(&self) {
        self.gate.release.notify_one();
    }
}

#[async_trait]
impl SaveTransport for ScriptedTransport {
    async fn save(&self, payload: FieldSet) -> Result<SaveConfirmation, TransportError> {
        lock(&self.payloads).push(payload);
        self.gate.pass().await;
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Ok(SaveConfirmation::default()))
    }
}

/// Snapshot provider answering from a scripted response queue.
///
/// With an empty queue it serves the fallback snapshot.
#[derive(Debug, Default)]
pub struct ScriptedSnapshotProvider {
    fallback: FieldSet,
    responses: Mutex<VecDeque<Result<FieldSet, TransportError>>>,
    calls: Mutex<usize>,
    gate: Gate,
}

impl ScriptedSnapshotProvider {
    /// Provider serving `snapshot` immediately.
    #[must_use]
    pub fn serving(snapshot: FieldSet) -> Self {
        Self {
            fallback: snapshot,
            ..Self::default()
        }
    }

    /// Provider serving `snapshot` once each request is released.
    #[must_use]
    pub fn held(snapshot: FieldSet) -> Self {
        Self {
            fallback: snapshot,
            gate: Gate::held(),
            ..Self::default()
        }
    }

    /// Queue a one-off snapshot.
    pub fn respond_with(&self, snapshot: FieldSet) {
        lock(&self.responses).push_back(Ok(snapshot));
    }

    /// Queue a failure.
    pub fn fail_with(&self, error: TransportError) {
        lock(&self.responses).push_back(Err(error));
    }

    /// Number of fetches received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *lock(&self.calls)
    }

    /// Wait until a fetch has arrived.
    pub async fn wait_for_request(&self) {
        self.gate.started.notified().await;
    }

    /// Let one held fetch proceed.
    pub fn release(&self) {
        self.gate.release.notify_one();
    }
}

#[async_trait]
impl SnapshotProvider for ScriptedSnapshotProvider {
    async fn fetch(&self) -> Result<FieldSet, TransportError> {
        *lock(&self.calls) += 1;
        self.gate.pass().await;
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn transport_replays_scripted_responses() {
        let transport = ScriptedTransport::new();
        transport.fail_with(TransportError::Unavailable {
            message: "offline".to_string(),
        });

        let first = transport.save(FieldSet::new()).await;
        let second = transport.save(FieldSet::new()).await;

        assert!(first.is_err());
        assert_eq!(second, Ok(SaveConfirmation::default()));
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn held_provider_waits_for_release() {
        let provider = Arc::new(ScriptedSnapshotProvider::held(
            [("minileven", true)].into_iter().collect(),
        ));
        let task = {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { provider.fetch().await })
        };

        provider.wait_for_request().await;
        assert!(!task.is_finished());
        provider.release();

        let snapshot = task.await.expect("fetch task").expect("fetch succeeds");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(provider.call_count(), 1);
    }
}
