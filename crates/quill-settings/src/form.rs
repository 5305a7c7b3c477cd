//! Settings form composition.
//!
//! # Design
//! - Bundles the draft store, dispatchers, and submit coordinator behind one
//!   handle so views only deal with `fields`, handlers, and status flags.
//! - Snapshots are projected onto the form schema before reconciling.
//! - Request tracking counts outstanding fetches so overlapping refreshes keep
//!   the requesting flag raised until the last one resolves.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::dispatch::{FieldChangeDispatcher, FieldHandler, ToggleDispatcher, ToggleHandler};
use crate::draft::SettingsDraftStore;
use crate::error::{SettingsError, SettingsResult, TransportError};
use crate::model::FieldSet;
use crate::notify::{ChangeStream, SettingsEvent};
use crate::schema::SettingsSchema;
use crate::submit::{SaveTransport, SubmitCoordinator, SubmitReceipt};

#[async_trait]
/// Source of server-confirmed settings snapshots.
pub trait SnapshotProvider: Send + Sync {
    /// Fetch the current settings for the site.
    async fn fetch(&self) -> Result<FieldSet, TransportError>;
}

struct RequestGuard {
    pending: Arc<AtomicUsize>,
}

impl RequestGuard {
    fn begin(pending: &Arc<AtomicUsize>) -> Self {
        pending.fetch_add(1, Ordering::AcqRel);
        Self {
            pending: Arc::clone(pending),
        }
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.pending.fetch_sub(1, Ordering::AcqRel);
    }
}

/// A mounted settings form.
#[derive(Clone)]
pub struct SettingsForm {
    schema: SettingsSchema,
    store: SettingsDraftStore,
    changes: FieldChangeDispatcher,
    toggles: ToggleDispatcher,
    coordinator: SubmitCoordinator,
    provider: Arc<dyn SnapshotProvider>,
    pending_requests: Arc<AtomicUsize>,
}

impl SettingsForm {
    /// Mount a form with a fresh draft store.
    #[must_use]
    pub fn new(
        schema: SettingsSchema,
        transport: Arc<dyn SaveTransport>,
        provider: Arc<dyn SnapshotProvider>,
    ) -> Self {
        Self::with_store(schema, SettingsDraftStore::new(), transport, provider)
    }

    /// Mount a form over an existing draft store.
    #[must_use]
    pub fn with_store(
        schema: SettingsSchema,
        store: SettingsDraftStore,
        transport: Arc<dyn SaveTransport>,
        provider: Arc<dyn SnapshotProvider>,
    ) -> Self {
        Self {
            schema,
            changes: FieldChangeDispatcher::new(store.clone()),
            toggles: ToggleDispatcher::new(store.clone()),
            coordinator: SubmitCoordinator::new(schema, store.clone(), transport),
            store,
            provider,
            pending_requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Schema the form edits.
    #[must_use]
    pub const fn schema(&self) -> SettingsSchema {
        self.schema
    }

    /// Draft store backing the form.
    #[must_use]
    pub const fn store(&self) -> &SettingsDraftStore {
        &self.store
    }

    /// Coordinator used for saves.
    #[must_use]
    pub const fn coordinator(&self) -> &SubmitCoordinator {
        &self.coordinator
    }

    /// Fetch a fresh snapshot and reconcile it into the store.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::RequestFailed`] when the provider fails and
    /// [`SettingsError::Disposed`] when the form was torn down.
    #[instrument(name = "settings.refresh", skip(self), fields(schema = self.schema.name()))]
    pub async fn refresh(&self) -> SettingsResult<()> {
        if self.store.is_disposed() {
            return Err(SettingsError::Disposed);
        }

        let notifier = self.store.notifier();
        let fetched = {
            let _request = RequestGuard::begin(&self.pending_requests);
            let _ = notifier.publish(SettingsEvent::RequestStarted);
            self.provider.fetch().await
        };
        let _ = notifier.publish(SettingsEvent::RequestFinished {
            ok: fetched.is_ok(),
        });

        match fetched {
            Ok(snapshot) => {
                if self.store.is_disposed() {
                    debug!("discarding settings snapshot for disposed form");
                    return Err(SettingsError::Disposed);
                }
                self.store.reconcile(self.schema.project(&snapshot));
                Ok(())
            }
            Err(source) => {
                warn!(error = %source, detail = source.message(), "settings request failed");
                Err(SettingsError::RequestFailed { source })
            }
        }
    }

    /// Merged field view restricted to the schema.
    #[must_use]
    pub fn fields(&self) -> FieldSet {
        self.schema.project(&self.store.fields())
    }

    /// Change handler for `field`.
    #[must_use]
    pub fn on_change_field(&self, field: &str) -> FieldHandler {
        self.changes.handler(field)
    }

    /// Toggle handler for `field`.
    #[must_use]
    pub fn handle_toggle(&self, field: &str) -> ToggleHandler {
        self.toggles.toggle_handler(field)
    }

    /// Save every dirty schema field.
    ///
    /// # Errors
    ///
    /// Propagates [`SubmitCoordinator::submit`] errors.
    pub async fn handle_submit_form(&self) -> SettingsResult<SubmitReceipt> {
        let names = self.schema.names();
        self.coordinator.submit(&names).await
    }

    /// Whether a snapshot request is outstanding.
    #[must_use]
    pub fn is_requesting_settings(&self) -> bool {
        self.pending_requests.load(Ordering::Acquire) > 0
    }

    /// Whether a save is outstanding.
    #[must_use]
    pub fn is_saving_settings(&self) -> bool {
        self.coordinator.is_saving()
    }

    /// Subscribe to change notifications.
    #[must_use]
    pub fn subscribe(&self) -> ChangeStream {
        self.store.subscribe()
    }

    /// Tear the form down; late responses are discarded.
    pub fn dispose(&self) {
        self.store.dispose();
    }
}
