//! Single-flight save coordination.
//!
//! # Design
//! - At most one save is in flight per coordinator; concurrent submits are
//!   rejected rather than queued.
//! - The Saving state lives in a guard so dropping a submit future returns the
//!   coordinator to Idle.
//! - Drafts are cleared only for payload fields whose edit revision did not
//!   move while the request was in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::draft::SettingsDraftStore;
use crate::error::{SettingsError, SettingsResult, TransportError};
use crate::model::FieldSet;
use crate::notify::SettingsEvent;
use crate::schema::SettingsSchema;

/// Server acknowledgement of a save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveConfirmation {
    /// Values echoed back by the server for fields outside the payload.
    pub updated: FieldSet,
}

#[async_trait]
/// Transport that persists a partial field set.
pub trait SaveTransport: Send + Sync {
    /// Persist `payload`, returning the server acknowledgement.
    async fn save(&self, payload: FieldSet) -> Result<SaveConfirmation, TransportError>;
}

/// Coordinator lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    /// No save in flight.
    Idle,
    /// A save request is outstanding.
    Saving,
}

/// Outcome of a confirmed submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// Fields persisted and no longer dirty.
    pub saved: Vec<String>,
    /// Fields persisted but edited again while the request was in flight.
    pub still_dirty: Vec<String>,
}

impl SubmitReceipt {
    /// Whether the submit carried no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty() && self.still_dirty.is_empty()
    }
}

struct SavingGuard {
    flag: Arc<AtomicBool>,
}

impl SavingGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for SavingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Serializes dirty drafts into save requests, one at a time.
#[derive(Clone)]
pub struct SubmitCoordinator {
    schema: SettingsSchema,
    store: SettingsDraftStore,
    transport: Arc<dyn SaveTransport>,
    saving: Arc<AtomicBool>,
}

impl SubmitCoordinator {
    /// Create a coordinator saving `store` drafts through `transport`.
    #[must_use]
    pub fn new(
        schema: SettingsSchema,
        store: SettingsDraftStore,
        transport: Arc<dyn SaveTransport>,
    ) -> Self {
        Self {
            schema,
            store,
            transport,
            saving: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SubmitState {
        if self.saving.load(Ordering::Acquire) {
            SubmitState::Saving
        } else {
            SubmitState::Idle
        }
    }

    /// Whether a save is in flight.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.state() == SubmitState::Saving
    }

    /// Persist the dirty subset of `selected`.
    ///
    /// Selected fields without a draft are skipped; when none of them is dirty
    /// no request is issued and an empty receipt is returned.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::SaveInProgress`] when another submit is outstanding.
    /// - [`SettingsError::UnknownField`] / [`SettingsError::InvalidValue`] when a
    ///   selected field fails schema validation; nothing is sent.
    /// - [`SettingsError::SaveFailed`] when the transport fails; drafts are kept.
    /// - [`SettingsError::Disposed`] when the form was torn down before the
    ///   response could be applied.
    #[instrument(name = "settings.submit", skip(self, selected), fields(schema = self.schema.name()))]
    pub async fn submit(&self, selected: &[&str]) -> SettingsResult<SubmitReceipt> {
        let _guard = SavingGuard::acquire(&self.saving).ok_or(SettingsError::SaveInProgress)?;
        if self.store.is_disposed() {
            return Err(SettingsError::Disposed);
        }

        if let Some(unknown) = selected.iter().find(|field| !self.schema.contains(field)) {
            return Err(SettingsError::UnknownField {
                field: (*unknown).to_string(),
            });
        }
        let captured = self.store.capture(selected);
        for entry in &captured {
            self.schema.validate(&entry.field, &entry.value)?;
        }
        if captured.is_empty() {
            debug!("no dirty fields selected; skipping save");
            return Ok(SubmitReceipt::default());
        }

        let payload: FieldSet = captured
            .iter()
            .map(|entry| (entry.field.clone(), entry.value.clone()))
            .collect();
        let fields = payload.names();
        let notifier = self.store.notifier();
        let _ = notifier.publish(SettingsEvent::SaveStarted {
            fields: fields.clone(),
        });
        info!(count = fields.len(), "saving settings");

        match self.transport.save(payload).await {
            Ok(confirmation) => {
                let Some(receipt) = self.store.confirm(&captured, &confirmation.updated) else {
                    warn!("discarding settings save response for disposed form");
                    return Err(SettingsError::Disposed);
                };
                info!(
                    saved = receipt.saved.len(),
                    still_dirty = receipt.still_dirty.len(),
                    "settings saved"
                );
                let _ = notifier.publish(SettingsEvent::SaveSucceeded {
                    saved: receipt.saved.clone(),
                    still_dirty: receipt.still_dirty.clone(),
                });
                Ok(receipt)
            }
            Err(source) => {
                if self.store.is_disposed() {
                    debug!(error = %source, "discarding settings save failure for disposed form");
                    return Err(SettingsError::Disposed);
                }
                warn!(error = %source, detail = source.message(), "settings save failed");
                let _ = notifier.publish(SettingsEvent::SaveFailed {
                    fields,
                    message: source.message().to_string(),
                });
                Err(SettingsError::SaveFailed { source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldValue;
    use crate::schema::FieldSpec;
    use std::sync::Mutex;

    const TEST_FIELDS: &[FieldSpec] = &[
        FieldSpec::boolean("markdown"),
        FieldSpec::text("default_post_format"),
    ];
    const TEST_SCHEMA: SettingsSchema = SettingsSchema::new("test", TEST_FIELDS);

    #[derive(Default)]
    struct RecordingTransport {
        payloads: Mutex<Vec<FieldSet>>,
        fail: bool,
    }

    #[async_trait]
    impl SaveTransport for RecordingTransport {
        async fn save(&self, payload: FieldSet) -> Result<SaveConfirmation, TransportError> {
            self.payloads.lock().unwrap().push(payload);
            if self.fail {
                return Err(TransportError::Unavailable {
                    message: "offline".to_string(),
                });
            }
            Ok(SaveConfirmation::default())
        }
    }

    fn coordinator(fail: bool) -> (SubmitCoordinator, SettingsDraftStore, Arc<RecordingTransport>) {
        let store = SettingsDraftStore::from_fields([("markdown", false)].into_iter().collect());
        let transport = Arc::new(RecordingTransport {
            fail,
            ..RecordingTransport::default()
        });
        let coordinator = SubmitCoordinator::new(TEST_SCHEMA, store.clone(), transport.clone());
        (coordinator, store, transport)
    }

    #[tokio::test]
    async fn successful_submit_clears_drafts_and_confirms_values() {
        let (coordinator, store, transport) = coordinator(false);
        store.set_value("markdown", true);
        store.reconcile([("markdown", false)].into_iter().collect());
        assert_eq!(store.get_value("markdown"), Some(FieldValue::from(true)));

        let receipt = coordinator.submit(&["markdown"]).await.expect("save succeeds");

        assert_eq!(receipt.saved, vec!["markdown"]);
        assert!(!store.is_dirty("markdown"));
        assert_eq!(store.get_value("markdown"), Some(FieldValue::from(true)));
        assert_eq!(coordinator.state(), SubmitState::Idle);
        let payloads = transport.payloads.lock().unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].get("markdown"), Some(&FieldValue::from(true)));
    }

    #[tokio::test]
    async fn failed_submit_preserves_drafts() {
        let (coordinator, store, _transport) = coordinator(true);
        store.set_value("markdown", true);

        let err = coordinator.submit(&["markdown"]).await.unwrap_err();

        assert!(matches!(err, SettingsError::SaveFailed { .. }));
        assert!(store.is_dirty("markdown"));
        assert_eq!(store.draft_value("markdown"), Some(FieldValue::from(true)));
        assert!(!coordinator.is_saving());
    }

    #[tokio::test]
    async fn invalid_values_are_not_sent() {
        let (coordinator, store, transport) = coordinator(false);
        store.set_value("markdown", "yes");

        let err = coordinator.submit(&["markdown"]).await.unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));

        let err = coordinator.submit(&["blogname"]).await.unwrap_err();
        assert!(matches!(err, SettingsError::UnknownField { .. }));

        assert!(transport.payloads.lock().unwrap().is_empty());
        assert!(store.is_dirty("markdown"));
        assert!(!coordinator.is_saving());
    }

    #[tokio::test]
    async fn clean_selection_skips_the_transport() {
        let (coordinator, _store, transport) = coordinator(false);
        let receipt = coordinator
            .submit(&["markdown", "default_post_format"])
            .await
            .expect("empty submit succeeds");
        assert!(receipt.is_empty());
        assert!(transport.payloads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_only_sends_selected_fields() {
        let (coordinator, store, transport) = coordinator(false);
        store.set_value("markdown", true);
        store.set_value("default_post_format", "gallery");

        let receipt = coordinator
            .submit(&["default_post_format"])
            .await
            .expect("save succeeds");

        assert_eq!(receipt.saved, vec!["default_post_format"]);
        assert!(store.is_dirty("markdown"));
        let payloads = transport.payloads.lock().unwrap();
        assert_eq!(payloads[0].names(), vec!["default_post_format"]);
    }

    #[test]
    fn guard_releases_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = SavingGuard::acquire(&flag).expect("first acquire");
        assert!(SavingGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(SavingGuard::acquire(&flag).is_some());
    }
}
