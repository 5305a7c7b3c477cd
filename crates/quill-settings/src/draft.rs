//! Draft store: local edits layered over the server-confirmed field set.
//!
//! # Design
//! - One store per mounted form, shared by handle (`Clone`) with every collaborator.
//! - Locks are short and never held across `.await`; poisoned locks are recovered.
//! - Each draft carries an edit revision so confirmations can tell whether a
//!   field was edited again while a save was in flight.
//! - Every mutation publishes a [`SettingsEvent`] instead of triggering renders.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, instrument};

use crate::model::{FieldSet, FieldValue};
use crate::notify::{ChangeNotifier, ChangeStream, SettingsEvent};
use crate::submit::SubmitReceipt;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Draft {
    value: FieldValue,
    revision: u64,
}

#[derive(Debug, Default)]
struct DraftState {
    server: FieldSet,
    drafts: BTreeMap<String, Draft>,
    dirty: BTreeSet<String>,
    last_revision: u64,
    disposed: bool,
}

impl DraftState {
    fn value(&self, field: &str) -> Option<&FieldValue> {
        if self.dirty.contains(field) {
            if let Some(draft) = self.drafts.get(field) {
                return Some(&draft.value);
            }
        }
        self.server.get(field)
    }

    fn clear_draft(&mut self, field: &str) -> bool {
        let had_draft = self.drafts.remove(field).is_some();
        self.dirty.remove(field) || had_draft
    }

    fn check_invariants(&self) {
        debug_assert!(
            self.dirty.iter().all(|field| self.drafts.contains_key(field)),
            "dirty field without a draft"
        );
    }
}

/// Draft value captured when a save request is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CapturedField {
    pub(crate) field: String,
    pub(crate) value: FieldValue,
    pub(crate) revision: u64,
}

/// Local, uncommitted copy of a form's settings.
///
/// Reads return the draft for dirty fields and the server value otherwise.
#[derive(Debug, Clone)]
pub struct SettingsDraftStore {
    state: Arc<Mutex<DraftState>>,
    notifier: ChangeNotifier,
}

impl SettingsDraftStore {
    /// Create an empty store with its own notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::with_notifier(ChangeNotifier::new())
    }

    /// Create an empty store publishing through `notifier`.
    #[must_use]
    pub fn with_notifier(notifier: ChangeNotifier) -> Self {
        Self {
            state: Arc::new(Mutex::new(DraftState::default())),
            notifier,
        }
    }

    /// Create a store seeded with a server snapshot.
    #[must_use]
    pub fn from_fields(fields: FieldSet) -> Self {
        let store = Self::new();
        store.lock().server = fields;
        store
    }

    /// Current value of `field`: the draft when dirty, else the server value.
    #[must_use]
    pub fn get_value(&self, field: &str) -> Option<FieldValue> {
        self.lock().value(field).cloned()
    }

    /// Record a local edit and mark the field dirty.
    ///
    /// Ignored once the store has been disposed.
    pub fn set_value(&self, field: impl Into<String>, value: impl Into<FieldValue>) {
        let field = field.into();
        {
            let mut state = self.lock();
            if state.disposed {
                debug!(field = %field, "ignoring edit on disposed settings form");
                return;
            }
            state.last_revision += 1;
            let revision = state.last_revision;
            state.drafts.insert(
                field.clone(),
                Draft {
                    value: value.into(),
                    revision,
                },
            );
            state.dirty.insert(field.clone());
            state.check_invariants();
        }
        let _ = self.notifier.publish(SettingsEvent::FieldChanged { field });
    }

    /// Replace the server snapshot, keeping drafts for dirty fields only.
    #[instrument(name = "settings.reconcile", skip(self, fields), fields(count = fields.len()))]
    pub fn reconcile(&self, fields: FieldSet) {
        let (count, dirty) = {
            let mut state = self.lock();
            if state.disposed {
                debug!("ignoring snapshot for disposed settings form");
                return;
            }
            state.server = fields;
            let DraftState { drafts, dirty, .. } = &mut *state;
            drafts.retain(|field, _| dirty.contains(field));
            state.check_invariants();
            (state.server.len(), state.dirty.len())
        };
        debug!(dirty, "settings snapshot reconciled");
        let _ = self.notifier.publish(SettingsEvent::Reconciled {
            fields: count,
            dirty,
        });
    }

    /// Drop the local edit for `field`, returning whether one existed.
    pub fn discard(&self, field: &str) -> bool {
        let removed = {
            let mut state = self.lock();
            let removed = state.clear_draft(field);
            state.check_invariants();
            removed
        };
        if removed {
            let _ = self.notifier.publish(SettingsEvent::FieldDiscarded {
                field: field.to_string(),
            });
        }
        removed
    }

    /// Whether `field` carries an unconfirmed local edit.
    #[must_use]
    pub fn is_dirty(&self, field: &str) -> bool {
        self.lock().dirty.contains(field)
    }

    /// Whether any field carries an unconfirmed local edit.
    #[must_use]
    pub fn has_dirty(&self) -> bool {
        !self.lock().dirty.is_empty()
    }

    /// Dirty field names in name order.
    #[must_use]
    pub fn dirty_fields(&self) -> Vec<String> {
        self.lock().dirty.iter().cloned().collect()
    }

    /// Local draft value for `field`, if any.
    #[must_use]
    pub fn draft_value(&self, field: &str) -> Option<FieldValue> {
        self.lock()
            .drafts
            .get(field)
            .map(|draft| draft.value.clone())
    }

    /// Last server-confirmed value for `field`.
    #[must_use]
    pub fn server_value(&self, field: &str) -> Option<FieldValue> {
        self.lock().server.get(field).cloned()
    }

    /// Merged view: server values overlaid with drafts.
    #[must_use]
    pub fn fields(&self) -> FieldSet {
        let state = self.lock();
        let mut merged = state.server.clone();
        for field in &state.dirty {
            if let Some(draft) = state.drafts.get(field) {
                merged.insert(field.clone(), draft.value.clone());
            }
        }
        merged
    }

    /// Subscribe to change notifications.
    #[must_use]
    pub fn subscribe(&self) -> ChangeStream {
        self.notifier.subscribe()
    }

    /// Notifier shared by this store.
    #[must_use]
    pub const fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Tear the store down; later edits, snapshots, and save responses are ignored.
    pub fn dispose(&self) {
        let newly_disposed = {
            let mut state = self.lock();
            !std::mem::replace(&mut state.disposed, true)
        };
        if newly_disposed {
            let _ = self.notifier.publish(SettingsEvent::Disposed);
        }
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    pub(crate) fn capture<S: AsRef<str>>(&self, selected: &[S]) -> Vec<CapturedField> {
        let state = self.lock();
        let mut captured = BTreeMap::new();
        for field in selected.iter().map(AsRef::as_ref) {
            if !state.dirty.contains(field) {
                continue;
            }
            if let Some(draft) = state.drafts.get(field) {
                captured
                    .entry(field.to_string())
                    .or_insert_with(|| CapturedField {
                        field: field.to_string(),
                        value: draft.value.clone(),
                        revision: draft.revision,
                    });
            }
        }
        captured.into_values().collect()
    }

    /// Apply a confirmed save. Echoed values never replace payload fields.
    /// Returns `None` when the store was disposed while the request was in flight.
    pub(crate) fn confirm(
        &self,
        captured: &[CapturedField],
        echoed: &FieldSet,
    ) -> Option<SubmitReceipt> {
        let mut state = self.lock();
        if state.disposed {
            return None;
        }

        let mut receipt = SubmitReceipt::default();
        for entry in captured {
            state.server.insert(entry.field.clone(), entry.value.clone());
            match state.drafts.get(&entry.field) {
                Some(draft) if draft.revision != entry.revision => {
                    receipt.still_dirty.push(entry.field.clone());
                }
                Some(_) => {
                    state.clear_draft(&entry.field);
                    receipt.saved.push(entry.field.clone());
                }
                None => receipt.saved.push(entry.field.clone()),
            }
        }
        for (field, value) in echoed {
            if !captured.iter().any(|entry| entry.field == *field) {
                state.server.insert(field.clone(), value.clone());
            }
        }
        state.check_invariants();
        Some(receipt)
    }

    fn lock(&self) -> MutexGuard<'_, DraftState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SettingsDraftStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markdown_store() -> SettingsDraftStore {
        SettingsDraftStore::from_fields([("markdown", false)].into_iter().collect())
    }

    #[test]
    fn clean_fields_read_server_values() {
        let store = markdown_store();
        assert_eq!(store.get_value("markdown"), Some(FieldValue::from(false)));
        assert_eq!(store.get_value("missing"), None);
        assert!(!store.is_dirty("markdown"));
    }

    #[test]
    fn drafts_shadow_server_values_across_reconcile() {
        let store = markdown_store();
        store.set_value("markdown", true);
        assert_eq!(store.get_value("markdown"), Some(FieldValue::from(true)));

        store.reconcile([("markdown", false)].into_iter().collect());
        assert_eq!(store.get_value("markdown"), Some(FieldValue::from(true)));
        assert_eq!(store.server_value("markdown"), Some(FieldValue::from(false)));
        assert_eq!(store.dirty_fields(), vec!["markdown"]);
    }

    #[test]
    fn reconcile_replaces_clean_values_wholesale() {
        let store = SettingsDraftStore::from_fields(
            [("a", FieldValue::from(1_i64)), ("b", FieldValue::from(2_i64))]
                .into_iter()
                .collect(),
        );
        store.reconcile([("a", 10_i64)].into_iter().collect());

        assert_eq!(store.get_value("a"), Some(FieldValue::from(10_i64)));
        assert_eq!(store.get_value("b"), None);
    }

    #[test]
    fn last_edit_wins() {
        let store = SettingsDraftStore::new();
        store.set_value("default_post_format", "aside");
        store.set_value("default_post_format", "gallery");
        assert_eq!(
            store.get_value("default_post_format"),
            Some(FieldValue::from("gallery"))
        );
    }

    #[test]
    fn reconcile_commutes_with_pending_edits() {
        let before = markdown_store();
        before.reconcile([("markdown", false), ("other", true)].into_iter().collect());
        before.set_value("markdown", true);

        let after = markdown_store();
        after.set_value("markdown", true);
        after.reconcile([("markdown", false), ("other", true)].into_iter().collect());

        assert_eq!(before.fields(), after.fields());
        assert_eq!(before.dirty_fields(), after.dirty_fields());
    }

    #[test]
    fn discard_restores_server_value() {
        let store = markdown_store();
        store.set_value("markdown", true);
        assert!(store.discard("markdown"));
        assert!(!store.discard("markdown"));
        assert_eq!(store.get_value("markdown"), Some(FieldValue::from(false)));
        assert!(!store.has_dirty());
    }

    #[test]
    fn confirm_keeps_fields_edited_after_capture() {
        let store = SettingsDraftStore::new();
        store.set_value("a", "one");
        store.set_value("b", "two");
        let captured = store.capture(&["a", "b", "a"]);
        assert_eq!(captured.len(), 2);

        store.set_value("b", "three");
        let receipt = store
            .confirm(&captured, &FieldSet::new())
            .expect("store is live");

        assert_eq!(receipt.saved, vec!["a"]);
        assert_eq!(receipt.still_dirty, vec!["b"]);
        assert_eq!(store.get_value("a"), Some(FieldValue::from("one")));
        assert_eq!(store.get_value("b"), Some(FieldValue::from("three")));
        assert_eq!(store.server_value("b"), Some(FieldValue::from("two")));
    }

    #[test]
    fn confirm_ignores_echoes_for_payload_fields() {
        let store = markdown_store();
        store.set_value("default_post_format", "0");
        let captured = store.capture(&["default_post_format"]);
        let echoed: FieldSet = [
            ("default_post_format", FieldValue::from("standard")),
            ("markdown", FieldValue::from(true)),
        ]
        .into_iter()
        .collect();

        store.confirm(&captured, &echoed).expect("store is live");

        assert_eq!(
            store.server_value("default_post_format"),
            Some(FieldValue::from("0"))
        );
        assert_eq!(store.server_value("markdown"), Some(FieldValue::from(true)));
        assert!(!store.has_dirty());
    }

    #[test]
    fn disposed_store_ignores_mutations() {
        let store = markdown_store();
        let mut changes = store.subscribe();
        store.dispose();
        store.dispose();
        store.set_value("markdown", true);
        store.reconcile(FieldSet::new());

        assert!(store.is_disposed());
        assert_eq!(store.get_value("markdown"), Some(FieldValue::from(false)));
        assert!(store.confirm(&[], &FieldSet::new()).is_none());
        let kinds: Vec<_> = changes
            .drain()
            .into_iter()
            .map(|envelope| envelope.event.kind())
            .collect();
        assert_eq!(kinds, vec!["disposed"]);
    }

    #[test]
    fn edits_publish_notifications() {
        let store = SettingsDraftStore::new();
        let mut changes = store.subscribe();
        store.set_value("minileven", true);
        store.reconcile(FieldSet::new());

        let events: Vec<_> = changes.drain().into_iter().map(|envelope| envelope.event).collect();
        assert_eq!(
            events,
            vec![
                SettingsEvent::FieldChanged {
                    field: "minileven".to_string()
                },
                SettingsEvent::Reconciled { fields: 0, dirty: 1 },
            ]
        );
    }
}
