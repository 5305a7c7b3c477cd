//! Per-field event handlers for form controls.
//!
//! # Design
//! - Handlers are memoized per field so renderers receive the same callback
//!   (`Arc::ptr_eq`) on every pass.
//! - Dispatchers share the draft store by handle; they hold no field state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::draft::SettingsDraftStore;
use crate::model::FieldValue;

/// Raw change event emitted by a form control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    /// `name` attribute of the control, when present.
    pub name: Option<String>,
    /// Value carried by the event.
    pub value: FieldValue,
}

impl InputEvent {
    /// Event from an unnamed control.
    #[must_use]
    pub fn new(value: impl Into<FieldValue>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    /// Event from a named control.
    #[must_use]
    pub fn named(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: Some(name.into()),
            value: value.into(),
        }
    }
}

/// Change callback bound to one field.
pub type FieldHandler = Arc<dyn Fn(&InputEvent) + Send + Sync>;

/// Toggle callback bound to one boolean field.
pub type ToggleHandler = Arc<dyn Fn() + Send + Sync>;

type HandlerCache<H> = Arc<Mutex<HashMap<String, H>>>;

fn cached<H: Clone>(cache: &HandlerCache<H>, field: &str, build: impl FnOnce() -> H) -> H {
    let mut handlers: MutexGuard<'_, HashMap<String, H>> =
        cache.lock().unwrap_or_else(PoisonError::into_inner);
    handlers
        .entry(field.to_string())
        .or_insert_with(build)
        .clone()
}

/// Builds change handlers that write event values into the draft store.
#[derive(Clone)]
pub struct FieldChangeDispatcher {
    store: SettingsDraftStore,
    handlers: HandlerCache<FieldHandler>,
}

impl FieldChangeDispatcher {
    /// Create a dispatcher writing into `store`.
    #[must_use]
    pub fn new(store: SettingsDraftStore) -> Self {
        Self {
            store,
            handlers: Arc::default(),
        }
    }

    /// Handler for `field`; repeated calls return the same callback.
    #[must_use]
    pub fn handler(&self, field: &str) -> FieldHandler {
        cached(&self.handlers, field, || {
            let store = self.store.clone();
            let field = field.to_string();
            let handler: FieldHandler = Arc::new(move |event: &InputEvent| {
                store.set_value(field.clone(), event.value.clone());
            });
            handler
        })
    }
}

/// Builds handlers that invert boolean fields.
#[derive(Clone)]
pub struct ToggleDispatcher {
    store: SettingsDraftStore,
    handlers: HandlerCache<ToggleHandler>,
}

impl ToggleDispatcher {
    /// Create a dispatcher writing into `store`.
    #[must_use]
    pub fn new(store: SettingsDraftStore) -> Self {
        Self {
            store,
            handlers: Arc::default(),
        }
    }

    /// Handler inverting `field`; missing or falsy values become `true`.
    #[must_use]
    pub fn toggle_handler(&self, field: &str) -> ToggleHandler {
        cached(&self.handlers, field, || {
            let store = self.store.clone();
            let field = field.to_string();
            let handler: ToggleHandler = Arc::new(move || {
                let current = store
                    .get_value(&field)
                    .is_some_and(|value| value.is_truthy());
                store.set_value(field.clone(), !current);
            });
            handler
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_handler_writes_event_value() {
        let store = SettingsDraftStore::new();
        let dispatcher = FieldChangeDispatcher::new(store.clone());

        let handler = dispatcher.handler("default_post_format");
        handler(&InputEvent::named("default_post_format", "aside"));
        handler(&InputEvent::new("gallery"));

        assert_eq!(
            store.get_value("default_post_format"),
            Some(FieldValue::from("gallery"))
        );
        assert!(store.is_dirty("default_post_format"));
    }

    #[test]
    fn handlers_are_memoized_per_field() {
        let dispatcher = FieldChangeDispatcher::new(SettingsDraftStore::new());
        let first = dispatcher.handler("a");
        let again = dispatcher.handler("a");
        let other = dispatcher.handler("b");

        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));

        let toggles = ToggleDispatcher::new(SettingsDraftStore::new());
        assert!(Arc::ptr_eq(&toggles.toggle_handler("a"), &toggles.toggle_handler("a")));
    }

    #[test]
    fn toggle_inverts_current_value() {
        let store = SettingsDraftStore::from_fields(
            [("wpcom_publish_posts_with_markdown", true)].into_iter().collect(),
        );
        let toggles = ToggleDispatcher::new(store.clone());
        let toggle = toggles.toggle_handler("wpcom_publish_posts_with_markdown");

        toggle();
        assert_eq!(
            store.get_value("wpcom_publish_posts_with_markdown"),
            Some(FieldValue::from(false))
        );
        toggle();
        assert_eq!(
            store.get_value("wpcom_publish_posts_with_markdown"),
            Some(FieldValue::from(true))
        );
    }

    #[test]
    fn toggle_treats_missing_and_null_as_false() {
        let store = SettingsDraftStore::from_fields(
            [("minileven", FieldValue::Null)].into_iter().collect(),
        );
        let toggles = ToggleDispatcher::new(store.clone());

        toggles.toggle_handler("minileven")();
        toggles.toggle_handler("jetpack_portfolio")();

        assert_eq!(store.get_value("minileven"), Some(FieldValue::from(true)));
        assert_eq!(store.get_value("jetpack_portfolio"), Some(FieldValue::from(true)));
    }
}
