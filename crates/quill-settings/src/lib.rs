#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Draft/confirmed reconciliation for site settings forms.
//!
//! Layout: `model.rs` (field values and field sets), `schema.rs` (static form
//! schemas), `draft.rs` (`SettingsDraftStore`), `dispatch.rs` (memoized change
//! and toggle handlers), `submit.rs` (`SubmitCoordinator` + `SaveTransport`),
//! `notify.rs` (change notifications), `form.rs` (`SettingsForm` composition).

pub mod dispatch;
pub mod draft;
pub mod error;
pub mod form;
pub mod model;
pub mod notify;
pub mod schema;
pub mod submit;

pub use dispatch::{
    FieldChangeDispatcher, FieldHandler, InputEvent, ToggleDispatcher, ToggleHandler,
};
pub use draft::SettingsDraftStore;
pub use error::{SettingsError, SettingsResult, TransportError};
pub use form::{SettingsForm, SnapshotProvider};
pub use model::{FieldSet, FieldValue};
pub use notify::{ChangeEnvelope, ChangeId, ChangeNotifier, ChangeStream, SettingsEvent};
pub use schema::{FieldKind, FieldSpec, SettingsSchema, WRITING_SCHEMA};
pub use submit::{SaveConfirmation, SaveTransport, SubmitCoordinator, SubmitReceipt, SubmitState};
