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

//! Render-ready view models for Quill settings and statistics screens.
//!
//! Layout: `i18n.rs` (translation seam), `entities.rs` (HTML entity
//! decoding), `writing.rs` (`WritingFormView`), `post_detail.rs`
//! (`PostDetailView`, preview state, navigation seam).
//! Builders produce plain data; markup is left to the host renderer.

pub mod entities;
pub mod i18n;
pub mod post_detail;
pub mod writing;

pub use entities::decode_entities;
pub use i18n::{FallbackTranslator, Translate, TranslationBundle};
pub use post_detail::{
    EditLink, HeaderAction, MonthsPanel, Navigator, PostDetailInputs, PostDetailView, PostPanel,
    PostRecord, PreviewModel, PreviewState, show_view_link,
};
pub use writing::{
    JetpackSections, SaveButton, SectionHeader, SelectControl, SelectOption, SiteCapabilities,
    TaxonomyCard, ToggleControl, WritingFormView, WritingInputs,
};
