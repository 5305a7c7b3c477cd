//! Writing settings form view model.
//!
//! # Design
//! - Pure function of form state, feature flags, and site capabilities.
//! - Save buttons share one rule: disabled while requesting or saving.

use quill_config::{FLAG_PRESS_THIS, FLAG_SITE_SETTINGS_CATEGORIES, FeatureFlags};
use quill_settings::{FieldSet, SettingsForm};
use serde::Serialize;

use crate::i18n::Translate;

const MARKDOWN_HELP_URL: &str = "http://en.support.wordpress.com/markdown-quick-reference/";

const POST_FORMATS: [(&str, &str, &str); 10] = [
    ("0", "post_format.standard", "Standard"),
    ("aside", "post_format.aside", "Aside"),
    ("chat", "post_format.chat", "Chat"),
    ("gallery", "post_format.gallery", "Gallery"),
    ("link", "post_format.link", "Link"),
    ("image", "post_format.image", "Image"),
    ("quote", "post_format.quote", "Quote"),
    ("status", "post_format.status", "Status"),
    ("video", "post_format.video", "Video"),
    ("audio", "post_format.audio", "Audio"),
];

/// Site capabilities that gate the Jetpack sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteCapabilities {
    /// Site is connected through Jetpack.
    pub is_jetpack: bool,
    /// Site supports the Jetpack settings UI.
    pub jetpack_settings_ui_supported: bool,
}

/// Everything the Writing form view depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WritingInputs {
    /// Merged form fields.
    pub fields: FieldSet,
    /// A settings snapshot request is outstanding.
    pub is_requesting: bool,
    /// A save is outstanding.
    pub is_saving: bool,
    /// Capabilities of the selected site.
    pub site: SiteCapabilities,
}

impl WritingInputs {
    /// Snapshot the current state of a mounted form.
    #[must_use]
    pub fn from_form(form: &SettingsForm, site: SiteCapabilities) -> Self {
        Self {
            fields: form.fields(),
            is_requesting: form.is_requesting_settings(),
            is_saving: form.is_saving_settings(),
            site,
        }
    }

    fn truthy(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(|value| value.is_truthy())
    }
}

/// Save button rendered in a section header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveButton {
    /// Button caption.
    pub label: String,
    /// Whether clicks are ignored.
    pub disabled: bool,
}

/// Section header with an optional save button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionHeader {
    /// Header caption.
    pub label: String,
    /// Save button, when the section submits the form.
    pub save_button: Option<SaveButton>,
}

/// Taxonomy management card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyCard {
    /// Taxonomy slug.
    pub taxonomy: &'static str,
    /// Post type the taxonomy applies to.
    pub post_type: &'static str,
}

/// One entry of a select control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    /// Submitted value.
    pub value: &'static str,
    /// Display label.
    pub label: String,
}

/// Select control bound to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectControl {
    /// Bound field.
    pub name: &'static str,
    /// Field label.
    pub label: String,
    /// Current value as displayed.
    pub value: String,
    /// Available options.
    pub options: Vec<SelectOption>,
    /// Whether input is blocked.
    pub disabled: bool,
}

/// Toggle control bound to a boolean field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleControl {
    /// Bound field.
    pub name: &'static str,
    /// Fieldset label.
    pub label: String,
    /// Toggle caption.
    pub description: String,
    /// Help link shown next to the caption.
    pub help_url: &'static str,
    /// Whether the toggle is on.
    pub checked: bool,
    /// Whether input is blocked.
    pub disabled: bool,
}

/// Sections shown only for Jetpack sites with the settings UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JetpackSections {
    /// Custom content types section.
    pub custom_content_types: SectionHeader,
    /// Theme enhancements section.
    pub theme_enhancements: SectionHeader,
    /// Publishing tools section, gated by the Press This flag.
    pub publishing_tools: Option<SectionHeader>,
}

/// Render-ready model of the Writing settings form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WritingFormView {
    /// Taxonomy cards, when category management is enabled.
    pub taxonomies: Option<Vec<TaxonomyCard>>,
    /// "Composing" header.
    pub composing: SectionHeader,
    /// Default post format select.
    pub default_post_format: SelectControl,
    /// Markdown toggle, when the site supports markdown.
    pub markdown: Option<ToggleControl>,
    /// Jetpack sections.
    pub jetpack: Option<JetpackSections>,
    /// Standalone Press This header (no save button).
    pub press_this: Option<SectionHeader>,
}

impl WritingFormView {
    /// Build the view from form state, feature flags, and a translator.
    #[must_use]
    pub fn build(inputs: &WritingInputs, flags: &FeatureFlags, translate: &dyn Translate) -> Self {
        let press_this_enabled = flags.is_enabled(FLAG_PRESS_THIS);
        let site = inputs.site;
        let header = |key: &str, fallback: &str| SectionHeader {
            label: translate.text(key, fallback),
            save_button: Some(save_button(inputs, translate)),
        };

        let taxonomies = flags.is_enabled(FLAG_SITE_SETTINGS_CATEGORIES).then(|| {
            vec![
                TaxonomyCard {
                    taxonomy: "category",
                    post_type: "post",
                },
                TaxonomyCard {
                    taxonomy: "post_tag",
                    post_type: "post",
                },
            ]
        });

        let jetpack = (site.is_jetpack && site.jetpack_settings_ui_supported).then(|| {
            JetpackSections {
                custom_content_types: header(
                    "writing.custom_content_types",
                    "Custom Content Types",
                ),
                theme_enhancements: header("writing.theme_enhancements", "Theme Enhancements"),
                publishing_tools: press_this_enabled
                    .then(|| header("writing.publishing_tools", "Publishing Tools")),
            }
        });

        let press_this = (press_this_enabled
            && !(site.is_jetpack || site.jetpack_settings_ui_supported))
            .then(|| SectionHeader {
                label: translate.text("writing.press_this", "Press This"),
                save_button: None,
            });

        Self {
            taxonomies,
            composing: header("writing.composing", "Composing"),
            default_post_format: post_format_select(inputs, translate),
            markdown: markdown_toggle(inputs, translate),
            jetpack,
            press_this,
        }
    }
}

fn save_button(inputs: &WritingInputs, translate: &dyn Translate) -> SaveButton {
    let label = if inputs.is_saving {
        translate.text("writing.saving", "Saving…")
    } else {
        translate.text("writing.save_settings", "Save Settings")
    };
    SaveButton {
        label,
        disabled: inputs.is_requesting || inputs.is_saving,
    }
}

fn post_format_select(inputs: &WritingInputs, translate: &dyn Translate) -> SelectControl {
    SelectControl {
        name: "default_post_format",
        label: translate.text("writing.default_post_format", "Default Post Format"),
        value: inputs
            .fields
            .get("default_post_format")
            .map(|value| value.display_value())
            .unwrap_or_default(),
        options: POST_FORMATS
            .iter()
            .map(|&(value, key, fallback)| SelectOption {
                value,
                label: translate.text(key, fallback),
            })
            .collect(),
        disabled: inputs.is_requesting,
    }
}

fn markdown_toggle(inputs: &WritingInputs, translate: &dyn Translate) -> Option<ToggleControl> {
    inputs
        .truthy("markdown_supported")
        .then(|| ToggleControl {
            name: "wpcom_publish_posts_with_markdown",
            label: translate.text("writing.markdown", "Markdown"),
            description: translate.text(
                "writing.markdown_description",
                "Use markdown for posts and pages. Learn more about markdown.",
            ),
            help_url: MARKDOWN_HELP_URL,
            checked: inputs.truthy("wpcom_publish_posts_with_markdown"),
            disabled: inputs.is_requesting,
        })
}
