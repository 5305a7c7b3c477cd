//! Post statistics detail view model.
//!
//! # Design
//! - The view is rebuilt from inputs on every render; only the preview
//!   open/closed flag is local state.
//! - Navigation is delegated to a [`Navigator`] so hosts keep their router.

use serde::Serialize;
use tracing::debug;

use crate::entities::decode_entities;
use crate::i18n::Translate;

const PREVIEW_QUERY: &str = "?demo=true&iframe=true&theme_preview=true";
const PREVIEW_LOADING_MESSAGE: &str = "Beep beep boop…";
const PREVIEW_VIEWPORT: &str = "tablet";
const VIEW_POST_ICON: &str = "visible";

/// Host router used for back navigation.
pub trait Navigator {
    /// Navigate to `path`.
    fn navigate(&self, path: &str);
}

/// Whether the "View Post" action applies to a site.
#[must_use]
pub const fn show_view_link(is_jetpack: bool, is_previewable: bool) -> bool {
    !is_jetpack && is_previewable
}

/// Post as known to the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostRecord {
    /// Raw title; `None` while the server has no record of the post.
    pub title: Option<String>,
    /// Public permalink.
    pub url: Option<String>,
}

/// Everything the post detail view depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostDetailInputs<'a> {
    /// Current route, e.g. `/stats/post/42/example.com`.
    pub path: &'a str,
    /// Route the user came from, when known.
    pub prev_path: Option<&'a str>,
    /// Selected site.
    pub site_id: u64,
    /// Slug of the selected site.
    pub site_slug: &'a str,
    /// Post whose statistics are shown; `0` when unknown.
    pub post_id: u64,
    /// Loaded post, if any.
    pub post: Option<&'a PostRecord>,
    /// The post is being fetched.
    pub is_requesting: bool,
    /// See [`show_view_link`].
    pub show_view_link: bool,
}

/// Action rendered on the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderAction {
    /// Icon name.
    pub icon: &'static str,
    /// Caption.
    pub label: String,
}

/// Reference to a statistics panel for one post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PostPanel {
    /// Site the panel queries.
    pub site_id: u64,
    /// Post the panel queries.
    pub post_id: u64,
}

/// Monthly breakdown panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthsPanel {
    /// Data series key.
    pub data_key: &'static str,
    /// Panel title.
    pub title: String,
    /// Total column caption.
    pub total: String,
    /// Queried post.
    pub panel: PostPanel,
}

/// Link to the post editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditLink {
    /// Editor route.
    pub href: String,
    /// Caption.
    pub label: String,
}

/// Web preview configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewModel {
    /// Embedded preview URL; `None` without a permalink.
    pub preview_url: Option<String>,
    /// Permalink opened outside the preview.
    pub external_url: Option<String>,
    /// Initial device viewport.
    pub default_viewport: &'static str,
    /// Message shown while the preview loads.
    pub loading_message: &'static str,
    /// Editor link placed in the preview toolbar.
    pub edit_link: EditLink,
}

/// Render-ready model of the post statistics detail screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetailView {
    /// Header title.
    pub title: Option<String>,
    /// Route used by [`go_back`](Self::go_back).
    pub back_target: String,
    /// "View Post" action.
    pub view_action: Option<HeaderAction>,
    /// Summary panel.
    pub summary: PostPanel,
    /// Likes panel; absent without a post id.
    pub likes: Option<PostPanel>,
    /// `years` and `averages` panels, in display order.
    pub months: Vec<MonthsPanel>,
    /// Weekly breakdown panel.
    pub weeks: PostPanel,
    /// Preview configuration.
    pub preview: PreviewModel,
}

impl PostDetailView {
    /// Build the view from inputs and a translator.
    #[must_use]
    pub fn build(inputs: &PostDetailInputs<'_>, translate: &dyn Translate) -> Self {
        let panel = PostPanel {
            site_id: inputs.site_id,
            post_id: inputs.post_id,
        };
        let url = inputs.post.and_then(|post| post.url.clone());

        Self {
            title: title(inputs, translate),
            back_target: back_target(inputs.path, inputs.prev_path),
            view_action: inputs.show_view_link.then(|| HeaderAction {
                icon: VIEW_POST_ICON,
                label: translate.text("post_detail.view_post", "View Post"),
            }),
            summary: panel,
            likes: (inputs.post_id != 0).then_some(panel),
            months: vec![
                MonthsPanel {
                    data_key: "years",
                    title: translate.text("post_detail.months_and_years", "Months and Years"),
                    total: translate.text("post_detail.total", "Total"),
                    panel,
                },
                MonthsPanel {
                    data_key: "averages",
                    title: translate.text("post_detail.average_per_day", "Average per Day"),
                    total: translate.text("post_detail.overall", "Overall"),
                    panel,
                },
            ],
            weeks: panel,
            preview: PreviewModel {
                preview_url: url.as_deref().map(|url| format!("{url}{PREVIEW_QUERY}")),
                external_url: url,
                default_viewport: PREVIEW_VIEWPORT,
                loading_message: PREVIEW_LOADING_MESSAGE,
                edit_link: EditLink {
                    href: format!("/post/{}/{}", inputs.site_slug, inputs.post_id),
                    label: translate.text("post_detail.edit", "Edit"),
                },
            },
        }
    }

    /// Navigate to [`back_target`](Self::back_target).
    pub fn go_back(&self, navigator: &dyn Navigator) {
        debug!(target_path = %self.back_target, "leaving post detail");
        navigator.navigate(&self.back_target);
    }

    /// Open the preview when the view action is offered; returns whether it opened.
    pub fn open_preview(&self, state: &mut PreviewState) -> bool {
        if self.view_action.is_none() {
            return false;
        }
        state.open();
        true
    }
}

/// Open/closed state of the web preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewState {
    open: bool,
}

impl PreviewState {
    /// Show the preview.
    pub const fn open(&mut self) {
        self.open = true;
    }

    /// Hide the preview.
    pub const fn close(&mut self) {
        self.open = false;
    }

    /// Whether the preview is shown.
    #[must_use]
    pub const fn is_open(self) -> bool {
        self.open
    }
}

fn title(inputs: &PostDetailInputs<'_>, translate: &dyn Translate) -> Option<String> {
    let recorded = inputs.post.and_then(|post| post.title.as_deref());
    match recorded {
        Some(raw) if !raw.is_empty() => Some(decode_entities(raw).into_owned()),
        Some(_) => None,
        None if inputs.is_requesting => None,
        None => Some(translate.text(
            "post_detail.not_on_record",
            "We don't have that post on record yet.",
        )),
    }
}

fn back_target(path: &str, prev_path: Option<&str>) -> String {
    prev_path.filter(|prev| !prev.is_empty()).map_or_else(
        || {
            let last = path.rsplit('/').next().unwrap_or_default();
            format!("/stats/{last}")
        },
        ToString::to_string,
    )
}
