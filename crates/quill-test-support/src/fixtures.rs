//! Sample settings snapshots.

use quill_settings::FieldSet;
use serde_json::json;

/// Snapshot of a typical site as returned by the settings endpoint.
///
/// Includes fields outside the Writing schema (`blogname`, `timezone_string`)
/// so projection can be exercised.
///
/// # Panics
///
/// Panics if the fixture document is not a flat JSON object.
#[must_use]
pub fn writing_snapshot() -> FieldSet {
    FieldSet::from_json(&json!({
        "blogname": "Quill Test Site",
        "timezone_string": "Europe/Lisbon",
        "default_post_format": "0",
        "wpcom_publish_posts_with_markdown": false,
        "markdown_supported": true,
        "custom-content-types": false,
        "jetpack_testimonial": false,
        "jetpack_portfolio": true,
        "infinite-scroll": false,
        "infinite_scroll": true,
        "infinite_scroll_google_analytics": false,
        "minileven": true,
        "wp_mobile_excerpt": false,
        "wp_mobile_featured_images": false,
        "wp_mobile_app_promos": true,
        "post_by_email_address": null
    }))
    .expect("writing fixture is a flat object")
}

/// Single-field snapshot `{ "markdown": false }`.
#[must_use]
pub fn markdown_snapshot() -> FieldSet {
    [("markdown", false)].into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writing_snapshot_carries_extra_fields() {
        let snapshot = writing_snapshot();
        assert_eq!(snapshot.len(), 16);
        assert!(snapshot.contains("blogname"));
    }
}
