//! Translation seam for view builders.
//!
//! Builders ask for a dotted key plus an English fallback; hosts plug in
//! whatever catalogue they ship.

use serde_json::Value;

/// Resolves user-facing strings.
pub trait Translate {
    /// Text for `key`, or `fallback` when the key is unknown.
    fn text(&self, key: &str, fallback: &str) -> String;
}

/// Translator that always answers with the fallback text.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackTranslator;

impl Translate for FallbackTranslator {
    fn text(&self, _key: &str, fallback: &str) -> String {
        fallback.to_string()
    }
}

/// JSON-backed translation catalogue addressed by dotted paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationBundle {
    tree: Value,
}

impl TranslationBundle {
    /// Wrap an already parsed catalogue.
    #[must_use]
    pub const fn new(tree: Value) -> Self {
        Self { tree }
    }

    /// Parse a JSON catalogue.
    ///
    /// # Errors
    ///
    /// Returns the serde error when `raw` is not valid JSON.
    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw).map(Self::new)
    }
}

impl Translate for TranslationBundle {
    fn text(&self, key: &str, fallback: &str) -> String {
        resolve(&self.tree, key).unwrap_or_else(|| fallback.to_string())
    }
}

fn resolve(tree: &Value, path: &str) -> Option<String> {
    let mut node = tree;
    for segment in path.split('.') {
        node = node.get(segment)?;
    }
    node.as_str().map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_falls_back_to_default() -> serde_json::Result<()> {
        let bundle = TranslationBundle::parse(r#"{"writing":{"composing":"Rédaction"}}"#)?;
        assert_eq!(bundle.text("writing.composing", "Composing"), "Rédaction");
        assert_eq!(bundle.text("writing.missing", "fallback"), "fallback");
        assert_eq!(bundle.text("writing", "section"), "section");
        Ok(())
    }

    #[test]
    fn fallback_translator_echoes_fallback() {
        assert_eq!(FallbackTranslator.text("any.key", "Edit"), "Edit");
    }
}
