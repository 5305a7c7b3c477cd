//! Statically declared form schemas.
//!
//! # Design
//! - A schema is a `'static` table of field specs so forms can be declared as constants.
//! - Snapshots are projected onto the schema on the way in; payloads are
//!   validated against it on the way out.

use std::fmt::{self, Display, Formatter};

use crate::error::{SettingsError, SettingsResult};
use crate::model::{FieldSet, FieldValue};

/// Kind of value a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text or enumerated string value.
    Text,
    /// Boolean toggle.
    Bool,
    /// Numeric value.
    Number,
}

impl FieldKind {
    /// Lowercase label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Bool => "bool",
            Self::Number => "number",
        }
    }
}

impl Display for FieldKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Declaration of a single form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name as used by the settings endpoint.
    pub name: &'static str,
    /// Kind of value the field accepts.
    pub kind: FieldKind,
    /// Whether `null` is an accepted value.
    pub nullable: bool,
}

impl FieldSpec {
    /// Non-nullable text field.
    #[must_use]
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            nullable: false,
        }
    }

    /// Non-nullable boolean field.
    #[must_use]
    pub const fn boolean(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Bool,
            nullable: false,
        }
    }

    /// Non-nullable numeric field.
    #[must_use]
    pub const fn number(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Number,
            nullable: false,
        }
    }

    /// Same field, additionally accepting `null`.
    #[must_use]
    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    /// Check a value against this spec.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidValue`] when the value kind does not match.
    pub fn check(&self, value: &FieldValue) -> SettingsResult<()> {
        match value.kind() {
            None if self.nullable => Ok(()),
            Some(kind) if kind == self.kind => Ok(()),
            _ => Err(SettingsError::InvalidValue {
                field: self.name.to_string(),
                expected: self.kind,
                found: value.type_name(),
            }),
        }
    }
}

/// Named, ordered collection of field specs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsSchema {
    name: &'static str,
    fields: &'static [FieldSpec],
}

impl SettingsSchema {
    /// Declare a schema.
    #[must_use]
    pub const fn new(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { name, fields }
    }

    /// Schema identifier used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declared fields in declaration order.
    #[must_use]
    pub const fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Declared field names in declaration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|spec| spec.name).collect()
    }

    /// Spec for `field`, if declared.
    #[must_use]
    pub fn spec(&self, field: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|spec| spec.name == field)
    }

    /// Whether `field` is declared.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.spec(field).is_some()
    }

    /// Validate a value for a declared field.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownField`] for undeclared fields and
    /// [`SettingsError::InvalidValue`] for kind mismatches.
    pub fn validate(&self, field: &str, value: &FieldValue) -> SettingsResult<()> {
        let spec = self.spec(field).ok_or_else(|| SettingsError::UnknownField {
            field: field.to_string(),
        })?;
        spec.check(value)
    }

    /// Keep only the declared fields of `fields`.
    #[must_use]
    pub fn project(&self, fields: &FieldSet) -> FieldSet {
        fields
            .iter()
            .filter(|(field, _)| self.contains(field))
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect()
    }
}

const WRITING_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("default_post_format"),
    FieldSpec::boolean("wpcom_publish_posts_with_markdown"),
    FieldSpec::boolean("markdown_supported"),
    FieldSpec::boolean("custom-content-types"),
    FieldSpec::boolean("jetpack_testimonial"),
    FieldSpec::boolean("jetpack_portfolio"),
    FieldSpec::boolean("infinite-scroll"),
    FieldSpec::boolean("infinite_scroll"),
    FieldSpec::boolean("infinite_scroll_google_analytics"),
    FieldSpec::boolean("minileven"),
    FieldSpec::boolean("wp_mobile_excerpt"),
    FieldSpec::boolean("wp_mobile_featured_images"),
    FieldSpec::boolean("wp_mobile_app_promos"),
    FieldSpec::text("post_by_email_address").nullable(),
];

/// Fields edited by the site "Writing" settings form.
pub const WRITING_SCHEMA: SettingsSchema = SettingsSchema::new("writing", WRITING_FIELDS);
