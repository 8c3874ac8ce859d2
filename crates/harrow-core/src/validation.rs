//! Validation error type for configuration values.
//!
//! Every value read from the cleanup configuration is checked before any
//! container runtime call is made. A failed check is reported as a
//! [`ValidationError`] naming the offending field and value.

use std::fmt;

/// A cleanup configuration value that was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Path of the rejected key (e.g. `images[2].olderThan`).
    pub field: String,
    /// What was wrong with the value, quoting it where useful.
    pub message: String,
    /// Which check rejected the value.
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    /// Builds an error for `field` with an explicit kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use harrow_core::ValidationError;
    /// use harrow_core::validation::ValidationErrorKind;
    ///
    /// let error = ValidationError::new("olderThan", "unknown unit 'q' in '3 q'", ValidationErrorKind::Format);
    /// assert_eq!(error.field, "olderThan");
    /// ```
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        kind: ValidationErrorKind,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind,
        }
    }

    /// An empty key that must be set, such as `repository`.
    pub fn required(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("'{field}' is required but was empty");
        Self::new(field, message, ValidationErrorKind::Required)
    }

    /// A string that does not parse, such as a malformed `olderThan`.
    pub fn format(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, ValidationErrorKind::Format)
    }

    /// A number outside its bounds, such as a negative `keepNumber`.
    pub fn range(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, ValidationErrorKind::Range)
    }

    /// A value outside a closed set, such as an unknown cleanup `type`.
    pub fn constraint(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, ValidationErrorKind::Constraint)
    }

    /// Prefixes the field path with its parent, e.g. `type` becomes `images[0].type`.
    #[must_use]
    pub fn nested(mut self, parent: &str) -> Self {
        self.field = if self.field.is_empty() {
            parent.to_string()
        } else {
            format!("{parent}.{}", self.field)
        };
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Which check rejected a configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// Missing or empty.
    Required,
    /// Unparseable text.
    Format,
    /// Number out of bounds.
    Range,
    /// Not one of the accepted spellings.
    Constraint,
}

impl ValidationErrorKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Format => "format",
            Self::Range => "range",
            Self::Constraint => "constraint",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_repository_is_required() {
        let error = ValidationError::required("repository");
        assert_eq!(error.field, "repository");
        assert_eq!(error.kind, ValidationErrorKind::Required);
        assert!(error.message.contains("'repository'"));
    }

    #[test]
    fn test_format_keeps_message() {
        let error = ValidationError::format("olderThan", "expected '<int> <unit>'");
        assert_eq!(error.kind, ValidationErrorKind::Format);
        assert_eq!(error.message, "expected '<int> <unit>'");
    }

    #[test]
    fn test_nested_field_path() {
        let error = ValidationError::range("keepNumber", "must be >= 0").nested("images[3]");
        assert_eq!(error.field, "images[3].keepNumber");

        let error = ValidationError::format("", "bad").nested("olderThan");
        assert_eq!(error.field, "olderThan");
    }

    #[test]
    fn test_display_names_field_and_value() {
        let error = ValidationError::constraint("images[0].type", "unknown cleanup type 'foo'");
        assert_eq!(
            error.to_string(),
            "validation error for 'images[0].type': unknown cleanup type 'foo'"
        );
    }

    #[test]
    fn test_kind_display() {
        let kinds = [
            ValidationErrorKind::Required,
            ValidationErrorKind::Format,
            ValidationErrorKind::Range,
            ValidationErrorKind::Constraint,
        ];
        let names: Vec<String> = kinds.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["required", "format", "range", "constraint"]);
    }
}
