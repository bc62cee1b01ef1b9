//! Error types for the holofield core.

use thiserror::Error;

/// Errors produced while building or configuring a field.
///
/// Run-time degenerate geometry is never reported through this type; ticks and
/// renders against an empty surface simply do nothing.
#[derive(Debug, Error)]
pub enum FieldError {
    /// Width or height was zero (or the pixel area overflowed).
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A configuration value was present but unusable.
    #[error("invalid configuration for '{name}': {reason}")]
    InvalidConfig { name: String, reason: String },

    /// A parameter existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// No field is registered under the requested name.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Writing an output artifact failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl FieldError {
    /// Shorthand for [`FieldError::InvalidConfig`].
    pub fn config(name: impl Into<String>, reason: impl Into<String>) -> Self {
        FieldError::InvalidConfig {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let msg = FieldError::InvalidDimensions.to_string();
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn invalid_config_includes_name_and_reason() {
        let msg = FieldError::config("count", "must be a non-negative integer").to_string();
        assert!(msg.contains("count"), "missing name in: {msg}");
        assert!(msg.contains("non-negative"), "missing reason in: {msg}");
    }

    #[test]
    fn param_type_mismatch_includes_all_fields() {
        let err = FieldError::ParamTypeMismatch {
            name: "damping".into(),
            expected: "number".into(),
            got: "string".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("damping"), "missing param name in: {msg}");
        assert!(msg.contains("number"), "missing expected type in: {msg}");
        assert!(msg.contains("string"), "missing got type in: {msg}");
    }

    #[test]
    fn unknown_field_includes_name() {
        let msg = FieldError::UnknownField("aurora".into()).to_string();
        assert!(msg.contains("aurora"), "missing name in: {msg}");
    }

    #[test]
    fn field_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FieldError>();
    }

    #[test]
    fn field_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<FieldError>();
    }
}
