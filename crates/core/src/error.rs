//! Error types for the constellation core.
//!
//! The simulation itself cannot fail; these errors come from the surfaces
//! around it (color parsing, snapshot sizes, file output).

use thiserror::Error;

/// Errors produced by constellation operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero (or overflowed) where a non-empty surface is required.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A field parameter was present but unusable.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Writing a snapshot or seed file failed.
    #[error("i/o error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let err = EngineError::InvalidDimensions;
        let msg = format!("{err}");
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn invalid_color_includes_message() {
        let err = EngineError::InvalidColor("bad hex".into());
        let msg = format!("{err}");
        assert!(msg.contains("bad hex"), "missing message in: {msg}");
    }

    #[test]
    fn invalid_param_includes_message() {
        let err = EngineError::InvalidParam("density must be at least 1".into());
        assert!(err.to_string().contains("density"));
    }

    #[test]
    fn io_includes_message() {
        let err = EngineError::Io("disk full".into());
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn engine_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn engine_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<EngineError>();
    }
}
