//! Error types for mounting and rendering effects

use thiserror::Error;

/// Errors raised while attaching an effect to a page or GPU surface.
/// The browser entry point logs these and leaves the page untouched.
#[derive(Debug, Error)]
pub enum FxError {
    #[error("No global window")]
    MissingWindow,

    #[error("No document on window")]
    MissingDocument,

    #[error("Surface element not found: {0}")]
    MissingSurface(String),

    #[error("Element is not a canvas: {0}")]
    NotACanvas(String),

    #[error("Rendering context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

/// Result type alias for effect operations
pub type Result<T> = std::result::Result<T, FxError>;

impl From<serde_json::Error> for FxError {
    fn from(err: serde_json::Error) -> Self {
        FxError::Settings(err.to_string())
    }
}

impl From<wgpu::CreateSurfaceError> for FxError {
    fn from(err: wgpu::CreateSurfaceError) -> Self {
        FxError::Gpu(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_element() {
        let err = FxError::MissingSurface("slime".into());
        assert_eq!(err.to_string(), "Surface element not found: slime");
        let err = FxError::ContextUnavailable("2d".into());
        assert!(err.to_string().contains("2d"));
    }

    #[test]
    fn test_json_errors_convert() {
        let err: FxError = serde_json::from_str::<u32>("nope").map_err(FxError::from).unwrap_err();
        assert!(matches!(err, FxError::Settings(_)));
    }
}
