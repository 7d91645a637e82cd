//! Error types for hardware configuration.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while configuring the output-line surface.
///
/// Line drive itself is infallible; only configuration can go wrong.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The same physical pin was assigned to both data lines.
    #[error("D0 and D1 assigned to the same pin: {pin}")]
    ConflictingLines { pin: u8 },

    /// The requested backend is not compiled in.
    #[error("Unsupported backend: {backend}")]
    UnsupportedBackend { backend: String },
}

impl HardwareError {
    /// Create a conflicting-lines error.
    pub fn conflicting_lines(pin: u8) -> Self {
        Self::ConflictingLines { pin }
    }

    /// Create an unsupported-backend error.
    pub fn unsupported_backend(backend: impl Into<String>) -> Self {
        Self::UnsupportedBackend {
            backend: backend.into(),
        }
    }
}
