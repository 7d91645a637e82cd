use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Encoding errors
    #[error("Unsupported Wiegand bit length: {bits} (expected 26, 34, or 40)")]
    UnsupportedBitLength { bits: u8 },

    #[error("Invalid MAC address '{input}': {reason}")]
    InvalidMacAddress { input: String, reason: String },

    // Service errors
    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration key: {0}")]
    MissingConfig(String),
}

impl Error {
    /// Create an invalid-MAC error.
    pub fn invalid_mac(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidMacAddress {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
