// auto-retry-rs/src/error.rs
// Structured operation errors produced by wrapped actions.

/// Error surface for operations run under the retry engine.
///
/// Callers construct the variant matching what actually failed; the
/// classifier derives retryability and category from it. Platform-style
/// network codes (ETIMEDOUT, ECONNRESET, ...) are carried verbatim in
/// `Network` so classification can key on them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    #[error("{message}")]
    Network { code: String, message: String },

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{message}")]
    Timeout { message: String },

    #[error("{message}")]
    Other { name: String, message: String },
}

impl OperationError {
    pub fn network(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn other(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Other {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Network { message, .. }
            | Self::Http { message, .. }
            | Self::Timeout { message }
            | Self::Other { message, .. } => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
