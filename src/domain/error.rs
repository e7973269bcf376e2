use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server responded with HTTP {0}")]
    HttpStatus(u16),

    #[error("Failed to read response: {0}")]
    StreamRead(String),

    #[error("Failed to save file: {0}")]
    Save(String),

    #[error("Transfer cancelled")]
    Aborted,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl TransferError {
    /// Cancellation is not an error for display purposes.
    pub fn is_aborted(&self) -> bool {
        matches!(self, TransferError::Aborted)
    }
}
