//! Error types for spendview-ledger

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid cursor: {cursor}")]
    InvalidCursor { cursor: String },

    #[error("Invalid page: {page}")]
    InvalidPage { page: usize },

    #[error("Employee id cannot be empty")]
    EmptyEmployeeId,

    #[error("Transaction not found: {id}")]
    TransactionNotFound { id: String },

    #[error("Dataset error: {message}")]
    Dataset { message: String },

    #[error("Request failed: {message}")]
    Request { message: String },

    #[error("IO error")]
    IoError(#[from] io::Error),
}

impl TransportError {
    pub fn request(message: impl Into<String>) -> Self {
        TransportError::Request { message: message.into() }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(error: serde_json::Error) -> Self {
        TransportError::Dataset { message: error.to_string() }
    }
}
