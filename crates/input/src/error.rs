//! Error types for terminal input operations

use std::io;
use thiserror::Error;

use crate::types::QueryKind;

/// Terminal input error type
#[derive(Error, Debug)]
pub enum InputError {
    /// I/O error while writing a query or control sequence
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A request of the same kind is still waiting for its reply
    #[error("a {0} query is already pending")]
    QueryPending(QueryKind),

    /// The reader thread stopped before the reply arrived
    #[error("terminal input closed before the reply arrived")]
    ReaderClosed,
}

/// Result type for terminal input operations
pub type Result<T> = std::result::Result<T, InputError>;
