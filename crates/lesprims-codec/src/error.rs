pub use lesprims_wire::{DecodeError, DecodeStatus, Result};

/// Errors that can occur while encoding a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// A transaction is replay-protected for a different chain than the network.
    #[error("transaction {index} is bound to chain {found}, network is {expected}")]
    ChainMismatch {
        index: usize,
        expected: u64,
        found: u64,
    },
}

pub type EncodeResult<T> = std::result::Result<T, EncodeError>;
