use std::fmt;

use crate::message_id::MessageId;

/// Errors that can occur while decoding an LES/PIP message.
///
/// Every variant falls into exactly one [`DecodeStatus`] class; see
/// [`DecodeError::status`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The dispatch code does not name a known message under the given offset.
    #[error("invalid message id 0x{code:02x} (offset {offset})")]
    InvalidMessageId { code: u64, offset: u16 },

    /// The envelope carried a known message, but not the one the caller asked for.
    #[error("expected {expected} message, got {found}")]
    UnexpectedMessage {
        expected: MessageId,
        found: MessageId,
    },

    /// A status/announce key-value pair has an unknown key or a badly shaped value.
    #[error("invalid status key/value pair '{key}': {reason}")]
    InvalidStatusKeyPair { key: String, reason: &'static str },

    /// The RLP engine rejected the input.
    #[error("rlp error: {0}")]
    Rlp(#[from] alloy_rlp::Error),

    /// The tree is well-formed RLP but has the wrong shape.
    #[error("malformed message: {0}")]
    Malformed(&'static str),

    /// A mandatory field is missing.
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A decoded transaction is bound to a different chain.
    #[error("transaction for chain {found} on network {expected}")]
    WrongNetwork { expected: u64, found: u64 },
}

impl DecodeError {
    /// Classify this error into the shared decode status.
    pub fn status(&self) -> DecodeStatus {
        match self {
            DecodeError::InvalidMessageId { .. } | DecodeError::UnexpectedMessage { .. } => {
                DecodeStatus::InvalidMessageId
            }
            DecodeError::InvalidStatusKeyPair { .. } => DecodeStatus::InvalidStatusKeyPair,
            _ => DecodeStatus::UnableToDecode,
        }
    }

    /// Shorthand for [`DecodeError::InvalidStatusKeyPair`].
    pub fn invalid_pair(key: impl Into<String>, reason: &'static str) -> Self {
        DecodeError::InvalidStatusKeyPair {
            key: key.into(),
            reason,
        }
    }
}

/// Result discriminator shared by every decode entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeStatus {
    Success,
    InvalidMessageId,
    InvalidStatusKeyPair,
    UnableToDecode,
}

impl DecodeStatus {
    /// Status of a decode result; `Ok` is always [`DecodeStatus::Success`].
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => DecodeStatus::Success,
            Err(err) => err.status(),
        }
    }

    pub fn is_success(self) -> bool {
        self == DecodeStatus::Success
    }
}

impl fmt::Display for DecodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DecodeStatus::Success => "success",
            DecodeStatus::InvalidMessageId => "invalid message id",
            DecodeStatus::InvalidStatusKeyPair => "invalid status key/value pair",
            DecodeStatus::UnableToDecode => "unable to decode",
        };
        f.write_str(name)
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        let err = DecodeError::InvalidMessageId { code: 0x30, offset: 16 };
        assert_eq!(err.status(), DecodeStatus::InvalidMessageId);

        let err = DecodeError::invalid_pair("bogus", "unknown key");
        assert_eq!(err.status(), DecodeStatus::InvalidStatusKeyPair);

        assert_eq!(
            DecodeError::Rlp(alloy_rlp::Error::InputTooShort).status(),
            DecodeStatus::UnableToDecode
        );
        assert_eq!(
            DecodeError::MissingField("headTd").status(),
            DecodeStatus::UnableToDecode
        );
    }

    #[test]
    fn status_of_result() {
        let ok: Result<u8> = Ok(1);
        assert!(DecodeStatus::of(&ok).is_success());

        let err: Result<u8> = Err(DecodeError::Malformed("expected list"));
        assert_eq!(DecodeStatus::of(&err), DecodeStatus::UnableToDecode);
        assert_eq!(DecodeStatus::of(&err).to_string(), "unable to decode");
    }
}
