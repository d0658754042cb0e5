//! Wire-level building blocks for the LES and PIP light-client protocols.
//!
//! Every message on the wire is a dispatch code followed by one RLP tree:
//! - the dispatch code is the sub-protocol offset negotiated by the session
//!   plus the message's base code ([`MessageId`])
//! - the tree is walked with [`ListReader`] and built with [`ListWriter`]
//!
//! Decoding never panics on hostile input. Failures are reported as a
//! [`DecodeError`], classified into a [`DecodeStatus`].

pub mod config;
pub mod envelope;
pub mod error;
pub mod message_id;
pub mod rlp;

pub use config::{DecodeConfig, UnknownKeyPolicy};
pub use envelope::{
    decode_message, encode_list_message, encode_message, Message, DEFAULT_MAX_PAYLOAD,
};
pub use error::{DecodeError, DecodeStatus, Result};
pub use message_id::{MessageId, Protocol};
pub use rlp::{ListReader, ListWriter};
