//! LES and PIP light-client message codec.
//!
//! lesprims maps every light-client message a client sends or receives between
//! its typed form and the RLP wire tree, with a strict error taxonomy for
//! malformed input.
//!
//! # Crate Structure
//!
//! - [`wire`]: Message identifiers, the dispatch envelope, RLP list helpers and decode errors
//! - [`codec`]: Per-message encoders and decoders (status, announce, headers,
//!   bodies, receipts, proofs, PIP accounts, transaction relay)

/// Re-export wire types.
pub mod wire {
    pub use lesprims_wire::*;
}

/// Re-export codec types.
pub mod codec {
    pub use lesprims_codec::*;
}

pub use lesprims_codec::{decode_incoming, DecodeError, DecodeStatus, Incoming, Network};
pub use lesprims_wire::{DecodeConfig, MessageId, Protocol};
