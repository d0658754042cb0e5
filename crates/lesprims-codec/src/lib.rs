//! Typed encoders and decoders for LES and PIP light-client messages.
//!
//! Each message kind has an `encode_*` function producing wire bytes (dispatch
//! code plus RLP body) for requests and a `decode_*` function taking the
//! payload that follows the dispatch code for replies. Use
//! [`decode_incoming`] to split the envelope and dispatch in one step.
//!
//! ```
//! use lesprims_codec::encode_get_block_headers;
//! use lesprims_wire::{decode_message, MessageId, Protocol, DEFAULT_MAX_PAYLOAD};
//!
//! let wire = encode_get_block_headers(16, 7, 100u64, 5, 0, false);
//! let msg = decode_message(&wire, Protocol::Les, 16, DEFAULT_MAX_PAYLOAD).unwrap();
//! assert_eq!(msg.id, MessageId::GetBlockHeaders);
//! ```

pub mod announce;
pub mod bodies;
pub mod error;
pub mod extension;
pub mod headers;
pub mod message;
pub mod network;
pub mod pip;
pub mod proofs;
pub mod reply;
mod request;
pub mod status;
pub mod tx;

pub use announce::{decode_announce, decode_announce_with_config, Announce};
pub use bodies::{
    decode_block_bodies, decode_receipts, encode_get_block_bodies, encode_get_receipts,
    BlockBodies, BlockBody, Receipts,
};
pub use error::{DecodeError, DecodeStatus, EncodeError, EncodeResult, Result};
pub use extension::{AnnounceRequest, AnnounceValue, StatusKey, ValueShape};
pub use headers::{
    decode_block_headers, encode_get_block_headers, encode_headers_request, BlockHeaders,
    BlockReference, HeadersRequest, MAX_HEADERS_PER_REQUEST,
};
pub use message::{decode_incoming, decode_payload, Incoming};
pub use network::Network;
pub use pip::{decode_account_response, encode_account_request, AccountProof, AccountResponse};
pub use proofs::{decode_proofs_v2, encode_get_proofs_v2, ProofsRequest, ProofsV2};
pub use reply::FlowControlled;
pub use status::{
    decode_status, decode_status_with_config, encode_status, CostEntry, StatusMessage,
};
pub use tx::{
    decode_tx_status, encode_get_tx_status, encode_send_tx, encode_send_tx_v2,
    TransactionStatus, TxStatusReply,
};
