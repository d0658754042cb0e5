use alloy_rlp::{Decodable, Encodable};
use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::error::{DecodeError, Result};
use crate::message_id::{MessageId, Protocol};
use crate::rlp::ListWriter;

/// Default maximum payload size: 10 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 10 * 1024 * 1024;

/// A message split from its dispatch code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Resolved message kind.
    pub id: MessageId,
    /// Raw dispatch code as seen on the wire (offset included).
    pub code: u64,
    /// RLP payload following the dispatch code.
    pub payload: Bytes,
}

impl Message {
    /// Create a message for a sub-protocol negotiated at `offset`.
    pub fn new(id: MessageId, offset: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            id,
            code: id.wire_code(offset),
            payload: payload.into(),
        }
    }

    /// The total wire size of this message (dispatch code + payload).
    pub fn wire_size(&self) -> usize {
        self.code.length() + self.payload.len()
    }

    /// Check that this message is of the expected kind.
    pub fn expect(self, expected: MessageId) -> Result<Self> {
        if self.id != expected {
            return Err(DecodeError::UnexpectedMessage {
                expected,
                found: self.id,
            });
        }
        Ok(self)
    }

    /// Encode into the wire format.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.wire_size());
        self.code.encode(&mut out);
        out.put_slice(&self.payload);
        out.freeze()
    }
}

/// Encode a message into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────────────────┬──────────────────────────┐
/// │ rlp(offset + code)     │ body (one RLP item)      │
/// └────────────────────────┴──────────────────────────┘
/// ```
pub fn encode_message(id: MessageId, offset: u16, body: &[u8], dst: &mut BytesMut) {
    let code = id.wire_code(offset);
    dst.reserve(code.length() + body.len());
    code.encode(dst);
    dst.put_slice(body);
}

/// Encode a message whose body is a list.
pub fn encode_list_message(id: MessageId, offset: u16, body: &ListWriter) -> Bytes {
    let code = id.wire_code(offset);
    let mut dst = BytesMut::with_capacity(code.length() + body.encoded_len());
    code.encode(&mut dst);
    body.encode_into(&mut dst);
    dst.freeze()
}

/// Split a message into its kind and payload.
///
/// Fails with [`DecodeError::InvalidMessageId`] when the dispatch code is not a
/// known message of `protocol` under `offset`.
pub fn decode_message(
    src: &[u8],
    protocol: Protocol,
    offset: u16,
    max_payload: usize,
) -> Result<Message> {
    let mut buf = src;
    let code = u64::decode(&mut buf)?;

    let Some(id) = MessageId::resolve(protocol, code, offset) else {
        trace!(code, offset, protocol = protocol.name(), "unknown message code");
        return Err(DecodeError::InvalidMessageId { code, offset });
    };

    if buf.len() > max_payload {
        return Err(DecodeError::PayloadTooLarge {
            size: buf.len(),
            max: max_payload,
        });
    }

    Ok(Message {
        id,
        code,
        payload: Bytes::copy_from_slice(buf),
    })
}
