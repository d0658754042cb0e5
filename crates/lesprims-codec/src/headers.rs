//! Header synchronisation: `GetBlockHeaders` / `BlockHeaders`.

use alloy_consensus::Header;
use alloy_primitives::B256;
use alloy_rlp::{BufMut, Encodable};
use bytes::Bytes;
use lesprims_wire::{encode_list_message, ListWriter, MessageId, Result};

use crate::reply::{impl_flow_controlled, open_reply};

/// Most headers a LES server returns for one request.
pub const MAX_HEADERS_PER_REQUEST: u64 = 192;

/// Where a header range starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockReference {
    Number(u64),
    Hash(B256),
}

impl From<u64> for BlockReference {
    fn from(number: u64) -> Self {
        BlockReference::Number(number)
    }
}

impl From<B256> for BlockReference {
    fn from(hash: B256) -> Self {
        BlockReference::Hash(hash)
    }
}

impl Encodable for BlockReference {
    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            BlockReference::Number(number) => number.encode(out),
            BlockReference::Hash(hash) => hash.encode(out),
        }
    }

    fn length(&self) -> usize {
        match self {
            BlockReference::Number(number) => number.length(),
            BlockReference::Hash(hash) => hash.length(),
        }
    }
}

/// Parameters of a header range request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadersRequest {
    pub start: BlockReference,
    pub max_headers: u64,
    /// Headers omitted between consecutive returned headers.
    pub skip: u64,
    /// Walk towards genesis instead of towards the head.
    pub reverse: bool,
}

impl HeadersRequest {
    /// Block numbers a complete reply would carry, in reply order.
    ///
    /// `None` when the range starts at a hash. At most
    /// [`MAX_HEADERS_PER_REQUEST`] numbers; stops early rather than walking
    /// below genesis or past `u64::MAX`.
    pub fn expected_numbers(&self) -> Option<Vec<u64>> {
        let BlockReference::Number(start) = self.start else {
            return None;
        };
        let limit = self.max_headers.min(MAX_HEADERS_PER_REQUEST);
        let stride = self.skip.saturating_add(1);
        let mut numbers = Vec::new();
        let mut next = Some(start);
        while let Some(number) = next {
            if numbers.len() as u64 >= limit {
                break;
            }
            numbers.push(number);
            next = if self.reverse {
                number.checked_sub(stride)
            } else {
                number.checked_add(stride)
            };
        }
        Some(numbers)
    }

    fn to_list(self) -> ListWriter {
        let mut query = ListWriter::new();
        query
            .push(&self.start)
            .push(&self.max_headers)
            .push(&self.skip)
            .push(&self.reverse);
        query
    }
}

/// Encode a `GetBlockHeaders` request.
///
/// `[reqId, [block, maxHeaders, skip, reverse]]`
pub fn encode_get_block_headers(
    offset: u16,
    req_id: u64,
    start: impl Into<BlockReference>,
    max_headers: u64,
    skip: u64,
    reverse: bool,
) -> Bytes {
    let request = HeadersRequest {
        start: start.into(),
        max_headers,
        skip,
        reverse,
    };
    encode_headers_request(offset, req_id, &request)
}

/// Encode a `GetBlockHeaders` request from its parameters.
pub fn encode_headers_request(offset: u16, req_id: u64, request: &HeadersRequest) -> Bytes {
    let mut body = ListWriter::new();
    body.push(&req_id).push_list(request.to_list());
    encode_list_message(MessageId::GetBlockHeaders, offset, &body)
}

/// A decoded `BlockHeaders` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeaders {
    pub req_id: u64,
    pub buffer_value: u64,
    pub headers: Vec<Header>,
}

impl_flow_controlled!(BlockHeaders, buffer_value);

/// Decode a `BlockHeaders` payload: `[reqId, bv, [header, ...]]`.
pub fn decode_block_headers(payload: &[u8]) -> Result<BlockHeaders> {
    let (req_id, buffer_value, mut reply) = open_reply(payload)?;
    let headers = reply
        .list("headers")?
        .collect(|list| list.item::<Header>("header"))?;
    reply.finish()?;

    Ok(BlockHeaders {
        req_id,
        buffer_value,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::FlowControlled;
    use lesprims_wire::{decode_message, DecodeStatus, ListReader, Protocol, DEFAULT_MAX_PAYLOAD};

    fn header(number: u64) -> Header {
        Header {
            number,
            gas_limit: 8_000_000,
            timestamp: 1_500_000_000 + number * 15,
            ..Default::default()
        }
    }

    fn headers_reply(req_id: u64, bv: u64, headers: &[Header]) -> Bytes {
        let mut reply = ListWriter::new();
        reply
            .push(&req_id)
            .push(&bv)
            .push_list(ListWriter::from_items(headers));
        reply.finish()
    }

    #[test]
    fn request_layout() {
        let wire = encode_get_block_headers(0, 7, 100u64, 5, 0, false);
        let msg = decode_message(&wire, Protocol::Les, 0, DEFAULT_MAX_PAYLOAD).unwrap();
        assert_eq!(msg.id, MessageId::GetBlockHeaders);

        let mut body = ListReader::top_level(&msg.payload).unwrap();
        assert_eq!(body.item::<u64>("reqId").unwrap(), 7);
        let mut query = body.list("query").unwrap();
        assert_eq!(query.item::<u64>("block").unwrap(), 100);
        assert_eq!(query.item::<u64>("maxHeaders").unwrap(), 5);
        assert_eq!(query.item::<u64>("skip").unwrap(), 0);
        assert!(!query.item::<bool>("reverse").unwrap());
        query.finish().unwrap();
        body.finish().unwrap();
    }

    #[test]
    fn request_by_hash() {
        let hash = B256::repeat_byte(0x5a);
        let wire = encode_get_block_headers(16, 1, hash, 1, 0, true);
        let msg = decode_message(&wire, Protocol::Les, 16, DEFAULT_MAX_PAYLOAD).unwrap();

        let mut body = ListReader::top_level(&msg.payload).unwrap();
        body.item::<u64>("reqId").unwrap();
        let mut query = body.list("query").unwrap();
        assert_eq!(query.hash("block").unwrap(), hash);
    }

    #[test]
    fn ascending_reply_scenario() {
        let request = HeadersRequest {
            start: BlockReference::Number(100),
            max_headers: 5,
            skip: 0,
            reverse: false,
        };
        let expected = request.expected_numbers().unwrap();
        assert_eq!(expected, vec![100, 101, 102, 103, 104]);

        let sent: Vec<Header> = expected.iter().copied().map(header).collect();
        let reply = decode_block_headers(&headers_reply(7, 200, &sent)).unwrap();

        assert_eq!(reply.req_id(), 7);
        assert_eq!(reply.buffer_value(), 200);
        assert_eq!(reply.headers.len(), 5);
        let numbers: Vec<u64> = reply.headers.iter().map(|h| h.number).collect();
        assert_eq!(numbers, expected);
        assert_eq!(reply.headers, sent);
    }

    #[test]
    fn expected_numbers_with_skip_and_reverse() {
        let request = HeadersRequest {
            start: BlockReference::Number(10),
            max_headers: 5,
            skip: 2,
            reverse: true,
        };
        assert_eq!(request.expected_numbers().unwrap(), vec![10, 7, 4, 1]);

        let forward = HeadersRequest {
            reverse: false,
            ..request
        };
        assert_eq!(forward.expected_numbers().unwrap(), vec![10, 13, 16, 19, 22]);

        let by_hash = HeadersRequest {
            start: BlockReference::Hash(B256::ZERO),
            ..request
        };
        assert_eq!(by_hash.expected_numbers(), None);
    }

    #[test]
    fn expected_numbers_are_capped() {
        let request = HeadersRequest {
            start: BlockReference::Number(0),
            max_headers: u64::MAX,
            skip: 0,
            reverse: false,
        };
        let numbers = request.expected_numbers().unwrap();
        assert_eq!(numbers.len() as u64, MAX_HEADERS_PER_REQUEST);
        assert_eq!(numbers.last(), Some(&(MAX_HEADERS_PER_REQUEST - 1)));
    }

    #[test]
    fn empty_reply() {
        let reply = decode_block_headers(&headers_reply(3, 0, &[])).unwrap();
        assert!(reply.headers.is_empty());
    }

    #[test]
    fn malformed_header_is_unable_to_decode() {
        let mut reply = ListWriter::new();
        let mut headers = ListWriter::new();
        headers.push(&42u64);
        reply.push(&1u64).push(&2u64).push_list(headers);

        let result = decode_block_headers(&reply.finish());
        assert_eq!(DecodeStatus::of(&result), DecodeStatus::UnableToDecode);
    }

    #[test]
    fn missing_header_list() {
        let mut reply = ListWriter::new();
        reply.push(&1u64).push(&2u64);
        let result = decode_block_headers(&reply.finish());
        assert_eq!(result.unwrap_err(), lesprims_wire::DecodeError::MissingField("headers"));
    }
}
