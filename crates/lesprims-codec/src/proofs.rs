//! Batched Merkle proof retrieval (`GetProofsV2` / `ProofsV2`).

use alloy_primitives::B256;
use alloy_rlp::{RlpDecodable, RlpEncodable};
use bytes::Bytes;
use lesprims_wire::{encode_list_message, ListWriter, MessageId, Result};

use crate::reply::{impl_flow_controlled, open_reply};

/// One proof lookup in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, RlpEncodable, RlpDecodable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProofsRequest {
    pub block_hash: B256,
    /// Account key, or the storage trie's account for storage proofs.
    pub key: B256,
    /// Storage slot key; zero for account proofs.
    pub key2: B256,
    /// Trie depth the requester already holds.
    pub from_level: u64,
}

impl ProofsRequest {
    /// Account proof from the trie root.
    pub fn account(block_hash: B256, key: B256) -> Self {
        Self {
            block_hash,
            key,
            key2: B256::ZERO,
            from_level: 0,
        }
    }
}

/// Encode a `GetProofsV2` request: `[reqId, [[blockHash, key, key2, fromLevel], ...]]`.
pub fn encode_get_proofs_v2(offset: u16, req_id: u64, requests: &[ProofsRequest]) -> Bytes {
    let mut body = ListWriter::new();
    body.push(&req_id).push_list(ListWriter::from_items(requests));
    encode_list_message(MessageId::GetProofsV2, offset, &body)
}

/// A decoded `ProofsV2` reply.
///
/// LES/2 merges the proofs of a whole batch into one deduplicated node set, so
/// the node count is unrelated to the number of requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofsV2 {
    pub req_id: u64,
    pub buffer_value: u64,
    /// Trie nodes, each kept as its complete RLP item.
    pub nodes: Vec<Bytes>,
}

impl_flow_controlled!(ProofsV2, buffer_value);

/// Decode a `ProofsV2` payload: `[reqId, bv, [node, ...]]`.
pub fn decode_proofs_v2(payload: &[u8]) -> Result<ProofsV2> {
    let (req_id, buffer_value, mut reply) = open_reply(payload)?;
    let nodes = reply
        .list("nodes")?
        .collect(|list| list.raw("node").map(Bytes::copy_from_slice))?;
    reply.finish()?;

    Ok(ProofsV2 {
        req_id,
        buffer_value,
        nodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesprims_wire::{decode_message, DecodeStatus, ListReader, Protocol, DEFAULT_MAX_PAYLOAD};

    fn node(tag: u8) -> ListWriter {
        let mut node = ListWriter::new();
        node.push(&[tag; 3][..]).push(&B256::repeat_byte(tag));
        node
    }

    #[test]
    fn request_batch_layout() {
        let requests = [
            ProofsRequest::account(B256::repeat_byte(1), B256::repeat_byte(0xa1)),
            ProofsRequest::account(B256::repeat_byte(1), B256::repeat_byte(0xa2)),
            ProofsRequest {
                block_hash: B256::repeat_byte(2),
                key: B256::repeat_byte(0xa3),
                key2: B256::repeat_byte(0x07),
                from_level: 2,
            },
        ];
        let wire = encode_get_proofs_v2(16, 21, &requests);
        let msg = decode_message(&wire, Protocol::Les, 16, DEFAULT_MAX_PAYLOAD).unwrap();
        assert_eq!(msg.id, MessageId::GetProofsV2);
        assert_eq!(msg.code, 16 + 0x0f);

        let mut body = ListReader::top_level(&msg.payload).unwrap();
        assert_eq!(body.item::<u64>("reqId").unwrap(), 21);
        let decoded = body
            .list("requests")
            .unwrap()
            .collect(|list| list.item::<ProofsRequest>("request"))
            .unwrap();
        assert_eq!(decoded, requests);
        body.finish().unwrap();
    }

    #[test]
    fn reply_reports_nodes_present() {
        // three requests answered by a merged set of two nodes
        let mut nodes = ListWriter::new();
        nodes.push_list(node(1)).push_list(node(2));
        let mut reply = ListWriter::new();
        reply.push(&21u64).push(&900u64).push_list(nodes);

        let proofs = decode_proofs_v2(&reply.finish()).unwrap();
        assert_eq!(proofs.req_id, 21);
        assert_eq!(proofs.buffer_value, 900);
        assert_eq!(proofs.nodes.len(), 2);

        assert_eq!(proofs.nodes[0], node(1).finish());
        let mut reader = ListReader::top_level(&proofs.nodes[1]).unwrap();
        assert_eq!(reader.string("path").unwrap(), &[2u8; 3]);
    }

    #[test]
    fn missing_budget() {
        let mut reply = ListWriter::new();
        reply.push(&21u64);
        let result = decode_proofs_v2(&reply.finish());
        assert_eq!(result, Err(lesprims_wire::DecodeError::MissingField("bufferValue")));
        assert_eq!(DecodeStatus::of(&result), DecodeStatus::UnableToDecode);
    }
}
