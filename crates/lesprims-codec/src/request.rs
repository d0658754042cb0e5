use alloy_primitives::B256;
use bytes::Bytes;
use lesprims_wire::{encode_list_message, ListWriter, MessageId};

/// Encode a `[reqId, [hash, ...]]` request.
pub(crate) fn encode_hash_request(
    id: MessageId,
    offset: u16,
    req_id: u64,
    hashes: &[B256],
) -> Bytes {
    let mut body = ListWriter::new();
    body.push(&req_id).push_list(ListWriter::from_items(hashes));
    encode_list_message(id, offset, &body)
}
