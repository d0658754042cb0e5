//! Block bodies and receipts, both requested by block hash.

use alloy_consensus::{Header, ReceiptEnvelope, TxEnvelope};
use alloy_primitives::B256;
use bytes::Bytes;
use lesprims_wire::{ListReader, MessageId, Result};

use crate::network::Network;
use crate::reply::{impl_flow_controlled, open_reply};
use crate::request::encode_hash_request;

/// Transactions and ommer headers of one block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockBody {
    pub transactions: Vec<TxEnvelope>,
    pub ommers: Vec<Header>,
}

impl BlockBody {
    fn decode(body: &mut ListReader<'_>, network: &Network) -> Result<Self> {
        let mut parts = body.list("body")?;
        let transactions = network.decode_transactions(parts.list("transactions")?)?;
        let ommers = parts
            .list("ommers")?
            .collect(|list| list.item::<Header>("ommer"))?;
        parts.finish()?;
        Ok(Self {
            transactions,
            ommers,
        })
    }
}

/// Encode a `GetBlockBodies` request: `[reqId, [hash, ...]]`.
pub fn encode_get_block_bodies(offset: u16, req_id: u64, hashes: &[B256]) -> Bytes {
    encode_hash_request(MessageId::GetBlockBodies, offset, req_id, hashes)
}

/// A decoded `BlockBodies` reply, one body per requested hash in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockBodies {
    pub req_id: u64,
    pub buffer_value: u64,
    pub bodies: Vec<BlockBody>,
}

impl BlockBodies {
    /// Split every body into parallel transaction and ommer vectors.
    pub fn into_parts(self) -> (Vec<Vec<TxEnvelope>>, Vec<Vec<Header>>) {
        self.bodies
            .into_iter()
            .map(|body| (body.transactions, body.ommers))
            .unzip()
    }
}

impl_flow_controlled!(BlockBodies, buffer_value);

/// Decode a `BlockBodies` payload: `[reqId, bv, [[[tx, ...], [ommer, ...]], ...]]`.
///
/// Every transaction is checked against `network`.
pub fn decode_block_bodies(payload: &[u8], network: &Network) -> Result<BlockBodies> {
    let (req_id, buffer_value, mut reply) = open_reply(payload)?;
    let bodies = reply
        .list("bodies")?
        .collect(|list| BlockBody::decode(list, network))?;
    reply.finish()?;

    Ok(BlockBodies {
        req_id,
        buffer_value,
        bodies,
    })
}

/// Encode a `GetReceipts` request: `[reqId, [hash, ...]]`.
pub fn encode_get_receipts(offset: u16, req_id: u64, hashes: &[B256]) -> Bytes {
    encode_hash_request(MessageId::GetReceipts, offset, req_id, hashes)
}

/// A decoded `Receipts` reply: one receipt list per requested block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipts {
    pub req_id: u64,
    pub buffer_value: u64,
    pub receipts: Vec<Vec<ReceiptEnvelope>>,
}

impl_flow_controlled!(Receipts, buffer_value);

/// Decode a `Receipts` payload: `[reqId, bv, [[receipt, ...], ...]]`.
pub fn decode_receipts(payload: &[u8]) -> Result<Receipts> {
    let (req_id, buffer_value, mut reply) = open_reply(payload)?;
    let receipts = reply.list("receipts")?.collect(|blocks| {
        blocks
            .list("block receipts")?
            .collect(|list| list.item::<ReceiptEnvelope>("receipt"))
    })?;
    reply.finish()?;

    Ok(Receipts {
        req_id,
        buffer_value,
        receipts,
    })
}
