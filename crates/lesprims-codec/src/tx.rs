//! Transaction relay and status queries.
//!
//! Relay encoders refuse transactions replay-protected for a chain other than
//! the target [`Network`]; see [`crate::network`].

use alloy_consensus::TxEnvelope;
use alloy_primitives::B256;
use bytes::Bytes;
use lesprims_wire::{encode_list_message, DecodeError, ListReader, ListWriter, MessageId, Result};
use tracing::debug;

use crate::error::{EncodeError, EncodeResult};
use crate::network::Network;
use crate::reply::{impl_flow_controlled, open_reply};
use crate::request::encode_hash_request;

fn transaction_list(txs: &[TxEnvelope], network: &Network) -> EncodeResult<ListWriter> {
    for (index, tx) in txs.iter().enumerate() {
        network
            .check(tx)
            .map_err(|found| EncodeError::ChainMismatch {
                index,
                expected: network.chain_id,
                found,
            })?;
    }
    Ok(ListWriter::from_items(txs))
}

/// Encode a LES/1 `SendTx` message: `[tx, ...]`.
pub fn encode_send_tx(offset: u16, txs: &[TxEnvelope], network: &Network) -> EncodeResult<Bytes> {
    let body = transaction_list(txs, network)?;
    Ok(encode_list_message(MessageId::SendTx, offset, &body))
}

/// Encode a LES/2 `SendTxV2` message: `[reqId, [tx, ...]]`.
///
/// The peer answers with a `TxStatus` reply for the same request id.
pub fn encode_send_tx_v2(
    offset: u16,
    req_id: u64,
    txs: &[TxEnvelope],
    network: &Network,
) -> EncodeResult<Bytes> {
    let mut body = ListWriter::new();
    body.push(&req_id).push_list(transaction_list(txs, network)?);
    Ok(encode_list_message(MessageId::SendTxV2, offset, &body))
}

/// Encode a `GetTxStatus` request: `[reqId, [hash, ...]]`.
pub fn encode_get_tx_status(offset: u16, req_id: u64, hashes: &[B256]) -> Bytes {
    encode_hash_request(MessageId::GetTxStatus, offset, req_id, hashes)
}

/// Where a relayed transaction stands on the serving node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransactionStatus {
    Unknown,
    Queued,
    Pending,
    Included {
        block_hash: B256,
        block_number: u64,
        tx_index: u64,
    },
    Error(String),
    /// A status code this codec does not know.
    Other(u64),
}

impl TransactionStatus {
    pub fn code(&self) -> u64 {
        match self {
            TransactionStatus::Unknown => 0,
            TransactionStatus::Queued => 1,
            TransactionStatus::Pending => 2,
            TransactionStatus::Included { .. } => 3,
            TransactionStatus::Error(_) => 4,
            TransactionStatus::Other(code) => *code,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransactionStatus::Unknown => "unknown",
            TransactionStatus::Queued => "queued",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Included { .. } => "included",
            TransactionStatus::Error(_) => "error",
            TransactionStatus::Other(_) => "other",
        }
    }

    /// Decode one entry.
    ///
    /// Accepts `[status, data]` as well as `[status, lookup, error]`, where the
    /// lookup is an empty list unless the transaction is included. Items after
    /// the recognised ones are ignored.
    fn decode(entry: &mut ListReader<'_>) -> Result<Self> {
        let code = entry.item::<u64>("status")?;

        let mut lookup = None;
        if entry.next_is_list() {
            let list = entry.list("lookup")?;
            if !list.is_empty() {
                lookup = Some(list);
            }
        }
        let error = if entry.is_empty() || entry.next_is_list() {
            None
        } else {
            Some(String::from_utf8_lossy(entry.string("error")?).into_owned())
        };

        Ok(match code {
            0 => TransactionStatus::Unknown,
            1 => TransactionStatus::Queued,
            2 => TransactionStatus::Pending,
            3 => {
                let Some(mut lookup) = lookup else {
                    return Err(DecodeError::MissingField("lookup"));
                };
                TransactionStatus::Included {
                    block_hash: lookup.hash("blockHash")?,
                    block_number: lookup.item::<u64>("blockNumber")?,
                    tx_index: lookup.item::<u64>("txIndex")?,
                }
            }
            4 => TransactionStatus::Error(error.unwrap_or_default()),
            other => {
                debug!(code = other, "unrecognised transaction status");
                TransactionStatus::Other(other)
            }
        })
    }
}

/// A decoded `TxStatus` reply.
///
/// Entries line up with the queried hashes, but a peer may return fewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxStatusReply {
    pub req_id: u64,
    pub buffer_value: u64,
    pub statuses: Vec<TransactionStatus>,
}

impl TxStatusReply {
    /// Number of entries the peer actually returned.
    pub fn count(&self) -> usize {
        self.statuses.len()
    }
}

impl_flow_controlled!(TxStatusReply, buffer_value);

/// Decode a `TxStatus` payload: `[reqId, bv, [entry, ...]]`.
pub fn decode_tx_status(payload: &[u8]) -> Result<TxStatusReply> {
    let (req_id, buffer_value, mut reply) = open_reply(payload)?;
    let statuses = reply
        .list("statuses")?
        .collect(|list| TransactionStatus::decode(&mut list.list("txStatus")?))?;
    reply.finish()?;

    Ok(TxStatusReply {
        req_id,
        buffer_value,
        statuses,
    })
}
