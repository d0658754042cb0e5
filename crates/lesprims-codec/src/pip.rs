//! PIP account proofs.
//!
//! PIP carries every request kind inside one `PipRequest` / `PipResponse`
//! pair; only the account lookup is supported here.

use alloy_primitives::{Address, Bytes, B256, U256};
use lesprims_wire::{encode_list_message, ListReader, ListWriter, MessageId, Result};

use crate::reply::{impl_flow_controlled, open_reply};

/// Encode an account proof request: `[reqId, blockHash, address]`.
pub fn encode_account_request(
    offset: u16,
    req_id: u64,
    block: B256,
    address: Address,
) -> bytes::Bytes {
    let mut body = ListWriter::new();
    body.push(&req_id).push(&block).push(&address);
    encode_list_message(MessageId::PipRequest, offset, &body)
}

/// An account's state together with the trie path proving it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccountProof {
    /// The proof item exactly as received.
    pub proof: Bytes,
    pub nonce: u64,
    pub balance: U256,
    pub code_hash: B256,
    pub storage_root: B256,
}

impl AccountProof {
    /// Split a list-form proof into its trie nodes, each a complete RLP item.
    pub fn nodes(&self) -> Result<Vec<Bytes>> {
        let reader = ListReader::top_level(&self.proof)?;
        reader.collect(|list| list.raw("node").map(Bytes::copy_from_slice))
    }
}

/// A decoded account proof response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountResponse {
    pub req_id: u64,
    /// PIP's name for the remaining request budget.
    pub credit_remaining: u64,
    pub account: AccountProof,
}

impl_flow_controlled!(AccountResponse, credit_remaining);

/// Decode `[reqId, cr, [proof, nonce, balance, codeHash, storageRoot]]`.
pub fn decode_account_response(payload: &[u8]) -> Result<AccountResponse> {
    let (req_id, credit_remaining, mut reply) = open_reply(payload)?;

    let mut fields = reply.list("account")?;
    let account = AccountProof {
        proof: Bytes::copy_from_slice(fields.raw("proof")?),
        nonce: fields.item::<u64>("nonce")?,
        balance: fields.u256("balance")?,
        code_hash: fields.hash("codeHash")?,
        storage_root: fields.hash("storageRoot")?,
    };
    fields.finish()?;
    reply.finish()?;

    Ok(AccountResponse {
        req_id,
        credit_remaining,
        account,
    })
}
