//! Typed decoding of any incoming message.

use lesprims_wire::{decode_message, DecodeConfig, Message, MessageId, Protocol, Result};
use tracing::trace;

use crate::announce::{decode_announce_with_config, Announce};
use crate::bodies::{decode_block_bodies, decode_receipts, BlockBodies, Receipts};
use crate::headers::{decode_block_headers, BlockHeaders};
use crate::network::Network;
use crate::pip::{decode_account_response, AccountResponse};
use crate::proofs::{decode_proofs_v2, ProofsV2};
use crate::status::{decode_status_with_config, StatusMessage};
use crate::tx::{decode_tx_status, TxStatusReply};

/// A decoded message a light client can receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Status(StatusMessage),
    Announce(Announce),
    BlockHeaders(BlockHeaders),
    BlockBodies(BlockBodies),
    Receipts(Receipts),
    ProofsV2(ProofsV2),
    TxStatus(TxStatusReply),
    Account(AccountResponse),
    /// A message a light client sends rather than receives, left undecoded.
    Request(Message),
}

impl Incoming {
    pub fn id(&self) -> MessageId {
        match self {
            Incoming::Status(_) => MessageId::Status,
            Incoming::Announce(_) => MessageId::Announce,
            Incoming::BlockHeaders(_) => MessageId::BlockHeaders,
            Incoming::BlockBodies(_) => MessageId::BlockBodies,
            Incoming::Receipts(_) => MessageId::Receipts,
            Incoming::ProofsV2(_) => MessageId::ProofsV2,
            Incoming::TxStatus(_) => MessageId::TxStatus,
            Incoming::Account(_) => MessageId::PipResponse,
            Incoming::Request(message) => message.id,
        }
    }
}

/// Split the envelope and decode the payload according to its dispatch code.
pub fn decode_incoming(
    wire: &[u8],
    protocol: Protocol,
    offset: u16,
    network: &Network,
    config: &DecodeConfig,
) -> Result<Incoming> {
    let message = decode_message(wire, protocol, offset, config.max_payload_size)?;
    trace!(
        id = message.id.name(),
        size = message.payload.len(),
        "decoding incoming message"
    );
    decode_payload(message, network, config)
}

/// Decode the payload of an already split message.
pub fn decode_payload(
    message: Message,
    network: &Network,
    config: &DecodeConfig,
) -> Result<Incoming> {
    let payload = message.payload.clone();
    let payload = &payload[..];
    Ok(match message.id {
        MessageId::Status => Incoming::Status(decode_status_with_config(payload, config)?),
        MessageId::Announce => Incoming::Announce(decode_announce_with_config(payload, config)?),
        MessageId::BlockHeaders => Incoming::BlockHeaders(decode_block_headers(payload)?),
        MessageId::BlockBodies => Incoming::BlockBodies(decode_block_bodies(payload, network)?),
        MessageId::Receipts => Incoming::Receipts(decode_receipts(payload)?),
        MessageId::ProofsV2 => Incoming::ProofsV2(decode_proofs_v2(payload)?),
        MessageId::TxStatus => Incoming::TxStatus(decode_tx_status(payload)?),
        MessageId::PipResponse => Incoming::Account(decode_account_response(payload)?),
        MessageId::GetBlockHeaders
        | MessageId::GetBlockBodies
        | MessageId::GetReceipts
        | MessageId::SendTx
        | MessageId::GetProofsV2
        | MessageId::SendTxV2
        | MessageId::GetTxStatus
        | MessageId::PipRequest => Incoming::Request(message),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::encode_get_block_headers;
    use crate::status::encode_status;
    use alloy_primitives::{B256, U256};
    use lesprims_wire::{encode_message, DecodeStatus, ListWriter};

    fn decode(wire: &[u8], protocol: Protocol, offset: u16) -> Result<Incoming> {
        decode_incoming(wire, protocol, offset, &Network::MAINNET, &DecodeConfig::default())
    }

    #[test]
    fn dispatches_status() {
        let status = StatusMessage::new(
            2,
            1,
            U256::from(17u64),
            B256::repeat_byte(0x11),
            42,
            B256::repeat_byte(0xd4),
        );
        let wire = encode_status(16, &status);
        let incoming = decode(&wire, Protocol::Les, 16).unwrap();
        assert_eq!(incoming.id(), MessageId::Status);
        assert_eq!(incoming, Incoming::Status(status));
    }

    #[test]
    fn dispatches_reply_by_protocol() {
        let mut headers = ListWriter::new();
        headers.push(&7u64).push(&200u64).push_list(ListWriter::new());
        let mut wire = bytes::BytesMut::new();
        encode_message(MessageId::BlockHeaders, 0, &headers.finish(), &mut wire);

        let les = decode(&wire, Protocol::Les, 0).unwrap();
        assert_eq!(les.id(), MessageId::BlockHeaders);

        // 0x03 is PipResponse under PIP; the payload is not an account reply.
        let pip = decode(&wire, Protocol::Pip, 0);
        assert_eq!(DecodeStatus::of(&pip), DecodeStatus::UnableToDecode);
    }

    #[test]
    fn requests_pass_through() {
        let wire = encode_get_block_headers(0, 1, 5u64, 1, 0, false);
        let incoming = decode(&wire, Protocol::Les, 0).unwrap();
        match incoming {
            Incoming::Request(message) => {
                assert_eq!(message.id, MessageId::GetBlockHeaders);
                assert_eq!(message.to_bytes(), wire);
            }
            other => panic!("expected request, got {other:?}"),
        }
    }

    #[test]
    fn unknown_code() {
        let mut wire = bytes::BytesMut::new();
        alloy_rlp::Encodable::encode(&0x30u64, &mut wire);
        ListWriter::new().encode_into(&mut wire);
        let result = decode(&wire, Protocol::Les, 0);
        assert_eq!(DecodeStatus::of(&result), DecodeStatus::InvalidMessageId);
    }

    #[test]
    fn payload_limit_from_config() {
        let wire = encode_get_block_headers(0, 1, 5u64, 1, 0, false);
        let tight = DecodeConfig {
            max_payload_size: 4,
            ..DecodeConfig::default()
        };
        let result = decode_incoming(&wire, Protocol::Les, 0, &Network::MAINNET, &tight);
        assert_eq!(DecodeStatus::of(&result), DecodeStatus::UnableToDecode);
    }
}
