//! Capability handshake (`Status`) encoding and decoding.
//!
//! A status message is a list of `[key, value]` pairs. The six mandatory pairs
//! are always written; every optional pair is written only when present, so a
//! decoded message tells "absent" apart from "present with value zero".

use alloy_primitives::{Bytes, B256, U256};
use alloy_rlp::{Decodable, RlpDecodable, RlpEncodable};
use lesprims_wire::{
    encode_list_message, DecodeConfig, DecodeError, ListReader, ListWriter, MessageId, Protocol,
    Result, UnknownKeyPolicy,
};
use tracing::{debug, trace};

use crate::extension::{shape_error, unknown_key, AnnounceRequest, AnnounceValue, StatusKey};

/// One flow-control cost table row: the cost of a request is
/// `base_cost + req_cost * items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, RlpEncodable, RlpDecodable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostEntry {
    pub msg_code: u64,
    pub base_cost: u64,
    pub req_cost: u64,
}

impl CostEntry {
    pub const fn new(msg_code: u64, base_cost: u64, req_cost: u64) -> Self {
        Self {
            msg_code,
            base_cost,
            req_cost,
        }
    }

    /// Cost charged for a request carrying `items` sub-requests.
    pub fn cost(&self, items: u64) -> u64 {
        self.base_cost
            .saturating_add(self.req_cost.saturating_mul(items))
    }
}

/// Status message exchanged when a light-client session starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusMessage {
    pub protocol_version: u64,
    pub network_id: u64,
    pub head_td: U256,
    pub head_hash: B256,
    pub head_number: u64,
    pub genesis_hash: B256,
    /// Peer serves headers. Written as a bare key when true.
    pub serve_headers: bool,
    pub serve_chain_since: Option<u64>,
    pub serve_state_since: Option<u64>,
    /// Peer relays transactions. Written as a bare key when true.
    pub tx_relay: bool,
    /// Flow-control buffer limit.
    pub flow_control_bl: Option<u64>,
    /// Flow-control maximum request cost table.
    pub flow_control_mrc: Option<Vec<CostEntry>>,
    /// Flow-control minimum recharge rate.
    pub flow_control_mrr: Option<u64>,
    pub announce_type: Option<u8>,
}

impl StatusMessage {
    /// Status with the mandatory fields set and every optional field absent.
    pub fn new(
        protocol_version: u64,
        network_id: u64,
        head_td: U256,
        head_hash: B256,
        head_number: u64,
        genesis_hash: B256,
    ) -> Self {
        Self {
            protocol_version,
            network_id,
            head_td,
            head_hash,
            head_number,
            genesis_hash,
            ..Self::default()
        }
    }

    /// Set the flow-control triple.
    pub fn with_flow_control(mut self, bl: u64, mrc: Vec<CostEntry>, mrr: u64) -> Self {
        self.flow_control_bl = Some(bl);
        self.flow_control_mrc = Some(mrc);
        self.flow_control_mrr = Some(mrr);
        self
    }

    /// Cost table entry for a message, if the peer advertised one.
    pub fn cost_of(&self, id: MessageId) -> Option<&CostEntry> {
        self.flow_control_mrc
            .as_ref()?
            .iter()
            .find(|entry| entry.msg_code == id.code())
    }

    /// Dump the flow-control parameters at debug level.
    pub fn log_flow_control(&self) {
        debug!(
            bl = ?self.flow_control_bl,
            mrr = ?self.flow_control_mrr,
            mrc_entries = self.flow_control_mrc.as_ref().map_or(0, Vec::len),
            "flow control parameters"
        );
        for entry in self.flow_control_mrc.iter().flatten() {
            let name = MessageId::from_code(Protocol::Les, entry.msg_code)
                .map_or("unknown", MessageId::name);
            debug!(
                msg_code = entry.msg_code,
                message = name,
                base_cost = entry.base_cost,
                req_cost = entry.req_cost,
                "flow control cost"
            );
        }
    }

    /// Fold one announce extension pair into this status.
    pub fn apply(&mut self, request: &AnnounceRequest) -> Result<()> {
        let key = request.key;
        let mismatch = || DecodeError::invalid_pair(key.as_str(), "value has wrong shape");
        match (key, &request.value) {
            (StatusKey::ProtocolVersion, AnnounceValue::U64(v)) => self.protocol_version = *v,
            (StatusKey::NetworkId, AnnounceValue::U64(v)) => self.network_id = *v,
            (StatusKey::HeadNum, AnnounceValue::U64(v)) => self.head_number = *v,
            (StatusKey::ServeChainSince, AnnounceValue::U64(v)) => {
                self.serve_chain_since = Some(*v)
            }
            (StatusKey::ServeStateSince, AnnounceValue::U64(v)) => {
                self.serve_state_since = Some(*v)
            }
            (StatusKey::FlowControlBl, AnnounceValue::U64(v)) => self.flow_control_bl = Some(*v),
            (StatusKey::FlowControlMrr, AnnounceValue::U64(v)) => self.flow_control_mrr = Some(*v),
            (StatusKey::HeadTd, AnnounceValue::U256(v)) => self.head_td = *v,
            (StatusKey::AnnounceType, AnnounceValue::Byte(v)) => self.announce_type = Some(*v),
            (StatusKey::ServeHeaders, AnnounceValue::Bool(v)) => self.serve_headers = *v,
            (StatusKey::TxRelay, AnnounceValue::Bool(v)) => self.tx_relay = *v,
            (StatusKey::HeadHash, AnnounceValue::Blob(raw)) => {
                self.head_hash = hash_from_raw(key, raw)?
            }
            (StatusKey::GenesisHash, AnnounceValue::Blob(raw)) => {
                self.genesis_hash = hash_from_raw(key, raw)?
            }
            (StatusKey::FlowControlMrc, AnnounceValue::Blob(raw)) => {
                let mut buf = raw.as_ref();
                let table =
                    Vec::<CostEntry>::decode(&mut buf).map_err(|err| shape_error(key, err.into()))?;
                if !buf.is_empty() {
                    return Err(mismatch());
                }
                self.flow_control_mrc = Some(table);
            }
            _ => return Err(mismatch()),
        }
        Ok(())
    }

    /// The optional fields as keyed pairs, in wire order.
    pub fn optional_pairs(&self) -> Vec<AnnounceRequest> {
        let mut pairs = Vec::new();
        if self.serve_headers {
            pairs.push(AnnounceRequest::new(
                StatusKey::ServeHeaders,
                AnnounceValue::Bool(true),
            ));
        }
        if let Some(height) = self.serve_chain_since {
            pairs.push(AnnounceRequest::new(
                StatusKey::ServeChainSince,
                AnnounceValue::U64(height),
            ));
        }
        if let Some(height) = self.serve_state_since {
            pairs.push(AnnounceRequest::new(
                StatusKey::ServeStateSince,
                AnnounceValue::U64(height),
            ));
        }
        if self.tx_relay {
            pairs.push(AnnounceRequest::new(
                StatusKey::TxRelay,
                AnnounceValue::Bool(true),
            ));
        }
        if let Some(bl) = self.flow_control_bl {
            pairs.push(AnnounceRequest::new(
                StatusKey::FlowControlBl,
                AnnounceValue::U64(bl),
            ));
        }
        if let Some(table) = &self.flow_control_mrc {
            pairs.push(AnnounceRequest::new(
                StatusKey::FlowControlMrc,
                AnnounceValue::Blob(Bytes::from(alloy_rlp::encode(table))),
            ));
        }
        if let Some(mrr) = self.flow_control_mrr {
            pairs.push(AnnounceRequest::new(
                StatusKey::FlowControlMrr,
                AnnounceValue::U64(mrr),
            ));
        }
        if let Some(kind) = self.announce_type {
            pairs.push(AnnounceRequest::new(
                StatusKey::AnnounceType,
                AnnounceValue::Byte(kind),
            ));
        }
        pairs
    }

    fn to_list(&self) -> ListWriter {
        let mut list = ListWriter::new();
        list.push_list(mandatory_pair(StatusKey::ProtocolVersion, &self.protocol_version))
            .push_list(mandatory_pair(StatusKey::NetworkId, &self.network_id))
            .push_list(mandatory_pair(StatusKey::HeadTd, &self.head_td))
            .push_list(mandatory_pair(StatusKey::HeadHash, &self.head_hash))
            .push_list(mandatory_pair(StatusKey::HeadNum, &self.head_number))
            .push_list(mandatory_pair(StatusKey::GenesisHash, &self.genesis_hash));
        for pair in self.optional_pairs() {
            list.push_list(pair.to_pair());
        }
        list
    }
}

fn mandatory_pair<T: alloy_rlp::Encodable + ?Sized>(key: StatusKey, value: &T) -> ListWriter {
    let mut pair = ListWriter::new();
    pair.push(key.as_str()).push(value);
    pair
}

fn hash_from_raw(key: StatusKey, raw: &[u8]) -> Result<B256> {
    let mut reader = ListReader::over_items(raw);
    let hash = reader.hash(key.as_str()).map_err(|err| shape_error(key, err))?;
    reader
        .finish()
        .map_err(|err| shape_error(key, err))?;
    Ok(hash)
}

/// Encode a status message for a sub-protocol negotiated at `offset`.
pub fn encode_status(offset: u16, status: &StatusMessage) -> bytes::Bytes {
    encode_list_message(MessageId::Status, offset, &status.to_list())
}

/// Decode a status payload with the default (strict) configuration.
pub fn decode_status(payload: &[u8]) -> Result<StatusMessage> {
    decode_status_with_config(payload, &DecodeConfig::default())
}

/// Decode a status payload.
///
/// Unknown keys follow `config.unknown_keys`; duplicate keys and badly shaped
/// values are always rejected. A missing mandatory key is
/// [`DecodeError::MissingField`].
pub fn decode_status_with_config(payload: &[u8], config: &DecodeConfig) -> Result<StatusMessage> {
    let mut pairs = ListReader::top_level(payload)?;
    let mut status = StatusMessage::default();
    let mut seen = 0u16;

    while !pairs.is_empty() {
        let mut pair = pairs.list("status pair")?;
        let key_bytes = pair.string("status key")?;

        let Some(key) = StatusKey::from_wire(key_bytes) else {
            let key = unknown_key(key_bytes);
            match config.unknown_keys {
                UnknownKeyPolicy::Reject => {
                    debug!(%key, "rejecting unknown status key");
                    return Err(DecodeError::invalid_pair(key, "unknown key"));
                }
                UnknownKeyPolicy::Skip => {
                    trace!(%key, "skipping unknown status key");
                    continue;
                }
            }
        };

        if seen & key.bit() != 0 {
            return Err(DecodeError::invalid_pair(key.as_str(), "duplicate key"));
        }
        seen |= key.bit();

        if key == StatusKey::FlowControlMrc {
            let table = pair
                .item::<Vec<CostEntry>>("value")
                .map_err(|err| shape_error(key, err))?;
            status.flow_control_mrc = Some(table);
        } else if key == StatusKey::HeadHash || key == StatusKey::GenesisHash {
            let hash = pair.hash("value").map_err(|err| shape_error(key, err))?;
            if key == StatusKey::HeadHash {
                status.head_hash = hash;
            } else {
                status.genesis_hash = hash;
            }
        } else {
            let value = AnnounceValue::read(key, &mut pair)?;
            status.apply(&AnnounceRequest::new(key, value))?;
        }

        if !pair.is_empty() {
            return Err(DecodeError::invalid_pair(key.as_str(), "unexpected extra value"));
        }
    }

    if let Some(missing) = StatusKey::ALL
        .iter()
        .find(|key| key.is_mandatory() && seen & key.bit() == 0)
    {
        return Err(DecodeError::MissingField(missing.as_str()));
    }

    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesprims_wire::{decode_message, DecodeStatus, DEFAULT_MAX_PAYLOAD};

    fn base_status() -> StatusMessage {
        StatusMessage::new(
            2,
            1,
            U256::from(17_179_869_184u64),
            B256::repeat_byte(0x11),
            4_200_000,
            B256::repeat_byte(0xd4),
        )
    }

    fn payload_of(wire: &[u8], offset: u16) -> bytes::Bytes {
        decode_message(wire, Protocol::Les, offset, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .expect(MessageId::Status)
            .unwrap()
            .payload
    }

    fn full_status() -> StatusMessage {
        let mut status = base_status().with_flow_control(
            300_000,
            vec![
                CostEntry::new(0x02, 150, 30),
                CostEntry::new(0x04, 0, 20),
                CostEntry::new(0x0f, 100, 8),
            ],
            50_000,
        );
        status.serve_headers = true;
        status.serve_chain_since = Some(0);
        status.serve_state_since = Some(4_100_000);
        status.tx_relay = true;
        status.announce_type = Some(1);
        status
    }

    #[test]
    fn roundtrip_mandatory_only() {
        let status = base_status();
        let decoded = decode_status(&payload_of(&encode_status(0, &status), 0)).unwrap();
        assert_eq!(decoded, status);
        assert_eq!(decoded.serve_chain_since, None);
        assert!(!decoded.serve_headers);
    }

    #[test]
    fn roundtrip_every_optional_subset() {
        let full = full_status();
        for mask in 0u16..(1 << 8) {
            let mut status = base_status();
            if mask & 0x01 != 0 {
                status.serve_headers = true;
            }
            if mask & 0x02 != 0 {
                status.serve_chain_since = full.serve_chain_since;
            }
            if mask & 0x04 != 0 {
                status.serve_state_since = full.serve_state_since;
            }
            if mask & 0x08 != 0 {
                status.tx_relay = true;
            }
            if mask & 0x10 != 0 {
                status.flow_control_bl = full.flow_control_bl;
            }
            if mask & 0x20 != 0 {
                status.flow_control_mrc = full.flow_control_mrc.clone();
            }
            if mask & 0x40 != 0 {
                status.flow_control_mrr = full.flow_control_mrr;
            }
            if mask & 0x80 != 0 {
                status.announce_type = full.announce_type;
            }

            let wire = encode_status(0, &status);
            let decoded = decode_status(&payload_of(&wire, 0)).unwrap();
            assert_eq!(decoded, status, "mask {mask:#04x}");
        }
    }

    #[test]
    fn zero_valued_optional_stays_present() {
        let mut status = base_status();
        status.serve_chain_since = Some(0);
        status.flow_control_mrc = Some(Vec::new());

        let decoded = decode_status(&payload_of(&encode_status(0, &status), 0)).unwrap();
        assert_eq!(decoded.serve_chain_since, Some(0));
        assert_eq!(decoded.flow_control_mrc, Some(Vec::new()));
        assert_eq!(decoded.serve_state_since, None);
    }

    #[test]
    fn offset_does_not_change_decoded_status() {
        let status = full_status();
        let at_zero = decode_status(&payload_of(&encode_status(0, &status), 0)).unwrap();
        let at_sixteen = decode_status(&payload_of(&encode_status(16, &status), 16)).unwrap();
        assert_eq!(at_zero, at_sixteen);
        assert_eq!(at_zero, status);
    }

    #[test]
    fn truncated_status_is_unable_to_decode() {
        let payload = payload_of(&encode_status(0, &full_status()), 0);
        let result = decode_status(&payload[..payload.len() - 1]);
        assert_eq!(DecodeStatus::of(&result), DecodeStatus::UnableToDecode);
    }

    #[test]
    fn every_truncation_is_rejected() {
        let payload = payload_of(&encode_status(0, &full_status()), 0);
        for len in 0..payload.len() {
            let result = decode_status(&payload[..len]);
            assert!(result.is_err(), "prefix of {len} bytes decoded");
        }
    }

    fn with_extra_pair(status: &StatusMessage, key: &str, value: u64) -> bytes::Bytes {
        let mut list = status.to_list();
        let mut pair = ListWriter::new();
        pair.push(key).push(&value);
        list.push_list(pair);
        list.finish()
    }

    #[test]
    fn unknown_key_is_rejected() {
        let payload = with_extra_pair(&base_status(), "recentTxLookup", 128);
        let result = decode_status(&payload);
        assert_eq!(DecodeStatus::of(&result), DecodeStatus::InvalidStatusKeyPair);
        assert!(matches!(
            result,
            Err(DecodeError::InvalidStatusKeyPair { ref key, .. }) if key == "recentTxLookup"
        ));
    }

    #[test]
    fn unknown_key_is_skipped_when_permissive() {
        let payload = with_extra_pair(&base_status(), "recentTxLookup", 128);
        let decoded = decode_status_with_config(&payload, &DecodeConfig::permissive()).unwrap();
        assert_eq!(decoded, base_status());
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let payload = with_extra_pair(&base_status(), "headNum", 5);
        let result = decode_status(&payload);
        assert_eq!(DecodeStatus::of(&result), DecodeStatus::InvalidStatusKeyPair);
    }

    #[test]
    fn wrong_value_shape_is_rejected() {
        let mut list = base_status().to_list();
        let mut pair = ListWriter::new();
        pair.push("serveChainSince").push_list(ListWriter::new());
        list.push_list(pair);

        let result = decode_status(&list.finish());
        assert_eq!(DecodeStatus::of(&result), DecodeStatus::InvalidStatusKeyPair);
    }

    #[test]
    fn missing_mandatory_key_is_unable_to_decode() {
        let mut list = ListWriter::new();
        list.push_list(mandatory_pair(StatusKey::ProtocolVersion, &2u64))
            .push_list(mandatory_pair(StatusKey::NetworkId, &1u64))
            .push_list(mandatory_pair(StatusKey::HeadTd, &U256::from(1u64)))
            .push_list(mandatory_pair(StatusKey::HeadHash, &B256::ZERO))
            .push_list(mandatory_pair(StatusKey::HeadNum, &1u64));

        let result = decode_status(&list.finish());
        assert_eq!(result, Err(DecodeError::MissingField("genesisHash")));
        assert_eq!(DecodeStatus::of(&result), DecodeStatus::UnableToDecode);
    }

    #[test]
    fn hash_with_stripped_leading_zeros_is_padded() {
        let mut head_hash = B256::repeat_byte(0x22);
        head_hash.0[0] = 0;
        head_hash.0[1] = 0;

        let mut list = ListWriter::new();
        list.push_list(mandatory_pair(StatusKey::ProtocolVersion, &2u64))
            .push_list(mandatory_pair(StatusKey::NetworkId, &1u64))
            .push_list(mandatory_pair(StatusKey::HeadTd, &U256::from(9u64)))
            .push_list(mandatory_pair::<[u8]>(StatusKey::HeadHash, &head_hash.0[2..]))
            .push_list(mandatory_pair(StatusKey::HeadNum, &1u64))
            .push_list(mandatory_pair(StatusKey::GenesisHash, &B256::ZERO));

        let decoded = decode_status(&list.finish()).unwrap();
        assert_eq!(decoded.head_hash, head_hash);
    }

    #[test]
    fn cost_lookup_uses_message_code() {
        let status = full_status();
        assert_eq!(
            status.cost_of(MessageId::GetProofsV2),
            Some(&CostEntry::new(0x0f, 100, 8))
        );
        assert_eq!(status.cost_of(MessageId::GetReceipts), None);
        assert_eq!(CostEntry::new(0x02, 150, 30).cost(5), 300);
    }

    #[test]
    fn apply_rejects_mismatched_shape() {
        let mut status = base_status();
        let request = AnnounceRequest::new(StatusKey::HeadNum, AnnounceValue::Bool(true));
        assert_eq!(
            status.apply(&request).map_err(|err| err.status()),
            Err(DecodeStatus::InvalidStatusKeyPair)
        );
    }
}
