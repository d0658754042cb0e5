//! Keyed status fields and the announce extension slot.
//!
//! Status messages and the tail of announcements are both lists of
//! `[key, value]` pairs. The key names the field and fixes the shape of its
//! value, so a decoded value is always one of the [`AnnounceValue`] variants.

use alloy_primitives::{Bytes, U256};
use lesprims_wire::{DecodeError, ListReader, ListWriter, Result};

/// Known status keys, in the order they are written on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusKey {
    ProtocolVersion,
    NetworkId,
    HeadTd,
    HeadHash,
    HeadNum,
    GenesisHash,
    ServeHeaders,
    ServeChainSince,
    ServeStateSince,
    TxRelay,
    FlowControlBl,
    FlowControlMrc,
    FlowControlMrr,
    AnnounceType,
}

impl StatusKey {
    pub const ALL: [StatusKey; 14] = [
        StatusKey::ProtocolVersion,
        StatusKey::NetworkId,
        StatusKey::HeadTd,
        StatusKey::HeadHash,
        StatusKey::HeadNum,
        StatusKey::GenesisHash,
        StatusKey::ServeHeaders,
        StatusKey::ServeChainSince,
        StatusKey::ServeStateSince,
        StatusKey::TxRelay,
        StatusKey::FlowControlBl,
        StatusKey::FlowControlMrc,
        StatusKey::FlowControlMrr,
        StatusKey::AnnounceType,
    ];

    /// Key string as it appears on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            StatusKey::ProtocolVersion => "protocolVersion",
            StatusKey::NetworkId => "networkId",
            StatusKey::HeadTd => "headTd",
            StatusKey::HeadHash => "headHash",
            StatusKey::HeadNum => "headNum",
            StatusKey::GenesisHash => "genesisHash",
            StatusKey::ServeHeaders => "serveHeaders",
            StatusKey::ServeChainSince => "serveChainSince",
            StatusKey::ServeStateSince => "serveStateSince",
            StatusKey::TxRelay => "txRelay",
            StatusKey::FlowControlBl => "flowControl/BL",
            StatusKey::FlowControlMrc => "flowControl/MRC",
            StatusKey::FlowControlMrr => "flowControl/MRR",
            StatusKey::AnnounceType => "announceType",
        }
    }

    pub fn from_wire(key: &[u8]) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.as_str().as_bytes() == key)
    }

    /// Mandatory keys must appear in every status message.
    pub const fn is_mandatory(self) -> bool {
        matches!(
            self,
            StatusKey::ProtocolVersion
                | StatusKey::NetworkId
                | StatusKey::HeadTd
                | StatusKey::HeadHash
                | StatusKey::HeadNum
                | StatusKey::GenesisHash
        )
    }

    /// Value shape this key carries in an announce tail.
    pub const fn shape(self) -> ValueShape {
        match self {
            StatusKey::ProtocolVersion
            | StatusKey::NetworkId
            | StatusKey::HeadNum
            | StatusKey::ServeChainSince
            | StatusKey::ServeStateSince
            | StatusKey::FlowControlBl
            | StatusKey::FlowControlMrr => ValueShape::U64,
            StatusKey::HeadTd => ValueShape::U256,
            StatusKey::AnnounceType => ValueShape::Byte,
            StatusKey::ServeHeaders | StatusKey::TxRelay => ValueShape::Bool,
            StatusKey::HeadHash | StatusKey::GenesisHash | StatusKey::FlowControlMrc => {
                ValueShape::Blob
            }
        }
    }

    pub(crate) const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Discriminant of [`AnnounceValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    U64,
    U256,
    Byte,
    Bool,
    Blob,
}

/// Value of one keyed extension pair.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnnounceValue {
    U64(u64),
    U256(U256),
    Byte(u8),
    /// Flags are signalled by the presence of their key.
    Bool(bool),
    /// The value item exactly as it appeared on the wire.
    Blob(Bytes),
}

impl AnnounceValue {
    pub fn shape(&self) -> ValueShape {
        match self {
            AnnounceValue::U64(_) => ValueShape::U64,
            AnnounceValue::U256(_) => ValueShape::U256,
            AnnounceValue::Byte(_) => ValueShape::Byte,
            AnnounceValue::Bool(_) => ValueShape::Bool,
            AnnounceValue::Blob(_) => ValueShape::Blob,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            AnnounceValue::U64(value) => Some(*value),
            _ => None,
        }
    }

    /// Read the value of a pair whose key has already been consumed.
    pub(crate) fn read(key: StatusKey, pair: &mut ListReader<'_>) -> Result<Self> {
        let value = match key.shape() {
            ValueShape::U64 => pair.item::<u64>("value").map(AnnounceValue::U64),
            ValueShape::U256 => pair.u256("value").map(AnnounceValue::U256),
            ValueShape::Byte => pair.item::<u8>("value").map(AnnounceValue::Byte),
            ValueShape::Bool => pair.string("value").map(|_| AnnounceValue::Bool(true)),
            ValueShape::Blob => pair
                .raw("value")
                .map(|raw| AnnounceValue::Blob(Bytes::copy_from_slice(raw))),
        };
        value.map_err(|err| shape_error(key, err))
    }

    pub(crate) fn write(&self, pair: &mut ListWriter) {
        match self {
            AnnounceValue::U64(value) => {
                pair.push(value);
            }
            AnnounceValue::U256(value) => {
                pair.push(value);
            }
            AnnounceValue::Byte(value) => {
                pair.push(value);
            }
            AnnounceValue::Bool(_) => {
                pair.push::<[u8]>(&[]);
            }
            AnnounceValue::Blob(raw) => {
                pair.push_raw(raw);
            }
        }
    }
}

/// One `[key, value]` pair from an announcement tail.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnounceRequest {
    pub key: StatusKey,
    pub value: AnnounceValue,
}

impl AnnounceRequest {
    pub fn new(key: StatusKey, value: AnnounceValue) -> Self {
        Self { key, value }
    }

    pub(crate) fn to_pair(&self) -> ListWriter {
        let mut pair = ListWriter::new();
        pair.push(self.key.as_str());
        self.value.write(&mut pair);
        pair
    }
}

/// Map a value decoding failure inside a complete pair to a key/value error.
pub(crate) fn shape_error(key: StatusKey, err: DecodeError) -> DecodeError {
    match err {
        DecodeError::MissingField(_) => DecodeError::invalid_pair(key.as_str(), "missing value"),
        DecodeError::InvalidStatusKeyPair { .. } => err,
        _ => DecodeError::invalid_pair(key.as_str(), "value has wrong shape"),
    }
}

/// Lossy printable form of a key that is not in [`StatusKey`].
pub(crate) fn unknown_key(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}
