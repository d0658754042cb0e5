//! Message identifiers for the LES and PIP sub-protocols.
//!
//! The dispatch code on the wire is the negotiated sub-protocol offset plus the
//! base code listed here. LES and PIP overlap at 0x02/0x03, so resolving a raw
//! code needs the [`Protocol`] the offset was negotiated for.

use std::fmt;

/// Light-client sub-protocol a code range belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Light Ethereum Subprotocol.
    Les,
    /// Parity light protocol.
    Pip,
}

impl Protocol {
    /// Capability name as announced in the devp2p hello.
    pub fn name(self) -> &'static str {
        match self {
            Protocol::Les => "les",
            Protocol::Pip => "pip",
        }
    }

    /// Message kinds defined for this protocol, ordered by base code.
    pub fn messages(self) -> &'static [MessageId] {
        match self {
            Protocol::Les => &LES_MESSAGES,
            Protocol::Pip => &PIP_MESSAGES,
        }
    }
}

/// Closed set of message kinds understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageId {
    Status,
    Announce,
    GetBlockHeaders,
    BlockHeaders,
    GetBlockBodies,
    BlockBodies,
    GetReceipts,
    Receipts,
    SendTx,
    GetProofsV2,
    ProofsV2,
    SendTxV2,
    GetTxStatus,
    TxStatus,
    PipRequest,
    PipResponse,
}

const LES_MESSAGES: [MessageId; 14] = [
    MessageId::Status,
    MessageId::Announce,
    MessageId::GetBlockHeaders,
    MessageId::BlockHeaders,
    MessageId::GetBlockBodies,
    MessageId::BlockBodies,
    MessageId::GetReceipts,
    MessageId::Receipts,
    MessageId::SendTx,
    MessageId::GetProofsV2,
    MessageId::ProofsV2,
    MessageId::SendTxV2,
    MessageId::GetTxStatus,
    MessageId::TxStatus,
];

const PIP_MESSAGES: [MessageId; 4] = [
    MessageId::Status,
    MessageId::Announce,
    MessageId::PipRequest,
    MessageId::PipResponse,
];

impl MessageId {
    /// Base code, relative to the sub-protocol offset.
    pub const fn code(self) -> u64 {
        match self {
            MessageId::Status => 0x00,
            MessageId::Announce => 0x01,
            MessageId::GetBlockHeaders => 0x02,
            MessageId::BlockHeaders => 0x03,
            MessageId::GetBlockBodies => 0x04,
            MessageId::BlockBodies => 0x05,
            MessageId::GetReceipts => 0x06,
            MessageId::Receipts => 0x07,
            MessageId::SendTx => 0x0c,
            MessageId::GetProofsV2 => 0x0f,
            MessageId::ProofsV2 => 0x10,
            MessageId::SendTxV2 => 0x13,
            MessageId::GetTxStatus => 0x14,
            MessageId::TxStatus => 0x15,
            MessageId::PipRequest => 0x02,
            MessageId::PipResponse => 0x03,
        }
    }

    /// Dispatch code for a connection that assigned `offset` to this sub-protocol.
    ///
    /// Offsets are 16 bits wide, so the sum always fits.
    pub const fn wire_code(self, offset: u16) -> u64 {
        offset as u64 + self.code()
    }

    /// Human-readable name for logs and diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            MessageId::Status => "Status",
            MessageId::Announce => "Announce",
            MessageId::GetBlockHeaders => "GetBlockHeaders",
            MessageId::BlockHeaders => "BlockHeaders",
            MessageId::GetBlockBodies => "GetBlockBodies",
            MessageId::BlockBodies => "BlockBodies",
            MessageId::GetReceipts => "GetReceipts",
            MessageId::Receipts => "Receipts",
            MessageId::SendTx => "SendTx",
            MessageId::GetProofsV2 => "GetProofsV2",
            MessageId::ProofsV2 => "ProofsV2",
            MessageId::SendTxV2 => "SendTxV2",
            MessageId::GetTxStatus => "GetTxStatus",
            MessageId::TxStatus => "TxStatus",
            MessageId::PipRequest => "PipRequest",
            MessageId::PipResponse => "PipResponse",
        }
    }

    /// Look up a message by its base code.
    pub fn from_code(protocol: Protocol, code: u64) -> Option<Self> {
        protocol
            .messages()
            .iter()
            .copied()
            .find(|id| id.code() == code)
    }

    /// Resolve a raw dispatch code under a negotiated offset.
    ///
    /// Returns `None` for codes below the offset or without a known kind.
    pub fn resolve(protocol: Protocol, wire_code: u64, offset: u16) -> Option<Self> {
        let code = wire_code.checked_sub(u64::from(offset))?;
        Self::from_code(protocol, code)
    }

    /// Returns true if this kind is a response carrying a flow-control buffer value.
    pub fn is_flow_controlled_reply(self) -> bool {
        matches!(
            self,
            MessageId::BlockHeaders
                | MessageId::BlockBodies
                | MessageId::Receipts
                | MessageId::ProofsV2
                | MessageId::TxStatus
                | MessageId::PipResponse
        )
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_protocol_table() {
        assert_eq!(MessageId::Status.code(), 0x00);
        assert_eq!(MessageId::SendTx.code(), 0x0c);
        assert_eq!(MessageId::GetProofsV2.code(), 0x0f);
        assert_eq!(MessageId::TxStatus.code(), 0x15);
        assert_eq!(MessageId::PipResponse.code(), 0x03);
    }

    #[test]
    fn resolve_respects_offset() {
        assert_eq!(
            MessageId::resolve(Protocol::Les, 0x10 + 0x03, 0x10),
            Some(MessageId::BlockHeaders)
        );
        assert_eq!(MessageId::resolve(Protocol::Les, 0x03, 0x10), None);
        assert_eq!(MessageId::resolve(Protocol::Les, 0x10 + 0x08, 0x10), None);
    }

    #[test]
    fn largest_offset_does_not_overflow() {
        let code = MessageId::TxStatus.wire_code(u16::MAX);
        assert_eq!(code, u64::from(u16::MAX) + 0x15);
        assert_eq!(
            MessageId::resolve(Protocol::Les, code, u16::MAX),
            Some(MessageId::TxStatus)
        );
    }

    #[test]
    fn overlapping_codes_depend_on_protocol() {
        assert_eq!(
            MessageId::from_code(Protocol::Les, 0x02),
            Some(MessageId::GetBlockHeaders)
        );
        assert_eq!(
            MessageId::from_code(Protocol::Pip, 0x02),
            Some(MessageId::PipRequest)
        );
        assert_eq!(MessageId::from_code(Protocol::Pip, 0x15), None);
    }

    #[test]
    fn every_listed_message_round_trips_through_its_code() {
        for protocol in [Protocol::Les, Protocol::Pip] {
            for &id in protocol.messages() {
                assert_eq!(MessageId::from_code(protocol, id.code()), Some(id));
                assert_eq!(MessageId::resolve(protocol, id.wire_code(16), 16), Some(id));
            }
        }
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(MessageId::GetTxStatus.name(), "GetTxStatus");
        assert_eq!(MessageId::PipRequest.to_string(), "PipRequest");
    }
}
