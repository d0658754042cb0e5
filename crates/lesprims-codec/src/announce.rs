//! New chain head announcements.
//!
//! `[headHash, headNumber, headTd, reorgDepth, [[key, value], ...]]`
//!
//! The trailing pairs reuse the status key schema, so a peer can push updated
//! capability values (serving ranges, flow-control parameters) along with a
//! new head.

use alloy_primitives::{B256, U256};
use lesprims_wire::{DecodeConfig, DecodeError, ListReader, Result, UnknownKeyPolicy};
use tracing::{debug, trace};

use crate::extension::{unknown_key, AnnounceRequest, AnnounceValue, StatusKey};
use crate::status::StatusMessage;

/// A decoded announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Announce {
    pub head_hash: B256,
    pub head_number: u64,
    pub head_td: U256,
    /// Number of blocks reverted from the previously announced head.
    pub reorg_depth: u64,
    pub extensions: Vec<AnnounceRequest>,
}

impl Announce {
    /// Value announced for `key`, if any.
    pub fn get(&self, key: StatusKey) -> Option<&AnnounceValue> {
        self.extensions
            .iter()
            .find(|request| request.key == key)
            .map(|request| &request.value)
    }

    /// Update a status with the new head and every extension pair.
    pub fn apply_to(&self, status: &mut StatusMessage) -> Result<()> {
        status.head_hash = self.head_hash;
        status.head_number = self.head_number;
        status.head_td = self.head_td;
        for request in &self.extensions {
            status.apply(request)?;
        }
        Ok(())
    }
}

/// Decode an announce payload with the default (strict) configuration.
pub fn decode_announce(payload: &[u8]) -> Result<Announce> {
    decode_announce_with_config(payload, &DecodeConfig::default())
}

/// Decode an announce payload.
pub fn decode_announce_with_config(payload: &[u8], config: &DecodeConfig) -> Result<Announce> {
    let mut announce = ListReader::top_level(payload)?;
    let head_hash = announce.hash("headHash")?;
    let head_number = announce.item::<u64>("headNumber")?;
    let head_td = announce.u256("headTd")?;
    let reorg_depth = announce.item::<u64>("reorgDepth")?;

    let extensions = if announce.is_empty() {
        Vec::new()
    } else {
        decode_extensions(announce.list("extensions")?, config)?
    };
    announce.finish()?;

    Ok(Announce {
        head_hash,
        head_number,
        head_td,
        reorg_depth,
        extensions,
    })
}

fn decode_extensions(mut pairs: ListReader<'_>, config: &DecodeConfig) -> Result<Vec<AnnounceRequest>> {
    let mut out = Vec::new();
    let mut seen = 0u16;
    while !pairs.is_empty() {
        let mut pair = pairs.list("announce pair")?;
        let key_bytes = pair.string("announce key")?;

        let Some(key) = StatusKey::from_wire(key_bytes) else {
            let key = unknown_key(key_bytes);
            if config.unknown_keys == UnknownKeyPolicy::Skip {
                trace!(%key, "skipping unknown announce key");
                continue;
            }
            debug!(%key, "rejecting unknown announce key");
            return Err(DecodeError::invalid_pair(key, "unknown key"));
        };

        if seen & key.bit() != 0 {
            return Err(DecodeError::invalid_pair(key.as_str(), "duplicate key"));
        }
        seen |= key.bit();

        let value = AnnounceValue::read(key, &mut pair)?;
        if !pair.is_empty() {
            return Err(DecodeError::invalid_pair(key.as_str(), "unexpected extra value"));
        }
        out.push(AnnounceRequest::new(key, value));
    }
    Ok(out)
}
