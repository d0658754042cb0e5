use crate::envelope::DEFAULT_MAX_PAYLOAD;

/// What to do with status/announce keys the codec does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeyPolicy {
    /// Fail with `InvalidStatusKeyPair`.
    #[default]
    Reject,
    /// Ignore the pair and keep decoding.
    Skip,
}

/// Controls decoding behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Handling of unrecognised status and announce keys.
    pub unknown_keys: UnknownKeyPolicy,
    /// Maximum message payload size in bytes. Default: 10 MiB.
    pub max_payload_size: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            unknown_keys: UnknownKeyPolicy::Reject,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

impl DecodeConfig {
    /// Configuration that tolerates keys added by newer protocol revisions.
    pub fn permissive() -> Self {
        Self {
            unknown_keys: UnknownKeyPolicy::Skip,
            ..Self::default()
        }
    }
}
