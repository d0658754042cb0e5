//! Chain parameters that select transaction encoding rules.
//!
//! The chain id check is the only content validation the codec performs. A
//! transaction signed for another chain cannot be the one the caller meant to
//! relay or receive, so it fails with [`DecodeError::WrongNetwork`] on decode
//! and `EncodeError::ChainMismatch` on encode. Signatures, nonces and gas are
//! not checked.

use alloy_consensus::{Transaction, TxEnvelope};
use lesprims_wire::{DecodeError, ListReader, Result};
use tracing::debug;

/// A chain a light client talks to.
///
/// Transactions replay-protected (EIP-155 or typed) for another chain are
/// rejected; unprotected legacy transactions are valid on every network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Network {
    pub name: &'static str,
    pub chain_id: u64,
}

impl Network {
    pub const MAINNET: Network = Network::new("mainnet", 1);
    pub const ROPSTEN: Network = Network::new("ropsten", 3);
    pub const RINKEBY: Network = Network::new("rinkeby", 4);
    pub const GOERLI: Network = Network::new("goerli", 5);
    pub const SEPOLIA: Network = Network::new("sepolia", 11_155_111);

    const KNOWN: [Network; 5] = [
        Network::MAINNET,
        Network::ROPSTEN,
        Network::RINKEBY,
        Network::GOERLI,
        Network::SEPOLIA,
    ];

    pub const fn new(name: &'static str, chain_id: u64) -> Self {
        Self { name, chain_id }
    }

    /// Well-known network for a chain id.
    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::KNOWN
            .iter()
            .copied()
            .find(|network| network.chain_id == chain_id)
    }

    /// Check a transaction's replay protection against this network.
    ///
    /// On mismatch returns the chain id the transaction is bound to.
    pub fn check(&self, tx: &TxEnvelope) -> std::result::Result<(), u64> {
        match tx.chain_id() {
            Some(chain_id) if chain_id != self.chain_id => Err(chain_id),
            _ => Ok(()),
        }
    }

    /// Decode every transaction in `list` under this network's rules.
    pub fn decode_transactions(&self, list: ListReader<'_>) -> Result<Vec<TxEnvelope>> {
        list.collect(|list| {
            let tx = list.item::<TxEnvelope>("transaction")?;
            self.check(&tx).map_err(|found| {
                debug!(network = self.name, found, "transaction for another chain");
                DecodeError::WrongNetwork {
                    expected: self.chain_id,
                    found,
                }
            })?;
            Ok(tx)
        })
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::MAINNET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_networks_by_chain_id() {
        assert_eq!(Network::from_chain_id(1), Some(Network::MAINNET));
        assert_eq!(Network::from_chain_id(11_155_111), Some(Network::SEPOLIA));
        assert_eq!(Network::from_chain_id(424242), None);
    }
}
