//! Assembles the linked commit + reveal Taproot transaction pair that
//! publishes ordinal-style inscriptions (e.g. BRC-20 operations) on
//! Bitcoin.
//!
//! The entry point is [`inscribe`]: given a set of spendable outputs, one or
//! more inscription payloads, and fee rates, it returns fully-signed,
//! hex-encoded transactions ready for broadcast, or an insufficient-balance
//! result carrying the fee figures a caller would need to top up.
//!
//! Broadcasting, UTXO discovery, key management and inscribed-content
//! validation are the caller's responsibility; this crate only builds and
//! signs transactions.

pub mod address;
pub mod commit_plan;
pub mod dialect;
pub mod envelope;
pub mod error;
pub mod orchestrator;
pub mod reveal_finalize;
pub mod reveal_plan;
pub mod signer;
pub mod taproot;
pub mod types;

pub use error::{InscribeError, InscribeResult};
pub use orchestrator::inscribe;
pub use types::{InscribeTxs, InscriptionData, InscriptionRequest, PrevOutput};

/// RBF-signalling input sequence number used throughout (max sequence minus
/// two), not Bitcoin's absolute maximum.
pub const RBF_SEQUENCE: u32 = 0xFFFF_FFFD;

/// Standard transaction weight ceiling: `MAX_BLOCK_WEIGHT / 10`.
pub const MAX_STANDARD_TX_WEIGHT: u64 = 400_000;

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::Network;

    #[test]
    fn sequence_is_rbf_not_max() {
        assert_eq!(RBF_SEQUENCE, 0xFFFF_FFFD);
        assert_ne!(RBF_SEQUENCE, u32::MAX);
    }

    #[test]
    fn rejects_empty_prevout_list() {
        let request = InscriptionRequest {
            commit_tx_prev_output_list: vec![],
            commit_fee_rate: 2,
            reveal_fee_rate: 2,
            inscription_data_list: vec![InscriptionData {
                content_type: "text/plain".into(),
                body: b"hi".to_vec(),
                reveal_addr: "tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx".into(),
            }],
            reveal_out_value: None,
            change_address: "tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx".into(),
        };
        let result = inscribe(Network::Testnet, &request);
        assert!(result.is_err());
    }
}
