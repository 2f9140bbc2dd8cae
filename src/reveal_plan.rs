//! Reveal-tx fee solving.
//!
//! Builds an empty reveal transaction per inscription and computes the
//! commit output value that must fund it, using a worst-case placeholder
//! witness since no signature exists yet.

use bitcoin::blockdata::script::Script;
use bitcoin::hashes::Hash;
use bitcoin::{OutPoint, PackedLockTime, Sequence, Transaction, TxIn, TxOut, Txid, Witness};

use crate::RBF_SEQUENCE;

/// Size, in bytes, of an empty Schnorr signature placeholder.
const PLACEHOLDER_SCHNORR_SIG_LEN: usize = 64;
/// Size, in bytes, of an empty control block placeholder (leaf-version byte
/// + 32-byte x-only internal key).
const PLACEHOLDER_CONTROL_BLOCK_LEN: usize = 33;

/// A reveal transaction before the commit txid is known, plus the
/// bookkeeping the commit planner needs to fund it.
pub struct PlannedReveal {
    /// The empty reveal transaction (placeholder outpoint, no witness).
    pub tx: Transaction,
    /// The leaf script this reveal will spend via script-path.
    pub leaf_script: Script,
    /// Value the commit output funding this reveal must carry.
    pub required_prevout_value: u64,
}

/// Builds the empty reveal transaction for inscription index `i` and solves
/// for the commit-output value that satisfies `reveal_fee_rate`.
pub fn plan_reveal(
    index: u32,
    leaf_script: Script,
    destination_script: Script,
    reveal_out_value: u64,
    reveal_fee_rate: u64,
) -> PlannedReveal {
    let tx = Transaction {
        version: 2,
        lock_time: PackedLockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint {
                txid: Txid::from_slice(&[0u8; 32]).expect("32 zero bytes is a valid txid"),
                vout: index,
            },
            script_sig: Script::new(),
            sequence: Sequence(RBF_SEQUENCE),
            witness: Witness::new(),
        }],
        output: vec![TxOut {
            value: reveal_out_value,
            script_pubkey: destination_script,
        }],
    };

    let placeholder_witness_size = {
        let mut witness = Witness::new();
        witness.push(vec![0u8; PLACEHOLDER_SCHNORR_SIG_LEN]);
        witness.push(leaf_script.to_bytes());
        witness.push(vec![0u8; PLACEHOLDER_CONTROL_BLOCK_LEN]);
        bitcoin::consensus::serialize(&witness).len()
    };

    let base_size = tx.size() as u64;
    let witness_vbytes = (placeholder_witness_size as u64 + 2 + 3) / 4;
    let required_prevout_value =
        reveal_out_value + base_size * reveal_fee_rate + witness_vbytes * reveal_fee_rate;

    PlannedReveal {
        tx,
        leaf_script,
        required_prevout_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::build_envelope_script;
    use bitcoin::secp256k1::{KeyPair, Secp256k1, SecretKey};

    #[test]
    fn required_value_covers_output_and_fee() {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[9u8; 32]).unwrap();
        let keypair = KeyPair::from_secret_key(&secp, &sk);
        let (xonly, _) = keypair.x_only_public_key();
        let leaf = build_envelope_script(&xonly, b"text/plain", b"hello world");
        let dest = Script::new_v0_p2wpkh(&bitcoin::WPubkeyHash::from_slice(&[1u8; 20]).unwrap());

        let planned = plan_reveal(0, leaf, dest, 546, 2);
        assert!(planned.required_prevout_value > 546);
        assert_eq!(planned.tx.output[0].value, 546);
        assert_eq!(planned.tx.input[0].sequence, Sequence(RBF_SEQUENCE));
    }
}
