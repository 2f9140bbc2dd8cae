//! Reveal-tx finalisation.
//!
//! Once the commit transaction is signed and its txid known, each reveal's
//! placeholder input is rewritten to spend it, the Taproot script-path
//! sighash is computed and signed, and the witness is attached.

use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{KeyPair, Message, Secp256k1};
use bitcoin::util::sighash::{Prevouts, SighashCache};
use bitcoin::util::taproot::{LeafVersion, TapLeafHash};
use bitcoin::{SchnorrSighashType, Script, Transaction, TxOut, Txid, Witness};

use crate::error::{InscribeError, InscribeResult};
use crate::MAX_STANDARD_TX_WEIGHT;

/// Rewrites `tx`'s single input to spend `commit_txid`, signs the script-path
/// spend with `internal_keypair`, and attaches the inscription witness.
///
/// `index` identifies this reveal for [`InscribeError::TxWeightExceeded`].
pub fn finalize_reveal(
    tx: &mut Transaction,
    index: usize,
    leaf_script: &Script,
    control_block: &[u8],
    reveal_prevout: &TxOut,
    internal_keypair: &KeyPair,
    commit_txid: Txid,
) -> InscribeResult<()> {
    tx.input[0].previous_output.txid = commit_txid;

    let secp = Secp256k1::new();
    let leaf_hash = TapLeafHash::from_script(leaf_script, LeafVersion::TapScript);
    let sighash = {
        let mut cache = SighashCache::new(&*tx);
        cache
            .taproot_script_spend_signature_hash(
                0,
                &Prevouts::All(&[reveal_prevout.clone()]),
                leaf_hash,
                SchnorrSighashType::Default,
            )
            .map_err(|e| InscribeError::Signing(format!("reveal sighash: {e}")))?
    };
    let message = Message::from_slice(sighash.as_ref())
        .map_err(|e| InscribeError::Signing(format!("invalid sighash message: {e}")))?;
    let signature = secp.sign_schnorr(&message, internal_keypair);

    let mut witness = Witness::new();
    witness.push(signature.as_ref());
    witness.push(leaf_script.to_bytes());
    witness.push(control_block);
    tx.input[0].witness = witness;

    let weight = tx.weight().to_wu();
    if weight > MAX_STANDARD_TX_WEIGHT {
        return Err(InscribeError::TxWeightExceeded(
            index,
            weight,
            MAX_STANDARD_TX_WEIGHT,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::build_envelope_script;
    use crate::taproot::build_commitment;
    use bitcoin::secp256k1::SecretKey;
    use bitcoin::{Network, OutPoint, PackedLockTime, Sequence, TxIn};

    fn empty_reveal_tx(leaf_script: &Script) -> Transaction {
        Transaction {
            version: 2,
            lock_time: PackedLockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig: Script::new(),
                sequence: Sequence(crate::RBF_SEQUENCE),
                witness: Witness::new(),
            }],
            output: vec![TxOut {
                value: 546,
                script_pubkey: leaf_script.clone(),
            }],
        }
    }

    #[test]
    fn oversized_body_exceeds_standard_weight() {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[11u8; 32]).unwrap();
        let keypair = KeyPair::from_secret_key(&secp, &sk);
        let (xonly, _) = keypair.x_only_public_key();

        let body = vec![0x22u8; 500_000];
        let leaf_script = build_envelope_script(&xonly, b"application/octet-stream", &body);
        let commitment = build_commitment(xonly, leaf_script.clone(), Network::Testnet).unwrap();
        let control_block = commitment.control_block().unwrap();

        let mut reveal_tx = empty_reveal_tx(&leaf_script);
        let reveal_prevout = TxOut {
            value: 600_000,
            script_pubkey: commitment.script_pubkey(),
        };

        let err = finalize_reveal(
            &mut reveal_tx,
            0,
            &leaf_script,
            &control_block,
            &reveal_prevout,
            &keypair,
            Txid::from_slice(&[9u8; 32]).unwrap(),
        )
        .unwrap_err();

        match err {
            InscribeError::TxWeightExceeded(index, weight, max) => {
                assert_eq!(index, 0);
                assert!(weight > max);
            }
            other => panic!("expected TxWeightExceeded, got {other:?}"),
        }
    }
}
