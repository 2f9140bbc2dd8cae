//! Multi-dialect transaction signer.
//!
//! Signs each input of a transaction according to its prevout's script
//! dialect, classified once via [`crate::dialect::classify`]. Input order
//! matches key order, mirroring the original's per-index `signInput`.

use bitcoin::blockdata::opcodes::all::{OP_CHECKSIG, OP_DUP, OP_EQUALVERIFY, OP_HASH160};
use bitcoin::blockdata::script::Builder;
use bitcoin::secp256k1::{KeyPair, Message, Secp256k1};
use bitcoin::util::key::TapTweak;
use bitcoin::util::sighash::{EcdsaSighashType, Prevouts, SighashCache};
use bitcoin::{PrivateKey, SchnorrSighashType, Script, Transaction, TxOut, Witness};

use crate::dialect::{classify, Dialect};
use crate::error::{InscribeError, InscribeResult};

/// DER-encodes `sig` and appends the sighash-type byte, the wire format
/// every legacy/segwit signature push uses.
fn ecdsa_sig_with_hashtype(
    sig: bitcoin::secp256k1::ecdsa::Signature,
    sighash_type: EcdsaSighashType,
) -> Vec<u8> {
    let mut bytes = sig.serialize_der().to_vec();
    bytes.push(sighash_type.to_u32() as u8);
    bytes
}

/// Builds the P2PKH script code for a 20-byte pubkey hash; also doubles as
/// the script code BIP-143 uses for a P2WPKH/P2SH-P2WPKH input.
fn p2pkh_script_code(pubkey_hash: &[u8]) -> Script {
    Builder::new()
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_slice(pubkey_hash)
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_CHECKSIG)
        .into_script()
}

fn p2wpkh_redeem_script(pubkey_hash: &[u8]) -> Script {
    Builder::new()
        .push_opcode(bitcoin::blockdata::opcodes::all::OP_PUSHBYTES_0)
        .push_slice(pubkey_hash)
        .into_script()
}

/// Signs every input of `tx` in place.
///
/// `prevouts[i]` is the output that `tx.input[i]` spends; `keys[i]` is the
/// private key controlling it. Both slices must be the same length as
/// `tx.input`.
pub fn sign_transaction(
    tx: &mut Transaction,
    prevouts: &[TxOut],
    keys: &[PrivateKey],
) -> InscribeResult<()> {
    let secp = Secp256k1::new();

    for i in 0..tx.input.len() {
        let prevout = &prevouts[i];
        let key = &keys[i];
        match classify(&prevout.script_pubkey)? {
            Dialect::P2tr => sign_p2tr_input(tx, i, prevouts, key, &secp)?,
            Dialect::P2pkh => sign_p2pkh_input(tx, i, prevout, key, &secp)?,
            Dialect::P2wpkh => sign_p2wpkh_input(tx, i, prevout, key, &secp, false)?,
            Dialect::P2shP2wpkh => sign_p2wpkh_input(tx, i, prevout, key, &secp, true)?,
        }
    }
    Ok(())
}

fn sign_p2tr_input(
    tx: &mut Transaction,
    index: usize,
    prevouts: &[TxOut],
    key: &PrivateKey,
    secp: &Secp256k1<bitcoin::secp256k1::All>,
) -> InscribeResult<()> {
    let keypair = KeyPair::from_secret_key(secp, &key.inner);
    let sighash = {
        let mut cache = SighashCache::new(&*tx);
        cache
            .taproot_key_spend_signature_hash(index, &Prevouts::All(prevouts), SchnorrSighashType::Default)
            .map_err(|e| InscribeError::Signing(format!("taproot sighash: {e}")))?
    };
    let message = Message::from_slice(sighash.as_ref())
        .map_err(|e| InscribeError::Signing(format!("invalid sighash message: {e}")))?;
    // the prevout's scriptPubKey commits to the BIP-341 *tweaked* output
    // key (Q = P + H_TapTweak(P)·G, BIP-86 empty-merkle-root tweak); a
    // key-path signature must come from that tweaked key, not the raw
    // internal keypair, or it fails consensus verification.
    let tweaked_keypair = keypair.tap_tweak(secp, None);
    let signature = secp.sign_schnorr(&message, &tweaked_keypair.to_inner());

    let mut witness = Witness::new();
    witness.push(signature.as_ref());
    tx.input[index].witness = witness;
    Ok(())
}

fn sign_p2pkh_input(
    tx: &mut Transaction,
    index: usize,
    prevout: &TxOut,
    key: &PrivateKey,
    secp: &Secp256k1<bitcoin::secp256k1::All>,
) -> InscribeResult<()> {
    let sighash = {
        let mut cache = SighashCache::new(&*tx);
        cache
            .legacy_signature_hash(index, &prevout.script_pubkey, EcdsaSighashType::All.to_u32())
            .map_err(|e| InscribeError::Signing(format!("legacy sighash: {e}")))?
    };
    let message = Message::from_slice(sighash.as_ref())
        .map_err(|e| InscribeError::Signing(format!("invalid sighash message: {e}")))?;
    let sig = ecdsa_sig_with_hashtype(secp.sign_ecdsa(&message, &key.inner), EcdsaSighashType::All);
    let pubkey = key.public_key(secp);

    let script_sig = Builder::new()
        .push_slice(&sig)
        .push_key(&pubkey)
        .into_script();
    tx.input[index].script_sig = script_sig;
    Ok(())
}

fn sign_p2wpkh_input(
    tx: &mut Transaction,
    index: usize,
    prevout: &TxOut,
    key: &PrivateKey,
    secp: &Secp256k1<bitcoin::secp256k1::All>,
    wrapped_in_p2sh: bool,
) -> InscribeResult<()> {
    let pubkey = key.public_key(secp);
    let pubkey_hash = pubkey.wpubkey_hash().ok_or_else(|| {
        InscribeError::Signing("p2wpkh signing requires a compressed pubkey".to_string())
    })?;
    let script_code = p2pkh_script_code(pubkey_hash.as_ref());

    let sighash = {
        let mut cache = SighashCache::new(&*tx);
        cache
            .segwit_signature_hash(index, &script_code, prevout.value, EcdsaSighashType::All)
            .map_err(|e| InscribeError::Signing(format!("segwit sighash: {e}")))?
    };
    let message = Message::from_slice(sighash.as_ref())
        .map_err(|e| InscribeError::Signing(format!("invalid sighash message: {e}")))?;
    let sig = ecdsa_sig_with_hashtype(secp.sign_ecdsa(&message, &key.inner), EcdsaSighashType::All);

    let mut witness = Witness::new();
    witness.push(sig);
    witness.push(pubkey.to_bytes());
    tx.input[index].witness = witness;

    if wrapped_in_p2sh {
        let redeem_script = p2wpkh_redeem_script(pubkey_hash.as_ref());
        tx.input[index].script_sig = Builder::new().push_slice(redeem_script.as_bytes()).into_script();
    }
    Ok(())
}
