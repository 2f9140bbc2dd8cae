//! Script-dialect classification.
//!
//! Classifies a prevout's script pubkey once, at input ingestion, into a
//! tagged variant instead of re-sniffing its shape at every signing call
//! site.

use bitcoin::Script;

use crate::error::{InscribeError, InscribeResult};

/// The four script dialects this crate signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `OP_1 <32-byte x-only pubkey>`, key-path spend.
    P2tr,
    /// `OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG`.
    P2pkh,
    /// `OP_0 <20-byte pubkey hash>`.
    P2wpkh,
    /// `OP_HASH160 <20> OP_EQUAL` wrapping a P2WPKH redeem script.
    P2shP2wpkh,
}

/// Classifies `script_pubkey` purely by its byte shape.
///
/// P2SH wrapping a non-P2WPKH redeem script is out of scope: callers must
/// supply the redeem script alongside an address that is known to be
/// P2WPKH-wrapped for that branch to apply.
pub fn classify(script_pubkey: &Script) -> InscribeResult<Dialect> {
    if script_pubkey.is_v1_p2tr() {
        Ok(Dialect::P2tr)
    } else if script_pubkey.is_p2pkh() {
        Ok(Dialect::P2pkh)
    } else if script_pubkey.is_v0_p2wpkh() {
        Ok(Dialect::P2wpkh)
    } else if script_pubkey.is_p2sh() {
        Ok(Dialect::P2shP2wpkh)
    } else {
        Err(InscribeError::Signing(format!(
            "unsupported script dialect: {script_pubkey}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::blockdata::script::Builder;
    use bitcoin::blockdata::opcodes::all::{OP_CHECKSIG, OP_DUP, OP_EQUALVERIFY, OP_HASH160};

    #[test]
    fn classifies_p2pkh() {
        let script = Builder::new()
            .push_opcode(OP_DUP)
            .push_opcode(OP_HASH160)
            .push_slice(&[0u8; 20])
            .push_opcode(OP_EQUALVERIFY)
            .push_opcode(OP_CHECKSIG)
            .into_script();
        assert_eq!(classify(&script).unwrap(), Dialect::P2pkh);
    }
}
