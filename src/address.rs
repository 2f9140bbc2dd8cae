//! Address & script utilities.
//!
//! Every caller — prevout resolution, change output construction, reveal
//! destinations — decodes addresses through this single module; no dialect
//! detection on addresses lives anywhere else.

use bitcoin::blockdata::opcodes::all::{OP_CHECKSIG, OP_DUP, OP_EQUAL, OP_EQUALVERIFY, OP_HASH160};
use bitcoin::blockdata::script::Builder;
use bitcoin::{Address, Network, Script};
use std::str::FromStr;

use crate::error::{InscribeError, InscribeResult};

/// Decodes `addr` against `network` and returns its canonical output script.
pub fn address_to_script(addr: &str, network: Network) -> InscribeResult<Script> {
    let address = Address::from_str(addr)
        .map_err(|e| InscribeError::InputDecode(format!("bad address {addr}: {e}")))?
        .require_network(network)
        .map_err(|e| InscribeError::InputDecode(format!("wrong-network address {addr}: {e}")))?;
    Ok(address.script_pubkey())
}

/// Standard P2PKH output script for a 20-byte pubkey hash.
pub fn p2pkh_script(pubkey_hash: &[u8]) -> Script {
    Builder::new()
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_slice(pubkey_hash)
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_CHECKSIG)
        .into_script()
}

/// Standard bare P2WPKH output script for a 20-byte pubkey hash.
pub fn p2wpkh_script(pubkey_hash: &[u8]) -> Script {
    Builder::new()
        .push_int(0)
        .push_slice(pubkey_hash)
        .into_script()
}

/// Standard P2SH output script for a 20-byte script hash.
pub fn p2sh_script(script_hash: &[u8]) -> Script {
    Builder::new()
        .push_opcode(OP_HASH160)
        .push_slice(script_hash)
        .push_opcode(OP_EQUAL)
        .into_script()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_network_address() {
        // mainnet-looking address decoded against testnet must fail.
        let err = address_to_script("1BoatSLRHtKNngkdXEeobR76b53LETtpyT", Network::Testnet);
        assert!(err.is_err());
    }
}
