//! Taproot commitment construction.
//!
//! Derives the control block and tweaked P2TR output from a single-leaf
//! script tree via `TaprootBuilder`.

use bitcoin::util::taproot::{LeafVersion, TaprootBuilder, TaprootSpendInfo};
use bitcoin::{secp256k1::Secp256k1, Address, Network, Script};

use crate::error::{InscribeError, InscribeResult};

/// Everything derived from an internal key and a leaf script: the spend
/// info needed to build a control block, and the P2TR address/output
/// script the commit transaction must pay.
pub struct Commitment {
    pub spend_info: TaprootSpendInfo,
    pub address: Address,
    pub leaf_script: Script,
}

/// Builds the single-leaf Taproot commitment for `leaf_script` under
/// `internal_key`.
pub fn build_commitment(
    internal_key: bitcoin::secp256k1::XOnlyPublicKey,
    leaf_script: Script,
    network: Network,
) -> InscribeResult<Commitment> {
    let secp = Secp256k1::new();

    let spend_info = TaprootBuilder::new()
        .add_leaf(0, leaf_script.clone())
        .map_err(|e| InscribeError::ScriptBuild(format!("invalid leaf script: {e}")))?
        .finalize(&secp, internal_key)
        .map_err(|_| {
            InscribeError::ScriptBuild("taproot builder could not finalize".to_string())
        })?;

    let address = Address::p2tr(
        &secp,
        spend_info.internal_key(),
        spend_info.merkle_root(),
        network,
    );

    Ok(Commitment {
        spend_info,
        address,
        leaf_script,
    })
}

impl Commitment {
    /// Serialised control block proving `leaf_script`'s membership in this
    /// (single-leaf) tree.
    pub fn control_block(&self) -> InscribeResult<Vec<u8>> {
        let control_block = self
            .spend_info
            .control_block(&(self.leaf_script.clone(), LeafVersion::TapScript))
            .ok_or_else(|| {
                InscribeError::ScriptBuild("no control block for leaf script".to_string())
            })?;
        Ok(control_block.serialize())
    }

    /// The P2TR witness program this commitment pays to.
    pub fn script_pubkey(&self) -> Script {
        self.address.script_pubkey()
    }
}
