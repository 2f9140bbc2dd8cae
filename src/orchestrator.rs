//! Orchestrator & fee accounting.
//!
//! Sequences the envelope/taproot/planner/signer/finaliser components and
//! exposes the single [`inscribe`] entry point.

use std::str::FromStr;

use bitcoin::secp256k1::{KeyPair, Secp256k1};
use bitcoin::{Network, OutPoint, PrivateKey, TxOut, Txid};
use tracing::{debug, info, warn};

use crate::address::address_to_script;
use crate::commit_plan::{self, CommitOutcome, ResolvedPrevOutput};
use crate::envelope::build_envelope_script;
use crate::error::{InscribeError, InscribeResult};
use crate::reveal_finalize::finalize_reveal;
use crate::reveal_plan::{self, PlannedReveal};
use crate::signer::sign_transaction;
use crate::taproot::build_commitment;
use crate::types::{InscribeTxs, InscriptionRequest};

/// Per-inscription state carried from envelope construction through reveal
/// finalisation. Owned exclusively by the orchestrator for the call's
/// duration; callers only ever see the hex/fee results in [`InscribeTxs`].
struct InscriptionContext {
    leaf_script: bitcoin::Script,
    control_block: Vec<u8>,
    commitment_script: bitcoin::Script,
    planned: PlannedReveal,
}

/// Builds and signs the commit/reveal transaction pair for `request`.
///
/// Returns `Ok` with empty transaction hex (and populated fee fields) rather
/// than an `Err` when the prevouts cannot cover the required funding — see
/// `DESIGN.md`'s insufficient-balance contract.
pub fn inscribe(network: Network, request: &InscriptionRequest) -> InscribeResult<InscribeTxs> {
    if request.commit_tx_prev_output_list.is_empty() {
        return Err(InscribeError::InputDecode(
            "at least one prevout is required".to_string(),
        ));
    }
    if request.inscription_data_list.is_empty() {
        return Err(InscribeError::InputDecode(
            "at least one inscription is required".to_string(),
        ));
    }

    let secp = Secp256k1::new();
    let resolved_prevouts = resolve_prevouts(network, request)?;
    let reveal_out_value = request.reveal_out_value().max(0) as u64;

    // the internal key is reused across every inscription, derived
    // from the first prevout's private key.
    let internal_keypair = KeyPair::from_secret_key(&secp, &resolved_prevouts[0].private_key.inner);
    let (internal_pubkey, _parity) = internal_keypair.x_only_public_key();

    let mut contexts = Vec::with_capacity(request.inscription_data_list.len());
    for (i, inscription) in request.inscription_data_list.iter().enumerate() {
        let leaf_script =
            build_envelope_script(&internal_pubkey, inscription.content_type.as_bytes(), &inscription.body);
        debug!(index = i, body_len = inscription.body.len(), "built inscription envelope");

        let commitment = build_commitment(internal_pubkey, leaf_script.clone(), network)?;
        let control_block = commitment.control_block()?;

        let destination_script = address_to_script(&inscription.reveal_addr, network)?;
        let planned = reveal_plan::plan_reveal(
            i as u32,
            leaf_script.clone(),
            destination_script,
            reveal_out_value,
            request.reveal_fee_rate.max(0) as u64,
        );

        contexts.push(InscriptionContext {
            leaf_script,
            control_block,
            commitment_script: commitment.script_pubkey(),
            planned,
        });
    }

    let reveal_fundings: Vec<(bitcoin::Script, u64)> = contexts
        .iter()
        .map(|ctx| (ctx.commitment_script.clone(), ctx.planned.required_prevout_value))
        .collect();

    let change_script = address_to_script(&request.change_address, network)?;

    let outcome = commit_plan::plan_commit(
        &resolved_prevouts,
        &reveal_fundings,
        change_script,
        request.commit_fee_rate.max(0) as u64,
    )?;

    let mut commit_tx = match outcome {
        CommitOutcome::Funded { tx, .. } => tx,
        CommitOutcome::InsufficientBalance { fee } => {
            warn!(fee, "insufficient balance to fund commit transaction");
            let reveal_tx_fees = contexts
                .iter()
                .map(|ctx| (ctx.planned.required_prevout_value - reveal_out_value) as i64)
                .collect();
            return Ok(InscribeTxs {
                commit_tx: String::new(),
                reveal_txs: Vec::new(),
                commit_tx_fee: fee as i64,
                reveal_tx_fees,
            });
        }
    };

    let keys: Vec<PrivateKey> = resolved_prevouts.iter().map(|p| p.private_key.clone()).collect();
    let prevout_txouts: Vec<TxOut> = resolved_prevouts.iter().map(|p| p.txout.clone()).collect();
    sign_transaction(&mut commit_tx, &prevout_txouts, &keys)?;
    let commit_txid = commit_tx.txid();
    info!(%commit_txid, "signed commit transaction");

    let mut reveal_txs = Vec::with_capacity(contexts.len());
    let mut reveal_tx_fees = Vec::with_capacity(contexts.len());
    for (i, ctx) in contexts.into_iter().enumerate() {
        let reveal_prevout = commit_tx.output[i].clone();
        let mut reveal_tx = ctx.planned.tx;
        finalize_reveal(
            &mut reveal_tx,
            i,
            &ctx.leaf_script,
            &ctx.control_block,
            &reveal_prevout,
            &internal_keypair,
            commit_txid,
        )?;
        reveal_tx_fees.push((reveal_prevout.value - reveal_tx.output[0].value) as i64);
        reveal_txs.push(hex::encode(bitcoin::consensus::serialize(&reveal_tx)));
    }

    let commit_input_value: u64 = resolved_prevouts.iter().map(|p| p.txout.value).sum();
    let commit_output_value: u64 = commit_tx.output.iter().map(|o| o.value).sum();
    let commit_tx_fee = (commit_input_value - commit_output_value) as i64;

    Ok(InscribeTxs {
        commit_tx: hex::encode(bitcoin::consensus::serialize(&commit_tx)),
        reveal_txs,
        commit_tx_fee,
        reveal_tx_fees,
    })
}

fn resolve_prevouts(
    network: Network,
    request: &InscriptionRequest,
) -> InscribeResult<Vec<ResolvedPrevOutput>> {
    request
        .commit_tx_prev_output_list
        .iter()
        .map(|prevout| {
            let txid = Txid::from_str(&prevout.tx_id)
                .map_err(|e| InscribeError::InputDecode(format!("bad txid {}: {e}", prevout.tx_id)))?;
            let outpoint = OutPoint::new(txid, prevout.v_out);
            let script_pubkey = address_to_script(&prevout.address, network)?;
            let private_key = PrivateKey::from_wif(&prevout.private_key)
                .map_err(|e| InscribeError::InputDecode(format!("bad private key: {e}")))?;
            Ok(ResolvedPrevOutput {
                outpoint,
                txout: TxOut {
                    value: prevout.amount.max(0) as u64,
                    script_pubkey,
                },
                private_key,
            })
        })
        .collect()
}

