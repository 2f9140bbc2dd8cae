//! Commit-tx assembly and fee solving.

use bitcoin::{OutPoint, PackedLockTime, PrivateKey, Script, Sequence, Transaction, TxIn, TxOut, Witness};

use crate::error::InscribeResult;
use crate::signer::sign_transaction;
use crate::RBF_SEQUENCE;

/// One funded spendable output, resolved from a caller-supplied [`crate::types::PrevOutput`].
pub struct ResolvedPrevOutput {
    pub outpoint: OutPoint,
    pub txout: TxOut,
    pub private_key: PrivateKey,
}

/// Result of planning the commit transaction.
pub enum CommitOutcome {
    /// Enough funds were available; `tx` is unsigned and ready for signing.
    Funded { tx: Transaction, fee: u64 },
    /// Not enough funds even with the change output removed. `fee` is the
    /// fee that would have been required, for the caller's UX.
    InsufficientBalance { fee: u64 },
}

/// Builds and fee-solves the commit transaction.
///
/// `reveal_fundings[i]` is the `(script, value)` pair the commit must pay so
/// reveal transaction `i` can be funded.
pub fn plan_commit(
    prevouts: &[ResolvedPrevOutput],
    reveal_fundings: &[(Script, u64)],
    change_script: Script,
    commit_fee_rate: u64,
) -> InscribeResult<CommitOutcome> {
    let total_input_value: u64 = prevouts.iter().map(|p| p.txout.value).sum();
    let total_reveal_funding: u64 = reveal_fundings.iter().map(|(_, v)| v).sum();

    let input: Vec<TxIn> = prevouts
        .iter()
        .map(|p| TxIn {
            previous_output: p.outpoint,
            script_sig: Script::new(),
            sequence: Sequence(RBF_SEQUENCE),
            witness: Witness::new(),
        })
        .collect();

    let mut output: Vec<TxOut> = reveal_fundings
        .iter()
        .map(|(script, value)| TxOut {
            value: *value,
            script_pubkey: script.clone(),
        })
        .collect();
    let change_index = output.len();
    output.push(TxOut {
        value: 0,
        script_pubkey: change_script,
    });

    let skeleton = Transaction {
        version: 2,
        lock_time: PackedLockTime::ZERO,
        input,
        output,
    };

    let txout_refs: Vec<TxOut> = prevouts.iter().map(|p| p.txout.clone()).collect();
    let keys: Vec<PrivateKey> = prevouts.iter().map(|p| p.private_key.clone()).collect();

    let fee_with_change = estimate_fee(&skeleton, &txout_refs, &keys, commit_fee_rate)?;
    let change_with_change = total_input_value as i64
        - total_reveal_funding as i64
        - fee_with_change as i64;

    if change_with_change > 0 {
        let mut tx = skeleton;
        tx.output[change_index].value = change_with_change as u64;
        return Ok(CommitOutcome::Funded {
            tx,
            fee: fee_with_change,
        });
    }
    if change_with_change == 0 {
        let mut tx = skeleton;
        tx.output.remove(change_index);
        return Ok(CommitOutcome::Funded {
            tx,
            fee: fee_with_change,
        });
    }

    // change < 0: drop the change output and re-estimate without it.
    let mut tx_no_change = skeleton;
    tx_no_change.output.remove(change_index);
    let fee_no_change = estimate_fee(&tx_no_change, &txout_refs, &keys, commit_fee_rate)?;
    let change_no_change =
        total_input_value as i64 - total_reveal_funding as i64 - fee_no_change as i64;

    if change_no_change >= 0 {
        Ok(CommitOutcome::Funded {
            tx: tx_no_change,
            fee: fee_no_change,
        })
    } else {
        // the original reports the with-change fee estimate even on this
        // shortfall branch (inscribe.go's MustCommitTxFee), not the
        // re-estimated without-change fee.
        Ok(CommitOutcome::InsufficientBalance {
            fee: fee_with_change,
        })
    }
}

fn estimate_fee(
    tx: &Transaction,
    prevouts: &[TxOut],
    keys: &[PrivateKey],
    commit_fee_rate: u64,
) -> InscribeResult<u64> {
    let mut clone = tx.clone();
    sign_transaction(&mut clone, prevouts, keys)?;
    let vsize = clone.vsize() as u64;
    Ok(vsize * commit_fee_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::Network;

    fn key(byte: u8) -> PrivateKey {
        PrivateKey::from_slice(&[byte; 32], Network::Testnet).unwrap()
    }

    #[test]
    fn drops_zero_value_change_output() {
        let secp = bitcoin::secp256k1::Secp256k1::new();
        let pk = key(5);
        let pubkey = pk.public_key(&secp);
        let script = crate::address::p2wpkh_script(
            pubkey.wpubkey_hash().unwrap().as_ref(),
        );
        let prevouts = vec![ResolvedPrevOutput {
            outpoint: OutPoint::null(),
            txout: TxOut {
                value: 100_000,
                script_pubkey: script,
            },
            private_key: pk,
        }];
        let reveal_fundings = vec![(Script::new(), 10_000)];
        let change_script = Script::new();

        let outcome = plan_commit(&prevouts, &reveal_fundings, change_script, 1).unwrap();
        match outcome {
            CommitOutcome::Funded { tx, .. } => {
                assert!(tx.output.len() <= 2);
            }
            CommitOutcome::InsufficientBalance { .. } => panic!("expected funded outcome"),
        }
    }
}
