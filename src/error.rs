//! Error taxonomy for the inscription-building pipeline.

use thiserror::Error;

/// Errors that can abort an [`crate::inscribe`] call.
///
/// Insufficient balance is deliberately *not* a variant here: per the
/// orchestrator's contract it is a result, not a failure, and is carried in
/// [`crate::types::InscribeTxs`] instead (empty hex, populated fee fields).
#[derive(Error, Debug)]
pub enum InscribeError {
    /// A caller-supplied address, WIF key, or txid hex could not be decoded.
    #[error("could not decode input: {0}")]
    InputDecode(String),

    /// Building the inscription envelope or taproot commitment failed.
    ///
    /// Should not occur for valid inputs; treat as a bug if seen.
    #[error("script build failed: {0}")]
    ScriptBuild(String),

    /// Signing an input failed: unknown script dialect, missing key, or a
    /// P2SH input whose redeem script is not P2WPKH.
    #[error("signing failed: {0}")]
    Signing(String),

    /// A reveal transaction exceeded the standard-tx weight cap after its
    /// witness was attached.
    #[error("reveal transaction {0} exceeds max standard weight: {1} > {2}")]
    TxWeightExceeded(usize, u64, u64),

    /// A built transaction could not be serialised.
    #[error("could not serialize transaction: {0}")]
    Serialization(String),
}

/// Result type used throughout this crate.
pub type InscribeResult<T> = Result<T, InscribeError>;
