//! Wire-level request/response shapes.
//!
//! These mirror the JSON field names the caller sends/receives exactly:
//! plain serde structs at the edge of the library, with no dialect-specific
//! logic leaking into them.

use serde::{Deserialize, Deserializer, Serialize};

/// Default reveal output value in satoshis: the dust threshold for a
/// P2WPKH-style output.
pub const DEFAULT_REVEAL_OUT_VALUE: i64 = 546;

/// A spendable output the caller offers to fund the commit transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrevOutput {
    /// Hex-encoded txid of the transaction that created this output.
    pub tx_id: String,
    /// Output index within that transaction.
    pub v_out: u32,
    /// Value of the output, in satoshis.
    pub amount: i64,
    /// Address controlling the output; determines its script dialect.
    pub address: String,
    /// WIF-encoded private key controlling `address`.
    pub private_key: String,
}

/// One piece of content to inscribe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InscriptionData {
    /// MIME-like content type, stored verbatim in the envelope.
    pub content_type: String,
    /// Raw inscription body. Accepts either a base64 string or a literal
    /// byte sequence on the wire; see [`deserialize_body`].
    #[serde(deserialize_with = "deserialize_body")]
    pub body: Vec<u8>,
    /// Address that will receive the reveal output.
    pub reveal_addr: String,
}

/// Accepts the body either as a base64 string (the common JSON-RPC case) or,
/// failing that, as its raw UTF-8 bytes — so a caller that already has text
/// content doesn't have to base64-encode it first.
fn deserialize_body<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    use base64::Engine;
    let raw = String::deserialize(deserializer)?;
    match base64::engine::general_purpose::STANDARD.decode(&raw) {
        Ok(bytes) => Ok(bytes),
        Err(_) => Ok(raw.into_bytes()),
    }
}

/// Aggregate input to [`crate::inscribe`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InscriptionRequest {
    /// Outputs funding the commit transaction, in input order.
    pub commit_tx_prev_output_list: Vec<PrevOutput>,
    /// Fee rate for the commit transaction, sat/vbyte.
    pub commit_fee_rate: i64,
    /// Fee rate for each reveal transaction, sat/vbyte.
    pub reveal_fee_rate: i64,
    /// Inscriptions to publish, one reveal transaction each.
    pub inscription_data_list: Vec<InscriptionData>,
    /// Value of each reveal output, in satoshis. Values `<= 0` fall back to
    /// [`DEFAULT_REVEAL_OUT_VALUE`] only when the field is entirely absent;
    /// see `DESIGN.md`'s Open Question decision for an explicit `0`.
    #[serde(default)]
    pub reveal_out_value: Option<i64>,
    /// Address receiving any leftover commit-transaction value.
    pub change_address: String,
}

impl InscriptionRequest {
    /// The reveal output value to actually use, applying the default only
    /// when the caller omitted the field.
    pub fn reveal_out_value(&self) -> i64 {
        self.reveal_out_value.unwrap_or(DEFAULT_REVEAL_OUT_VALUE)
    }
}

/// Result of [`crate::inscribe`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InscribeTxs {
    /// Hex-encoded signed commit transaction, or empty on insufficient balance.
    pub commit_tx: String,
    /// Hex-encoded signed reveal transactions, or empty on insufficient balance.
    pub reveal_txs: Vec<String>,
    /// Fee actually paid (or, on insufficient balance, the fee that would be
    /// required) by the commit transaction, in satoshis.
    pub commit_tx_fee: i64,
    /// Fee actually paid (or would-be fee) by each reveal transaction, in
    /// satoshis, one entry per inscription.
    pub reveal_tx_fees: Vec<i64>,
}
