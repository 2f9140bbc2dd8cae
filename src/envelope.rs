//! Inscription envelope builder.
//!
//! Builds the Taproot leaf script carrying an ordinals-style inscription:
//! a spending condition followed by an unexecuted `OP_IF` envelope holding
//! the `"ord"` tag, a content-type field, and the body.

use bitcoin::blockdata::opcodes::all::{OP_CHECKSIG, OP_ENDIF, OP_IF};
use bitcoin::blockdata::opcodes::OP_FALSE;
use bitcoin::blockdata::script::Builder;
use bitcoin::secp256k1::XOnlyPublicKey;
use bitcoin::Script;

/// Maximum bytes per body push; Bitcoin's standard script push limit.
pub const MAX_PUSH_BYTES: usize = 520;

/// Content-type tag byte used by the `"ord"` protocol.
const TAG_CONTENT_TYPE: u8 = 1;

/// Builds the inscription leaf script for `(internal_pubkey, content_type,
/// body)`.
///
/// The terminal `OP_ENDIF` is appended as a raw byte after the builder
/// finishes, to route around `Builder`'s internal script-size guard:
/// inscription bodies legitimately exceed it, and on-chain validity here is
/// governed by transaction weight, not a builder-internal limit.
pub fn build_envelope_script(
    internal_pubkey: &XOnlyPublicKey,
    content_type: &[u8],
    body: &[u8],
) -> Script {
    let mut builder = Builder::new()
        .push_x_only_key(internal_pubkey)
        .push_opcode(OP_CHECKSIG)
        .push_opcode(OP_FALSE)
        .push_opcode(OP_IF)
        .push_slice(b"ord")
        .push_slice(&[TAG_CONTENT_TYPE])
        .push_slice(content_type)
        .push_opcode(OP_FALSE);

    for chunk in body.chunks(MAX_PUSH_BYTES) {
        builder = builder.push_slice(chunk);
    }

    let mut bytes = builder.into_script().into_bytes();
    bytes.push(OP_ENDIF.to_u8());
    Script::from(bytes)
}

/// Number of body pushes a body of `len` bytes will occupy.
pub fn body_push_count(len: usize) -> usize {
    if len == 0 {
        1
    } else {
        (len + MAX_PUSH_BYTES - 1) / MAX_PUSH_BYTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::secp256k1::{KeyPair, Secp256k1, SecretKey};

    fn test_key() -> XOnlyPublicKey {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[7u8; 32]).unwrap();
        let keypair = KeyPair::from_secret_key(&secp, &sk);
        let (xonly, _parity) = keypair.x_only_public_key();
        xonly
    }

    #[test]
    fn ends_with_op_endif() {
        let script = build_envelope_script(&test_key(), b"text/plain", b"hello");
        assert_eq!(*script.as_bytes().last().unwrap(), OP_ENDIF.to_u8());
    }

    #[test]
    fn envelope_header_matches_exact_byte_layout() {
        let script = build_envelope_script(&test_key(), b"a", b"");
        let expected_header = hex_literal::hex!(
            "00 63 03 6f 72 64 01 01 01 61 00" // OP_FALSE OP_IF "ord" tag content-type OP_0
        );
        let internal_key_push_len = 1 + 32; // len-prefix + x-only pubkey
        let prefix = internal_key_push_len + 1; // + OP_CHECKSIG
        assert_eq!(
            &script.as_bytes()[prefix..prefix + expected_header.len()],
            &expected_header
        );
    }

    #[test]
    fn chunks_large_body_at_520_bytes() {
        let body = vec![0xABu8; 3_000];
        assert_eq!(body_push_count(body.len()), 6);
        let script = build_envelope_script(&test_key(), b"application/octet-stream", &body);
        // every byte of the body must survive somewhere in the script
        assert!(script.len() > body.len());
    }

    #[test]
    fn body_separator_is_bare_op_0() {
        // Spec byte layout after the internal pubkey/OP_CHECKSIG/OP_FALSE/
        // OP_IF: "ord" push, then the content-type tag push (which itself
        // *is* the two bytes "OP_DATA_1 OP_DATA_1": a 1-byte-push opcode
        // followed by the 0x01 tag value), then the content-type push, then
        // the body separator — which must be the single byte 0x00 (bare
        // OP_0), not a one-byte push of a zero value.
        let content_type = b"text/plain";
        let script = build_envelope_script(&test_key(), content_type, b"hi");
        let bytes = script.as_bytes();
        let internal_key_push_len = 1 + 32; // len-prefix + x-only pubkey
        let ord_push_len = 1 + 3; // len-prefix + "ord"
        let tag_push_len = 1 + 1; // OP_DATA_1, then the 0x01 tag byte
        let content_type_push_len = 1 + content_type.len(); // len-prefix + bytes
        let prefix = internal_key_push_len
            + 1 // OP_CHECKSIG
            + 1 // OP_FALSE
            + 1 // OP_IF
            + ord_push_len
            + tag_push_len
            + content_type_push_len;
        assert_eq!(bytes[prefix], 0x00);
    }

    #[test]
    fn exceeds_standard_builder_size_guard() {
        let body = vec![0x11u8; 20_000];
        let script = build_envelope_script(&test_key(), b"text/plain", &body);
        assert!(script.len() > 10_000);
    }
}
