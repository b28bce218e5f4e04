//! # Signature verification
//!
//! Recovers the secp256k1 signer of an offer digest and compares it with the
//! claimed maker address.
//!
//! Signatures are 65 bytes `r ‖ s ‖ v` with `v ∈ {0, 1, 27, 28}`. High-`s`
//! signatures are rejected so each digest has exactly one valid encoding per
//! key. Every malformed input yields `false`; nothing here traps.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use soroban_sdk::{Bytes, BytesN, Env};

use crate::digest;

pub const SIGNATURE_LEN: u32 = 65;

fn parse_recovery_id(v: u8) -> Option<RecoveryId> {
    let normalized = match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        _ => return None,
    };
    RecoveryId::from_byte(normalized)
}

/// Signer address: last 20 bytes of keccak256 of the uncompressed public key.
pub fn signer_address(env: &Env, key: &VerifyingKey) -> BytesN<20> {
    let point = key.to_encoded_point(false);
    let hash = digest::keccak(env, &Bytes::from_slice(env, &point.as_bytes()[1..]));
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    BytesN::from_array(env, &address)
}

/// Recovers the signer of `digest`, or `None` for any malformed signature.
pub fn recover_signer(env: &Env, digest: &BytesN<32>, signature: &Bytes) -> Option<BytesN<20>> {
    if signature.len() != SIGNATURE_LEN {
        return None;
    }
    let mut raw = [0u8; 65];
    signature.copy_into_slice(&mut raw);

    let recovery_id = parse_recovery_id(raw[64])?;
    let sig = Signature::from_slice(&raw[..64]).ok()?;
    if sig.normalize_s().is_some() {
        return None;
    }

    let key = VerifyingKey::recover_from_prehash(&digest.to_array(), &sig, recovery_id).ok()?;
    Some(signer_address(env, &key))
}

/// `true` iff `signature` over `digest` recovers to the non-zero `signer`.
pub fn is_valid_signature(
    env: &Env,
    digest: &BytesN<32>,
    signer: &BytesN<20>,
    signature: &Bytes,
) -> bool {
    if signer.to_array() == [0u8; 20] {
        return false;
    }
    match recover_signer(env, digest, signature) {
        Some(recovered) => recovered == *signer,
        None => false,
    }
}
