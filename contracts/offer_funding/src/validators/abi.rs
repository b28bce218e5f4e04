//! Word-level readers for validator extradata and side-effect call data.
//!
//! Call data is `selector(4) ‖ word₀ ‖ word₁ ‖ …` with 32-byte words;
//! extradata is a bare sequence of words. Dynamic arrays use a head offset
//! word pointing at `length ‖ item₀ ‖ …`.

use soroban_sdk::{Bytes, BytesN, Env};

use crate::digest::{self, Word};

pub const WORD: u32 = 32;
pub const SELECTOR_LEN: u32 = 4;

/// First four bytes of keccak256 of a function signature.
pub fn selector(env: &Env, signature: &str) -> BytesN<4> {
    let hash = digest::keccak(env, &Bytes::from_slice(env, signature.as_bytes()));
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    BytesN::from_array(env, &out)
}

/// Word starting at byte `offset`, if fully in bounds.
pub fn word_at(data: &Bytes, offset: u32) -> Option<Word> {
    let end = offset.checked_add(WORD)?;
    if end > data.len() {
        return None;
    }
    let mut word = [0u8; 32];
    data.slice(offset..end).copy_into_slice(&mut word);
    Some(word)
}

/// `index`-th word of a word sequence.
pub fn nth_word(data: &Bytes, index: u32) -> Option<Word> {
    word_at(data, index.checked_mul(WORD)?)
}

/// `index`-th argument word of call data.
pub fn arg_word(data: &Bytes, index: u32) -> Option<Word> {
    word_at(data, SELECTOR_LEN.checked_add(index.checked_mul(WORD)?)?)
}

pub fn call_selector(data: &Bytes) -> Option<[u8; 4]> {
    if data.len() < SELECTOR_LEN {
        return None;
    }
    let mut out = [0u8; 4];
    data.slice(0..SELECTOR_LEN).copy_into_slice(&mut out);
    Some(out)
}

/// Reads a left-padded unsigned word that must fit in `u64`.
pub fn word_to_u64(word: &Word) -> Option<u64> {
    if word[..24].iter().any(|b| *b != 0) {
        return None;
    }
    let mut be = [0u8; 8];
    be.copy_from_slice(&word[24..]);
    Some(u64::from_be_bytes(be))
}

/// Reads a left-padded unsigned word that must fit in `u32`.
pub fn word_to_u32(word: &Word) -> Option<u32> {
    word_to_u64(word).and_then(|v| u32::try_from(v).ok())
}

/// Reads a right-padded `bytes4` word.
pub fn word_to_bytes4(word: &Word) -> Option<[u8; 4]> {
    if word[4..].iter().any(|b| *b != 0) {
        return None;
    }
    let mut out = [0u8; 4];
    out.copy_from_slice(&word[..4]);
    Some(out)
}

/// Length of the dynamic array whose head offset is argument `index`.
///
/// Returns the item count and the byte offset of the first item, after
/// checking that every item is in bounds.
pub fn dynamic_array(data: &Bytes, index: u32) -> Option<(u32, u32)> {
    let offset = word_to_u32(&arg_word(data, index)?)?;
    let length_at = SELECTOR_LEN.checked_add(offset)?;
    let count = word_to_u32(&word_at(data, length_at)?)?;
    let first = length_at.checked_add(WORD)?;
    let end = first.checked_add(count.checked_mul(WORD)?)?;
    if end > data.len() {
        return None;
    }
    Some((count, first))
}
