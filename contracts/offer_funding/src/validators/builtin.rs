//! Built-in validators hosted by the funding contract itself.
//!
//! | Validator            | Extradata words                        | New fill            |
//! |----------------------|----------------------------------------|---------------------|
//! | `TargetAndSelector`  | `[contract, selector, increment]`      | `current + increment` |
//! | `ReturnOfAsset`      | `[contract]`                           | `current − 1`       |
//! | `BulkReturnOfAsset`  | `[contract]`                           | `current − ids`     |
//!
//! The return validators only accept a plain call moving assets from the
//! counterparty back to the beneficiary.

use soroban_sdk::{Bytes, BytesN, Env};

use super::abi;
use crate::digest::{self, Word};
use crate::types::{BuiltinValidator, CallKind, ValidatorContext};

const TRANSFER_FROM: &str = "transferFrom(address,address,uint256)";
const TRANSFER_FROM_BULK: &str = "transferFromBulk(address,address,uint256[])";

impl BuiltinValidator {
    /// Signature whose selector addresses this validator.
    pub fn signature(&self) -> &'static str {
        match self {
            BuiltinValidator::TargetAndSelector => {
                "acceptTargetAndSelector(bytes,address[5],uint8,uint256[5],bytes)"
            }
            BuiltinValidator::ReturnOfAsset => {
                "acceptReturnOfAsset(bytes,address[5],uint8,uint256[5],bytes)"
            }
            BuiltinValidator::BulkReturnOfAsset => {
                "acceptBulkReturnOfAsset(bytes,address[5],uint8,uint256[5],bytes)"
            }
        }
    }

    pub fn selector(&self, env: &Env) -> BytesN<4> {
        abi::selector(env, self.signature())
    }

    pub fn from_selector(env: &Env, selector: &BytesN<4>) -> Option<Self> {
        [
            BuiltinValidator::TargetAndSelector,
            BuiltinValidator::ReturnOfAsset,
            BuiltinValidator::BulkReturnOfAsset,
        ]
        .into_iter()
        .find(|v| v.selector(env) == *selector)
    }

    /// New cumulative fill, or `None` if the call is not accepted.
    pub fn validate(
        &self,
        env: &Env,
        extradata: &Bytes,
        ctx: &ValidatorContext,
        call_data: &Bytes,
    ) -> Option<u64> {
        if ctx.call_kind != CallKind::Call {
            return None;
        }
        let contract = abi::nth_word(extradata, 0)?;
        if digest::address_word(env, &ctx.target) != contract {
            return None;
        }

        match self {
            BuiltinValidator::TargetAndSelector => target_and_selector(extradata, ctx, call_data),
            BuiltinValidator::ReturnOfAsset => return_of_asset(env, ctx, call_data),
            BuiltinValidator::BulkReturnOfAsset => bulk_return_of_asset(env, ctx, call_data),
        }
    }
}

fn target_and_selector(extradata: &Bytes, ctx: &ValidatorContext, call_data: &Bytes) -> Option<u64> {
    let expected = abi::word_to_bytes4(&abi::nth_word(extradata, 1)?)?;
    let increment = abi::word_to_u32(&abi::nth_word(extradata, 2)?)?;
    if abi::call_selector(call_data)? != expected {
        return None;
    }
    ctx.current_fill.checked_add(increment as u64)
}

/// Checks the `(from, to)` head of a transfer-back call.
fn moves_back_to_beneficiary(env: &Env, ctx: &ValidatorContext, call_data: &Bytes) -> Option<()> {
    let from: Word = abi::arg_word(call_data, 0)?;
    let to: Word = abi::arg_word(call_data, 1)?;
    if from != digest::address_word(env, &ctx.counterparty)
        || to != digest::address_word(env, &ctx.beneficiary)
    {
        return None;
    }
    Some(())
}

fn return_of_asset(env: &Env, ctx: &ValidatorContext, call_data: &Bytes) -> Option<u64> {
    if abi::call_selector(call_data)? != abi::selector(env, TRANSFER_FROM).to_array() {
        return None;
    }
    if call_data.len() != abi::SELECTOR_LEN + 3 * abi::WORD {
        return None;
    }
    moves_back_to_beneficiary(env, ctx, call_data)?;
    ctx.current_fill.checked_sub(1)
}

fn bulk_return_of_asset(env: &Env, ctx: &ValidatorContext, call_data: &Bytes) -> Option<u64> {
    if abi::call_selector(call_data)? != abi::selector(env, TRANSFER_FROM_BULK).to_array() {
        return None;
    }
    moves_back_to_beneficiary(env, ctx, call_data)?;
    let (count, _) = abi::dynamic_array(call_data, 2)?;
    if count == 0 {
        return None;
    }
    ctx.current_fill.checked_sub(count as u64)
}
