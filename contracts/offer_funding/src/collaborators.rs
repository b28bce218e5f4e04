//! Interfaces of the external contracts the engine calls into.

use soroban_sdk::{contractclient, Address, Bytes, BytesN, Env};

use crate::types::{CallKind, ValidatorContext};

/// Per-maker delegated-call proxy. Executes `data` against `target` on behalf
/// of `maker` and reports whether the call succeeded.
#[contractclient(name = "ProxyRegistryClient")]
pub trait ProxyRegistry {
    fn execute(
        env: Env,
        maker: BytesN<20>,
        target: Address,
        call_kind: CallKind,
        data: Bytes,
    ) -> bool;
}

/// Third-party validator contract. Returns the new cumulative fill, or traps
/// to reject the call.
#[contractclient(name = "CallValidatorClient")]
pub trait CallValidator {
    fn validate(
        env: Env,
        selector: BytesN<4>,
        extradata: Bytes,
        context: ValidatorContext,
        call_data: Bytes,
    ) -> u64;
}
