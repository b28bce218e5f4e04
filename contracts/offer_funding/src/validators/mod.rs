//! # Call validator registry
//!
//! Decides whether a side-effect call is authorized under a maker-chosen
//! [`ValidatorSpec`] and reports the new cumulative fill the call represents.
//!
//! Resolution is by `(target, selector)`:
//!
//! | Target                  | Resolved to                                       |
//! |-------------------------|---------------------------------------------------|
//! | `None`                  | disabled: accept, fill unchanged                  |
//! | this contract           | a [`BuiltinValidator`] keyed by selector          |
//! | any other contract      | an external [`CallValidator`] contract            |
//!
//! An unknown built-in selector fails with `UnknownValidator`; any rejection
//! fails with `ValidatorRejected`.
//!
//! [`CallValidator`]: crate::collaborators::CallValidator

pub mod abi;
mod builtin;

use soroban_sdk::{log, Address, Env};

use crate::collaborators::CallValidatorClient;
use crate::types::{BuiltinValidator, SideEffectCall, ValidatorContext, ValidatorSpec};
use crate::Error;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Resolved {
    Disabled,
    Builtin(BuiltinValidator),
    External(Address),
}

pub fn resolve(env: &Env, spec: &ValidatorSpec) -> Result<Resolved, Error> {
    match &spec.target {
        None => Ok(Resolved::Disabled),
        Some(target) if *target == env.current_contract_address() => {
            BuiltinValidator::from_selector(env, &spec.selector)
                .map(Resolved::Builtin)
                .ok_or(Error::UnknownValidator)
        }
        Some(target) => Ok(Resolved::External(target.clone())),
    }
}

/// Evaluates `call` under `spec`, returning the new cumulative fill.
pub fn evaluate(
    env: &Env,
    spec: &ValidatorSpec,
    ctx: &ValidatorContext,
    call: &SideEffectCall,
) -> Result<u64, Error> {
    let outcome = match resolve(env, spec)? {
        Resolved::Disabled => Some(ctx.current_fill),
        Resolved::Builtin(validator) => validator.validate(env, &spec.extradata, ctx, &call.data),
        Resolved::External(address) => {
            let client = CallValidatorClient::new(env, &address);
            match client.try_validate(&spec.selector, &spec.extradata, ctx, &call.data) {
                Ok(Ok(fill)) => Some(fill),
                _ => None,
            }
        }
    };

    outcome.ok_or_else(|| {
        log!(env, "validator rejected call", call.target.clone());
        Error::ValidatorRejected
    })
}
