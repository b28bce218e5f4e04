//! # Types
//!
//! Shared data structures used across all modules of the offer funding engine.
//!
//! ## Design decisions
//!
//! ### Offers are never stored
//!
//! An [`Offer`] lives off-chain as a signed message. On-chain the engine keeps
//! only a fill counter and a contribution list keyed by the offer digest.
//!
//! ### Config / State split
//!
//! A `Contribution` is internally stored as two separate ledger entries:
//!
//! - [`ContributionTerms`]: written once at funding time; never mutated.
//! - [`ContributionState`]: written on every release and on cancellation.
//!
//! The public API exposes the reconstructed [`Contribution`] struct.
//!
//! ### Contribution lifecycle
//!
//! ```text
//! Escrowed ──► PartiallyReleased ──► FullyReleased
//!     │               │
//!     └───────────────┴──► Cancelled (terminal)
//! ```
//!
//! Release only moves `released_so_far` forward; cancellation freezes it.

use soroban_sdk::{contracttype, Address, Bytes, BytesN};

/// Vesting and bonding-curve parameters embedded in an offer.
///
/// Payment shares are basis points (`10_000` = 100 %). The vesting ratio and
/// the reserve weight are parts per million (`1_000_000` = 100 %).
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundingOptions {
    pub upfront_payment_bps: u32,
    pub cliff_period_secs: u64,
    pub cliff_payment_bps: u32,
    pub vesting_period_secs: u64,
    pub vesting_ratio_ppm: u32,
    pub bonding_supply: u64,
    pub bonding_reserve_balance: i128,
    pub bonding_reserve_weight_ppm: u32,
}

/// A validator chosen by the maker: where it lives, which capability, and
/// the constraint payload it is evaluated against.
///
/// `target == None` disables the validator.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidatorSpec {
    pub target: Option<Address>,
    pub selector: BytesN<4>,
    pub extradata: Bytes,
}

/// A maker-signed description of a fundable action.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Offer {
    /// Receives the vested proceeds.
    pub beneficiary: Address,
    /// 20-byte secp256k1 signer address of the maker.
    pub maker: BytesN<20>,
    pub funding_options: FundingOptions,
    /// Proxy registry that executes side-effect calls on behalf of the maker.
    pub registry: Address,
    pub contribution_validator: ValidatorSpec,
    pub cancellation_validator: ValidatorSpec,
    /// Upper bound on cumulative fill units.
    pub maximum_fill: u64,
    pub listing_time: u64,
    pub expiration_time: u64,
    pub salt: u64,
}

/// How the proxy registry should invoke the side-effect target.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CallKind {
    Call,
    DelegateCall,
}

/// A side-effect call the taker asks the maker's proxy to perform.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SideEffectCall {
    pub target: Address,
    pub call_kind: CallKind,
    pub data: Bytes,
}

/// Positional context handed to every validator.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidatorContext {
    pub beneficiary: Address,
    pub registry: Address,
    pub maker: BytesN<20>,
    /// Target of the proposed call.
    pub target: Address,
    /// The taker submitting the call.
    pub counterparty: Address,
    pub call_kind: CallKind,
    pub value: i128,
    pub maximum_fill: u64,
    pub listing_time: u64,
    pub expiration_time: u64,
    pub current_fill: u64,
}

/// Built-in validator capabilities, addressed at the funding contract itself.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuiltinValidator {
    /// Call must hit a fixed contract and selector; adds a fixed increment.
    TargetAndSelector,
    /// Call must move one asset back from the counterparty; removes one fill.
    ReturnOfAsset,
    /// Call must move a batch of assets back; removes one fill per id.
    BulkReturnOfAsset,
}

/// Vesting parameters copied from the offer into each contribution.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingTerms {
    pub upfront_payment_bps: u32,
    pub cliff_period_secs: u64,
    pub cliff_payment_bps: u32,
    pub vesting_period_secs: u64,
    pub vesting_ratio_ppm: u32,
}

impl From<&FundingOptions> for VestingTerms {
    fn from(options: &FundingOptions) -> Self {
        VestingTerms {
            upfront_payment_bps: options.upfront_payment_bps,
            cliff_period_secs: options.cliff_period_secs,
            cliff_payment_bps: options.cliff_payment_bps,
            vesting_period_secs: options.vesting_period_secs,
            vesting_ratio_ppm: options.vesting_ratio_ppm,
        }
    }
}

/// Immutable contribution data, written once when a fill is accepted.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionTerms {
    pub id: u64,
    pub offer_hash: BytesN<32>,
    /// Position of this contribution within its offer.
    pub sequence: u32,
    pub beneficiary: Address,
    pub contributor: Address,
    /// Fill units this contribution bought.
    pub fill_units: u64,
    /// Escrowed amount, including any additional collateral.
    pub amount_principal: i128,
    pub timestamp: u64,
    pub vesting: VestingTerms,
}

/// Mutable contribution data.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionState {
    pub released_so_far: i128,
    pub cancelled: bool,
}

/// Full view of an escrowed contribution, reconstructed from storage.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Contribution {
    pub id: u64,
    pub offer_hash: BytesN<32>,
    pub sequence: u32,
    pub beneficiary: Address,
    pub contributor: Address,
    pub fill_units: u64,
    pub amount_principal: i128,
    pub timestamp: u64,
    pub vesting: VestingTerms,
    pub released_so_far: i128,
    pub cancelled: bool,
}

/// Contract-wide settings fixed at `init` and adjustable by the admin.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundingConfig {
    pub admin: Address,
    /// Token contract used as the funding currency.
    pub payment_token: Address,
    pub treasury: Address,
    pub protocol_fee_bps: u32,
}

/// Reward token minted to beneficiaries as escrowed principal reaches them.
///
/// The funding contract must be the admin of `token`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardConfig {
    pub token: Address,
    /// Reward units per payment unit, in parts per million.
    pub rate_ppm: u64,
}

/// Verifying-domain identity bound into every offer digest.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SigningDomain {
    pub name: Bytes,
    pub version: Bytes,
}

/// Quote returned by `get_offer_funding_cost`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundingCost {
    /// Total charged to the taker.
    pub funding_cost: i128,
    /// Share routed to the treasury.
    pub protocol_fee: i128,
    /// Share escrowed for the beneficiary.
    pub principal: i128,
}
