//! # Offer digest
//!
//! Canonical, domain-separated hashing of offers, shaped after typed
//! structured-data signing:
//!
//! ```text
//! digest          = keccak256(0x19 ‖ 0x01 ‖ domainSeparator ‖ hashStruct(offer))
//! hashStruct(s)   = keccak256(typeHash(s) ‖ word(field₀) ‖ … ‖ word(fieldₙ))
//! domainSeparator = hashStruct(OfferFundingDomain{name, version, networkId, verifyingContract})
//! ```
//!
//! Every field is encoded as one 32-byte word:
//!
//! | Field type            | Word                                   |
//! |-----------------------|----------------------------------------|
//! | `Address`             | `keccak256(xdr(address))`              |
//! | `Option<Address>`     | as above, or 32 zero bytes for `None`  |
//! | `BytesN<20>`          | left-padded with zeros                 |
//! | `BytesN<4>`           | right-padded with zeros                |
//! | `Bytes`               | `keccak256(contents)`                  |
//! | unsigned integers     | big-endian, left-padded                |
//! | `i128`                | big-endian two's complement, sign-extended |
//!
//! The same address word is used by the built-in validators to match
//! addresses embedded in call data.

use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env};

use crate::types::{FundingOptions, Offer, SigningDomain, ValidatorSpec};

pub type Word = [u8; 32];

const FUNDING_OPTIONS_TYPE: &str = "FundingOptions(uint32 upfrontPaymentBps,uint64 cliffPeriodSecs,uint32 cliffPaymentBps,uint64 vestingPeriodSecs,uint32 vestingRatioPpm,uint64 bondingSupply,int128 bondingReserveBalance,uint32 bondingReserveWeightPpm)";

const OFFER_TYPE: &str = "Offer(address beneficiary,bytes20 maker,FundingOptions fundingOptions,address registry,address contributionValidatorTarget,bytes4 contributionValidatorSelector,bytes contributionValidatorExtradata,address cancellationValidatorTarget,bytes4 cancellationValidatorSelector,bytes cancellationValidatorExtradata,uint64 maximumFill,uint64 listingTime,uint64 expirationTime,uint64 salt)";

const DOMAIN_TYPE: &str =
    "OfferFundingDomain(string name,string version,bytes32 networkId,address verifyingContract)";

pub fn keccak(env: &Env, data: &Bytes) -> Word {
    env.crypto().keccak256(data).to_array()
}

fn keccak_str(env: &Env, s: &str) -> Word {
    keccak(env, &Bytes::from_slice(env, s.as_bytes()))
}

pub fn uint_word(value: u128) -> Word {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

pub fn int_word(value: i128) -> Word {
    let fill = if value < 0 { 0xff } else { 0x00 };
    let mut word = [fill; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

pub fn address_word(env: &Env, address: &Address) -> Word {
    keccak(env, &address.clone().to_xdr(env))
}

fn optional_address_word(env: &Env, address: &Option<Address>) -> Word {
    match address {
        Some(a) => address_word(env, a),
        None => [0u8; 32],
    }
}

fn maker_word(maker: &BytesN<20>) -> Word {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(&maker.to_array());
    word
}

fn selector_word(selector: &BytesN<4>) -> Word {
    let mut word = [0u8; 32];
    word[..4].copy_from_slice(&selector.to_array());
    word
}

/// Accumulates 32-byte words for a single struct hash.
struct Encoder<'a> {
    env: &'a Env,
    buf: Bytes,
}

impl<'a> Encoder<'a> {
    fn new(env: &'a Env, type_hash: Word) -> Self {
        let mut buf = Bytes::new(env);
        buf.extend_from_array(&type_hash);
        Encoder { env, buf }
    }

    fn word(mut self, word: Word) -> Self {
        self.buf.extend_from_array(&word);
        self
    }

    fn validator(self, spec: &ValidatorSpec) -> Self {
        let target = optional_address_word(self.env, &spec.target);
        let extradata = keccak(self.env, &spec.extradata);
        self.word(target)
            .word(selector_word(&spec.selector))
            .word(extradata)
    }

    fn finish(self) -> Word {
        keccak(self.env, &self.buf)
    }
}

pub fn hash_funding_options(env: &Env, options: &FundingOptions) -> Word {
    Encoder::new(env, keccak_str(env, FUNDING_OPTIONS_TYPE))
        .word(uint_word(options.upfront_payment_bps as u128))
        .word(uint_word(options.cliff_period_secs as u128))
        .word(uint_word(options.cliff_payment_bps as u128))
        .word(uint_word(options.vesting_period_secs as u128))
        .word(uint_word(options.vesting_ratio_ppm as u128))
        .word(uint_word(options.bonding_supply as u128))
        .word(int_word(options.bonding_reserve_balance))
        .word(uint_word(options.bonding_reserve_weight_ppm as u128))
        .finish()
}

/// Type hash of `Offer`; the referenced `FundingOptions` type is appended.
fn offer_type_hash(env: &Env) -> Word {
    let mut encoded = Bytes::from_slice(env, OFFER_TYPE.as_bytes());
    encoded.extend_from_slice(FUNDING_OPTIONS_TYPE.as_bytes());
    keccak(env, &encoded)
}

pub fn hash_offer_struct(env: &Env, offer: &Offer) -> Word {
    Encoder::new(env, offer_type_hash(env))
        .word(address_word(env, &offer.beneficiary))
        .word(maker_word(&offer.maker))
        .word(hash_funding_options(env, &offer.funding_options))
        .word(address_word(env, &offer.registry))
        .validator(&offer.contribution_validator)
        .validator(&offer.cancellation_validator)
        .word(uint_word(offer.maximum_fill as u128))
        .word(uint_word(offer.listing_time as u128))
        .word(uint_word(offer.expiration_time as u128))
        .word(uint_word(offer.salt as u128))
        .finish()
}

/// Separator binding digests to this network and this contract instance.
pub fn domain_separator(env: &Env, domain: &SigningDomain) -> Word {
    Encoder::new(env, keccak_str(env, DOMAIN_TYPE))
        .word(keccak(env, &domain.name))
        .word(keccak(env, &domain.version))
        .word(env.ledger().network_id().to_array())
        .word(address_word(env, &env.current_contract_address()))
        .finish()
}

/// The digest a maker signs; also the on-chain identity of the offer.
pub fn offer_digest(env: &Env, domain: &SigningDomain, offer: &Offer) -> BytesN<32> {
    let mut buf = Bytes::from_array(env, &[0x19, 0x01]);
    buf.extend_from_array(&domain_separator(env, domain));
    buf.extend_from_array(&hash_offer_struct(env, offer));
    BytesN::from_array(env, &keccak(env, &buf))
}
