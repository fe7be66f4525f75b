//! Sarco Core - Shared types, cryptographic primitives, and error taxonomy
//!
//! This crate provides the foundational types for the sarco time-locked
//! secret-escrow protocol: account addresses, session identifiers, key
//! material, signer recovery, protocol configuration, and the typed
//! rejection reasons surfaced by every engine operation.

pub mod config;
pub mod crypto;
pub mod error;
pub mod event;
pub mod types;

pub use config::ProtocolConfig;
pub use crypto::{
    accusal_message, curse_commitment_message, keccak256, sha256, EcdsaRecovery, PrivateKeyBytes,
    PublicKey, RecoverableSignature, SignerRecovery,
};
pub use error::{Error, Result};
pub use event::{ConfigParameter, ProtocolEvent};
pub use types::{Address, SarcoId, Timestamp};

/// Divisor for basis-point percentage parameters
pub const PERCENTAGE_DIVISOR: u128 = 10_000;

/// Default grace period after the resurrection deadline in seconds (1 hour)
pub const DEFAULT_GRACE_PERIOD: u64 = 3_600;

/// Default embalmer claim window after the grace period in seconds (1 week)
pub const DEFAULT_EMBALMER_CLAIM_WINDOW: u64 = 604_800;

/// Default validity of negotiated creation parameters in seconds (1 hour)
pub const DEFAULT_EXPIRATION_THRESHOLD: u64 = 3_600;

/// Default protocol fee in basis points of total digging fees (1%)
pub const DEFAULT_PROTOCOL_FEE_BASE_PERCENTAGE: u32 = 100;

/// Default cursed bond in basis points of the digging fee (100%)
pub const DEFAULT_CURSED_BOND_PERCENTAGE: u32 = 10_000;
