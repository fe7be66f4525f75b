//! Error types for the sarco protocol
//!
//! Every failure is a rejected transition: the attempted operation has zero
//! effect and one of these typed reasons is surfaced to the caller. There
//! is no crash/fatal category.

use thiserror::Error;

use crate::types::{Address, SarcoId};

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Typed rejection reasons surfaced by every engine operation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // --- not-found ---
    /// No sarcophagus with this identifier
    #[error("sarcophagus does not exist: {0}")]
    SarcophagusDoesNotExist(SarcoId),

    /// Archaeologist has no registry profile
    #[error("archaeologist not registered: {0}")]
    ArchaeologistNotRegistered(Address),

    /// Address is not cursed on this sarcophagus
    #[error("archaeologist not cursed on this sarcophagus: {0}")]
    ArchaeologistNotOnSarcophagus(Address),

    // --- precondition ---
    /// Identifier already in use
    #[error("sarcophagus already exists: {0}")]
    SarcophagusAlreadyExists(SarcoId),

    /// Session is compromised; no further transitions permitted
    #[error("sarcophagus is compromised: {0}")]
    SarcophagusCompromised(SarcoId),

    /// Session was buried; no further transitions permitted
    #[error("sarcophagus is buried: {0}")]
    SarcophagusInactive(SarcoId),

    /// Clean already ran for this session
    #[error("sarcophagus already cleaned: {0}")]
    SarcophagusAlreadyCleaned(SarcoId),

    /// Registry profile already exists
    #[error("archaeologist already registered: {0}")]
    ArchaeologistAlreadyRegistered(Address),

    /// Custodian already released their key for this session
    #[error("private key already published for this curse")]
    PrivateKeyAlreadyPublished,

    /// Accused custodians may not publish
    #[error("archaeologist has been accused on this sarcophagus")]
    ArchaeologistHasBeenAccused,

    // --- timing ---
    /// The off-chain negotiation is stale
    #[error(
        "negotiated parameters expired: agreed at {agreed_creation_time}, \
         valid for {expiration_threshold}s"
    )]
    SarcophagusParametersExpired {
        agreed_creation_time: u64,
        expiration_threshold: u64,
    },

    /// Proposed resurrection time is not strictly in the future
    #[error("resurrection time {resurrection_time} is not in the future")]
    ResurrectionTimeInPast { resurrection_time: u64 },

    /// Proposed resurrection time exceeds the maximum rewrap interval
    #[error("resurrection time {resurrection_time} exceeds limit {limit}")]
    ResurrectionTimeTooFarInFuture { resurrection_time: u64, limit: u64 },

    /// Current deadline has already passed; the session can no longer be
    /// renewed, buried, or accused
    #[error("sarcophagus deadline {resurrection_time} has already passed")]
    SarcophagusExpired { resurrection_time: u64 },

    /// Publication window has not opened yet
    #[error("too early to publish: window opens at {window_start}")]
    TooEarlyForPublish { window_start: u64 },

    /// Publication window has closed
    #[error("too late to publish: window closed at {window_end}")]
    TooLateForPublish { window_end: u64 },

    /// Grace period has not elapsed yet
    #[error("too early to clean: allowed after {earliest}")]
    TooEarlyForClean { earliest: u64 },

    /// Embalmer claim window has closed; only the admin may clean now
    #[error("embalmer claim window closed at {window_end}")]
    TooLateForEmbalmerClean { window_end: u64 },

    /// Admin may clean only once the embalmer claim window has closed
    #[error("admin clean opens after the embalmer claim window closes at {window_end}")]
    TooEarlyForAdminClean { window_end: u64 },

    // --- authorization ---
    /// Caller is not the embalmer of this sarcophagus
    #[error("caller is not the embalmer of this sarcophagus")]
    SenderNotEmbalmer,

    /// Caller is neither the embalmer nor the admin
    #[error("caller is neither the embalmer nor the admin")]
    SenderNotEmbalmerOrAdmin,

    /// Caller is not the protocol admin
    #[error("caller is not the protocol admin")]
    CallerIsNotAdmin,

    // --- validation ---
    /// Creation requires at least one custodian
    #[error("no archaeologists provided")]
    NoArchaeologistsProvided,

    /// Threshold must satisfy 0 < k <= custodian count
    #[error("invalid threshold {threshold} for {archaeologist_count} archaeologists")]
    InvalidThreshold {
        threshold: u8,
        archaeologist_count: usize,
    },

    /// Same archaeologist selected more than once
    #[error("archaeologist selected more than once: {0}")]
    DuplicateArchaeologist(Address),

    /// Key-share commitment already bound to another curse
    #[error("public key already committed to another curse")]
    DuplicatePublicKey,

    /// Signature bytes are malformed or unrecoverable
    #[error("malformed or unrecoverable signature: {0}")]
    InvalidSignature(String),

    /// Curse signature recovered to an unexpected signer
    #[error("curse signature recovered {recovered}, expected {expected}")]
    SignerMismatch { expected: Address, recovered: Address },

    /// Accusal signature does not verify against the supplied public key
    #[error("accusal signature does not match the supplied public key")]
    InvalidAccusalSignature,

    /// Accusal arrays must be of equal length
    #[error("{public_keys} public keys but {signatures} signatures")]
    SignatureCountMismatch {
        public_keys: usize,
        signatures: usize,
    },

    /// Supplied private key does not derive the committed public key
    #[error("private key does not derive the committed public key")]
    IncorrectPrivateKey,

    /// Malformed key material
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    /// Offered fee is below the archaeologist's published minimum
    #[error("digging fee {offered} below archaeologist minimum {minimum}")]
    DiggingFeeBelowMinimum { offered: u128, minimum: u128 },

    /// Requested interval exceeds the archaeologist's published maximum
    #[error("rewrap interval {requested} exceeds archaeologist maximum {maximum}")]
    RewrapIntervalTooLong { requested: u64, maximum: u64 },

    // --- insufficient-funds ---
    /// Free bond cannot cover the requested lock or withdrawal
    #[error("insufficient free bond: required {required}, available {available}")]
    InsufficientFreeBond { required: u128, available: u128 },

    /// Locked bond cannot cover the requested release or slash
    #[error("insufficient locked bond: required {required}, available {available}")]
    InsufficientLockedBond { required: u128, available: u128 },

    /// Protocol fee pool cannot cover the requested withdrawal
    #[error("insufficient protocol fees: requested {requested}, available {available}")]
    InsufficientProtocolFees { requested: u128, available: u128 },

    /// The external balance service rejected a transfer
    #[error("token transfer failed: {0}")]
    TransferFailed(String),
}
