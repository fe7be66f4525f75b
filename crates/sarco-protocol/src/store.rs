//! Sarcophagus store
//!
//! Canonical mapping of session identifier to session state. The store
//! exclusively owns the per-custodian curse records and maintains the
//! lookup indexes the query surface reads; it never moves funds itself.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use sarco_core::{Address, Error, PrivateKeyBytes, PublicKey, Result, SarcoId, Timestamp};

/// Per-custodian obligation on one sarcophagus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursedArchaeologist {
    /// Committed key-share public key; its presence is the existence marker
    pub public_key: PublicKey,

    /// Key material released inside the publication window, if any
    pub private_key: Option<PrivateKeyBytes>,

    /// Proven to have leaked the share before the deadline
    pub is_accused: bool,

    /// Agreed per-second digging fee for this curse
    pub digging_fee_per_second: u128,

    /// Exact amount moved free -> locked when this curse was bonded;
    /// re-leveled on rewrap so release and slashing stay balanced
    pub cursed_bond_amount: u128,
}

impl CursedArchaeologist {
    /// Whether this custodian released their key
    pub fn has_published(&self) -> bool {
        self.private_key.is_some()
    }

    /// Fee accrued for the period `[previous_rewrap_time, resurrection_time]`
    pub fn accrued_digging_fee(
        &self,
        resurrection_time: Timestamp,
        previous_rewrap_time: Timestamp,
    ) -> u128 {
        self.digging_fee_per_second * resurrection_time.saturating_sub(previous_rewrap_time) as u128
    }
}

/// One escrow session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sarcophagus {
    /// Unique identifier, immutable once set
    pub id: SarcoId,

    /// Deadline after which custodians must publish; the sentinel
    /// [`Self::RESURRECTION_NEVER`] marks a buried session
    pub resurrection_time: Timestamp,

    /// At least `threshold` custodians were proven to have leaked
    pub is_compromised: bool,

    /// The post-grace-period sweep already ran
    pub is_cleaned: bool,

    /// Human-readable label
    pub name: String,

    /// Minimum number of leaked shares that compromises the secret
    pub threshold: u8,

    /// Longest deadline extension a single rewrap may set, in seconds
    pub maximum_rewrap_interval: u64,

    /// Off-chain locators for the encrypted payload and the share bundle
    pub payload_locators: [String; 2],

    /// Party that created and funds the session
    pub embalmer: Address,

    /// Party the secret is addressed to
    pub recipient: Address,

    /// Cursed custodians in selection order
    pub archaeologists: Vec<Address>,

    /// Curse records, keyed by custodian address
    pub cursed: HashMap<Address, CursedArchaeologist>,

    /// Accrual basis for digging fees; updated on every successful rewrap
    pub previous_rewrap_time: Timestamp,
}

impl Sarcophagus {
    /// Terminal deadline sentinel for buried sessions
    pub const RESURRECTION_NEVER: Timestamp = Timestamp::MAX;

    /// Whether the session was buried
    pub fn is_buried(&self) -> bool {
        self.resurrection_time == Self::RESURRECTION_NEVER
    }

    /// Get a curse record
    pub fn cursed(&self, archaeologist: Address) -> Result<&CursedArchaeologist> {
        self.cursed
            .get(&archaeologist)
            .ok_or(Error::ArchaeologistNotOnSarcophagus(archaeologist))
    }

    /// Get a mutable curse record
    pub fn cursed_mut(&mut self, archaeologist: Address) -> Result<&mut CursedArchaeologist> {
        self.cursed
            .get_mut(&archaeologist)
            .ok_or(Error::ArchaeologistNotOnSarcophagus(archaeologist))
    }

    /// Number of custodians currently marked accused
    pub fn accused_count(&self) -> usize {
        self.cursed.values().filter(|c| c.is_accused).count()
    }
}

/// Canonical session store with lookup indexes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SarcophagusStore {
    sarcophagi: HashMap<SarcoId, Sarcophagus>,
    by_embalmer: HashMap<Address, Vec<SarcoId>>,
    by_recipient: HashMap<Address, Vec<SarcoId>>,
    by_archaeologist: HashMap<Address, Vec<SarcoId>>,
    /// Committed key-share public key -> custodian address, across sessions
    public_key_index: HashMap<PublicKey, Address>,
}

impl SarcophagusStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a session exists
    pub fn contains(&self, id: SarcoId) -> bool {
        self.sarcophagi.contains_key(&id)
    }

    /// Get a session by id
    pub fn get(&self, id: SarcoId) -> Result<&Sarcophagus> {
        self.sarcophagi
            .get(&id)
            .ok_or(Error::SarcophagusDoesNotExist(id))
    }

    /// Get a mutable session by id
    pub fn get_mut(&mut self, id: SarcoId) -> Result<&mut Sarcophagus> {
        self.sarcophagi
            .get_mut(&id)
            .ok_or(Error::SarcophagusDoesNotExist(id))
    }

    /// Whether a key-share commitment is already bound to a curse
    pub fn is_public_key_committed(&self, public_key: &PublicKey) -> bool {
        self.public_key_index.contains_key(public_key)
    }

    /// Resolve a committed key-share public key to its custodian
    pub fn archaeologist_for_public_key(&self, public_key: &PublicKey) -> Option<Address> {
        self.public_key_index.get(public_key).copied()
    }

    /// Insert a freshly created session and maintain every index
    pub fn insert(&mut self, sarcophagus: Sarcophagus) -> Result<()> {
        let id = sarcophagus.id;
        if self.sarcophagi.contains_key(&id) {
            return Err(Error::SarcophagusAlreadyExists(id));
        }
        self.by_embalmer
            .entry(sarcophagus.embalmer)
            .or_default()
            .push(id);
        self.by_recipient
            .entry(sarcophagus.recipient)
            .or_default()
            .push(id);
        for (address, record) in &sarcophagus.cursed {
            self.by_archaeologist.entry(*address).or_default().push(id);
            self.public_key_index.insert(record.public_key, *address);
        }
        self.sarcophagi.insert(id, sarcophagus);
        Ok(())
    }

    /// Session ids created by an embalmer
    pub fn ids_by_embalmer(&self, embalmer: Address) -> &[SarcoId] {
        self.by_embalmer
            .get(&embalmer)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Session ids addressed to a recipient
    pub fn ids_by_recipient(&self, recipient: Address) -> &[SarcoId] {
        self.by_recipient
            .get(&recipient)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Session ids an archaeologist is cursed on
    pub fn ids_by_archaeologist(&self, archaeologist: Address) -> &[SarcoId] {
        self.by_archaeologist
            .get(&archaeologist)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of stored sessions
    pub fn len(&self) -> usize {
        self.sarcophagi.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.sarcophagi.is_empty()
    }
}
