//! Archaeologist registry
//!
//! Tracks every archaeologist's public profile (the terms they will accept
//! a curse under), their free/locked collateral, and their reputation
//! history. Collateral only ever moves through the checked operations here;
//! nothing else writes bond fields.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use sarco_core::{Address, Error, Result, SarcoId};

/// Public profile and collateral position of one archaeologist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchaeologistProfile {
    /// Off-chain network identity for key-share transport
    pub peer_id: String,

    /// Lowest per-second digging fee this archaeologist accepts
    pub minimum_digging_fee_per_second: u128,

    /// Longest rewrap interval this archaeologist accepts, in seconds
    pub maximum_rewrap_interval: u64,

    /// Collateral available for new curses or withdrawal
    pub free_bond: u128,

    /// Collateral locked behind active curses, at risk of slashing
    pub cursed_bond: u128,

    /// Sessions where the key was published inside the window
    pub successes: Vec<SarcoId>,

    /// Sessions where this archaeologist was proven to have leaked early
    pub accusals: Vec<SarcoId>,

    /// Sessions swept by clean with this archaeologist in default
    pub cleanups: Vec<SarcoId>,
}

impl ArchaeologistProfile {
    /// Create a fresh profile with no bond
    pub fn new(
        peer_id: String,
        minimum_digging_fee_per_second: u128,
        maximum_rewrap_interval: u64,
    ) -> Self {
        Self {
            peer_id,
            minimum_digging_fee_per_second,
            maximum_rewrap_interval,
            free_bond: 0,
            cursed_bond: 0,
            successes: Vec::new(),
            accusals: Vec::new(),
            cleanups: Vec::new(),
        }
    }

    /// Move `amount` from free to locked bond
    pub fn lock_bond(&mut self, amount: u128) -> Result<()> {
        if self.free_bond < amount {
            return Err(Error::InsufficientFreeBond {
                required: amount,
                available: self.free_bond,
            });
        }
        self.free_bond -= amount;
        self.cursed_bond += amount;
        Ok(())
    }

    /// Move `amount` from locked back to free bond
    pub fn unlock_bond(&mut self, amount: u128) -> Result<()> {
        if self.cursed_bond < amount {
            return Err(Error::InsufficientLockedBond {
                required: amount,
                available: self.cursed_bond,
            });
        }
        self.cursed_bond -= amount;
        self.free_bond += amount;
        Ok(())
    }

    /// Destroy `amount` of locked bond (forfeited collateral)
    pub fn slash_bond(&mut self, amount: u128) -> Result<()> {
        if self.cursed_bond < amount {
            return Err(Error::InsufficientLockedBond {
                required: amount,
                available: self.cursed_bond,
            });
        }
        self.cursed_bond -= amount;
        Ok(())
    }
}

/// Registry of all archaeologist profiles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchaeologistRegistry {
    profiles: HashMap<Address, ArchaeologistProfile>,
}

impl ArchaeologistRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an archaeologist is registered
    pub fn contains(&self, archaeologist: Address) -> bool {
        self.profiles.contains_key(&archaeologist)
    }

    /// Register a new profile
    pub fn register(
        &mut self,
        archaeologist: Address,
        profile: ArchaeologistProfile,
    ) -> Result<()> {
        if self.profiles.contains_key(&archaeologist) {
            return Err(Error::ArchaeologistAlreadyRegistered(archaeologist));
        }
        self.profiles.insert(archaeologist, profile);
        Ok(())
    }

    /// Get a profile by address
    pub fn get(&self, archaeologist: Address) -> Result<&ArchaeologistProfile> {
        self.profiles
            .get(&archaeologist)
            .ok_or(Error::ArchaeologistNotRegistered(archaeologist))
    }

    /// Get a mutable profile by address
    pub fn get_mut(&mut self, archaeologist: Address) -> Result<&mut ArchaeologistProfile> {
        self.profiles
            .get_mut(&archaeologist)
            .ok_or(Error::ArchaeologistNotRegistered(archaeologist))
    }

    /// Iterate all registered addresses
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.profiles.keys().copied()
    }

    /// Number of registered archaeologists
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
