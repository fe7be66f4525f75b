//! Read-only query surface
//!
//! Everything here is derived from the store and registry; no separately
//! maintained state.

use sarco_core::{Address, Result, SarcoId};

use crate::registry::ArchaeologistProfile;
use crate::state::ProtocolState;
use crate::store::{CursedArchaeologist, Sarcophagus};

/// Reputation counters for one archaeologist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchaeologistStatistics {
    /// Keys published inside the window
    pub successes: usize,
    /// Proven early leaks
    pub accusals: usize,
    /// Clean-sweep strikes
    pub cleanups: usize,
}

impl ProtocolState {
    /// Look up a session by id
    pub fn sarcophagus(&self, id: SarcoId) -> Result<&Sarcophagus> {
        self.store.get(id)
    }

    /// Sessions created by an embalmer
    pub fn sarcophagi_by_embalmer(&self, embalmer: Address) -> &[SarcoId] {
        self.store.ids_by_embalmer(embalmer)
    }

    /// Sessions addressed to a recipient
    pub fn sarcophagi_by_recipient(&self, recipient: Address) -> &[SarcoId] {
        self.store.ids_by_recipient(recipient)
    }

    /// Sessions an archaeologist is cursed on
    pub fn sarcophagi_by_archaeologist(&self, archaeologist: Address) -> &[SarcoId] {
        self.store.ids_by_archaeologist(archaeologist)
    }

    /// Curse record for one custodian on one session
    pub fn cursed_archaeologist(
        &self,
        id: SarcoId,
        archaeologist: Address,
    ) -> Result<&CursedArchaeologist> {
        self.store.get(id)?.cursed(archaeologist)
    }

    /// Registry profile of an archaeologist
    pub fn archaeologist_profile(&self, archaeologist: Address) -> Result<&ArchaeologistProfile> {
        self.registry.get(archaeologist)
    }

    /// Reputation counters of an archaeologist
    pub fn archaeologist_statistics(
        &self,
        archaeologist: Address,
    ) -> Result<ArchaeologistStatistics> {
        let profile = self.registry.get(archaeologist)?;
        Ok(ArchaeologistStatistics {
            successes: profile.successes.len(),
            accusals: profile.accusals.len(),
            cleanups: profile.cleanups.len(),
        })
    }
}
