//! Protocol state and the bonding ledger
//!
//! [`ProtocolState`] is the single serializable snapshot of everything the
//! engines mutate: registry, store, reward balances, fee pool, config, and
//! the event log. [`Protocol`] wraps it together with the two external
//! seams (token ledger, signer recovery) and hosts every engine operation.
//!
//! Execution is single-threaded and atomic per call: operations validate
//! fully before the first write, and any external token call happens only
//! after all local state reached its post-condition. A rejected transfer
//! restores the pre-call snapshot, so a failed transition has zero
//! observable effect.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use sarco_core::{
    Address, Error, ProtocolConfig, ProtocolEvent, Result, SarcoId, SignerRecovery,
};

use crate::registry::ArchaeologistRegistry;
use crate::store::{Sarcophagus, SarcophagusStore};
use crate::token::TokenLedger;

/// Serializable snapshot of all protocol-owned state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolState {
    /// Account holding escrowed fees and bonded collateral
    pub escrow_address: Address,

    /// Admin with authority over config and the fee pool
    pub admin: Address,

    /// Tunable parameters
    pub config: ProtocolConfig,

    /// Archaeologist profiles and collateral
    pub registry: ArchaeologistRegistry,

    /// Escrow sessions and curse records
    pub store: SarcophagusStore,

    /// Accrued digging-fee rewards awaiting withdrawal
    pub rewards: HashMap<Address, u128>,

    /// Accumulated protocol fees awaiting admin withdrawal
    pub protocol_fee_pool: u128,

    /// Ordered audit trail; drained by off-chain indexers
    pub events: Vec<ProtocolEvent>,
}

impl ProtocolState {
    /// Create fresh state with the given escrow identity, admin, and config
    pub fn new(escrow_address: Address, admin: Address, config: ProtocolConfig) -> Self {
        Self {
            escrow_address,
            admin,
            config,
            registry: ArchaeologistRegistry::new(),
            store: SarcophagusStore::new(),
            rewards: HashMap::new(),
            protocol_fee_pool: 0,
            events: Vec::new(),
        }
    }

    /// Append an audit record
    pub(crate) fn emit(&mut self, event: ProtocolEvent) {
        debug!(?event, "event emitted");
        self.events.push(event);
    }

    /// Credit an archaeologist's reward balance
    pub(crate) fn accrue_reward(&mut self, archaeologist: Address, amount: u128) {
        if amount > 0 {
            *self.rewards.entry(archaeologist).or_insert(0) += amount;
        }
    }

    /// Reward balance awaiting withdrawal
    pub fn reward_balance(&self, archaeologist: Address) -> u128 {
        self.rewards.get(&archaeologist).copied().unwrap_or(0)
    }

    /// Fetch a session that is neither compromised nor buried
    pub(crate) fn active_sarcophagus(&self, id: SarcoId) -> Result<&Sarcophagus> {
        let sarcophagus = self.store.get(id)?;
        if sarcophagus.is_compromised {
            return Err(Error::SarcophagusCompromised(id));
        }
        if sarcophagus.is_buried() {
            return Err(Error::SarcophagusInactive(id));
        }
        Ok(sarcophagus)
    }

    // --- bonding ledger -------------------------------------------------
    //
    // Collateral moves only through these three operations, each atomic
    // with respect to a single call.

    /// Lock the recorded cursed bond of one curse out of free bond
    pub(crate) fn curse_archaeologist(
        &mut self,
        sarco_id: SarcoId,
        archaeologist: Address,
    ) -> Result<()> {
        let amount = self
            .store
            .get(sarco_id)?
            .cursed(archaeologist)?
            .cursed_bond_amount;
        self.registry.get_mut(archaeologist)?.lock_bond(amount)
    }

    /// Release the recorded cursed bond of one curse back to free bond
    pub(crate) fn free_archaeologist(
        &mut self,
        sarco_id: SarcoId,
        archaeologist: Address,
    ) -> Result<()> {
        let amount = self
            .store
            .get(sarco_id)?
            .cursed(archaeologist)?
            .cursed_bond_amount;
        self.registry.get_mut(archaeologist)?.unlock_bond(amount)
    }

    /// Forfeit `amount` of an archaeologist's locked bond
    pub(crate) fn decrease_locked_bond(
        &mut self,
        archaeologist: Address,
        amount: u128,
    ) -> Result<()> {
        self.registry.get_mut(archaeologist)?.slash_bond(amount)
    }
}

/// The protocol state machine: state plus its two external seams
pub struct Protocol<T: TokenLedger, R: SignerRecovery> {
    /// All protocol-owned state
    pub state: ProtocolState,

    /// External balance service
    pub token: T,

    /// Signer recovery implementation
    pub recovery: R,
}

impl<T: TokenLedger, R: SignerRecovery> Protocol<T, R> {
    /// Create a protocol instance over fresh state
    pub fn new(escrow_address: Address, admin: Address, config: ProtocolConfig, token: T, recovery: R) -> Self {
        Self {
            state: ProtocolState::new(escrow_address, admin, config),
            token,
            recovery,
        }
    }

    /// Drain the audit trail for indexing
    pub fn drain_events(&mut self) -> Vec<ProtocolEvent> {
        std::mem::take(&mut self.state.events)
    }

    /// Transfer out of escrow, restoring `snapshot` on failure
    ///
    /// Invariant: local state must already be at its post-condition when
    /// this is called; a rejected transfer rolls the whole transition back.
    pub(crate) fn transfer_or_rollback(
        &mut self,
        snapshot: ProtocolState,
        to: Address,
        amount: u128,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        if let Err(e) = self.token.transfer(to, amount) {
            self.state = snapshot;
            return Err(Error::TransferFailed(e.to_string()));
        }
        Ok(())
    }

    /// Collect from an external account into escrow, restoring `snapshot`
    /// on failure
    pub(crate) fn collect_or_rollback(
        &mut self,
        snapshot: ProtocolState,
        from: Address,
        amount: u128,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let escrow = self.state.escrow_address;
        if let Err(e) = self.token.transfer_from(from, escrow, amount) {
            self.state = snapshot;
            return Err(Error::TransferFailed(e.to_string()));
        }
        Ok(())
    }
}
