//! Archaeologist-facing operations
//!
//! Registration and profile upkeep, free-bond deposits and withdrawals,
//! reward withdrawal, and the deadline-gated key publication.

use serde::{Deserialize, Serialize};
use tracing::info;

use sarco_core::{
    Address, Error, PrivateKeyBytes, ProtocolEvent, Result, SarcoId, SignerRecovery, Timestamp,
};

use crate::registry::ArchaeologistProfile;
use crate::state::Protocol;
use crate::token::TokenLedger;

/// Public profile terms an archaeologist registers or updates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileTerms {
    /// Off-chain network identity for key-share transport
    pub peer_id: String,

    /// Lowest per-second digging fee accepted
    pub minimum_digging_fee_per_second: u128,

    /// Longest rewrap interval accepted, in seconds
    pub maximum_rewrap_interval: u64,
}

impl<T: TokenLedger, R: SignerRecovery> Protocol<T, R> {
    /// Register a new archaeologist profile, optionally seeding free bond
    pub fn register_archaeologist(
        &mut self,
        caller: Address,
        terms: ProfileTerms,
        free_bond_deposit: u128,
    ) -> Result<()> {
        if self.state.registry.contains(caller) {
            return Err(Error::ArchaeologistAlreadyRegistered(caller));
        }

        let snapshot = self.state.clone();

        let mut profile = ArchaeologistProfile::new(
            terms.peer_id,
            terms.minimum_digging_fee_per_second,
            terms.maximum_rewrap_interval,
        );
        profile.free_bond = free_bond_deposit;
        self.state.registry.register(caller, profile)?;
        self.state.emit(ProtocolEvent::ArchaeologistRegistered {
            archaeologist: caller,
            free_bond_deposited: free_bond_deposit,
        });

        self.collect_or_rollback(snapshot, caller, free_bond_deposit)?;

        info!(archaeologist = %caller, free_bond_deposit, "archaeologist registered");
        Ok(())
    }

    /// Update the public terms of an existing profile
    pub fn update_archaeologist(&mut self, caller: Address, terms: ProfileTerms) -> Result<()> {
        let profile = self.state.registry.get_mut(caller)?;
        profile.peer_id = terms.peer_id;
        profile.minimum_digging_fee_per_second = terms.minimum_digging_fee_per_second;
        profile.maximum_rewrap_interval = terms.maximum_rewrap_interval;
        self.state.emit(ProtocolEvent::ArchaeologistUpdated {
            archaeologist: caller,
        });
        Ok(())
    }

    /// Deposit collateral into free bond
    pub fn deposit_free_bond(&mut self, caller: Address, amount: u128) -> Result<()> {
        self.state.registry.get(caller)?;

        let snapshot = self.state.clone();
        self.state.registry.get_mut(caller)?.free_bond += amount;
        self.state.emit(ProtocolEvent::FreeBondDeposited {
            archaeologist: caller,
            amount,
        });

        self.collect_or_rollback(snapshot, caller, amount)?;

        info!(archaeologist = %caller, amount, "free bond deposited");
        Ok(())
    }

    /// Withdraw collateral from free bond
    ///
    /// Locked bond can never be withdrawn directly; it only returns to free
    /// bond through the bonding ledger.
    pub fn withdraw_free_bond(&mut self, caller: Address, amount: u128) -> Result<()> {
        let profile = self.state.registry.get(caller)?;
        if profile.free_bond < amount {
            return Err(Error::InsufficientFreeBond {
                required: amount,
                available: profile.free_bond,
            });
        }

        let snapshot = self.state.clone();
        self.state.registry.get_mut(caller)?.free_bond -= amount;
        self.state.emit(ProtocolEvent::FreeBondWithdrawn {
            archaeologist: caller,
            amount,
        });

        self.transfer_or_rollback(snapshot, caller, amount)?;

        info!(archaeologist = %caller, amount, "free bond withdrawn");
        Ok(())
    }

    /// Withdraw the accrued digging-fee reward balance
    ///
    /// Returns the amount withdrawn; a zero balance is a successful no-op.
    pub fn withdraw_reward(&mut self, caller: Address) -> Result<u128> {
        let amount = self.state.reward_balance(caller);
        if amount == 0 {
            return Ok(0);
        }

        let snapshot = self.state.clone();
        self.state.rewards.remove(&caller);
        self.state.emit(ProtocolEvent::RewardWithdrawn {
            archaeologist: caller,
            amount,
        });

        self.transfer_or_rollback(snapshot, caller, amount)?;

        info!(archaeologist = %caller, amount, "reward withdrawn");
        Ok(amount)
    }

    /// Publish the private key for a curse inside the publication window
    ///
    /// The key must derive the committed public key. On success the
    /// custodian's bond is released, their digging fee is paid into their
    /// reward balance, and a success marker is recorded.
    pub fn publish_private_key(
        &mut self,
        caller: Address,
        now: Timestamp,
        sarco_id: SarcoId,
        private_key: PrivateKeyBytes,
    ) -> Result<()> {
        let config = self.state.config;
        let sarcophagus = self.state.active_sarcophagus(sarco_id)?;
        if now < sarcophagus.resurrection_time {
            return Err(Error::TooEarlyForPublish {
                window_start: sarcophagus.resurrection_time,
            });
        }
        let window_end = config.publish_window_end(sarcophagus.resurrection_time);
        if now > window_end {
            return Err(Error::TooLateForPublish { window_end });
        }

        let record = sarcophagus.cursed(caller)?;
        if record.is_accused {
            return Err(Error::ArchaeologistHasBeenAccused);
        }
        if record.has_published() {
            return Err(Error::PrivateKeyAlreadyPublished);
        }
        if private_key.derive_public_key()? != record.public_key {
            return Err(Error::IncorrectPrivateKey);
        }

        let fee_due = record.accrued_digging_fee(
            sarcophagus.resurrection_time,
            sarcophagus.previous_rewrap_time,
        );

        self.state
            .store
            .get_mut(sarco_id)?
            .cursed_mut(caller)?
            .private_key = Some(private_key);
        self.state.free_archaeologist(sarco_id, caller)?;
        self.state.accrue_reward(caller, fee_due);
        self.state.registry.get_mut(caller)?.successes.push(sarco_id);
        self.state.emit(ProtocolEvent::PrivateKeyPublished {
            sarco_id,
            archaeologist: caller,
            digging_fee_paid: fee_due,
        });

        info!(sarco_id = %sarco_id, archaeologist = %caller, fee_due, "private key published");
        Ok(())
    }
}
