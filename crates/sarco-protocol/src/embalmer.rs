//! Creation, renewal, and termination engine
//!
//! The embalmer-driven lifecycle: `create_sarcophagus` bonds the selected
//! custodians and funds the first period, `rewrap_sarcophagus` extends the
//! deadline and funds the next one, `bury_sarcophagus` terminates early.
//!
//! Every operation validates completely before the first write; the token
//! collection is the final step and rolls the transition back if rejected.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use sarco_core::{
    curse_commitment_message, Address, Error, ProtocolEvent, PublicKey, RecoverableSignature,
    Result, SarcoId, SignerRecovery, Timestamp,
};

use crate::state::Protocol;
use crate::store::{CursedArchaeologist, Sarcophagus};
use crate::token::TokenLedger;

/// One custodian's signed agreement to be cursed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedArchaeologist {
    /// Registry identity of the custodian
    pub address: Address,

    /// Agreed per-second digging fee
    pub digging_fee_per_second: u128,

    /// Committed key-share public key for this session
    pub public_key: PublicKey,

    /// Signature over the curse commitment message
    pub signature: RecoverableSignature,
}

/// Parameters for creating a new escrow session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSarcophagusParams {
    /// Session identifier; must be globally unused
    pub id: SarcoId,

    /// Human-readable label
    pub name: String,

    /// Party the secret is addressed to
    pub recipient: Address,

    /// First resurrection deadline
    pub resurrection_time: Timestamp,

    /// Longest deadline extension a rewrap may set, fixed for the session
    pub maximum_rewrap_interval: u64,

    /// Time the off-chain negotiation was concluded
    pub creation_time: Timestamp,

    /// Number of leaked shares that compromises the secret
    pub threshold: u8,

    /// Off-chain locators for the payload and the share bundle
    pub payload_locators: [String; 2],

    /// Selected custodians with their signed commitments
    pub archaeologists: Vec<SelectedArchaeologist>,
}

impl<T: TokenLedger, R: SignerRecovery> Protocol<T, R> {
    /// Create and fund a new sarcophagus
    ///
    /// Verifies every custodian's signed commitment, locks their bond, and
    /// collects `total digging fees + protocol fee` from the embalmer.
    pub fn create_sarcophagus(
        &mut self,
        caller: Address,
        now: Timestamp,
        params: CreateSarcophagusParams,
    ) -> Result<()> {
        let config = self.state.config;

        if self.state.store.contains(params.id) {
            return Err(Error::SarcophagusAlreadyExists(params.id));
        }
        if now > params.creation_time.saturating_add(config.expiration_threshold) {
            return Err(Error::SarcophagusParametersExpired {
                agreed_creation_time: params.creation_time,
                expiration_threshold: config.expiration_threshold,
            });
        }
        if params.resurrection_time <= now {
            return Err(Error::ResurrectionTimeInPast {
                resurrection_time: params.resurrection_time,
            });
        }
        let limit = now.saturating_add(params.maximum_rewrap_interval);
        if params.resurrection_time > limit {
            return Err(Error::ResurrectionTimeTooFarInFuture {
                resurrection_time: params.resurrection_time,
                limit,
            });
        }
        if params.archaeologists.is_empty() {
            return Err(Error::NoArchaeologistsProvided);
        }
        if params.threshold == 0 || params.threshold as usize > params.archaeologists.len() {
            return Err(Error::InvalidThreshold {
                threshold: params.threshold,
                archaeologist_count: params.archaeologists.len(),
            });
        }

        // Verify each commitment and size each bond before touching state
        let mut seen_addresses = HashSet::new();
        let mut seen_keys = HashSet::new();
        let mut cursed = HashMap::new();
        let mut order = Vec::with_capacity(params.archaeologists.len());
        let mut total_digging_fees: u128 = 0;

        for selected in &params.archaeologists {
            let profile = self.state.registry.get(selected.address)?;
            if selected.digging_fee_per_second < profile.minimum_digging_fee_per_second {
                return Err(Error::DiggingFeeBelowMinimum {
                    offered: selected.digging_fee_per_second,
                    minimum: profile.minimum_digging_fee_per_second,
                });
            }
            if params.maximum_rewrap_interval > profile.maximum_rewrap_interval {
                return Err(Error::RewrapIntervalTooLong {
                    requested: params.maximum_rewrap_interval,
                    maximum: profile.maximum_rewrap_interval,
                });
            }
            if !seen_addresses.insert(selected.address) {
                return Err(Error::DuplicateArchaeologist(selected.address));
            }
            if self.state.store.is_public_key_committed(&selected.public_key)
                || !seen_keys.insert(selected.public_key)
            {
                return Err(Error::DuplicatePublicKey);
            }

            let message = curse_commitment_message(
                &selected.public_key,
                &params.payload_locators,
                params.maximum_rewrap_interval,
                params.creation_time,
                selected.digging_fee_per_second,
                selected.address,
            );
            let recovered = self.recovery.recover(&message, &selected.signature)?;
            if recovered != selected.address {
                return Err(Error::SignerMismatch {
                    expected: selected.address,
                    recovered,
                });
            }

            let digging_fee = selected.digging_fee_per_second
                * (params.resurrection_time - now) as u128;
            let bond = config.cursed_bond(digging_fee);
            if profile.free_bond < bond {
                return Err(Error::InsufficientFreeBond {
                    required: bond,
                    available: profile.free_bond,
                });
            }

            total_digging_fees += digging_fee;
            order.push(selected.address);
            cursed.insert(
                selected.address,
                CursedArchaeologist {
                    public_key: selected.public_key,
                    private_key: None,
                    is_accused: false,
                    digging_fee_per_second: selected.digging_fee_per_second,
                    cursed_bond_amount: bond,
                },
            );
        }

        let snapshot = self.state.clone();

        self.state.store.insert(Sarcophagus {
            id: params.id,
            resurrection_time: params.resurrection_time,
            is_compromised: false,
            is_cleaned: false,
            name: params.name,
            threshold: params.threshold,
            maximum_rewrap_interval: params.maximum_rewrap_interval,
            payload_locators: params.payload_locators,
            embalmer: caller,
            recipient: params.recipient,
            archaeologists: order.clone(),
            cursed,
            previous_rewrap_time: now,
        })?;
        for address in &order {
            self.state.curse_archaeologist(params.id, *address)?;
        }

        let protocol_fee = config.protocol_fee(total_digging_fees);
        self.state.protocol_fee_pool += protocol_fee;
        self.state.emit(ProtocolEvent::SarcophagusCreated {
            sarco_id: params.id,
            embalmer: caller,
            recipient: params.recipient,
            resurrection_time: params.resurrection_time,
            archaeologists: order.clone(),
            total_digging_fees,
            protocol_fee,
        });

        self.collect_or_rollback(snapshot, caller, total_digging_fees + protocol_fee)?;

        info!(
            sarco_id = %params.id,
            embalmer = %caller,
            archaeologists = order.len(),
            total_digging_fees,
            "sarcophagus created"
        );
        Ok(())
    }

    /// Extend the resurrection deadline and fund the next period
    ///
    /// Pays out the fees held for the period being closed, re-levels each
    /// curse's locked bond to the new period, and collects the new fees
    /// plus protocol fee from the embalmer.
    pub fn rewrap_sarcophagus(
        &mut self,
        caller: Address,
        now: Timestamp,
        sarco_id: SarcoId,
        new_resurrection_time: Timestamp,
    ) -> Result<()> {
        let config = self.state.config;
        let sarcophagus = self.state.active_sarcophagus(sarco_id)?;
        if sarcophagus.embalmer != caller {
            return Err(Error::SenderNotEmbalmer);
        }
        if now >= sarcophagus.resurrection_time {
            return Err(Error::SarcophagusExpired {
                resurrection_time: sarcophagus.resurrection_time,
            });
        }
        if new_resurrection_time <= now {
            return Err(Error::ResurrectionTimeInPast {
                resurrection_time: new_resurrection_time,
            });
        }
        let limit = now.saturating_add(sarcophagus.maximum_rewrap_interval);
        if new_resurrection_time > limit {
            return Err(Error::ResurrectionTimeTooFarInFuture {
                resurrection_time: new_resurrection_time,
                limit,
            });
        }

        // Plan payouts and bond re-leveling; accused custodians were already
        // settled at accusal time and are skipped entirely
        let mut plan = Vec::with_capacity(sarcophagus.archaeologists.len());
        let mut total_new_fees: u128 = 0;
        for address in &sarcophagus.archaeologists {
            let record = sarcophagus.cursed(*address)?;
            if record.is_accused {
                continue;
            }
            let fee_due = record.accrued_digging_fee(
                sarcophagus.resurrection_time,
                sarcophagus.previous_rewrap_time,
            );
            let new_fee =
                record.digging_fee_per_second * (new_resurrection_time - now) as u128;
            let new_bond = config.cursed_bond(new_fee);
            if new_bond > record.cursed_bond_amount {
                let top_up = new_bond - record.cursed_bond_amount;
                let profile = self.state.registry.get(*address)?;
                if profile.free_bond < top_up {
                    return Err(Error::InsufficientFreeBond {
                        required: top_up,
                        available: profile.free_bond,
                    });
                }
            }
            total_new_fees += new_fee;
            plan.push((*address, fee_due, new_bond));
        }

        let snapshot = self.state.clone();

        for (address, fee_due, new_bond) in plan {
            self.state.accrue_reward(address, fee_due);
            let record = self
                .state
                .store
                .get_mut(sarco_id)?
                .cursed_mut(address)?;
            let old_bond = record.cursed_bond_amount;
            record.cursed_bond_amount = new_bond;
            let profile = self.state.registry.get_mut(address)?;
            if new_bond > old_bond {
                profile.lock_bond(new_bond - old_bond)?;
            } else {
                profile.unlock_bond(old_bond - new_bond)?;
            }
        }

        let protocol_fee = config.protocol_fee(total_new_fees);
        self.state.protocol_fee_pool += protocol_fee;
        let sarcophagus = self.state.store.get_mut(sarco_id)?;
        sarcophagus.resurrection_time = new_resurrection_time;
        sarcophagus.previous_rewrap_time = now;
        self.state.emit(ProtocolEvent::SarcophagusRewrapped {
            sarco_id,
            new_resurrection_time,
            total_digging_fees: total_new_fees,
            protocol_fee,
        });

        self.collect_or_rollback(snapshot, caller, total_new_fees + protocol_fee)?;

        info!(
            sarco_id = %sarco_id,
            new_resurrection_time,
            total_new_fees,
            "sarcophagus rewrapped"
        );
        Ok(())
    }

    /// Terminate a session early
    ///
    /// Releases every custodian's locked bond and pays out the fees held
    /// for the open period. Terminal: no further transitions are possible.
    pub fn bury_sarcophagus(
        &mut self,
        caller: Address,
        now: Timestamp,
        sarco_id: SarcoId,
    ) -> Result<()> {
        let sarcophagus = self.state.active_sarcophagus(sarco_id)?;
        if sarcophagus.embalmer != caller {
            return Err(Error::SenderNotEmbalmer);
        }
        if now >= sarcophagus.resurrection_time {
            return Err(Error::SarcophagusExpired {
                resurrection_time: sarcophagus.resurrection_time,
            });
        }

        let mut plan = Vec::with_capacity(sarcophagus.archaeologists.len());
        for address in &sarcophagus.archaeologists {
            let record = sarcophagus.cursed(*address)?;
            if record.is_accused {
                continue;
            }
            let fee_due = record.accrued_digging_fee(
                sarcophagus.resurrection_time,
                sarcophagus.previous_rewrap_time,
            );
            plan.push((*address, fee_due));
        }

        self.state.store.get_mut(sarco_id)?.resurrection_time =
            Sarcophagus::RESURRECTION_NEVER;
        for (address, fee_due) in plan {
            self.state.accrue_reward(address, fee_due);
            self.state.free_archaeologist(sarco_id, address)?;
        }
        self.state
            .emit(ProtocolEvent::SarcophagusBuried { sarco_id });

        info!(sarco_id = %sarco_id, "sarcophagus buried");
        Ok(())
    }
}
