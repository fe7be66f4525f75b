//! Cleanup engine
//!
//! The punitive sweep for custodians who neither published nor were
//! accused by the end of the grace period. The embalmer has first claim on
//! the swept funds; after the claim window closes the admin is the
//! backstop and the sweep accrues to the protocol fee pool instead.

use tracing::info;

use sarco_core::{Address, Error, ProtocolEvent, Result, SarcoId, SignerRecovery, Timestamp};

use crate::state::Protocol;
use crate::token::TokenLedger;

impl<T: TokenLedger, R: SignerRecovery> Protocol<T, R> {
    /// Sweep derelict custodians after the grace period
    ///
    /// For every custodian who neither published nor was accused: slash
    /// their locked bond and forfeit their held fee, both into the sweep
    /// total. Runs exactly once per session.
    pub fn clean(&mut self, caller: Address, now: Timestamp, sarco_id: SarcoId) -> Result<()> {
        let config = self.state.config;
        let sarcophagus = self.state.store.get(sarco_id)?;
        if sarcophagus.is_compromised {
            return Err(Error::SarcophagusCompromised(sarco_id));
        }
        if sarcophagus.is_buried() {
            return Err(Error::SarcophagusInactive(sarco_id));
        }
        if sarcophagus.is_cleaned {
            return Err(Error::SarcophagusAlreadyCleaned(sarco_id));
        }

        let earliest = config.publish_window_end(sarcophagus.resurrection_time);
        if now <= earliest {
            return Err(Error::TooEarlyForClean { earliest });
        }
        let claim_end = config.embalmer_claim_end(sarcophagus.resurrection_time);
        let is_embalmer = caller == sarcophagus.embalmer;
        if is_embalmer {
            if now > claim_end {
                return Err(Error::TooLateForEmbalmerClean {
                    window_end: claim_end,
                });
            }
        } else if caller == self.state.admin {
            if now <= claim_end {
                return Err(Error::TooEarlyForAdminClean {
                    window_end: claim_end,
                });
            }
        } else {
            return Err(Error::SenderNotEmbalmerOrAdmin);
        }

        let embalmer = sarcophagus.embalmer;
        let mut defaulters = Vec::new();
        let mut amount_swept: u128 = 0;
        for address in &sarcophagus.archaeologists {
            let record = sarcophagus.cursed(*address)?;
            if record.has_published() || record.is_accused {
                continue;
            }
            let fee_held = record.accrued_digging_fee(
                sarcophagus.resurrection_time,
                sarcophagus.previous_rewrap_time,
            );
            // Forfeited bond plus the matching embalmer-paid fee
            amount_swept += record.cursed_bond_amount + fee_held;
            defaulters.push((*address, record.cursed_bond_amount));
        }

        let snapshot = self.state.clone();

        self.state.store.get_mut(sarco_id)?.is_cleaned = true;
        for (address, bond) in &defaulters {
            self.state.decrease_locked_bond(*address, *bond)?;
            self.state
                .registry
                .get_mut(*address)?
                .cleanups
                .push(sarco_id);
        }
        if !is_embalmer {
            self.state.protocol_fee_pool += amount_swept;
        }
        let defaulter_addresses: Vec<Address> = defaulters.iter().map(|(a, _)| *a).collect();
        self.state.emit(ProtocolEvent::SarcophagusCleaned {
            sarco_id,
            initiator: caller,
            defaulters: defaulter_addresses.clone(),
            amount_swept,
            paid_to_embalmer: is_embalmer,
        });

        if is_embalmer {
            self.transfer_or_rollback(snapshot, embalmer, amount_swept)?;
        }

        info!(
            sarco_id = %sarco_id,
            initiator = %caller,
            defaulters = defaulter_addresses.len(),
            amount_swept,
            "sarcophagus cleaned"
        );
        Ok(())
    }
}
