//! Accusal and slashing engine
//!
//! An accusal is a proof of early leakage: a signature produced with a
//! custodian's committed share key over `(session, payment address)`.
//! Accusals are idempotent per custodian, and once the number of accused
//! custodians reaches the session threshold the secret is considered
//! compromised and the session terminates.

use std::collections::HashSet;

use tracing::{info, warn};

use sarco_core::{
    accusal_message, Address, Error, ProtocolEvent, PublicKey, RecoverableSignature, Result,
    SarcoId, SignerRecovery, Timestamp,
};

use crate::state::Protocol;
use crate::token::TokenLedger;

impl<T: TokenLedger, R: SignerRecovery> Protocol<T, R> {
    /// Process a batch of leak proofs against one sarcophagus
    ///
    /// Each proof is a `(public key, signature)` pair; the signature must
    /// be over `(sarco_id, payment_address)` and recover to the address of
    /// the supplied key. Already-accused custodians are skipped without
    /// error. If no new accusals result, the call has no effect at all.
    ///
    /// Newly slashed bond is split half to the embalmer (plus full
    /// reimbursement of the accused custodians' held fees) and half to
    /// `payment_address`, which is deliberately decoupled from the caller
    /// to support relayed reporting.
    pub fn accuse(
        &mut self,
        caller: Address,
        now: Timestamp,
        sarco_id: SarcoId,
        public_keys: &[PublicKey],
        signatures: &[RecoverableSignature],
        payment_address: Address,
    ) -> Result<()> {
        let sarcophagus = self.state.active_sarcophagus(sarco_id)?;
        if now > sarcophagus.resurrection_time {
            // The accusal window closes at expiry; dereliction after that
            // is handled by clean, not accuse
            return Err(Error::SarcophagusExpired {
                resurrection_time: sarcophagus.resurrection_time,
            });
        }
        if public_keys.len() != signatures.len() {
            return Err(Error::SignatureCountMismatch {
                public_keys: public_keys.len(),
                signatures: signatures.len(),
            });
        }

        // Resolve and verify every proof before touching state
        let message = accusal_message(sarco_id, payment_address);
        let mut newly_accused = Vec::new();
        let mut seen = HashSet::new();
        for (public_key, signature) in public_keys.iter().zip(signatures) {
            let expected = public_key.to_address()?;
            let recovered = self.recovery.recover(&message, signature)?;
            if recovered != expected {
                return Err(Error::InvalidAccusalSignature);
            }

            let archaeologist = self
                .state
                .store
                .archaeologist_for_public_key(public_key)
                .ok_or(Error::ArchaeologistNotOnSarcophagus(expected))?;
            let record = sarcophagus.cursed(archaeologist)?;
            if record.public_key != *public_key {
                // The key is committed, but on a different session
                return Err(Error::ArchaeologistNotOnSarcophagus(expected));
            }
            if record.is_accused || record.has_published() {
                continue;
            }
            if !seen.insert(archaeologist) {
                continue;
            }
            let fee_held = record.accrued_digging_fee(
                sarcophagus.resurrection_time,
                sarcophagus.previous_rewrap_time,
            );
            newly_accused.push((archaeologist, record.cursed_bond_amount, fee_held));
        }

        if newly_accused.is_empty() {
            return Ok(());
        }

        let threshold = sarcophagus.threshold as usize;
        let embalmer = sarcophagus.embalmer;
        let slashed_bond_total: u128 = newly_accused.iter().map(|(_, bond, _)| bond).sum();
        let fee_reimbursement: u128 = newly_accused.iter().map(|(_, _, fee)| fee).sum();

        // Both payouts leave escrow after the state commit; check solvency
        // up front so neither transfer can fail after the other succeeded
        let escrow_balance = self.token.balance_of(self.state.escrow_address);
        if escrow_balance < slashed_bond_total + fee_reimbursement {
            return Err(Error::TransferFailed(format!(
                "escrow holds {escrow_balance}, payout needs {}",
                slashed_bond_total + fee_reimbursement
            )));
        }

        let snapshot = self.state.clone();

        for (archaeologist, bond, _) in &newly_accused {
            self.state
                .store
                .get_mut(sarco_id)?
                .cursed_mut(*archaeologist)?
                .is_accused = true;
            self.state.decrease_locked_bond(*archaeologist, *bond)?;
            self.state
                .registry
                .get_mut(*archaeologist)?
                .accusals
                .push(sarco_id);
        }

        // Threshold check counts both this call and the historical record
        let total_accused = self.state.store.get(sarco_id)?.accused_count();
        let compromised = newly_accused.len() >= threshold || total_accused >= threshold;
        if compromised {
            let remaining: Vec<Address> = self
                .state
                .store
                .get(sarco_id)?
                .cursed
                .iter()
                .filter(|(_, record)| !record.is_accused && !record.has_published())
                .map(|(address, _)| *address)
                .collect();
            for address in remaining {
                // Good-faith custodians are released from their obligation
                self.state.free_archaeologist(sarco_id, address)?;
                self.state
                    .store
                    .get_mut(sarco_id)?
                    .cursed_mut(address)?
                    .cursed_bond_amount = 0;
            }
            self.state.store.get_mut(sarco_id)?.is_compromised = true;
            warn!(sarco_id = %sarco_id, total_accused, threshold, "sarcophagus compromised");
        }

        let accused: Vec<Address> = newly_accused.iter().map(|(a, _, _)| *a).collect();
        self.state.emit(ProtocolEvent::AccusalProcessed {
            sarco_id,
            accused: accused.clone(),
            payment_address,
            slashed_bond_total,
            fee_reimbursement,
            compromised,
        });

        // Both payouts come from contract-held funds
        let payment_amount = slashed_bond_total / 2;
        let embalmer_amount = slashed_bond_total - payment_amount + fee_reimbursement;
        self.transfer_or_rollback(snapshot.clone(), payment_address, payment_amount)?;
        self.transfer_or_rollback(snapshot, embalmer, embalmer_amount)?;

        info!(
            sarco_id = %sarco_id,
            caller = %caller,
            newly_accused = accused.len(),
            slashed_bond_total,
            compromised,
            "accusal processed"
        );
        Ok(())
    }
}
