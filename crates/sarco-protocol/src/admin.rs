//! Admin engine
//!
//! Restricted setters for the tunable parameters, protocol-fee withdrawal,
//! and admin handover. Every operation is gated on the single admin
//! address; parameter changes affect sessions created afterwards (each
//! curse records the bond amount computed at its own creation).

use tracing::info;

use sarco_core::{
    Address, ConfigParameter, Error, ProtocolEvent, Result, SignerRecovery,
};

use crate::state::Protocol;
use crate::token::TokenLedger;

impl<T: TokenLedger, R: SignerRecovery> Protocol<T, R> {
    fn require_admin(&self, caller: Address) -> Result<()> {
        if caller != self.state.admin {
            return Err(Error::CallerIsNotAdmin);
        }
        Ok(())
    }

    /// Set the post-deadline publication grace period
    pub fn set_grace_period(&mut self, caller: Address, seconds: u64) -> Result<()> {
        self.require_admin(caller)?;
        self.state.config.grace_period = seconds;
        self.state.emit(ProtocolEvent::ConfigUpdated {
            parameter: ConfigParameter::GracePeriod,
        });
        Ok(())
    }

    /// Set the embalmer's exclusive clean-claim window
    pub fn set_embalmer_claim_window(&mut self, caller: Address, seconds: u64) -> Result<()> {
        self.require_admin(caller)?;
        self.state.config.embalmer_claim_window = seconds;
        self.state.emit(ProtocolEvent::ConfigUpdated {
            parameter: ConfigParameter::EmbalmerClaimWindow,
        });
        Ok(())
    }

    /// Set how long negotiated creation parameters remain valid
    pub fn set_expiration_threshold(&mut self, caller: Address, seconds: u64) -> Result<()> {
        self.require_admin(caller)?;
        self.state.config.expiration_threshold = seconds;
        self.state.emit(ProtocolEvent::ConfigUpdated {
            parameter: ConfigParameter::ExpirationThreshold,
        });
        Ok(())
    }

    /// Set the protocol fee in basis points of total digging fees
    pub fn set_protocol_fee_base_percentage(
        &mut self,
        caller: Address,
        basis_points: u32,
    ) -> Result<()> {
        self.require_admin(caller)?;
        self.state.config.protocol_fee_base_percentage = basis_points;
        self.state.emit(ProtocolEvent::ConfigUpdated {
            parameter: ConfigParameter::ProtocolFeeBasePercentage,
        });
        Ok(())
    }

    /// Set the cursed bond in basis points of the committed digging fee
    pub fn set_cursed_bond_percentage(&mut self, caller: Address, basis_points: u32) -> Result<()> {
        self.require_admin(caller)?;
        self.state.config.cursed_bond_percentage = basis_points;
        self.state.emit(ProtocolEvent::ConfigUpdated {
            parameter: ConfigParameter::CursedBondPercentage,
        });
        Ok(())
    }

    /// Withdraw accumulated protocol fees to `to`
    pub fn withdraw_protocol_fees(
        &mut self,
        caller: Address,
        to: Address,
        amount: u128,
    ) -> Result<()> {
        self.require_admin(caller)?;
        if self.state.protocol_fee_pool < amount {
            return Err(Error::InsufficientProtocolFees {
                requested: amount,
                available: self.state.protocol_fee_pool,
            });
        }

        let snapshot = self.state.clone();
        self.state.protocol_fee_pool -= amount;
        self.state
            .emit(ProtocolEvent::ProtocolFeesWithdrawn { to, amount });

        self.transfer_or_rollback(snapshot, to, amount)?;

        info!(to = %to, amount, "protocol fees withdrawn");
        Ok(())
    }

    /// Hand the admin role over to a new address
    pub fn transfer_admin(&mut self, caller: Address, new_admin: Address) -> Result<()> {
        self.require_admin(caller)?;
        let previous = self.state.admin;
        self.state.admin = new_admin;
        self.state.emit(ProtocolEvent::AdminTransferred {
            previous,
            new: new_admin,
        });

        info!(previous = %previous, new = %new_admin, "admin transferred");
        Ok(())
    }
}
