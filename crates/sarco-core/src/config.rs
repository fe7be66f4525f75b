//! Protocol configuration and deadline-window arithmetic

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;
use crate::{
    DEFAULT_CURSED_BOND_PERCENTAGE, DEFAULT_EMBALMER_CLAIM_WINDOW, DEFAULT_EXPIRATION_THRESHOLD,
    DEFAULT_GRACE_PERIOD, DEFAULT_PROTOCOL_FEE_BASE_PERCENTAGE, PERCENTAGE_DIVISOR,
};

/// Admin-tunable protocol parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Seconds past the resurrection deadline during which custodians may
    /// still publish their key
    pub grace_period: u64,

    /// Seconds past the grace period during which only the embalmer may
    /// claim a clean sweep; afterwards the admin is the backstop
    pub embalmer_claim_window: u64,

    /// Seconds a negotiated creation-time remains valid
    pub expiration_threshold: u64,

    /// Protocol fee in basis points of total digging fees
    pub protocol_fee_base_percentage: u32,

    /// Cursed bond in basis points of the committed digging fee
    pub cursed_bond_percentage: u32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
            embalmer_claim_window: DEFAULT_EMBALMER_CLAIM_WINDOW,
            expiration_threshold: DEFAULT_EXPIRATION_THRESHOLD,
            protocol_fee_base_percentage: DEFAULT_PROTOCOL_FEE_BASE_PERCENTAGE,
            cursed_bond_percentage: DEFAULT_CURSED_BOND_PERCENTAGE,
        }
    }
}

impl ProtocolConfig {
    /// Protocol fee owed on a total digging-fee amount (rounds down)
    pub fn protocol_fee(&self, total_digging_fees: u128) -> u128 {
        total_digging_fees * self.protocol_fee_base_percentage as u128 / PERCENTAGE_DIVISOR
    }

    /// Bond amount locked for a committed digging fee (rounds down)
    pub fn cursed_bond(&self, digging_fee: u128) -> u128 {
        digging_fee * self.cursed_bond_percentage as u128 / PERCENTAGE_DIVISOR
    }

    /// End of the publication window for a deadline
    pub fn publish_window_end(&self, resurrection_time: Timestamp) -> Timestamp {
        resurrection_time.saturating_add(self.grace_period)
    }

    /// End of the embalmer's exclusive clean window for a deadline
    pub fn embalmer_claim_end(&self, resurrection_time: Timestamp) -> Timestamp {
        self.publish_window_end(resurrection_time)
            .saturating_add(self.embalmer_claim_window)
    }
}
