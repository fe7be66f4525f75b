//! Structured audit records emitted by engine operations
//!
//! Each state-mutating operation appends one record to the protocol's
//! ordered event log. The log is the only externally observable audit
//! trail; off-chain indexers drain it.

use serde::{Deserialize, Serialize};

use crate::types::{Address, SarcoId, Timestamp};

/// Audit record for one committed state transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolEvent {
    /// A new escrow session was created and funded
    SarcophagusCreated {
        sarco_id: SarcoId,
        embalmer: Address,
        recipient: Address,
        resurrection_time: Timestamp,
        archaeologists: Vec<Address>,
        total_digging_fees: u128,
        protocol_fee: u128,
    },

    /// The deadline was extended and a new period funded
    SarcophagusRewrapped {
        sarco_id: SarcoId,
        new_resurrection_time: Timestamp,
        total_digging_fees: u128,
        protocol_fee: u128,
    },

    /// The embalmer terminated the session early
    SarcophagusBuried { sarco_id: SarcoId },

    /// A custodian released their key share within the window
    PrivateKeyPublished {
        sarco_id: SarcoId,
        archaeologist: Address,
        digging_fee_paid: u128,
    },

    /// One or more custodians were proven to have leaked early
    AccusalProcessed {
        sarco_id: SarcoId,
        accused: Vec<Address>,
        payment_address: Address,
        slashed_bond_total: u128,
        fee_reimbursement: u128,
        compromised: bool,
    },

    /// Derelict custodians were swept after the grace period
    SarcophagusCleaned {
        sarco_id: SarcoId,
        initiator: Address,
        defaulters: Vec<Address>,
        amount_swept: u128,
        paid_to_embalmer: bool,
    },

    /// A new archaeologist profile was registered
    ArchaeologistRegistered {
        archaeologist: Address,
        free_bond_deposited: u128,
    },

    /// An archaeologist updated their public profile
    ArchaeologistUpdated { archaeologist: Address },

    /// Free bond was deposited
    FreeBondDeposited { archaeologist: Address, amount: u128 },

    /// Free bond was withdrawn
    FreeBondWithdrawn { archaeologist: Address, amount: u128 },

    /// Accrued digging-fee rewards were withdrawn
    RewardWithdrawn { archaeologist: Address, amount: u128 },

    /// Admin withdrew from the protocol fee pool
    ProtocolFeesWithdrawn { to: Address, amount: u128 },

    /// Admin role was handed over
    AdminTransferred { previous: Address, new: Address },

    /// An admin updated a protocol parameter
    ConfigUpdated { parameter: ConfigParameter },
}

/// Which protocol parameter an admin updated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigParameter {
    GracePeriod,
    EmbalmerClaimWindow,
    ExpirationThreshold,
    ProtocolFeeBasePercentage,
    CursedBondPercentage,
}
