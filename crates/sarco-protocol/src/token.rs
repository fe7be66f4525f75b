//! External fungible-token balance service seam
//!
//! The protocol never mints or burns; it only moves balances between the
//! embalmer, the escrow account, archaeologists, and payout addresses. The
//! real ledger lives outside this system; [`InMemoryToken`] stands in for
//! it in tests and simulations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sarco_core::Address;

/// Failures surfaced by the external balance service
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Account balance cannot cover the transfer
    #[error("insufficient balance: account {account} has {available}, needs {required}")]
    InsufficientBalance {
        account: Address,
        available: u128,
        required: u128,
    },

    /// Standing allowance cannot cover the transfer
    #[error("insufficient allowance: owner {owner} approved {available}, needs {required}")]
    InsufficientAllowance {
        owner: Address,
        available: u128,
        required: u128,
    },
}

/// Debit/credit interface of the external token ledger, as seen from the
/// protocol's escrow account
pub trait TokenLedger {
    /// Transfer out of the escrow account
    fn transfer(&mut self, to: Address, amount: u128) -> Result<(), TokenError>;

    /// Transfer on behalf of `from` into `to`, consuming the standing
    /// allowance `from` granted the escrow account
    fn transfer_from(
        &mut self,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), TokenError>;

    /// Current balance of an account
    fn balance_of(&self, account: Address) -> u128;
}

/// In-memory token ledger for tests and simulation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryToken {
    /// The escrow account transfers debit by default
    escrow: Address,
    balances: HashMap<Address, u128>,
    /// Allowances granted to the escrow account, keyed by owner
    allowances: HashMap<Address, u128>,
}

impl InMemoryToken {
    /// Create a ledger whose outbound transfers debit `escrow`
    pub fn new(escrow: Address) -> Self {
        Self {
            escrow,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    /// Credit an account out of thin air (test setup only)
    pub fn mint(&mut self, account: Address, amount: u128) {
        *self.balances.entry(account).or_insert(0) += amount;
    }

    /// Grant the escrow account an allowance over `owner`'s balance
    pub fn approve(&mut self, owner: Address, amount: u128) {
        self.allowances.insert(owner, amount);
    }

    /// Remaining allowance the escrow account holds over `owner`
    pub fn allowance(&self, owner: Address) -> u128 {
        self.allowances.get(&owner).copied().unwrap_or(0)
    }

    fn debit(&mut self, account: Address, amount: u128) -> Result<(), TokenError> {
        let balance = self.balances.entry(account).or_insert(0);
        if *balance < amount {
            return Err(TokenError::InsufficientBalance {
                account,
                available: *balance,
                required: amount,
            });
        }
        *balance -= amount;
        Ok(())
    }
}

impl TokenLedger for InMemoryToken {
    fn transfer(&mut self, to: Address, amount: u128) -> Result<(), TokenError> {
        self.debit(self.escrow, amount)?;
        *self.balances.entry(to).or_insert(0) += amount;
        Ok(())
    }

    fn transfer_from(
        &mut self,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        let allowance = self.allowances.entry(from).or_insert(0);
        if *allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                owner: from,
                available: *allowance,
                required: amount,
            });
        }
        *allowance -= amount;
        if let Err(e) = self.debit(from, amount) {
            // Restore the allowance so the failed transfer has no effect
            *self.allowances.entry(from).or_insert(0) += amount;
            return Err(e);
        }
        *self.balances.entry(to).or_insert(0) += amount;
        Ok(())
    }

    fn balance_of(&self, account: Address) -> u128 {
        self.balances.get(&account).copied().unwrap_or(0)
    }
}
