//! Sarco Protocol - lifecycle and economic-security state machine
//!
//! Implements the time-locked secret-escrow protocol: sarcophagus creation
//! with multi-party signature verification, collateral bonding and
//! slashing, deadline-driven transitions (rewrap, bury, publish, accuse,
//! clean), and threshold-based compromise detection.
//!
//! Execution is single-threaded, serialized, and atomic per call. All
//! time-gated transitions are triggered by external callers passing the
//! current time explicitly; the machine never polls a clock or invokes
//! itself.

pub mod accusal;
pub mod admin;
pub mod archaeologist;
pub mod cleanup;
pub mod embalmer;
pub mod registry;
pub mod state;
pub mod store;
pub mod token;
pub mod view;

pub use archaeologist::ProfileTerms;
pub use embalmer::{CreateSarcophagusParams, SelectedArchaeologist};
pub use registry::{ArchaeologistProfile, ArchaeologistRegistry};
pub use state::{Protocol, ProtocolState};
pub use store::{CursedArchaeologist, Sarcophagus, SarcophagusStore};
pub use token::{InMemoryToken, TokenError, TokenLedger};
pub use view::ArchaeologistStatistics;
