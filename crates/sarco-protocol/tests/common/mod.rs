//! Shared test harness: a protocol instance over the in-memory token
//! ledger, with archaeologists holding real k256 identity and share keys.

#![allow(dead_code)]

use sarco_core::{
    curse_commitment_message, Address, EcdsaRecovery, PrivateKeyBytes, ProtocolConfig, PublicKey,
    RecoverableSignature, SarcoId,
};
use sarco_protocol::{
    CreateSarcophagusParams, InMemoryToken, ProfileTerms, Protocol, SelectedArchaeologist,
};

/// Reference start of time for tests
pub const NOW: u64 = 1_000_000;

/// Default first deadline
pub const RESURRECTION: u64 = NOW + 10_000;

/// Default session-wide maximum rewrap interval
pub const MAX_INTERVAL: u64 = 100_000;

/// Default per-second digging fee
pub const FEE_PER_SECOND: u128 = 2;

/// Free bond every archaeologist registers with
pub const BOND_DEPOSIT: u128 = 1_000_000_000;

/// Embalmer balance and allowance
pub const EMBALMER_FUNDS: u128 = 1_000_000_000_000;

pub const ESCROW: Address = Address([0xEC; 20]);
pub const ADMIN: Address = Address([0xAD; 20]);
pub const EMBALMER: Address = Address([0xEB; 20]);
pub const RECIPIENT: Address = Address([0x1E; 20]);

pub type TestProtocol = Protocol<InMemoryToken, EcdsaRecovery>;

/// An archaeologist with a real identity key (signs curse commitments) and
/// a per-session share key (the committed public key)
pub struct TestArchaeologist {
    pub identity: PrivateKeyBytes,
    pub share: PrivateKeyBytes,
}

impl TestArchaeologist {
    pub fn new(seed: u8) -> Self {
        let mut identity = [0u8; 32];
        identity[31] = seed;
        identity[0] = 0x01;
        let mut share = [0u8; 32];
        share[31] = seed;
        share[0] = 0x02;
        Self {
            identity: PrivateKeyBytes::new(identity),
            share: PrivateKeyBytes::new(share),
        }
    }

    /// Registry identity address
    pub fn address(&self) -> Address {
        self.identity
            .derive_public_key()
            .unwrap()
            .to_address()
            .unwrap()
    }

    /// Committed key-share public key
    pub fn public_key(&self) -> PublicKey {
        self.share.derive_public_key().unwrap()
    }
}

/// Build a funded protocol with `count` registered archaeologists
pub fn setup(count: usize) -> (TestProtocol, Vec<TestArchaeologist>) {
    setup_with_config(count, ProtocolConfig::default())
}

pub fn setup_with_config(
    count: usize,
    config: ProtocolConfig,
) -> (TestProtocol, Vec<TestArchaeologist>) {
    init_tracing();

    let mut token = InMemoryToken::new(ESCROW);
    token.mint(EMBALMER, EMBALMER_FUNDS);
    token.approve(EMBALMER, EMBALMER_FUNDS);

    let archaeologists: Vec<TestArchaeologist> =
        (0..count).map(|i| TestArchaeologist::new(i as u8 + 1)).collect();
    for archaeologist in &archaeologists {
        token.mint(archaeologist.address(), BOND_DEPOSIT);
        token.approve(archaeologist.address(), BOND_DEPOSIT);
    }

    let mut protocol = Protocol::new(ESCROW, ADMIN, config, token, EcdsaRecovery);
    for archaeologist in &archaeologists {
        protocol
            .register_archaeologist(
                archaeologist.address(),
                ProfileTerms {
                    peer_id: format!("peer-{}", archaeologist.address().short()),
                    minimum_digging_fee_per_second: 1,
                    maximum_rewrap_interval: 10_000_000,
                },
                BOND_DEPOSIT,
            )
            .unwrap();
    }
    (protocol, archaeologists)
}

/// Route engine logs through the test harness; `RUST_LOG` filters apply
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn sarco_id(fill: u8) -> SarcoId {
    SarcoId::new([fill; 32])
}

pub fn payload_locators() -> [String; 2] {
    ["ar://payload".to_string(), "ar://shards".to_string()]
}

/// Build creation params with valid signed commitments from every
/// archaeologist at the default fee and deadline
pub fn create_params(id: SarcoId, archaeologists: &[TestArchaeologist], threshold: u8) -> CreateSarcophagusParams {
    create_params_at(id, archaeologists, threshold, NOW, RESURRECTION, FEE_PER_SECOND)
}

pub fn create_params_at(
    id: SarcoId,
    archaeologists: &[TestArchaeologist],
    threshold: u8,
    creation_time: u64,
    resurrection_time: u64,
    fee_per_second: u128,
) -> CreateSarcophagusParams {
    let locators = payload_locators();
    let selected = archaeologists
        .iter()
        .map(|archaeologist| {
            let message = curse_commitment_message(
                &archaeologist.public_key(),
                &locators,
                MAX_INTERVAL,
                creation_time,
                fee_per_second,
                archaeologist.address(),
            );
            SelectedArchaeologist {
                address: archaeologist.address(),
                digging_fee_per_second: fee_per_second,
                public_key: archaeologist.public_key(),
                signature: RecoverableSignature::sign(&archaeologist.identity, &message).unwrap(),
            }
        })
        .collect();
    CreateSarcophagusParams {
        id,
        name: "test sarcophagus".to_string(),
        recipient: RECIPIENT,
        resurrection_time,
        maximum_rewrap_interval: MAX_INTERVAL,
        creation_time,
        threshold,
        payload_locators: locators,
        archaeologists: selected,
    }
}

/// Accusal proof for one archaeologist's leaked share key
pub fn accusal_proof(
    archaeologist: &TestArchaeologist,
    id: SarcoId,
    payment_address: Address,
) -> (PublicKey, RecoverableSignature) {
    let message = sarco_core::accusal_message(id, payment_address);
    (
        archaeologist.public_key(),
        RecoverableSignature::sign(&archaeologist.share, &message).unwrap(),
    )
}
