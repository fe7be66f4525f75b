//! Tests for the cleanup engine and its claim-priority windows

mod common;

use common::*;

use sarco_core::{Address, Error, ProtocolEvent};
use sarco_protocol::TokenLedger;

const GRACE: u64 = 3_600; // default grace period
const CLAIM: u64 = 604_800; // default embalmer claim window
const PERIOD_FEE: u128 = FEE_PER_SECOND * (RESURRECTION - NOW) as u128;

fn created(count: usize, threshold: u8) -> (TestProtocol, Vec<TestArchaeologist>) {
    let (mut protocol, archaeologists) = setup(count);
    protocol
        .create_sarcophagus(
            EMBALMER,
            NOW,
            create_params(sarco_id(1), &archaeologists, threshold),
        )
        .unwrap();
    (protocol, archaeologists)
}

#[test]
fn clean_sweeps_all_defaulters_to_embalmer() {
    let (mut protocol, archaeologists) = created(5, 3);
    let id = sarco_id(1);
    let embalmer_before = protocol.token.balance_of(EMBALMER);

    // Nobody published; every custodian forfeits bond plus held fee
    protocol
        .clean(EMBALMER, RESURRECTION + GRACE + 1, id)
        .unwrap();

    let swept = 5 * (PERIOD_FEE + PERIOD_FEE);
    assert_eq!(
        protocol.token.balance_of(EMBALMER),
        embalmer_before + swept
    );
    assert!(protocol.state.sarcophagus(id).unwrap().is_cleaned);

    for archaeologist in &archaeologists {
        let profile = protocol
            .state
            .archaeologist_profile(archaeologist.address())
            .unwrap();
        assert_eq!(profile.cursed_bond, 0);
        assert_eq!(profile.free_bond, BOND_DEPOSIT - PERIOD_FEE);
        assert_eq!(profile.cleanups, vec![id]);
    }

    let events = protocol.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        ProtocolEvent::SarcophagusCleaned {
            amount_swept,
            paid_to_embalmer: true,
            ..
        } if *amount_swept == swept
    )));

    // Clean runs exactly once
    let result = protocol.clean(EMBALMER, RESURRECTION + GRACE + 2, id);
    assert!(matches!(result, Err(Error::SarcophagusAlreadyCleaned(_))));
}

#[test]
fn clean_rejects_before_grace_elapses() {
    let (mut protocol, _) = created(1, 1);
    let result = protocol.clean(EMBALMER, RESURRECTION + GRACE, sarco_id(1));
    assert!(matches!(result, Err(Error::TooEarlyForClean { .. })));
}

#[test]
fn clean_claim_priority_windows() {
    let (mut protocol, _) = created(1, 1);
    let id = sarco_id(1);
    let claim_end = RESURRECTION + GRACE + CLAIM;

    // Admin cannot pre-empt the embalmer's claim window
    let result = protocol.clean(ADMIN, RESURRECTION + GRACE + 10, id);
    assert!(matches!(result, Err(Error::TooEarlyForAdminClean { .. })));

    // The embalmer cannot claim after the window closes
    let result = protocol.clean(EMBALMER, claim_end + 1, id);
    assert!(matches!(result, Err(Error::TooLateForEmbalmerClean { .. })));

    // The admin is the backstop once the window closes; the sweep accrues
    // to the protocol fee pool instead of being transferred out
    let pool_before = protocol.state.protocol_fee_pool;
    let escrow_before = protocol.token.balance_of(ESCROW);
    protocol.clean(ADMIN, claim_end + 1, id).unwrap();
    assert_eq!(
        protocol.state.protocol_fee_pool,
        pool_before + 2 * PERIOD_FEE
    );
    assert_eq!(protocol.token.balance_of(ESCROW), escrow_before);
}

#[test]
fn clean_rejects_strangers() {
    let (mut protocol, _) = created(1, 1);
    let result = protocol.clean(Address([0x55; 20]), RESURRECTION + GRACE + 1, sarco_id(1));
    assert!(matches!(result, Err(Error::SenderNotEmbalmerOrAdmin)));
}

#[test]
fn clean_skips_published_and_accused_custodians() {
    let (mut protocol, archaeologists) = created(3, 3);
    let id = sarco_id(1);

    // One custodian is accused before the deadline
    let (public_key, signature) = accusal_proof(&archaeologists[1], id, RECIPIENT);
    protocol
        .accuse(RECIPIENT, NOW + 100, id, &[public_key], &[signature], RECIPIENT)
        .unwrap();

    // One publishes inside the window
    protocol
        .publish_private_key(
            archaeologists[0].address(),
            RESURRECTION,
            id,
            archaeologists[0].share.clone(),
        )
        .unwrap();

    let embalmer_before = protocol.token.balance_of(EMBALMER);
    protocol
        .clean(EMBALMER, RESURRECTION + GRACE + 1, id)
        .unwrap();

    // Only the silent defaulter is swept: bond plus held fee
    assert_eq!(
        protocol.token.balance_of(EMBALMER),
        embalmer_before + 2 * PERIOD_FEE
    );

    let published = protocol
        .state
        .archaeologist_profile(archaeologists[0].address())
        .unwrap();
    assert_eq!(published.free_bond, BOND_DEPOSIT);
    assert!(published.cleanups.is_empty());

    let accused = protocol
        .state
        .archaeologist_profile(archaeologists[1].address())
        .unwrap();
    assert_eq!(accused.free_bond, BOND_DEPOSIT - PERIOD_FEE);
    assert!(accused.cleanups.is_empty());

    let defaulter = protocol
        .state
        .archaeologist_profile(archaeologists[2].address())
        .unwrap();
    assert_eq!(defaulter.cleanups, vec![id]);
    assert_eq!(defaulter.free_bond, BOND_DEPOSIT - PERIOD_FEE);
    assert_eq!(defaulter.cursed_bond, 0);
}

#[test]
fn clean_rejects_buried_session() {
    let (mut protocol, _) = created(1, 1);
    let id = sarco_id(1);
    protocol.bury_sarcophagus(EMBALMER, NOW + 100, id).unwrap();

    let result = protocol.clean(EMBALMER, RESURRECTION + GRACE + 1, id);
    assert!(matches!(result, Err(Error::SarcophagusInactive(_))));
}

#[test]
fn clean_rejects_unknown_session() {
    let (mut protocol, _) = setup(0);
    let result = protocol.clean(EMBALMER, RESURRECTION + GRACE + 1, sarco_id(9));
    assert!(matches!(result, Err(Error::SarcophagusDoesNotExist(_))));
}
