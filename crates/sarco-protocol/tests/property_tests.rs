//! Property-based tests for the protocol's conservation invariants

mod common;

use common::*;

use proptest::prelude::*;

use sarco_core::ProtocolConfig;
use sarco_protocol::{ArchaeologistProfile, TokenLedger};

/// Bond operations applied to a profile in sequence
#[derive(Debug, Clone)]
enum BondOp {
    Lock(u128),
    Unlock(u128),
    Slash(u128),
}

fn arb_bond_op() -> impl Strategy<Value = BondOp> {
    prop_oneof![
        (0u128..2_000).prop_map(BondOp::Lock),
        (0u128..2_000).prop_map(BondOp::Unlock),
        (0u128..2_000).prop_map(BondOp::Slash),
    ]
}

proptest! {
    /// free + locked never grows, and only a slash may shrink it
    #[test]
    fn bond_moves_conserve_collateral(
        initial in 0u128..10_000,
        ops in prop::collection::vec(arb_bond_op(), 0..50),
    ) {
        let mut profile = ArchaeologistProfile::new("p".to_string(), 1, 1_000);
        profile.free_bond = initial;

        let mut expected_total = initial;
        for op in ops {
            let before = (profile.free_bond, profile.cursed_bond);
            let result = match op {
                BondOp::Lock(amount) => profile.lock_bond(amount),
                BondOp::Unlock(amount) => profile.unlock_bond(amount),
                BondOp::Slash(amount) => {
                    let result = profile.slash_bond(amount);
                    if result.is_ok() {
                        expected_total -= amount;
                    }
                    result
                }
            };
            // A rejected move leaves the profile untouched
            if result.is_err() {
                prop_assert_eq!((profile.free_bond, profile.cursed_bond), before);
            }
            prop_assert_eq!(profile.free_bond + profile.cursed_bond, expected_total);
        }
    }

    /// Percentage arithmetic never rounds up
    #[test]
    fn config_percentages_round_down(
        total in 0u128..1_000_000_000,
        fee_bp in 0u32..20_000,
        bond_bp in 0u32..20_000,
    ) {
        let config = ProtocolConfig {
            protocol_fee_base_percentage: fee_bp,
            cursed_bond_percentage: bond_bp,
            ..Default::default()
        };
        prop_assert!(config.protocol_fee(total) * 10_000 <= total * fee_bp as u128);
        prop_assert!(config.cursed_bond(total) * 10_000 <= total * bond_bp as u128);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// For all valid creations, exactly `sum(fees) + protocol fee` leaves
    /// the embalmer, the escrow gains the same amount, and each custodian's
    /// locked bond increases by exactly its fee
    #[test]
    fn creation_conserves_funds(
        count in 1usize..5,
        fee_per_second in 1u128..500,
        duration in 1u64..50_000,
        threshold_seed in 1u8..5,
    ) {
        let threshold = threshold_seed.min(count as u8);
        let (mut protocol, archaeologists) = setup(count);
        let id = sarco_id(1);

        let embalmer_before = protocol.token.balance_of(EMBALMER);
        let escrow_before = protocol.token.balance_of(ESCROW);

        let params = create_params_at(
            id,
            &archaeologists,
            threshold,
            NOW,
            NOW + duration,
            fee_per_second,
        );
        protocol.create_sarcophagus(EMBALMER, NOW, params).unwrap();

        let fee_each = fee_per_second * duration as u128;
        let total_fees = fee_each * count as u128;
        let protocol_fee = protocol.state.config.protocol_fee(total_fees);

        prop_assert_eq!(
            protocol.token.balance_of(EMBALMER),
            embalmer_before - total_fees - protocol_fee
        );
        prop_assert_eq!(
            protocol.token.balance_of(ESCROW),
            escrow_before + total_fees + protocol_fee
        );
        prop_assert_eq!(protocol.state.protocol_fee_pool, protocol_fee);

        for archaeologist in &archaeologists {
            let profile = protocol
                .state
                .archaeologist_profile(archaeologist.address())
                .unwrap();
            prop_assert_eq!(profile.cursed_bond, fee_each);
            prop_assert_eq!(profile.free_bond + profile.cursed_bond, BOND_DEPOSIT);
        }
    }

    /// Publication succeeds exactly inside `[deadline, deadline + grace]`
    #[test]
    fn publish_timing_matches_window(offset in -5_000i64..20_000) {
        let (mut protocol, archaeologists) = setup(1);
        let id = sarco_id(1);
        protocol
            .create_sarcophagus(EMBALMER, NOW, create_params(id, &archaeologists, 1))
            .unwrap();

        let grace = protocol.state.config.grace_period;
        let now = (RESURRECTION as i64 + offset) as u64;
        let result = protocol.publish_private_key(
            archaeologists[0].address(),
            now,
            id,
            archaeologists[0].share.clone(),
        );

        let in_window = now >= RESURRECTION && now <= RESURRECTION + grace;
        prop_assert_eq!(result.is_ok(), in_window);
    }
}
