#![no_main]

use libfuzzer_sys::fuzz_target;
use sarco_core::{Address, PrivateKeyBytes, PublicKey, SarcoId};

fuzz_target!(|data: &[u8]| {
    // Hex parsing must never panic, and successful parses must round-trip
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(address) = Address::from_hex(text) {
            let recovered = Address::from_hex(&address.to_hex()).unwrap();
            assert_eq!(address, recovered);
        }
        if let Ok(id) = SarcoId::from_hex(text) {
            let recovered = SarcoId::from_hex(&id.to_hex()).unwrap();
            assert_eq!(id, recovered);
        }
        if let Ok(key) = PublicKey::from_hex(text) {
            let recovered = PublicKey::from_hex(&key.to_hex()).unwrap();
            assert_eq!(key, recovered);
            // Address derivation rejects invalid points, never panics
            let _ = key.to_address();
        }
    }

    // Arbitrary scalars either derive a key pair or are rejected cleanly
    if data.len() >= 32 {
        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(&data[..32]);
        let private_key = PrivateKeyBytes::new(scalar);
        if let Ok(public_key) = private_key.derive_public_key() {
            assert!(public_key.to_address().is_ok());
        }
    }
});
