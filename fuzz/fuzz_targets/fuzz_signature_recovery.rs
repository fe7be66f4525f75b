#![no_main]

use libfuzzer_sys::fuzz_target;
use sarco_core::{EcdsaRecovery, RecoverableSignature, SignerRecovery};

fuzz_target!(|data: &[u8]| {
    // Recovery over arbitrary signature bytes and messages must either
    // produce an address or a typed error, never panic
    if data.len() < 65 {
        return;
    }
    let mut bytes = [0u8; 65];
    bytes.copy_from_slice(&data[..65]);
    let signature = RecoverableSignature::new(bytes);
    let message = &data[65..];
    let _ = EcdsaRecovery.recover(message, &signature);
});
