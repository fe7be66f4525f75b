#![no_main]

use libfuzzer_sys::fuzz_target;
use sarco_core::ProtocolEvent;

fuzz_target!(|data: &[u8]| {
    // The audit-trail codec must reject arbitrary input without panicking,
    // and accepted records must survive a round-trip
    if let Ok(event) = serde_json::from_slice::<ProtocolEvent>(data) {
        let json = serde_json::to_string(&event).unwrap();
        let recovered: ProtocolEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, recovered);
    }
});
