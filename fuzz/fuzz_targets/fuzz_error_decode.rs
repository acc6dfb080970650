#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let message = dte_sv::client::decode_error_message(s);
        if serde_json::from_str::<serde_json::Value>(s).is_err() {
            assert_eq!(message, s);
        }
    }
});
