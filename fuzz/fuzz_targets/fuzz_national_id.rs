#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(formatted) = dte_sv::core::format_national_id(s) {
            assert_eq!(formatted.len(), 10);
            assert_eq!(formatted.replace('-', ""), s);
        }
        let _ = dte_sv::core::format_phone_number(s);
    }
});
