#![no_main]
use libfuzzer_sys::fuzz_target;
use netgauge::validation::validate_interface_name;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if validate_interface_name(input).is_ok() {
            assert!(!input.contains('/'));
            assert!(!input.chars().any(char::is_control));
        }
    }
});
