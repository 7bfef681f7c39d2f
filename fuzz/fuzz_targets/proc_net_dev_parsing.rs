#![no_main]
use libfuzzer_sys::fuzz_target;
use netgauge::platform::ProcNetDevSource;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let source = ProcNetDevSource::new();
        // Malformed tables must surface as errors, never panics
        let _ = source.parse_proc_net_dev(input, "eth0");
        let _ = ProcNetDevSource::parse_device_names(input);
    }
});
