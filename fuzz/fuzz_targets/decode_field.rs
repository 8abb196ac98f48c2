#![no_main]

use envelope_vault::wire;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let _ = wire::decode_fixed::<12>("fuzz", text);
    let _ = wire::decode_fixed::<16>("fuzz", text);
    if let Ok(bytes) = wire::decode_variable("fuzz", text) {
        assert_eq!(wire::encode(&bytes), text.to_ascii_lowercase());
    }
    let _ = envelope_vault::MasterKey::from_hex(text);
});
