#![no_main]

use envelope_vault::{inspect, open_envelope, MasterKey, SecureRecord};
use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;
use serde_json::Value;

static MASTER_KEY: Lazy<MasterKey> = Lazy::new(|| MasterKey::from_bytes(&[0x5a; 32]).unwrap());

fuzz_target!(|data: &[u8]| {
    let Ok(record) = serde_json::from_slice::<SecureRecord>(data) else {
        return;
    };

    let _ = inspect(&record);
    let _ = open_envelope::<Value>(&record, MASTER_KEY.as_bytes());
});
