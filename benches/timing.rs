use std::hint::black_box;
use std::time::Instant;

use envelope_vault::{encrypt_envelope, open_envelope, MasterKey, SecureRecord};
use serde_json::{json, Value};

fn time_it<F: FnMut()>(label: &str, iters: usize, mut f: F) {
    // warmup
    for _ in 0..(iters / 10).max(10) {
        f();
    }

    let start = Instant::now();
    for _ in 0..iters {
        f();
    }
    let elapsed = start.elapsed();

    let per_iter = elapsed / (iters as u32);
    println!("{:<16} total={:?}  per_iter={:?}", label, elapsed, per_iter);
}

fn with_field(record: &SecureRecord, field: &str, value: String) -> SecureRecord {
    let mut v = serde_json::to_value(record).unwrap();
    v[field] = Value::String(value);
    serde_json::from_value(v).unwrap()
}

fn main() {
    let mk = MasterKey::generate().unwrap();
    let payload = json!({"amount": 100, "currency": "USD", "memo": "x".repeat(1024)});

    let record = encrypt_envelope("bench", &payload, mk.as_bytes()).unwrap();

    // Last ciphertext byte flipped: full decrypt, tag fails.
    let mut ct = record.payload_fields().ciphertext.to_string();
    let last = if ct.ends_with('0') { "1" } else { "0" };
    ct.replace_range(ct.len() - 1.., last);
    let tampered = with_field(&record, "payload_ct", ct);

    let malformed = with_field(&record, "payload_nonce", "zz".into());
    let other_mk = MasterKey::generate().unwrap();

    let iters = 5_000;

    time_it("encrypt", iters, || {
        let r = encrypt_envelope("bench", black_box(&payload), mk.as_bytes()).unwrap();
        black_box(r);
    });

    time_it("valid", iters, || {
        let v: Value = open_envelope(black_box(&record), mk.as_bytes()).unwrap();
        black_box(v);
    });

    time_it("wrong_key", iters, || {
        let r = open_envelope::<Value>(black_box(&record), other_mk.as_bytes());
        black_box(r.err());
    });

    time_it("tampered", iters, || {
        let r = open_envelope::<Value>(black_box(&tampered), mk.as_bytes());
        black_box(r.err());
    });

    time_it("malformed", iters, || {
        let r = open_envelope::<Value>(black_box(&malformed), mk.as_bytes());
        black_box(r.err());
    });
}
