use envelope_vault::{
    decrypt_payload, encrypt_envelope, open_envelope, unwrap_dek, EnvelopeError, ErrorKind,
    MasterKey, SecureRecord,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn open(record: &SecureRecord, mk: &[u8]) -> Result<Value, EnvelopeError> {
    let dek = unwrap_dek(record.wrap_fields(), mk)?;
    decrypt_payload(record.payload_fields(), &dek)
}

#[test]
fn happy_path_scenario() {
    let mk = [0u8; 32];
    let payload = json!({"amount": 100, "currency": "USD"});

    let record = encrypt_envelope("user_123", &payload, &mk).unwrap();
    assert_eq!(record.algorithm(), "AES-256-GCM");
    assert_eq!(record.master_key_version(), 1);
    assert_eq!(record.party_id(), "user_123");

    assert_eq!(open(&record, &mk).unwrap(), payload);
}

#[test]
fn roundtrip_through_storage_json() {
    let mk = MasterKey::generate().unwrap();
    let payload = json!({"items": [{"sku": "a-1", "qty": 2}], "note": null});

    let record = encrypt_envelope("acct-9", &payload, mk.as_bytes()).unwrap();
    let stored = serde_json::to_string(&record).unwrap();
    let loaded: SecureRecord = serde_json::from_str(&stored).unwrap();

    assert_eq!(loaded, record);
    let back: Value = open_envelope(&loaded, mk.as_bytes()).unwrap();
    assert_eq!(back, payload);
}

#[test]
fn roundtrip_large_payload() {
    let mk = [7u8; 32];
    let blob = "x".repeat(256 * 1024);
    let payload = json!({"blob": blob});
    let record = encrypt_envelope("p", &payload, &mk).unwrap();
    assert_eq!(open(&record, &mk).unwrap(), payload);
}

#[test]
fn same_inputs_give_different_records() {
    let mk = [1u8; 32];
    let payload = json!({"k": "v"});

    let a = encrypt_envelope("p", &payload, &mk).unwrap();
    let b = encrypt_envelope("p", &payload, &mk).unwrap();

    assert_ne!(a.id(), b.id());
    assert_ne!(a.payload_fields().nonce, b.payload_fields().nonce);
    assert_ne!(a.payload_fields().ciphertext, b.payload_fields().ciphertext);
    assert_ne!(a.payload_fields().tag, b.payload_fields().tag);
    assert_ne!(a.wrap_fields().nonce, b.wrap_fields().nonce);
    assert_ne!(a.wrap_fields().wrapped, b.wrap_fields().wrapped);

    assert_eq!(open(&a, &mk).unwrap(), payload);
    assert_eq!(open(&b, &mk).unwrap(), payload);
}

#[test]
fn payload_and_wrap_nonces_are_independent() {
    let mk = [1u8; 32];
    for _ in 0..32 {
        let r = encrypt_envelope("p", &json!(1), &mk).unwrap();
        assert_ne!(r.payload_fields().nonce, r.wrap_fields().nonce);
    }
}

#[test]
fn wrong_master_key_scenario() {
    let a = MasterKey::generate().unwrap();
    let b = MasterKey::generate().unwrap();
    let record = encrypt_envelope("p", &json!({"secret": true}), a.as_bytes()).unwrap();

    assert_eq!(
        unwrap_dek(record.wrap_fields(), b.as_bytes()).unwrap_err(),
        EnvelopeError::DekIntegrity
    );
    assert_eq!(
        open_envelope::<Value>(&record, b.as_bytes()).unwrap_err(),
        EnvelopeError::DekIntegrity
    );
}

#[test]
fn undersized_master_key_scenario() {
    let result = encrypt_envelope("p", &json!({"k": 1}), &[0u8; 16]);
    assert_eq!(
        result.unwrap_err(),
        EnvelopeError::InvalidKeyLength { expected: 32, got: 16 }
    );
}

#[test]
fn oversized_master_key_rejected() {
    let result = encrypt_envelope("p", &json!({"k": 1}), &[0u8; 48]);
    assert_eq!(
        result.unwrap_err(),
        EnvelopeError::InvalidKeyLength { expected: 32, got: 48 }
    );
}

#[test]
fn deep_nesting_refused_before_sealing() {
    let nest = |depth: usize| (0..depth).fold(json!(1), |inner, _| json!([inner]));
    let mk = [0u8; 32];

    // a record that could never be opened is not produced at all
    let err = encrypt_envelope("p", &nest(200), &mk).unwrap_err();
    assert_eq!(err, EnvelopeError::Serialization);
    assert_ne!(err.kind(), ErrorKind::Integrity);

    let payload = nest(120);
    let record = encrypt_envelope("p", &payload, &mk).unwrap();
    assert_eq!(open(&record, &mk).unwrap(), payload);
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        ".*".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{1,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_roundtrip(payload in arb_json(), party in "[a-zA-Z0-9_]{0,24}", mk in any::<[u8; 32]>()) {
        let record = encrypt_envelope(&party, &payload, &mk).unwrap();
        prop_assert_eq!(record.party_id(), party.as_str());
        prop_assert_eq!(open(&record, &mk).unwrap(), payload);
    }
}
