//! Signed bundle fixtures for tests.

use dcp_crypto::{
    bundle_hash, generate_keypair, hash_value, merkle_root_for_audit_entries, sign, AuditChainVerifier,
    Keypair,
};
use serde_json::{json, Value};

pub(crate) fn intent() -> Value {
    json!({
        "dcp_version": "1.0",
        "intent_id": "intent-1",
        "agent_id": "agent-1",
        "human_id": "human-1",
        "timestamp": "2025-01-01T00:00:00Z",
        "action_type": "send_email",
        "target": {"channel": "email", "to": "alice@example.test"},
        "data_classes": ["contact_info"],
        "estimated_impact": "low"
    })
}

pub(crate) fn bundle(entries: usize) -> Value {
    let intent = intent();
    let intent_hash = hash_value(&intent).to_hex();
    let mut audit_entries: Vec<Value> = Vec::new();
    for i in 0..entries {
        let prev_hash = AuditChainVerifier::next_prev_hash(&audit_entries).unwrap();
        audit_entries.push(json!({
            "dcp_version": "1.0",
            "audit_id": format!("audit-{i}"),
            "prev_hash": prev_hash,
            "timestamp": "2025-01-01T00:00:01Z",
            "agent_id": "agent-1",
            "human_id": "human-1",
            "intent_id": "intent-1",
            "intent_hash": intent_hash,
            "policy_decision": "approved",
            "outcome": format!("step {i} done"),
            "evidence": {"tool": "mailer", "result_ref": null}
        }));
    }

    json!({
        "human_binding_record": {
            "dcp_version": "1.0",
            "human_id": "human-1",
            "legal_name": "Alice Example",
            "entity_type": "natural_person",
            "jurisdiction": "US-CA",
            "liability_mode": "owner_responsible",
            "override_rights": true,
            "issued_at": "2025-01-01T00:00:00Z",
            "expires_at": null,
            "signature": "unsigned"
        },
        "agent_passport": {
            "dcp_version": "1.0",
            "agent_id": "agent-1",
            "public_key": "agent-key",
            "human_binding_reference": "human-1",
            "created_at": "2025-01-01T00:00:00Z",
            "status": "active",
            "signature": "unsigned"
        },
        "intent": intent,
        "policy_decision": {
            "dcp_version": "1.0",
            "intent_id": "intent-1",
            "decision": "approve",
            "risk_score": 0.25,
            "reasons": ["low risk"]
        },
        "audit_entries": audit_entries
    })
}

/// Sign `bundle`, committing to its hash and Merkle root.
pub(crate) fn seal(bundle: Value, kp: &Keypair) -> Value {
    let entries = bundle["audit_entries"].as_array().cloned().unwrap_or_default();
    let merkle_root = merkle_root_for_audit_entries(&entries)
        .unwrap()
        .map(|root| format!("sha256:{}", root.to_hex()));
    json!({
        "signature": {
            "alg": "ed25519",
            "created_at": "2025-01-01T00:00:02Z",
            "signer": {"type": "human", "id": "human-1", "public_key_b64": kp.public_key_b64},
            "bundle_hash": bundle_hash(&bundle).unwrap(),
            "merkle_root": merkle_root,
            "sig_b64": sign(&bundle, &kp.secret_key_b64).unwrap()
        },
        "bundle": bundle
    })
}

/// A valid signed bundle with `entries` audit entries.
pub(crate) fn signed(entries: usize) -> (Value, Keypair) {
    let kp = generate_keypair();
    (seal(bundle(entries), &kp), kp)
}
