//! High-level SDK for the Digital Citizenship Protocol.
//!
//! Build a citizenship bundle with [`BundleBuilder`], sign it with
//! [`sign_bundle`], check it with [`verify_bundle`] and record it in a
//! transparency log with [`publish`]. The lower-level crates are
//! re-exported for callers that need more control.

pub mod builder;
pub mod error;
pub mod signing;
pub mod workflow;

#[cfg(test)]
mod fixtures;

pub use builder::{AuditEntryDraft, BundleBuilder};
pub use error::{SdkError, SdkResult};
pub use signing::sign_bundle;
pub use workflow::{publish, verify_bundle};

// Re-export key types
pub use dcp_crypto::{generate_keypair, Keypair};
pub use dcp_log::{LogConfig, TransparencyLog};
pub use dcp_types::{CitizenshipBundle, SignedBundle, SignerType};
pub use dcp_verify::{BundleVerifier, VerificationErrorKind, VerificationResult, VerifierConfig};

#[cfg(test)]
mod tests {
    use super::*;
    use dcp_crypto::MerkleMode;
    use dcp_types::{AuditDecision, Decision, RevocationRecord};
    use dcp_verify::RevocationList;

    // ----- 1. Build, sign, verify -----

    #[test]
    fn built_bundle_verifies() {
        let kp = generate_keypair();
        let signed =
            sign_bundle(fixtures::bundle(3), &kp.secret_key_b64, SignerType::Human, None).unwrap();

        let result = verify_bundle(&signed, None).unwrap();
        assert!(result.verified, "{:?}", result.errors);
        assert!(result.errors.is_empty());

        let explicit = verify_bundle(&signed, Some(&kp.public_key_b64)).unwrap();
        assert!(explicit.verified);
    }

    #[test]
    fn json_round_trip_still_verifies() {
        let kp = generate_keypair();
        let signed =
            sign_bundle(fixtures::bundle(2), &kp.secret_key_b64, SignerType::Human, None).unwrap();
        let text = serde_json::to_string_pretty(&signed).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        let result = dcp_verify::verify_signed_bundle(&value, None).unwrap();
        assert!(result.verified, "{:?}", result.errors);
    }

    // ----- 2. Tampering after signing -----

    #[test]
    fn changed_decision_breaks_signature() {
        let kp = generate_keypair();
        let mut signed =
            sign_bundle(fixtures::bundle(1), &kp.secret_key_b64, SignerType::Human, None).unwrap();
        signed.bundle.policy_decision.decision = Decision::Block;

        let result = verify_bundle(&signed, None).unwrap();
        assert_eq!(result.first_kind(), Some(VerificationErrorKind::SignatureInvalid));
    }

    #[test]
    fn other_key_is_rejected() {
        let kp = generate_keypair();
        let other = generate_keypair();
        let signed =
            sign_bundle(fixtures::bundle(1), &kp.secret_key_b64, SignerType::Human, None).unwrap();

        let result = verify_bundle(&signed, Some(&other.public_key_b64)).unwrap();
        assert_eq!(result.first_kind(), Some(VerificationErrorKind::SignatureInvalid));
    }

    #[test]
    fn hand_added_entry_breaks_chain() {
        let kp = generate_keypair();
        let mut bundle = fixtures::bundle(2);
        // Re-append a copy of the first entry: its prev_hash is GENESIS.
        let first = bundle.audit_entries[0].clone();
        bundle.audit_entries.push(first);
        let signed = sign_bundle(bundle, &kp.secret_key_b64, SignerType::Human, None).unwrap();

        let result = verify_bundle(&signed, None).unwrap();
        assert_eq!(
            result.first_kind(),
            Some(VerificationErrorKind::PrevHashChainMismatch)
        );
        assert_eq!(result.errors[0].context["index"], 2);
    }

    // ----- 3. Transparency log -----

    #[test]
    fn published_bundle_has_inclusion_proof() {
        let log = TransparencyLog::in_memory(MerkleMode::Legacy);
        let kp = generate_keypair();

        let mut signed_bundles = Vec::new();
        for n in 1..=3 {
            let signed =
                sign_bundle(fixtures::bundle(n), &kp.secret_key_b64, SignerType::Human, None).unwrap();
            let added = publish(&log, &signed).unwrap();
            assert_eq!(added.index, (n - 1) as u64);
            signed_bundles.push(signed);
        }

        let verifier = BundleVerifier::with_default_stages(VerifierConfig::default())
            .with_transparency(Box::new(log));
        for signed in &signed_bundles {
            let result = verifier.verify_signed(signed, None).unwrap();
            assert!(result.verified, "{:?}", result.errors);
        }
    }

    #[test]
    fn unpublished_bundle_fails_transparency() {
        let log = TransparencyLog::in_memory(MerkleMode::Legacy);
        let kp = generate_keypair();
        let published =
            sign_bundle(fixtures::bundle(1), &kp.secret_key_b64, SignerType::Human, None).unwrap();
        publish(&log, &published).unwrap();
        let unpublished =
            sign_bundle(fixtures::bundle(2), &kp.secret_key_b64, SignerType::Human, None).unwrap();

        let verifier = BundleVerifier::with_default_stages(VerifierConfig::default())
            .with_transparency(Box::new(log));
        let result = verifier.verify_signed(&unpublished, None).unwrap();
        assert_eq!(
            result.first_kind(),
            Some(VerificationErrorKind::TransparencyProofInvalid)
        );
    }

    #[test]
    fn publish_rejects_claimed_hash_that_does_not_match() {
        let log = TransparencyLog::in_memory(MerkleMode::Legacy);
        let kp = generate_keypair();

        let mut malformed =
            sign_bundle(fixtures::bundle(1), &kp.secret_key_b64, SignerType::Human, None).unwrap();
        malformed.signature.bundle_hash = "sha256:abc".into();
        assert!(matches!(
            publish(&log, &malformed),
            Err(SdkError::BundleHashMismatch { .. })
        ));

        // Edited after signing: the claimed hash is well formed but stale.
        let mut edited =
            sign_bundle(fixtures::bundle(1), &kp.secret_key_b64, SignerType::Human, None).unwrap();
        let claimed = edited.signature.bundle_hash.clone();
        edited.bundle.policy_decision.decision = Decision::Block;
        match publish(&log, &edited) {
            Err(SdkError::BundleHashMismatch { claimed: c, actual }) => {
                assert_eq!(c, claimed);
                assert_eq!(actual, dcp_crypto::bundle_hash(&edited.bundle).unwrap());
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
        assert_eq!(log.size().unwrap(), 0);
    }

    // ----- 4. Revocation -----

    #[test]
    fn revoked_agent_fails_after_integrity_checks() {
        let kp = generate_keypair();
        let bundle = fixtures::builder()
            .create_audit_entry(AuditEntryDraft::new(AuditDecision::Blocked, "stopped"))
            .unwrap()
            .build()
            .unwrap();
        let signed = sign_bundle(bundle, &kp.secret_key_b64, SignerType::Human, None).unwrap();

        let mut revoked = RevocationList::new();
        revoked.insert(RevocationRecord {
            dcp_version: "1.0".into(),
            agent_id: "agent-1".into(),
            human_id: "human-1".into(),
            timestamp: "2025-02-01T00:00:00Z".into(),
            reason: "key compromised".into(),
            signature: "unsigned".into(),
        });
        let verifier = BundleVerifier::with_default_stages(VerifierConfig::default())
            .with_revocation(Box::new(revoked));

        let result = verifier.verify_signed(&signed, None).unwrap();
        assert_eq!(result.first_kind(), Some(VerificationErrorKind::AgentRevoked));
        assert!(result.stage_results[..4].iter().all(|s| s.passed));
    }
}
