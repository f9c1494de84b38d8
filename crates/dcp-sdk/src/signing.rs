use dcp_crypto::{bundle_hash, merkle_root_for_audit_entries, public_key_from_secret, sign};
use dcp_types::{BundleSignature, CitizenshipBundle, SignedBundle, SignerInfo, SignerType};
use tracing::debug;

use crate::builder::now_rfc3339;
use crate::error::SdkResult;

/// Sign `bundle` with an Ed25519 secret key.
///
/// The signature covers the canonical bundle. `bundle_hash` and
/// `merkle_root` are computed from the same bundle, so a verifier sees the
/// signer's commitments. `signer_id` defaults to the bundle's human id.
pub fn sign_bundle(
    bundle: CitizenshipBundle,
    secret_key_b64: &str,
    signer_type: SignerType,
    signer_id: Option<&str>,
) -> SdkResult<SignedBundle> {
    let public_key_b64 = public_key_from_secret(secret_key_b64)?;
    let bundle_hash = bundle_hash(&bundle)?;
    let merkle_root = merkle_root_for_audit_entries(&bundle.audit_entries)?.map(|root| root.to_prefixed());
    let sig_b64 = sign(&bundle, secret_key_b64)?;

    let signer_id = signer_id
        .map(str::to_string)
        .unwrap_or_else(|| bundle.human_binding_record.human_id.clone());
    debug!(%bundle_hash, signer = %signer_id, "bundle signed");

    Ok(SignedBundle {
        signature: BundleSignature {
            alg: "ed25519".to_string(),
            created_at: now_rfc3339(),
            signer: SignerInfo {
                signer_type,
                id: signer_id,
                public_key_b64,
            },
            bundle_hash,
            merkle_root,
            sig_b64,
        },
        bundle,
    })
}
