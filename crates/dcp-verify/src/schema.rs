use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use dcp_types::{
    AgentPassport, AuditEntry, CitizenshipBundle, HumanBindingRecord, Intent, PolicyDecision,
    SignedBundle,
};

/// `{valid, errors}` answer of a schema validator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl SchemaReport {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Structural validator consulted before any cryptographic check.
///
/// `schema` names the artifact: `signed_bundle`, `citizenship_bundle`,
/// `human_binding_record`, `agent_passport`, `intent`, `policy_decision`
/// or `audit_entry`.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, schema: &str, value: &Value) -> SchemaReport;
}

/// Validator backed by the serde models in `dcp-types`.
///
/// A value is valid when it deserializes into the matching type. For signed
/// bundles every audit entry is also checked individually so each bad entry
/// is reported.
#[derive(Clone, Copy, Debug, Default)]
pub struct TypedSchemaValidator;

impl TypedSchemaValidator {
    fn check<T: DeserializeOwned>(label: &str, value: &Value, errors: &mut Vec<String>) {
        if let Err(e) = serde_json::from_value::<T>(value.clone()) {
            errors.push(format!("{label}: {e}"));
        }
    }

    fn check_bundle(prefix: &str, bundle: &Value, errors: &mut Vec<String>) {
        if !bundle.is_object() {
            errors.push(format!("{prefix}: expected an object"));
            return;
        }
        let field = |name: &str| format!("{prefix}.{name}");
        Self::check::<HumanBindingRecord>(
            &field("human_binding_record"),
            &bundle["human_binding_record"],
            errors,
        );
        Self::check::<AgentPassport>(&field("agent_passport"), &bundle["agent_passport"], errors);
        Self::check::<Intent>(&field("intent"), &bundle["intent"], errors);
        Self::check::<PolicyDecision>(&field("policy_decision"), &bundle["policy_decision"], errors);
        match bundle["audit_entries"].as_array() {
            Some(entries) if !entries.is_empty() => {
                for (i, entry) in entries.iter().enumerate() {
                    Self::check::<AuditEntry>(&format!("{prefix}.audit_entries[{i}]"), entry, errors);
                }
            }
            Some(_) => errors.push(format!("{prefix}.audit_entries: must not be empty")),
            None => errors.push(format!("{prefix}.audit_entries: expected an array")),
        }
    }
}

impl SchemaValidator for TypedSchemaValidator {
    fn validate(&self, schema: &str, value: &Value) -> SchemaReport {
        let mut errors = Vec::new();
        match schema {
            "signed_bundle" => {
                Self::check_bundle("bundle", &value["bundle"], &mut errors);
                if errors.is_empty() {
                    Self::check::<SignedBundle>("signed_bundle", value, &mut errors);
                }
                if let Some(alg) = value.pointer("/signature/alg").and_then(Value::as_str) {
                    if alg != "ed25519" {
                        errors.push(format!("signature.alg: unsupported algorithm '{alg}'"));
                    }
                }
            }
            "citizenship_bundle" => {
                Self::check_bundle("bundle", value, &mut errors);
                if errors.is_empty() {
                    Self::check::<CitizenshipBundle>("bundle", value, &mut errors);
                }
            }
            "human_binding_record" => Self::check::<HumanBindingRecord>(schema, value, &mut errors),
            "agent_passport" => Self::check::<AgentPassport>(schema, value, &mut errors),
            "intent" => Self::check::<Intent>(schema, value, &mut errors),
            "policy_decision" => Self::check::<PolicyDecision>(schema, value, &mut errors),
            "audit_entry" => Self::check::<AuditEntry>(schema, value, &mut errors),
            other => errors.push(format!("unknown schema '{other}'")),
        }
        SchemaReport::from_errors(errors)
    }
}
