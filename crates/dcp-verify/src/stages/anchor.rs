use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::Extension;
use crate::error::VerifyError;
use crate::input::VerificationInput;
use crate::report::{VerificationError, VerificationErrorKind};
use crate::stage::{StageOutcome, VerificationStage};

/// On-chain evidence that a hash was published.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorReceipt {
    /// Chain or ledger name, e.g. `"base"`.
    pub chain: String,
    pub tx_hash: String,
    /// The `"sha256:<hex>"` value recorded on chain.
    pub anchored_hash: String,
    #[serde(default)]
    pub block_time: Option<String>,
}

/// Reads anchor receipts. Fetching (RPC, indexer) is up to the implementor.
pub trait AnchorReader: Send + Sync {
    fn receipt_for(&self, bundle_hash: &str) -> Result<Option<AnchorReceipt>, VerifyError>;
}

/// Receipts held in memory, keyed by the bundle hash they were fetched for.
#[derive(Clone, Debug, Default)]
pub struct MemoryAnchorReader {
    receipts: HashMap<String, AnchorReceipt>,
}

impl MemoryAnchorReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, bundle_hash: impl Into<String>, receipt: AnchorReceipt) {
        self.receipts.insert(bundle_hash.into(), receipt);
    }
}

impl AnchorReader for MemoryAnchorReader {
    fn receipt_for(&self, bundle_hash: &str) -> Result<Option<AnchorReceipt>, VerifyError> {
        Ok(self.receipts.get(bundle_hash).cloned())
    }
}

/// Compares the anchored hash on chain with the recomputed bundle hash.
pub struct AnchorStage {
    reader: Box<dyn AnchorReader>,
}

impl AnchorStage {
    pub fn new(reader: Box<dyn AnchorReader>) -> Self {
        Self { reader }
    }
}

impl VerificationStage for AnchorStage {
    fn name(&self) -> &str {
        "anchor"
    }

    fn extension(&self) -> Option<Extension> {
        Some(Extension::Anchor)
    }

    fn evaluate(&self, input: &VerificationInput) -> Result<StageOutcome, VerifyError> {
        let bundle_hash = super::prefixed(&dcp_crypto::hash_value(input.bundle()));

        let Some(receipt) = self.reader.receipt_for(&bundle_hash)? else {
            return Ok(StageOutcome::Fail(
                VerificationError::new(
                    VerificationErrorKind::AnchorMismatch,
                    "no anchor receipt found for bundle",
                )
                .with("expected", bundle_hash),
            ));
        };

        if receipt.anchored_hash == bundle_hash {
            return Ok(StageOutcome::Pass);
        }
        Ok(StageOutcome::Fail(
            VerificationError::mismatch(
                VerificationErrorKind::AnchorMismatch,
                "anchored hash differs from bundle hash",
                bundle_hash,
                receipt.anchored_hash,
            )
            .with("chain", receipt.chain)
            .with("tx_hash", receipt.tx_hash),
        ))
    }
}
