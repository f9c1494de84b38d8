use std::sync::{Mutex, RwLock};

use chrono::{SecondsFormat, Utc};
use dcp_crypto::{hash, MerkleMode, MerkleTree};
use dcp_types::{ContentHash, TransparencyLogEntry};
use dcp_verify::{InclusionEvidence, InclusionProofSource, VerifyError};
use tracing::{debug, info};

use crate::config::LogConfig;
use crate::error::{LogError, Result};
use crate::file::FileLogStore;
use crate::memory::MemoryLogStore;
use crate::traits::LogStore;
use crate::wire::{AddRequest, AddResponse, EntriesResponse, ProofResponse, RootResponse};

/// The log's entries and tree, as seen under the read lock.
#[derive(Debug)]
pub struct LogView {
    entries: Vec<TransparencyLogEntry>,
    tree: MerkleTree,
}

impl LogView {
    pub fn size(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn root(&self) -> Option<ContentHash> {
        self.tree.root()
    }

    pub fn entries(&self) -> &[TransparencyLogEntry] {
        &self.entries
    }

    /// First entry that logged `bundle_hash`.
    pub fn find(&self, bundle_hash: &str) -> Option<&TransparencyLogEntry> {
        self.entries.iter().find(|e| e.bundle_hash == bundle_hash)
    }

    pub fn proof(&self, index: u64) -> Result<ProofResponse> {
        let out_of_range = || LogError::IndexOutOfRange {
            index,
            size: self.size(),
        };
        let position = usize::try_from(index).map_err(|_| out_of_range())?;
        let entry = self.entries.get(position).ok_or_else(out_of_range)?;
        let proof = self.tree.proof_path(position).ok_or_else(out_of_range)?;
        let root = self.tree.root().ok_or_else(out_of_range)?;

        Ok(ProofResponse {
            index,
            leaf_hash: entry.leaf_hash,
            entry: entry.clone(),
            root,
            proof,
            mode: self.tree.mode(),
        })
    }
}

/// Append-only transparency log of bundle hashes.
///
/// `add` runs under a single writer lock: index assignment, the store
/// append and the tree extension happen as one unit. The in-memory view is
/// extended in place, under its write lock, only after the store accepted
/// the entry, so readers never see a half-applied append and a rejected
/// append leaves the log unchanged. Readers hold the read lock only for the
/// duration of one query.
pub struct TransparencyLog<S: LogStore = MemoryLogStore> {
    store: S,
    mode: MerkleMode,
    writer: Mutex<()>,
    view: RwLock<LogView>,
}

impl TransparencyLog<MemoryLogStore> {
    pub fn in_memory(mode: MerkleMode) -> Self {
        Self {
            store: MemoryLogStore::new(),
            mode,
            writer: Mutex::new(()),
            view: RwLock::new(LogView {
                entries: Vec::new(),
                tree: MerkleTree::new(mode),
            }),
        }
    }
}

impl TransparencyLog<Box<dyn LogStore>> {
    /// Build the log described by `config`: file-backed when a path is set,
    /// in memory otherwise.
    pub fn from_config(config: &LogConfig) -> Result<Self> {
        let store: Box<dyn LogStore> = match &config.path {
            Some(path) => Box::new(FileLogStore::open(path, config.sync_mode)?),
            None => Box::new(MemoryLogStore::new()),
        };
        Self::open(store, config.merkle_mode)
    }
}

impl<S: LogStore> TransparencyLog<S> {
    /// Open a log over `store`, rebuilding the tree from its entries.
    ///
    /// Fails with `IntegrityViolation` if stored indexes are not exactly
    /// `0..n` in order or a leaf hash does not match its bundle hash.
    pub fn open(store: S, mode: MerkleMode) -> Result<Self> {
        let entries = store.read_all()?;
        let mut tree = MerkleTree::new(mode);

        for (position, entry) in entries.iter().enumerate() {
            let expected = position as u64;
            if entry.index != expected {
                return Err(LogError::IntegrityViolation {
                    index: expected,
                    reason: format!("stored entry carries index {}", entry.index),
                });
            }
            if entry.leaf_hash != leaf_hash_for(&entry.bundle_hash)? {
                return Err(LogError::IntegrityViolation {
                    index: expected,
                    reason: "leaf_hash does not match bundle_hash".into(),
                });
            }
            tree.push(entry.leaf_hash);
        }

        debug!(size = entries.len(), ?mode, "transparency log opened");
        Ok(Self {
            store,
            mode,
            writer: Mutex::new(()),
            view: RwLock::new(LogView { entries, tree }),
        })
    }

    pub fn mode(&self) -> MerkleMode {
        self.mode
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run `f` against a consistent view of the log.
    pub fn read<T>(&self, f: impl FnOnce(&LogView) -> T) -> Result<T> {
        let view = self.view.read().map_err(|_| LogError::poisoned("log view"))?;
        Ok(f(&view))
    }

    /// Append a `"sha256:<hex>"` bundle hash.
    pub fn add(&self, bundle_hash: &str) -> Result<AddResponse> {
        validate_bundle_hash(bundle_hash)?;
        let leaf_hash = leaf_hash_for(bundle_hash)?;

        let _writer = self
            .writer
            .lock()
            .map_err(|_| LogError::poisoned("log writer"))?;
        // Only this writer changes the size, so it cannot move before the push.
        let index = self.read(LogView::size)?;

        let entry = TransparencyLogEntry {
            index,
            leaf_hash,
            bundle_hash: bundle_hash.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        self.store.append(&entry)?;

        let (root, size) = {
            let mut view = self.view.write().map_err(|_| LogError::poisoned("log view"))?;
            view.entries.push(entry);
            view.tree.push(leaf_hash);
            (view.root(), view.size())
        };
        let root = root.ok_or_else(|| LogError::Store("tree empty after append".into()))?;

        info!(index, size, root = %root.short_hex(), "bundle hash logged");
        Ok(AddResponse {
            index,
            leaf_hash,
            root,
            size,
        })
    }

    pub fn add_request(&self, request: &AddRequest) -> Result<AddResponse> {
        self.add(&request.bundle_hash)
    }

    pub fn root(&self) -> Result<RootResponse> {
        self.read(|view| RootResponse {
            root: view.root(),
            size: view.size(),
        })
    }

    /// Inclusion proof for the entry at `index`.
    pub fn proof(&self, index: u64) -> Result<ProofResponse> {
        self.read(|view| view.proof(index))?
    }

    pub fn entries(&self) -> Result<EntriesResponse> {
        self.read(|view| EntriesResponse {
            entries: view.entries().to_vec(),
            size: view.size(),
        })
    }

    pub fn size(&self) -> Result<u64> {
        self.read(LogView::size)
    }
}

impl<S: LogStore> InclusionProofSource for TransparencyLog<S> {
    fn inclusion_proof(&self, bundle_hash: &str) -> std::result::Result<Option<InclusionEvidence>, VerifyError> {
        let to_verify_error = |e: LogError| VerifyError::collaborator("transparency_log", e.to_string());
        let found = self
            .read(|view| {
                view.find(bundle_hash)
                    .map(|entry| view.proof(entry.index))
                    .transpose()
            })
            .map_err(to_verify_error)?
            .map_err(to_verify_error)?;
        Ok(found.map(Into::into))
    }
}

/// `hash(bundle_hash)`: the JSON string is what gets hashed.
pub fn leaf_hash_for(bundle_hash: &str) -> Result<ContentHash> {
    hash(bundle_hash).map_err(|e| LogError::Serialization(e.to_string()))
}

fn validate_bundle_hash(bundle_hash: &str) -> Result<()> {
    match ContentHash::from_prefixed(bundle_hash) {
        Ok(parsed) if parsed.to_prefixed() == bundle_hash => Ok(()),
        _ => Err(LogError::InvalidBundleHash(bundle_hash.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcp_crypto::{build_root, sha256, verify_inclusion_proof};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn bundle_hash(n: u64) -> String {
        sha256(&n.to_le_bytes()).to_prefixed()
    }

    /// Store that rejects appends while `failing` is set.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryLogStore,
        failing: AtomicBool,
    }

    impl LogStore for FlakyStore {
        fn append(&self, entry: &TransparencyLogEntry) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(LogError::Store("disk full".into()));
            }
            self.inner.append(entry)
        }
        fn get(&self, index: u64) -> Result<Option<TransparencyLogEntry>> {
            self.inner.get(index)
        }
        fn len(&self) -> Result<u64> {
            self.inner.len()
        }
        fn read_all(&self) -> Result<Vec<TransparencyLogEntry>> {
            self.inner.read_all()
        }
    }

    #[test]
    fn empty_log() {
        let log = TransparencyLog::in_memory(MerkleMode::Legacy);
        assert_eq!(log.root().unwrap(), RootResponse { root: None, size: 0 });
        assert!(matches!(
            log.proof(0),
            Err(LogError::IndexOutOfRange { index: 0, size: 0 })
        ));
        assert!(log.entries().unwrap().entries.is_empty());
    }

    #[test]
    fn every_proof_verifies_after_n_adds() {
        let log = TransparencyLog::in_memory(MerkleMode::Legacy);
        for n in 0..13 {
            let added = log.add(&bundle_hash(n)).unwrap();
            assert_eq!(added.index, n);
            assert_eq!(added.size, n + 1);
        }

        let root = log.root().unwrap();
        assert_eq!(root.size, 13);
        let root_hash = root.root.unwrap();

        for i in 0..13 {
            let proof = log.proof(i).unwrap();
            assert_eq!(proof.root, root_hash);
            assert!(proof.verify());
            assert!(verify_inclusion_proof(&proof.leaf_hash, &proof.proof, &root_hash));
        }
        assert!(matches!(log.proof(13), Err(LogError::IndexOutOfRange { .. })));
    }

    #[test]
    fn root_matches_batch_build() {
        let log = TransparencyLog::in_memory(MerkleMode::Legacy);
        let hashes: Vec<String> = (0..6).map(bundle_hash).collect();
        for h in &hashes {
            log.add(h).unwrap();
        }
        let leaves: Vec<ContentHash> = hashes.iter().map(|h| leaf_hash_for(h).unwrap()).collect();
        assert_eq!(log.root().unwrap().root, build_root(&leaves));
    }

    #[test]
    fn leaf_is_hash_of_json_string() {
        let log = TransparencyLog::in_memory(MerkleMode::Legacy);
        let h = bundle_hash(1);
        let added = log.add(&h).unwrap();
        assert_eq!(added.leaf_hash, sha256(format!("\"{h}\"").as_bytes()));
    }

    #[test]
    fn invalid_bundle_hash_rejected() {
        let log = TransparencyLog::in_memory(MerkleMode::Legacy);
        let bare = bundle_hash(1).trim_start_matches("sha256:").to_string();
        let upper = bundle_hash(1).to_uppercase().replace("SHA256:", "sha256:");
        for bad in ["", "sha256:", "sha256:xyz", bare.as_str(), upper.as_str()] {
            assert!(matches!(log.add(bad), Err(LogError::InvalidBundleHash(_))), "{bad}");
        }
        assert_eq!(log.size().unwrap(), 0);
    }

    #[test]
    fn failed_append_leaves_log_unchanged() {
        let log = TransparencyLog::open(FlakyStore::default(), MerkleMode::Legacy).unwrap();
        log.add(&bundle_hash(0)).unwrap();
        let before = log.root().unwrap();

        log.store().failing.store(true, Ordering::SeqCst);
        assert!(matches!(log.add(&bundle_hash(1)), Err(LogError::Store(_))));
        assert_eq!(log.root().unwrap(), before);
        assert_eq!(log.store().len().unwrap(), 1);

        log.store().failing.store(false, Ordering::SeqCst);
        let added = log.add(&bundle_hash(2)).unwrap();
        assert_eq!(added.index, 1);
    }

    #[test]
    fn earlier_proofs_keep_verifying() {
        let log = TransparencyLog::in_memory(MerkleMode::Legacy);
        log.add(&bundle_hash(0)).unwrap();
        let early = log.proof(0).unwrap();
        log.add(&bundle_hash(1)).unwrap();

        // The earlier proof still checks against the root it was issued with.
        assert!(early.verify());
        assert_ne!(Some(early.root), log.root().unwrap().root);
        assert!(log.proof(0).unwrap().verify());
        assert_eq!(log.size().unwrap(), 2);
    }

    #[test]
    fn long_log_matches_batch_root() {
        let log = TransparencyLog::in_memory(MerkleMode::Legacy);
        let hashes: Vec<String> = (0..5_000).map(bundle_hash).collect();
        for h in &hashes {
            log.add(h).unwrap();
        }
        let leaves: Vec<ContentHash> = hashes.iter().map(|h| leaf_hash_for(h).unwrap()).collect();
        assert_eq!(log.root().unwrap().root, build_root(&leaves));
        assert!(log.proof(4_321).unwrap().verify());
    }

    #[test]
    fn concurrent_adds_get_unique_indexes() {
        let log = Arc::new(TransparencyLog::in_memory(MerkleMode::Legacy));
        let handles: Vec<_> = (0..8u64)
            .map(|t| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for i in 0..25u64 {
                        log.add(&bundle_hash(t * 1000 + i)).unwrap();
                        // Readers interleave with writers.
                        let root = log.root().unwrap();
                        assert!(root.size >= 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let entries = log.entries().unwrap();
        assert_eq!(entries.size, 200);
        for (i, entry) in entries.entries.iter().enumerate() {
            assert_eq!(entry.index, i as u64);
        }
        for i in (0..200).step_by(17) {
            assert!(log.proof(i).unwrap().verify());
        }
    }

    #[test]
    fn file_log_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig::file(dir.path().join("log.wal"));
        let root = {
            let log = TransparencyLog::from_config(&config).unwrap();
            for n in 0..5 {
                log.add(&bundle_hash(n)).unwrap();
            }
            log.root().unwrap()
        };

        let log = TransparencyLog::from_config(&config).unwrap();
        assert_eq!(log.root().unwrap(), root);
        let added = log.add(&bundle_hash(5)).unwrap();
        assert_eq!(added.index, 5);
    }

    #[test]
    fn damaged_file_is_refused_and_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.wal");
        let config = LogConfig::file(&path);
        {
            let log = TransparencyLog::from_config(&config).unwrap();
            for n in 0..5 {
                log.add(&bundle_hash(n)).unwrap();
            }
        }
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[..4].fill(0);
        std::fs::write(&path, &bytes).unwrap();

        assert!(matches!(
            TransparencyLog::from_config(&config),
            Err(LogError::IntegrityViolation { index: 0, .. })
        ));
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn one_writer_per_log_file() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig::file(dir.path().join("log.wal"));
        let first = TransparencyLog::from_config(&config).unwrap();
        assert!(matches!(
            TransparencyLog::from_config(&config),
            Err(LogError::Locked { .. })
        ));
        assert_eq!(first.add(&bundle_hash(0)).unwrap().index, 0);
        drop(first);

        let second = TransparencyLog::from_config(&config).unwrap();
        assert_eq!(second.add(&bundle_hash(1)).unwrap().index, 1);
        assert_eq!(second.size().unwrap(), 2);
    }

    #[test]
    fn non_contiguous_store_is_rejected() {
        let store = MemoryLogStore::new();
        let h = bundle_hash(0);
        store
            .append(&TransparencyLogEntry {
                index: 1,
                leaf_hash: leaf_hash_for(&h).unwrap(),
                bundle_hash: h,
                timestamp: "2025-01-01T00:00:00Z".into(),
            })
            .unwrap();
        assert!(matches!(
            TransparencyLog::open(store, MerkleMode::Legacy),
            Err(LogError::IntegrityViolation { index: 0, .. })
        ));
    }

    #[test]
    fn mismatched_leaf_is_rejected() {
        let store = MemoryLogStore::new();
        store
            .append(&TransparencyLogEntry {
                index: 0,
                leaf_hash: ContentHash::from_hash([0; 32]),
                bundle_hash: bundle_hash(0),
                timestamp: "2025-01-01T00:00:00Z".into(),
            })
            .unwrap();
        assert!(matches!(
            TransparencyLog::open(store, MerkleMode::Legacy),
            Err(LogError::IntegrityViolation { .. })
        ));
    }

    #[test]
    fn domain_separated_log() {
        let log = TransparencyLog::in_memory(MerkleMode::DomainSeparated);
        for n in 0..7 {
            log.add(&bundle_hash(n)).unwrap();
        }
        for i in 0..7 {
            let proof = log.proof(i).unwrap();
            assert_eq!(proof.mode, MerkleMode::DomainSeparated);
            assert!(proof.verify());
        }
    }

    #[test]
    fn serves_inclusion_evidence() {
        let log = TransparencyLog::in_memory(MerkleMode::Legacy);
        for n in 0..4 {
            log.add(&bundle_hash(n)).unwrap();
        }
        let evidence = log.inclusion_proof(&bundle_hash(2)).unwrap().unwrap();
        assert_eq!(evidence.leaf_hash, leaf_hash_for(&bundle_hash(2)).unwrap());
        assert!(dcp_crypto::verify_with_mode(
            evidence.mode,
            &evidence.leaf_hash,
            &evidence.proof,
            &evidence.root
        ));
        assert!(log.inclusion_proof(&bundle_hash(99)).unwrap().is_none());
    }

    proptest::proptest! {
        #[test]
        fn proofs_verify_for_any_size(n in 1u64..40, separated in proptest::bool::ANY) {
            let mode = if separated { MerkleMode::DomainSeparated } else { MerkleMode::Legacy };
            let log = TransparencyLog::in_memory(mode);
            for i in 0..n {
                log.add(&bundle_hash(i)).unwrap();
            }
            for i in 0..n {
                proptest::prop_assert!(log.proof(i).unwrap().verify());
            }
        }
    }
}
