//! Append-only transparency log for DCP bundle hashes.
//!
//! Each logged bundle hash becomes a Merkle leaf `hash(bundle_hash)`. The
//! log hands out the current root, inclusion proofs for any index and the
//! full entry list, in the bodies defined by [`wire`]. Entries live in a
//! [`LogStore`]: [`MemoryLogStore`] for tests and short-lived processes,
//! [`FileLogStore`] for a crash-recoverable append-only file.
//!
//! [`TransparencyLog`] also implements
//! [`dcp_verify::InclusionProofSource`], so a verifier can check bundle
//! inclusion against a local log directly.

pub mod config;
pub mod error;
pub mod file;
pub mod log;
pub mod memory;
pub mod traits;
pub mod wire;

pub use config::{LogConfig, SyncMode};
pub use error::{LogError, Result};
pub use file::FileLogStore;
pub use log::{leaf_hash_for, LogView, TransparencyLog};
pub use memory::MemoryLogStore;
pub use traits::LogStore;
pub use wire::{AddRequest, AddResponse, EntriesResponse, ErrorResponse, ProofResponse, RootResponse};
