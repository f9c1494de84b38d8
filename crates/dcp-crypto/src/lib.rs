//! Cryptographic engine for the Digital Citizenship Protocol.
//!
//! Provides canonical JSON serialization, SHA-256 content hashing, binary
//! Merkle trees with inclusion proofs, audit hash-chain verification, and
//! Ed25519 detached signatures.
//!
//! Everything here is pure and synchronous: no I/O, no shared mutable
//! state. All crypto operations wrap established libraries.

pub mod canonical;
pub mod chain;
pub mod hasher;
pub mod merkle;
pub mod signer;

pub use canonical::{canonical_string, canonicalize, canonicalize_value, CanonicalError};
pub use chain::{AuditChainVerifier, ChainError, ChainField, ChainLink};
pub use hasher::{
    bundle_hash, hash, hash_value, intent_hash, prev_hash_for_entry, sha256, HashResult,
};
pub use merkle::{
    build_inclusion_proof, build_root, merkle_root_for_audit_entries, verify_inclusion_proof,
    verify_with_mode, Direction, MerkleMode, MerkleProof, MerkleTree, ProofStep,
};
pub use signer::{
    generate_keypair, public_key_from_secret, sign, verify, Keypair, SignatureError, SigningKey,
    VerifyingKey,
};
