//! Binary Merkle trees over 32-byte leaf hashes, with inclusion proofs.
//!
//! Audit-entry roots and the transparency log both use [`MerkleMode::Legacy`].

use serde::{Deserialize, Serialize};

use dcp_types::ContentHash;

use crate::hasher::{hash, sha256, HashResult};

/// Side of a sibling in a proof path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

/// One step of an inclusion proof, leaf to root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    /// Sibling hash at this level.
    pub hash: ContentHash,
    /// Which side the sibling sits on.
    pub direction: Direction,
}

/// How leaves and interior nodes are hashed.
///
/// `Legacy` is the wire format every signed bundle uses: a node is the
/// SHA-256 of the two child digests concatenated, and a leaf is used as-is.
/// `DomainSeparated` prefixes leaves with `0x00` and nodes with `0x01`, so a
/// node can never be replayed as a leaf.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerkleMode {
    #[default]
    Legacy,
    DomainSeparated,
}

impl MerkleMode {
    fn leaf(self, leaf: ContentHash) -> ContentHash {
        match self {
            Self::Legacy => leaf,
            Self::DomainSeparated => {
                let mut buf = [0u8; 33];
                buf[1..].copy_from_slice(leaf.as_bytes());
                sha256(&buf)
            }
        }
    }

    fn node(self, left: &ContentHash, right: &ContentHash) -> ContentHash {
        let mut buf = Vec::with_capacity(65);
        if self == Self::DomainSeparated {
            buf.push(0x01);
        }
        buf.extend_from_slice(left.as_bytes());
        buf.extend_from_slice(right.as_bytes());
        sha256(&buf)
    }
}

/// Binary Merkle tree over 32-byte leaf hashes.
///
/// Odd levels pair their last node with itself. An empty tree has no root;
/// a single leaf is its own root in `Legacy` mode.
#[derive(Clone, Debug, Default)]
pub struct MerkleTree {
    mode: MerkleMode,
    /// Level 0 holds the (mode-hashed) leaves, the last level the root.
    levels: Vec<Vec<ContentHash>>,
}

impl MerkleTree {
    pub fn new(mode: MerkleMode) -> Self {
        Self {
            mode,
            levels: Vec::new(),
        }
    }

    /// Build a tree in one pass.
    pub fn from_leaves(mode: MerkleMode, leaves: &[ContentHash]) -> Self {
        if leaves.is_empty() {
            return Self::new(mode);
        }

        let mut current: Vec<ContentHash> = leaves.iter().map(|l| mode.leaf(*l)).collect();
        let mut levels = vec![current.clone()];

        while current.len() > 1 {
            let next: Vec<ContentHash> = current
                .chunks(2)
                .map(|pair| {
                    if pair.len() == 2 {
                        mode.node(&pair[0], &pair[1])
                    } else {
                        mode.node(&pair[0], &pair[0])
                    }
                })
                .collect();
            levels.push(next.clone());
            current = next;
        }

        Self { mode, levels }
    }

    /// Append one leaf, recomputing only the right edge of the tree.
    pub fn push(&mut self, leaf: ContentHash) {
        let node = self.mode.leaf(leaf);
        if self.levels.is_empty() {
            self.levels.push(vec![node]);
            return;
        }
        self.levels[0].push(node);

        let mut level = 0;
        while self.levels[level].len() > 1 {
            let nodes = &self.levels[level];
            let idx = nodes.len() - 1;
            let parent = if idx % 2 == 0 {
                self.mode.node(&nodes[idx], &nodes[idx])
            } else {
                self.mode.node(&nodes[idx - 1], &nodes[idx])
            };

            if self.levels.len() == level + 1 {
                self.levels.push(Vec::new());
            }
            let next = &mut self.levels[level + 1];
            let parent_idx = idx / 2;
            if parent_idx < next.len() {
                next[parent_idx] = parent;
            } else {
                next.push(parent);
            }
            level += 1;
        }
    }

    pub fn mode(&self) -> MerkleMode {
        self.mode
    }

    /// Root hash, `None` when empty.
    pub fn root(&self) -> Option<ContentHash> {
        self.levels.last().and_then(|top| top.first().copied())
    }

    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Sibling path for the leaf at `index`, or `None` if out of range.
    pub fn proof_path(&self, index: usize) -> Option<Vec<ProofStep>> {
        if index >= self.leaf_count() {
            return None;
        }

        let mut path = Vec::with_capacity(self.levels.len().saturating_sub(1));
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let (sibling_idx, direction) = if idx % 2 == 0 {
                (idx + 1, Direction::Right)
            } else {
                (idx - 1, Direction::Left)
            };
            let hash = level.get(sibling_idx).copied().unwrap_or(level[idx]);
            path.push(ProofStep { hash, direction });
            idx /= 2;
        }
        Some(path)
    }

    /// Full proof object for the leaf at `index`.
    pub fn proof(&self, index: usize, leaf: ContentHash) -> Option<MerkleProof> {
        let path = self.proof_path(index)?;
        Some(MerkleProof {
            mode: self.mode,
            leaf,
            path,
            root: self.root()?,
        })
    }
}

/// Self-contained inclusion proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    #[serde(default)]
    pub mode: MerkleMode,
    pub leaf: ContentHash,
    pub path: Vec<ProofStep>,
    pub root: ContentHash,
}

impl MerkleProof {
    pub fn verify(&self) -> bool {
        verify_with_mode(self.mode, &self.leaf, &self.path, &self.root)
    }
}

/// Root over `leaves` in `Legacy` mode.
pub fn build_root(leaves: &[ContentHash]) -> Option<ContentHash> {
    MerkleTree::from_leaves(MerkleMode::Legacy, leaves).root()
}

/// `Legacy` inclusion proof for `leaves[index]`.
pub fn build_inclusion_proof(leaves: &[ContentHash], index: usize) -> Option<Vec<ProofStep>> {
    MerkleTree::from_leaves(MerkleMode::Legacy, leaves).proof_path(index)
}

/// Recompute the `Legacy` root from `leaf` along `proof` and compare.
pub fn verify_inclusion_proof(leaf: &ContentHash, proof: &[ProofStep], root: &ContentHash) -> bool {
    verify_with_mode(MerkleMode::Legacy, leaf, proof, root)
}

pub fn verify_with_mode(
    mode: MerkleMode,
    leaf: &ContentHash,
    proof: &[ProofStep],
    root: &ContentHash,
) -> bool {
    let mut current = mode.leaf(*leaf);
    for step in proof {
        current = match step.direction {
            Direction::Left => mode.node(&step.hash, &current),
            Direction::Right => mode.node(&current, &step.hash),
        };
    }
    current == *root
}

/// Root over `hash(entry)` for each audit entry, `None` when there are none.
pub fn merkle_root_for_audit_entries<T: Serialize>(entries: &[T]) -> HashResult<Option<ContentHash>> {
    let leaves = entries.iter().map(hash).collect::<HashResult<Vec<_>>>()?;
    Ok(build_root(&leaves))
}
