//! Taproot script trees (BIP 341)
//!
//! A script tree is a binary Merkle tree whose leaves are tapscripts. Interior
//! nodes hash their children in lexicographic order, so the root only depends
//! on the set of siblings at each level, not on which side they were placed.
//!
//! ```text
//! leaf_hash   = tagged_hash("TapLeaf",   leaf_version || compact_size(len) || script)
//! branch_hash = tagged_hash("TapBranch", min(a, b) || max(a, b))
//! ```
//!
//! Leaves are indexed left to right starting at 0; that index selects the leaf
//! whose Merkle proof goes into a control block.

use crate::constants::TAPROOT_CONTROL_MAX_NODE_COUNT;
use crate::crypto::tagged::{tap_hash, TapTag};
use crate::error::{Result, TaprootError};
use crate::serialization::encode_varint;
use crate::types::{Hash, ScriptLeaf};

/// Sibling hashes from a leaf up to the root, bottom first
pub type MerkleProof = Vec<Hash>;

/// Immutable Taproot script tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScriptTree {
    Leaf(ScriptLeaf),
    Branch(Box<Branch>),
}

/// Interior node of a [`ScriptTree`]
///
/// Only constructible through [`ScriptTree::branch`], which enforces the
/// 128-level depth limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Branch {
    left: ScriptTree,
    right: ScriptTree,
    depth: usize,
    leaf_count: usize,
}

impl Branch {
    pub fn left(&self) -> &ScriptTree {
        &self.left
    }

    pub fn right(&self) -> &ScriptTree {
        &self.right
    }
}

impl ScriptTree {
    pub fn leaf(leaf: ScriptLeaf) -> Self {
        ScriptTree::Leaf(leaf)
    }

    /// Join two subtrees under a new interior node
    pub fn branch(left: ScriptTree, right: ScriptTree) -> Result<Self> {
        let depth = 1 + left.depth().max(right.depth());
        if depth > TAPROOT_CONTROL_MAX_NODE_COUNT {
            return Err(TaprootError::InvalidTreeStructure(
                format!("tree depth {depth} exceeds {TAPROOT_CONTROL_MAX_NODE_COUNT}").into(),
            ));
        }
        let leaf_count = left.leaf_count() + right.leaf_count();
        Ok(ScriptTree::Branch(Box::new(Branch {
            left,
            right,
            depth,
            leaf_count,
        })))
    }

    /// Build a balanced tree from an ordered list of leaves
    ///
    /// The list is split recursively with the left half taking `ceil(n / 2)`
    /// leaves, so leaf indices follow the input order.
    pub fn balanced(leaves: Vec<ScriptLeaf>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(TaprootError::InvalidTreeStructure(
                "cannot build a script tree without leaves".into(),
            ));
        }
        let mut leaves = leaves;
        Self::balanced_inner(&mut leaves)
    }

    fn balanced_inner(leaves: &mut Vec<ScriptLeaf>) -> Result<Self> {
        if leaves.len() == 1 {
            return Ok(ScriptTree::Leaf(leaves.remove(0)));
        }
        let mut right = leaves.split_off(leaves.len().div_ceil(2));
        let left = Self::balanced_inner(leaves)?;
        let right = Self::balanced_inner(&mut right)?;
        ScriptTree::branch(left, right)
    }

    /// Build a tree from leaves listed depth-first with their depths
    ///
    /// `[(1, a), (2, b), (2, c)]` yields `Branch(a, Branch(b, c))`. The depths
    /// must describe a full binary tree.
    pub fn from_depth_first(items: &[(u8, ScriptLeaf)]) -> Result<Self> {
        if items.is_empty() {
            return Err(TaprootError::InvalidTreeStructure(
                "cannot build a script tree without leaves".into(),
            ));
        }
        if let Some((depth, _)) = items
            .iter()
            .find(|(depth, _)| *depth as usize > TAPROOT_CONTROL_MAX_NODE_COUNT)
        {
            return Err(TaprootError::InvalidTreeStructure(
                format!("leaf depth {depth} exceeds {TAPROOT_CONTROL_MAX_NODE_COUNT}").into(),
            ));
        }

        let mut pos = 0;
        let tree = Self::depth_first_inner(items, &mut pos, 0)?;
        if pos != items.len() {
            return Err(TaprootError::InvalidTreeStructure(
                "leaf depths leave unused leaves".into(),
            ));
        }
        Ok(tree)
    }

    fn depth_first_inner(items: &[(u8, ScriptLeaf)], pos: &mut usize, depth: u8) -> Result<Self> {
        let (leaf_depth, leaf) = items.get(*pos).ok_or_else(|| {
            TaprootError::InvalidTreeStructure("leaf depths leave an incomplete branch".into())
        })?;

        if *leaf_depth == depth {
            *pos += 1;
            return Ok(ScriptTree::Leaf(leaf.clone()));
        }
        if *leaf_depth < depth {
            return Err(TaprootError::InvalidTreeStructure(
                "leaf depths leave an incomplete branch".into(),
            ));
        }

        let left = Self::depth_first_inner(items, pos, depth + 1)?;
        let right = Self::depth_first_inner(items, pos, depth + 1)?;
        ScriptTree::branch(left, right)
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        match self {
            ScriptTree::Leaf(_) => 1,
            ScriptTree::Branch(branch) => branch.leaf_count,
        }
    }

    /// Length of the longest root-to-leaf path (0 for a single leaf)
    pub fn depth(&self) -> usize {
        match self {
            ScriptTree::Leaf(_) => 0,
            ScriptTree::Branch(branch) => branch.depth,
        }
    }

    /// Leaves in index order
    pub fn leaves(&self) -> Vec<&ScriptLeaf> {
        let mut out = Vec::with_capacity(self.leaf_count());
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a ScriptLeaf>) {
        match self {
            ScriptTree::Leaf(leaf) => out.push(leaf),
            ScriptTree::Branch(branch) => {
                branch.left.collect_leaves(out);
                branch.right.collect_leaves(out);
            }
        }
    }

    /// Index of the first leaf with this script and version
    pub fn find_leaf(&self, script: &[u8], leaf_version: u8) -> Option<usize> {
        self.leaves()
            .iter()
            .position(|leaf| leaf.script() == script && leaf.leaf_version() == leaf_version)
    }
}

/// TapLeaf hash of a script under a given leaf version
pub fn tap_leaf_hash(leaf_version: u8, script: &[u8]) -> Hash {
    let length_prefix = encode_varint(script.len() as u64);
    tap_hash(
        TapTag::TapLeaf,
        &[&[leaf_version][..], length_prefix.as_slice(), script],
    )
}

/// TapLeaf hash of a [`ScriptLeaf`]
pub fn leaf_hash(leaf: &ScriptLeaf) -> Hash {
    tap_leaf_hash(leaf.leaf_version(), leaf.script())
}

/// TapBranch hash of two child hashes; commutative
pub fn branch_hash(a: &Hash, b: &Hash) -> Hash {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    tap_hash(TapTag::TapBranch, &[&lo[..], &hi[..]])
}

/// Merkle root of a script tree; a single leaf's root is its leaf hash
pub fn compute_merkle_root(tree: &ScriptTree) -> Hash {
    match tree {
        ScriptTree::Leaf(leaf) => leaf_hash(leaf),
        ScriptTree::Branch(branch) => branch_hash(
            &compute_merkle_root(&branch.left),
            &compute_merkle_root(&branch.right),
        ),
    }
}

/// Merkle proof for the leaf at `leaf_index`
pub fn compute_proof(tree: &ScriptTree, leaf_index: usize) -> Result<MerkleProof> {
    if leaf_index >= tree.leaf_count() {
        return Err(TaprootError::InvalidLeafIndex {
            index: leaf_index,
            leaf_count: tree.leaf_count(),
        });
    }

    let mut proof = Vec::with_capacity(tree.depth());
    let mut cursor = 0;
    let (_, found) = prove(tree, leaf_index, &mut cursor, &mut proof);
    debug_assert!(found);
    debug_assert!(proof.len() <= TAPROOT_CONTROL_MAX_NODE_COUNT);
    Ok(proof)
}

/// Returns the subtree hash and whether the target leaf lives in it.
/// Siblings are pushed on the way back up, giving bottom-to-top order.
fn prove(node: &ScriptTree, target: usize, cursor: &mut usize, proof: &mut MerkleProof) -> (Hash, bool) {
    match node {
        ScriptTree::Leaf(leaf) => {
            let hit = *cursor == target;
            *cursor += 1;
            (leaf_hash(leaf), hit)
        }
        ScriptTree::Branch(branch) => {
            let (left, in_left) = prove(&branch.left, target, cursor, proof);
            let (right, in_right) = prove(&branch.right, target, cursor, proof);
            if in_left {
                proof.push(right);
            } else if in_right {
                proof.push(left);
            }
            (branch_hash(&left, &right), in_left || in_right)
        }
    }
}

/// Fold a leaf hash up through its proof to the candidate Merkle root
pub fn compute_root_from_proof(leaf_hash: Hash, proof: &[Hash]) -> Hash {
    proof
        .iter()
        .fold(leaf_hash, |node, sibling| branch_hash(&node, sibling))
}
