use iota_trinary::curl::{CpuCurl, Curl};
use iota_trinary::{Digest, Security, Trit};
use tracing::debug;

use crate::{leaf_address, MerkleError, Result, Seed};

/// Largest window a single tree may cover.
pub const MAX_LEAF_COUNT: usize = 1 << 20;
/// Depth of a tree holding [`MAX_LEAF_COUNT`] leaves.
pub const MAX_DEPTH: usize = 20;

// "NODE"
const NODE_DOMAIN: [Trit; 12] = [-1, -1, -1, 0, -1, -1, 1, 1, 0, -1, -1, 1];

/// Number of levels above the leaves, `ceil(log2(count))`.
#[inline]
pub fn depth(count: usize) -> usize {
    if count <= 1 {
        0
    } else {
        (usize::BITS - (count - 1).leading_zeros()) as usize
    }
}

fn node<C: Curl>(left: &Digest, right: &Digest) -> Digest {
    let mut curl = C::default();
    curl.absorb(&NODE_DOMAIN);
    curl.absorb(left.trits());
    curl.absorb(right.trits());
    // The rate is always a full hash of valid trits.
    Digest::from_trits(curl.rate()).unwrap_or(Digest::EMPTY)
}

/// Root reached from `address` at window offset `leaf_index` through
/// `siblings`, lowest level first.
pub fn recompute_root<C: Curl>(address: &Digest, siblings: &[Digest], leaf_index: usize) -> Digest {
    siblings
        .iter()
        .enumerate()
        .fold(*address, |out, (level, sibling)| {
            if leaf_index.checked_shr(level as u32).unwrap_or(0) & 1 == 0 {
                node::<C>(&out, sibling)
            } else {
                node::<C>(sibling, &out)
            }
        })
}

/// Authentication path for one leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    index: usize,
    leaf_index: usize,
    siblings: Vec<Digest>,
}

impl Branch {
    /// Absolute leaf index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Offset of the leaf inside its window.
    pub fn leaf_index(&self) -> usize {
        self.leaf_index
    }

    pub fn siblings(&self) -> &[Digest] {
        &self.siblings
    }
}

/// Balanced binary tree over the leaves `[start, start + count)` of a seed.
///
/// A level with an odd number of nodes pairs its last node with
/// [`Digest::EMPTY`].
#[derive(Clone)]
pub struct MerkleTree {
    start: usize,
    security: Security,
    root: Digest,
    levels: Vec<Vec<Digest>>,
}

impl MerkleTree {
    pub fn build(seed: &Seed, start: usize, count: usize, security: Security) -> Result<Self> {
        if count == 0 {
            return Err(MerkleError::InvalidParameters(
                "leaf count must be positive".into(),
            ));
        }
        if count > MAX_LEAF_COUNT {
            return Err(MerkleError::ResourceExhausted(format!(
                "{count} leaves exceeds the limit of {MAX_LEAF_COUNT}"
            )));
        }
        let end = start.checked_add(count).ok_or_else(|| {
            MerkleError::ResourceExhausted(format!("leaf window {start}+{count} overflows"))
        })?;

        let mut leaves = Vec::new();
        leaves
            .try_reserve_exact(count)
            .map_err(|e| MerkleError::ResourceExhausted(e.to_string()))?;
        for index in start..end {
            leaves.push(leaf_address(seed, index, security)?);
        }

        let depth = depth(count);
        let mut levels = Vec::with_capacity(depth + 1);
        let mut current = leaves;
        for _ in 0..depth {
            let above = current
                .chunks(2)
                .map(|pair| node::<CpuCurl>(&pair[0], pair.get(1).unwrap_or(&Digest::EMPTY)))
                .collect();
            levels.push(current);
            current = above;
        }
        let root = current[0];
        levels.push(current);

        debug!(start, count, depth, %root, "built merkle tree");
        Ok(MerkleTree {
            start,
            security,
            root,
            levels,
        })
    }

    pub fn root(&self) -> &Digest {
        &self.root
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn count(&self) -> usize {
        self.levels[0].len()
    }

    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn security(&self) -> Security {
        self.security
    }

    fn offset(&self, index: usize) -> Result<usize> {
        let end = self.start + self.count();
        if index < self.start || index >= end {
            return Err(MerkleError::IndexOutOfRange {
                index,
                start: self.start,
                end,
            });
        }
        Ok(index - self.start)
    }

    /// Address of the absolute leaf `index`.
    pub fn address(&self, index: usize) -> Result<&Digest> {
        let offset = self.offset(index)?;
        Ok(&self.levels[0][offset])
    }

    /// Siblings from the absolute leaf `index` up to the root.
    pub fn branch(&self, index: usize) -> Result<Branch> {
        let leaf_index = self.offset(index)?;
        let siblings = self.levels[..self.depth()]
            .iter()
            .enumerate()
            .map(|(level, nodes)| {
                nodes
                    .get((leaf_index >> level) ^ 1)
                    .copied()
                    .unwrap_or(Digest::EMPTY)
            })
            .collect();
        Ok(Branch {
            index,
            leaf_index,
            siblings,
        })
    }
}

impl std::fmt::Debug for MerkleTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerkleTree")
            .field("start", &self.start)
            .field("count", &self.count())
            .field("security", &self.security)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::OnceLock;

    fn seed() -> Seed {
        "ABCDEFGHIJKLMNOPQRSTUVWXYZ9".repeat(3).parse().unwrap()
    }

    fn five_leaves() -> &'static MerkleTree {
        static TREE: OnceLock<MerkleTree> = OnceLock::new();
        TREE.get_or_init(|| MerkleTree::build(&seed(), 3, 5, Security::LOW).unwrap())
    }

    #[test]
    fn depth_is_ceil_log2() {
        assert_eq!(depth(1), 0);
        assert_eq!(depth(2), 1);
        assert_eq!(depth(3), 2);
        assert_eq!(depth(4), 2);
        assert_eq!(depth(5), 3);
        assert_eq!(depth(MAX_LEAF_COUNT), MAX_DEPTH);
    }

    #[test]
    fn every_branch_leads_to_the_root() {
        let tree = five_leaves();
        assert_eq!(tree.depth(), 3);
        for index in 3..8 {
            let branch = tree.branch(index).unwrap();
            assert_eq!(branch.siblings().len(), 3);
            assert_eq!(branch.leaf_index(), index - 3);
            let root = recompute_root::<CpuCurl>(
                tree.address(index).unwrap(),
                branch.siblings(),
                branch.leaf_index(),
            );
            assert_eq!(&root, tree.root(), "leaf {index}");
        }
    }

    #[test]
    fn odd_levels_pad_with_empty() {
        let tree = five_leaves();
        // The fifth leaf has no neighbour on the lowest two levels.
        let branch = tree.branch(7).unwrap();
        assert_eq!(branch.siblings()[0], Digest::EMPTY);
        assert_eq!(branch.siblings()[1], Digest::EMPTY);
        assert_ne!(branch.siblings()[2], Digest::EMPTY);
    }

    #[test]
    fn wrong_position_or_address_misses_the_root() {
        let tree = five_leaves();
        let branch = tree.branch(4).unwrap();
        let address = tree.address(4).unwrap();
        assert_ne!(
            &recompute_root::<CpuCurl>(address, branch.siblings(), 0),
            tree.root()
        );
        assert_ne!(
            &recompute_root::<CpuCurl>(tree.address(5).unwrap(), branch.siblings(), 1),
            tree.root()
        );
    }

    #[test]
    fn leaves_match_standalone_derivation() {
        let tree = five_leaves();
        assert_eq!(
            tree.address(6).unwrap(),
            &leaf_address(&seed(), 6, Security::LOW).unwrap()
        );
    }

    #[test]
    fn branch_outside_window_is_rejected() {
        let tree = five_leaves();
        assert_eq!(
            tree.branch(2),
            Err(MerkleError::IndexOutOfRange {
                index: 2,
                start: 3,
                end: 8
            })
        );
        assert!(matches!(
            tree.address(8),
            Err(MerkleError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn invalid_windows_are_rejected() {
        assert!(matches!(
            MerkleTree::build(&seed(), 0, 0, Security::LOW),
            Err(MerkleError::InvalidParameters(_))
        ));
        assert!(matches!(
            MerkleTree::build(&seed(), 0, MAX_LEAF_COUNT + 1, Security::LOW),
            Err(MerkleError::ResourceExhausted(_))
        ));
        assert!(matches!(
            MerkleTree::build(&seed(), usize::MAX, 2, Security::LOW),
            Err(MerkleError::ResourceExhausted(_))
        ));
    }

    #[test]
    fn single_leaf_tree_roots_at_its_address() {
        let tree = MerkleTree::build(&seed(), 9, 1, Security::LOW).unwrap();
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.root(), tree.address(9).unwrap());
        assert!(tree.branch(9).unwrap().siblings().is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(4))]

        #[test]
        fn build_is_deterministic_and_verifiable(
            start in 0usize..10_000,
            count in 1usize..5,
            level in 1u8..=3,
        ) {
            let security = Security::new(level).unwrap();
            let a = MerkleTree::build(&seed(), start, count, security).unwrap();
            let b = MerkleTree::build(&seed(), start, count, security).unwrap();
            prop_assert_eq!(a.root(), b.root());
            prop_assert_eq!(a.security(), security);
            for index in start..start + count {
                let branch = a.branch(index).unwrap();
                let root = recompute_root::<CpuCurl>(
                    a.address(index).unwrap(),
                    branch.siblings(),
                    branch.leaf_index(),
                );
                prop_assert_eq!(&root, a.root());
            }
        }
    }
}
