//! Publisher side of a channel.

use std::ops::Range;
use std::sync::Arc;

use iota_merkle::{MerkleTree, Seed};
use iota_trinary::{trytes, Digest, Security, Trit};
use tracing::debug;

use crate::config::ChannelConfig;
use crate::errors::{MamError, Result};
use crate::mam;
use crate::mode::Mode;

/// A message ready to be attached to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    /// Masked, signed blob.
    pub payload: Vec<Trit>,
    pub root: Digest,
    pub next_root: Digest,
    /// Ledger address the blob belongs at.
    pub address: Digest,
    /// Absolute leaf that signed the blob.
    pub leaf_index: usize,
}

impl Published {
    pub fn payload_trytes(&self) -> Result<String> {
        Ok(trytes::trytes_from_trits(&self.payload)?)
    }
}

/// Snapshot of a channel between publishes.
///
/// Publishing never mutates a state; it returns the successor. Each state
/// signs with the first leaf of its window, so publishing twice from the
/// same snapshot reuses a one-time key and must be avoided by the caller.
/// The later leaves of a window are never used to sign: they only widen the
/// tree, and the successor's window starts after all of them.
#[derive(Clone)]
pub struct ChannelState {
    seed: Seed,
    security: Security,
    mode: Mode,
    start: usize,
    count: usize,
    next_count: usize,
    tree: Arc<MerkleTree>,
}

impl ChannelState {
    /// Public channel with one leaf per window, starting at leaf `start`.
    pub fn init(seed: Seed, security: Security, start: usize) -> Result<Self> {
        Self::with_window(seed, security, start, 1, 1)
    }

    pub fn with_window(
        seed: Seed,
        security: Security,
        start: usize,
        count: usize,
        next_count: usize,
    ) -> Result<Self> {
        if next_count == 0 {
            return Err(MamError::InvalidParameters(
                "next leaf count must be positive".into(),
            ));
        }
        let tree = MerkleTree::build(&seed, start, count, security)?;
        Ok(ChannelState {
            seed,
            security,
            mode: Mode::Public,
            start,
            count,
            next_count,
            tree: Arc::new(tree),
        })
    }

    pub fn from_config(seed: Seed, config: &ChannelConfig) -> Result<Self> {
        let security = Security::new(config.security)?;
        Self::with_window(seed, security, config.start, config.count, config.next_count)
    }

    /// Same window, read and written under `mode`.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn root(&self) -> &Digest {
        self.tree.root()
    }

    /// Where the next message will be stored.
    pub fn address(&self) -> Digest {
        self.mode.address(self.tree.root())
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn security(&self) -> Security {
        self.security
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn next_count(&self) -> usize {
        self.next_count
    }

    /// Leaves covered by the current tree.
    pub fn window(&self) -> Range<usize> {
        self.start..self.start + self.count
    }

    pub fn publish(&self, payload: &[Trit]) -> Result<(Published, ChannelState)> {
        let next_start = self.start.checked_add(self.count).ok_or_else(|| {
            MamError::ResourceExhausted(format!("leaf index space exhausted after {}", self.start))
        })?;
        let next_tree = MerkleTree::build(&self.seed, next_start, self.next_count, self.security)?;
        let branch = self.tree.branch(self.start)?;

        let blob = mam::encode(
            &self.seed,
            payload,
            self.mode.side_key(),
            self.tree.root(),
            branch.siblings(),
            next_tree.root(),
            self.start,
            branch.leaf_index(),
            self.security,
        )?;
        let published = Published {
            payload: blob,
            root: *self.tree.root(),
            next_root: *next_tree.root(),
            address: self.address(),
            leaf_index: branch.index(),
        };
        debug!(
            mode = %self.mode,
            leaf = published.leaf_index,
            root = %published.root,
            next_root = %published.next_root,
            "published message"
        );

        let next = ChannelState {
            seed: self.seed.clone(),
            security: self.security,
            mode: self.mode.clone(),
            start: next_start,
            count: self.next_count,
            next_count: self.next_count,
            tree: Arc::new(next_tree),
        };
        Ok((published, next))
    }
}

impl std::fmt::Debug for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelState")
            .field("mode", &self.mode)
            .field("security", &self.security)
            .field("window", &self.window())
            .field("next_count", &self.next_count)
            .field("root", self.root())
            .finish_non_exhaustive()
    }
}
