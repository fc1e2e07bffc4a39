// Written in 2014 by Andrew Poelstra <apoelstra@wpsoftware.net>
// SPDX-License-Identifier: CC0-1.0

//! A read-only view over the parent-linked block index.
//!
//! The retargeters never own or mutate chain state; they only walk it.
//! `BlockIndex` is the seam a host node implements over its own block
//! index storage. `BlockRef` is a ready-made `Arc`-linked implementation,
//! suitable for tests and for small deployments that don't need a
//! database-backed index.

use std::sync::Arc;

#[cfg(feature = "serde")]
use actual_serde as serde;

/// A read-only entry in a parent-linked chain of block headers.
///
/// Implementors are cheap to `Clone` (typically a reference-counted
/// pointer) since retargeters walk backwards through many parents.
pub trait BlockIndex: Clone {
    /// This block's height. Genesis is height `0`; every other block's
    /// height is its parent's height plus one.
    fn height(&self) -> i64;
    /// This block's timestamp, UNIX seconds. Not guaranteed monotonic.
    fn time(&self) -> i64;
    /// This block's own compact-encoded target.
    fn compact_bits(&self) -> u32;
    /// The parent block, or `None` at genesis.
    fn parent(&self) -> Option<Self>;
}

/// Walks back `n` parents from `tip`. Returns `None` if the walk runs
/// past genesis before taking `n` steps.
pub fn walk_back<T: BlockIndex>(tip: &T, n: u64) -> Option<T> {
    let mut cur = tip.clone();
    for _ in 0..n {
        cur = cur.parent()?;
    }
    Some(cur)
}

struct Node {
    height: i64,
    time: i64,
    compact_bits: u32,
    parent: Option<BlockRef>,
}

/// An owned, `Arc`-linked chain entry: a ready-made `BlockIndex`.
///
/// Cloning a `BlockRef` clones the `Arc`, not the chain behind it, so
/// walking parents is O(1) per step regardless of how many clones exist.
#[derive(Clone)]
pub struct BlockRef(Arc<Node>);

impl BlockRef {
    /// Constructs a genesis block (height 0, no parent).
    pub fn genesis(time: i64, compact_bits: u32) -> BlockRef {
        BlockRef(Arc::new(Node { height: 0, time, compact_bits, parent: None }))
    }

    /// Constructs the block that follows `self` in the chain.
    pub fn child(&self, time: i64, compact_bits: u32) -> BlockRef {
        BlockRef(Arc::new(Node {
            height: self.0.height + 1,
            time,
            compact_bits,
            parent: Some(self.clone()),
        }))
    }
}

impl BlockIndex for BlockRef {
    fn height(&self) -> i64 {
        self.0.height
    }

    fn time(&self) -> i64 {
        self.0.time
    }

    fn compact_bits(&self) -> u32 {
        self.0.compact_bits
    }

    fn parent(&self) -> Option<BlockRef> {
        self.0.parent.clone()
    }
}
