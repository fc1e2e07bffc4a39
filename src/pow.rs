// Written in 2014 by Andrew Poelstra <apoelstra@wpsoftware.net>
// SPDX-License-Identifier: CC0-1.0

//! The height-based dispatcher over the four retargeters, the ASERT
//! anchor cache, and proof-of-work validation.

use std::sync::RwLock;

use crate::chain::BlockIndex;
use crate::compact;
use crate::consensus::Params;
use crate::error::Error;
use crate::hash::BlockHash256;
use crate::retarget::{asert, btc, lwma};

/// A single cached reference to the ASERT anchor block.
///
/// Every call past the ASERT activation height needs the same anchor
/// block, found by walking back from the tip to `asert_height`. Caching
/// it turns that walk from O(chain height) into O(1) after the first
/// call. The cache is invalidated by [`AnchorCache::reset`], which a host
/// node must call whenever a reorg rewrites history at or before the
/// anchor height.
pub struct AnchorCache<T> {
    anchor: RwLock<Option<T>>,
}

impl<T: BlockIndex> AnchorCache<T> {
    /// Creates an empty cache.
    pub fn new() -> AnchorCache<T> {
        AnchorCache { anchor: RwLock::new(None) }
    }

    /// Clears the cached anchor. Call this when a reorg changes history
    /// at or before the ASERT anchor height.
    pub fn reset(&self) {
        *self.anchor.write().unwrap() = None;
    }

    fn get(&self) -> Option<T> {
        self.anchor.read().unwrap().clone()
    }

    fn set(&self, anchor: T) {
        *self.anchor.write().unwrap() = Some(anchor);
    }
}

impl<T: BlockIndex> Default for AnchorCache<T> {
    fn default() -> AnchorCache<T> {
        AnchorCache::new()
    }
}

/// Computes the next compact target, dispatching on `tip.height() + 1`
/// among the four retargeters at the three configured activation
/// boundaries.
///
/// `candidate_time` is the timestamp of the block being built on top of
/// `tip`; only the BTC retargeter's testnet minimum-difficulty exception
/// reads it. `anchor_cache` must be the same cache across calls on a
/// given chain for ASERT's anchor lookup to be amortized.
pub fn get_next_work<T: BlockIndex>(
    tip: &T,
    candidate_time: i64,
    params: &Params,
    anchor_cache: &AnchorCache<T>,
) -> Result<u32, Error> {
    if params.no_retargeting {
        return Ok(tip.compact_bits());
    }

    let next_height = tip.height() + 1;

    if next_height > params.asert_height {
        let (bits, anchor) = asert::get_next_work(tip, params, anchor_cache.get())?;
        anchor_cache.set(anchor);
        Ok(bits)
    } else if next_height >= params.lwma_fix_height {
        lwma::get_next_work_v2(tip, params)
    } else if next_height >= params.lwma_height {
        lwma::get_next_work_v1(tip, params)
    } else {
        btc::get_next_work(tip, candidate_time, params)
    }
}

/// Validates a block's claimed proof of work against its hash.
///
/// Returns `false` if `claimed_bits` decodes to a negative or overflowing
/// target, a zero target, or a target above `params.pow_limit`; otherwise
/// returns whether `hash`, read as a 256-bit unsigned integer, is less
/// than or equal to the decoded target.
pub fn check_pow(hash: &BlockHash256, claimed_bits: u32, params: &Params) -> bool {
    let decoded = compact::decode(claimed_bits);
    if decoded.negative || decoded.overflow || decoded.target.is_zero() || decoded.target > params.pow_limit {
        return false;
    }
    hash.to_uint256() <= decoded.target
}
