// Written in 2014 by Andrew Poelstra <apoelstra@wpsoftware.net>
// SPDX-License-Identifier: CC0-1.0

//! The linearly weighted moving average retargeter, in its original (v1)
//! and stabilized (v2) forms.
//!
//! Both walk the last `N` blocks and compute a solvetime-weighted target
//! adjustment, giving more weight to recent blocks. v1 anchors the
//! adjustment to the tip's own target, which feeds its own output back
//! into the next block's computation and can oscillate under a sudden
//! hashrate change; v2 anchors to the target fixed at the start of the
//! window instead, breaking that feedback loop.

use crate::chain::{walk_back, BlockIndex};
use crate::compact;
use crate::consensus::Params;
use crate::error::Error;
use crate::retarget::clamp_i64;
use crate::uint::Uint256;

/// Computes the next compact target under LWMA v1.
pub fn get_next_work_v1<T: BlockIndex>(tip: &T, params: &Params) -> Result<u32, Error> {
    let blocks = window_blocks(tip, params);
    if blocks < 3 {
        return Ok(tip.compact_bits());
    }
    let anchor_target = compact::decode(tip.compact_bits()).target;
    weighted_retarget(tip, anchor_target, blocks, params.pow_target_spacing, 10, params.pow_limit)
}

/// Computes the next compact target under LWMA v2 (stabilized).
pub fn get_next_work_v2<T: BlockIndex>(tip: &T, params: &Params) -> Result<u32, Error> {
    let blocks = window_blocks(tip, params);
    if blocks < 3 {
        return Ok(tip.compact_bits());
    }
    let window_start = walk_back(tip, blocks).ok_or(Error::MissingParentForRetarget)?;
    let anchor_target = compact::decode(window_start.compact_bits()).target;
    weighted_retarget(tip, anchor_target, blocks, params.pow_target_spacing, 3, params.pow_limit)
}

/// The number of blocks available for the averaging window: capped by
/// `lwma_window`, but shorter while the chain is still cold-starting just
/// above `lwma_height`.
fn window_blocks<T: BlockIndex>(tip: &T, params: &Params) -> u64 {
    let since_start = tip.height() + 1 - params.lwma_height;
    if since_start < 0 {
        0
    } else {
        core::cmp::min(params.lwma_window as i64, since_start) as u64
    }
}

/// The solvetime-weighted retarget shared by v1 and v2; they differ only
/// in which target anchors the adjustment and how tight the cap is.
fn weighted_retarget<T: BlockIndex>(
    tip: &T,
    anchor_target: Uint256,
    blocks: u64,
    spacing: u64,
    cap: u64,
    pow_limit: Uint256,
) -> Result<u32, Error> {
    let max_solvetime = 6 * spacing as i64;

    let mut sum_ws: i64 = 0;
    let mut child = tip.clone();
    for i in (1..=blocks).rev() {
        let parent = child.parent().ok_or(Error::MissingParentForRetarget)?;
        let solvetime = clamp_i64(child.time() - parent.time(), 1, max_solvetime);
        sum_ws += solvetime * i as i64;
        child = parent;
    }

    let sum_w = (blocks * (blocks + 1) / 2) as i64;
    let expected = sum_w * spacing as i64;
    let sum_ws = clamp_i64(sum_ws, expected / cap as i64, expected * cap as i64) as u64;

    // `anchor_target * sum_ws` can need more than 256 bits when the anchor
    // sits near `pow_limit` and the window's solvetimes are clamped to the
    // cap, overflowing `mul_u64`'s 256-bit result. Shift the anchor right
    // first and the final product back left by the same amount, the same
    // guard `retarget::btc` applies around its own target multiply.
    let rhs_bits = 64 - sum_ws.leading_zeros();
    let shift = (anchor_target.bits() + rhs_bits).saturating_sub(256);

    let scaled = if shift > 0 { anchor_target.shr(shift) } else { anchor_target };
    let mut next_target = scaled.mul_u64(sum_ws).div_u64(expected as u64);
    if shift > 0 {
        next_target = next_target.shl(shift);
    }

    Ok(compact::encode(&next_target.clamp_nonzero(pow_limit)))
}
