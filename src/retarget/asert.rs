// Written in 2014 by Andrew Poelstra <apoelstra@wpsoftware.net>
// SPDX-License-Identifier: CC0-1.0

//! The absolutely scheduled exponentially rising targeting (ASERT)
//! retargeter.
//!
//! Unlike the windowed algorithms, each block's target depends only on
//! how far the chain has drifted from its expected schedule since a
//! single fixed anchor block, never on a recent window. That makes it
//! immune to the oscillation a windowed average can fall into under a
//! sudden hashrate change, and lets every block be retargeted
//! individually rather than only at a handful of chosen heights.

use crate::chain::{walk_back, BlockIndex};
use crate::compact;
use crate::consensus::Params;
use crate::error::Error;
use crate::uint::Uint256;

/// The cubic fixed-point coefficients approximating `2^(f/65536)` for
/// `f` in `[0, 65536)`, scaled so the whole expression lands in `Q16.48`
/// before the final `>> 48`. Consensus-critical; never adjust these.
const COEFF_1: i128 = 195_766_423_245_049;
const COEFF_2: i128 = 971_821_376;
const COEFF_3: i128 = 5_127;
const ROUNDING: i128 = 1i128 << 47;

/// Computes the next compact target under ASERT.
///
/// `anchor` is the cached anchor block (height `asert_height`) if known;
/// callers own the cache and pass `None` on a miss, in which case this
/// walks the chain to find it. See [`crate::pow::AnchorCache`].
pub fn get_next_work<T: BlockIndex>(
    tip: &T,
    params: &Params,
    anchor: Option<T>,
) -> Result<(u32, T), Error> {
    let next_height = tip.height() + 1;
    let anchor = match anchor {
        Some(a) if a.height() == params.asert_height => a,
        _ => {
            let steps = (tip.height() - params.asert_height) as u64;
            walk_back(tip, steps).ok_or(Error::MissingAsertAnchor)?
        }
    };
    let anchor_parent = anchor.parent().ok_or(Error::MissingAsertAnchor)?;

    let anchor_target = compact::decode(params.asert_anchor_bits).target;
    let time_delta = tip.time() - anchor_parent.time();
    let height_delta = next_height - params.asert_height;

    let exponent_fp = exponent_fixed_point(
        time_delta,
        height_delta,
        params.pow_target_spacing as i64,
        params.asert_half_life as i64,
    );
    let (shifts, factor) = factor_from_exponent(exponent_fp);

    let next_target = apply_factor_and_shift(anchor_target, factor, shifts, params.pow_limit);
    Ok((compact::encode(&next_target), anchor))
}

/// `((time_delta - T*height_delta) * 65536) / half_life`, truncated
/// toward zero, in signed 64-bit arithmetic widened through `i128` to
/// avoid intermediate overflow.
fn exponent_fixed_point(time_delta: i64, height_delta: i64, spacing: i64, half_life: i64) -> i128 {
    let deviation = time_delta as i128 - spacing as i128 * height_delta as i128;
    (deviation * 65536) / half_life as i128
}

/// Splits a Q16 fixed-point exponent into an integer shift count and a
/// fractional part guaranteed to land in `[0, 65536)`, then computes the
/// cubic approximation factor for that fraction.
fn factor_from_exponent(exponent_fp: i128) -> (i64, i64) {
    let (shifts, frac) = if exponent_fp >= 0 {
        (exponent_fp >> 16, exponent_fp & 0xffff)
    } else {
        let abs = -exponent_fp;
        let whole = abs >> 16;
        let rem = abs & 0xffff;
        if rem != 0 {
            (-(whole + 1), 65536 - rem)
        } else {
            (-whole, 0)
        }
    };

    let factor = if frac == 0 {
        65536
    } else {
        let f = frac;
        let numerator = COEFF_1 * f + COEFF_2 * f * f + COEFF_3 * f * f * f + ROUNDING;
        65536 + (numerator >> 48)
    };

    (shifts as i64, factor as i64)
}

/// Multiplies the anchor target by `factor / 65536`, applies the integer
/// `shifts`, floors the result at `1`, and clamps to `pow_limit`.
fn apply_factor_and_shift(anchor_target: Uint256, factor: i64, shifts: i64, pow_limit: Uint256) -> Uint256 {
    if shifts >= 256 {
        return pow_limit;
    }
    if shifts <= -256 {
        return Uint256::ONE;
    }

    // `anchor_target * factor` can need more than 256 bits when the anchor
    // sits near `pow_limit` (factor is up to ~17 bits). Same guard as
    // `retarget::btc`/`retarget::lwma`: shift the anchor right first and
    // undo it with a final left shift once the scaling is done.
    let factor_bits = 64 - (factor as u64).leading_zeros();
    let guard = (anchor_target.bits() + factor_bits).saturating_sub(256);
    let base = if guard > 0 { anchor_target.shr(guard) } else { anchor_target };

    let scaled = base.mul_u64(factor as u64).shr(16);
    let shifted = if shifts >= 0 {
        scaled.shl(shifts as u32)
    } else {
        scaled.shr((-shifts) as u32)
    };
    let restored = if guard > 0 { shifted.shl(guard) } else { shifted };

    restored.clamp_nonzero(pow_limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::BlockRef;
    use crate::consensus::{Network, Params};

    fn asert_params() -> Params {
        let mut p = Params::new(Network::Mainnet);
        p.lwma_height = 0;
        p.lwma_fix_height = 0;
        p.asert_height = 100;
        p.asert_anchor_bits = 0x1d00ffff;
        p.asert_half_life = 2 * 24 * 60 * 60;
        p
    }

    fn chain_to_height(genesis_time: i64, spacing: i64, bits: u32, height: i64) -> BlockRef {
        let mut tip = BlockRef::genesis(genesis_time, bits);
        for h in 1..=height {
            tip = tip.child(genesis_time + h * spacing, bits);
        }
        tip
    }

    #[test]
    fn exact_schedule_reproduces_anchor_bits() {
        let params = asert_params();
        let spacing = params.pow_target_spacing as i64;
        // Anchor at height 100, tip 50 blocks later, exactly on schedule:
        // the deviation is zero, so the factor is exactly 65536 (shift 0).
        let tip = chain_to_height(0, spacing, params.asert_anchor_bits, params.asert_height + 50);
        let (bits, _anchor) = get_next_work(&tip, &params, None).unwrap();
        assert_eq!(bits, params.asert_anchor_bits);
    }

    #[test]
    fn one_half_life_ahead_of_schedule_halves_difficulty() {
        let params = asert_params();
        let spacing = params.pow_target_spacing as i64;
        let height_delta = 50i64;
        // Build a chain on perfectly uniform schedule up to one block
        // short of the target height, then push the final block's
        // timestamp one half-life later than the schedule calls for.
        // `anchor_parent`'s timestamp is untouched, so the whole
        // deviation lands on `time_delta` as exactly one half-life.
        // tip itself must sit at asert_height + height_delta - 1 so that
        // next_height - asert_height == height_delta.
        let tip_height = params.asert_height + height_delta - 1;
        let tip_before_last = chain_to_height(0, spacing, params.asert_anchor_bits, tip_height - 1);
        let scheduled_time = tip_height * spacing;
        let tip = tip_before_last.child(scheduled_time + params.asert_half_life as i64, params.asert_anchor_bits);

        let (bits, _anchor) = get_next_work(&tip, &params, None).unwrap();
        let anchor_target = compact::decode(params.asert_anchor_bits).target;
        let next_target = compact::decode(bits).target;
        // Allow the cubic approximation's documented <0.013% error, checked
        // as a band around 2x rather than on `low_u64()` alone: the anchor
        // target's significant bits all sit above bit 64, so a low-limb-only
        // comparison would silently compare zero against zero.
        let doubled = anchor_target.mul_u64(2);
        assert!(next_target >= doubled.mul_u64(999).div_u64(1000));
        assert!(next_target <= doubled.mul_u64(1001).div_u64(1000));
    }

    #[test]
    fn far_behind_schedule_clamps_to_pow_limit() {
        let params = asert_params();
        let spacing = params.pow_target_spacing as i64;
        let height_delta = 10i64;
        // Wildly late blocks: deviation is many half-lives, shifts >= 256.
        let tip_time = spacing * height_delta + params.asert_half_life as i64 * 1000;

        let mut tip = BlockRef::genesis(0, params.asert_anchor_bits);
        for h in 1..=(params.asert_height + height_delta - 1) {
            tip = tip.child(h * spacing, params.asert_anchor_bits);
        }
        tip = tip.child(tip_time, params.asert_anchor_bits);

        let (bits, _anchor) = get_next_work(&tip, &params, None).unwrap();
        let target = compact::decode(bits).target;
        // `pow_limit` itself isn't exactly compact-representable (its
        // mantissa is wider than 24 bits), so compare against what it
        // round-trips to through the same encode the retargeter used,
        // rather than the raw value.
        assert_eq!(target, compact::decode(compact::encode(&params.pow_limit)).target);
    }

    #[test]
    fn anchor_cache_hit_is_used_directly() {
        let params = asert_params();
        let spacing = params.pow_target_spacing as i64;
        let tip = chain_to_height(0, spacing, params.asert_anchor_bits, params.asert_height + 50);
        let anchor = walk_back(&tip, 50).unwrap();
        assert_eq!(anchor.height(), params.asert_height);

        let (bits_via_cache, returned_anchor) = get_next_work(&tip, &params, Some(anchor.clone())).unwrap();
        let (bits_via_walk, _) = get_next_work(&tip, &params, None).unwrap();
        assert_eq!(bits_via_cache, bits_via_walk);
        assert_eq!(returned_anchor.height(), anchor.height());
    }
}
