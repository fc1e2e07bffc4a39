// Written in 2014 by Andrew Poelstra <apoelstra@wpsoftware.net>
// SPDX-License-Identifier: CC0-1.0

//! The original Bitcoin-style periodic retargeter: every
//! `pow_target_timespan / pow_target_spacing` blocks, compare the actual
//! time the window took against the desired timespan and scale the
//! target proportionally.

use crate::chain::{walk_back, BlockIndex};
use crate::compact;
use crate::consensus::Params;
use crate::error::Error;
use crate::retarget::clamp_i64;

/// Computes the next compact target under the periodic (BTC) scheme.
///
/// `candidate_time` is the timestamp of the block being built on top of
/// `tip`; it is only consulted by the testnet minimum-difficulty
/// exception.
pub fn get_next_work<T: BlockIndex>(
    tip: &T,
    candidate_time: i64,
    params: &Params,
) -> Result<u32, Error> {
    if params.no_retargeting {
        return Ok(tip.compact_bits());
    }

    let interval = params.difficulty_adjustment_interval() as i64;
    let next_height = tip.height() + 1;

    if next_height % interval != 0 {
        return Ok(non_boundary_bits(tip, candidate_time, params));
    }

    let step = if next_height == interval { interval - 1 } else { interval };
    let first = walk_back(tip, step as u64).ok_or(Error::MissingParentForRetarget)?;

    let timespan = params.pow_target_timespan as i64;
    let actual = clamp_i64(tip.time() - first.time(), timespan / 4, timespan * 4);

    let decoded = compact::decode(tip.compact_bits());
    let limit_bits = params.pow_limit.bits();
    let shift_guard = decoded.target.bits() == limit_bits;

    let mut target = decoded.target;
    if shift_guard {
        target = target.shr(1);
    }
    target = target.mul_u64(actual as u64);
    target = target.div_u64(params.pow_target_timespan);
    if shift_guard {
        target = target.shl(1);
    }
    target = target.clamp_nonzero(params.pow_limit);

    Ok(compact::encode(&target))
}

/// The non-retarget-boundary branch: normally the tip's own bits, except
/// for the testnet minimum-difficulty exception.
fn non_boundary_bits<T: BlockIndex>(tip: &T, candidate_time: i64, params: &Params) -> u32 {
    if !params.allow_min_difficulty_blocks {
        return tip.compact_bits();
    }

    if candidate_time > tip.time() + 2 * params.pow_target_spacing as i64 {
        return compact::encode(&params.pow_limit);
    }

    let interval = params.difficulty_adjustment_interval() as i64;
    let pow_limit_bits = compact::encode(&params.pow_limit);

    let mut cur = tip.clone();
    while let Some(parent) = cur.parent() {
        if cur.height() % interval == 0 || cur.compact_bits() != pow_limit_bits {
            break;
        }
        cur = parent;
    }
    cur.compact_bits()
}
