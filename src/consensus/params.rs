// Written in 2014 by Andrew Poelstra <apoelstra@wpsoftware.net>
// SPDX-License-Identifier: CC0-1.0

//! Chain parameters consumed by the proof-of-work retargeting core.
//!
//! This module provides a predefined set of parameters for different
//! networks, plus the fields specific to the three retargeting algorithms
//! layered on top of the original periodic scheme.

use crate::uint::Uint256;

#[cfg(feature = "serde")]
use actual_serde as serde;

/// Which network a [`Params`] instance describes.
///
/// The core itself never branches on this field; it only reads the
/// retargeting-relevant fields below. It's carried on `Params` purely so
/// a host node can log or assert which preset it loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Network {
    /// The production network.
    Mainnet,
    /// The public test network, which allows minimum-difficulty blocks.
    Testnet,
    /// A local regression-test network with retargeting disabled.
    Regtest,
}

/// Lowest possible difficulty (largest target) for Mainnet.
const MAX_BITS_MAINNET: Uint256 = Uint256([
    0xffffffffffffffffu64,
    0xffffffffffffffffu64,
    0xffffffffffffffffu64,
    0x00000fffffffffffu64,
]);
/// Lowest possible difficulty for Testnet.
const MAX_BITS_TESTNET: Uint256 = MAX_BITS_MAINNET;
/// Lowest possible difficulty for Regtest (deliberately very easy).
const MAX_BITS_REGTEST: Uint256 = Uint256([
    0x0000000000000000u64,
    0x0000000000000000u64,
    0x0000000000000000u64,
    0x7fffff0000000000u64,
]);

/// Chain parameters that govern proof-of-work retargeting.
///
/// Created once at process start from a network preset (or a custom
/// configuration for a novel network) and treated as immutable from then
/// on; nothing in this crate ever mutates a `Params` value.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Params {
    /// Which network these parameters describe.
    pub network: Network,
    /// Maximum (easiest) target. Every retarget result is clamped to this.
    pub pow_limit: Uint256,
    /// Desired number of seconds between blocks (`T`).
    pub pow_target_spacing: u64,
    /// Desired number of seconds per BTC-style retarget window. Must be
    /// an integer multiple of `pow_target_spacing`.
    pub pow_target_timespan: u64,
    /// Testnet exception: allow a block to claim the minimum difficulty
    /// if its timestamp is more than twice the target spacing ahead of
    /// its predecessor.
    pub allow_min_difficulty_blocks: bool,
    /// Regtest exception: disable retargeting entirely, always returning
    /// the tip's own bits.
    pub no_retargeting: bool,
    /// LWMA averaging window size (`N`).
    pub lwma_window: u64,
    /// Height at and above which LWMA v1 applies (until `lwma_fix_height`).
    pub lwma_height: i64,
    /// Height at and above which LWMA v2 (stabilized) applies.
    pub lwma_fix_height: i64,
    /// The ASERT anchor height. Heights strictly greater than this use ASERT.
    pub asert_height: i64,
    /// The compact target fixed at the ASERT anchor block.
    pub asert_anchor_bits: u32,
    /// Seconds of schedule deviation over which ASERT doubles or halves
    /// the difficulty.
    pub asert_half_life: u64,
}

impl Params {
    /// Chain parameters for the given network.
    pub fn new(network: Network) -> Params {
        match network {
            Network::Mainnet => Params {
                network,
                pow_limit: MAX_BITS_MAINNET,
                pow_target_spacing: 90, // 1.5 minutes
                pow_target_timespan: 95040, // 1.1 days
                allow_min_difficulty_blocks: false,
                no_retargeting: false,
                lwma_window: 45,
                lwma_height: 450_000,
                lwma_fix_height: 500_000,
                asert_height: 600_000,
                asert_anchor_bits: 0x1b00c2a8,
                asert_half_life: 2 * 24 * 60 * 60, // 2 days
            },
            Network::Testnet => Params {
                network,
                pow_limit: MAX_BITS_TESTNET,
                pow_target_spacing: 90,
                pow_target_timespan: 95040,
                allow_min_difficulty_blocks: true,
                no_retargeting: false,
                lwma_window: 45,
                lwma_height: 60,
                lwma_fix_height: 120,
                asert_height: 200,
                asert_anchor_bits: 0x1e0ffff0,
                asert_half_life: 2 * 24 * 60 * 60,
            },
            Network::Regtest => Params {
                network,
                pow_limit: MAX_BITS_REGTEST,
                pow_target_spacing: 90,
                pow_target_timespan: 95040,
                allow_min_difficulty_blocks: true,
                no_retargeting: true,
                lwma_window: 45,
                lwma_height: 10,
                lwma_fix_height: 20,
                asert_height: 30,
                asert_anchor_bits: 0x207fffff,
                asert_half_life: 2 * 24 * 60 * 60,
            },
        }
    }

    /// The number of blocks between BTC-style difficulty adjustments.
    pub fn difficulty_adjustment_interval(&self) -> u64 {
        self.pow_target_timespan / self.pow_target_spacing
    }

    /// Checks the structural invariants §3 of the core's specification
    /// requires of every `Params` value. Intended for `debug_assert!` at
    /// the boundary where a host node constructs a custom `Params`; the
    /// retargeters themselves don't call this on every invocation.
    pub fn is_internally_consistent(&self) -> bool {
        self.pow_target_timespan % self.pow_target_spacing == 0
            && self.asert_height >= self.lwma_fix_height
            && self.lwma_fix_height >= self.lwma_height
            && self.lwma_height >= 0
    }
}
