// Written in 2014 by Andrew Poelstra <apoelstra@wpsoftware.net>
// SPDX-License-Identifier: CC0-1.0

//! # Proof-of-work difficulty retargeting core
//!
//! A consensus-critical library for computing the next block's proof-of-
//! work target from a chain tip and a set of chain parameters, and for
//! validating a block's claimed target against its hash.
//!
//! Four retargeting algorithms are implemented and dispatched by block
//! height: the original Bitcoin periodic retarget ([`retarget::btc`]),
//! two generations of the linearly weighted moving average
//! ([`retarget::lwma`]), and the absolutely scheduled exponential
//! ([`retarget::asert`]). [`pow::get_next_work`] is the entry point that
//! chooses among them; [`pow::check_pow`] validates a hash against a
//! claimed target.
//!
//! This crate is deliberately narrow: it has no opinion on how blocks are
//! stored, fetched over the network, or hashed. Callers provide a
//! read-only view of the chain index through the [`chain::BlockIndex`]
//! trait and a precomputed hash; everything else is pure computation.

pub mod chain;
pub mod compact;
pub mod consensus;
pub mod error;
pub mod hash;
pub mod pow;
pub mod retarget;
pub mod uint;

pub use chain::{BlockIndex, BlockRef};
pub use compact::Decoded as CompactDecoded;
pub use consensus::{Network, Params};
pub use error::Error;
pub use hash::BlockHash256;
pub use pow::{check_pow, get_next_work, AnchorCache};
pub use uint::Uint256;
