// Written in 2014 by Andrew Poelstra <apoelstra@wpsoftware.net>
// SPDX-License-Identifier: CC0-1.0

//! Error types for the proof-of-work retargeting core.
//!
//! Only the *fatal* invariant violations described in the top-level module
//! documentation are modeled as `Result`s. Consensus rejections
//! (`check_pow` returning `false`) and arithmetic saturations (clamps) are
//! defined behavior and never produce an `Error`.

use core::fmt;

/// A fatal invariant violation: the chain index handed to the core is
/// internally inconsistent with the assumptions the retargeter relies on.
///
/// Reaching one of these means the block index is corrupt, not that a
/// peer sent an invalid block; callers should treat it as a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A BTC-retarget walk needed a parent that does not exist (ran off
    /// the start of the chain before reaching the first retarget block).
    MissingParentForRetarget,
    /// The ASERT anchor walk reached the anchor height but the anchor
    /// block has no parent, or the walk ran past genesis before finding
    /// the anchor.
    MissingAsertAnchor,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingParentForRetarget => {
                f.write_str("chain index walk ran past genesis while looking for a retarget anchor")
            }
            Error::MissingAsertAnchor => {
                f.write_str("ASERT anchor block is missing or has no parent")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
