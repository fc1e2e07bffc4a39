// Written in 2014 by Andrew Poelstra <apoelstra@wpsoftware.net>
// SPDX-License-Identifier: CC0-1.0

//! A typed wrapper around the double-SHA256 block hash.

use core::fmt;

use bitcoin_hashes::{sha256d, Hash as _};

use crate::uint::Uint256;

#[cfg(feature = "serde")]
use actual_serde as serde;

/// The double-SHA256 hash of a block header.
///
/// A thin newtype over [`sha256d::Hash`] so the retargeting core's public
/// API names its own type rather than leaking a bare hash-engine type;
/// everything but the proof-of-work interpretation below is delegated
/// straight through to the wrapped hash.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockHash256(sha256d::Hash);

impl BlockHash256 {
    /// Wraps a raw double-SHA256 digest.
    pub fn from_raw_hash(hash: sha256d::Hash) -> BlockHash256 {
        BlockHash256(hash)
    }

    /// Interprets the hash as a 256-bit unsigned integer the way a block
    /// header's proof-of-work check does: little-endian byte order, so
    /// the hash's last serialized byte becomes the integer's most
    /// significant.
    pub fn to_uint256(&self) -> Uint256 {
        let bytes = self.0.into_inner();
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes[i * 8..i * 8 + 8]);
            *limb = u64::from_le_bytes(buf);
        }
        Uint256(limbs)
    }
}

impl fmt::Display for BlockHash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for BlockHash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl From<sha256d::Hash> for BlockHash256 {
    fn from(hash: sha256d::Hash) -> BlockHash256 {
        BlockHash256(hash)
    }
}
