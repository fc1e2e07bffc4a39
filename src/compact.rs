// Written in 2014 by Andrew Poelstra <apoelstra@wpsoftware.net>
// SPDX-License-Identifier: CC0-1.0

//! Conversion between the 32-bit "compact" target encoding used in block
//! headers and the full 256-bit target it represents.
//!
//! `compact = E << 24 | sign << 23 | M`, value = `M * 256^(E - 3)`. This is
//! a floating-point-like encoding (24-bit signed mantissa, base-256
//! exponent with an offset of 3) and is consensus-critical: every node
//! must decode and re-encode it identically.

use crate::uint::Uint256;

/// The result of unpacking a compact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// The 256-bit target. Meaningless (but still computed) when
    /// `negative` or `overflow` is set; callers must check those flags.
    pub target: Uint256,
    /// Set when the sign bit (bit 23 of the mantissa) is set on a
    /// nonzero mantissa. Compact targets are never negative in-band;
    /// this flag exists only so callers can reject such values.
    pub negative: bool,
    /// Set when the mantissa is nonzero and the exponent would require
    /// more than 256 bits to represent.
    pub overflow: bool,
}

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// Unpacks a compact-encoded target.
pub fn decode(compact: u32) -> Decoded {
    let exponent = compact >> 24;
    let mantissa = compact & MANTISSA_MASK;

    let negative = mantissa != 0 && compact & SIGN_BIT != 0;
    let overflow = mantissa != 0
        && (exponent > 34 || (exponent > 33 && mantissa > 0xff) || (exponent > 32 && mantissa > 0xffff));

    let target = if exponent <= 3 {
        Uint256::from_u64(mantissa as u64).shr(8 * (3 - exponent))
    } else {
        Uint256::from_u64(mantissa as u64).shl(8 * (exponent - 3))
    };

    Decoded { target, negative, overflow }
}

/// Packs a 256-bit target into its minimal compact encoding.
///
/// If the natural mantissa would set bit 23 (which would be read back as
/// the sign bit), the mantissa is shifted right by 8 bits and the
/// exponent incremented, per the standard Bitcoin `GetCompact` algorithm.
pub fn encode(target: &Uint256) -> u32 {
    let mut size = (target.bits() + 7) / 8;
    let mut compact = if size <= 3 {
        (target.low_u64() as u32) << (8 * (3 - size))
    } else {
        target.shr(8 * (size - 3)).low_u64() as u32
    };

    if compact & SIGN_BIT != 0 {
        compact >>= 8;
        size += 1;
    }

    compact | (size << 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_exponent_le_3_shifts_right() {
        // E=3, M=0x00ffff -> target = 0x00ffff
        let d = decode(0x0300ffff);
        assert_eq!(d.target, Uint256::from_u64(0x00ffff));
        assert!(!d.negative);
        assert!(!d.overflow);
    }

    #[test]
    fn decode_exponent_gt_3_shifts_left() {
        // E=4, M=0x00ffff -> target = 0x00ffff00
        let d = decode(0x0400ffff);
        assert_eq!(d.target, Uint256::from_u64(0x00ff_ff00));
    }

    #[test]
    fn decode_classic_genesis_bits() {
        // 0x1d00ffff is Bitcoin's genesis difficulty bits.
        let d = decode(0x1d00ffff);
        assert!(!d.negative);
        assert!(!d.overflow);
        assert_eq!(d.target.bits(), 16 + 8 * (0x1d - 3));
    }

    #[test]
    fn decode_negative_flag() {
        // Sign bit (bit 23) set on a nonzero mantissa.
        let d = decode(0x0380_0001);
        assert!(d.negative);
    }

    #[test]
    fn decode_zero_mantissa_never_negative() {
        // Sign bit set, but mantissa is zero: not negative by definition.
        let d = decode(0x0480_0000);
        assert!(!d.negative);
    }

    #[test]
    fn decode_overflow_exponent_too_large() {
        let d = decode(0x2300_0001); // E=35 > 34
        assert!(d.overflow);
    }

    #[test]
    fn decode_overflow_boundary_e34_ok_if_mantissa_fits() {
        let d = decode(0x2200_0001);
        assert!(!d.overflow);
    }

    #[test]
    fn decode_overflow_e34_mantissa_above_0xff() {
        let d = decode(0x2200_0100); // E=34, M=0x000100 > 0xff
        assert!(d.overflow);
    }

    #[test]
    fn decode_overflow_e33_mantissa_above_0xffff() {
        let d = decode(0x2101_0000); // E=33, M=0x010000 > 0xffff
        assert!(d.overflow);
    }

    #[test]
    fn decode_no_overflow_e33_mantissa_at_0xff_boundary() {
        // E=33 does not trigger the ">33" branch, regardless of mantissa.
        let d = decode(0x2100_0100); // E=33, M=0x000100 > 0xff
        assert!(!d.overflow);
    }

    #[test]
    fn encode_round_trips_genesis_bits() {
        let d = decode(0x1d00ffff);
        assert_eq!(encode(&d.target), 0x1d00ffff);
    }

    #[test]
    fn encode_shifts_when_mantissa_would_set_sign_bit() {
        // A target whose top byte is >= 0x80 needs an extra exponent byte
        // of padding so the mantissa's top bit isn't mistaken for a sign.
        let target = Uint256::from_u64(0x00ff_ffff); // top bit of 3-byte mantissa set
        let compact = encode(&target);
        let back = decode(compact);
        assert!(!back.negative);
        assert!(!back.overflow);
        // encode(decode(c)) == c is the law this format actually guarantees.
        assert_eq!(encode(&back.target), compact);
    }

    #[test]
    fn encode_zero_is_zero() {
        assert_eq!(encode(&Uint256::ZERO), 0);
    }

    #[test]
    fn round_trip_valid_compacts() {
        // encode(decode(c)) == c for every c that decodes cleanly: the
        // format only has to be a bijection on its own valid encodings,
        // not on arbitrary 256-bit integers (it can't represent most of
        // those exactly at all).
        for c in [
            0x1d00ffffu32,
            0x1c0ac141,
            0x1e0ffff0,
            0x1b075cf1,
            0x1b015318,
            0x1c093f8d,
            0x1e0fffff,
            0x1b01d73c,
            0x1b054c60,
        ] {
            let d = decode(c);
            if d.negative || d.overflow {
                continue;
            }
            assert_eq!(encode(&d.target), c, "round trip failed for {:#010x}", c);
        }
    }
}
