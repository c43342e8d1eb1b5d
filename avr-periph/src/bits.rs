//! Bit and bitfield access over fixed-width integers.
//!
//! Ranges are closed (`lo..=hi`), indices count from the least significant
//! bit. Any index or range bound outside the value's width, or a reversed
//! range, panics: the same policy for every operation in this module.

use core::{fmt::Debug, ops::RangeInclusive};

use num_traits::{PrimInt, Zero};

use crate::field::{BitEnum, InvalidBitPattern};

/// A fixed-width integer usable as the raw backing of a register.
pub trait Bits: PrimInt + Debug + 'static {
    const WIDTH: u32;

    /// The bit pattern, zero-extended.
    fn to_raw_u64(self) -> u64;

    /// Keeps the low `WIDTH` bits of `bits`.
    fn from_raw_u64(bits: u64) -> Self;
}

macro_rules! impl_bits {
    ($($t:ty => $u:ty),+ $(,)?) => {
        $(
            impl Bits for $t {
                const WIDTH: u32 = <$t>::BITS;

                #[inline(always)]
                fn to_raw_u64(self) -> u64 {
                    self as $u as u64
                }

                #[inline(always)]
                fn from_raw_u64(bits: u64) -> Self {
                    bits as $u as $t
                }
            }

            impl BitAccess for $t {
                type Raw = $t;

                #[inline(always)]
                fn raw(&self) -> $t {
                    *self
                }

                #[inline(always)]
                fn raw_mut(&mut self) -> &mut $t {
                    self
                }
            }
        )+
    };
}

impl_bits!(
    u8 => u8,
    u16 => u16,
    u32 => u32,
    u64 => u64,
    i8 => u8,
    i16 => u16,
    i32 => u32,
    i64 => u64,
);

#[inline(always)]
#[track_caller]
fn check_index<T: Bits>(op: &str, index: u32) {
    assert!(
        index < T::WIDTH,
        "{}: bit {} out of range for a {}-bit value",
        op,
        index,
        T::WIDTH
    );
}

#[inline(always)]
#[track_caller]
fn check_range<T: Bits>(op: &str, range: &RangeInclusive<u32>) -> (u32, u32) {
    let (lo, hi) = (*range.start(), *range.end());
    assert!(
        lo <= hi && hi < T::WIDTH,
        "{}: bits {}..={} out of range for a {}-bit value",
        op,
        lo,
        hi,
        T::WIDTH
    );
    (lo, hi)
}

/// Mask with bits `lo..=hi` set: `(!0 << lo) & (!0 >> (W - 1 - hi))`.
///
/// Both shifts are logical and never reach `W`, so `0..=W-1` is all ones
/// for signed types too.
#[inline]
#[track_caller]
pub fn bitmask<T: Bits>(range: RangeInclusive<u32>) -> T {
    mask_for("bitmask", &range)
}

#[inline(always)]
#[track_caller]
fn mask_for<T: Bits>(op: &str, range: &RangeInclusive<u32>) -> T {
    let (lo, hi) = check_range::<T>(op, range);
    let ones = !T::zero();
    ones.unsigned_shl(lo) & ones.unsigned_shr(T::WIDTH - 1 - hi)
}

#[inline(always)]
fn single<T: Bits>(index: u32) -> T {
    T::one().unsigned_shl(index)
}

#[inline(always)]
#[track_caller]
fn test_bit<T: Bits>(op: &str, raw: T, index: u32) -> bool {
    check_index::<T>(op, index);
    raw & single::<T>(index) != <T as Zero>::zero()
}

#[inline(always)]
#[track_caller]
fn extract<T: Bits>(op: &str, raw: T, range: &RangeInclusive<u32>) -> T {
    (raw & mask_for::<T>(op, range)).unsigned_shr(*range.start())
}

#[inline(always)]
#[track_caller]
fn insert<T: Bits>(op: &str, raw: &mut T, range: &RangeInclusive<u32>, value: T) {
    let mask = mask_for::<T>(op, range);
    *raw = (*raw & !mask) | (value.unsigned_shl(*range.start()) & mask);
}

#[inline(always)]
#[track_caller]
fn assign<T: Bits>(op: &str, raw: &mut T, index: u32, value: bool) {
    check_index::<T>(op, index);
    let mask = single::<T>(index);
    *raw = if value { *raw | mask } else { *raw & !mask };
}

/// Bit-level view of anything backed by a raw integer.
///
/// Every operation reads from or writes to [`BitAccess::raw`]; nothing is
/// cached on the side.
pub trait BitAccess: Sized {
    type Raw: Bits;

    fn raw(&self) -> Self::Raw;

    fn raw_mut(&mut self) -> &mut Self::Raw;

    #[inline]
    #[track_caller]
    fn has_bit(&self, index: u32) -> bool {
        test_bit("has_bit", self.raw(), index)
    }

    /// `0` or `1`, widened to `T`.
    #[inline]
    #[track_caller]
    fn bit<T: Bits>(&self, index: u32) -> T {
        if test_bit("bit", self.raw(), index) {
            T::one()
        } else {
            T::zero()
        }
    }

    /// The bits of `range`, shifted down to bit 0.
    #[inline]
    #[track_caller]
    fn bits(&self, range: RangeInclusive<u32>) -> Self::Raw {
        extract("bits", self.raw(), &range)
    }

    /// Decodes `range` as `E`; a pattern with no variant is an error.
    #[inline]
    #[track_caller]
    fn field<E: BitEnum>(&self, range: RangeInclusive<u32>) -> Result<E, InvalidBitPattern> {
        E::decode(extract("field", self.raw(), &range).to_raw_u64())
    }

    /// Decodes `range` as `E`, falling back to `default`.
    #[inline]
    #[track_caller]
    fn field_or<E: BitEnum>(&self, range: RangeInclusive<u32>, default: E) -> E {
        E::from_bits(extract("field_or", self.raw(), &range).to_raw_u64()).unwrap_or(default)
    }

    #[inline]
    #[track_caller]
    fn set_bit(&mut self, index: u32, value: bool) {
        assign("set_bit", self.raw_mut(), index, value);
    }

    /// Read-modify-write of `range`. Bits of `value` above the range width
    /// are dropped.
    #[inline]
    #[track_caller]
    fn set_bits(&mut self, range: RangeInclusive<u32>, value: Self::Raw) {
        insert("set_bits", self.raw_mut(), &range, value);
    }

    #[inline]
    #[track_caller]
    fn set_field<E: BitEnum>(&mut self, range: RangeInclusive<u32>, value: E) {
        let value = Self::Raw::from_raw_u64(value.into_bits());
        insert("set_field", self.raw_mut(), &range, value);
    }

    #[inline]
    #[track_caller]
    fn toggle_bit(&mut self, index: u32) {
        check_index::<Self::Raw>("toggle_bit", index);
        let mask = single::<Self::Raw>(index);
        let raw = self.raw_mut();
        *raw = *raw ^ mask;
    }

    #[inline]
    #[track_caller]
    fn with_bit(mut self, index: u32, value: bool) -> Self {
        assign("with_bit", self.raw_mut(), index, value);
        self
    }

    #[inline]
    #[track_caller]
    fn with_bits(mut self, range: RangeInclusive<u32>, value: Self::Raw) -> Self {
        insert("with_bits", self.raw_mut(), &range, value);
        self
    }

    #[inline]
    #[track_caller]
    fn with_field<E: BitEnum>(mut self, range: RangeInclusive<u32>, value: E) -> Self {
        let value = Self::Raw::from_raw_u64(value.into_bits());
        insert("with_field", self.raw_mut(), &range, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn closed_range(width: u32) -> impl Strategy<Value = (u32, u32)> {
        (0..width).prop_flat_map(move |lo| (Just(lo), lo..width))
    }

    #[test]
    fn full_range_masks_are_all_ones() {
        assert_eq!(bitmask::<u8>(0..=7), 0xFF);
        assert_eq!(bitmask::<u16>(0..=15), 0xFFFF);
        assert_eq!(bitmask::<u64>(0..=63), u64::MAX);
        assert_eq!(bitmask::<i8>(0..=7), -1);
        assert_eq!(bitmask::<i16>(15..=15), i16::MIN);
    }

    #[test]
    fn edge_masks() {
        assert_eq!(bitmask::<u8>(0..=0), 0b0000_0001);
        assert_eq!(bitmask::<u8>(7..=7), 0b1000_0000);
        assert_eq!(bitmask::<u8>(3..=7), 0b1111_1000);
        assert_eq!(bitmask::<u32>(4..=11), 0x0000_0FF0);
    }

    #[test]
    fn writes_drop_surplus_bits() {
        let mut value = 0b1010_1101u8;
        value.set_bits(0..=2, 0b1111_1010);
        assert_eq!(value, 0b1010_1010);
    }

    #[test]
    fn single_bits() {
        let mut value = 0u16;
        value.set_bit(15, true);
        assert!(value.has_bit(15));
        assert_eq!(value.bit::<u8>(15), 1);
        assert_eq!(value.bit::<u32>(14), 0);
        value.toggle_bit(0);
        assert_eq!(value, 0x8001);
        value.set_bit(15, false);
        assert_eq!(value, 0x0001);
    }

    #[test]
    fn signed_fields_shift_logically() {
        let value = -128i8;
        assert_eq!(value.bits(4..=7), 0b1000);
        assert_eq!(value.bits(0..=7), -128);
        assert_eq!(value.bits(0..=7).to_raw_u64(), 0x80);
    }

    #[test]
    fn builders_chain() {
        let value = 0u8.with_bit(7, true).with_bits(0..=1, 0b11);
        assert_eq!(value, 0b1000_0011);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn index_past_width_panics() {
        0u8.has_bit(8);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn reversed_range_panics() {
        let mut value = 0u16;
        value.set_bits(5..=4, 1);
    }

    #[test]
    #[should_panic(expected = "bits: bits 2..=8 out of range")]
    fn read_panic_names_bits() {
        0u8.bits(2..=8);
    }

    #[test]
    #[should_panic(expected = "set_bits: bits 0..=16")]
    fn write_panic_names_set_bits() {
        let mut value = 0u16;
        value.set_bits(0..=16, 1);
    }

    #[test]
    #[should_panic(expected = "bit: bit 8 out of range")]
    fn bit_panic_names_bit() {
        0u8.bit::<u8>(8);
    }

    /// Goes through a wrapper whose raw type is only known as `Self::Raw`.
    #[test]
    fn access_through_an_associated_raw_type() {
        struct Wrapped(u16);

        impl BitAccess for Wrapped {
            type Raw = u16;

            fn raw(&self) -> u16 {
                self.0
            }

            fn raw_mut(&mut self) -> &mut u16 {
                &mut self.0
            }
        }

        fn lowest<A: BitAccess>(value: &A) -> bool {
            value.has_bit(0)
        }

        let mut value = Wrapped(0x8001);
        assert!(lowest(&value));
        assert!(value.has_bit(15));
        value.set_bits(4..=7, 0xF);
        assert_eq!(value.bits(0..=7), 0xF1);
        assert!(!lowest(&value.with_bit(0, false)));
    }

    #[test]
    #[should_panic(expected = "toggle_bit")]
    fn toggle_past_width_panics() {
        let mut value = 0u32;
        value.toggle_bit(32);
    }

    proptest! {
        #[test]
        fn mask_is_contiguous_u16((lo, hi) in closed_range(16)) {
            let mask = bitmask::<u16>(lo..=hi);
            prop_assert_eq!(mask.count_ones(), hi - lo + 1);
            prop_assert_eq!(mask.trailing_zeros(), lo);
            prop_assert_eq!(mask >> lo, u16::MAX >> (15 - (hi - lo)));
        }

        #[test]
        fn mask_is_contiguous_i32((lo, hi) in closed_range(32)) {
            let mask = bitmask::<i32>(lo..=hi) as u32;
            prop_assert_eq!(mask.count_ones(), hi - lo + 1);
            prop_assert_eq!(mask.trailing_zeros(), lo);
            prop_assert_eq!(mask.leading_zeros(), 31 - hi);
        }

        #[test]
        fn rewriting_a_field_is_identity(value in any::<u16>(), (lo, hi) in closed_range(16)) {
            let mut copy = value;
            let field = copy.bits(lo..=hi);
            copy.set_bits(lo..=hi, field);
            prop_assert_eq!(copy, value);
        }

        #[test]
        fn rewriting_a_signed_field_is_identity(value in any::<i8>(), (lo, hi) in closed_range(8)) {
            let mut copy = value;
            let field = copy.bits(lo..=hi);
            copy.set_bits(lo..=hi, field);
            prop_assert_eq!(copy, value);
        }

        #[test]
        fn set_bits_leaves_the_rest(value in any::<u8>(), new in any::<u8>(), (lo, hi) in closed_range(8)) {
            let mut copy = value;
            copy.set_bits(lo..=hi, new);
            let mask = bitmask::<u8>(lo..=hi);
            prop_assert_eq!(copy & !mask, value & !mask);
            prop_assert_eq!(copy.bits(lo..=hi), new & (mask >> lo));
        }

        #[test]
        fn toggle_twice_is_identity(value in any::<u32>(), index in 0u32..32) {
            let mut copy = value;
            copy.toggle_bit(index);
            prop_assert_ne!(copy, value);
            copy.toggle_bit(index);
            prop_assert_eq!(copy, value);
        }
    }
}
