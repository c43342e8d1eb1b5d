//! Symbolic bitfields.

pub use avr_periph_macros::BitEnum;

/// An enumeration stored in a bitfield.
///
/// Usually derived: each variant maps to its discriminant.
///
/// ```
/// use avr_periph::{bits::BitAccess, field::BitEnum};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, BitEnum)]
/// enum Mode {
///     Off = 0,
///     Slow = 1,
///     Fast = 3,
/// }
///
/// assert_eq!(0b0000_0110u8.field::<Mode>(1..=2), Ok(Mode::Fast));
/// assert!(0b0000_0100u8.field::<Mode>(1..=2).is_err());
/// assert_eq!(0b0000_0100u8.field_or(1..=2, Mode::Off), Mode::Off);
/// ```
pub trait BitEnum: Sized {
    fn from_bits(bits: u64) -> Option<Self>;

    fn into_bits(self) -> u64;

    #[inline]
    fn decode(bits: u64) -> Result<Self, InvalidBitPattern> {
        Self::from_bits(bits).ok_or(InvalidBitPattern { bits })
    }
}

impl BitEnum for bool {
    #[inline]
    fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }

    #[inline]
    fn into_bits(self) -> u64 {
        self as u64
    }
}

/// A bitfield held a pattern its enumeration has no variant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("bit pattern {bits:#b} has no matching variant")]
pub struct InvalidBitPattern {
    pub bits: u64,
}
