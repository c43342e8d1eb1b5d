/// Transfer direction, the R/W bit of the address byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Write,
    Read,
}

/// A 7-bit slave address, stored un-shifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Address(u8);

impl core::fmt::Display for Address {
    #[inline(always)]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("{0:#04x} is not a 7-bit address")]
pub struct InvalidAddress(pub u8);

impl Address {
    pub const MAX: u8 = 0b0111_1111;

    #[inline]
    pub const fn new(me: u8) -> Result<Self, InvalidAddress> {
        if me > Self::MAX {
            Err(InvalidAddress(me))
        } else {
            Ok(Self(me))
        }
    }

    #[inline]
    #[track_caller]
    pub const fn const_new(me: u8) -> Self {
        if me > Self::MAX {
            panic!("Invalid address")
        } else {
            Self(me)
        }
    }

    #[inline(always)]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// The SLA+R/W byte sent on the wire.
    #[inline]
    pub const fn wire_byte(self, direction: Direction) -> u8 {
        match direction {
            Direction::Write => self.as_write_byte(),
            Direction::Read => self.as_read_byte(),
        }
    }

    #[inline]
    pub const fn as_write_byte(&self) -> u8 {
        self.0 << 1
    }

    #[inline]
    pub const fn as_read_byte(&self) -> u8 {
        (self.0 << 1) | 1
    }
}

impl TryFrom<u8> for Address {
    type Error = InvalidAddress;

    #[inline(always)]
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for u8 {
    #[inline(always)]
    fn from(address: Address) -> u8 {
        address.0
    }
}

/// A register index on a remote device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct RegisterAddress(pub u8);

impl RegisterAddress {
    /// Inclusive range from `self` up to `last`.
    #[inline]
    pub const fn to(self, last: RegisterAddress) -> Result<RegisterRange, InvalidRange> {
        RegisterRange::new(self, last)
    }
}

impl From<u8> for RegisterAddress {
    #[inline(always)]
    fn from(value: u8) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("register range {first:#04x}..={last:#04x} is empty")]
pub struct InvalidRange {
    pub first: u8,
    pub last: u8,
}

/// Contiguous device registers, lowest first. Never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterRange {
    first: RegisterAddress,
    last: RegisterAddress,
}

impl RegisterRange {
    #[inline]
    pub const fn new(first: RegisterAddress, last: RegisterAddress) -> Result<Self, InvalidRange> {
        if first.0 > last.0 {
            Err(InvalidRange {
                first: first.0,
                last: last.0,
            })
        } else {
            Ok(Self { first, last })
        }
    }

    #[inline]
    #[track_caller]
    pub const fn const_new(first: u8, last: u8) -> Self {
        if first > last {
            panic!("Invalid register range")
        } else {
            Self {
                first: RegisterAddress(first),
                last: RegisterAddress(last),
            }
        }
    }

    /// `len` registers starting at `first`, clipped at 0xFF.
    #[inline]
    #[track_caller]
    pub const fn starting_at(first: RegisterAddress, len: u8) -> Self {
        if len == 0 {
            panic!("Invalid register range")
        }
        let last = first.0.saturating_add(len - 1);
        Self {
            first,
            last: RegisterAddress(last),
        }
    }

    #[inline(always)]
    pub const fn first(&self) -> RegisterAddress {
        self.first
    }

    #[inline(always)]
    pub const fn last(&self) -> RegisterAddress {
        self.last
    }

    #[allow(clippy::len_without_is_empty)]
    #[inline]
    pub const fn len(&self) -> usize {
        (self.last.0 - self.first.0) as usize + 1
    }

    #[inline]
    pub const fn contains(&self, register: RegisterAddress) -> bool {
        self.first.0 <= register.0 && register.0 <= self.last.0
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = RegisterAddress> + Clone {
        (self.first.0..=self.last.0).map(RegisterAddress)
    }
}

impl IntoIterator for RegisterRange {
    type Item = RegisterAddress;
    type IntoIter = core::iter::Map<core::ops::RangeInclusive<u8>, fn(u8) -> RegisterAddress>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        (self.first.0..=self.last.0).map(RegisterAddress as fn(u8) -> RegisterAddress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_stays_unshifted() {
        let address = Address::new(0x68).unwrap();
        assert_eq!(address.get(), 0x68);
        assert_eq!(address.as_write_byte(), 0xD0);
        assert_eq!(address.wire_byte(Direction::Read), 0xD1);
        assert_eq!(Address::new(0x80), Err(InvalidAddress(0x80)));
        assert_eq!(Address::try_from(0x7F).map(u8::from), Ok(0x7F));
    }

    #[test]
    #[should_panic(expected = "Invalid address")]
    fn const_new_rejects_eight_bit_values() {
        Address::const_new(0xA0);
    }

    #[test]
    fn ranges_iterate_low_to_high() {
        let range = RegisterAddress(0x10).to(RegisterAddress(0x13)).unwrap();
        assert_eq!(range.len(), 4);
        let regs: Vec<u8> = range.into_iter().map(|r| r.0).collect();
        assert_eq!(regs, [0x10, 0x11, 0x12, 0x13]);
        assert!(range.contains(RegisterAddress(0x12)));
        assert!(!range.contains(RegisterAddress(0x14)));
        assert_eq!(
            RegisterRange::new(RegisterAddress(2), RegisterAddress(1)),
            Err(InvalidRange { first: 2, last: 1 })
        );
    }

    #[test]
    fn full_register_space() {
        let range = RegisterRange::const_new(0x00, 0xFF);
        assert_eq!(range.len(), 256);
        assert_eq!(range.iter().last(), Some(RegisterAddress(0xFF)));
        assert_eq!(
            RegisterRange::starting_at(RegisterAddress(0xFE), 4).last(),
            RegisterAddress(0xFF)
        );
    }
}
