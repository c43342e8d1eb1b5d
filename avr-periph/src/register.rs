//! Typed register values bound to fixed addresses.
//!
//! A [`RegisterValue`] is a plain integer with a name; it is created on each
//! [`RegisterLocation::read`] and consumed by each
//! [`RegisterLocation::write`]. Locations are zero-sized types, so choosing
//! a peripheral instance happens entirely at compile time.

use core::marker::PhantomData;

use crate::{bits::Bits, volatile::Memory};

/// Integer widths the data bus can move in one register access.
pub trait RegisterWidth: Bits {
    fn load<M: Memory>(mem: &mut M, address: usize) -> Self;

    fn store<M: Memory>(self, mem: &mut M, address: usize);
}

macro_rules! impl_width {
    ($($t:ty => $read:ident, $write:ident as $u:ty;)+) => {
        $(
            impl RegisterWidth for $t {
                #[inline(always)]
                fn load<M: Memory>(mem: &mut M, address: usize) -> Self {
                    mem.$read(address) as $t
                }

                #[inline(always)]
                fn store<M: Memory>(self, mem: &mut M, address: usize) {
                    mem.$write(address, self as $u)
                }
            }

            impl RegisterValue for $t {
                type Raw = $t;

                #[inline(always)]
                fn from_raw(raw: $t) -> Self {
                    raw
                }

                #[inline(always)]
                fn into_raw(self) -> $t {
                    self
                }
            }
        )+
    };
}

impl_width! {
    u8 => read_u8, write_u8 as u8;
    i8 => read_u8, write_u8 as u8;
    u16 => read_u16, write_u16 as u16;
    i16 => read_u16, write_u16 as u16;
}

pub trait RegisterValue: Copy {
    type Raw: RegisterWidth;

    fn from_raw(raw: Self::Raw) -> Self;

    fn into_raw(self) -> Self::Raw;
}

/// Where a register lives and what it holds.
pub trait RegisterLocation {
    type Value: RegisterValue;

    const ADDRESS: usize;

    #[inline(always)]
    fn read<M: Memory>(mem: &mut M) -> Self::Value {
        Self::Value::from_raw(RegisterWidth::load(mem, Self::ADDRESS))
    }

    #[inline(always)]
    fn write<M: Memory>(mem: &mut M, value: Self::Value) {
        value.into_raw().store(mem, Self::ADDRESS)
    }

    #[inline(always)]
    fn modify<M: Memory, F: FnOnce(Self::Value) -> Self::Value>(mem: &mut M, f: F) {
        let value = Self::read(mem);
        Self::write(mem, f(value))
    }
}

pub struct Reg<V, const A: usize>(PhantomData<V>);

impl<V: RegisterValue, const A: usize> RegisterLocation for Reg<V, A> {
    type Value = V;

    const ADDRESS: usize = A;
}

/// Declares a register value type with named bits and fields.
///
/// ```
/// use avr_periph::{bits::BitAccess, register};
/// use core::ops::RangeInclusive;
///
/// register! {
///     /// Timer control.
///     pub struct Tccr(u8) {
///         const WGM: RangeInclusive<u32> = 0..=1;
///         const COM: u32 = 6;
///     }
/// }
///
/// let tccr = Tccr::default().with_bits(Tccr::WGM, 0b10).with_bit(Tccr::COM, true);
/// assert_eq!(tccr, Tccr::new(0b0100_0010));
/// ```
#[macro_export]
macro_rules! register {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($raw:ty) {
            $(
                $(#[$fmeta:meta])*
                const $field:ident: $fty:ty = $value:expr;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Default)]
        #[repr(transparent)]
        $vis struct $name($raw);

        #[allow(dead_code)]
        impl $name {
            $(
                $(#[$fmeta])*
                pub const $field: $fty = $value;
            )*

            #[inline(always)]
            pub const fn new(raw: $raw) -> Self {
                Self(raw)
            }
        }

        impl $crate::register::RegisterValue for $name {
            type Raw = $raw;

            #[inline(always)]
            fn from_raw(raw: $raw) -> Self {
                Self(raw)
            }

            #[inline(always)]
            fn into_raw(self) -> $raw {
                self.0
            }
        }

        impl $crate::bits::BitAccess for $name {
            type Raw = $raw;

            #[inline(always)]
            fn raw(&self) -> $raw {
                self.0
            }

            #[inline(always)]
            fn raw_mut(&mut self) -> &mut $raw {
                &mut self.0
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::write!(f, "{}({:#x})", ::core::stringify!($name), self.0)
            }
        }
    };
}
