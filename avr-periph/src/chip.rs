//! TWI register maps.
//!
//! Each instance type is a token: it cannot be cloned, so whoever holds it
//! is the only one driving that peripheral. Tokens come from the device PAC
//! on AVR targets, or from `steal`.

use crate::register::Reg;
use crate::twi::registers::{Twbr, Twcr, Twdr, TwiRegisters, Twsr};

macro_rules! twi_instance {
    ($(#[$meta:meta])* $name:ident, $twbr:literal, $twsr:literal, $twdr:literal, $twcr:literal) => {
        $(#[$meta])*
        #[derive(Debug)]
        #[non_exhaustive]
        pub struct $name;

        impl $name {
            /// # Safety
            ///
            /// No other token for this instance may be alive.
            #[inline(always)]
            pub const unsafe fn steal() -> Self {
                Self
            }
        }

        impl TwiRegisters for $name {
            type BitRate = Reg<Twbr, $twbr>;
            type Status = Reg<Twsr, $twsr>;
            type Data = Reg<Twdr, $twdr>;
            type Control = Reg<Twcr, $twcr>;
        }
    };
}

macro_rules! from_pac {
    ($feature:literal, $pac:ident, $periph:ident => $name:path) => {
        #[cfg(all(target_arch = "avr", feature = $feature))]
        impl From<avr_device::$pac::$periph> for $name {
            #[inline(always)]
            fn from(_: avr_device::$pac::$periph) -> Self {
                unsafe { <$name>::steal() }
            }
        }
    };
}

pub mod atmega328p {
    use super::*;

    twi_instance!(
        /// The single TWI of ATmega48P/88P/168P/328P.
        Twi, 0xB8, 0xB9, 0xBB, 0xBC
    );

    from_pac!("atmega328p", atmega328p, TWI => Twi);
}

pub mod atmega328pb {
    use super::*;

    twi_instance!(Twi0, 0xB8, 0xB9, 0xBB, 0xBC);
    twi_instance!(Twi1, 0xD8, 0xD9, 0xDB, 0xDC);

    from_pac!("atmega328pb", atmega328pb, TWI0 => Twi0);
    from_pac!("atmega328pb", atmega328pb, TWI1 => Twi1);
}

pub mod atmega128 {
    use super::*;

    twi_instance!(
        /// ATmega128 keeps TWI in the extended I/O space. The token only
        /// comes from `steal`.
        Twi, 0x70, 0x71, 0x73, 0x74
    );
}
