#![cfg_attr(not(test), no_std)]

//! Register access and a blocking TWI master for AVR microcontrollers.
//!
//! Registers are plain values ([`register!`]) read from and written to a
//! [`volatile::Memory`]. On the chip that is [`volatile::Mmio`]; anything
//! else implementing `Memory` (a simulator, a recording fake) works too.

extern crate self as avr_periph;

#[macro_use]
mod fmt;

pub mod bits;
pub mod chip;
pub mod field;
pub mod register;
pub mod twi;
pub mod volatile;

pub use bits::{BitAccess, Bits};
pub use field::{BitEnum, InvalidBitPattern};
pub use register::{Reg, RegisterLocation, RegisterValue, RegisterWidth};

#[cfg(target_arch = "avr")]
pub mod reexports {
    pub mod avr_device {
        pub use avr_device::*;
    }

    pub mod avr_hal_generic {
        pub use avr_hal_generic::*;
    }
}
