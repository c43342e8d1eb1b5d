use core::ops::RangeInclusive;

use crate::{register, register::RegisterLocation};

register! {
    /// TWBR, the bit-rate divider.
    pub struct Twbr(u8) {}
}

register! {
    /// TWSR: bus status and the bit-rate prescaler.
    pub struct Twsr(u8) {
        const TWS: RangeInclusive<u32> = 3..=7;
        const TWPS: RangeInclusive<u32> = 0..=1;
    }
}

register! {
    /// TWDR, the shift register for address and data bytes.
    pub struct Twdr(u8) {}
}

register! {
    /// TWCR, control. Writing one to TWINT clears it and starts the
    /// operation described by the other bits.
    pub struct Twcr(u8) {
        const TWINT: u32 = 7;
        const TWEA: u32 = 6;
        const TWSTA: u32 = 5;
        const TWSTO: u32 = 4;
        const TWWC: u32 = 3;
        const TWEN: u32 = 2;
        const TWIE: u32 = 0;
    }
}

/// The register block of one TWI instance.
///
/// Implemented by the ownership tokens in [`crate::chip`]; the associated
/// types pin every access to a constant address.
pub trait TwiRegisters {
    type BitRate: RegisterLocation<Value = Twbr>;

    type Status: RegisterLocation<Value = Twsr>;

    type Data: RegisterLocation<Value = Twdr>;

    type Control: RegisterLocation<Value = Twcr>;
}
