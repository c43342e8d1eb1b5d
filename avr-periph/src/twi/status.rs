//! TWSR status codes, prescaler bits masked off.

use crate::field::BitEnum;

pub const TW_START: u8 = 0x08;
pub const TW_REP_START: u8 = 0x10;

pub const TW_MT_SLA_ACK: u8 = 0x18;
pub const TW_MT_SLA_NACK: u8 = 0x20;
pub const TW_MT_DATA_ACK: u8 = 0x28;
pub const TW_MT_DATA_NACK: u8 = 0x30;
pub const TW_MT_ARB_LOST: u8 = 0x38;

pub const TW_MR_ARB_LOST: u8 = 0x38;
pub const TW_MR_SLA_ACK: u8 = 0x40;
pub const TW_MR_SLA_NACK: u8 = 0x48;
pub const TW_MR_DATA_ACK: u8 = 0x50;
pub const TW_MR_DATA_NACK: u8 = 0x58;

pub const TW_NO_INFO: u8 = 0xF8;
pub const TW_BUS_ERROR: u8 = 0x00;

/// Master-mode statuses, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BitEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Status {
    BusError = TW_BUS_ERROR,
    Start = TW_START,
    RepeatedStart = TW_REP_START,
    AddressWriteAck = TW_MT_SLA_ACK,
    AddressWriteNack = TW_MT_SLA_NACK,
    DataSentAck = TW_MT_DATA_ACK,
    DataSentNack = TW_MT_DATA_NACK,
    ArbitrationLost = TW_MT_ARB_LOST,
    AddressReadAck = TW_MR_SLA_ACK,
    AddressReadNack = TW_MR_SLA_NACK,
    DataReceivedAck = TW_MR_DATA_ACK,
    DataReceivedNack = TW_MR_DATA_NACK,
    NoInfo = TW_NO_INFO,
}

impl Status {
    /// `None` for slave-mode and reserved codes.
    #[inline]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::from_bits(code as u64)
    }

    #[inline(always)]
    pub fn code(self) -> u8 {
        self as u8
    }
}
