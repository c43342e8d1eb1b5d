use super::{
    address::InvalidAddress,
    status::{self, Status},
};

/// Why a bus operation failed. Every layer above the driver returns this
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The peripheral reported a status other than the one the operation
    /// requires. Carries TWSR with the prescaler bits cleared.
    #[error("unexpected TWI status {0:#04x}")]
    UnexpectedStatus(u8),
    /// The ready flag did not come up within the poll budget.
    #[error("TWI timed out")]
    Timeout,
    /// A raw address from outside the crate did not fit in seven bits.
    /// Nothing was sent.
    #[error(transparent)]
    InvalidAddress(#[from] InvalidAddress),
}

impl Error {
    /// The decoded status, when there is one.
    #[inline]
    pub fn status(&self) -> Option<Status> {
        match *self {
            Error::UnexpectedStatus(code) => Status::from_code(code),
            Error::Timeout | Error::InvalidAddress(_) => None,
        }
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

        match *self {
            Error::UnexpectedStatus(status::TW_MT_SLA_NACK | status::TW_MR_SLA_NACK) => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            }
            Error::UnexpectedStatus(status::TW_MT_DATA_NACK) => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
            }
            Error::UnexpectedStatus(status::TW_MT_ARB_LOST) => ErrorKind::ArbitrationLoss,
            Error::UnexpectedStatus(status::TW_BUS_ERROR) => ErrorKind::Bus,
            _ => ErrorKind::Other,
        }
    }
}
