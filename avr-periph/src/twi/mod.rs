//! Blocking master-mode TWI (I2C).
//!
//! Layers, bottom up: [`TwiPeripheral`] drives the hardware one primitive at
//! a time; [`Master`] composes those into transactions and register helpers;
//! [`SlaveNode`] binds a `Master` to one device address.

mod address;
pub mod buffer;
mod config;
mod error;
mod hal;
mod master;
mod node;
pub mod peripheral;
pub mod registers;
#[cfg(test)]
pub(crate) mod sim;
pub mod status;

pub use address::{Address, Direction, InvalidAddress, InvalidRange, RegisterAddress, RegisterRange};
pub use config::{bit_rate, BitRate, Config, PollBudget, Prescaler};
pub use error::{Error, Result};
pub use master::{Master, Reader, ScanResult, Transaction, Writer};
pub use node::SlaveNode;
pub use peripheral::{BusState, TwiPeripheral};
pub use status::Status;
