use core::hint::spin_loop;

use super::{
    address::{Address, Direction},
    config::{Config, PollBudget},
    error::{Error, Result},
    registers::{Twbr, Twcr, Twdr, TwiRegisters, Twsr},
    status,
};
use crate::{bits::BitAccess, register::RegisterLocation, volatile::Memory};

/// Where the driver believes the bus is.
///
/// Moves forward only when an operation succeeds. A stop always brings it
/// back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusState {
    Idle,
    StartSent,
    AddressSent(Direction),
    Transferring(Direction),
    /// The address phase failed. Only a repeated start or a stop may follow.
    AddressRejected,
}

impl BusState {
    #[inline]
    fn direction(self) -> Option<Direction> {
        match self {
            BusState::AddressSent(d) | BusState::Transferring(d) => Some(d),
            BusState::Idle | BusState::StartSent | BusState::AddressRejected => None,
        }
    }
}

/// Blocking master-mode driver for one TWI instance.
///
/// Every primitive hands the peripheral one job, waits for TWINT and checks
/// TWSR against the single status that job may produce. Calling a primitive
/// out of order (data before an address, an address without a start) is a
/// programming error and panics.
pub struct TwiPeripheral<R: TwiRegisters, M: Memory> {
    regs: R,
    mem: M,
    state: BusState,
    budget: PollBudget,
}

impl<R: TwiRegisters, M: Memory> TwiPeripheral<R, M> {
    /// Takes over the instance without touching it. Call
    /// [`configure_as_master`](Self::configure_as_master) before using the bus.
    #[inline]
    pub fn new(regs: R, mem: M) -> Self {
        Self {
            regs,
            mem,
            state: BusState::Idle,
            budget: PollBudget::LEGACY,
        }
    }

    pub fn with_config(regs: R, mem: M, config: &Config) -> Self {
        let mut twi = Self::new(regs, mem);
        twi.configure_as_master(config);
        twi
    }

    /// Programs the bit rate and enables the peripheral.
    pub fn configure_as_master(&mut self, config: &Config) {
        let rate = config.bit_rate();
        debug!(
            "twi: configure {} Hz from {} Hz, TWBR={} TWPS={}",
            config.bus_hz,
            config.cpu_hz,
            rate.twbr,
            rate.prescaler
        );

        R::BitRate::write(&mut self.mem, Twbr::new(rate.twbr));
        R::Status::modify(&mut self.mem, |twsr| twsr.with_field(Twsr::TWPS, rate.prescaler));
        R::Control::write(&mut self.mem, Twcr::default().with_bit(Twcr::TWEN, true));

        self.budget = config.poll_budget;
        self.state = BusState::Idle;
    }

    #[inline]
    pub fn state(&self) -> BusState {
        self.state
    }

    #[inline]
    pub fn poll_budget(&self) -> PollBudget {
        self.budget
    }

    #[inline]
    pub fn set_poll_budget(&mut self, budget: PollBudget) {
        self.budget = budget;
    }

    /// TWSR with the prescaler bits masked off.
    #[inline]
    pub fn status(&mut self) -> u8 {
        R::Status::read(&mut self.mem).bits(Twsr::TWS) << 3
    }

    /// Gives back the register token and the memory.
    #[inline]
    pub fn free(self) -> (R, M) {
        (self.regs, self.mem)
    }

    /// Waits for TWINT. Reads TWCR at most `polls` times.
    pub fn wait_until_ready(&mut self) -> Result<()> {
        self.poll_until(|twcr| twcr.has_bit(Twcr::TWINT))
    }

    pub fn send_start_condition(&mut self) -> Result<()> {
        trace!("twi: start");
        self.execute(Twcr::default().with_bit(Twcr::TWSTA, true), status::TW_START)?;
        self.state = BusState::StartSent;
        Ok(())
    }

    /// Restarts without releasing the bus.
    ///
    /// # Panics
    ///
    /// When no transaction is open.
    #[track_caller]
    pub fn send_repeated_start_condition(&mut self) -> Result<()> {
        assert!(
            self.state != BusState::Idle,
            "TWI: repeated start without an open transaction"
        );
        trace!("twi: repeated start");
        self.execute(Twcr::default().with_bit(Twcr::TWSTA, true), status::TW_REP_START)?;
        self.state = BusState::StartSent;
        Ok(())
    }

    /// Releases the bus. The state is `Idle` afterwards whatever happens;
    /// the only failure is TWSTO not clearing in time.
    pub fn send_stop_condition(&mut self) -> Result<()> {
        trace!("twi: stop");
        self.trigger(Twcr::default().with_bit(Twcr::TWSTO, true));
        self.state = BusState::Idle;
        self.poll_until(|twcr| !twcr.has_bit(Twcr::TWSTO))
    }

    #[track_caller]
    #[inline]
    pub fn send_slave_address_write(&mut self, address: Address) -> Result<()> {
        self.send_slave_address(address, Direction::Write)
    }

    #[track_caller]
    #[inline]
    pub fn send_slave_address_read(&mut self, address: Address) -> Result<()> {
        self.send_slave_address(address, Direction::Read)
    }

    /// SLA+R/W. Needs a (repeated) start right before it.
    #[track_caller]
    pub fn send_slave_address(&mut self, address: Address, direction: Direction) -> Result<()> {
        assert!(
            self.state == BusState::StartSent,
            "TWI: slave address sent without a start condition"
        );
        trace!("twi: address {:#x} {}", address.get(), direction);

        let expected = match direction {
            Direction::Write => status::TW_MT_SLA_ACK,
            Direction::Read => status::TW_MR_SLA_ACK,
        };
        R::Data::write(&mut self.mem, Twdr::new(address.wire_byte(direction)));
        if let Err(e) = self.execute(Twcr::default(), expected) {
            self.state = BusState::AddressRejected;
            return Err(e);
        }
        self.state = BusState::AddressSent(direction);
        Ok(())
    }

    /// Sends one data byte; the slave must ACK it.
    #[track_caller]
    pub fn send_byte(&mut self, byte: u8) -> Result<()> {
        self.require(Direction::Write);
        trace!("twi: send {:#x}", byte);

        R::Data::write(&mut self.mem, Twdr::new(byte));
        self.execute(Twcr::default(), status::TW_MT_DATA_ACK)?;
        self.state = BusState::Transferring(Direction::Write);
        Ok(())
    }

    /// Clocks in one byte and answers with ACK (more wanted) or NACK (last).
    #[track_caller]
    pub fn receive_byte(&mut self, acknowledge: bool) -> Result<u8> {
        self.require(Direction::Read);

        let expected = if acknowledge {
            status::TW_MR_DATA_ACK
        } else {
            status::TW_MR_DATA_NACK
        };
        self.execute(Twcr::default().with_bit(Twcr::TWEA, acknowledge), expected)?;
        self.state = BusState::Transferring(Direction::Read);

        let byte = R::Data::read(&mut self.mem).raw();
        trace!("twi: received {:#x}", byte);
        Ok(byte)
    }

    #[track_caller]
    #[inline]
    fn require(&self, direction: Direction) {
        assert!(
            self.state.direction() == Some(direction),
            "TWI: data transfer does not match the addressed direction"
        );
    }

    /// Writes TWCR with TWINT and TWEN set on top of `control`.
    #[inline]
    fn trigger(&mut self, control: Twcr) {
        R::Control::write(
            &mut self.mem,
            control.with_bit(Twcr::TWINT, true).with_bit(Twcr::TWEN, true),
        );
    }

    fn execute(&mut self, control: Twcr, expected: u8) -> Result<()> {
        self.trigger(control);
        self.wait_until_ready()?;

        let status = self.status();
        if status == expected {
            Ok(())
        } else {
            warn!("twi: status {:#x}, wanted {:#x}", status, expected);
            Err(Error::UnexpectedStatus(status))
        }
    }

    fn poll_until(&mut self, done: impl Fn(Twcr) -> bool) -> Result<()> {
        let PollBudget { polls, spins } = self.budget;

        for _ in 0..polls {
            if done(R::Control::read(&mut self.mem)) {
                return Ok(());
            }
            for _ in 0..spins {
                spin_loop();
            }
        }

        warn!("twi: gave up after {} polls", polls);
        Err(Error::Timeout)
    }
}

impl<R: TwiRegisters, M: Memory> core::fmt::Debug for TwiPeripheral<R, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TwiPeripheral")
            .field("state", &self.state)
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}
