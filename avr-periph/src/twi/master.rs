//! Transactions and register helpers on top of the driver.
//!
//! A transaction is a closure run between a start and a stop. The stop is
//! sent whatever the closure returns, so the bus is always released.

use super::{
    address::{Address, Direction, RegisterAddress, RegisterRange},
    buffer::{
        InputBuffer, IntoOutputBuffer, OutputBuffer, SliceInputBuffer, SliceOutputBuffer,
        ValueInputBuffer, ValueOutputBuffer,
    },
    config::Config,
    error::{Error, Result},
    peripheral::TwiPeripheral,
    registers::TwiRegisters,
    status,
};
use crate::{bits::Bits, volatile::Memory};

/// First and last addresses that are not reserved.
const SCAN_FIRST: u8 = 0x08;
const SCAN_LAST: u8 = 0x77;

/// Responding addresses found by [`Master::scan`].
pub type ScanResult = heapless::Vec<Address, { (SCAN_LAST - SCAN_FIRST + 1) as usize }>;

pub struct Master<R: TwiRegisters, M: Memory> {
    twi: TwiPeripheral<R, M>,
}

impl<R: TwiRegisters, M: Memory> Master<R, M> {
    #[inline]
    pub fn new(twi: TwiPeripheral<R, M>) -> Self {
        Self { twi }
    }

    #[inline]
    pub fn with_config(regs: R, mem: M, config: &Config) -> Self {
        Self::new(TwiPeripheral::with_config(regs, mem, config))
    }

    #[inline]
    pub fn peripheral(&mut self) -> &mut TwiPeripheral<R, M> {
        &mut self.twi
    }

    #[inline]
    pub fn free(self) -> TwiPeripheral<R, M> {
        self.twi
    }

    /// Runs `body` between a start and a stop.
    ///
    /// `body` is skipped when the start fails. The stop is always sent. The
    /// first failure among start, body and stop is returned.
    pub fn start<T, F>(&mut self, body: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_, R, M>) -> Result<T>,
    {
        let result = self
            .twi
            .send_start_condition()
            .and_then(|()| body(&mut Transaction::new(&mut self.twi)));
        let stopped = self.twi.send_stop_condition();

        let value = result?;
        stopped?;
        Ok(value)
    }

    pub fn write_register(&mut self, address: Address, register: RegisterAddress, value: u8) -> Result<()> {
        self.write_value(address, register, value)
    }

    /// Writes `value` MSB first starting at `register`.
    pub fn write_value<T: Bits>(&mut self, address: Address, register: RegisterAddress, value: T) -> Result<()> {
        self.write_registers(address, register, ValueOutputBuffer::new(value).as_dyn())
    }

    /// One byte per register: the low `range.len()` bytes of `value`, the
    /// most significant one going to the lowest register.
    pub fn write_range<T: Bits>(&mut self, address: Address, range: RegisterRange, value: T) -> Result<()> {
        self.write_registers(
            address,
            range.first(),
            ValueOutputBuffer::low_bytes(value, range.len()).as_dyn(),
        )
    }

    /// Sends as many bytes as both `range` and `data` have.
    pub fn write_buffer(&mut self, address: Address, range: RegisterRange, data: &[u8]) -> Result<()> {
        let len = range.len().min(data.len());
        self.write_registers(address, range.first(), SliceOutputBuffer::new(&data[..len]).as_dyn())
    }

    pub fn read_register(&mut self, address: Address, register: RegisterAddress) -> Result<u8> {
        self.read_value(address, register)
    }

    /// Reads `size_of::<T>()` bytes starting at `register`, MSB first.
    pub fn read_value<T: Bits>(&mut self, address: Address, register: RegisterAddress) -> Result<T> {
        let mut value = ValueInputBuffer::<T>::new();
        self.read_registers(address, register, (T::WIDTH / 8) as usize, value.as_dyn())?;
        Ok(value.value())
    }

    /// Reads one byte per register in `range`, the lowest register being
    /// the most significant byte.
    pub fn read_range<T: Bits>(&mut self, address: Address, range: RegisterRange) -> Result<T> {
        let mut value = ValueInputBuffer::<T>::new();
        self.read_registers(address, range.first(), range.len(), value.as_dyn())?;
        Ok(value.value())
    }

    /// Always reads the whole `range`; bytes that do not fit in `data` are
    /// dropped.
    pub fn read_buffer(&mut self, address: Address, range: RegisterRange, data: &mut [u8]) -> Result<()> {
        self.read_registers(address, range.first(), range.len(), SliceInputBuffer::new(data).as_dyn())
    }

    pub fn write(&mut self, address: Address, data: &[u8]) -> Result<()> {
        self.start(|tx| tx.transmit(address, |w| w.send_all(data)))
    }

    /// An empty `data` sends no address at all: after SLA+R the slave owns
    /// the bus until it has sent a byte.
    pub fn read(&mut self, address: Address, data: &mut [u8]) -> Result<()> {
        self.start(|tx| tx.receive_into(address, data))
    }

    /// The read phase is skipped when `input` is empty.
    pub fn write_read(&mut self, address: Address, output: &[u8], input: &mut [u8]) -> Result<()> {
        self.start(|tx| {
            tx.transmit(address, |w| w.send_all(output))?;
            tx.receive_into(address, input)
        })
    }

    /// Whether anything acknowledges `address`. Only an address NACK counts
    /// as absent; every other failure is returned.
    pub fn probe(&mut self, address: Address) -> Result<bool> {
        self.start(|tx| match tx.transmit(address, |_| Ok(())) {
            Ok(()) => Ok(true),
            Err(Error::UnexpectedStatus(status::TW_MT_SLA_NACK)) => Ok(false),
            Err(e) => Err(e),
        })
    }

    /// Probes every non-reserved address, lowest first.
    pub fn scan(&mut self) -> Result<ScanResult> {
        let mut found = ScanResult::new();
        for raw in SCAN_FIRST..=SCAN_LAST {
            let address = Address::const_new(raw);
            if self.probe(address)? {
                debug!("twi: found device at {:#x}", raw);
                // Sized for the whole range, cannot overflow.
                let _ = found.push(address);
            }
        }
        Ok(found)
    }

    fn write_registers(
        &mut self,
        address: Address,
        first: RegisterAddress,
        data: &mut dyn OutputBuffer,
    ) -> Result<()> {
        self.start(|tx| {
            tx.transmit(address, |w| {
                w.send(first.0)?;
                w.send_from(data)
            })
        })
    }

    fn read_registers(
        &mut self,
        address: Address,
        first: RegisterAddress,
        len: usize,
        data: &mut dyn InputBuffer,
    ) -> Result<()> {
        self.start(|tx| {
            tx.transmit(address, |w| w.send(first.0))?;
            tx.receive(address, |r| r.receive_to(len, data))
        })
    }
}

impl<R: TwiRegisters, M: Memory> core::fmt::Debug for Master<R, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Master").field("twi", &self.twi).finish()
    }
}

/// An open transaction. The first address phase reuses the start that
/// opened it, later ones begin with a repeated start.
pub struct Transaction<'a, R: TwiRegisters, M: Memory> {
    twi: &'a mut TwiPeripheral<R, M>,
    started: bool,
}

impl<'a, R: TwiRegisters, M: Memory> Transaction<'a, R, M> {
    #[inline]
    fn new(twi: &'a mut TwiPeripheral<R, M>) -> Self {
        Self { twi, started: false }
    }

    /// Whether an address phase has been issued yet.
    #[inline]
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn transmit<T, F>(&mut self, address: Address, body: F) -> Result<T>
    where
        F: FnOnce(&mut Writer<'_, R, M>) -> Result<T>,
    {
        self.address(address, Direction::Write)?;
        body(&mut Writer { twi: &mut *self.twi })
    }

    pub fn receive<T, F>(&mut self, address: Address, body: F) -> Result<T>
    where
        F: FnOnce(&mut Reader<'_, R, M>) -> Result<T>,
    {
        self.address(address, Direction::Read)?;
        body(&mut Reader { twi: &mut *self.twi })
    }

    /// Fills `data`, NACKing the last byte. Nothing goes on the bus when
    /// `data` is empty.
    pub fn receive_into(&mut self, address: Address, data: &mut [u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.receive(address, |r| r.receive_into(data))
    }

    fn address(&mut self, address: Address, direction: Direction) -> Result<()> {
        if self.started {
            self.twi.send_repeated_start_condition()?;
        } else {
            self.started = true;
        }
        self.twi.send_slave_address(address, direction)
    }
}

/// Write side of an addressed slave.
pub struct Writer<'a, R: TwiRegisters, M: Memory> {
    twi: &'a mut TwiPeripheral<R, M>,
}

impl<'a, R: TwiRegisters, M: Memory> Writer<'a, R, M> {
    #[inline]
    pub fn send(&mut self, byte: u8) -> Result<()> {
        self.twi.send_byte(byte)
    }

    pub fn send_from(&mut self, data: &mut dyn OutputBuffer) -> Result<()> {
        while let Some(byte) = data.next() {
            self.send(byte)?;
        }
        Ok(())
    }

    #[inline]
    pub fn send_all<B: IntoOutputBuffer>(&mut self, data: B) -> Result<()> {
        let mut buffer = data.into_output_buffer();
        self.send_from(&mut buffer)
    }

    /// MSB first.
    #[inline]
    pub fn send_value<T: Bits>(&mut self, value: T) -> Result<()> {
        self.send_from(ValueOutputBuffer::new(value).as_dyn())
    }
}

/// Read side of an addressed slave.
///
/// The slave keeps sending until it sees a NACK, so the final byte of a read
/// must be received with `acknowledge = false`, and at least one byte must be
/// received. The bulk helpers do the former.
pub struct Reader<'a, R: TwiRegisters, M: Memory> {
    twi: &'a mut TwiPeripheral<R, M>,
}

impl<'a, R: TwiRegisters, M: Memory> Reader<'a, R, M> {
    #[inline]
    pub fn receive(&mut self, acknowledge: bool) -> Result<u8> {
        self.twi.receive_byte(acknowledge)
    }

    /// Receives `len` bytes into `data`, NACKing the last one.
    pub fn receive_to(&mut self, len: usize, data: &mut dyn InputBuffer) -> Result<()> {
        for remaining in (0..len).rev() {
            let byte = self.receive(remaining > 0)?;
            data.push(byte);
        }
        Ok(())
    }

    #[inline]
    pub fn receive_into(&mut self, data: &mut [u8]) -> Result<()> {
        let len = data.len();
        self.receive_to(len, SliceInputBuffer::new(data).as_dyn())
    }

    /// `size_of::<T>()` bytes, MSB first, the last one NACKed.
    pub fn receive_value<T: Bits>(&mut self) -> Result<T> {
        let mut value = ValueInputBuffer::<T>::new();
        self.receive_to((T::WIDTH / 8) as usize, value.as_dyn())?;
        Ok(value.value())
    }
}
