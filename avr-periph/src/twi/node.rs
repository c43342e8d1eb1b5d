use super::{
    address::{Address, RegisterAddress, RegisterRange},
    error::Result,
    master::{Master, Transaction},
    registers::TwiRegisters,
};
use crate::{bits::Bits, volatile::Memory};

/// One slave on the bus: the [`Master`] helpers with the address filled in.
pub struct SlaveNode<'a, R: TwiRegisters, M: Memory> {
    master: &'a mut Master<R, M>,
    address: Address,
}

impl<R: TwiRegisters, M: Memory> Master<R, M> {
    #[inline]
    pub fn node(&mut self, address: Address) -> SlaveNode<'_, R, M> {
        SlaveNode::new(self, address)
    }
}

impl<'a, R: TwiRegisters, M: Memory> SlaveNode<'a, R, M> {
    #[inline]
    pub fn new(master: &'a mut Master<R, M>, address: Address) -> Self {
        Self { master, address }
    }

    #[inline(always)]
    pub fn address(&self) -> Address {
        self.address
    }

    /// See [`Master::start`].
    #[inline]
    pub fn transaction<T, F>(&mut self, body: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_, R, M>) -> Result<T>,
    {
        self.master.start(body)
    }

    #[inline]
    pub fn write_register(&mut self, register: RegisterAddress, value: u8) -> Result<()> {
        self.master.write_register(self.address, register, value)
    }

    #[inline]
    pub fn write_value<T: Bits>(&mut self, register: RegisterAddress, value: T) -> Result<()> {
        self.master.write_value(self.address, register, value)
    }

    #[inline]
    pub fn write_range<T: Bits>(&mut self, range: RegisterRange, value: T) -> Result<()> {
        self.master.write_range(self.address, range, value)
    }

    #[inline]
    pub fn write_buffer(&mut self, range: RegisterRange, data: &[u8]) -> Result<()> {
        self.master.write_buffer(self.address, range, data)
    }

    #[inline]
    pub fn read_register(&mut self, register: RegisterAddress) -> Result<u8> {
        self.master.read_register(self.address, register)
    }

    #[inline]
    pub fn read_value<T: Bits>(&mut self, register: RegisterAddress) -> Result<T> {
        self.master.read_value(self.address, register)
    }

    #[inline]
    pub fn read_range<T: Bits>(&mut self, range: RegisterRange) -> Result<T> {
        self.master.read_range(self.address, range)
    }

    #[inline]
    pub fn read_buffer(&mut self, range: RegisterRange, data: &mut [u8]) -> Result<()> {
        self.master.read_buffer(self.address, range, data)
    }

    #[inline]
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.master.write(self.address, data)
    }

    #[inline]
    pub fn read(&mut self, data: &mut [u8]) -> Result<()> {
        self.master.read(self.address, data)
    }

    #[inline]
    pub fn write_read(&mut self, output: &[u8], input: &mut [u8]) -> Result<()> {
        self.master.write_read(self.address, output, input)
    }

    #[inline]
    pub fn is_present(&mut self) -> Result<bool> {
        self.master.probe(self.address)
    }
}
