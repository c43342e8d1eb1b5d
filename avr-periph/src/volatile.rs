//! Raw access to the data address space.

/// Byte-addressed access to memory-mapped I/O.
///
/// 16-bit accesses go through the AVR temporary register: the low byte must
/// be read first and written last. The default methods keep that order.
pub trait Memory {
    fn read_u8(&mut self, address: usize) -> u8;

    fn write_u8(&mut self, address: usize, value: u8);

    #[inline]
    fn read_u16(&mut self, address: usize) -> u16 {
        let low = self.read_u8(address);
        let high = self.read_u8(address + 1);
        u16::from_le_bytes([low, high])
    }

    #[inline]
    fn write_u16(&mut self, address: usize, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.write_u8(address + 1, high);
        self.write_u8(address, low);
    }
}

impl<M: Memory + ?Sized> Memory for &mut M {
    #[inline(always)]
    fn read_u8(&mut self, address: usize) -> u8 {
        (**self).read_u8(address)
    }

    #[inline(always)]
    fn write_u8(&mut self, address: usize, value: u8) {
        (**self).write_u8(address, value)
    }

    #[inline(always)]
    fn read_u16(&mut self, address: usize) -> u16 {
        (**self).read_u16(address)
    }

    #[inline(always)]
    fn write_u16(&mut self, address: usize, value: u16) {
        (**self).write_u16(address, value)
    }
}

/// The real thing: volatile loads and stores at the given addresses.
#[derive(Debug)]
#[non_exhaustive]
pub struct Mmio;

impl Mmio {
    /// # Safety
    ///
    /// Every address later passed to this handle must be a valid I/O
    /// register of the running chip, and nothing else may drive the
    /// peripherals it touches.
    #[inline(always)]
    pub const unsafe fn new() -> Self {
        Self
    }
}

impl Memory for Mmio {
    #[inline(always)]
    fn read_u8(&mut self, address: usize) -> u8 {
        unsafe { core::ptr::read_volatile(address as *const u8) }
    }

    #[inline(always)]
    fn write_u8(&mut self, address: usize, value: u8) {
        unsafe { core::ptr::write_volatile(address as *mut u8, value) }
    }

    // avr-gcc orders the halves of a volatile u16 access correctly.
    #[cfg(target_arch = "avr")]
    #[inline(always)]
    fn read_u16(&mut self, address: usize) -> u16 {
        unsafe { core::ptr::read_volatile(address as *const u16) }
    }

    #[cfg(target_arch = "avr")]
    #[inline(always)]
    fn write_u16(&mut self, address: usize, value: u16) {
        unsafe { core::ptr::write_volatile(address as *mut u16, value) }
    }
}
