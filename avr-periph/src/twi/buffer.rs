use core::{
    marker::PhantomData,
    slice::{Iter, IterMut},
};

use crate::bits::Bits;

/// Bytes on their way to the bus.
pub trait OutputBuffer {
    fn next(&mut self) -> Option<u8>;
}

/// Bytes coming off the bus.
pub trait InputBuffer {
    fn push(&mut self, byte: u8);
}

pub struct SliceOutputBuffer<'a> {
    iter: Iter<'a, u8>,
}

impl<'a> SliceOutputBuffer<'a> {
    #[inline]
    pub fn new(slice: &'a [u8]) -> Self {
        Self { iter: slice.iter() }
    }

    #[inline]
    pub fn as_dyn(&mut self) -> &mut dyn OutputBuffer {
        self as &mut dyn OutputBuffer
    }
}

impl<'a> OutputBuffer for SliceOutputBuffer<'a> {
    #[inline]
    fn next(&mut self) -> Option<u8> {
        self.iter.next().cloned()
    }
}

/// The low `len` bytes of an integer, most significant first. Bytes above
/// the integer's width come out as zero.
pub struct ValueOutputBuffer {
    value: u64,
    remaining: usize,
}

impl ValueOutputBuffer {
    /// Every byte of `value`.
    #[inline]
    pub fn new<T: Bits>(value: T) -> Self {
        Self::low_bytes(value, (T::WIDTH / 8) as usize)
    }

    #[inline]
    pub fn low_bytes<T: Bits>(value: T, len: usize) -> Self {
        Self {
            value: value.to_raw_u64(),
            remaining: len,
        }
    }

    #[inline]
    pub fn as_dyn(&mut self) -> &mut dyn OutputBuffer {
        self as &mut dyn OutputBuffer
    }
}

impl OutputBuffer for ValueOutputBuffer {
    fn next(&mut self) -> Option<u8> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let shift = self.remaining * 8;
        Some(if shift < 64 {
            (self.value >> shift) as u8
        } else {
            0
        })
    }
}

pub trait IntoOutputBuffer {
    type Buffer: OutputBuffer;

    fn into_output_buffer(self) -> Self::Buffer;
}

impl<'a> IntoOutputBuffer for &'a [u8] {
    type Buffer = SliceOutputBuffer<'a>;

    #[inline]
    fn into_output_buffer(self) -> Self::Buffer {
        SliceOutputBuffer::new(self)
    }
}

impl<'a, const N: usize> IntoOutputBuffer for &'a [u8; N] {
    type Buffer = SliceOutputBuffer<'a>;

    #[inline]
    fn into_output_buffer(self) -> Self::Buffer {
        SliceOutputBuffer::new(self)
    }
}

/// Fills a slice front to back. Bytes past its end are dropped.
pub struct SliceInputBuffer<'a> {
    iter: IterMut<'a, u8>,
}

impl<'a> SliceInputBuffer<'a> {
    #[inline]
    pub fn new(slice: &'a mut [u8]) -> Self {
        Self {
            iter: slice.iter_mut(),
        }
    }

    #[inline]
    pub fn as_dyn(&mut self) -> &mut dyn InputBuffer {
        self as &mut dyn InputBuffer
    }
}

impl<'a> InputBuffer for SliceInputBuffer<'a> {
    #[inline]
    fn push(&mut self, byte: u8) {
        if let Some(x) = self.iter.next() {
            *x = byte;
        }
    }
}

/// Shifts bytes into an integer, most significant first. Only the last
/// `WIDTH / 8` bytes pushed survive.
pub struct ValueInputBuffer<T: Bits> {
    value: u64,
    _marker: PhantomData<T>,
}

impl<T: Bits> ValueInputBuffer<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            value: 0,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn as_dyn(&mut self) -> &mut dyn InputBuffer {
        self as &mut dyn InputBuffer
    }

    #[inline]
    pub fn value(&self) -> T {
        T::from_raw_u64(self.value)
    }
}

impl<T: Bits> Default for ValueInputBuffer<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Bits> InputBuffer for ValueInputBuffer<T> {
    #[inline]
    fn push(&mut self, byte: u8) {
        self.value = (self.value << 8) | byte as u64;
    }
}
