//! A software TWI block sitting at the ATmega328P addresses, with
//! register-file slaves on its bus. Records what goes over the wire.

use super::status::*;
use crate::volatile::Memory;

const TWBR: usize = 0xB8;
const TWSR: usize = 0xB9;
const TWDR: usize = 0xBB;
const TWCR: usize = 0xBC;

const TWINT: u8 = 1 << 7;
const TWEA: u8 = 1 << 6;
const TWSTA: u8 = 1 << 5;
const TWSTO: u8 = 1 << 4;
const TWEN: u8 = 1 << 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    Start,
    RepeatedStart,
    Address(u8),
    Write(u8),
    Read { byte: u8, ack: bool },
    Stop,
}

pub(crate) struct Device {
    pub address: u8,
    pub regs: [u8; 256],
    pub nack_data_after: Option<usize>,
    pointer: Option<u8>,
    written: usize,
}

impl Device {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            regs: [0; 256],
            nack_data_after: None,
            pointer: None,
            written: 0,
        }
    }

    fn write(&mut self, byte: u8) -> bool {
        self.written += 1;
        match self.pointer {
            None => self.pointer = Some(byte),
            Some(reg) => {
                self.regs[reg as usize] = byte;
                self.pointer = Some(reg.wrapping_add(1));
            }
        }
        self.nack_data_after.map_or(true, |n| self.written <= n)
    }

    fn read(&mut self) -> u8 {
        let reg = self.pointer.unwrap_or(0);
        self.pointer = Some(reg.wrapping_add(1));
        self.regs[reg as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Started,
    Writing(Option<usize>),
    Reading(Option<usize>),
}

pub(crate) struct SimTwi {
    pub twbr: u8,
    pub twsr: u8,
    pub twdr: u8,
    pub twcr: u8,
    phase: Phase,
    pub devices: heapless::Vec<Device, 4>,
    pub events: heapless::Vec<Event, 512>,
    /// TWINT never comes up again.
    pub stuck: bool,
    /// TWSTO never clears.
    pub stop_stuck: bool,
    /// Force status `.1` on the `.0`th triggered operation (0-based).
    pub inject: Option<(usize, u8)>,
    pub control_reads: u32,
    operations: usize,
}

impl SimTwi {
    pub fn new() -> Self {
        Self {
            twbr: 0,
            twsr: TW_NO_INFO,
            twdr: 0xFF,
            twcr: 0,
            phase: Phase::Idle,
            devices: heapless::Vec::new(),
            events: heapless::Vec::new(),
            stuck: false,
            stop_stuck: false,
            inject: None,
            control_reads: 0,
            operations: 0,
        }
    }

    pub fn with_device(mut self, device: Device) -> Self {
        assert!(self.devices.push(device).is_ok());
        self
    }

    pub fn device(&self, address: u8) -> &Device {
        self.devices
            .iter()
            .find(|d| d.address == address)
            .expect("no such device")
    }

    pub fn count(&self, event: Event) -> usize {
        self.events.iter().filter(|&&e| e == event).count()
    }

    fn log(&mut self, event: Event) {
        assert!(self.events.push(event).is_ok(), "event log full");
    }

    fn control(&mut self, value: u8) {
        // Writing one to TWINT clears it.
        self.twcr = value & !TWINT;

        if value & TWINT == 0 || value & TWEN == 0 {
            return;
        }

        let operation = self.operations;
        self.operations += 1;

        if value & TWSTO != 0 {
            self.log(Event::Stop);
            self.phase = Phase::Idle;
            self.twsr = TW_NO_INFO | (self.twsr & 0x03);
            if !self.stop_stuck {
                self.twcr &= !TWSTO;
            }
            return;
        }

        let status = if value & TWSTA != 0 {
            let status = if self.phase == Phase::Idle {
                self.log(Event::Start);
                TW_START
            } else {
                self.log(Event::RepeatedStart);
                TW_REP_START
            };
            self.phase = Phase::Started;
            status
        } else {
            match self.phase {
                Phase::Started => {
                    let byte = self.twdr;
                    self.log(Event::Address(byte));
                    let device = self.devices.iter().position(|d| d.address == byte >> 1);
                    if let Some(idx) = device {
                        self.devices[idx].pointer = self.devices[idx].pointer.filter(|_| byte & 1 == 1);
                        self.devices[idx].written = 0;
                    }
                    match (byte & 1 == 1, device.is_some()) {
                        (false, true) => {
                            self.phase = Phase::Writing(device);
                            TW_MT_SLA_ACK
                        }
                        (false, false) => {
                            self.phase = Phase::Writing(None);
                            TW_MT_SLA_NACK
                        }
                        (true, true) => {
                            self.phase = Phase::Reading(device);
                            TW_MR_SLA_ACK
                        }
                        (true, false) => {
                            self.phase = Phase::Reading(None);
                            TW_MR_SLA_NACK
                        }
                    }
                }
                Phase::Writing(device) => {
                    let byte = self.twdr;
                    self.log(Event::Write(byte));
                    match device {
                        Some(idx) if self.devices[idx].write(byte) => TW_MT_DATA_ACK,
                        _ => TW_MT_DATA_NACK,
                    }
                }
                Phase::Reading(device) => {
                    let byte = device.map_or(0xFF, |idx| self.devices[idx].read());
                    let ack = value & TWEA != 0;
                    self.twdr = byte;
                    self.log(Event::Read { byte, ack });
                    if ack {
                        TW_MR_DATA_ACK
                    } else {
                        TW_MR_DATA_NACK
                    }
                }
                Phase::Idle => TW_BUS_ERROR,
            }
        };

        let status = match self.inject {
            Some((n, forced)) if n == operation => forced,
            _ => status,
        };
        // Prescaler bits survive, the status field is the hardware's.
        self.twsr = (status & 0xF8) | (self.twsr & 0x03);

        if !self.stuck {
            self.twcr |= TWINT;
        }
    }
}

impl Memory for SimTwi {
    fn read_u8(&mut self, address: usize) -> u8 {
        match address {
            TWBR => self.twbr,
            TWSR => self.twsr,
            TWDR => self.twdr,
            TWCR => {
                self.control_reads += 1;
                self.twcr
            }
            _ => panic!("read from unmapped address {:#x}", address),
        }
    }

    fn write_u8(&mut self, address: usize, value: u8) {
        match address {
            TWBR => self.twbr = value,
            TWSR => self.twsr = (self.twsr & 0xF8) | (value & 0x03),
            TWDR => self.twdr = value,
            TWCR => self.control(value),
            _ => panic!("write to unmapped address {:#x}", address),
        }
    }
}
