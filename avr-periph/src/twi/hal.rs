use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};

use super::{
    address::Address,
    error::Error,
    master::{Master, Reader},
    registers::TwiRegisters,
};
use crate::volatile::Memory;

impl<R: TwiRegisters, M: Memory> ErrorType for Master<R, M> {
    type Error = Error;
}

/// Consecutive operations in the same direction share one address phase.
/// A change of direction is a repeated start, and the last byte of every
/// read run is NACKed. A read run with no bytes is skipped. An address that
/// does not fit in seven bits fails with [`Error::InvalidAddress`] before
/// anything is sent.
impl<R: TwiRegisters, M: Memory> I2c<SevenBitAddress> for Master<R, M> {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let address = Address::new(address)?;

        self.start(|tx| {
            let mut rest = operations;
            while let Some(first) = rest.first() {
                let reading = matches!(first, Operation::Read(_));
                let run = rest
                    .iter()
                    .take_while(|op| matches!(op, Operation::Read(_)) == reading)
                    .count();
                let (group, tail) = core::mem::take(&mut rest).split_at_mut(run);
                rest = tail;

                if reading {
                    if run_len(group) > 0 {
                        tx.receive(address, |r| read_run(r, group))?;
                    }
                } else {
                    tx.transmit(address, |w| {
                        for op in group.iter() {
                            if let Operation::Write(bytes) = op {
                                w.send_all(*bytes)?;
                            }
                        }
                        Ok(())
                    })?;
                }
            }
            Ok(())
        })
    }
}

fn run_len(group: &[Operation<'_>]) -> usize {
    group
        .iter()
        .map(|op| match op {
            Operation::Read(buf) => buf.len(),
            Operation::Write(_) => 0,
        })
        .sum()
}

fn read_run<R: TwiRegisters, M: Memory>(
    reader: &mut Reader<'_, R, M>,
    group: &mut [Operation<'_>],
) -> Result<(), Error> {
    let mut remaining = run_len(group);

    for op in group.iter_mut() {
        if let Operation::Read(buf) = op {
            for byte in buf.iter_mut() {
                remaining -= 1;
                *byte = reader.receive(remaining > 0)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twi::{
        address::InvalidAddress,
        master::tests::master,
        sim::{Device, Event, SimTwi},
        status,
    };
    use embedded_hal::i2c::{Error as _, ErrorKind, NoAcknowledgeSource};

    fn bus() -> SimTwi {
        let mut device = Device::new(0x50);
        device.regs[0x10..0x14].copy_from_slice(&[1, 2, 3, 4]);
        SimTwi::new().with_device(device)
    }

    #[test]
    fn write_read_uses_a_repeated_start() {
        let mut sim = bus();
        let mut buf = [0u8; 2];
        I2c::write_read(&mut master(&mut sim), 0x50, &[0x10], &mut buf).unwrap();
        assert_eq!(buf, [1, 2]);
        assert_eq!(
            &sim.events[..],
            &[
                Event::Start,
                Event::Address(0xA0),
                Event::Write(0x10),
                Event::RepeatedStart,
                Event::Address(0xA1),
                Event::Read { byte: 1, ack: true },
                Event::Read { byte: 2, ack: false },
                Event::Stop,
            ]
        );
    }

    #[test]
    fn same_direction_operations_share_an_address_phase() {
        let mut sim = bus();
        let mut a = [0u8; 1];
        let mut b = [0u8; 2];
        master(&mut sim)
            .transaction(
                0x50,
                &mut [
                    Operation::Write(&[0x10]),
                    Operation::Write(&[]),
                    Operation::Read(&mut a),
                    Operation::Read(&mut b),
                ],
            )
            .unwrap();

        assert_eq!((a, b), ([1], [2, 3]));
        assert_eq!(sim.count(Event::Address(0xA0)), 1);
        assert_eq!(sim.count(Event::Address(0xA1)), 1);
        assert_eq!(sim.count(Event::RepeatedStart), 1);
        assert_eq!(sim.count(Event::Read { byte: 2, ack: true }), 1);
        assert_eq!(sim.count(Event::Read { byte: 3, ack: false }), 1);
    }

    #[test]
    fn empty_transaction_is_start_and_stop() {
        let mut sim = bus();
        master(&mut sim).transaction(0x50, &mut []).unwrap();
        assert_eq!(&sim.events[..], &[Event::Start, Event::Stop]);
    }

    #[test]
    fn missing_device_is_an_address_nack() {
        let mut sim = bus();
        let err = I2c::write(&mut master(&mut sim), 0x51, &[0]).unwrap_err();
        assert_eq!(err, Error::UnexpectedStatus(status::TW_MT_SLA_NACK));
        assert_eq!(
            err.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );
        assert_eq!(sim.count(Event::Stop), 1);
    }

    #[test]
    fn empty_read_runs_send_no_read_address() {
        let mut sim = bus();
        let mut empty = [0u8; 0];
        let mut also_empty = [0u8; 0];
        master(&mut sim)
            .transaction(
                0x50,
                &mut [
                    Operation::Write(&[0x10]),
                    Operation::Read(&mut empty),
                    Operation::Read(&mut also_empty),
                ],
            )
            .unwrap();
        I2c::read(&mut master(&mut sim), 0x50, &mut []).unwrap();

        assert!(!sim
            .events
            .iter()
            .any(|e| matches!(e, Event::Address(byte) if byte & 1 == 1)));
        assert_eq!(
            &sim.events[..],
            &[
                Event::Start,
                Event::Address(0xA0),
                Event::Write(0x10),
                Event::Stop,
                Event::Start,
                Event::Stop,
            ]
        );
    }

    #[test]
    fn wide_addresses_fail_before_the_bus_is_touched() {
        let mut sim = bus();
        let err = I2c::write(&mut master(&mut sim), 0x80, &[0]).unwrap_err();
        assert_eq!(err, Error::InvalidAddress(InvalidAddress(0x80)));
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(sim.events.is_empty());
    }
}
