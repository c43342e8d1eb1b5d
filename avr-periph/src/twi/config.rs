use crate::field::BitEnum;

/// TWPS, the bit-rate prescaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BitEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescaler {
    Div1 = 0,
    Div4 = 1,
    Div16 = 2,
    Div64 = 3,
}

impl Prescaler {
    #[inline]
    pub const fn divisor(self) -> u32 {
        match self {
            Prescaler::Div1 => 1,
            Prescaler::Div4 => 4,
            Prescaler::Div16 => 16,
            Prescaler::Div64 => 64,
        }
    }
}

/// How long to wait for the peripheral before giving up.
///
/// The ready flag is checked `polls` times with `spins` idle iterations in
/// between. This counts loop iterations, not time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollBudget {
    pub polls: u32,
    pub spins: u16,
}

impl PollBudget {
    /// Tuned on a 16 MHz part; a little over ten seconds there.
    pub const LEGACY: Self = Self::new(500_000, 1_000);

    #[inline]
    pub const fn new(polls: u32, spins: u16) -> Self {
        Self { polls, spins }
    }
}

impl Default for PollBudget {
    #[inline]
    fn default() -> Self {
        Self::LEGACY
    }
}

/// Register values that produce a bus clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitRate {
    pub twbr: u8,
    pub prescaler: Prescaler,
}

impl BitRate {
    /// SCL = CPU / (16 + 2 * TWBR * prescaler).
    #[inline]
    pub const fn bus_hz(&self, cpu_hz: u32) -> u32 {
        cpu_hz / (16 + 2 * self.twbr as u32 * self.prescaler.divisor())
    }
}

/// `((cpu_hz / bus_hz) - 16) / 2`, scaled by the smallest prescaler that
/// fits it into TWBR.
///
/// The division comes first; the truncation matches the datasheet tables
/// (16 MHz: 100 kHz gives 72, 400 kHz gives 12). Buses faster than
/// `cpu_hz / 16` get TWBR 0, slower than the hardware can go get 255/64.
#[track_caller]
pub const fn bit_rate(cpu_hz: u32, bus_hz: u32) -> BitRate {
    assert!(bus_hz > 0, "bus frequency must be non-zero");

    let steps = (cpu_hz / bus_hz).saturating_sub(16) / 2;

    let (twbr, prescaler) = if steps <= 0xFF {
        (steps, Prescaler::Div1)
    } else if steps / 4 <= 0xFF {
        (steps / 4, Prescaler::Div4)
    } else if steps / 16 <= 0xFF {
        (steps / 16, Prescaler::Div16)
    } else if steps / 64 <= 0xFF {
        (steps / 64, Prescaler::Div64)
    } else {
        (0xFF, Prescaler::Div64)
    };

    BitRate {
        twbr: twbr as u8,
        prescaler,
    }
}

/// Master-mode setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub cpu_hz: u32,
    pub bus_hz: u32,
    pub poll_budget: PollBudget,
}

impl Config {
    #[inline]
    pub const fn new(cpu_hz: u32, bus_hz: u32) -> Self {
        Self {
            cpu_hz,
            bus_hz,
            poll_budget: PollBudget::LEGACY,
        }
    }

    /// 100 kHz.
    #[inline]
    pub const fn standard(cpu_hz: u32) -> Self {
        Self::new(cpu_hz, 100_000)
    }

    /// 400 kHz.
    #[inline]
    pub const fn fast(cpu_hz: u32) -> Self {
        Self::new(cpu_hz, 400_000)
    }

    #[cfg(target_arch = "avr")]
    #[inline]
    pub const fn for_clock<CLOCK: avr_hal_generic::clock::Clock>(bus_hz: u32) -> Self {
        Self::new(CLOCK::FREQ, bus_hz)
    }

    #[inline]
    pub const fn with_poll_budget(mut self, poll_budget: PollBudget) -> Self {
        self.poll_budget = poll_budget;
        self
    }

    #[inline]
    pub const fn bit_rate(&self) -> BitRate {
        bit_rate(self.cpu_hz, self.bus_hz)
    }
}
