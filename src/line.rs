//! Bus line capabilities.
//!
//! The TM1637 bus is open drain: both sides only ever pull a line to ground
//! or let it go. The pull-up resistor is what brings a released line back
//! to high, so "drive high" is not part of the vocabulary here and cannot
//! be expressed through these traits.

use std::thread;
use std::time::Duration;

use embedded_hal::blocking::delay::DelayUs;

/// An open drain bus line.
///
/// Implementations must arrive pre-configured for open drain use: output
/// latch at low, pull resistors floating (the board supplies external
/// pull-ups). Toggling between output and input mode is then all that
/// `drive_low`/`release` need to do.
pub trait OpenDrain {
    type Error;

    /// Pull the line to ground.
    fn drive_low(&mut self) -> Result<(), Self::Error>;

    /// Stop driving the line and leave it to the pull-up.
    fn release(&mut self) -> Result<(), Self::Error>;
}

/// Read-back for a bus line, used to sample the ACK slot on DIO.
pub trait ReadLevel {
    type Error;

    /// Sample the current line level. `true` is the pulled-up level.
    fn is_high(&self) -> Result<bool, Self::Error>;
}

/// Bit delay provider backed by [`std::thread::sleep`].
///
/// The chip only needs a microsecond between transitions and tolerates
/// arbitrarily more, so the usual oversleeping of an OS timer is fine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepDelay;

impl DelayUs<u16> for SleepDelay {
    fn delay_us(&mut self, us: u16) {
        thread::sleep(Duration::from_micros(u64::from(us)));
    }
}
