#![allow(clippy::integer_arithmetic, clippy::cast_possible_truncation)]

// ref: https://github.com/phip1611/generic-tm1637-gpio-driver-rust/blob/main/src/lib.rs
// ref: https://github.com/igelbox/tm1637-rs/blob/master/examples/main.rs
// ref: https://github.com/rustrum/tmledkey-hal-drv/blob/master/examples/stm32f103/src/main.rs
// ref: https://github.com/rustrum/tmledkey-hal-drv/blob/b5e0759c41442d4e28c0ae26ad2bc393c43f814c/src/lib.rs

extern crate embedded_hal as hal;

use hal::blocking::delay::DelayUs;
use log::{debug, warn};

use crate::errors::TmError;
use crate::line::{OpenDrain, ReadLevel};
use crate::mappings::{display_control_byte, GpioPinValue, DEFAULT_BIT_DELAY_US, ISA};

pub const DISPLAY_REGISTERS_COUNT: usize = 6;

/// Bit-banged TM1637 driver over two open drain lines.
///
/// The driver owns its lines and its delay provider for as long as it
/// lives; [`Tm1637::into_parts`] hands them back. Frames are the atomic
/// unit on the wire: each public operation either sends whole frames or
/// fails before touching the bus at all.
pub struct Tm1637<CLK, DIO, D> {
    clk: CLK,
    dio: DIO,
    delay_fn: D,
    delay_us: u16,
    missed_acks: u32,
}

impl<CLK, DIO, D, E> Tm1637<CLK, DIO, D>
where
    CLK: OpenDrain<Error = E>,
    DIO: OpenDrain<Error = E> + ReadLevel<Error = E>,
    D: DelayUs<u16>,
{
    /// Takes ownership of both lines and the delay provider.
    /// Does not touch the bus; call [`Tm1637::initialize`] for that.
    pub fn new(clk: CLK, dio: DIO, delay_fn: D) -> Self {
        Self {
            clk,
            dio,
            delay_fn,
            delay_us: DEFAULT_BIT_DELAY_US,
            missed_acks: 0,
        }
    }

    /// Brings the chip into a known state: lines idle, write mode with
    /// automatic address increment, all registers blank, display control
    /// set from `brightness` (0 to 7) and `show`.
    pub fn initialize(&mut self, brightness: u8, show: bool) -> anyhow::Result<(), TmError<E>> {
        if brightness > 0b0000_0111 {
            return Err(TmError::Brightness(brightness));
        }

        // known idle state: both lines released, read back high through the pull-ups
        self.clk.release()?;
        self.dio.release()?;
        self.bit_delay();

        // Command 1
        // for more information about this flow: see data sheet / specification of TM1637
        self.start()?;
        self.write_byte_and_wait_ack(ISA::DataCommandWriteToDisplay as u8)?;
        self.stop()?;

        self.clear()?;

        self.write_display_control(brightness, show)
    }

    /// Writes all raw segments data beginning at the position into the display registers.
    /// It uses auto increment internally to write into all further registers.
    ///
    /// * `segments` Raw data describing the bits of the 7 segment display.
    /// * `pos` The start position of the display register, 0 to 5. While
    ///         bytes are written, the address is adjusted internally via
    ///         auto increment.
    ///
    /// Data running past register 5 wraps around in the chip; the caller is
    /// responsible for sizing `segments`. A failed call may be retried as a
    /// whole: rewriting the same registers is idempotent.
    pub fn set_segments(&mut self, segments: &[u8], pos: u8) -> anyhow::Result<(), TmError<E>> {
        if pos >= DISPLAY_REGISTERS_COUNT as u8 {
            return Err(TmError::Position(pos));
        }

        // beeing a little bit more failure tolerant
        if segments.is_empty() {
            return Ok(()); // nothing to do
        }

        debug!(
            "write {} segment byte(s) from position {}",
            segments.len(),
            pos
        );

        // Command 2
        // set the start address; the TM1637 auto increments it internally
        // while the data bytes arrive
        self.start()?;
        self.write_byte_and_wait_ack(ISA::AddressCommandD0 as u8 | pos)?;

        for segment in segments {
            self.write_byte_and_wait_ack(*segment)?;
        }

        self.stop()
    }

    /// Commits a new display control state, leaving the digit registers
    /// untouched. `brightness` is 0 to 7; `show` switches the LEDs on.
    pub fn set_brightness(&mut self, brightness: u8, show: bool) -> anyhow::Result<(), TmError<E>> {
        if brightness > 0b0000_0111 {
            return Err(TmError::Brightness(brightness));
        }

        self.write_display_control(brightness, show)
    }

    /// Clears the display.
    pub fn clear(&mut self) -> anyhow::Result<(), TmError<E>> {
        // begin at position 0 and write 0 into display registers 0 to 5
        self.set_segments(&[0; DISPLAY_REGISTERS_COUNT], 0)
    }

    /// Number of bytes the chip did not acknowledge so far. Purely a
    /// diagnostic: transmission carries on regardless.
    pub fn missed_acks(&self) -> u32 {
        self.missed_acks
    }

    /// Sets the wait between two line transitions. Values below the chip
    /// minimum are raised to [`DEFAULT_BIT_DELAY_US`].
    pub fn set_bit_delay_us(&mut self, us: u16) {
        self.delay_us = us.max(DEFAULT_BIT_DELAY_US);
    }

    /// Hands the lines and the delay provider back.
    pub fn into_parts(self) -> (CLK, DIO, D) {
        (self.clk, self.dio, self.delay_fn)
    }

    /// Command 3: send the "display control"-command.
    fn write_display_control(
        &mut self,
        brightness: u8,
        show: bool,
    ) -> anyhow::Result<(), TmError<E>> {
        self.start()?;
        self.write_byte_and_wait_ack(display_control_byte(brightness, show))?;
        self.stop()
    }

    /// Writes a byte bit by bit and runs the acknowledge cycle.
    fn write_byte_and_wait_ack(&mut self, byte: u8) -> anyhow::Result<(), TmError<E>> {
        let mut data = byte;

        // 8 bits
        for _ in 0_u8..8_u8 {
            // CLK low
            self.clk.drive_low()?;
            self.bit_delay();

            // set the data bit, LSF (least significant bit) first
            let next_gpio_state = GpioPinValue::from(data & 0x01);

            if next_gpio_state == GpioPinValue::High {
                self.dio.release()?;
            } else {
                self.dio.drive_low()?;
            }
            self.bit_delay();

            // CLK high
            self.clk.release()?;
            self.bit_delay();

            // shift to next bit
            data >>= 1_i32;
        }

        self.recv_ack()
    }

    /// This tells the TM1637 that data input starts.
    /// This information stands in the official data sheet.
    ///
    /// CLK is already high here, either from the idle state or because
    /// [`Tm1637::stop`] released it at the end of the previous frame.
    #[inline]
    fn start(&mut self) -> anyhow::Result<(), TmError<E>> {
        // transition from high to low on DIO while CLK is high
        // means: data starts at next clock
        self.dio.drive_low()?;
        self.bit_delay();

        Ok(())
    }

    /// This tells the TM1637 that data input stops.
    /// This information stands in the official data sheet.
    #[inline]
    fn stop(&mut self) -> anyhow::Result<(), TmError<E>> {
        // CLK is low after the acknowledge cycle; raising DIO while CLK is
        // high would read as a stop too early
        self.dio.drive_low()?;
        self.bit_delay();

        self.clk.release()?;
        self.bit_delay();

        self.dio.release()?;
        self.bit_delay();

        Ok(())
    }

    /// Runs one acknowledge cycle after a byte was sent. The chip pulls DIO
    /// low during the ninth clock; a missing pull is counted and logged but
    /// does not fail the transfer.
    fn recv_ack(&mut self) -> anyhow::Result<(), TmError<E>> {
        // ninth clock: release DIO so the chip can drive it
        self.clk.drive_low()?;
        self.dio.release()?;
        self.bit_delay();

        self.clk.release()?;
        self.bit_delay();

        let is_dio_low: bool = !self.dio.is_high()?;

        if !is_dio_low {
            self.missed_acks += 1;
            warn!(
                "tm1637 did not acknowledge a byte (missed acks so far: {})",
                self.missed_acks
            );
        }

        self.clk.drive_low()?;
        self.bit_delay();

        Ok(())
    }

    #[inline]
    fn bit_delay(&mut self) {
        self.delay_fn.delay_us(self.delay_us);
    }
}
