//! Text sessions on top of the raw driver.

use embedded_hal::blocking::delay::DelayUs;
use log::debug;

use crate::driver::{Tm1637, DISPLAY_REGISTERS_COUNT};
use crate::errors::TmError;
use crate::line::{OpenDrain, ReadLevel};
use crate::segments::CharacterTable;

/// What a [`DisplaySession::write_str`] call did: how many characters made
/// it onto the display and how many were dropped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub written: usize,
    pub skipped: usize,
}

/// A cursor-style text view of the display.
///
/// Characters advance a column from 0 to 5; the display never wraps.
/// Two control characters are interpreted: `'\n'` schedules a full clear
/// that runs right before the next displayable character, `'\r'` moves
/// the column back to 0 so the line can be overwritten in place.
/// Characters without a segment shape are skipped, counted and logged.
pub struct DisplaySession<'t, CLK, DIO, D> {
    tm: Tm1637<CLK, DIO, D>,
    table: &'t CharacterTable,
    column: u8,
    pending_clear: bool,
}

impl<'t, CLK, DIO, D, E> DisplaySession<'t, CLK, DIO, D>
where
    CLK: OpenDrain<Error = E>,
    DIO: OpenDrain<Error = E> + ReadLevel<Error = E>,
    D: DelayUs<u16>,
{
    /// Opens a session over an initialized driver and blanks the display
    /// so the column state and the glass agree.
    pub fn open(
        mut tm: Tm1637<CLK, DIO, D>,
        table: &'t CharacterTable,
    ) -> anyhow::Result<Self, TmError<E>> {
        tm.clear()?;

        Ok(Self {
            tm,
            table,
            column: 0,
            pending_clear: false,
        })
    }

    /// Writes `text` starting at the current column.
    ///
    /// Consecutive characters that resolve to a mask are sent as one
    /// segment frame; a batch flushes on `'\n'`, `'\r'`, a full display
    /// and at the end of the call.
    pub fn write_str(&mut self, text: &str) -> anyhow::Result<WriteOutcome, TmError<E>> {
        let mut outcome = WriteOutcome::default();
        let mut batch: Vec<u8> = Vec::with_capacity(DISPLAY_REGISTERS_COUNT);
        let mut batch_start = self.column;

        for ch in text.chars() {
            match ch {
                '\n' => {
                    self.flush(&mut batch, batch_start)?;
                    self.pending_clear = true;
                }
                '\r' => {
                    self.flush(&mut batch, batch_start)?;
                    self.column = 0;
                }
                ch => {
                    let mask = match self.table.lookup(ch) {
                        Some(mask) => mask,
                        None => {
                            debug!("non-displayable character {:?} skipped", ch);
                            outcome.skipped += 1;
                            continue;
                        }
                    };

                    // a batch never survives a '\n', so nothing to flush here
                    if self.pending_clear {
                        self.tm.clear()?;
                        self.column = 0;
                        self.pending_clear = false;
                    }

                    if self.column >= DISPLAY_REGISTERS_COUNT as u8 {
                        debug!("display is full, dropping {:?}", ch);
                        outcome.skipped += 1;
                        continue;
                    }

                    if batch.is_empty() {
                        batch_start = self.column;
                    }
                    batch.push(mask);
                    self.column += 1;
                    outcome.written += 1;

                    if self.column >= DISPLAY_REGISTERS_COUNT as u8 {
                        self.flush(&mut batch, batch_start)?;
                    }
                }
            }
        }

        self.flush(&mut batch, batch_start)?;

        Ok(outcome)
    }

    /// Hands the driver back.
    pub fn into_inner(self) -> Tm1637<CLK, DIO, D> {
        self.tm
    }

    fn flush(&mut self, batch: &mut Vec<u8>, start: u8) -> anyhow::Result<(), TmError<E>> {
        if batch.is_empty() {
            return Ok(());
        }

        self.tm.set_segments(batch, start)?;
        batch.clear();

        Ok(())
    }
}
