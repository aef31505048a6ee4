#![allow(dead_code)]

//! Shared harness for the integration tests: a pair of recording mock
//! lines playing the role of the bus, a decoder that reconstructs frames
//! from the raw transitions, and a log bootstrap.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::blocking::delay::DelayUs;
use fern::colors::{Color, ColoredLevelConfig};
use tm1637_tristate::{OpenDrain, ReadLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wire {
    Clk,
    Dio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOp {
    DriveLow,
    Release,
}

/// Both lines log into one sequence so the ordering across the two wires
/// is preserved, which is what start/stop detection depends on.
pub type SharedLog = Rc<RefCell<Vec<(Wire, LineOp)>>>;

/// One leg of the bus. Records every transition; when `acks` is set the
/// fake chip behind it pulls DIO low whenever the master has released it.
pub struct RecordingLine {
    wire: Wire,
    log: SharedLog,
    driven_low: bool,
    acks: bool,
}

impl RecordingLine {
    /// A CLK/DIO pair over one shared log.
    pub fn pair(acks: bool) -> (Self, Self, SharedLog) {
        let log: SharedLog = Rc::new(RefCell::new(Vec::new()));

        let clk = Self {
            wire: Wire::Clk,
            log: Rc::clone(&log),
            driven_low: false,
            acks,
        };
        let dio = Self {
            wire: Wire::Dio,
            log: Rc::clone(&log),
            driven_low: false,
            acks,
        };

        (clk, dio, log)
    }
}

impl OpenDrain for RecordingLine {
    type Error = Infallible;

    fn drive_low(&mut self) -> Result<(), Infallible> {
        self.driven_low = true;
        self.log.borrow_mut().push((self.wire, LineOp::DriveLow));
        Ok(())
    }

    fn release(&mut self) -> Result<(), Infallible> {
        self.driven_low = false;
        self.log.borrow_mut().push((self.wire, LineOp::Release));
        Ok(())
    }
}

impl ReadLevel for RecordingLine {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        if self.driven_low {
            return Ok(false);
        }

        // released: the fake chip decides the level
        Ok(!self.acks)
    }
}

/// Delay provider that only counts how often it was asked to wait.
#[derive(Default)]
pub struct CountingDelay {
    pub calls: usize,
}

impl DelayUs<u16> for CountingDelay {
    fn delay_us(&mut self, _us: u16) {
        self.calls += 1;
    }
}

/// Delay provider that does not wait at all.
pub struct NoDelay;

impl DelayUs<u16> for NoDelay {
    fn delay_us(&mut self, _us: u16) {}
}

/// What the chip would have seen on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    Start,
    /// Eight data bits, LSB first, followed by the ACK slot. `ack_released`
    /// records whether the master had let go of DIO for that ninth clock.
    Byte { value: u8, ack_released: bool },
    Stop,
}

/// Replays the transition log the way the chip's input stage would see it.
///
/// Both lines start at the pulled-up level. A DIO edge while CLK is high
/// is a start (falling) or stop (rising) condition; every CLK rising edge
/// samples DIO as the next bit. Eight bits plus the ACK slot make a byte;
/// a start or stop discards any partial bit buffer.
pub fn decode(log: &[(Wire, LineOp)]) -> Vec<BusEvent> {
    let mut events = Vec::new();
    let mut clk = true;
    let mut dio = true;
    let mut bits: Vec<bool> = Vec::new();

    for &(wire, op) in log {
        let level = op == LineOp::Release;

        match wire {
            Wire::Clk => {
                let rising = !clk && level;
                clk = level;

                if rising {
                    bits.push(dio);

                    if bits.len() == 9 {
                        let mut value = 0_u8;
                        for (i, &bit) in bits.iter().take(8).enumerate() {
                            if bit {
                                value |= 1 << i;
                            }
                        }

                        events.push(BusEvent::Byte {
                            value,
                            ack_released: bits[8],
                        });
                        bits.clear();
                    }
                }
            }
            Wire::Dio => {
                let was = dio;
                dio = level;

                if clk {
                    if was && !dio {
                        events.push(BusEvent::Start);
                        bits.clear();
                    } else if !was && dio {
                        events.push(BusEvent::Stop);
                        bits.clear();
                    }
                }
            }
        }
    }

    events
}

/// Splits a decoded event list into frames, each the byte sequence between
/// one start and the matching stop. Panics on malformed framing and on any
/// byte whose ACK slot was not released by the master.
pub fn frames(events: &[BusEvent]) -> Vec<Vec<u8>> {
    let mut all = Vec::new();
    let mut current: Option<Vec<u8>> = None;

    for event in events {
        match *event {
            BusEvent::Start => {
                assert!(current.is_none(), "start condition inside an open frame");
                current = Some(Vec::new());
            }
            BusEvent::Byte {
                value,
                ack_released,
            } => {
                assert!(
                    ack_released,
                    "byte {:#04x} was clocked without releasing DIO for the ACK slot",
                    value
                );
                match current.as_mut() {
                    Some(frame) => frame.push(value),
                    None => panic!("byte {:#04x} outside of a frame", value),
                }
            }
            BusEvent::Stop => match current.take() {
                Some(frame) => all.push(frame),
                None => panic!("stop condition without a start"),
            },
        }
    }

    assert!(current.is_none(), "unterminated frame");
    all
}

/// Decodes and splits a shared log in one go.
pub fn frames_of(log: &SharedLog) -> Vec<Vec<u8>> {
    frames(&decode(&log.borrow()))
}

/// Installs the colored stdout logger. Later calls are no-ops because the
/// global logger can only be set once per process.
pub fn setup_logging() {
    // configure colors for the whole line
    let colors_line = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        // we actually don't need to specify the color for debug and info, they are white by default
        .info(Color::Magenta)
        .debug(Color::BrightBlack)
        // depending on the terminals color scheme, this is the same as the background color
        .trace(Color::BrightBlack);

    let _ = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{target}][{level}] {message}",
                target = record.target(),
                level = colors_line.color(record.level()),
                message = message,
            ));
        })
        .level(log::LevelFilter::Debug)
        .chain(std::io::stdout())
        .apply();
}
