#![deny(clippy::all)]
#![warn(
    clippy::all,
    clippy::restriction,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::print_stdout
)]
#![allow(
    clippy::missing_docs_in_private_items,
    clippy::implicit_return,
    clippy::similar_names,
    clippy::blanket_clippy_restriction_lints,
    clippy::module_name_repetitions
)]

//! Bit-banged driver for the TM1637 seven segment LED controller.
//!
//! The two bus lines are modelled as open drain: a line is either driven
//! low or released to its pull-up, never driven high. Segment masks come
//! out of a compositional [`CharacterTable`], and [`DisplaySession`] layers
//! a small text stream on top of the raw driver.
//!
//! Every bus operation takes `&mut self` and a frame is the atomic unit on
//! the wire. When the driver has to be shared between threads, wrap the
//! whole driver in a mutex and hold the lock across the entire call.

pub mod driver;
pub mod errors;
pub mod line;
pub mod mappings;
pub mod segments;
pub mod session;

pub use crate::driver::{Tm1637, DISPLAY_REGISTERS_COUNT};
pub use crate::errors::TmError;
pub use crate::line::{OpenDrain, ReadLevel, SleepDelay};
pub use crate::mappings::{SegmentBits, DEFAULT_BIT_DELAY_US};
pub use crate::segments::{CharacterTable, SegmentLayout};
pub use crate::session::{DisplaySession, WriteOutcome};
