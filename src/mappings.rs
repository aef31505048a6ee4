/// Shows which segment has which bit.
#[repr(u8)]
pub enum SegmentBits {
    SegA = 0b0000_0001,
    SegB = 0b0000_0010,
    SegC = 0b0000_0100,
    SegD = 0b0000_1000,
    SegE = 0b0001_0000,
    SegF = 0b0010_0000,
    SegG = 0b0100_0000,

    // double point on AzDelivery 4-digit 7 segment display.
    SegColonOrDot = 0b1000_0000,
}

/// The "ISA"/Commands of the TM1637. See data sheet
/// for more information. This is only a subset of the possible values.
///
/// These are the 3 base commands; bits 6 & 7 mark the kind of command,
/// the low bits carry the payload (address, brightness).
#[repr(u8)]
pub enum ISA {
    /// "write data to display register"-mode with automatic address increment.
    DataCommandWriteToDisplay = 0b0100_0000,

    /// Starts at display address zero. Each further byte that is send will go
    /// into the next display address. The micro controller does an internal auto increment
    /// of the address. See the data sheet for more information.
    /// OR the start position (0 to 5) into the low bits.
    AddressCommandD0 = 0b1100_0000,

    /// Display control base. Bits 0 - 2 tell the brightness,
    /// bit 3 is display on/off.
    DisplayControlOff = 0b1000_0000,
}

/// Whether the display is on or off.
/// The TM1637 "DisplayControl"-command transports the display on/off information
/// in the third bit (2^3) of the command.
#[repr(u8)]
pub enum DisplayState {
    /// Display off.
    Off = 0b0000,
    /// Display On.
    On = 0b1000,
}

#[derive(Clone, Copy, PartialEq)]
pub enum GpioPinValue {
    /// Low.
    Low,
    /// High. An open drain line reaches this level by being released.
    High,
}

impl From<u8> for GpioPinValue {
    fn from(x: u8) -> Self {
        if x == 0 {
            Self::Low
        } else {
            Self::High
        }
    }
}

/// Lower bound for the wait between two line transitions, in microseconds.
/// The chip tolerates arbitrarily longer waits.
pub const DEFAULT_BIT_DELAY_US: u16 = 1;

/// Composes the display control command byte from a brightness level and the
/// show flag. Only the low three brightness bits are used; range validation
/// happens at the driver boundary.
pub const fn display_control_byte(brightness: u8, show: bool) -> u8 {
    let state = if show { DisplayState::On } else { DisplayState::Off };

    ISA::DisplayControlOff as u8 | state as u8 | (brightness & 0b0000_0111)
}
