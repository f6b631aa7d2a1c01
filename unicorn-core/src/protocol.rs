//! HT16D35A command encoding
//!
//! Every command is a single opcode byte followed by a fixed or
//! variable-length payload, sent as one SPI write with the chip's
//! chip-select asserted. Nothing is read back.
//!
//! ```text
//! ┌────────┬──────────────────────────┐
//! │ OPCODE │ PAYLOAD                  │
//! │ 1B     │ 0–225B (write display)   │
//! └────────┴──────────────────────────┘
//! ```

use heapless::Vec;

use crate::frame::CHIP_BUFFER_LEN;

/// HT16D35A opcodes
pub mod opcode {
    pub const SOFT_RESET: u8 = 0xCC;
    pub const GLOBAL_BRIGHTNESS: u8 = 0x37;
    pub const COM_PIN_CTRL: u8 = 0x41;
    pub const ROW_PIN_CTRL: u8 = 0x42;
    pub const WRITE_DISPLAY: u8 = 0x80;
    pub const READ_DISPLAY: u8 = 0x81;
    pub const SYSTEM_CTRL: u8 = 0x35;
    pub const SCROLL_CTRL: u8 = 0x20;
}

/// Largest encoded command: opcode, RAM address, full display RAM
pub const MAX_COMMAND_LEN: usize = CHIP_BUFFER_LEN + 2;

/// Highest global brightness level (6-bit)
pub const MAX_BRIGHTNESS: u8 = 63;

/// Brightness sent during init, before the configured level
pub const INIT_BRIGHTNESS: u8 = 0x01;

/// Encoded command frame
pub type CommandFrame = Vec<u8, MAX_COMMAND_LEN>;

/// Command encoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Display data longer than the chip's RAM
    PayloadTooLarge,
}

/// SYSTEM_CTRL modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemMode {
    /// Oscillator and display off
    Off,
    /// Oscillator and display on
    On,
}

impl SystemMode {
    fn to_byte(self) -> u8 {
        match self {
            SystemMode::Off => 0x00,
            SystemMode::On => 0x03,
        }
    }
}

/// Commands sent to a chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    SoftReset,
    /// Global brightness level (clamped to 0-63 on encode)
    GlobalBrightness(u8),
    /// Scroll mode byte (0 = scrolling off)
    ScrollCtrl(u8),
    SystemCtrl(SystemMode),
    /// Enable (`true`) or disable all COM pin drivers
    ComPins(bool),
    /// Enable (`true`) or disable all ROW pin drivers
    RowPins(bool),
    /// Write `data` to display RAM starting at `address`
    WriteDisplay { address: u8, data: &'a [u8] },
}

impl Command<'_> {
    /// Opcode byte for this command
    pub fn opcode(&self) -> u8 {
        match self {
            Command::SoftReset => opcode::SOFT_RESET,
            Command::GlobalBrightness(_) => opcode::GLOBAL_BRIGHTNESS,
            Command::ScrollCtrl(_) => opcode::SCROLL_CTRL,
            Command::SystemCtrl(_) => opcode::SYSTEM_CTRL,
            Command::ComPins(_) => opcode::COM_PIN_CTRL,
            Command::RowPins(_) => opcode::ROW_PIN_CTRL,
            Command::WriteDisplay { .. } => opcode::WRITE_DISPLAY,
        }
    }

    /// Encode into a wire frame
    pub fn encode(&self) -> Result<CommandFrame, CommandError> {
        let mut frame = CommandFrame::new();
        // Fixed-size commands always fit; only display data is checked.
        let _ = frame.push(self.opcode());

        match *self {
            Command::SoftReset => {}
            Command::GlobalBrightness(level) => {
                let _ = frame.push(level.min(MAX_BRIGHTNESS));
            }
            Command::ScrollCtrl(mode) => {
                let _ = frame.push(mode);
            }
            Command::SystemCtrl(mode) => {
                let _ = frame.push(mode.to_byte());
            }
            Command::ComPins(on) => {
                let _ = frame.push(if on { 0xFF } else { 0x00 });
            }
            Command::RowPins(on) => {
                let fill = if on { 0xFF } else { 0x00 };
                let _ = frame.extend_from_slice(&[fill; 4]);
            }
            Command::WriteDisplay { address, data } => {
                if data.len() > CHIP_BUFFER_LEN {
                    return Err(CommandError::PayloadTooLarge);
                }
                let _ = frame.push(address);
                frame
                    .extend_from_slice(data)
                    .map_err(|_| CommandError::PayloadTooLarge)?;
            }
        }

        Ok(frame)
    }
}

/// Convert a 0.0-1.0 brightness to the chip's 0-63 level
///
/// Out-of-range values are clamped and NaN is treated as 0.
pub fn brightness_level(brightness: f32) -> u8 {
    let clamped = clamp_brightness(brightness);
    // Non-negative, so the truncating cast is floor().
    (f32::from(MAX_BRIGHTNESS) * clamped) as u8
}

/// Clamp a brightness to 0.0-1.0, mapping NaN to 0.0
pub fn clamp_brightness(brightness: f32) -> f32 {
    if brightness.is_nan() {
        return 0.0;
    }
    brightness.clamp(0.0, 1.0)
}
