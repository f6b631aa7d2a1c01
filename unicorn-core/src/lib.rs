//! Driver core for the Pimoroni Unicorn HAT Mini
//!
//! A 17×7 RGB LED matrix driven by two HT16D35A chips on one SPI bus, plus
//! four push buttons on interrupt-capable GPIO lines. This crate contains
//! everything that does not depend on a specific platform:
//!
//! - Logical framebuffer and the pixel lookup table
//! - HT16D35A command encoding and the two-chip protocol driver
//! - Button state machine and event publishing
//! - Configuration types and the driver error type
//!
//! The SPI and GPIO access layer is supplied through the traits in
//! `unicorn-hal`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod buttons;
pub mod config;
pub mod device;
pub mod display;
pub mod error;
pub mod frame;
pub mod lut;
pub mod protocol;

pub use buttons::{Button, ButtonController, ButtonEvent, EventKind, EventSubscriber};
pub use config::{ConfigError, DisplayConfig};
pub use display::UnicornMini;
pub use error::Error;
pub use frame::{FrameBuffer, Rgb, COLS, ROWS};
