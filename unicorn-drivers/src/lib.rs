//! embedded-hal adapters
//!
//! Bridges the [`unicorn_hal`] boundary traits onto `embedded-hal` 1.0 so
//! the driver core runs on any HAL that implements them:
//!
//! - [`spi::SpiDevicePair`] - two `SpiDevice`s (one per chip) as a
//!   [`ChipSelectBus`](unicorn_hal::ChipSelectBus)
//! - [`gpio::EdgePins`] - four input pins as
//!   [`GpioLines`](unicorn_hal::GpioLines)
//! - [`gpio::watch_button`] / [`gpio::watch_buttons`] - async edge loops
//!   feeding an [`EdgeHandler`](unicorn_hal::EdgeHandler)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod gpio;
pub mod spi;

pub use gpio::{watch_button, watch_buttons, EdgePins, PinError};
pub use spi::{hal_mode, SpiDevicePair, SpiPairError};
