//! Unicorn Mini Hardware Abstraction Layer
//!
//! This crate defines the boundary between the matrix driver and whatever
//! platform layer owns the SPI peripheral and the GPIO lines (a Linux
//! spidev/gpiochip wrapper, an embassy HAL, a test double).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  unicorn-core (framebuffer, protocol,   │
//! │  button state machine)                  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  unicorn-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ unicorn-      │       │  platform     │
//! │ drivers (e-h) │       │  specific     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`bus::ChipSelectBus`] - Chip-select addressed SPI writes
//! - [`gpio::GpioLines`] - Input line configuration, reads, edge interrupts
//! - [`gpio::EdgeHandler`] - Receiver of edge interrupt callbacks

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod gpio;

// Re-export key traits at crate root for convenience
pub use bus::{ChipSelect, ChipSelectBus, SpiConfig};
pub use gpio::{Edge, EdgeHandler, GpioLines, Level, PinMode, Pull};
