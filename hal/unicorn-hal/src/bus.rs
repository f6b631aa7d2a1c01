//! SPI bus abstractions
//!
//! The matrix chips sit on one SPI bus and are told apart by their
//! chip-select line. The driver never reads anything back, so the
//! contract is write-only.

/// Chip-select line index (0 = CE0, 1 = CE1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipSelect(pub u8);

impl ChipSelect {
    /// Raw line index
    pub const fn index(self) -> u8 {
        self.0
    }
}

/// SPI bus master with software-selected chip-select lines
///
/// A transaction is `select_chip` followed by one `write_bytes`. Callers
/// that share the bus must hold their own lock across both calls.
pub trait ChipSelectBus {
    /// Error type for bus operations
    type Error;

    /// Route the next write to the device on `cs`
    fn select_chip(&mut self, cs: ChipSelect) -> Result<(), Self::Error>;

    /// Write a complete command frame to the selected device
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Release the bus once the last command has been sent
    ///
    /// Platforms that do not need an explicit close keep the default.
    fn release(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// SPI configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity
    pub polarity: Polarity,
    /// Clock phase
    pub phase: Phase,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 1_000_000, // 1 MHz
            polarity: Polarity::IdleLow,
            phase: Phase::CaptureOnFirstTransition,
        }
    }
}

impl SpiConfig {
    /// SPI mode number (0-3) for platform APIs that take one
    pub fn mode(&self) -> u8 {
        match (self.polarity, self.phase) {
            (Polarity::IdleLow, Phase::CaptureOnFirstTransition) => 0,
            (Polarity::IdleLow, Phase::CaptureOnSecondTransition) => 1,
            (Polarity::IdleHigh, Phase::CaptureOnFirstTransition) => 2,
            (Polarity::IdleHigh, Phase::CaptureOnSecondTransition) => 3,
        }
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}
