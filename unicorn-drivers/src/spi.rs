//! Two SPI devices as one chip-select bus
//!
//! On embedded-hal 1.0 a [`SpiDevice`] owns its chip-select and asserts it
//! for the length of each transaction, so the two matrix chips are two
//! devices on a shared bus. [`SpiDevicePair`] maps `ChipSelect(0)` to the
//! first and `ChipSelect(1)` to the second.

use embedded_hal::spi::{Mode, Phase as HalPhase, Polarity as HalPolarity, SpiDevice};
use unicorn_hal::bus::{Phase, Polarity};
use unicorn_hal::{ChipSelect, ChipSelectBus, SpiConfig};

/// Errors from [`SpiDevicePair`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiPairError<E0, E1> {
    /// Transfer failed on the first device
    First(E0),
    /// Transfer failed on the second device
    Second(E1),
    /// `write_bytes` called with no chip selected
    NoChipSelected,
    /// Chip-select index other than 0 or 1
    UnknownChip(u8),
}

/// Two chip-selected SPI devices sharing one bus
pub struct SpiDevicePair<D0, D1> {
    first: D0,
    second: D1,
    selected: Option<ChipSelect>,
}

impl<D0, D1> SpiDevicePair<D0, D1> {
    pub fn new(first: D0, second: D1) -> Self {
        Self {
            first,
            second,
            selected: None,
        }
    }

    /// Currently selected chip, if any
    pub fn selected(&self) -> Option<ChipSelect> {
        self.selected
    }

    /// Give the devices back
    pub fn into_inner(self) -> (D0, D1) {
        (self.first, self.second)
    }
}

impl<D0: SpiDevice, D1: SpiDevice> ChipSelectBus for SpiDevicePair<D0, D1> {
    type Error = SpiPairError<D0::Error, D1::Error>;

    fn select_chip(&mut self, cs: ChipSelect) -> Result<(), Self::Error> {
        match cs.index() {
            0 | 1 => {
                self.selected = Some(cs);
                Ok(())
            }
            other => Err(SpiPairError::UnknownChip(other)),
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        match self.selected.map(ChipSelect::index) {
            Some(0) => self.first.write(data).map_err(SpiPairError::First),
            Some(1) => self.second.write(data).map_err(SpiPairError::Second),
            _ => Err(SpiPairError::NoChipSelected),
        }
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        #[cfg(feature = "defmt")]
        defmt::debug!("SPI pair released");

        self.selected = None;
        Ok(())
    }
}

/// embedded-hal mode for a [`SpiConfig`]
///
/// HALs take the mode and frequency when the bus is built; the frequency is
/// passed through unchanged.
pub fn hal_mode(config: &SpiConfig) -> Mode {
    Mode {
        polarity: match config.polarity {
            Polarity::IdleLow => HalPolarity::IdleLow,
            Polarity::IdleHigh => HalPolarity::IdleHigh,
        },
        phase: match config.phase {
            Phase::CaptureOnFirstTransition => HalPhase::CaptureOnFirstTransition,
            Phase::CaptureOnSecondTransition => HalPhase::CaptureOnSecondTransition,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::spi::{ErrorKind, ErrorType, Operation};
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct MockSpiError;

    impl embedded_hal::spi::Error for MockSpiError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Mock SPI device recording every write transaction
    #[derive(Default)]
    struct MockSpi {
        writes: Vec<Vec<u8>>,
        fail: bool,
    }

    impl ErrorType for MockSpi {
        type Error = MockSpiError;
    }

    impl SpiDevice for MockSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), MockSpiError> {
            if self.fail {
                return Err(MockSpiError);
            }
            for op in operations {
                if let Operation::Write(data) = op {
                    self.writes.push(data.to_vec());
                }
            }
            Ok(())
        }
    }

    /// Device that never fails
    #[derive(Default)]
    struct NullSpi {
        count: usize,
    }

    impl ErrorType for NullSpi {
        type Error = Infallible;
    }

    impl SpiDevice for NullSpi {
        fn transaction(&mut self, _operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
            self.count += 1;
            Ok(())
        }
    }

    #[test]
    fn test_routes_by_chip_select() {
        let mut pair = SpiDevicePair::new(MockSpi::default(), MockSpi::default());

        pair.select_chip(ChipSelect(0)).unwrap();
        pair.write_bytes(&[0xCC]).unwrap();
        pair.select_chip(ChipSelect(1)).unwrap();
        pair.write_bytes(&[0x37, 0x01]).unwrap();
        pair.write_bytes(&[0x20, 0x00]).unwrap();

        let (first, second) = pair.into_inner();
        assert_eq!(first.writes, [std::vec![0xCC]]);
        assert_eq!(second.writes, [std::vec![0x37, 0x01], std::vec![0x20, 0x00]]);
    }

    #[test]
    fn test_write_without_select() {
        let mut pair = SpiDevicePair::new(MockSpi::default(), NullSpi::default());
        assert_eq!(pair.write_bytes(&[0x00]), Err(SpiPairError::NoChipSelected));
    }

    #[test]
    fn test_unknown_chip() {
        let mut pair = SpiDevicePair::new(MockSpi::default(), NullSpi::default());
        assert_eq!(pair.select_chip(ChipSelect(2)), Err(SpiPairError::UnknownChip(2)));
        assert_eq!(pair.selected(), None);
    }

    #[test]
    fn test_device_error_names_the_chip() {
        let failing = MockSpi {
            fail: true,
            ..MockSpi::default()
        };
        let mut pair = SpiDevicePair::new(failing, NullSpi::default());

        pair.select_chip(ChipSelect(0)).unwrap();
        assert_eq!(pair.write_bytes(&[0x41]), Err(SpiPairError::First(MockSpiError)));

        pair.select_chip(ChipSelect(1)).unwrap();
        assert_eq!(pair.write_bytes(&[0x41]), Ok(()));
    }

    #[test]
    fn test_release_deselects() {
        let mut pair = SpiDevicePair::new(NullSpi::default(), NullSpi::default());
        pair.select_chip(ChipSelect(1)).unwrap();
        pair.release().unwrap();
        assert_eq!(pair.write_bytes(&[0x35, 0x00]), Err(SpiPairError::NoChipSelected));
    }

    #[test]
    fn test_hal_mode() {
        let mode = hal_mode(&SpiConfig::default());
        assert_eq!(mode, embedded_hal::spi::MODE_0);

        let config = SpiConfig {
            polarity: Polarity::IdleHigh,
            phase: Phase::CaptureOnSecondTransition,
            ..SpiConfig::default()
        };
        assert_eq!(hal_mode(&config), embedded_hal::spi::MODE_3);
    }
}
