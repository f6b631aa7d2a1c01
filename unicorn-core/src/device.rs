//! Device protocol driver for the two HT16D35A chips
//!
//! Both chips share the SPI bus. Each is addressed by its chip-select
//! line and owns one contiguous 224-byte half of the physical buffer.

use unicorn_hal::{ChipSelect, ChipSelectBus};

use crate::error::Error;
use crate::frame::{PhysicalBuffer, CHIP_BUFFER_LEN};
use crate::protocol::{Command, SystemMode, INIT_BRIGHTNESS};

/// One matrix driver chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Device {
    /// Chip-select line
    pub cs: ChipSelect,
    /// Start of this chip's slice in the physical buffer
    pub offset: usize,
}

impl Device {
    /// This chip's slice of the physical buffer
    pub fn slice<'a>(&self, buffer: &'a PhysicalBuffer) -> &'a [u8] {
        &buffer[self.offset..self.offset + CHIP_BUFFER_LEN]
    }
}

/// The left (columns 0-8) and right (columns 9-16) chips
pub const DEVICES: [Device; 2] = [
    Device {
        cs: ChipSelect(0),
        offset: 0,
    },
    Device {
        cs: ChipSelect(1),
        offset: CHIP_BUFFER_LEN,
    },
];

/// HT16D35A pair on a shared bus
///
/// Holds no locks itself; callers serialize access (see
/// [`crate::display::UnicornMini`]).
pub struct Ht16d35<B> {
    bus: B,
}

impl<B: ChipSelectBus> Ht16d35<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Send one command to one chip
    pub fn send(&mut self, device: &Device, command: Command<'_>) -> Result<(), Error<B::Error>> {
        let frame = command.encode()?;
        self.bus.select_chip(device.cs).map_err(Error::Transport)?;
        self.bus.write_bytes(&frame).map_err(Error::Transport)?;
        Ok(())
    }

    /// Send the same command to both chips
    pub fn broadcast(&mut self, command: Command<'_>) -> Result<(), Error<B::Error>> {
        for device in DEVICES.iter() {
            self.send(device, command)?;
        }
        Ok(())
    }

    /// Bring both chips from power-on state to displaying `buffer`
    ///
    /// The chips ignore mode and display commands until reset, so the
    /// order here is fixed.
    pub fn init(&mut self, buffer: &PhysicalBuffer) -> Result<(), Error<B::Error>> {
        for device in DEVICES.iter() {
            #[cfg(feature = "defmt")]
            defmt::debug!("Initialising HT16D35A on CS{}", device.cs.index());

            self.send(device, Command::SoftReset)?;
            self.send(device, Command::GlobalBrightness(INIT_BRIGHTNESS))?;
            self.send(device, Command::ScrollCtrl(0x00))?;
            self.send(device, Command::SystemCtrl(SystemMode::Off))?;
            self.write_device(device, buffer)?;
            self.send(device, Command::ComPins(true))?;
            self.send(device, Command::RowPins(true))?;
            self.send(device, Command::SystemCtrl(SystemMode::On))?;
        }
        Ok(())
    }

    /// Set global brightness (0-63) on both chips
    pub fn set_brightness(&mut self, level: u8) -> Result<(), Error<B::Error>> {
        self.broadcast(Command::GlobalBrightness(level))
    }

    /// Push each chip's slice of `buffer` to its display RAM
    pub fn write_display(&mut self, buffer: &PhysicalBuffer) -> Result<(), Error<B::Error>> {
        for device in DEVICES.iter() {
            self.write_device(device, buffer)?;
        }
        Ok(())
    }

    fn write_device(&mut self, device: &Device, buffer: &PhysicalBuffer) -> Result<(), Error<B::Error>> {
        self.send(
            device,
            Command::WriteDisplay {
                address: 0x00,
                data: device.slice(buffer),
            },
        )
    }

    /// Switch both chips' outputs off and release the bus
    pub fn teardown(mut self) -> Result<B, Error<B::Error>> {
        for device in DEVICES.iter() {
            self.send(device, Command::ComPins(false))?;
            self.send(device, Command::RowPins(false))?;
            self.send(device, Command::SystemCtrl(SystemMode::Off))?;
        }
        self.bus.release().map_err(Error::Transport)?;
        Ok(self.bus)
    }

    /// Underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::opcode;
    use std::vec::Vec;

    /// Mock bus recording (chip select, frame) pairs
    #[derive(Default)]
    struct MockBus {
        selected: Option<ChipSelect>,
        writes: Vec<(u8, Vec<u8>)>,
        released: bool,
        fail_after: Option<usize>,
    }

    #[derive(Debug, PartialEq)]
    struct MockError;

    impl ChipSelectBus for MockBus {
        type Error = MockError;

        fn select_chip(&mut self, cs: ChipSelect) -> Result<(), MockError> {
            self.selected = Some(cs);
            Ok(())
        }

        fn write_bytes(&mut self, data: &[u8]) -> Result<(), MockError> {
            if self.fail_after == Some(self.writes.len()) {
                return Err(MockError);
            }
            let cs = self.selected.ok_or(MockError)?;
            self.writes.push((cs.index(), data.to_vec()));
            Ok(())
        }

        fn release(&mut self) -> Result<(), MockError> {
            self.released = true;
            Ok(())
        }
    }

    fn opcodes_for(bus: &MockBus, cs: u8) -> Vec<u8> {
        bus.writes
            .iter()
            .filter(|(c, _)| *c == cs)
            .map(|(_, frame)| frame[0])
            .collect()
    }

    #[test]
    fn test_devices_split_buffer() {
        let mut buffer = [0u8; crate::frame::PHYSICAL_LEN];
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = (i / CHIP_BUFFER_LEN) as u8 + 1;
        }
        assert!(DEVICES[0].slice(&buffer).iter().all(|&b| b == 1));
        assert!(DEVICES[1].slice(&buffer).iter().all(|&b| b == 2));
    }

    #[test]
    fn test_init_sequence_order() {
        let mut driver = Ht16d35::new(MockBus::default());
        driver.init(&[0u8; crate::frame::PHYSICAL_LEN]).unwrap();

        let expected = [
            opcode::SOFT_RESET,
            opcode::GLOBAL_BRIGHTNESS,
            opcode::SCROLL_CTRL,
            opcode::SYSTEM_CTRL,
            opcode::WRITE_DISPLAY,
            opcode::COM_PIN_CTRL,
            opcode::ROW_PIN_CTRL,
            opcode::SYSTEM_CTRL,
        ];
        assert_eq!(opcodes_for(driver.bus(), 0), expected);
        assert_eq!(opcodes_for(driver.bus(), 1), expected);

        // First chip fully configured before the second is touched
        assert!(driver.bus().writes[..8].iter().all(|(cs, _)| *cs == 0));
        assert_eq!(driver.bus().writes.last().unwrap().1, [0x35, 0x03]);
    }

    #[test]
    fn test_init_fails_on_transport_error() {
        let bus = MockBus {
            fail_after: Some(3),
            ..MockBus::default()
        };
        let mut driver = Ht16d35::new(bus);
        let result = driver.init(&[0u8; crate::frame::PHYSICAL_LEN]);
        assert_eq!(result, Err(Error::Transport(MockError)));
        assert_eq!(driver.bus().writes.len(), 3);
    }

    #[test]
    fn test_set_brightness_both_chips() {
        let mut driver = Ht16d35::new(MockBus::default());
        driver.set_brightness(42).unwrap();
        assert_eq!(driver.bus().writes.len(), 2);
        assert_eq!(driver.bus().writes[0], (0, std::vec![0x37, 42]));
        assert_eq!(driver.bus().writes[1], (1, std::vec![0x37, 42]));
    }

    #[test]
    fn test_teardown_sequence() {
        let driver = Ht16d35::new(MockBus::default());
        let bus = driver.teardown().unwrap();
        assert!(bus.released);
        let frames: Vec<&[u8]> = bus.writes.iter().map(|(_, f)| f.as_slice()).collect();
        assert_eq!(
            frames,
            [
                &[0x41, 0x00][..],
                &[0x42, 0x00, 0x00, 0x00, 0x00],
                &[0x35, 0x00],
                &[0x41, 0x00],
                &[0x42, 0x00, 0x00, 0x00, 0x00],
                &[0x35, 0x00],
            ]
        );
    }
}
