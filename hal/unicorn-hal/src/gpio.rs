//! GPIO line abstractions
//!
//! Lines are addressed by their platform number (BCM numbering on a
//! Raspberry Pi). Edge notifications are delivered to a registered
//! [`EdgeHandler`] from whatever context the platform uses for them.

/// Logic level of an input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_low(self) -> bool {
        self == Level::Low
    }

    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Line direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    Input,
    Output,
}

/// Internal bias resistor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Which transitions raise an interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
    Both,
}

/// Receiver of edge interrupts
///
/// Called with the line that fired and its level sampled at the time of
/// the interrupt. Implementations must not block: the platform may call
/// this from an interrupt handler or a dedicated poll thread.
pub trait EdgeHandler: Sync {
    fn on_edge(&self, line: u8, level: Level);
}

/// GPIO controller
///
/// Implementations handle the actual register (or character device)
/// access for the specific platform.
pub trait GpioLines {
    /// Error type for GPIO operations
    type Error;

    /// Configure direction and bias of a line
    fn configure_pin(&mut self, line: u8, mode: PinMode, pull: Pull) -> Result<(), Self::Error>;

    /// Sample the current level of a line
    fn read_pin(&mut self, line: u8) -> Result<Level, Self::Error>;

    /// Deliver `edge` transitions on `line` to `handler`
    fn register_edge_interrupt(
        &mut self,
        line: u8,
        edge: Edge,
        handler: &'static dyn EdgeHandler,
    ) -> Result<(), Self::Error>;
}
