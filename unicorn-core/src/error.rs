//! Driver error type

use crate::config::ConfigError;
use crate::frame::OutOfRange;
use crate::protocol::CommandError;

/// Errors returned by the matrix driver
///
/// `E` is the transport's error type. A transport failure leaves the chips
/// in an unknown state; nothing is retried, recovery means building a new
/// driver (which replays the full init sequence).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Bus or GPIO operation failed
    Transport(E),
    /// Invalid construction options
    Config(ConfigError),
    /// Pixel coordinate outside the grid
    OutOfRange { col: usize, row: usize },
    /// Command could not be encoded
    Protocol(CommandError),
    /// Display already torn down
    ShutDown,
}

impl<E> From<ConfigError> for Error<E> {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl<E> From<CommandError> for Error<E> {
    fn from(e: CommandError) -> Self {
        Error::Protocol(e)
    }
}

impl<E> From<OutOfRange> for Error<E> {
    fn from(e: OutOfRange) -> Self {
        Error::OutOfRange {
            col: e.col,
            row: e.row,
        }
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "transport error: {:?}", e),
            Error::Config(e) => write!(f, "invalid configuration: {:?}", e),
            Error::OutOfRange { col, row } => write!(f, "pixel ({}, {}) outside grid", col, row),
            Error::Protocol(e) => write!(f, "command encoding failed: {:?}", e),
            Error::ShutDown => f.write_str("display already shut down"),
        }
    }
}
