//! Button lines on embedded-hal input pins
//!
//! embedded-hal has no interrupt-callback API. Edges are awaited with
//! [`Wait::wait_for_any_edge`] in an async loop instead, and each one is
//! handed to the registered [`EdgeHandler`] with the level read straight
//! after it.

use core::convert::Infallible;

use embassy_futures::select::{select4, select_array, Either4};
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;
use unicorn_hal::{Edge, EdgeHandler, GpioLines, Level, PinMode, Pull};

/// Errors from [`EdgePins`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError<E> {
    /// The pin driver failed
    Pin { line: u8, error: E },
    /// No pin is wired to this line
    UnknownLine(u8),
    /// Lines here are inputs only
    NotInput(u8),
    /// Only dual-edge watching is available
    UnsupportedEdge(u8),
    /// `run` called before a handler was registered
    NoHandler,
}

/// Watch one pin forever, reporting every edge to `handler`
///
/// Only returns if the pin fails.
pub async fn watch_button<P>(mut pin: P, line: u8, handler: &dyn EdgeHandler) -> Result<Infallible, P::Error>
where
    P: InputPin + Wait,
{
    loop {
        pin.wait_for_any_edge().await?;
        let level = Level::from(pin.is_high()?);

        #[cfg(feature = "defmt")]
        defmt::trace!("Edge on line {}: {}", line, level.is_high());

        handler.on_edge(line, level);
    }
}

/// Watch four pins, returning the first failure and the line it came from
pub async fn watch_buttons<P>(pins: [(u8, P); 4], handler: &dyn EdgeHandler) -> (u8, P::Error)
where
    P: InputPin + Wait,
{
    let [(l0, p0), (l1, p1), (l2, p2), (l3, p3)] = pins;
    let result = select4(
        watch_button(p0, l0, handler),
        watch_button(p1, l1, handler),
        watch_button(p2, l2, handler),
        watch_button(p3, l3, handler),
    )
    .await;

    let (line, result) = match result {
        Either4::First(r) => (l0, r),
        Either4::Second(r) => (l1, r),
        Either4::Third(r) => (l2, r),
        Either4::Fourth(r) => (l3, r),
    };
    let error = match result {
        Ok(never) => match never {},
        Err(error) => error,
    };
    line_error(line, error)
}

fn line_error<E>(line: u8, error: E) -> (u8, E) {
    #[cfg(feature = "defmt")]
    defmt::warn!("Button line {} stopped", line);

    (line, error)
}

/// Input pins addressed by line number
///
/// Pull resistors are chosen when the HAL pin is constructed, so
/// `configure_pin` only checks the line exists. Edges reach the handler once
/// [`EdgePins::run`] is polled.
pub struct EdgePins<P, const N: usize> {
    pins: [(u8, P); N],
    handler: Option<&'static dyn EdgeHandler>,
}

impl<P, const N: usize> EdgePins<P, N>
where
    P: InputPin + Wait,
{
    pub fn new(pins: [(u8, P); N]) -> Self {
        Self { pins, handler: None }
    }

    fn pin(&mut self, line: u8) -> Result<&mut P, PinError<P::Error>> {
        self.pins
            .iter_mut()
            .find(|(l, _)| *l == line)
            .map(|(_, pin)| pin)
            .ok_or(PinError::UnknownLine(line))
    }

    /// Deliver edges on every pin to the registered handler
    ///
    /// Returns the first pin failure.
    pub async fn run(&mut self) -> PinError<P::Error> {
        let Some(handler) = self.handler else {
            return PinError::NoHandler;
        };

        let watchers = self
            .pins
            .each_mut()
            .map(|(line, pin)| watch_line(pin, *line, handler));
        let (result, _) = select_array(watchers).await;
        result
    }
}

async fn watch_line<P>(pin: &mut P, line: u8, handler: &dyn EdgeHandler) -> PinError<P::Error>
where
    P: InputPin + Wait,
{
    match watch_button(pin, line, handler).await {
        Ok(never) => match never {},
        Err(error) => {
            let (line, error) = line_error(line, error);
            PinError::Pin { line, error }
        }
    }
}

impl<P, const N: usize> GpioLines for EdgePins<P, N>
where
    P: InputPin + Wait,
{
    type Error = PinError<P::Error>;

    fn configure_pin(&mut self, line: u8, mode: PinMode, _pull: Pull) -> Result<(), Self::Error> {
        self.pin(line)?;
        match mode {
            PinMode::Input => Ok(()),
            PinMode::Output => Err(PinError::NotInput(line)),
        }
    }

    fn read_pin(&mut self, line: u8) -> Result<Level, Self::Error> {
        let high = self
            .pin(line)?
            .is_high()
            .map_err(|error| PinError::Pin { line, error })?;
        Ok(Level::from(high))
    }

    fn register_edge_interrupt(
        &mut self,
        line: u8,
        edge: Edge,
        handler: &'static dyn EdgeHandler,
    ) -> Result<(), Self::Error> {
        self.pin(line)?;
        if edge != Edge::Both {
            return Err(PinError::UnsupportedEdge(line));
        }
        self.handler = Some(handler);
        Ok(())
    }
}
