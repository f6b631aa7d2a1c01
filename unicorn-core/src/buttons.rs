//! Button input controller
//!
//! Four active-low buttons with pull-ups. Each edge interrupt samples the
//! line, stores the new state and publishes three events, in order:
//!
//! 1. `button-<id>-pressed` or `button-<id>-released`
//! 2. `button-<id>`
//! 3. `button`
//!
//! Events go through a [`PubSubChannel`] with immediate publishing, so the
//! interrupt path never waits on a subscriber. A subscriber that falls
//! behind loses the oldest events and is told how many via
//! [`WaitResult::Lagged`](embassy_sync::pubsub::WaitResult::Lagged).

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pubsub::{PubSubChannel, Subscriber};
use portable_atomic::{AtomicBool, Ordering};
use unicorn_hal::{Edge, EdgeHandler, GpioLines, Level, PinMode, Pull};

/// Events buffered per subscriber (one edge publishes three)
pub const EVENT_CAPACITY: usize = 12;

/// Maximum concurrent subscribers
pub const MAX_SUBSCRIBERS: usize = 4;

/// Publisher slots (publishing is immediate and does not use them)
pub const MAX_PUBLISHERS: usize = 1;

/// Button event subscriber
pub type EventSubscriber<'a> = Subscriber<
    'a,
    CriticalSectionRawMutex,
    ButtonEvent,
    EVENT_CAPACITY,
    MAX_SUBSCRIBERS,
    MAX_PUBLISHERS,
>;

/// The four buttons beside the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    A,
    B,
    X,
    Y,
}

impl Button {
    pub const ALL: [Button; 4] = [Button::A, Button::B, Button::X, Button::Y];

    /// GPIO line (BCM numbering)
    pub const fn line(self) -> u8 {
        match self {
            Button::A => 5,
            Button::B => 6,
            Button::X => 16,
            Button::Y => 24,
        }
    }

    pub fn from_line(line: u8) -> Option<Button> {
        Self::ALL.into_iter().find(|b| b.line() == line)
    }

    /// Identity used in event names and payloads
    pub const fn id(self) -> &'static str {
        match self {
            Button::A => "a",
            Button::B => "b",
            Button::X => "x",
            Button::Y => "y",
        }
    }

    const fn index(self) -> usize {
        match self {
            Button::A => 0,
            Button::B => 1,
            Button::X => 2,
            Button::Y => 3,
        }
    }
}

/// Which subscription topic an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    /// `button-<id>-pressed`
    Pressed,
    /// `button-<id>-released`
    Released,
    /// `button-<id>`, any change of that button
    Changed,
    /// `button`, any change of any button
    Any,
}

/// A button state notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    pub kind: EventKind,
    pub button: Button,
    pub pressed: bool,
}

impl ButtonEvent {
    /// Topic name, e.g. `button-a-pressed`
    pub fn name(&self) -> &'static str {
        match (self.kind, self.button) {
            (EventKind::Any, _) => "button",
            (EventKind::Pressed, Button::A) => "button-a-pressed",
            (EventKind::Pressed, Button::B) => "button-b-pressed",
            (EventKind::Pressed, Button::X) => "button-x-pressed",
            (EventKind::Pressed, Button::Y) => "button-y-pressed",
            (EventKind::Released, Button::A) => "button-a-released",
            (EventKind::Released, Button::B) => "button-b-released",
            (EventKind::Released, Button::X) => "button-x-released",
            (EventKind::Released, Button::Y) => "button-y-released",
            (EventKind::Changed, Button::A) => "button-a",
            (EventKind::Changed, Button::B) => "button-b",
            (EventKind::Changed, Button::X) => "button-x",
            (EventKind::Changed, Button::Y) => "button-y",
        }
    }

    /// Event payload: (identity, pressed)
    pub fn payload(&self) -> (&'static str, bool) {
        (self.button.id(), self.pressed)
    }
}

/// Edge-driven button state machine
///
/// Lives in a `static` so it can be handed to the GPIO layer as an
/// [`EdgeHandler`]. State is plain atomics, independent of the display
/// bus lock.
pub struct ButtonController {
    pressed: [AtomicBool; 4],
    ready: AtomicBool,
    events: PubSubChannel<
        CriticalSectionRawMutex,
        ButtonEvent,
        EVENT_CAPACITY,
        MAX_SUBSCRIBERS,
        MAX_PUBLISHERS,
    >,
}

impl Default for ButtonController {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonController {
    pub const fn new() -> Self {
        Self {
            pressed: [
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
            ],
            ready: AtomicBool::new(false),
            events: PubSubChannel::new(),
        }
    }

    /// Configure the lines, read initial states and hook up interrupts
    ///
    /// Initial state comes from one direct read per line, not from an
    /// interrupt.
    pub fn init<G: GpioLines>(&'static self, gpio: &mut G) -> Result<(), G::Error> {
        for button in Button::ALL {
            gpio.configure_pin(button.line(), PinMode::Input, Pull::Up)?;
        }

        for button in Button::ALL {
            let level = gpio.read_pin(button.line())?;
            self.store(button, level.is_low());
        }

        for button in Button::ALL {
            gpio.register_edge_interrupt(button.line(), Edge::Both, self)?;
        }

        self.ready.store(true, Ordering::Release);

        #[cfg(feature = "defmt")]
        defmt::info!("Buttons ready");

        Ok(())
    }

    /// True once [`Self::init`] has completed
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Current state (true = pressed)
    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed[button.index()].load(Ordering::Acquire)
    }

    /// Subscribe to button events from now on
    pub fn subscriber(&self) -> Result<EventSubscriber<'_>, embassy_sync::pubsub::Error> {
        self.events.subscriber()
    }

    /// Apply a sampled level for `button` and publish its events
    pub fn handle(&self, button: Button, level: Level) {
        let pressed = level.is_low();
        self.store(button, pressed);

        #[cfg(feature = "defmt")]
        defmt::debug!("Button {} {}", button.id(), if pressed { "pressed" } else { "released" });

        let publisher = self.events.immediate_publisher();
        let state_kind = if pressed {
            EventKind::Pressed
        } else {
            EventKind::Released
        };
        for kind in [state_kind, EventKind::Changed, EventKind::Any] {
            publisher.publish_immediate(ButtonEvent {
                kind,
                button,
                pressed,
            });
        }
    }

    fn store(&self, button: Button, pressed: bool) {
        self.pressed[button.index()].store(pressed, Ordering::Release);
    }
}

impl EdgeHandler for ButtonController {
    fn on_edge(&self, line: u8, level: Level) {
        match Button::from_line(line) {
            Some(button) => self.handle(button, level),
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Edge on unknown line {}", line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    /// Mock GPIO: lines default high (pull-up, not pressed)
    #[derive(Default)]
    struct MockGpio {
        low: Vec<u8>,
        configured: Vec<(u8, PinMode, Pull)>,
        handlers: Vec<(u8, Edge, &'static dyn EdgeHandler)>,
    }

    impl MockGpio {
        /// Change a line's level and fire any registered handler
        fn drive(&mut self, line: u8, level: Level) {
            self.low.retain(|&l| l != line);
            if level.is_low() {
                self.low.push(line);
            }
            for (l, _, handler) in self.handlers.iter() {
                if *l == line {
                    handler.on_edge(line, level);
                }
            }
        }
    }

    impl GpioLines for MockGpio {
        type Error = ();

        fn configure_pin(&mut self, line: u8, mode: PinMode, pull: Pull) -> Result<(), ()> {
            self.configured.push((line, mode, pull));
            Ok(())
        }

        fn read_pin(&mut self, line: u8) -> Result<Level, ()> {
            Ok(Level::from(!self.low.contains(&line)))
        }

        fn register_edge_interrupt(
            &mut self,
            line: u8,
            edge: Edge,
            handler: &'static dyn EdgeHandler,
        ) -> Result<(), ()> {
            self.handlers.push((line, edge, handler));
            Ok(())
        }
    }

    fn drain(sub: &mut EventSubscriber<'_>) -> Vec<ButtonEvent> {
        let mut events = Vec::new();
        while let Some(event) = sub.try_next_message_pure() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_line_mapping() {
        assert_eq!(Button::from_line(5), Some(Button::A));
        assert_eq!(Button::from_line(6), Some(Button::B));
        assert_eq!(Button::from_line(16), Some(Button::X));
        assert_eq!(Button::from_line(24), Some(Button::Y));
        assert_eq!(Button::from_line(7), None);
    }

    #[test]
    fn test_init_reads_initial_state() {
        static BUTTONS: ButtonController = ButtonController::new();
        let mut gpio = MockGpio {
            low: std::vec![Button::X.line()],
            ..MockGpio::default()
        };

        assert!(!BUTTONS.is_ready());
        BUTTONS.init(&mut gpio).unwrap();

        assert!(BUTTONS.is_ready());
        assert!(!BUTTONS.is_pressed(Button::A));
        assert!(BUTTONS.is_pressed(Button::X));
        assert_eq!(gpio.configured.len(), 4);
        assert!(gpio
            .configured
            .iter()
            .all(|&(_, mode, pull)| mode == PinMode::Input && pull == Pull::Up));
        assert_eq!(gpio.handlers.len(), 4);
        assert!(gpio.handlers.iter().all(|(_, edge, _)| *edge == Edge::Both));
    }

    #[test]
    fn test_press_and_release_event_order() {
        static BUTTONS: ButtonController = ButtonController::new();
        let mut gpio = MockGpio::default();
        BUTTONS.init(&mut gpio).unwrap();
        let mut sub = BUTTONS.subscriber().unwrap();

        gpio.drive(Button::A.line(), Level::Low);
        assert!(BUTTONS.is_pressed(Button::A));
        let events = drain(&mut sub);
        let names: Vec<&str> = events.iter().map(|e| e.name()).collect();
        assert_eq!(names, ["button-a-pressed", "button-a", "button"]);
        assert!(events.iter().all(|e| e.payload() == ("a", true)));

        gpio.drive(Button::A.line(), Level::High);
        assert!(!BUTTONS.is_pressed(Button::A));
        let events = drain(&mut sub);
        let names: Vec<&str> = events.iter().map(|e| e.name()).collect();
        assert_eq!(names, ["button-a-released", "button-a", "button"]);
        assert!(events.iter().all(|e| e.payload() == ("a", false)));
    }

    #[test]
    fn test_every_subscriber_sees_events() {
        static BUTTONS: ButtonController = ButtonController::new();
        let mut first = BUTTONS.subscriber().unwrap();
        let mut second = BUTTONS.subscriber().unwrap();

        BUTTONS.on_edge(Button::Y.line(), Level::Low);

        assert_eq!(drain(&mut first).len(), 3);
        assert_eq!(drain(&mut second).len(), 3);
    }

    #[test]
    fn test_slow_subscriber_does_not_block() {
        static BUTTONS: ButtonController = ButtonController::new();
        let mut sub = BUTTONS.subscriber().unwrap();

        // Far more events than the channel holds; publishing must not stall.
        for i in 0..20 {
            let level = if i % 2 == 0 { Level::Low } else { Level::High };
            BUTTONS.on_edge(Button::B.line(), level);
        }
        assert!(!BUTTONS.is_pressed(Button::B));

        let mut lagged = false;
        let mut received = 0;
        while let Some(result) = sub.try_next_message() {
            match result {
                embassy_sync::pubsub::WaitResult::Lagged(_) => lagged = true,
                embassy_sync::pubsub::WaitResult::Message(_) => received += 1,
            }
        }
        assert!(lagged);
        assert_eq!(received, EVENT_CAPACITY);
    }

    #[test]
    fn test_unknown_line_ignored() {
        static BUTTONS: ButtonController = ButtonController::new();
        let mut sub = BUTTONS.subscriber().unwrap();
        BUTTONS.on_edge(2, Level::Low);
        assert!(drain(&mut sub).is_empty());
        assert!(Button::ALL.iter().all(|&b| !BUTTONS.is_pressed(b)));
    }

    #[test]
    fn test_event_names() {
        let event = ButtonEvent {
            kind: EventKind::Released,
            button: Button::Y,
            pressed: false,
        };
        assert_eq!(event.name(), "button-y-released");
        let event = ButtonEvent {
            kind: EventKind::Any,
            button: Button::X,
            pressed: true,
        };
        assert_eq!(event.name(), "button");
        assert_eq!(event.payload(), ("x", true));
    }
}
