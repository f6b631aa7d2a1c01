//! Unicorn HAT Mini display facade
//!
//! Ties the framebuffer, the HT16D35A pair and (optionally) the button
//! controller together behind a `&self` API that can be shared between
//! threads or tasks.
//!
//! Two locks are involved:
//!
//! - the framebuffer sits in a blocking mutex, held only for in-memory
//!   pixel edits and for composing the physical buffer;
//! - the chips sit behind an async [`Mutex`], so `show()`, brightness
//!   changes and teardown never interleave their command frames. Its raw
//!   mutex is only taken to update the lock state, never across bus I/O.
//!
//! No critical section is held while bytes go out on the bus, so button
//! edges (which publish under a critical section) are never delayed by a
//! frame write.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::Mutex;
use portable_atomic::{AtomicBool, Ordering};
use unicorn_hal::ChipSelectBus;

use crate::buttons::{Button, ButtonController};
use crate::config::{ConfigError, DisplayConfig};
use crate::device::Ht16d35;
use crate::error::Error;
use crate::frame::{FrameBuffer, PhysicalBuffer, Rgb, PHYSICAL_LEN};
use crate::protocol::{brightness_level, clamp_brightness};

/// Client-visible state, edited without touching the bus
struct View {
    frame: FrameBuffer,
    /// Last brightness the chips accepted
    brightness: f32,
}

/// Everything that goes out on the bus
struct Output<B> {
    /// `None` once torn down
    driver: Option<Ht16d35<B>>,
    physical: PhysicalBuffer,
}

/// 17×7 RGB matrix on two HT16D35A chips
pub struct UnicornMini<B> {
    view: BlockingMutex<CriticalSectionRawMutex, RefCell<View>>,
    output: Mutex<CriticalSectionRawMutex, Output<B>>,
    buttons: Option<&'static ButtonController>,
    shut_down: AtomicBool,
    exit_on_teardown: bool,
}

impl<B: ChipSelectBus> UnicornMini<B> {
    /// Initialise the display without buttons
    ///
    /// `config.enable_buttons` must be false; use [`Self::with_buttons`]
    /// otherwise.
    pub fn new(bus: B, config: DisplayConfig) -> Result<Self, Error<B::Error>> {
        if config.enable_buttons {
            return Err(Error::Config(ConfigError::ButtonsNotConfigured));
        }
        Self::init(bus, None, config)
    }

    /// Initialise the display with the buttons attached
    ///
    /// `buttons` must already have been set up with
    /// [`ButtonController::init`] on the platform's GPIO. When
    /// `config.enable_buttons` is false the controller is ignored.
    pub fn with_buttons(
        bus: B,
        buttons: &'static ButtonController,
        config: DisplayConfig,
    ) -> Result<Self, Error<B::Error>> {
        if !config.enable_buttons {
            return Self::init(bus, None, config);
        }
        if !buttons.is_ready() {
            return Err(Error::Config(ConfigError::ButtonsNotConfigured));
        }
        Self::init(bus, Some(buttons), config)
    }

    fn init(
        bus: B,
        buttons: Option<&'static ButtonController>,
        config: DisplayConfig,
    ) -> Result<Self, Error<B::Error>> {
        config.validate()?;

        #[cfg(feature = "defmt")]
        defmt::info!("Initialising Unicorn HAT Mini");

        // Not shared yet, so the bus is driven without any lock.
        let physical = [0u8; PHYSICAL_LEN];
        let mut driver = Ht16d35::new(bus);
        driver.init(&physical)?;

        let level = brightness_level(config.initial_brightness);
        driver.set_brightness(level)?;

        #[cfg(feature = "defmt")]
        defmt::info!("Display ready, brightness level {}", level);

        Ok(Self {
            view: BlockingMutex::new(RefCell::new(View {
                frame: FrameBuffer::new(),
                brightness: config.initial_brightness,
            })),
            output: Mutex::new(Output {
                driver: Some(driver),
                physical,
            }),
            buttons,
            shut_down: AtomicBool::new(false),
            exit_on_teardown: config.exit_on_teardown,
        })
    }

    fn with_view<R>(&self, f: impl FnOnce(&mut View) -> R) -> R {
        self.view.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Set one pixel; takes `(r, g, b)` or `[r, g, b]`
    pub fn set_pixel(&self, col: usize, row: usize, colour: impl Into<Rgb>) -> Result<(), Error<B::Error>> {
        let colour = colour.into();
        self.with_view(|view| view.frame.set_pixel(col, row, colour))?;
        Ok(())
    }

    /// Set every pixel to the same colour
    pub fn set_all(&self, colour: impl Into<Rgb>) {
        let colour = colour.into();
        self.with_view(|view| view.frame.set_all(colour));
    }

    /// Set every pixel to black
    pub fn clear(&self) {
        self.with_view(|view| view.frame.clear());
    }

    /// Fill a rectangle, clipped to the grid
    pub fn fill_rect(
        &self,
        col: usize,
        row: usize,
        width: usize,
        height: usize,
        colour: impl Into<Rgb>,
    ) -> Result<(), Error<B::Error>> {
        let colour = colour.into();
        self.with_view(|view| view.frame.fill_rect(col, row, width, height, colour))?;
        Ok(())
    }

    /// Stored (6-bit) value of one pixel
    pub fn pixel(&self, col: usize, row: usize) -> Option<Rgb> {
        self.with_view(|view| view.frame.pixel(col, row))
    }

    /// Push the framebuffer to both chips
    ///
    /// The frame is snapshotted into the physical buffer first; pixel
    /// edits made while the write is in flight land in the next `show()`.
    pub async fn show(&self) -> Result<(), Error<B::Error>> {
        let mut output = self.output.lock().await;
        let Output { driver, physical } = &mut *output;
        let driver = driver.as_mut().ok_or(Error::ShutDown)?;
        self.with_view(|view| view.frame.compose(physical));
        driver.write_display(physical)
    }

    /// Last brightness the chips accepted (0.0-1.0)
    pub fn brightness(&self) -> f32 {
        self.with_view(|view| view.brightness)
    }

    /// Clamp to 0.0-1.0 and send to both chips immediately
    ///
    /// On a transport error the previous brightness is kept.
    pub async fn set_brightness(&self, brightness: f32) -> Result<(), Error<B::Error>> {
        let brightness = clamp_brightness(brightness);
        let mut output = self.output.lock().await;
        let driver = output.driver.as_mut().ok_or(Error::ShutDown)?;
        driver.set_brightness(brightness_level(brightness))?;
        self.with_view(|view| view.brightness = brightness);

        #[cfg(feature = "defmt")]
        defmt::debug!("Brightness set to level {}", brightness_level(brightness));

        Ok(())
    }

    /// Current state of a button, `None` when buttons are disabled
    pub fn button(&self, button: Button) -> Option<bool> {
        self.buttons.map(|controller| controller.is_pressed(button))
    }

    pub fn button_a(&self) -> Option<bool> {
        self.button(Button::A)
    }

    pub fn button_b(&self) -> Option<bool> {
        self.button(Button::B)
    }

    pub fn button_x(&self) -> Option<bool> {
        self.button(Button::X)
    }

    pub fn button_y(&self) -> Option<bool> {
        self.button(Button::Y)
    }

    /// Button controller, for event subscriptions
    pub fn buttons(&self) -> Option<&'static ButtonController> {
        self.buttons
    }

    /// Whether the host asked to exit its process after shutdown
    pub fn exit_on_teardown(&self) -> bool {
        self.exit_on_teardown
    }

    /// Switch the chips off and release the bus
    ///
    /// Teardown runs once, after any in-flight `show()`. Later or
    /// concurrent calls wait for it to finish and then return `Ok(())`;
    /// only the call that ran the teardown sees its error.
    pub async fn shutdown(&self) -> Result<(), Error<B::Error>> {
        self.shut_down.store(true, Ordering::Release);
        let mut output = self.output.lock().await;
        let Some(driver) = output.driver.take() else {
            return Ok(());
        };

        #[cfg(feature = "defmt")]
        defmt::info!("Shutting down display");

        driver.teardown().map(drop)
    }

    /// True once `shutdown()` has been called
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }
}
