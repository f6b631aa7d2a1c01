//! Logical framebuffer and physical buffer composition
//!
//! Clients write 8-bit RGB triples into a 17×7 grid. The chips only have
//! 6-bit PWM per channel, so values are quantized (`>> 2`) on the way in
//! and stored that way.

use crate::lut::LUT;

/// Grid width in pixels
pub const COLS: usize = 17;

/// Grid height in pixels
pub const ROWS: usize = 7;

/// Number of logical pixels
pub const PIXEL_COUNT: usize = COLS * ROWS;

/// Display RAM bytes per chip (28 COM lines × 8 bytes)
pub const CHIP_BUFFER_LEN: usize = 28 * 8;

/// Physical buffer length across both chips
pub const PHYSICAL_LEN: usize = CHIP_BUFFER_LEN * 2;

/// Physical display RAM image for both chips
pub type PhysicalBuffer = [u8; PHYSICAL_LEN];

/// An RGB colour
///
/// Converts from `(r, g, b)` tuples and `[r, g, b]` arrays so pixel writes
/// take either form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Reduce each channel to the chips' 6-bit PWM range
    pub const fn quantized(self) -> Self {
        Self {
            r: self.r >> 2,
            g: self.g >> 2,
            b: self.b >> 2,
        }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

/// Pixel coordinate outside the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange {
    pub col: usize,
    pub row: usize,
}

/// Logical frame: one quantized colour per pixel, column-major
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pixels: [Rgb; PIXEL_COUNT],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Create an all-black frame
    pub const fn new() -> Self {
        Self {
            pixels: [Rgb::BLACK; PIXEL_COUNT],
        }
    }

    /// Index into the frame for (`col`, `row`)
    pub fn index(col: usize, row: usize) -> Result<usize, OutOfRange> {
        if col >= COLS || row >= ROWS {
            return Err(OutOfRange { col, row });
        }
        Ok(col * ROWS + row)
    }

    /// Set one pixel
    pub fn set_pixel(&mut self, col: usize, row: usize, colour: impl Into<Rgb>) -> Result<(), OutOfRange> {
        let index = Self::index(col, row)?;
        self.pixels[index] = colour.into().quantized();
        Ok(())
    }

    /// Set every pixel to the same colour
    pub fn set_all(&mut self, colour: impl Into<Rgb>) {
        self.pixels.fill(colour.into().quantized());
    }

    /// Set every pixel to black
    pub fn clear(&mut self) {
        self.set_all(Rgb::BLACK);
    }

    /// Fill a rectangle, clipped to the grid
    ///
    /// Fails only when the top-left corner is outside the grid.
    pub fn fill_rect(
        &mut self,
        col: usize,
        row: usize,
        width: usize,
        height: usize,
        colour: impl Into<Rgb>,
    ) -> Result<(), OutOfRange> {
        Self::index(col, row)?;
        let colour = colour.into().quantized();
        let col_end = col.saturating_add(width).min(COLS);
        let row_end = row.saturating_add(height).min(ROWS);
        for c in col..col_end {
            let column = &mut self.pixels[c * ROWS..(c + 1) * ROWS];
            column[row..row_end].fill(colour);
        }
        Ok(())
    }

    /// Stored (quantized) value of one pixel
    pub fn pixel(&self, col: usize, row: usize) -> Option<Rgb> {
        let index = Self::index(col, row).ok()?;
        Some(self.pixels[index])
    }

    /// Remap the frame into the chips' memory layout
    ///
    /// Only the bytes named by the lookup table are written; the rest of
    /// `out` keeps whatever it held (zero unless a caller wrote there).
    pub fn compose(&self, out: &mut PhysicalBuffer) {
        for (pixel, [r, g, b]) in self.pixels.iter().zip(LUT.iter()) {
            out[*r as usize] = pixel.r;
            out[*g as usize] = pixel.g;
            out[*b as usize] = pixel.b;
        }
    }
}
