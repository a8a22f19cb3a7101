//! Pixel buffer and mask types consumed and produced by the fill engine.
//!
//! Both types validate their invariants on construction, so the engine only
//! has to check that a buffer and a mask agree on dimensions.

use std::str::FromStr;

use image::{DynamicImage, RgbaImage};

use crate::error::{Error, Result};

/// Mask overlays drawn with a translucent brush mark a pixel once alpha exceeds this.
const OVERLAY_ALPHA_THRESHOLD: u8 = 30;

/// Opaque mask images mark a pixel when luma exceeds this.
const OPAQUE_LUMA_THRESHOLD: u8 = 127;

/// Extra pixels added around a rectangle selection by default.
pub const DEFAULT_REGION_PADDING: u32 = 4;

/// Luminance of an RGB triple: `0.299*R + 0.587*G + 0.114*B`.
#[must_use]
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b)
}

/// Flat interleaved RGBA image, 8 bits per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap an RGBA channel array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferLength`] if `channels.len() != width * height * 4`.
    pub fn new(width: u32, height: u32, channels: Vec<u8>) -> Result<Self> {
        let expected = pixel_count(width, height) * 4;
        if channels.len() != expected {
            return Err(Error::BufferLength {
                expected,
                actual: channels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
        })
    }

    /// A buffer filled with a single RGBA color.
    #[must_use]
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let channels = rgba
            .iter()
            .copied()
            .cycle()
            .take(pixel_count(width, height) * 4)
            .collect();
        Self {
            width,
            height,
            channels,
        }
    }

    /// Image width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Interleaved RGBA bytes, row-major.
    #[must_use]
    pub fn channels(&self) -> &[u8] {
        &self.channels
    }

    /// RGBA value of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel ({x},{y}) out of bounds");
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.channels[i],
            self.channels[i + 1],
            self.channels[i + 2],
            self.channels[i + 3],
        ]
    }

    /// Overwrite the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the image.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        assert!(x < self.width && y < self.height, "pixel ({x},{y}) out of bounds");
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.channels[i..i + 4].copy_from_slice(&rgba);
    }

    /// Consume the buffer and return its raw channel bytes.
    #[must_use]
    pub fn into_channels(self) -> Vec<u8> {
        self.channels
    }

    /// Convert into an [`RgbaImage`] for encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferLength`] if the image crate rejects the layout.
    pub fn into_rgba_image(self) -> Result<RgbaImage> {
        let expected = pixel_count(self.width, self.height) * 4;
        let actual = self.channels.len();
        RgbaImage::from_raw(self.width, self.height, self.channels)
            .ok_or(Error::BufferLength { expected, actual })
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(img: RgbaImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            channels: img.into_raw(),
        }
    }
}

/// Per-pixel fill indicator: `1` marks a pixel to synthesize, `0` keeps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    flags: Vec<u8>,
}

impl Mask {
    /// Wrap a flag array, one byte per pixel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferLength`] on a length mismatch and
    /// [`Error::InvalidMaskValue`] for any byte other than 0 or 1.
    pub fn new(width: u32, height: u32, flags: Vec<u8>) -> Result<Self> {
        let expected = pixel_count(width, height);
        if flags.len() != expected {
            return Err(Error::BufferLength {
                expected,
                actual: flags.len(),
            });
        }
        if let Some((index, &value)) = flags.iter().enumerate().find(|(_, &f)| f > 1) {
            return Err(Error::InvalidMaskValue { index, value });
        }
        Ok(Self {
            width,
            height,
            flags,
        })
    }

    /// A mask with nothing selected.
    #[must_use]
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            flags: vec![0; pixel_count(width, height)],
        }
    }

    /// Build a mask from a painted overlay or a black/white mask image.
    ///
    /// Images with an alpha channel select pixels whose alpha exceeds 30, the
    /// way a translucent brush overlay is read. Opaque images select pixels
    /// whose luma exceeds 127.
    #[must_use]
    pub fn from_image(img: &DynamicImage) -> Self {
        let flags: Vec<u8> = if img.color().has_alpha() {
            img.to_rgba8()
                .pixels()
                .map(|p| u8::from(p[3] > OVERLAY_ALPHA_THRESHOLD))
                .collect()
        } else {
            img.to_luma8()
                .pixels()
                .map(|p| u8::from(p[0] > OPAQUE_LUMA_THRESHOLD))
                .collect()
        };
        Self {
            width: img.width(),
            height: img.height(),
            flags,
        }
    }

    /// Select a rectangle grown by `padding` on every side, clipped to the frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] if the rectangle is empty or starts
    /// outside the frame.
    pub fn from_region(width: u32, height: u32, region: Region, padding: u32) -> Result<Self> {
        if region.width == 0 || region.height == 0 {
            return Err(Error::InvalidRegion(format!("{region} has zero area")));
        }
        if region.x >= width || region.y >= height {
            return Err(Error::InvalidRegion(format!(
                "{region} lies outside the {width}x{height} frame"
            )));
        }

        let x0 = region.x.saturating_sub(padding);
        let y0 = region.y.saturating_sub(padding);
        let x1 = region
            .x
            .saturating_add(region.width)
            .saturating_add(padding)
            .min(width);
        let y1 = region
            .y
            .saturating_add(region.height)
            .saturating_add(padding)
            .min(height);

        let mut mask = Self::empty(width, height);
        for y in y0..y1 {
            for x in x0..x1 {
                mask.set(x, y, true);
            }
        }
        Ok(mask)
    }

    /// Mask width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw flags, row-major.
    #[must_use]
    pub fn flags(&self) -> &[u8] {
        &self.flags
    }

    /// Whether the pixel at `(x, y)` is selected for filling.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the mask.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        assert!(x < self.width && y < self.height, "mask ({x},{y}) out of bounds");
        self.flags[y as usize * self.width as usize + x as usize] == 1
    }

    /// Select or clear the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the mask.
    pub fn set(&mut self, x: u32, y: u32, selected: bool) {
        assert!(x < self.width && y < self.height, "mask ({x},{y}) out of bounds");
        self.flags[y as usize * self.width as usize + x as usize] = u8::from(selected);
    }

    /// Number of selected pixels.
    #[must_use]
    pub fn count(&self) -> usize {
        self.flags.iter().filter(|&&f| f == 1).count()
    }

    /// True when no pixel is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.iter().all(|&f| f == 0)
    }
}

/// Axis-aligned rectangle selection in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

impl FromStr for Region {
    type Err = Error;

    /// Parse `x,y,w,h`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, w, h] = parts.as_slice() else {
            return Err(Error::InvalidRegion(format!(
                "expected x,y,w,h but got {s:?}"
            )));
        };
        let num = |v: &str| {
            v.parse::<u32>()
                .map_err(|e| Error::InvalidRegion(format!("{v:?}: {e}")))
        };
        Ok(Self {
            x: num(*x)?,
            y: num(*y)?,
            width: num(*w)?,
            height: num(*h)?,
        })
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba};

    #[test]
    fn pixel_buffer_rejects_wrong_length() {
        let err = PixelBuffer::new(4, 4, vec![0; 63]).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferLength {
                expected: 64,
                actual: 63
            }
        ));
    }

    #[test]
    fn filled_buffer_repeats_color() {
        let buf = PixelBuffer::filled(3, 2, [1, 2, 3, 4]);
        assert_eq!(buf.channels().len(), 24);
        assert_eq!(buf.pixel(2, 1), [1, 2, 3, 4]);
    }

    #[test]
    fn mask_rejects_non_binary_values() {
        let err = Mask::new(2, 2, vec![0, 1, 2, 0]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidMaskValue { index: 2, value: 2 }
        ));
    }

    #[test]
    fn mask_from_region_pads_and_clips() {
        let region = Region {
            x: 2,
            y: 8,
            width: 3,
            height: 5,
        };
        let mask = Mask::from_region(10, 10, region, 4).unwrap();
        // x: 0..9, y: 4..10 after padding and clipping
        assert_eq!(mask.count(), 9 * 6);
        assert!(mask.get(0, 4));
        assert!(mask.get(8, 9));
        assert!(!mask.get(9, 9));
        assert!(!mask.get(0, 3));
    }

    #[test]
    fn mask_from_region_rejects_empty_and_outside() {
        let empty = Region {
            x: 1,
            y: 1,
            width: 0,
            height: 4,
        };
        assert!(Mask::from_region(10, 10, empty, 0).is_err());

        let outside = Region {
            x: 10,
            y: 1,
            width: 2,
            height: 2,
        };
        assert!(Mask::from_region(10, 10, outside, 4).is_err());
    }

    #[test]
    fn region_parses_comma_separated() {
        let r: Region = "10, 20,30,40".parse().unwrap();
        assert_eq!(
            r,
            Region {
                x: 10,
                y: 20,
                width: 30,
                height: 40
            }
        );
        assert!("1,2,3".parse::<Region>().is_err());
        assert!("a,2,3,4".parse::<Region>().is_err());
    }

    #[test]
    fn mask_from_overlay_uses_alpha_threshold() {
        let mut overlay = RgbaImage::new(3, 1);
        overlay.put_pixel(0, 0, Rgba([255, 0, 0, 30]));
        overlay.put_pixel(1, 0, Rgba([255, 0, 0, 31]));
        overlay.put_pixel(2, 0, Rgba([255, 0, 0, 128]));
        let mask = Mask::from_image(&DynamicImage::ImageRgba8(overlay));
        assert_eq!(mask.flags(), &[0, 1, 1]);
    }

    #[test]
    fn mask_from_opaque_image_uses_luma() {
        let mut gray = GrayImage::new(2, 1);
        gray.put_pixel(0, 0, Luma([255]));
        let mask = Mask::from_image(&DynamicImage::ImageLuma8(gray));
        assert_eq!(mask.flags(), &[1, 0]);
    }

    #[test]
    fn luminance_of_white_is_255() {
        assert!((luminance(255, 255, 255) - 255.0).abs() < 1e-3);
        assert!(luminance(0, 0, 0).abs() < 1e-6);
    }
}
