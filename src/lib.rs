//! Erase watermarks, logos and overlays from images by content-aware inpainting.
//!
//! Given an RGBA image and a binary mask marking the region to erase, the
//! engine synthesizes replacement pixels from the unmasked surroundings. No
//! model or training data is involved: the masked region is filled layer by
//! layer from its boundary inward, any pixel the passes cannot reach is
//! resolved by a Gaussian fallback, and the content-aware presets finish with
//! a seam blend.
//!
//! # Quick Start
//!
//! ```no_run
//! use watermark_inpaint::{inpaint, Mask, PixelBuffer, Quality, Region};
//!
//! let img = image::open("photo.png").unwrap().to_rgba8();
//! let buffer = PixelBuffer::from(img);
//! let region = Region { x: 40, y: 20, width: 120, height: 32 };
//! let mask = Mask::from_region(buffer.width(), buffer.height(), region, 4).unwrap();
//!
//! let filled = inpaint(&buffer, &mask, Quality::ContentAwareQuality).unwrap();
//! filled.into_rgba_image().unwrap().save("cleaned.png").unwrap();
//! ```
//!
//! # Strategies
//!
//! - **Plain** ([`Quality::PlainFast`], [`Quality::PlainStandard`]): boundary
//!   pixels in row-major order, inverse-square distance weights.
//! - **Content-aware** ([`Quality::ContentAwareFast`],
//!   [`Quality::ContentAwareQuality`]): boundary pixels ranked by how much
//!   known context surrounds them, weights biased along the local edge
//!   direction, seams blended afterwards.
//!
//! Every call is pure and deterministic, so video frames can be filled in
//! any order or in parallel ([`inpaint_frames`]). Frames are filled
//! independently; nothing keeps the result coherent across frames.

#![deny(missing_docs)]

pub mod boundary;
pub mod buffer;
mod engine;
pub mod error;
pub mod fallback;
pub mod propagation;
pub mod sampler;
pub mod seam;

pub use buffer::{luminance, Mask, PixelBuffer, Region, DEFAULT_REGION_PADDING};
pub use engine::{
    default_output_path, inpaint, inpaint_frames, is_supported_image, save_image, FillParams,
    InpaintEngine, MaskSource, ProcessOptions, ProcessResult, Quality, Strategy,
};
pub use error::{Error, Result};
