//! Fill engine entry points and file processing.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::boundary::FillState;
use crate::buffer::{Mask, PixelBuffer, Region, DEFAULT_REGION_PADDING};
use crate::error::{Error, Result};
use crate::fallback;
use crate::propagation::{self, RadiusSchedule};
use crate::sampler::{EdgeBiased, InverseSquare};
use crate::seam;

/// How boundary pixels are ordered and weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Row-major order, inverse-square distance weights.
    Plain,
    /// Most-confident-first order, edge-biased weights, seam blending.
    ContentAware,
}

/// Preset quality levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    /// Plain strategy, 4 passes. Intended for video frames.
    PlainFast,
    /// Plain strategy, 8 passes.
    PlainStandard,
    /// Content-aware strategy, 10 passes, smaller windows.
    ContentAwareFast,
    /// Content-aware strategy, 16 passes.
    #[default]
    ContentAwareQuality,
}

impl Quality {
    /// The constants this preset stands for.
    #[must_use]
    pub fn params(self) -> FillParams {
        match self {
            Self::PlainFast => FillParams::plain(4),
            Self::PlainStandard => FillParams::plain(8),
            Self::ContentAwareFast => FillParams {
                strategy: Strategy::ContentAware,
                max_iterations: 10,
                radius: RadiusSchedule {
                    base: 5.0,
                    growth: 0.8,
                },
                fallback_radius: 30,
                fallback_stride: 2,
                seam_radius: 2,
            },
            Self::ContentAwareQuality => FillParams {
                strategy: Strategy::ContentAware,
                max_iterations: 16,
                radius: RadiusSchedule {
                    base: 7.0,
                    growth: 0.8,
                },
                fallback_radius: 30,
                fallback_stride: 2,
                seam_radius: 3,
            },
        }
    }
}

/// Every tunable constant of one fill run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillParams {
    /// Ordering and weighting strategy.
    pub strategy: Strategy,
    /// Cap on propagation passes.
    pub max_iterations: u32,
    /// Sampling window radius per pass.
    pub radius: RadiusSchedule,
    /// Gaussian radius of the fallback pass.
    pub fallback_radius: u32,
    /// Sample every n-th offset in the fallback window.
    pub fallback_stride: u32,
    /// Seam blend radius (content-aware only, 0 disables).
    pub seam_radius: u32,
}

impl FillParams {
    fn plain(max_iterations: u32) -> Self {
        Self {
            strategy: Strategy::Plain,
            max_iterations,
            radius: RadiusSchedule {
                base: 5.0,
                growth: 2.0,
            },
            fallback_radius: 20,
            fallback_stride: 1,
            seam_radius: 0,
        }
    }

    /// Same constants with a different pass cap.
    #[must_use]
    pub fn with_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

impl Default for FillParams {
    fn default() -> Self {
        Quality::default().params()
    }
}

impl From<Quality> for FillParams {
    fn from(quality: Quality) -> Self {
        quality.params()
    }
}

/// Synthesize content for every pixel selected in `mask`.
///
/// Returns a new buffer; neither input is modified. Pixels outside the mask
/// are copied unchanged and every masked pixel ends up opaque. An empty mask
/// returns an identical copy of `buffer`.
///
/// # Errors
///
/// Returns [`Error::DimensionMismatch`] if `buffer` and `mask` differ in size.
pub fn inpaint(
    buffer: &PixelBuffer,
    mask: &Mask,
    params: impl Into<FillParams>,
) -> Result<PixelBuffer> {
    if buffer.width() != mask.width() || buffer.height() != mask.height() {
        return Err(Error::DimensionMismatch {
            buffer_width: buffer.width(),
            buffer_height: buffer.height(),
            mask_width: mask.width(),
            mask_height: mask.height(),
        });
    }
    let params = params.into();

    if mask.is_empty() {
        tracing::debug!("empty mask, returning input unchanged");
        return Ok(buffer.clone());
    }

    let mut pixels = buffer.channels().to_vec();
    let mut state = FillState::from_mask(mask);
    let masked = state.pending_count();

    let propagated = match params.strategy {
        Strategy::Plain => propagation::propagate(
            &mut pixels,
            &mut state,
            &mut InverseSquare,
            params.max_iterations,
            params.radius,
        ),
        Strategy::ContentAware => propagation::propagate(
            &mut pixels,
            &mut state,
            &mut EdgeBiased::default(),
            params.max_iterations,
            params.radius,
        ),
    };

    let smoothed = fallback::smooth_remaining(
        &mut pixels,
        &mut state,
        params.fallback_radius,
        params.fallback_stride,
    );
    if smoothed.global > 0 {
        tracing::warn!(
            pixels = smoothed.global,
            "no known pixels in reach, used global fill color"
        );
    }

    let seams = if params.strategy == Strategy::ContentAware {
        seam::blend_seams(&mut pixels, mask, params.seam_radius)
    } else {
        0
    };

    tracing::debug!(
        width = buffer.width(),
        height = buffer.height(),
        masked,
        passes = propagated.passes,
        propagated = propagated.filled,
        converged = propagated.converged,
        fallback = smoothed.total(),
        seams,
        "inpaint complete"
    );

    PixelBuffer::new(buffer.width(), buffer.height(), pixels)
}

/// Fill the same mask in every frame of a sequence.
///
/// Frames are independent; with the `cli` feature they are filled in
/// parallel. Output order always matches input order.
///
/// # Errors
///
/// Returns the first [`Error::DimensionMismatch`] encountered.
pub fn inpaint_frames(
    frames: &[PixelBuffer],
    mask: &Mask,
    params: impl Into<FillParams>,
) -> Result<Vec<PixelBuffer>> {
    let params = params.into();

    #[cfg(feature = "cli")]
    {
        use rayon::prelude::*;
        frames
            .par_iter()
            .map(|frame| inpaint(frame, mask, params))
            .collect()
    }

    #[cfg(not(feature = "cli"))]
    {
        frames
            .iter()
            .map(|frame| inpaint(frame, mask, params))
            .collect()
    }
}

/// Where the fill mask of a file comes from.
#[derive(Debug, Clone)]
pub enum MaskSource {
    /// A decoded mask image; every input must match its size.
    Mask(Mask),
    /// A rectangle selection, resolved against each input's size.
    Region(Region),
}

impl MaskSource {
    /// Load a mask image (painted overlay or black/white mask).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if the file cannot be decoded.
    pub fn from_file(path: &Path) -> Result<Self> {
        let img = image::open(path)?;
        Ok(Self::Mask(Mask::from_image(&img)))
    }

    /// The mask for an image of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if a stored mask has another size,
    /// or [`Error::InvalidRegion`] if a rectangle does not fit the frame.
    pub fn resolve(&self, width: u32, height: u32, padding: u32) -> Result<Mask> {
        match self {
            Self::Mask(mask) => {
                if mask.width() != width || mask.height() != height {
                    return Err(Error::DimensionMismatch {
                        buffer_width: width,
                        buffer_height: height,
                        mask_width: mask.width(),
                        mask_height: mask.height(),
                    });
                }
                Ok(mask.clone())
            }
            Self::Region(region) => Mask::from_region(width, height, *region, padding),
        }
    }
}

/// Per-call options for file processing.
///
/// Fill constants are not part of these options; they belong to the
/// [`InpaintEngine`] doing the work.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Pixels added around rectangle selections.
    pub padding: u32,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_REGION_PADDING,
            verbose: false,
            quiet: false,
        }
    }
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Whether the file was skipped (mask selects nothing).
    pub skipped: bool,
    /// Number of pixels synthesized.
    pub filled: usize,
    /// Human-readable status message.
    pub message: String,
}

impl ProcessResult {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            success: false,
            skipped: false,
            filled: 0,
            message: String::new(),
        }
    }

    fn failed(path: &Path, message: String) -> Self {
        Self {
            message,
            ..Self::new(path)
        }
    }
}

/// Fill engine bound to one set of parameters.
///
/// The engine holds no per-image state, so one instance can be shared across
/// threads and reused for any number of images.
#[derive(Debug, Clone, Copy, Default)]
pub struct InpaintEngine {
    params: FillParams,
}

impl InpaintEngine {
    /// Create an engine with the given preset or parameters.
    #[must_use]
    pub fn new(params: impl Into<FillParams>) -> Self {
        Self {
            params: params.into(),
        }
    }

    /// The parameters in use.
    #[must_use]
    pub fn params(&self) -> FillParams {
        self.params
    }

    /// Fill `mask` in `buffer`. See [`inpaint`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the sizes differ.
    pub fn fill(&self, buffer: &PixelBuffer, mask: &Mask) -> Result<PixelBuffer> {
        inpaint(buffer, mask, self.params)
    }

    /// Process a single image file: load, build mask, fill, save.
    ///
    /// The fill uses this engine's parameters; `opts` only supplies the
    /// region padding. Returns a [`ProcessResult`] indicating success, skip,
    /// or failure.
    #[must_use]
    pub fn process_file(
        &self,
        input: &Path,
        mask_source: &MaskSource,
        output: &Path,
        opts: &ProcessOptions,
    ) -> ProcessResult {
        let mut result = ProcessResult::new(input);

        let buffer = match image::open(input) {
            Ok(img) => PixelBuffer::from(img.to_rgba8()),
            Err(e) => {
                result.message = format!("Failed to load: {e}");
                return result;
            }
        };

        let mask = match mask_source.resolve(buffer.width(), buffer.height(), opts.padding) {
            Ok(mask) => mask,
            Err(e) => {
                result.message = format!("Bad mask: {e}");
                return result;
            }
        };

        if mask.is_empty() {
            result.skipped = true;
            result.success = true;
            result.message = "Mask selects no pixels".to_string();
            return result;
        }

        tracing::debug!(path = %input.display(), masked = mask.count(), "filling");
        let filled = match self.fill(&buffer, &mask) {
            Ok(filled) => filled,
            Err(e) => {
                result.message = format!("Fill failed: {e}");
                return result;
            }
        };
        result.filled = mask.count();

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    result.message = format!("Failed to create output directory: {e}");
                    return result;
                }
            }
        }

        match save_image(&filled, output) {
            Ok(()) => {
                result.success = true;
                result.message = format!("Filled {} pixels", result.filled);
            }
            Err(e) => {
                result.message = format!("Failed to save: {e}");
            }
        }

        result
    }

    /// Process all supported images in a directory with one mask source.
    ///
    /// Suited to extracted video frames: each file is filled independently
    /// and written under the same name in `output_dir`. Uses parallel
    /// iteration when the `cli` feature is enabled (via rayon). Results come
    /// back in file-name order.
    #[must_use]
    pub fn process_directory(
        &self,
        input_dir: &Path,
        mask_source: &MaskSource,
        output_dir: &Path,
        opts: &ProcessOptions,
    ) -> Vec<ProcessResult> {
        let mut inputs: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .filter(|p| is_supported_image(p))
                .collect(),
            Err(e) => {
                return vec![ProcessResult::failed(
                    input_dir,
                    format!("Failed to read directory: {e}"),
                )];
            }
        };
        inputs.sort();

        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                return vec![ProcessResult::failed(
                    output_dir,
                    format!("Failed to create output directory: {e}"),
                )];
            }
        }

        let process = |input: &PathBuf| match input.file_name() {
            Some(name) => self.process_file(input, mask_source, &output_dir.join(name), opts),
            None => ProcessResult::failed(input, "Path has no file name".to_string()),
        };

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            inputs.par_iter().map(process).collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            inputs.iter().map(process).collect()
        }
    }
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}

/// Save a filled buffer with format-specific settings.
///
/// JPEG output is flattened to RGB at quality 100; PNG, WebP and BMP keep
/// the alpha channel.
///
/// # Errors
///
/// Returns an error if the format is unsupported or writing fails.
pub fn save_image(buffer: &PixelBuffer, path: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    let dyn_img = DynamicImage::ImageRgba8(buffer.clone().into_rgba_image()?);

    match format {
        ImageFormat::Jpeg => {
            let file = std::fs::File::create(path)?;
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, 100);
            encoder.encode_image(&DynamicImage::ImageRgb8(dyn_img.to_rgb8()))?;
        }
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Bmp => {
            dyn_img.save(path)?;
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    Ok(())
}

/// Generate a default output path from an input path.
///
/// Example: `"photo.jpg"` becomes `"photo_inpainted.jpg"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = input.extension().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_inpainted.{ext}"))
}
