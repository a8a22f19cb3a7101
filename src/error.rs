//! Error types for the watermark-inpaint crate.

/// Errors that can occur while building inputs for, or running, the fill engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The pixel buffer and the mask disagree on image dimensions.
    #[error(
        "mask size {mask_width}x{mask_height} does not match image size {buffer_width}x{buffer_height}"
    )]
    DimensionMismatch {
        /// Pixel buffer width.
        buffer_width: u32,
        /// Pixel buffer height.
        buffer_height: u32,
        /// Mask width.
        mask_width: u32,
        /// Mask height.
        mask_height: u32,
    },

    /// A channel or flag array has the wrong length for its dimensions.
    #[error("buffer length {actual} does not match expected {expected}")]
    BufferLength {
        /// Length implied by width and height.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// A mask byte other than 0 or 1.
    #[error("mask value {value} at index {index} is not 0 or 1")]
    InvalidMaskValue {
        /// Flat pixel index of the offending byte.
        index: usize,
        /// The byte found.
        value: u8,
    },

    /// A rectangle selection that is empty or lies outside the frame.
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred during image processing (load, save, encode).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let unsupported = Error::UnsupportedFormat("tiff".to_string());
        assert!(unsupported.to_string().contains("tiff"));

        let mismatch = Error::DimensionMismatch {
            buffer_width: 10,
            buffer_height: 20,
            mask_width: 11,
            mask_height: 20,
        };
        let msg = mismatch.to_string();
        assert!(msg.contains("10x20"));
        assert!(msg.contains("11x20"));

        let bad_flag = Error::InvalidMaskValue { index: 7, value: 255 };
        assert!(bad_flag.to_string().contains("255"));
    }
}
