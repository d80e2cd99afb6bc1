use image::ColorType;
use thiserror::Error;

/// Broad classification of a [`RankFilterError`]
///
/// Every error is a violation of the caller's contract and is detected before
/// any output pixel is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The sample type is neither 8-bit nor 16-bit unsigned luma
    TypeUnsupported,
    /// A 16-bit image holds values beyond the supported bit depth
    DomainExceeded,
    /// A parameter or buffer does not fit the operation
    ConfigInvalid,
}

/// Axis of a structuring element, used in shift errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal (`shift_x`)
    X,
    /// Vertical (`shift_y`)
    Y,
}

/// Error type for rank filter operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankFilterError {
    /// The image is not single-channel 8-bit or 16-bit unsigned
    ///
    /// Only `Luma<u8>` and `Luma<u16>` images carry a histogram engine.
    #[error("only uint8 and uint16 luma images are supported, got {0:?}")]
    UnsupportedColorType(ColorType),

    /// A 16-bit image needs more bits than the histogram can hold
    #[error("only images representable in 12 bits are supported (found {bitdepth} bits, max value {max_value})")]
    BitDepthExceeded {
        /// Bits needed to represent `max_value`
        bitdepth: u32,
        /// Largest sample in the image
        max_value: u16,
    },

    /// The shift moves the reference point outside the central cells
    ///
    /// Odd dimensions accept only 0; even dimensions accept 0 or 1.
    #[error("shift {shift} on axis {axis:?} is out of range for a structuring element of extent {extent}")]
    InvalidShift {
        axis: Axis,
        shift: i32,
        extent: u32,
    },

    /// The structuring element has a zero dimension
    #[error("structuring element must have non-zero dimensions, got {width}x{height}")]
    EmptyStructuringElement { width: u32, height: u32 },

    /// The mask does not cover the image exactly
    #[error("Image and mask dimensions do not match: expected {expected:?}, actual {actual:?}")]
    MaskDimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },

    /// The caller-supplied output buffer has the wrong dimensions
    #[error("Output buffer dimensions do not match: expected {expected:?}, actual {actual:?}")]
    OutputDimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },

    /// The caller-supplied output buffer has the wrong sample type
    #[error("Output buffer type mismatch: expected {expected:?}, actual {actual:?}")]
    OutputTypeMismatch {
        expected: ColorType,
        actual: ColorType,
    },
}

impl RankFilterError {
    /// Returns the broad category of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedColorType(_) => ErrorKind::TypeUnsupported,
            Self::BitDepthExceeded { .. } => ErrorKind::DomainExceeded,
            Self::InvalidShift { .. }
            | Self::EmptyStructuringElement { .. }
            | Self::MaskDimensionMismatch { .. }
            | Self::OutputDimensionMismatch { .. }
            | Self::OutputTypeMismatch { .. } => ErrorKind::ConfigInvalid,
        }
    }
}
