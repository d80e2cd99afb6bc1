use crate::error::RankFilterError;
use crate::rank::bitdepth::check_bitdepth;
use crate::rank::footprint::UpdatePlan;
use crate::rank::histogram::{mean_filter_samples, BAND_ROWS};
use crate::rank::structuring_element::StructuringElement;
use crate::Image;
use image::{ColorType, DynamicImage, ImageBuffer, Luma, Primitive};
use imageproc::definitions::Clamp;

/// Options shared by every mean filter call
///
/// `mask` restricts which pixels take part in a neighborhood: nonzero pixels
/// are included, zero pixels are skipped. `shift_x` and `shift_y` move the
/// reference point of even-sized structuring elements to the second central
/// cell; they must be 0 for odd-sized dimensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanOptions<'a> {
    pub mask: Option<&'a Image<Luma<u8>>>,
    pub shift_x: i32,
    pub shift_y: i32,
}

impl<'a> MeanOptions<'a> {
    /// No mask, no shift
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mask: None,
            shift_x: 0,
            shift_y: 0,
        }
    }

    #[must_use]
    pub const fn with_shift(mut self, shift_x: i32, shift_y: i32) -> Self {
        self.shift_x = shift_x;
        self.shift_y = shift_y;
        self
    }

    #[must_use]
    pub const fn with_mask(mut self, mask: &'a Image<Luma<u8>>) -> Self {
        self.mask = Some(mask);
        self
    }
}

/// Sample types the sliding histogram engine is instantiated for
pub trait RankSample: Primitive + Into<usize> + Clamp<f32> + Send + Sync + 'static {
    /// Color type of a luma image of this sample
    const COLOR_TYPE: ColorType;

    /// Number of histogram bins needed for `samples`
    ///
    /// # Errors
    ///
    /// * `RankFilterError::BitDepthExceeded` - the samples do not fit the engine
    fn histogram_bins(samples: &[Self]) -> Result<usize, RankFilterError>;
}

impl RankSample for u8 {
    const COLOR_TYPE: ColorType = ColorType::L8;

    fn histogram_bins(_samples: &[Self]) -> Result<usize, RankFilterError> {
        Ok(256)
    }
}

impl RankSample for u16 {
    const COLOR_TYPE: ColorType = ColorType::L16;

    fn histogram_bins(samples: &[Self]) -> Result<usize, RankFilterError> {
        let bitdepth = check_bitdepth(samples)?;
        Ok(1 << bitdepth)
    }
}

/// Local mean over a structuring element
///
/// Every output pixel is the truncated mean of the in-bounds, unmasked
/// pixels covered by the structuring element; pixels whose neighborhood is
/// empty are set to 0. No virtual padding is added at the borders.
pub trait MeanFilter: Sized {
    /// Computes the local mean into a newly allocated image
    ///
    /// # Errors
    ///
    /// * `RankFilterError::BitDepthExceeded` - a 16-bit sample is 4096 or greater
    /// * `RankFilterError::InvalidShift` - a shift is outside the element's central cells
    /// * `RankFilterError::EmptyStructuringElement` - the element has a zero dimension
    /// * `RankFilterError::MaskDimensionMismatch` - the mask does not match the image
    fn mean(
        &self,
        selem: &StructuringElement,
        options: &MeanOptions<'_>,
    ) -> Result<Self, RankFilterError>;

    /// Computes the local mean into `out`
    ///
    /// `out` is left untouched when an error is returned.
    ///
    /// # Errors
    ///
    /// Same as [`MeanFilter::mean`], plus
    /// `RankFilterError::OutputDimensionMismatch` when `out` differs in size.
    fn mean_into(
        &self,
        selem: &StructuringElement,
        options: &MeanOptions<'_>,
        out: &mut Self,
    ) -> Result<(), RankFilterError>;
}

impl<S> MeanFilter for Image<Luma<S>>
where
    S: RankSample,
{
    fn mean(
        &self,
        selem: &StructuringElement,
        options: &MeanOptions<'_>,
    ) -> Result<Self, RankFilterError> {
        let (width, height) = self.dimensions();
        let mut out = ImageBuffer::new(width, height);
        self.mean_into(selem, options, &mut out)?;
        Ok(out)
    }

    fn mean_into(
        &self,
        selem: &StructuringElement,
        options: &MeanOptions<'_>,
        out: &mut Self,
    ) -> Result<(), RankFilterError> {
        let (width, height) = self.dimensions();

        if out.dimensions() != (width, height) {
            return Err(RankFilterError::OutputDimensionMismatch {
                expected: (width, height),
                actual: out.dimensions(),
            });
        }

        if let Some(mask) = options.mask {
            if mask.dimensions() != (width, height) {
                return Err(RankFilterError::MaskDimensionMismatch {
                    expected: (width, height),
                    actual: mask.dimensions(),
                });
            }
        }

        let plan = UpdatePlan::new(selem, options.shift_x, options.shift_y)?;
        let bins = S::histogram_bins(self.as_raw())?;

        let mask: Option<Vec<bool>> = options
            .mask
            .map(|m| m.as_raw().iter().map(|&v| v != 0).collect());

        tracing::debug!(
            color = ?S::COLOR_TYPE,
            width,
            height,
            bins,
            neighbors = plan.offsets().len(),
            bands = (height as usize).div_ceil(BAND_ROWS),
            masked = mask.is_some(),
            "local mean"
        );

        mean_filter_samples(
            self.as_raw(),
            mask.as_deref(),
            width,
            height,
            &plan,
            bins,
            &mut **out,
        );
        Ok(())
    }
}

/// A luma image of one of the supported sample widths
///
/// This is the single place where the sample type of a [`DynamicImage`] is
/// inspected.
#[derive(Debug, Clone, Copy)]
pub enum SampleImage<'a> {
    Bytes8(&'a Image<Luma<u8>>),
    Bytes16(&'a Image<Luma<u16>>),
}

impl SampleImage<'_> {
    #[must_use]
    pub const fn color_type(&self) -> ColorType {
        match self {
            Self::Bytes8(_) => ColorType::L8,
            Self::Bytes16(_) => ColorType::L16,
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Bytes8(image) => image.dimensions(),
            Self::Bytes16(image) => image.dimensions(),
        }
    }
}

impl<'a> TryFrom<&'a DynamicImage> for SampleImage<'a> {
    type Error = RankFilterError;

    fn try_from(image: &'a DynamicImage) -> Result<Self, Self::Error> {
        match image {
            DynamicImage::ImageLuma8(image) => Ok(Self::Bytes8(image)),
            DynamicImage::ImageLuma16(image) => Ok(Self::Bytes16(image)),
            other => Err(RankFilterError::UnsupportedColorType(other.color())),
        }
    }
}

/// Returns the local mean of a dynamically typed luma image
///
/// 8-bit input produces 8-bit output and 16-bit input produces 16-bit
/// output. When `out` is given it must hold an image of the same type and
/// size; it is filled in place and a copy of it is returned.
///
/// # Errors
///
/// * `RankFilterError::UnsupportedColorType` - `image` is not `L8` or `L16`
/// * `RankFilterError::OutputTypeMismatch` - `out` holds another color type
/// * any error of [`MeanFilter::mean`]
///
/// # Examples
///
/// ```
/// use image::{DynamicImage, GrayImage};
/// use imageops_rank::{mean, MeanOptions, StructuringElement};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, image::Luma([40])));
/// let result = mean(&image, &StructuringElement::square(3), None, &MeanOptions::new())?;
/// assert_eq!(result.as_luma8().unwrap().get_pixel(0, 0).0, [40]);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub fn mean(
    image: &DynamicImage,
    selem: &StructuringElement,
    out: Option<&mut DynamicImage>,
    options: &MeanOptions<'_>,
) -> Result<DynamicImage, RankFilterError> {
    let sample = SampleImage::try_from(image)?;
    match (sample, out) {
        (SampleImage::Bytes8(image), None) => {
            Ok(DynamicImage::ImageLuma8(image.mean(selem, options)?))
        }
        (SampleImage::Bytes16(image), None) => {
            Ok(DynamicImage::ImageLuma16(image.mean(selem, options)?))
        }
        (SampleImage::Bytes8(image), Some(DynamicImage::ImageLuma8(buffer))) => {
            image.mean_into(selem, options, buffer)?;
            Ok(DynamicImage::ImageLuma8(buffer.clone()))
        }
        (SampleImage::Bytes16(image), Some(DynamicImage::ImageLuma16(buffer))) => {
            image.mean_into(selem, options, buffer)?;
            Ok(DynamicImage::ImageLuma16(buffer.clone()))
        }
        (sample, Some(other)) => Err(RankFilterError::OutputTypeMismatch {
            expected: sample.color_type(),
            actual: other.color(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Axis, ErrorKind};
    use crate::test_utils::{create_block_image_u16, create_block_image_u8};

    #[test]
    fn test_block_pattern_u8() {
        let image = create_block_image_u8();
        let result = image
            .mean(&StructuringElement::square(3), &MeanOptions::new())
            .unwrap();
        let expected: Vec<u8> = vec![
            63, 85, 127, 85, 63, //
            85, 113, 170, 113, 85, //
            127, 170, 255, 170, 127, //
            85, 113, 170, 113, 85, //
            63, 85, 127, 85, 63,
        ];
        assert_eq!(result.as_raw(), &expected);
    }

    #[test]
    fn test_block_pattern_u16() {
        let image = create_block_image_u16();
        let result = image
            .mean(&StructuringElement::square(3), &MeanOptions::new())
            .unwrap();
        let expected: Vec<u16> = vec![
            1023, 1365, 2047, 1365, 1023, //
            1365, 1820, 2730, 1820, 1365, //
            2047, 2730, 4095, 2730, 2047, //
            1365, 1820, 2730, 1820, 1365, //
            1023, 1365, 2047, 1365, 1023,
        ];
        assert_eq!(result.as_raw(), &expected);
    }

    #[test]
    fn test_histogram_bins() {
        assert_eq!(u8::histogram_bins(&[0, 255]), Ok(256));
        assert_eq!(u16::histogram_bins(&[0, 4095]), Ok(4096));
        assert_eq!(u16::histogram_bins(&[3]), Ok(4));
        assert_eq!(u16::histogram_bins(&[0]), Ok(2));
        assert!(u16::histogram_bins(&[4096]).is_err());
    }

    #[test]
    fn test_mean_into_preallocated() {
        let image = create_block_image_u8();
        let mut out: Image<Luma<u8>> = ImageBuffer::new(5, 5);
        image
            .mean_into(&StructuringElement::square(3), &MeanOptions::new(), &mut out)
            .unwrap();
        assert_eq!(out.get_pixel(2, 2).0, [255]);
        assert_eq!(out.get_pixel(0, 0).0, [63]);
    }

    #[test]
    fn test_mean_into_wrong_size_leaves_output_untouched() {
        let image = create_block_image_u8();
        let mut out: Image<Luma<u8>> = ImageBuffer::from_pixel(4, 5, Luma([7]));
        let err = image
            .mean_into(&StructuringElement::square(3), &MeanOptions::new(), &mut out)
            .unwrap_err();
        assert_eq!(
            err,
            RankFilterError::OutputDimensionMismatch {
                expected: (5, 5),
                actual: (4, 5)
            }
        );
        assert!(out.pixels().all(|p| p.0 == [7]));
    }

    #[test]
    fn test_mask_dimension_mismatch() {
        let image = create_block_image_u8();
        let mask: Image<Luma<u8>> = ImageBuffer::from_pixel(5, 4, Luma([1]));
        let err = image
            .mean(
                &StructuringElement::square(3),
                &MeanOptions::new().with_mask(&mask),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_invalid_shift_is_config_error() {
        let image = create_block_image_u8();
        let err = image
            .mean(
                &StructuringElement::square(3),
                &MeanOptions::new().with_shift(0, 1),
            )
            .unwrap_err();
        assert_eq!(
            err,
            RankFilterError::InvalidShift {
                axis: Axis::Y,
                shift: 1,
                extent: 3
            }
        );
    }

    #[test]
    fn test_dynamic_dispatch() {
        let image = DynamicImage::ImageLuma16(create_block_image_u16());
        let result = mean(
            &image,
            &StructuringElement::square(3),
            None,
            &MeanOptions::new(),
        )
        .unwrap();
        assert_eq!(result.color(), ColorType::L16);
        assert_eq!(result.as_luma16().unwrap().get_pixel(2, 2).0, [4095]);

        let rgb = DynamicImage::new_rgb8(3, 3);
        let err = mean(&rgb, &StructuringElement::square(3), None, &MeanOptions::new())
            .unwrap_err();
        assert_eq!(err, RankFilterError::UnsupportedColorType(ColorType::Rgb8));
        assert_eq!(err.kind(), ErrorKind::TypeUnsupported);
    }

    #[test]
    fn test_dynamic_output_buffer() {
        let image = DynamicImage::ImageLuma8(create_block_image_u8());
        let mut out = DynamicImage::new_luma8(5, 5);
        let result = mean(
            &image,
            &StructuringElement::square(3),
            Some(&mut out),
            &MeanOptions::new(),
        )
        .unwrap();
        assert_eq!(result, out);
        assert_eq!(out.as_luma8().unwrap().get_pixel(1, 1).0, [113]);

        let mut wrong = DynamicImage::new_luma16(5, 5);
        let err = mean(
            &image,
            &StructuringElement::square(3),
            Some(&mut wrong),
            &MeanOptions::new(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            RankFilterError::OutputTypeMismatch {
                expected: ColorType::L8,
                actual: ColorType::L16
            }
        );
    }
}
