mod error;
mod rank;

#[cfg(test)]
mod test_utils;

use image::{ImageBuffer, Pixel};

pub use error::{Axis, ErrorKind, RankFilterError};
pub use rank::bitdepth::{check_bitdepth, find_bitdepth, MAX_BITDEPTH};
pub use rank::footprint::{Offset, Step, StepUpdate, UpdatePlan};
pub use rank::histogram::{mean_filter_samples, SlidingHistogram, BAND_ROWS};
pub use rank::mean::{mean, MeanFilter, MeanOptions, RankSample, SampleImage};
pub use rank::structuring_element::StructuringElement;

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
