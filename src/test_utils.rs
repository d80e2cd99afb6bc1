//! Test utilities for imageops-rank
//!
//! This module provides common functionality for testing the rank filters.
//! It is only compiled when running tests.

#[cfg(test)]
use crate::rank::footprint::Offset;
#[cfg(test)]
use crate::Image;
#[cfg(test)]
use image::{ImageBuffer, Luma};

/// The 5x5 test pattern: a 3x3 block of `value` surrounded by zeros.
///
/// ```text
/// 0 0 0 0 0
/// 0 v v v 0
/// 0 v v v 0
/// 0 v v v 0
/// 0 0 0 0 0
/// ```
#[cfg(test)]
pub fn block_pattern<T>(value: T) -> Vec<T>
where
    T: Copy + Default,
{
    (0..25)
        .map(|i| {
            let (x, y) = (i % 5, i / 5);
            if (1..=3).contains(&x) && (1..=3).contains(&y) {
                value
            } else {
                T::default()
            }
        })
        .collect()
}

/// Creates a 5x5 8-bit image holding [`block_pattern`] of 255
#[cfg(test)]
pub fn create_block_image_u8() -> Image<Luma<u8>> {
    ImageBuffer::from_raw(5, 5, block_pattern(255u8)).unwrap()
}

/// Creates a 5x5 16-bit image holding [`block_pattern`] of 4095
#[cfg(test)]
pub fn create_block_image_u16() -> Image<Luma<u16>> {
    ImageBuffer::from_raw(5, 5, block_pattern(4095u16)).unwrap()
}

/// Brute-force local mean used as ground truth for the sliding histogram.
///
/// Every output pixel is recomputed from scratch over `offsets`, skipping
/// out-of-bounds and masked-out pixels; an empty neighborhood yields 0.
#[cfg(test)]
pub fn reference_mean<S>(
    samples: &[S],
    mask: Option<&[bool]>,
    width: u32,
    height: u32,
    offsets: &[Offset],
) -> Vec<S>
where
    S: Copy + Into<u64> + TryFrom<u64>,
    <S as TryFrom<u64>>::Error: std::fmt::Debug,
{
    let (w, h) = (i64::from(width), i64::from(height));
    let mut out = Vec::with_capacity(samples.len());
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0u64;
            let mut count = 0u64;
            for o in offsets {
                let (py, px) = (y + i64::from(o.dy), x + i64::from(o.dx));
                if px < 0 || py < 0 || px >= w || py >= h {
                    continue;
                }
                let index = (py * w + px) as usize;
                if mask.is_some_and(|m| !m[index]) {
                    continue;
                }
                sum += samples[index].into();
                count += 1;
            }
            let mean = if count == 0 { 0 } else { sum / count };
            out.push(S::try_from(mean).unwrap());
        }
    }
    out
}
