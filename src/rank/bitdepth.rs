use crate::error::RankFilterError;

/// Largest bit depth the 16-bit histogram engine accepts (4096 bins)
pub const MAX_BITDEPTH: u32 = 12;

/// Returns the number of bits needed to represent every sample of `samples`
///
/// This is the smallest `b >= 1` such that all samples are `< 2^b`, so
/// `4095` needs 12 bits and `4096` needs 13. An empty buffer needs 1 bit.
#[must_use]
pub fn find_bitdepth(samples: &[u16]) -> u32 {
    let max_value = samples.iter().copied().max().unwrap_or(0);
    bit_length(max_value)
}

/// Probes `samples` and rejects content wider than [`MAX_BITDEPTH`]
///
/// # Errors
///
/// * `RankFilterError::BitDepthExceeded` - a sample is 4096 or greater
pub fn check_bitdepth(samples: &[u16]) -> Result<u32, RankFilterError> {
    let max_value = samples.iter().copied().max().unwrap_or(0);
    let bitdepth = bit_length(max_value);
    if bitdepth > MAX_BITDEPTH {
        return Err(RankFilterError::BitDepthExceeded {
            bitdepth,
            max_value,
        });
    }
    Ok(bitdepth)
}

#[inline]
const fn bit_length(value: u16) -> u32 {
    let bits = u16::BITS - value.leading_zeros();
    if bits == 0 {
        1
    } else {
        bits
    }
}
