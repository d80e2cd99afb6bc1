use crate::rank::footprint::{Offset, Step, UpdatePlan};
use image::Primitive;
use imageproc::definitions::Clamp;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Rows scanned by one window before it is rebuilt from scratch
///
/// Bands are independent of each other, which is what lets them run in parallel.
pub const BAND_ROWS: usize = 32;

/// Fixed-size count histogram with running moments
///
/// `counts` always sums to `population`, and `sum` always equals
/// `sum(value * counts[value])`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlidingHistogram {
    counts: Vec<u32>,
    sum: u64,
    population: u32,
}

impl SlidingHistogram {
    /// Creates an empty histogram able to hold values in `0..bins`
    #[must_use]
    pub fn new(bins: usize) -> Self {
        Self {
            counts: vec![0; bins],
            sum: 0,
            population: 0,
        }
    }

    #[inline]
    pub fn insert(&mut self, value: usize) {
        self.counts[value] += 1;
        self.sum += value as u64;
        self.population += 1;
    }

    #[inline]
    pub fn remove(&mut self, value: usize) {
        debug_assert!(self.counts[value] > 0, "removing absent value {value}");
        self.counts[value] -= 1;
        self.sum -= value as u64;
        self.population -= 1;
    }

    /// Empties the histogram while keeping its bins
    pub fn clear(&mut self) {
        self.counts.fill(0);
        self.sum = 0;
        self.population = 0;
    }

    #[inline]
    #[must_use]
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Occurrences of `value` in the window
    #[inline]
    #[must_use]
    pub fn count(&self, value: usize) -> u32 {
        self.counts[value]
    }

    /// Number of valid pixels in the window
    #[inline]
    #[must_use]
    pub const fn population(&self) -> u32 {
        self.population
    }

    #[inline]
    #[must_use]
    pub const fn sum(&self) -> u64 {
        self.sum
    }

    /// Truncated mean of the window, 0 for an empty window
    #[inline]
    #[must_use]
    pub const fn mean(&self) -> u64 {
        if self.population == 0 {
            0
        } else {
            self.sum / self.population as u64
        }
    }
}

/// Read-only view of the samples the window walks over
struct SampleView<'a, S> {
    samples: &'a [S],
    mask: Option<&'a [bool]>,
    width: i64,
    height: i64,
}

impl<S> SampleView<'_, S>
where
    S: Primitive + Into<usize>,
{
    /// Histogram bin of the pixel at `(y, x)`, or `None` when it lies outside
    /// the image or is masked out
    #[inline]
    fn bin(&self, y: i64, x: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        let index = (y * self.width + x) as usize;
        match self.mask {
            Some(mask) if !mask[index] => None,
            _ => Some(self.samples[index].into()),
        }
    }
}

/// Window state for one band: the histogram plus the current centre
struct BandScanner<'a, S> {
    view: &'a SampleView<'a, S>,
    plan: &'a UpdatePlan,
    histogram: SlidingHistogram,
    y: i64,
    x: i64,
}

impl<'a, S> BandScanner<'a, S>
where
    S: Primitive + Into<usize>,
{
    /// Builds the full window centred on `(y, x)`
    fn start(
        view: &'a SampleView<'a, S>,
        plan: &'a UpdatePlan,
        bins: usize,
        y: i64,
        x: i64,
    ) -> Self {
        let mut scanner = Self {
            view,
            plan,
            histogram: SlidingHistogram::new(bins),
            y,
            x,
        };
        scanner.insert_all(plan.offsets());
        scanner
    }

    /// Moves the centre one pixel and replays the matching update lists
    fn advance(&mut self, step: Step) {
        match step {
            Step::East => self.x += 1,
            Step::West => self.x -= 1,
            Step::South => self.y += 1,
        }
        let plan = self.plan;
        let update = plan.step(step);
        self.remove_all(&update.leaving);
        self.insert_all(&update.entering);
    }

    #[inline]
    fn bin_at(&self, o: Offset) -> Option<usize> {
        self.view.bin(self.y + i64::from(o.dy), self.x + i64::from(o.dx))
    }

    fn insert_all(&mut self, offsets: &[Offset]) {
        for &o in offsets {
            if let Some(bin) = self.bin_at(o) {
                self.histogram.insert(bin);
            }
        }
    }

    fn remove_all(&mut self, offsets: &[Offset]) {
        for &o in offsets {
            if let Some(bin) = self.bin_at(o) {
                self.histogram.remove(bin);
            }
        }
    }
}

/// Fills `out` with the local mean of `samples` over the neighborhood of `plan`
///
/// `samples`, `mask` and `out` are row-major buffers of `width * height`
/// elements. Every value of `samples` must be below `bins`.
///
/// The image is cut into bands of [`BAND_ROWS`] rows. Each band builds its
/// window once at its top-left pixel and then walks the band in boustrophedon
/// order (east, south, west, south, ...), so each step only touches the
/// entering and leaving offsets.
pub fn mean_filter_samples<S>(
    samples: &[S],
    mask: Option<&[bool]>,
    width: u32,
    height: u32,
    plan: &UpdatePlan,
    bins: usize,
    out: &mut [S],
) where
    S: Primitive + Into<usize> + Clamp<f32> + Send + Sync,
{
    if width == 0 || height == 0 {
        return;
    }

    let view = SampleView {
        samples,
        mask,
        width: i64::from(width),
        height: i64::from(height),
    };
    let row_len = width as usize;
    let band_len = row_len * BAND_ROWS;

    let scan = |(band_index, band): (usize, &mut [S])| {
        scan_band(&view, plan, bins, band_index * BAND_ROWS, row_len, band);
    };

    #[cfg(feature = "rayon")]
    out.par_chunks_mut(band_len).enumerate().for_each(scan);
    #[cfg(not(feature = "rayon"))]
    out.chunks_mut(band_len).enumerate().for_each(scan);
}

fn scan_band<S>(
    view: &SampleView<'_, S>,
    plan: &UpdatePlan,
    bins: usize,
    first_row: usize,
    row_len: usize,
    band: &mut [S],
) where
    S: Primitive + Into<usize> + Clamp<f32>,
{
    let mut scanner = BandScanner::start(view, plan, bins, first_row as i64, 0);

    for (r, row) in band.chunks_mut(row_len).enumerate() {
        if r > 0 {
            scanner.advance(Step::South);
        }
        // 偶数行は右向き、奇数行は左向き
        let (step, first) = if r % 2 == 0 {
            (Step::East, 0)
        } else {
            (Step::West, row_len - 1)
        };
        debug_assert_eq!(scanner.x as usize, first);

        row[first] = S::clamp(scanner.histogram.mean() as f32);
        for _ in 1..row_len {
            scanner.advance(step);
            row[scanner.x as usize] = S::clamp(scanner.histogram.mean() as f32);
        }
    }
}
