use crate::Image;
use image::Luma;
use itertools::iproduct;

/// Binary neighborhood footprint
///
/// Cells are stored row-major; a `true` cell belongs to the neighborhood.
/// Any nonzero input value is normalised to membership, so 0/1 and 0/255
/// footprints behave the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl StructuringElement {
    /// Creates an element by evaluating `f(x, y)` for every cell
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> bool,
    {
        let cells = iproduct!(0..height, 0..width)
            .map(|(y, x)| f(x, y))
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    /// Creates an element from a grayscale image, nonzero pixels being members
    pub fn from_image(image: &Image<Luma<u8>>) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            cells: image.as_raw().iter().map(|&v| v != 0).collect(),
        }
    }

    /// Creates an element from rows of flags
    ///
    /// The width is the longest row; shorter rows are padded with non-members.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Self {
        let width = rows.iter().map(|r| r.as_ref().len()).max().unwrap_or(0);
        Self::from_fn(width as u32, rows.len() as u32, |x, y| {
            rows[y as usize]
                .as_ref()
                .get(x as usize)
                .is_some_and(|&v| v != 0)
        })
    }

    /// `size` x `size` element with every cell set
    pub fn square(size: u32) -> Self {
        Self::rectangle(size, size)
    }

    /// `width` x `height` element with every cell set
    pub fn rectangle(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![true; (width * height) as usize],
        }
    }

    /// Disk of the given radius (`x^2 + y^2 <= radius^2`), `2 * radius + 1` wide
    pub fn disk(radius: u32) -> Self {
        let size = 2 * radius + 1;
        let r = i64::from(radius);
        Self::from_fn(size, size, |x, y| {
            let dx = i64::from(x) - r;
            let dy = i64::from(y) - r;
            dx * dx + dy * dy <= r * r
        })
    }

    /// Diamond of the given radius (`|x| + |y| <= radius`), `2 * radius + 1` wide
    pub fn diamond(radius: u32) -> Self {
        let size = 2 * radius + 1;
        let r = i64::from(radius);
        Self::from_fn(size, size, |x, y| {
            (i64::from(x) - r).abs() + (i64::from(y) - r).abs() <= r
        })
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// (width, height)
    #[inline]
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the cell at `(x, y)` belongs to the neighborhood
    ///
    /// Cells outside the element are never members.
    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.cells[(y * self.width + x) as usize]
    }

    /// Number of member cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// True when no cell is a member
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }
}
