//! Grid coordinates and rectangles.
//!
//! A [`Point`] names one cell (x = column, y = row). A [`Range`] is the
//! half-open block of cells a terrain source exposes, and doubles as the
//! mapping between coordinates and row-major linear indices.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

/// Cell coordinate. X grows to the right, Y grows downwards.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Self = Self::new(0, 0);

    /// Neighbour offsets: N, S, E, W, NE, NW, SE, SW.
    pub const DIRS_8: [Point; 8] = [
        Point::new(0, -1),
        Point::new(0, 1),
        Point::new(1, 0),
        Point::new(-1, 0),
        Point::new(1, -1),
        Point::new(-1, -1),
        Point::new(1, 1),
        Point::new(-1, 1),
    ];

    /// Point at column `x`, row `y`.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `self` moved by `dx` columns and `dy` rows.
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The eight surrounding cells in [`DIRS_8`](Self::DIRS_8) order.
    #[inline]
    pub fn neighbors_8(self) -> [Point; 8] {
        Self::DIRS_8.map(|d| self + d)
    }

    /// Whether `other` touches `self` by an edge or a corner.
    #[inline]
    pub fn is_adjacent_8(self, other: Point) -> bool {
        let (dx, dy) = ((self.x - other.x).abs(), (self.y - other.y).abs());
        dx.max(dy) == 1
    }

    /// Floor division of both coordinates by `size`, e.g. for chunk lookup.
    ///
    /// Negative coordinates round towards negative infinity, so `(-1, -1)`
    /// with a size of 16 lands in chunk `(-1, -1)`.
    #[inline]
    pub fn div_floor(self, size: Point) -> Self {
        Self::new(self.x.div_euclid(size.x), self.y.div_euclid(size.y))
    }
}

/// Row-major: by row first, then by column.
impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.shift(rhs.x, rhs.y)
    }
}

/// Cells `min.x..max.x` × `min.y..max.y`.
///
/// Every range with no cells equals every other one.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl PartialEq for Range {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => true,
            (false, false) => self.min == other.min && self.max == other.max,
            _ => false,
        }
    }
}

impl Eq for Range {}

impl Range {
    /// Range spanned by two corners given in any order.
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0.min(x1), y0.min(y1)),
            max: Point::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// `width` × `height` cells starting at the origin.
    #[inline]
    pub fn sized(width: i32, height: i32) -> Self {
        Self::with_size(Point::ZERO, Point::new(width, height))
    }

    /// `size.x` × `size.y` cells starting at `min`.
    #[inline]
    pub fn with_size(min: Point, size: Point) -> Self {
        Self::new(min.x, min.y, min.x + size.x, min.y + size.y)
    }

    /// Number of columns.
    #[inline]
    pub fn width(self) -> i32 {
        self.max.x - self.min.x
    }

    /// Number of rows.
    #[inline]
    pub fn height(self) -> i32 {
        self.max.y - self.min.y
    }

    /// Number of cells.
    #[inline]
    pub fn len(self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width() as usize * self.height() as usize
        }
    }

    /// Whether the range has no cells.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Whether `p` lies inside the range.
    #[inline]
    pub fn contains(self, p: Point) -> bool {
        (self.min.x..self.max.x).contains(&p.x) && (self.min.y..self.max.y).contains(&p.y)
    }

    /// Row-major index of `p` counted from `min`: `(p.y - min.y) * width +
    /// (p.x - min.x)`. `None` outside the range.
    #[inline]
    pub fn index_of(self, p: Point) -> Option<usize> {
        self.contains(p).then(|| {
            let col = (p.x - self.min.x) as usize;
            let row = (p.y - self.min.y) as usize;
            row * self.width() as usize + col
        })
    }

    /// Inverse of [`index_of`](Self::index_of). `idx` must be `< len()`.
    #[inline]
    pub fn point_at(self, idx: usize) -> Point {
        let w = self.width().max(1) as usize;
        self.min.shift((idx % w) as i32, (idx / w) as i32)
    }

    /// Every cell in row-major order.
    #[inline]
    pub fn iter(self) -> RangeIter {
        RangeIter {
            range: self,
            next: 0,
            len: self.len(),
        }
    }
}

impl IntoIterator for Range {
    type Item = Point;
    type IntoIter = RangeIter;

    #[inline]
    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

/// Iterator returned by [`Range::iter`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: Range,
    next: usize,
    len: usize,
}

impl Iterator for RangeIter {
    type Item = Point;

    #[inline]
    fn next(&mut self) -> Option<Point> {
        if self.next >= self.len {
            return None;
        }
        let p = self.range.point_at(self.next);
        self.next += 1;
        Some(p)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for RangeIter {}
