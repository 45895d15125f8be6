use super::Vec2;

/// Axis-aligned rectangle given by its minimum corner and size.
///
/// The minimum corner is the top-left in screen space and the bottom-left in
/// the y-up world used by the board; the type itself does not care.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Rectangle of `size` centered on the origin.
    #[inline]
    pub fn centered(size: Vec2) -> Self {
        Self::from_origin_size(size * -0.5, size)
    }

    /// Smallest rectangle containing every point in `points`.
    ///
    /// Returns `None` for an empty iterator.
    pub fn bounding(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let (mut min, mut max) = (first, first);
        for p in it {
            min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
            max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
        }
        Some(Self::from_origin_size(min, max - min))
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    /// Corners in order min, (max.x, min.y), max, (min.x, max.y).
    #[inline]
    pub fn corners(self) -> [Vec2; 4] {
        let (lo, hi) = (self.min(), self.max());
        [lo, Vec2::new(hi.x, lo.y), hi, Vec2::new(lo.x, hi.y)]
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut x = self.origin.x;
        let mut y = self.origin.y;
        let mut w = self.size.x;
        let mut h = self.size.y;

        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }

        Rect::new(x, y, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── constructors ──────────────────────────────────────────────────────

    #[test]
    fn centered_straddles_origin() {
        let c = Rect::centered(Vec2::new(40.0, 20.0));
        assert_eq!(c, r(-20.0, -10.0, 40.0, 20.0));
        assert_eq!(c.max(), Vec2::new(20.0, 10.0));
    }

    #[test]
    fn bounding_covers_all_points() {
        let b = Rect::bounding([
            Vec2::new(3.0, -1.0),
            Vec2::new(-2.0, 4.0),
            Vec2::new(0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(b, r(-2.0, -1.0, 5.0, 5.0));
    }

    #[test]
    fn bounding_empty_is_none() {
        assert!(Rect::bounding(std::iter::empty()).is_none());
    }

    #[test]
    fn corners_wind_from_min() {
        let [a, b, c, d] = r(1.0, 2.0, 3.0, 4.0).corners();
        assert_eq!(a, Vec2::new(1.0, 2.0));
        assert_eq!(b, Vec2::new(4.0, 2.0));
        assert_eq!(c, Vec2::new(4.0, 6.0));
        assert_eq!(d, Vec2::new(1.0, 6.0));
    }

    // ── normalized ────────────────────────────────────────────────────────

    #[test]
    fn normalized_negative_width() {
        let n = r(10.0, 0.0, -4.0, 5.0).normalized();
        assert_eq!(n.origin.x, 6.0);
        assert_eq!(n.size.x, 4.0);
    }

    #[test]
    fn is_empty_zero_size() {
        assert!(r(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(!r(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
