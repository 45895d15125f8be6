use core::ops::{Deref, DerefMut};

use crate::assets::Image;
use crate::coords::{Rect, Transform2, Vec2};
use crate::paint::Color;

use super::{DrawCmd, FillCmd, ImageCmd};

/// Recorded draw stream for one pass.
///
/// Commands are kept in insertion order, which is the paint order
/// (back-to-front). Every command snapshots the current transform.
///
/// # Transforms
///
/// `translate`, `scale` and `rotate_degrees` compose in the local frame of
/// the current transform. Use [`scope`](Self::scope) to bound them; the
/// returned guard restores the previous transform when dropped, on every exit
/// path:
///
/// ```
/// # use pinboard_engine::scene::DrawList;
/// # use pinboard_engine::coords::Vec2;
/// let mut list = DrawList::new();
/// {
///     let mut s = list.scope();
///     s.translate(Vec2::new(10.0, 0.0));
///     // ... record commands ...
/// }
/// assert_eq!(list.transform(), list.base_transform());
/// ```
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawCmd>,
    base: Transform2,
    transform: Transform2,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list whose root transform is `base` (e.g. a camera view).
    #[inline]
    pub fn with_base_transform(base: Transform2) -> Self {
        Self { items: Vec::new(), base, transform: base }
    }

    /// Clears recorded items and resets the transform to the base. Keeps
    /// allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
        self.transform = self.base;
    }

    /// Replaces the base transform and clears the list.
    #[inline]
    pub fn reset(&mut self, base: Transform2) {
        self.base = base;
        self.clear();
    }

    /// Returns items in paint order.
    #[inline]
    pub fn items(&self) -> &[DrawCmd] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn base_transform(&self) -> Transform2 {
        self.base
    }

    /// Current local-to-screen transform.
    #[inline]
    pub fn transform(&self) -> Transform2 {
        self.transform
    }

    /// Opens a transform scope. The transform in effect now is restored when
    /// the guard is dropped.
    #[inline]
    pub fn scope(&mut self) -> TransformScope<'_> {
        let saved = self.transform;
        TransformScope { list: self, saved }
    }

    // ── transform ops ─────────────────────────────────────────────────────

    #[inline]
    pub fn translate(&mut self, t: Vec2) {
        self.transform = self.transform * Transform2::translation(t);
    }

    #[inline]
    pub fn scale(&mut self, s: Vec2) {
        self.transform = self.transform * Transform2::scaling(s);
    }

    #[inline]
    pub fn rotate_degrees(&mut self, degrees: f32) {
        self.transform = self.transform * Transform2::rotation_degrees(degrees);
    }

    // ── recording ─────────────────────────────────────────────────────────

    /// Records a solid rectangle in the current local frame.
    #[inline]
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.items.push(DrawCmd::Fill(FillCmd { transform: self.transform, rect, color }));
    }

    /// Records an unfilled rectangle outline as four edge bands of `width`,
    /// centered on the edges of `rect`.
    ///
    /// `width <= 0` records nothing.
    pub fn stroke_rect(&mut self, rect: Rect, width: f32, color: Color) {
        if width <= 0.0 || !width.is_finite() {
            return;
        }
        let r = rect.normalized();
        let half = Vec2::splat(width * 0.5);
        let lo = r.min() - half;
        let hi = r.max() + half;
        let outer_w = hi.x - lo.x;
        let side_h = (hi.y - lo.y) - 2.0 * width;

        self.fill_rect(Rect::new(lo.x, lo.y, outer_w, width), color);
        self.fill_rect(Rect::new(lo.x, hi.y - width, outer_w, width), color);
        if side_h > 0.0 {
            self.fill_rect(Rect::new(lo.x, lo.y + width, width, side_h), color);
            self.fill_rect(Rect::new(hi.x - width, lo.y + width, width, side_h), color);
        }
    }

    /// Records `image` stretched over `rect` in the current local frame.
    #[inline]
    pub fn draw_image(&mut self, rect: Rect, image: &Image) {
        self.items.push(DrawCmd::Image(ImageCmd {
            transform: self.transform,
            rect,
            image: image.clone(),
        }));
    }
}

/// Guard returned by [`DrawList::scope`].
///
/// Dereferences to the list; restores the saved transform on drop.
pub struct TransformScope<'a> {
    list: &'a mut DrawList,
    saved: Transform2,
}

impl Deref for TransformScope<'_> {
    type Target = DrawList;

    #[inline]
    fn deref(&self) -> &DrawList {
        self.list
    }
}

impl DerefMut for TransformScope<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut DrawList {
        self.list
    }
}

impl Drop for TransformScope<'_> {
    fn drop(&mut self) {
        self.list.transform = self.saved;
    }
}
