use pinboard_engine::assets::Image;
use pinboard_engine::coords::{Rect, Vec2};
use pinboard_engine::scene::DrawList;

use crate::config::Highlight;
use crate::pick;

/// How an item records itself.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawMode {
    /// The image, plus the highlight outline when selected.
    Visible,
    /// A solid rectangle in the pick color of draw-order position `index`.
    Pick { index: usize },
}

/// An image placed on the board.
///
/// Placement applies translate, then scale, then rotate, so scale and
/// rotation act about the item's own center.
#[derive(Debug, Clone)]
pub struct SceneItem {
    pub translation: Vec2,
    pub scale: Vec2,
    /// Degrees, counter-clockwise.
    pub rotation: f32,
    pub(crate) selected: bool,
    image: Image,
}

impl SceneItem {
    pub fn new(image: Image, translation: Vec2) -> Self {
        Self {
            translation,
            scale: Vec2::splat(1.0),
            rotation: 0.0,
            selected: false,
            image,
        }
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    #[inline]
    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Image bounds in item-local coordinates, centered on the origin.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.image.size())
    }

    /// Records the item into `list`. The list's transform is left as found.
    pub fn draw(&self, list: &mut DrawList, mode: DrawMode, highlight: &Highlight) {
        let mut local = list.scope();
        local.translate(self.translation);
        local.scale(self.scale);
        local.rotate_degrees(self.rotation);

        let bounds = self.bounds();
        match mode {
            DrawMode::Visible => {
                if self.selected {
                    local.stroke_rect(bounds, highlight.width, highlight.color);
                }
                // Pixel rows are stored top-first; the world is y-up.
                let mut flipped = local.scope();
                flipped.scale(Vec2::new(1.0, -1.0));
                flipped.draw_image(bounds, &self.image);
            }
            DrawMode::Pick { index } => {
                if let Some(color) = pick::encode(index) {
                    local.fill_rect(bounds, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use pinboard_engine::coords::Transform2;
    use pinboard_engine::scene::DrawCmd;

    fn item(w: u32, h: u32) -> SceneItem {
        SceneItem::new(Image::from_rgba(RgbaImage::new(w, h)), Vec2::new(10.0, 20.0))
    }

    // ── placement ─────────────────────────────────────────────────────────

    #[test]
    fn new_item_has_unit_scale_and_no_rotation() {
        let it = item(4, 2);
        assert_eq!(it.scale, Vec2::splat(1.0));
        assert_eq!(it.rotation, 0.0);
        assert!(!it.is_selected());
        assert_eq!(it.bounds(), Rect::new(-2.0, -1.0, 4.0, 2.0));
    }

    #[test]
    fn scale_acts_about_item_center() {
        let mut it = item(4, 4);
        it.scale = Vec2::new(2.0, 2.0);
        let mut list = DrawList::new();
        it.draw(&mut list, DrawMode::Pick { index: 0 }, &Highlight::default());
        let t = list.items()[0].transform();
        assert_eq!(t.apply(Vec2::zero()), Vec2::new(10.0, 20.0));
        assert_eq!(t.apply(Vec2::new(1.0, 0.0)), Vec2::new(12.0, 20.0));
    }

    #[test]
    fn draw_leaves_list_transform_untouched() {
        let base = Transform2::translation(Vec2::new(7.0, 7.0));
        let mut list = DrawList::with_base_transform(base);
        let mut it = item(3, 3);
        it.rotation = 30.0;
        it.selected = true;
        it.draw(&mut list, DrawMode::Visible, &Highlight::default());
        it.draw(&mut list, DrawMode::Pick { index: 2 }, &Highlight::default());
        assert_eq!(list.transform(), base);
    }

    // ── modes ─────────────────────────────────────────────────────────────

    #[test]
    fn visible_unselected_records_only_the_image() {
        let it = item(4, 2);
        let mut list = DrawList::new();
        it.draw(&mut list, DrawMode::Visible, &Highlight::default());
        assert_eq!(list.len(), 1);
        assert!(matches!(list.items()[0], DrawCmd::Image(_)));
    }

    #[test]
    fn visible_selected_outlines_before_image() {
        let mut it = item(20, 20);
        it.selected = true;
        let mut list = DrawList::new();
        it.draw(&mut list, DrawMode::Visible, &Highlight::default());
        let kinds: Vec<bool> = list.items().iter().map(|c| matches!(c, DrawCmd::Fill(_))).collect();
        assert_eq!(kinds, [true, true, true, true, false]);
        match &list.items()[0] {
            DrawCmd::Fill(f) => assert_eq!(f.color.to_premul_rgba8(), [255, 255, 0, 255]),
            other => panic!("expected fill, got {other:?}"),
        }
    }

    #[test]
    fn small_selected_image_still_outlines_first() {
        // Shorter than two stroke widths: top and bottom bands cover the sides.
        let mut it = item(4, 2);
        it.selected = true;
        let mut list = DrawList::new();
        it.draw(&mut list, DrawMode::Visible, &Highlight::default());
        let kinds: Vec<bool> = list.items().iter().map(|c| matches!(c, DrawCmd::Fill(_))).collect();
        assert_eq!(kinds, [true, true, false]);
    }

    #[test]
    fn pick_mode_ignores_image_and_selection() {
        let mut it = item(4, 2);
        it.selected = true;
        let mut list = DrawList::new();
        it.draw(&mut list, DrawMode::Pick { index: 6 }, &Highlight::default());
        assert_eq!(list.len(), 1);
        match &list.items()[0] {
            DrawCmd::Fill(f) => {
                assert_eq!(f.rect, it.bounds());
                assert_eq!(f.color.to_premul_rgba8(), [7, 0, 0, 255]);
            }
            other => panic!("expected fill, got {other:?}"),
        }
    }

    #[test]
    fn image_top_row_lands_at_world_top() {
        let mut pixels = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
        pixels.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let it = SceneItem::new(Image::from_rgba(pixels), Vec2::zero());
        let mut list = DrawList::new();
        it.draw(&mut list, DrawMode::Visible, &Highlight::default());
        let cmd = &list.items()[0];
        // Texel row 0 sits at rect min y, which the flip sends to world +y.
        let top_left = cmd.transform().apply(cmd.rect().min());
        assert_eq!(top_left, Vec2::new(-1.0, 1.0));
    }
}
