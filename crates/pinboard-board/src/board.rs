use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use anyhow::Context;
use pinboard_engine::assets::Image;
use pinboard_engine::coords::{Vec2, Viewport};
use pinboard_engine::input::DropInfo;
use pinboard_engine::paint::Color;
use pinboard_engine::render::{Offscreen, TargetSize};
use pinboard_engine::scene::DrawList;

use crate::camera::Camera2;
use crate::config::BoardConfig;
use crate::error::{BoardError, ReorderError};
use crate::item::{DrawMode, SceneItem};
use crate::pick;

/// Stable handle to an item on a [`Board`]. Never reused.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Direction of a one-step draw-order move.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Reorder {
    /// One position later in the draw order (toward the front).
    Up,
    /// One position earlier (toward the back).
    Down,
}

/// Ordered collection of items with single selection.
///
/// Items live in an arena keyed by [`ItemId`]; `order` lists them
/// back-to-front. At most one item carries the selected flag, and it is the
/// one named by `selected`.
#[derive(Debug)]
pub struct Board {
    config: BoardConfig,
    camera: Camera2,

    items: HashMap<ItemId, SceneItem>,
    order: Vec<ItemId>,
    selected: Option<ItemId>,

    /// Last pointer position of an active press, logical px.
    last_pointer: Option<Vec2>,
    next_id: u64,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            camera: Camera2::default(),
            items: HashMap::new(),
            order: Vec::new(),
            selected: None,
            last_pointer: None,
            next_id: 1,
        }
    }

    #[inline]
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    #[inline]
    pub fn camera(&self) -> &Camera2 {
        &self.camera
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Item handles back-to-front.
    #[inline]
    pub fn order(&self) -> &[ItemId] {
        &self.order
    }

    pub fn get(&self, id: ItemId) -> Option<&SceneItem> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut SceneItem> {
        self.items.get_mut(&id)
    }

    /// Draw-order position of `id`.
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.order.iter().position(|&other| other == id)
    }

    /// Items back-to-front.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &SceneItem)> + '_ {
        self.order.iter().filter_map(|&id| self.items.get(&id).map(|item| (id, item)))
    }

    #[inline]
    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    // ── adding ────────────────────────────────────────────────────────────

    /// Places `image` at `world_pos` on top of the draw order.
    pub fn add_image(&mut self, image: Image, world_pos: Vec2) -> Result<ItemId, BoardError> {
        if self.order.len() >= pick::MAX_ITEMS {
            return Err(BoardError::Full { max: pick::MAX_ITEMS });
        }
        let id = ItemId(self.next_id);
        self.next_id += 1;
        log::debug!("item {id}: {}x{} at {world_pos:?}", image.width(), image.height());
        self.items.insert(id, SceneItem::new(image, world_pos));
        self.order.push(id);
        Ok(id)
    }

    /// Loads the first dropped file and places it under the drop position.
    ///
    /// A drop without a position lands at the viewport center.
    pub fn add_from_drop(&mut self, drop: &DropInfo, viewport: Viewport) -> Result<ItemId, BoardError> {
        let path = drop.first_path().ok_or(BoardError::NoFiles)?;
        if drop.paths.len() > 1 {
            log::debug!("drop carried {} files; using {}", drop.paths.len(), path.display());
        }
        if self.order.len() >= pick::MAX_ITEMS {
            return Err(BoardError::Full { max: pick::MAX_ITEMS });
        }

        let screen = drop.pos.unwrap_or_else(|| viewport.center());
        let world = self.camera.screen_to_world(screen, viewport);
        let image = Image::load(path).map_err(|source| BoardError::Decode {
            path: path.clone(),
            source,
        })?;
        self.add_image(image, world)
    }

    // ── draw lists ────────────────────────────────────────────────────────

    /// Records the visible scene for `viewport` into `list`, replacing its
    /// contents.
    pub fn build_visible(&self, list: &mut DrawList, viewport: Viewport) {
        list.reset(self.camera.view(viewport));
        for (_, item) in self.iter() {
            item.draw(list, DrawMode::Visible, &self.config.highlight);
        }
    }

    /// Records the pick pass: every item as a solid rectangle colored by its
    /// draw-order position.
    pub fn build_pick(&self, list: &mut DrawList, viewport: Viewport) {
        list.reset(self.camera.view(viewport));
        for (index, (_, item)) in self.iter().enumerate() {
            item.draw(list, DrawMode::Pick { index }, &self.config.highlight);
        }
    }

    // ── selection ─────────────────────────────────────────────────────────

    /// Selects the topmost item under logical position `pos`, or clears the
    /// selection when the pointer is over the background.
    ///
    /// The pick pass goes to `offscreen` over a transparent black clear and
    /// is never presented.
    pub fn select_at(
        &mut self,
        pos: Vec2,
        size: TargetSize,
        offscreen: &mut dyn Offscreen,
    ) -> anyhow::Result<Option<ItemId>> {
        let red = match size.pixel_at(pos) {
            Some((x, y)) => {
                let mut list = DrawList::new();
                self.build_pick(&mut list, size.viewport());
                let [r, ..] = offscreen
                    .read_pixel(&list, Color::transparent(), size, x, y)
                    .context("pick read-back failed")?;
                r
            }
            None => 0,
        };
        Ok(self.select_by_pixel(red))
    }

    /// Applies a read-back red channel as the new selection.
    pub fn select_by_pixel(&mut self, red: u8) -> Option<ItemId> {
        let hit = pick::decode(red, self.order.len()).map(|index| self.order[index]);
        self.select(hit)
    }

    /// Replaces the selection. Unknown ids clear it.
    pub fn select(&mut self, id: Option<ItemId>) -> Option<ItemId> {
        if let Some(prev) = self.selected.take() {
            if let Some(item) = self.items.get_mut(&prev) {
                item.selected = false;
            }
        }
        if let Some(item) = id.and_then(|id| self.items.get_mut(&id)) {
            item.selected = true;
            self.selected = id;
        }
        self.selected
    }

    // ── manipulation ──────────────────────────────────────────────────────

    /// Moves the selection by a screen-space delta. Screen y grows downward,
    /// world y upward. Returns `false` when nothing is selected.
    pub fn drag_selected(&mut self, dx: f32, dy: f32) -> bool {
        match self.selected.and_then(|id| self.items.get_mut(&id)) {
            Some(item) => {
                item.translation.x += dx;
                item.translation.y -= dy;
                true
            }
            None => false,
        }
    }

    /// Starts a pointer interaction at `pos` and selects what lies under it.
    pub fn pointer_pressed(
        &mut self,
        pos: Vec2,
        size: TargetSize,
        offscreen: &mut dyn Offscreen,
    ) -> anyhow::Result<Option<ItemId>> {
        self.last_pointer = Some(pos);
        self.select_at(pos, size, offscreen)
    }

    /// Drags the selection along with the pointer.
    pub fn pointer_dragged(&mut self, pos: Vec2) -> bool {
        match self.pointer_delta(pos) {
            Some(d) => self.drag_selected(d.x, d.y),
            None => false,
        }
    }

    /// Pans the camera along with the pointer.
    pub fn pointer_panned(&mut self, pos: Vec2) {
        if let Some(d) = self.pointer_delta(pos) {
            self.camera.pan(d);
        }
    }

    pub fn pointer_released(&mut self) {
        self.last_pointer = None;
    }

    fn pointer_delta(&mut self, pos: Vec2) -> Option<Vec2> {
        let last = self.last_pointer.as_mut()?;
        let delta = pos - *last;
        *last = pos;
        Some(delta)
    }

    /// Swaps the selected item with its neighbor in `direction`. Returns the
    /// new draw-order position.
    pub fn reorder_selected(&mut self, direction: Reorder) -> Result<usize, ReorderError> {
        let pos = self
            .selected
            .and_then(|id| self.position(id))
            .ok_or(ReorderError::NoSelection)?;

        let target = match direction {
            Reorder::Up if pos + 1 >= self.order.len() => return Err(ReorderError::AtTop),
            Reorder::Up => pos + 1,
            Reorder::Down if pos == 0 => return Err(ReorderError::AtBottom),
            Reorder::Down => pos - 1,
        };
        self.order.swap(pos, target);
        Ok(target)
    }

    // ── removal ───────────────────────────────────────────────────────────

    /// Takes `id` off the board, clearing the selection if it named it.
    pub fn remove(&mut self, id: ItemId) -> Option<SceneItem> {
        let item = self.items.remove(&id)?;
        self.order.retain(|&other| other != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(item)
    }

    pub fn remove_selected(&mut self) -> Option<SceneItem> {
        let id = self.selected?;
        self.remove(id)
    }

    /// Releases every item. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.order.len();
        self.order.clear();
        self.items.clear();
        self.selected = None;
        self.last_pointer = None;
        n
    }

    // ── capture ───────────────────────────────────────────────────────────

    /// Renders the visible scene at `size` and writes it as PNG to the
    /// configured path, replacing any existing file.
    pub fn capture_screenshot(
        &self,
        size: TargetSize,
        offscreen: &mut dyn Offscreen,
    ) -> anyhow::Result<PathBuf> {
        let mut list = DrawList::new();
        self.build_visible(&mut list, size.viewport());
        let frame = offscreen
            .capture(&list, self.config.background, size)
            .context("screenshot render failed")?;

        let path = &self.config.screenshot_path;
        frame
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("failed to write screenshot to {}", path.display()))?;
        Ok(path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use pinboard_engine::render::CpuRasterizer;
    use std::path::Path;

    const VP: u32 = 200;

    fn size() -> TargetSize {
        TargetSize::new(VP, VP, 1.0)
    }

    fn solid(w: u32, h: u32, px: [u8; 4]) -> Image {
        Image::from_rgba(RgbaImage::from_pixel(w, h, Rgba(px)))
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pinboard-board-{}-{name}", std::process::id()))
    }

    fn write_png(name: &str, w: u32, h: u32) -> PathBuf {
        let path = temp_path(name);
        RgbaImage::from_pixel(w, h, Rgba([10, 200, 30, 255])).save(&path).unwrap();
        path
    }

    fn drop_at(paths: &[&Path], pos: Vec2) -> DropInfo {
        DropInfo {
            paths: paths.iter().map(|p| p.to_path_buf()).collect(),
            pos: Some(pos),
        }
    }

    /// Board with `n` 40×40 items at world x = 0, 10, 20, …
    fn board_with(n: usize) -> (Board, Vec<ItemId>) {
        let mut board = Board::default();
        let ids = (0..n)
            .map(|i| board.add_image(solid(40, 40, [255, 255, 255, 255]), Vec2::new(i as f32 * 10.0, 0.0)).unwrap())
            .collect();
        (board, ids)
    }

    fn flagged(board: &Board) -> Vec<ItemId> {
        board.iter().filter(|(_, item)| item.is_selected()).map(|(id, _)| id).collect()
    }

    // ── drops ─────────────────────────────────────────────────────────────

    #[test]
    fn n_drops_make_n_items_in_drop_order() {
        let mut board = Board::default();
        let viewport = size().viewport();
        let mut ids = Vec::new();
        for i in 0..5 {
            let path = write_png(&format!("drop-{i}.png"), 3 + i, 2);
            ids.push(board.add_from_drop(&drop_at(&[&path], Vec2::new(100.0, 100.0)), viewport).unwrap());
            std::fs::remove_file(&path).ok();
        }

        assert_eq!(board.len(), 5);
        assert_eq!(board.order(), ids.as_slice());
        for (i, (_, item)) in board.iter().enumerate() {
            assert_eq!(item.image().width(), 3 + i as u32);
        }

        let mut list = DrawList::new();
        board.build_pick(&mut list, viewport);
        for (i, cmd) in list.items().iter().enumerate() {
            match cmd {
                pinboard_engine::scene::DrawCmd::Fill(f) => {
                    assert_eq!(f.color.to_premul_rgba8()[0] as usize, i + 1);
                }
                other => panic!("expected fill, got {other:?}"),
            }
        }
    }

    #[test]
    fn drop_position_goes_through_camera() {
        let mut board = Board::default();
        let path = write_png("drop-pos.png", 4, 4);
        let id = board.add_from_drop(&drop_at(&[&path], Vec2::new(150.0, 50.0)), size().viewport()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(board.get(id).unwrap().translation, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn drop_uses_first_path_only() {
        let mut board = Board::default();
        let good = write_png("drop-first.png", 4, 4);
        let missing = temp_path("drop-second-missing.png");
        board.add_from_drop(&drop_at(&[&good, &missing], Vec2::zero()), size().viewport()).unwrap();
        std::fs::remove_file(&good).ok();
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn undecodable_drop_creates_nothing() {
        let mut board = Board::default();
        let path = temp_path("drop-garbage.png");
        std::fs::write(&path, b"not an image").unwrap();
        let err = board.add_from_drop(&drop_at(&[&path], Vec2::zero()), size().viewport()).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, BoardError::Decode { .. }));
        assert!(err.to_string().starts_with("can't load image"));
        assert!(board.is_empty());
    }

    #[test]
    fn empty_drop_is_rejected() {
        let mut board = Board::default();
        let err = board.add_from_drop(&DropInfo::default(), size().viewport()).unwrap_err();
        assert!(matches!(err, BoardError::NoFiles));
    }

    #[test]
    fn board_stops_at_pick_capacity() {
        let mut board = Board::default();
        let img = solid(1, 1, [0, 0, 0, 255]);
        for _ in 0..pick::MAX_ITEMS {
            board.add_image(img.clone(), Vec2::zero()).unwrap();
        }
        let err = board.add_image(img, Vec2::zero()).unwrap_err();
        assert!(matches!(err, BoardError::Full { max: pick::MAX_ITEMS }));
        assert_eq!(board.len(), pick::MAX_ITEMS);
    }

    // ── selection ─────────────────────────────────────────────────────────

    #[test]
    fn decode_selects_position_r_minus_one() {
        let (mut board, ids) = board_with(3);
        for r in 1..=3u8 {
            assert_eq!(board.select_by_pixel(r), Some(ids[r as usize - 1]));
            assert_eq!(flagged(&board), vec![ids[r as usize - 1]]);
        }
    }

    #[test]
    fn background_or_overflow_red_clears_selection() {
        let (mut board, ids) = board_with(3);
        for r in [0u8, 4, 200, 255] {
            board.select(Some(ids[1]));
            assert_eq!(board.select_by_pixel(r), None);
            assert!(flagged(&board).is_empty());
            assert_eq!(board.selected(), None);
        }
    }

    #[test]
    fn select_at_hits_topmost_item() {
        // A spans screen x 80..120, B 90..130, both y 80..120.
        let (mut board, ids) = board_with(2);
        let mut cpu = CpuRasterizer::new();

        assert_eq!(board.select_at(Vec2::new(115.0, 100.0), size(), &mut cpu).unwrap(), Some(ids[1]));
        assert_eq!(board.select_at(Vec2::new(85.0, 100.0), size(), &mut cpu).unwrap(), Some(ids[0]));
        assert_eq!(flagged(&board), vec![ids[0]]);
        assert_eq!(board.select_at(Vec2::new(5.0, 5.0), size(), &mut cpu).unwrap(), None);
        assert!(flagged(&board).is_empty());
    }

    #[test]
    fn select_at_follows_draw_order_after_reorder() {
        let (mut board, ids) = board_with(2);
        let mut cpu = CpuRasterizer::new();
        board.select(Some(ids[0]));
        board.reorder_selected(Reorder::Up).unwrap();
        assert_eq!(board.select_at(Vec2::new(100.0, 100.0), size(), &mut cpu).unwrap(), Some(ids[0]));
    }

    #[test]
    fn select_at_accounts_for_scale_factor() {
        let (mut board, ids) = board_with(1);
        let mut cpu = CpuRasterizer::new();
        let hidpi = TargetSize::new(VP * 2, VP * 2, 2.0);
        assert_eq!(board.select_at(Vec2::new(100.0, 100.0), hidpi, &mut cpu).unwrap(), Some(ids[0]));
        assert_eq!(board.select_at(Vec2::new(150.0, 100.0), hidpi, &mut cpu).unwrap(), None);
    }

    #[test]
    fn pointer_outside_target_selects_nothing() {
        let (mut board, ids) = board_with(1);
        board.select(Some(ids[0]));
        let mut cpu = CpuRasterizer::new();
        assert_eq!(board.select_at(Vec2::new(-1.0, 100.0), size(), &mut cpu).unwrap(), None);
        assert_eq!(board.selected(), None);
    }

    #[test]
    fn select_at_sees_rotated_and_scaled_items() {
        let mut board = Board::default();
        let id = board.add_image(solid(80, 10, [0, 0, 0, 255]), Vec2::zero()).unwrap();
        let mut cpu = CpuRasterizer::new();
        // Unrotated the strip is 80 wide, 10 tall.
        assert_eq!(board.select_at(Vec2::new(100.0, 70.0), size(), &mut cpu).unwrap(), None);
        board.get_mut(id).unwrap().rotation = 90.0;
        assert_eq!(board.select_at(Vec2::new(100.0, 70.0), size(), &mut cpu).unwrap(), Some(id));
        board.get_mut(id).unwrap().scale = Vec2::new(1.0, 0.5);
        assert_eq!(board.select_at(Vec2::new(100.0, 70.0), size(), &mut cpu).unwrap(), None);
    }

    // ── drag ──────────────────────────────────────────────────────────────

    #[test]
    fn drag_moves_selection_with_inverted_y() {
        let (mut board, ids) = board_with(2);
        board.select(Some(ids[1]));
        assert!(board.drag_selected(7.0, 3.0));
        assert_eq!(board.get(ids[1]).unwrap().translation, Vec2::new(17.0, -3.0));
        assert_eq!(board.get(ids[0]).unwrap().translation, Vec2::zero());
    }

    #[test]
    fn drag_without_selection_is_noop() {
        let (mut board, ids) = board_with(2);
        assert!(!board.drag_selected(7.0, 3.0));
        assert_eq!(board.get(ids[0]).unwrap().translation, Vec2::zero());
        assert_eq!(board.get(ids[1]).unwrap().translation, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn pointer_gesture_drags_by_deltas() {
        let (mut board, ids) = board_with(1);
        let mut cpu = CpuRasterizer::new();
        assert_eq!(board.pointer_pressed(Vec2::new(100.0, 100.0), size(), &mut cpu).unwrap(), Some(ids[0]));
        assert!(board.pointer_dragged(Vec2::new(104.0, 101.0)));
        assert!(board.pointer_dragged(Vec2::new(110.0, 95.0)));
        assert_eq!(board.get(ids[0]).unwrap().translation, Vec2::new(10.0, 5.0));

        board.pointer_released();
        assert!(!board.pointer_dragged(Vec2::new(150.0, 150.0)));
        assert_eq!(board.get(ids[0]).unwrap().translation, Vec2::new(10.0, 5.0));
    }

    #[test]
    fn pointer_pan_moves_camera_not_items() {
        let (mut board, ids) = board_with(1);
        let mut cpu = CpuRasterizer::new();
        board.pointer_pressed(Vec2::new(100.0, 100.0), size(), &mut cpu).unwrap();
        board.pointer_panned(Vec2::new(120.0, 90.0));
        assert_eq!(board.camera().center, Vec2::new(-20.0, -10.0));
        assert_eq!(board.get(ids[0]).unwrap().translation, Vec2::zero());
        // The item followed the pointer on screen.
        assert_eq!(board.select_at(Vec2::new(138.0, 90.0), size(), &mut cpu).unwrap(), Some(ids[0]));
    }

    // ── reorder ───────────────────────────────────────────────────────────

    #[test]
    fn reorder_at_boundaries_is_rejected() {
        let (mut board, ids) = board_with(3);
        board.select(Some(ids[2]));
        assert_eq!(board.reorder_selected(Reorder::Up), Err(ReorderError::AtTop));
        board.select(Some(ids[0]));
        assert_eq!(board.reorder_selected(Reorder::Down), Err(ReorderError::AtBottom));
        assert_eq!(board.order(), ids.as_slice());
    }

    #[test]
    fn reorder_without_selection_is_rejected() {
        let (mut board, ids) = board_with(2);
        assert_eq!(board.reorder_selected(Reorder::Up), Err(ReorderError::NoSelection));
        assert_eq!(board.order(), ids.as_slice());
    }

    #[test]
    fn reorder_swaps_one_neighbor() {
        let (mut board, ids) = board_with(4);
        board.select(Some(ids[1]));
        assert_eq!(board.reorder_selected(Reorder::Up), Ok(2));
        assert_eq!(board.order(), &[ids[0], ids[2], ids[1], ids[3]]);
        assert_eq!(board.reorder_selected(Reorder::Down), Ok(1));
        assert_eq!(board.order(), ids.as_slice());
    }

    #[test]
    fn repeated_raises_move_bottom_to_top() {
        let n = 6;
        let (mut board, ids) = board_with(n);
        board.select(Some(ids[0]));
        for _ in 0..n - 1 {
            board.reorder_selected(Reorder::Up).unwrap();
        }
        assert_eq!(board.order().last(), Some(&ids[0]));
        assert_eq!(&board.order()[..n - 1], &ids[1..]);
        assert_eq!(board.reorder_selected(Reorder::Up), Err(ReorderError::AtTop));
    }

    #[test]
    fn abc_walkthrough() {
        let (mut board, ids) = board_with(3);
        let [a, b, c] = [ids[0], ids[1], ids[2]];

        assert_eq!(board.select_by_pixel(2), Some(b));
        assert_eq!(board.reorder_selected(Reorder::Down), Ok(0));
        assert_eq!(board.order(), &[b, a, c]);
        assert_eq!(board.reorder_selected(Reorder::Down), Err(ReorderError::AtBottom));
        assert_eq!(board.order(), &[b, a, c]);
        assert_eq!(board.selected(), Some(b));
    }

    // ── removal ───────────────────────────────────────────────────────────

    #[test]
    fn removing_selected_item_clears_selection() {
        let (mut board, ids) = board_with(3);
        board.select(Some(ids[1]));
        assert!(board.remove_selected().is_some());
        assert_eq!(board.selected(), None);
        assert_eq!(board.order(), &[ids[0], ids[2]]);
        assert!(board.get(ids[1]).is_none());
        assert!(!board.drag_selected(1.0, 1.0));
        assert_eq!(board.reorder_selected(Reorder::Up), Err(ReorderError::NoSelection));
    }

    #[test]
    fn removing_other_item_keeps_selection() {
        let (mut board, ids) = board_with(3);
        board.select(Some(ids[2]));
        board.remove(ids[0]);
        assert_eq!(board.selected(), Some(ids[2]));
        assert_eq!(board.select_by_pixel(2), Some(ids[2]));
        assert!(board.remove(ids[0]).is_none());
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let (mut board, ids) = board_with(1);
        board.remove(ids[0]);
        let next = board.add_image(solid(1, 1, [0, 0, 0, 255]), Vec2::zero()).unwrap();
        assert_ne!(next, ids[0]);
    }

    #[test]
    fn clear_releases_everything() {
        let (mut board, ids) = board_with(4);
        board.select(Some(ids[3]));
        assert_eq!(board.clear(), 4);
        assert!(board.is_empty());
        assert_eq!(board.selected(), None);
    }

    // ── screenshot ────────────────────────────────────────────────────────

    #[test]
    fn screenshot_writes_one_file_at_target_size() {
        let path = temp_path("capture.png");
        let config = BoardConfig { screenshot_path: path.clone(), ..BoardConfig::default() };
        let mut board = Board::new(config);
        board.add_image(solid(10, 10, [255, 0, 0, 255]), Vec2::zero()).unwrap();
        let mut cpu = CpuRasterizer::new();

        let written = board.capture_screenshot(TargetSize::new(64, 48, 1.0), &mut cpu).unwrap();
        assert_eq!(written, path);
        let shot = image::open(&path).unwrap().into_rgba8();
        assert_eq!(shot.dimensions(), (64, 48));
        assert_eq!(shot.get_pixel(32, 24).0, [255, 0, 0, 255]);
        assert_eq!(shot.get_pixel(0, 0).0, [0, 0, 0, 255]);

        // Second capture overwrites in place.
        board.capture_screenshot(TargetSize::new(30, 20, 1.0), &mut cpu).unwrap();
        assert_eq!(image::open(&path).unwrap().into_rgba8().dimensions(), (30, 20));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn screenshot_shows_highlight_around_selection() {
        let path = temp_path("capture-highlight.png");
        let config = BoardConfig { screenshot_path: path.clone(), ..BoardConfig::default() };
        let mut board = Board::new(config);
        let id = board.add_image(solid(20, 20, [0, 0, 255, 255]), Vec2::zero()).unwrap();
        board.select(Some(id));
        let mut cpu = CpuRasterizer::new();

        // Image spans screen 40..60; the 5 px outline straddles its edges.
        board.capture_screenshot(TargetSize::new(100, 100, 1.0), &mut cpu).unwrap();
        let shot = image::open(&path).unwrap().into_rgba8();
        std::fs::remove_file(&path).ok();
        assert_eq!(shot.get_pixel(38, 50).0, [255, 255, 0, 255]);
        assert_eq!(shot.get_pixel(41, 50).0, [0, 0, 255, 255]);
        assert_eq!(shot.get_pixel(30, 50).0, [0, 0, 0, 255]);
    }

    #[test]
    fn screenshot_to_unwritable_path_is_error() {
        let config = BoardConfig {
            screenshot_path: temp_path("no-such-dir").join("capture.png"),
            ..BoardConfig::default()
        };
        let board = Board::new(config);
        let mut cpu = CpuRasterizer::new();
        assert!(board.capture_screenshot(TargetSize::new(4, 4, 1.0), &mut cpu).is_err());
    }
}
