//! Application builder and the engine-facing app that drives a [`Board`].
//!
//! ```no_run
//! use pinboard_board::Application;
//!
//! Application::new()
//!     .title("Pinboard")
//!     .size(1280.0, 800.0)
//!     .run()
//!     .expect("pinboard failed");
//! ```

use pinboard_engine::core::{App as EngineApp, AppControl, FrameCtx};
use pinboard_engine::device::GpuInit;
use pinboard_engine::input::{DropInfo, InputEvent, KeyState, MouseButton, MouseButtonState};
use pinboard_engine::render::{OffscreenRenderer, SceneRenderer, TargetSize};
use pinboard_engine::scene::DrawList;
use pinboard_engine::window::{CursorIcon, Runtime, RuntimeConfig};
use winit::dpi::LogicalSize;

use crate::board::{Board, Reorder};
use crate::config::{Action, BoardConfig};

// ── Application ───────────────────────────────────────────────────────────

/// Entry point for a pinboard window.
pub struct Application {
    title: String,
    width: f64,
    height: f64,
    config: BoardConfig,
    gpu: GpuInit,
}

impl Application {
    pub fn new() -> Self {
        let defaults = RuntimeConfig::default();
        Self {
            title: defaults.title,
            width: defaults.initial_size.width,
            height: defaults.initial_size.height,
            config: BoardConfig::default(),
            gpu: GpuInit::default(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Initial window size in logical pixels.
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn config(mut self, config: BoardConfig) -> Self {
        self.config = config;
        self
    }

    pub fn gpu(mut self, gpu: GpuInit) -> Self {
        self.gpu = gpu;
        self
    }

    /// Opens the window and runs until it closes.
    pub fn run(self) -> anyhow::Result<()> {
        let config = RuntimeConfig {
            title: self.title,
            initial_size: LogicalSize::new(self.width, self.height),
        };
        Runtime::run(config, self.gpu, BoardApp::new(self.config))
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

// ── BoardApp ──────────────────────────────────────────────────────────────

/// Pointer interaction in progress.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Gesture {
    Idle,
    DragItem,
    Pan,
}

struct BoardApp {
    board: Board,

    scene: SceneRenderer,
    offscreen: OffscreenRenderer,
    visible: DrawList,

    /// Navigation key held.
    navigating: bool,
    gesture: Gesture,
    cursor: CursorIcon,
}

impl BoardApp {
    fn new(config: BoardConfig) -> Self {
        Self {
            board: Board::new(config),
            scene: SceneRenderer::new(),
            offscreen: OffscreenRenderer::new(),
            visible: DrawList::new(),
            navigating: false,
            gesture: Gesture::Idle,
            cursor: CursorIcon::Default,
        }
    }

    fn handle_event(&mut self, ctx: &FrameCtx<'_, '_>, event: &InputEvent, size: TargetSize) {
        match event {
            InputEvent::PointerButton(ev) if ev.button == MouseButton::Left => match ev.state {
                MouseButtonState::Pressed => {
                    let mut offscreen = ctx.offscreen(&mut self.offscreen);
                    match self.board.pointer_pressed(ev.pos, size, &mut offscreen) {
                        Ok(Some(id)) => log::debug!("selected item {id}"),
                        Ok(None) => {}
                        Err(e) => log::error!("selection failed: {e:#}"),
                    }
                    self.gesture = if self.navigating { Gesture::Pan } else { Gesture::DragItem };
                }
                MouseButtonState::Released => self.end_gesture(),
            },

            InputEvent::PointerMoved(pos) => match self.gesture {
                Gesture::DragItem => {
                    self.board.pointer_dragged(*pos);
                }
                Gesture::Pan => self.board.pointer_panned(*pos),
                Gesture::Idle => {}
            },

            InputEvent::Key { key, state: KeyState::Pressed, repeat, .. } => {
                if *key == self.board.config().keymap.navigate {
                    self.navigating = true;
                    return;
                }
                match self.board.config().keymap.action(*key) {
                    Some(Action::Screenshot) if !repeat => self.screenshot(ctx, size),
                    Some(Action::Raise) => self.reorder(Reorder::Up),
                    Some(Action::Lower) => self.reorder(Reorder::Down),
                    Some(Action::Remove) if !repeat => {
                        if let Some(item) = self.board.remove_selected() {
                            log::info!("removed {}x{} image", item.image().width(), item.image().height());
                        }
                    }
                    _ => {}
                }
            }

            InputEvent::Key { key, state: KeyState::Released, .. } => {
                if *key == self.board.config().keymap.navigate {
                    self.navigating = false;
                    if self.gesture == Gesture::Pan {
                        self.end_gesture();
                    }
                }
            }

            InputEvent::Focused(false) => {
                self.navigating = false;
                self.end_gesture();
            }

            _ => {}
        }
    }

    fn end_gesture(&mut self) {
        self.gesture = Gesture::Idle;
        self.board.pointer_released();
    }

    fn handle_drop(&mut self, drop: &DropInfo, size: TargetSize) {
        match self.board.add_from_drop(drop, size.viewport()) {
            Ok(id) => log::info!("added item {id} ({} on board)", self.board.len()),
            Err(e) => log::warn!("{e}"),
        }
    }

    fn reorder(&mut self, direction: Reorder) {
        match self.board.reorder_selected(direction) {
            Ok(pos) => log::debug!("selection moved to position {pos}"),
            Err(e) => log::warn!("invalid option: {e}"),
        }
    }

    fn screenshot(&mut self, ctx: &FrameCtx<'_, '_>, size: TargetSize) {
        let mut offscreen = ctx.offscreen(&mut self.offscreen);
        match self.board.capture_screenshot(size, &mut offscreen) {
            Ok(path) => log::info!("saved screenshot to {}", path.display()),
            Err(e) => log::error!("screenshot failed: {e:#}"),
        }
    }

    fn update_cursor(&mut self, ctx: &FrameCtx<'_, '_>) {
        let cursor = match self.gesture {
            Gesture::Pan => CursorIcon::Grabbing,
            Gesture::DragItem if self.board.selected().is_some() => CursorIcon::Grabbing,
            _ if self.navigating => CursorIcon::Grab,
            _ => CursorIcon::Default,
        };
        if cursor != self.cursor {
            ctx.window.set_cursor(cursor);
            self.cursor = cursor;
        }
    }
}

impl EngineApp for BoardApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let size = ctx.target_size();
        let frame = ctx.input_frame;

        // Every pick pass completes before the visible frame is encoded.
        let mut dropped = false;
        for event in &frame.events {
            if let InputEvent::FileDropped(_) = event {
                if !dropped {
                    dropped = true;
                    if let Some(drop) = &frame.drop {
                        self.handle_drop(drop, size);
                    }
                }
                continue;
            }
            self.handle_event(ctx, event, size);
        }
        self.update_cursor(ctx);

        self.board.build_visible(&mut self.visible, size.viewport());
        let scene = &mut self.scene;
        let list = &self.visible;
        ctx.render(self.board.config().background, |rctx, target| {
            scene.render(rctx, target, list);
        })
    }

    fn on_exit(&mut self) {
        let released = self.board.clear();
        log::info!("released {released} item(s)");
    }
}
