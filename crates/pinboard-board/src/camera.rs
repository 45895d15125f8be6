use pinboard_engine::coords::{Transform2, Vec2, Viewport};

/// Orthographic board camera.
///
/// One world unit is one logical pixel. The world is y-up and `center` is the
/// world point shown at the middle of the viewport.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Camera2 {
    pub center: Vec2,
}

impl Camera2 {
    pub fn new(center: Vec2) -> Self {
        Self { center }
    }

    /// World → screen transform for `viewport`; usable as a draw list base.
    pub fn view(&self, viewport: Viewport) -> Transform2 {
        Transform2::translation(viewport.center())
            * Transform2::scaling(Vec2::new(1.0, -1.0))
            * Transform2::translation(-self.center)
    }

    pub fn world_to_screen(&self, world: Vec2, viewport: Viewport) -> Vec2 {
        self.view(viewport).apply(world)
    }

    pub fn screen_to_world(&self, screen: Vec2, viewport: Viewport) -> Vec2 {
        let center = viewport.center();
        Vec2::new(screen.x - center.x, center.y - screen.y) + self.center
    }

    /// Moves the camera so the world follows a pointer moved by `screen_delta`.
    pub fn pan(&mut self, screen_delta: Vec2) {
        self.center += Vec2::new(-screen_delta.x, screen_delta.y);
    }
}
