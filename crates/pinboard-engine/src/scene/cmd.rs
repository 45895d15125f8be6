use crate::assets::Image;
use crate::coords::{Rect, Transform2};
use crate::paint::Color;

/// Solid quad: `rect` in command-local space, mapped to screen by `transform`.
#[derive(Debug, Clone, PartialEq)]
pub struct FillCmd {
    pub transform: Transform2,
    pub rect: Rect,
    pub color: Color,
}

/// Textured quad. Texel row 0 maps to `rect.min().y`.
#[derive(Debug, Clone)]
pub struct ImageCmd {
    pub transform: Transform2,
    pub rect: Rect,
    pub image: Image,
}

/// Renderer-agnostic draw command stream.
///
/// Extending the scene:
/// - add a payload struct and a variant here
/// - add a recording helper on `DrawList`
/// - teach `render::SceneRenderer` and `render::cpu` to draw it
#[derive(Debug, Clone)]
pub enum DrawCmd {
    Fill(FillCmd),
    Image(ImageCmd),
}

impl DrawCmd {
    #[inline]
    pub fn transform(&self) -> Transform2 {
        match self {
            DrawCmd::Fill(c) => c.transform,
            DrawCmd::Image(c) => c.transform,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        match self {
            DrawCmd::Fill(c) => c.rect,
            DrawCmd::Image(c) => c.rect,
        }
    }
}
