//! Frame sampling types and the renderer seam.
//!
//! Once per tick the simulation flattens its particle state into a
//! [`RenderFrame`]: plain stroke segments and discs grouped by color, plus
//! the trail-fade alpha the host should apply before drawing. The core
//! holds no drawing code.

use glam::Vec2;

/// One motion-trail stroke from a particle's previous to current position.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    /// Trail start (previous position).
    pub from: Vec2,
    /// Trail end (current position).
    pub to: Vec2,
    /// Stroke width.
    pub width: f32,
    /// Stroke color as RGB.
    pub color: (u8, u8, u8),
}

/// A translucent burst-flash disc.
#[derive(Debug, Clone, Copy)]
pub struct FlashCircle {
    /// Disc center.
    pub center: Vec2,
    /// Disc radius.
    pub radius: f32,
    /// Fill alpha.
    pub alpha: f32,
}

/// Everything the host needs to draw one frame.
#[derive(Debug, Clone, Default)]
pub struct RenderFrame {
    /// Alpha of the black fade pass that dissolves old trails.
    pub fade_alpha: f32,
    /// Ambient sky tint as RGB.
    pub sky: (u8, u8, u8),
    /// Star trail strokes.
    pub stars: Vec<Segment>,
    /// Spark trail strokes.
    pub sparks: Vec<Segment>,
    /// Burst flashes, already consumed from the simulation.
    pub flashes: Vec<FlashCircle>,
}

/// Host-side frame presentation.
pub trait Renderer {
    /// Presents one sampled frame.
    fn draw(&mut self, frame: &RenderFrame);
}

/// Renderer that draws nothing; used headless and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw(&mut self, _frame: &RenderFrame) {}
}
