//! Word shells: text rendered as a lattice of particle spawn points.
//!
//! Rasterizing glyphs needs a font stack the core does not carry, so the
//! simulation asks the host for a dot lattice through a narrow trait and
//! scatters word particles over the returned points.

use glam::Vec2;

/// Phrases occasionally overlaid on a burst when word shells are enabled.
pub const WORDS: [&str; 5] = ["謹賀新年", "花火大会", "心願成就", "大願成就", "美しい"];

/// Dot positions sampled from rendered text, relative to the lattice center.
#[derive(Debug, Clone)]
pub struct DotLattice {
    /// Width of the rendered text in stage units.
    pub width: f32,
    /// Height of the rendered text in stage units.
    pub height: f32,
    /// Sampled dot positions, centered on the origin.
    pub points: Vec<Vec2>,
}

/// Host-side text rasterization.
pub trait GlyphRasterizer {
    /// Renders `text` at `font_px` and samples it into dots.
    ///
    /// Returns `None` when the host cannot rasterize (headless hosts, or a
    /// font without the needed glyphs); the burst then simply skips its
    /// word overlay.
    fn rasterize(&self, text: &str, font_px: f32) -> Option<DotLattice>;
}

/// Rasterizer that never produces dots; used headless and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRasterizer;

impl GlyphRasterizer for NullRasterizer {
    fn rasterize(&self, _text: &str, _font_px: f32) -> Option<DotLattice> {
        None
    }
}
