use std::path::Path;

use ab_glyph::{point, Font, FontVec, Glyph, GlyphId, PxScale, ScaleFont};
use anyhow::Context;

use crate::render::frame::Frame;
use crate::render::layout::{Anchor, LineBounds, LineMetrics};

/// Glyph coverage at or above this fraction turns the pixel on.
const COVERAGE_THRESHOLD: f32 = 0.5;

/// A font loaded at a fixed pixel scale.
pub struct Face {
    font: FontVec,
    scale: PxScale,
}

impl Face {
    pub fn load(path: &Path, px: f32) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading font {}", path.display()))?;
        let font = FontVec::try_from_vec(bytes)
            .with_context(|| format!("parsing font {}", path.display()))?;
        Ok(Face {
            font,
            scale: PxScale::from(px),
        })
    }

    /// Draws `line` with its baseline starting at `anchor`. Pixels falling
    /// outside the frame are clipped by the frame itself.
    pub fn draw_line(&self, frame: &mut Frame, line: &str, anchor: Anchor) {
        for glyph in self.glyphs(line, anchor.x as f32, anchor.y as f32) {
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|x, y, coverage| {
                    if coverage >= COVERAGE_THRESHOLD {
                        frame.set(bounds.min.x as i32 + x as i32, bounds.min.y as i32 + y as i32);
                    }
                });
            }
        }
    }

    /// Positions the line's glyphs along a caret starting at the given
    /// baseline origin, applying kerning and horizontal advances.
    fn glyphs(&self, line: &str, origin_x: f32, origin_y: f32) -> Vec<Glyph> {
        let scaled = self.font.as_scaled(self.scale);
        let mut glyphs = Vec::with_capacity(line.len());
        let mut caret = origin_x;
        let mut last: Option<GlyphId> = None;
        for ch in line.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = last {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(self.scale, point(caret, origin_y)));
            caret += scaled.h_advance(id);
            last = Some(id);
        }
        glyphs
    }
}

impl LineMetrics for Face {
    fn line_bounds(&self, line: &str) -> LineBounds {
        let mut min_y = i32::MAX;
        let mut max_y = i32::MIN;
        for glyph in self.glyphs(line, 0.0, 0.0) {
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                min_y = min_y.min(bounds.min.y.round() as i32);
                max_y = max_y.max(bounds.max.y.round() as i32);
            }
        }
        if min_y > max_y {
            // Nothing outlined, e.g. an empty or all-whitespace line.
            return LineBounds { min_y: 0, max_y: 0 };
        }
        LineBounds { min_y, max_y }
    }
}
