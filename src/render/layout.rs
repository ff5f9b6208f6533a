//! Vertical stacking of text lines on a fixed-size canvas.

/// Tight pixel bounds of a rendered line, relative to its baseline.
/// `min_y` is negative for glyphs extending above the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBounds {
    pub min_y: i32,
    pub max_y: i32,
}

impl LineBounds {
    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }
}

/// Font metrics queryable by string.
pub trait LineMetrics {
    fn line_bounds(&self, line: &str) -> LineBounds;
}

/// Baseline anchor of one laid-out line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
}

/// Computes baseline anchors for `lines`, stacked top to bottom from y=0.
/// Each line starts where the previous ones ended, with a one pixel gap
/// after the first line. Lines are left-aligned and never wrapped; anything
/// that does not fit is clipped by the canvas when drawn.
pub fn layout_lines(metrics: &impl LineMetrics, lines: &[impl AsRef<str>]) -> Vec<Anchor> {
    let mut anchors = Vec::with_capacity(lines.len());
    let mut top = 0;
    for (n, line) in lines.iter().enumerate() {
        let bounds = metrics.line_bounds(line.as_ref());
        let mut y = top - bounds.min_y;
        if n > 0 {
            y += 1;
        }
        anchors.push(Anchor { x: 0, y });
        top += bounds.height();
    }
    anchors
}
