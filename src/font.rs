use std::sync::Arc;

/// Vertical line metrics of a font at a given size.
///
/// All values are non-negative distances from the baseline; `descent` grows
/// downward. This differs from `fontdue`, whose descent is negative — the
/// sign is flipped at the [`FontdueFace`] boundary.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct LineMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
}

impl LineMetrics {
    /// Folds another set of metrics into `self`.
    ///
    /// Ascent and descent are maximized independently, while the gap is
    /// derived from the largest combined `descent + line_gap`. This keeps the
    /// vertical box as tight as possible while still accommodating the
    /// deepest descender-plus-gap among the folded fonts.
    pub fn combine(&mut self, other: LineMetrics) {
        self.ascent = self.ascent.max(other.ascent);
        let total_descent = (self.descent + self.line_gap).max(other.descent + other.line_gap);
        self.descent = self.descent.max(other.descent);
        self.line_gap = total_descent - self.descent;
    }
}

/// A single glyph positioned relative to `(0, baseline)` of its run.
///
/// **Y-axis goes down.** `x`/`y` locate the top-left corner of the glyph's
/// coverage mask, so renderers can stamp the mask without further metric
/// lookups.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapedGlyph {
    pub index: u16,
    pub x: f32,
    pub y: f32,
}

/// The result of shaping one run of text with a single font.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ShapedRun {
    pub glyphs: Vec<ShapedGlyph>,
    /// Pen advance of the whole run, including kerning.
    pub advance: f32,
}

/// 8-bit coverage mask of a single rasterized glyph, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct CoverageMask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

/// The font capability consumed by the layout engine and CPU canvases.
///
/// A face answers for its metrics, shapes runs of text left to right, and
/// rasterizes individual glyphs to coverage masks. Implementations must not
/// depend on any layout state; the same face may be shared by many boxes.
pub trait FontFace: Send + Sync {
    fn line_metrics(&self, size: f32) -> LineMetrics;

    fn shape(&self, text: &str, size: f32) -> ShapedRun;

    fn rasterize(&self, index: u16, size: f32) -> CoverageMask;
}

/// A borrowed reference to a face at a fixed pixel size.
///
/// Handles are cheap to clone and are captured by value into text
/// attributes. Two handles compare equal when they reference the same face
/// instance at the same size, which is what decides whether consecutive text
/// runs can share a block.
#[derive(Clone)]
pub struct FontHandle {
    face: Arc<dyn FontFace>,
    size: f32,
}

impl FontHandle {
    pub fn new(face: Arc<dyn FontFace>, size: f32) -> Self {
        Self { face, size }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn face(&self) -> &Arc<dyn FontFace> {
        &self.face
    }

    pub fn line_metrics(&self) -> LineMetrics {
        self.face.line_metrics(self.size)
    }

    pub fn shape(&self, text: &str) -> ShapedRun {
        self.face.shape(text, self.size)
    }

    pub fn rasterize(&self, index: u16) -> CoverageMask {
        self.face.rasterize(index, self.size)
    }
}

impl PartialEq for FontHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.face, &other.face) && self.size == other.size
    }
}

impl std::fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontHandle")
            .field("face", &Arc::as_ptr(&self.face).cast::<()>())
            .field("size", &self.size)
            .finish()
    }
}

/// [`FontFace`] backed by a loaded `fontdue` font.
pub struct FontdueFace {
    font: Arc<fontdue::Font>,
}

impl FontdueFace {
    pub fn new(font: Arc<fontdue::Font>) -> Self {
        Self { font }
    }

    /// Convenience for wrapping a loaded font straight into a handle.
    pub fn handle(font: Arc<fontdue::Font>, size: f32) -> FontHandle {
        FontHandle::new(Arc::new(Self::new(font)), size)
    }

    pub fn font(&self) -> &Arc<fontdue::Font> {
        &self.font
    }
}

impl FontFace for FontdueFace {
    fn line_metrics(&self, size: f32) -> LineMetrics {
        match self.font.horizontal_line_metrics(size) {
            Some(m) => LineMetrics {
                ascent: m.ascent,
                descent: -m.descent,
                line_gap: m.line_gap,
            },
            None => LineMetrics::default(),
        }
    }

    fn shape(&self, text: &str, size: f32) -> ShapedRun {
        let mut glyphs = Vec::new();
        let mut origin = 0.0_f32;
        let mut last: Option<(u16, f32)> = None;

        for ch in text.chars() {
            let index = self.font.lookup_glyph_index(ch);
            let metrics = self.font.metrics_indexed(index, size);

            if let Some((prev_index, prev_advance)) = last {
                let kerning = self
                    .font
                    .horizontal_kern_indexed(prev_index, index, size)
                    .unwrap_or(0.0);
                origin += prev_advance + kerning;
            }

            glyphs.push(ShapedGlyph {
                index,
                x: origin + metrics.xmin as f32,
                y: -(metrics.ymin as f32 + metrics.height as f32),
            });
            last = Some((index, metrics.advance_width));
        }

        let advance = origin + last.map(|(_, advance)| advance).unwrap_or(0.0);
        ShapedRun { glyphs, advance }
    }

    fn rasterize(&self, index: u16, size: f32) -> CoverageMask {
        let (metrics, data) = self.font.rasterize_indexed(index, size);
        CoverageMask {
            width: metrics.width,
            height: metrics.height,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::FixedFace;

    #[test]
    fn combine_maximizes_total_descent() {
        let mut acc = LineMetrics {
            ascent: 10.0,
            descent: 2.0,
            line_gap: 6.0,
        };
        acc.combine(LineMetrics {
            ascent: 5.0,
            descent: 7.0,
            line_gap: 0.0,
        });
        // The deepest combined descent+gap (8.0) wins, and the gap is what is
        // left after the larger plain descent.
        assert_eq!(acc.ascent, 10.0);
        assert_eq!(acc.descent, 7.0);
        assert_eq!(acc.line_gap, 1.0);
    }

    #[test]
    fn combine_with_default_is_identity() {
        let m = LineMetrics {
            ascent: 3.0,
            descent: 1.0,
            line_gap: 0.5,
        };
        let mut acc = LineMetrics::default();
        acc.combine(m);
        assert_eq!(acc, m);
    }

    #[test]
    fn handle_equality_is_face_identity_and_size() {
        let face = std::sync::Arc::new(FixedFace::new(10.0, 2.0, 1.0, 5.0));
        let a = FontHandle::new(face.clone(), 12.0);
        let b = FontHandle::new(face.clone(), 12.0);
        let c = FontHandle::new(face, 14.0);
        let other = FixedFace::handle(10.0, 2.0, 1.0, 5.0);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, other);
    }
}
