//! Test doubles shared by the unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use euclid::default::{Box2D, Point2D};

use crate::{
    canvas::Canvas,
    color::Rgba32,
    font::{CoverageMask, FontFace, FontHandle, LineMetrics, ShapedGlyph, ShapedRun},
};

/// A face with constant metrics and a fixed per-character advance, so layout
/// results are exact and no font binaries are needed.
pub(crate) struct FixedFace {
    metrics: LineMetrics,
    advance: f32,
    /// Number of [`FontFace::shape`] calls, for asserting that layout runs
    /// only once.
    pub shape_calls: AtomicUsize,
}

impl FixedFace {
    pub fn new(ascent: f32, descent: f32, line_gap: f32, advance: f32) -> Self {
        Self {
            metrics: LineMetrics {
                ascent,
                descent,
                line_gap,
            },
            advance,
            shape_calls: AtomicUsize::new(0),
        }
    }

    pub fn handle(ascent: f32, descent: f32, line_gap: f32, advance: f32) -> FontHandle {
        FontHandle::new(Arc::new(Self::new(ascent, descent, line_gap, advance)), 1.0)
    }
}

impl FontFace for FixedFace {
    fn line_metrics(&self, _size: f32) -> LineMetrics {
        self.metrics
    }

    fn shape(&self, text: &str, _size: f32) -> ShapedRun {
        self.shape_calls.fetch_add(1, Ordering::SeqCst);
        let glyphs = text
            .chars()
            .enumerate()
            .map(|(i, ch)| ShapedGlyph {
                index: ch as u16,
                x: i as f32 * self.advance,
                y: -1.0,
            })
            .collect::<Vec<_>>();
        let advance = glyphs.len() as f32 * self.advance;
        ShapedRun { glyphs, advance }
    }

    fn rasterize(&self, _index: u16, _size: f32) -> CoverageMask {
        CoverageMask {
            width: 1,
            height: 1,
            data: vec![0xFF],
        }
    }
}

/// A paint operation observed by [`RecordingCanvas`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PaintCall {
    Fill {
        x: f32,
        y: f32,
        paint: Option<Rgba32>,
        glyphs: usize,
    },
    Stroke {
        x: f32,
        y: f32,
        paint: Option<Rgba32>,
        width: f32,
        glyphs: usize,
    },
    Rect {
        rect: Box2D<f32>,
        paint: Option<Rgba32>,
    },
}

/// A canvas that records the calls a box makes while drawing.
#[derive(Default)]
pub(crate) struct RecordingCanvas {
    pub calls: Vec<PaintCall>,
}

impl Canvas for RecordingCanvas {
    fn fill_glyph_run(
        &mut self,
        pos: Point2D<f32>,
        _font: &FontHandle,
        run: &ShapedRun,
        paint: Option<Rgba32>,
    ) {
        self.calls.push(PaintCall::Fill {
            x: pos.x,
            y: pos.y,
            paint,
            glyphs: run.glyphs.len(),
        });
    }

    fn stroke_glyph_run(
        &mut self,
        pos: Point2D<f32>,
        _font: &FontHandle,
        run: &ShapedRun,
        paint: Option<Rgba32>,
        width: f32,
    ) {
        self.calls.push(PaintCall::Stroke {
            x: pos.x,
            y: pos.y,
            paint,
            width,
            glyphs: run.glyphs.len(),
        });
    }

    fn fill_rect(&mut self, rect: Box2D<f32>, paint: Option<Rgba32>) {
        self.calls.push(PaintCall::Rect { rect, paint });
    }
}
