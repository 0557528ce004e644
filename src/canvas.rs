use euclid::default::{Box2D, Point2D};

use crate::{
    color::Rgba32,
    font::{FontHandle, ShapedRun},
};

/// The paint capability a text box draws through.
///
/// `paint` carries the color captured in the block's attributes, or `None`
/// when the block asks for the canvas's ambient style. Positions are the pen
/// position of the run: x at its left edge, y on the baseline.
pub trait Canvas {
    fn fill_glyph_run(
        &mut self,
        pos: Point2D<f32>,
        font: &FontHandle,
        run: &ShapedRun,
        paint: Option<Rgba32>,
    );

    fn stroke_glyph_run(
        &mut self,
        pos: Point2D<f32>,
        font: &FontHandle,
        run: &ShapedRun,
        paint: Option<Rgba32>,
        width: f32,
    );

    fn fill_rect(&mut self, rect: Box2D<f32>, paint: Option<Rgba32>);
}

/// Unit directions used to approximate a stroke by stamping the coverage
/// mask around a ring.
const RING: [[f32; 2]; 8] = {
    const D: f32 = std::f32::consts::FRAC_1_SQRT_2;
    [
        [1.0, 0.0],
        [D, D],
        [0.0, 1.0],
        [-D, D],
        [-1.0, 0.0],
        [-D, -D],
        [0.0, -1.0],
        [D, -D],
    ]
};

/// A CPU canvas: an owned straight-alpha RGBA buffer composited with
/// source-over.
///
/// Glyph coverage is rasterized through the run's font face and blended with
/// the resolved color. Stroking is approximated by stamping the coverage
/// around a ring of the stroke width; a vector backend can implement
/// [`Canvas`] directly when true outline stroking is needed.
pub struct Pixmap {
    width: usize,
    height: usize,
    pixels: Vec<Rgba32>,
    fill_color: Rgba32,
    stroke_color: Rgba32,
}

impl Pixmap {
    /// Creates a fully transparent pixmap.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba32::TRANSPARENT; width * height],
            fill_color: Rgba32::new(0, 0, 0, 0xFF),
            stroke_color: Rgba32::new(0, 0, 0, 0xFF),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Sets the ambient fill color used when a block paints with the context
    /// style.
    pub fn set_fill_color(&mut self, color: Rgba32) {
        self.fill_color = color;
    }

    /// Sets the ambient stroke color used when a block strokes with the
    /// context style.
    pub fn set_stroke_color(&mut self, color: Rgba32) {
        self.stroke_color = color;
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgba32 {
        self.pixels[y * self.width + x]
    }

    pub fn pixels(&self) -> &[Rgba32] {
        &self.pixels
    }

    /// Flattens the buffer to RGBA8 bytes, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for px in &self.pixels {
            out.extend_from_slice(&[px.r(), px.g(), px.b(), px.a()]);
        }
        out
    }

    fn blend(&mut self, x: usize, y: usize, color: Rgba32, coverage: u8) {
        let alpha = (color.a() as u16 * coverage as u16 / 255) as u8;
        if alpha == 0 {
            return;
        }
        let src = color.with_alpha(alpha);
        let px = &mut self.pixels[y * self.width + x];
        *px = src.over(*px);
    }

    fn composite_run(&mut self, pos: Point2D<f32>, font: &FontHandle, run: &ShapedRun, color: Rgba32) {
        if color.a() == 0 {
            return;
        }
        for glyph in &run.glyphs {
            let mask = font.rasterize(glyph.index);
            if mask.width == 0 || mask.height == 0 {
                continue;
            }

            let origin_x = pos.x + glyph.x;
            let origin_y = pos.y + glyph.y;

            for row in 0..mask.height {
                let iy = (origin_y + row as f32).floor() as isize;
                if iy < 0 || iy as usize >= self.height {
                    continue;
                }

                for col in 0..mask.width {
                    let coverage = mask.data[row * mask.width + col];
                    if coverage == 0 {
                        continue;
                    }

                    let ix = (origin_x + col as f32).floor() as isize;
                    if ix < 0 || ix as usize >= self.width {
                        continue;
                    }

                    self.blend(ix as usize, iy as usize, color, coverage);
                }
            }
        }
    }
}

impl Canvas for Pixmap {
    fn fill_glyph_run(
        &mut self,
        pos: Point2D<f32>,
        font: &FontHandle,
        run: &ShapedRun,
        paint: Option<Rgba32>,
    ) {
        let color = paint.unwrap_or(self.fill_color);
        self.composite_run(pos, font, run, color);
    }

    fn stroke_glyph_run(
        &mut self,
        pos: Point2D<f32>,
        font: &FontHandle,
        run: &ShapedRun,
        paint: Option<Rgba32>,
        width: f32,
    ) {
        let color = paint.unwrap_or(self.stroke_color);
        for [dx, dy] in RING {
            let offset = Point2D::new(pos.x + dx * width, pos.y + dy * width);
            self.composite_run(offset, font, run, color);
        }
    }

    fn fill_rect(&mut self, rect: Box2D<f32>, paint: Option<Rgba32>) {
        let color = paint.unwrap_or(self.fill_color);
        if color.a() == 0 {
            return;
        }

        let x0 = rect.min.x.floor().max(0.0) as usize;
        let y0 = rect.min.y.floor().max(0.0) as usize;
        let x1 = (rect.max.x.ceil().max(0.0) as usize).min(self.width);
        let y1 = (rect.max.y.ceil().max(0.0) as usize).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color, 0xFF);
            }
        }
    }
}
