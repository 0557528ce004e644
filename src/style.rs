use crate::{color::Rgba32, font::FontHandle};

/// How a block's glyphs are filled or stroked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PaintStyle {
    /// Skip this paint step entirely.
    None,
    /// Paint with the canvas's ambient style.
    #[default]
    Context,
    /// Paint with a fixed color.
    Color(Rgba32),
}

/// The attribute state a block of text is rendered with.
///
/// Attributes are captured by value into each block when it is created, so a
/// later state change never retroactively alters text that was already
/// appended. The equality of snapshots is what decides whether consecutive
/// text can keep extending the same block.
#[derive(Clone, Debug, PartialEq)]
pub struct Attributes {
    pub font: FontHandle,
    pub fill: PaintStyle,
    pub stroke: PaintStyle,
}

impl Attributes {
    /// The initial state for a box: ambient fill, no stroke.
    pub fn new(font: FontHandle) -> Self {
        Self {
            font,
            fill: PaintStyle::Context,
            stroke: PaintStyle::None,
        }
    }
}
