use euclid::default::{Box2D, Point2D};

use crate::{
    canvas::Canvas,
    color::Rgba32,
    font::{FontHandle, LineMetrics, ShapedRun},
    font_registry::FontRegistry,
    markup::{self, Command},
    style::{Attributes, PaintStyle},
};

/// Horizontal justification of a line inside the text area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Horizontal anchor points (origin of x coordinates).
///
/// The bounding box is the text area extended by the border insets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XPoint {
    /// Left edge of the text area.
    Left,
    /// Center of the text area.
    Center,
    /// Right edge of the text area.
    Right,
    /// Left edge of the bounding box.
    BoxLeft,
    /// Center of the bounding box.
    BoxCenter,
    /// Right edge of the bounding box.
    BoxRight,
}

/// Vertical anchor points (origin of y coordinates).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum YPoint {
    /// Top of the text area.
    Top,
    /// Center of the text area.
    Center,
    /// Bottom of the text area.
    Bottom,
    /// Top of the bounding box.
    BoxTop,
    /// Center of the bounding box.
    BoxCenter,
    /// Bottom of the bounding box.
    BoxBottom,
    /// Baseline of the first line of text.
    TopBaseline,
    /// Baseline of the last line of text.
    BottomBaseline,
}

/// A maximal run of text sharing one attribute snapshot.
///
/// Blocks are owned by their line and are never shared. The positional
/// fields are only meaningful once the box has been laid out.
pub struct Block {
    text: String,
    attributes: Attributes,
    x: f32,
    run: Option<ShapedRun>,
    advance: f32,
}

impl Block {
    fn new(attributes: Attributes) -> Self {
        Self {
            text: String::new(),
            attributes,
            x: 0.0,
            run: None,
            advance: 0.0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Horizontal offset within the line.
    pub fn x(&self) -> f32 {
        self.x
    }

    /// The shaped glyphs, available once the box has been laid out.
    pub fn run(&self) -> Option<&ShapedRun> {
        self.run.as_ref()
    }

    /// Pen advance of the block's shaped text.
    pub fn advance(&self) -> f32 {
        self.advance
    }
}

/// One row of input, holding ordered blocks.
pub struct Line {
    align: Align,
    /// Soft break: the next line stacks onto this line's baseline instead of
    /// starting a new row.
    cr: bool,
    blocks: Vec<Block>,
    /// The attribute font when this line was opened. An empty line still
    /// reserves this font's height.
    font: FontHandle,
    x: f32,
    y: f32,
    width: f32,
    metrics: LineMetrics,
}

impl Line {
    fn new(align: Align, font: FontHandle) -> Self {
        Self {
            align,
            cr: false,
            blocks: Vec::new(),
            font,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            metrics: LineMetrics::default(),
        }
    }

    pub fn align(&self) -> Align {
        self.align
    }

    pub fn cr(&self) -> bool {
        self.cr
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Horizontal offset of the line inside the text area.
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Baseline position, measured down from the top of the text area.
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Sum of the advances of all blocks in the line.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Combined vertical metrics of all blocks in the line.
    pub fn metrics(&self) -> LineMetrics {
        self.metrics
    }
}

/// A box of styled text that measures and positions itself.
///
/// Text is appended as UTF-8 and may carry inline markup (see the crate
/// docs) that switches font, fill, stroke or alignment mid-stream. Once any
/// layout result is queried the box finalizes itself; appending afterwards
/// without [`TextBox::clear`] is a programming error and panics.
pub struct TextBox {
    lines: Vec<Line>,
    align: Align,
    current: Attributes,
    default_font: FontHandle,
    escape: Option<char>,

    xgrav: XPoint,
    ygrav: YPoint,
    border_top: f32,
    border_bottom: f32,
    border_left: f32,
    border_right: f32,
    box_fill: Rgba32,
    stroke_width: f32,

    finalized: bool,
    text_width: f32,
    text_height: f32,
}

impl TextBox {
    /// Creates an empty box using `font` as the default font.
    ///
    /// The box starts with one empty line, left alignment, top-left gravity
    /// and `'^'` as the escape character.
    pub fn new(font: FontHandle) -> Self {
        Self {
            lines: vec![Line::new(Align::Left, font.clone())],
            align: Align::Left,
            current: Attributes::new(font.clone()),
            default_font: font,
            escape: Some('^'),
            xgrav: XPoint::Left,
            ygrav: YPoint::Top,
            border_top: 0.0,
            border_bottom: 0.0,
            border_left: 0.0,
            border_right: 0.0,
            box_fill: Rgba32::TRANSPARENT,
            stroke_width: 1.0,
            finalized: false,
            text_width: 0.0,
            text_height: 0.0,
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn escape(&self) -> Option<char> {
        self.escape
    }

    fn assert_not_finalized(&self) {
        assert!(!self.finalized, "text box is already finalized");
    }
}

/// Appending text.
impl TextBox {
    /// Appends text, interpreting line breaks and markup.
    ///
    /// `'\n'` starts a new line. `'\r'` also starts a new line but marks the
    /// line just closed as soft-broken: text on either side shares one
    /// baseline instead of stacking into a new row. The escape character
    /// hands the remaining input to the markup interpreter; an invalid
    /// sequence degrades the escape character itself to literal text and
    /// scanning continues, so malformed markup never aborts.
    ///
    /// The registry resolves `F[name]` font switches; it must outlive the
    /// box.
    ///
    /// # Panics
    ///
    /// Panics when the box is already finalized.
    pub fn append(&mut self, text: &str, fonts: &FontRegistry) -> &mut Self {
        self.assert_not_finalized();

        let mut start = 0;
        let mut pos = 0;
        while let Some(c) = text[pos..].chars().next() {
            if c == '\n' || c == '\r' {
                self.flush_raw(&text[start..pos]);
                if c == '\r' {
                    self.last_line_mut().cr = true;
                }
                self.push_line();
                pos += 1;
                start = pos;
            } else if self.escape == Some(c) {
                self.flush_raw(&text[start..pos]);
                start = pos;
                if let Some((command, consumed)) = markup::parse(&text[pos..], c) {
                    pos += consumed;
                    start = pos;
                    self.apply(command, fonts);
                } else {
                    // Invalid sequence: keep the escape character as a
                    // regular character and retry from the next one.
                    pos += c.len_utf8();
                }
            } else {
                pos += c.len_utf8();
            }
        }
        self.flush_raw(&text[start..]);
        self
    }

    /// Removes all text, restarting with one empty line.
    ///
    /// Alignment returns to [`Align::Left`] and the box becomes mutable
    /// again. The current attribute state is kept.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.align = Align::Left;
        self.lines
            .push(Line::new(self.align, self.current.font.clone()));
        self.finalized = false;
    }

    fn last_line_mut(&mut self) -> &mut Line {
        self.lines.last_mut().expect("text box always has a line")
    }

    fn push_line(&mut self) {
        self.lines
            .push(Line::new(self.align, self.current.font.clone()));
    }

    fn flush_raw(&mut self, text: &str) {
        if !text.is_empty() {
            self.current_block().text.push_str(text);
        }
    }

    /// Returns the block to append literal text to.
    ///
    /// A new block is opened when the line is empty or the last block was
    /// captured with different attributes; otherwise the last block keeps
    /// growing. Blocks therefore stay maximal same-attribute runs without
    /// ever re-splitting text that was already appended.
    fn current_block(&mut self) -> &mut Block {
        let current = &self.current;
        let line = self.lines.last_mut().expect("text box always has a line");
        let needs_new = match line.blocks.last() {
            Some(last) => last.attributes != *current,
            None => true,
        };
        if needs_new {
            line.blocks.push(Block::new(current.clone()));
        }
        line.blocks.last_mut().expect("a block was just ensured")
    }

    fn apply(&mut self, command: Command, fonts: &FontRegistry) {
        match command {
            Command::Literal(c) => self.current_block().text.push(c),
            Command::SetEscape(c) => self.escape = Some(c),
            Command::ResetFull => {
                self.current.font = self.default_font.clone();
                self.current.stroke = PaintStyle::None;
                self.current.fill = PaintStyle::Context;
            }
            Command::ResetStyle => {
                self.current.stroke = PaintStyle::None;
                self.current.fill = PaintStyle::Context;
            }
            Command::StrokeNone => self.current.stroke = PaintStyle::None,
            Command::StrokeContext => self.current.stroke = PaintStyle::Context,
            Command::StrokeColor(color) => self.current.stroke = PaintStyle::Color(color),
            Command::FillNone => self.current.fill = PaintStyle::None,
            Command::FillContext => self.current.fill = PaintStyle::Context,
            Command::FillColor(color) => self.current.fill = PaintStyle::Color(color),
            Command::Align(align) => self.set_align(align),
            Command::Font(name) => self.current.font = fonts.lookup(&name),
        }
    }
}

/// Attribute and configuration setters.
impl TextBox {
    /// Switches the current font; takes effect from the next appended text.
    pub fn set_font(&mut self, font: FontHandle) {
        self.current.font = font;
    }

    pub fn set_fill(&mut self, fill: PaintStyle) {
        self.current.fill = fill;
    }

    pub fn set_stroke(&mut self, stroke: PaintStyle) {
        self.current.stroke = stroke;
    }

    /// Changes the alignment of the current line and of lines appended after
    /// it.
    pub fn set_align(&mut self, align: Align) {
        self.assert_not_finalized();
        if align != self.align {
            self.last_line_mut().align = align;
            self.align = align;
        }
    }

    /// Rebinds the markup escape character; `None` disables markup entirely.
    pub fn set_escape(&mut self, escape: Option<char>) {
        self.escape = escape;
    }

    /// Sets all four border insets to the same value.
    pub fn set_border(&mut self, border: f32) {
        self.set_borders(border, border, border, border);
    }

    /// Sets the border insets individually.
    pub fn set_borders(&mut self, left: f32, top: f32, right: f32, bottom: f32) {
        self.border_left = left;
        self.border_top = top;
        self.border_right = right;
        self.border_bottom = bottom;
    }

    /// Sets the gravity: the anchor point used as the coordinate origin when
    /// the box is placed at a target position.
    pub fn set_gravity(&mut self, x: XPoint, y: YPoint) {
        self.xgrav = x;
        self.ygrav = y;
    }

    /// Sets the color [`TextBox::draw_box`] fills the bounding box with.
    /// A zero alpha (the default) disables the box fill.
    pub fn set_box_fill(&mut self, color: Rgba32) {
        self.box_fill = color;
    }

    /// Sets the width passed to the canvas when stroking glyph runs.
    pub fn set_stroke_width(&mut self, width: f32) {
        self.stroke_width = width;
    }
}

/// Layout.
impl TextBox {
    /// Computes the position and metrics of every line and block.
    ///
    /// Runs at most once; every layout query calls this implicitly. After
    /// finalizing, the box is immutable until [`TextBox::clear`].
    ///
    /// The first pass shapes each block and combines the font metrics of all
    /// blocks in a line. The second pass walks the lines and merges runs of
    /// soft-broken lines onto a shared baseline, so that e.g. decorative
    /// text stacked around a title contributes its own ascent and descent to
    /// the row without starting a new one. The gap carried between rows is
    /// the one of the row above.
    pub fn finalize(&mut self) -> &mut Self {
        if self.finalized {
            return self;
        }

        self.text_width = 0.0;
        let mut y = 0.0_f32;
        let mut gap = 0.0_f32;
        let mut group = LineMetrics::default();
        let mut group_start = 0_usize;
        let line_count = self.lines.len();

        for k in 0..line_count {
            let line = &mut self.lines[k];
            line.x = 0.0;
            line.metrics = LineMetrics::default();

            let mut x = 0.0_f32;
            for block in &mut line.blocks {
                let run = block.attributes.font.shape(&block.text);
                block.x = x;
                block.advance = run.advance;
                x += run.advance;
                block.run = Some(run);
                line.metrics.combine(block.attributes.font.line_metrics());
            }
            if line.blocks.is_empty() {
                // An empty line still reserves the height of the font that
                // was current when it was opened.
                line.metrics.combine(line.font.line_metrics());
            }
            line.width = x;

            let cr = line.cr;
            let line_metrics = line.metrics;

            self.text_width = self.text_width.max(x);
            group.combine(line_metrics);

            if !cr || k == line_count - 1 {
                // End of a baseline group: place every member on the row's
                // baseline, then advance by the combined descent.
                y += gap + group.ascent;
                for grouped in &mut self.lines[group_start..=k] {
                    grouped.y = y;
                }
                y += group.descent;
                gap = group.line_gap;
                group = LineMetrics::default();
                group_start = k + 1;
            }
        }
        self.text_height = y;

        for line in &mut self.lines {
            match line.align {
                Align::Right => line.x = self.text_width - line.width,
                Align::Center => line.x = (self.text_width - line.width) / 2.0,
                // Left keeps the computed offset at zero.
                Align::Left => {}
            }
        }

        self.finalized = true;
        self
    }

    /// Width of the text area, excluding borders.
    pub fn width(&mut self) -> f32 {
        self.finalize();
        self.text_width
    }

    /// Height of the text area, excluding borders.
    pub fn height(&mut self) -> f32 {
        self.finalize();
        self.text_height
    }
}

/// Anchor points and placement.
impl TextBox {
    /// Absolute coordinate of a horizontal anchor point.
    ///
    /// By convention [`XPoint::Left`] is at 0.
    pub fn abs_x(&mut self, point: XPoint) -> f32 {
        self.finalize();
        match point {
            XPoint::Left => 0.0,
            XPoint::Center => self.text_width / 2.0,
            XPoint::Right => self.text_width,
            XPoint::BoxLeft => -self.border_left,
            XPoint::BoxCenter => {
                -self.border_left + (self.border_left + self.text_width + self.border_right) / 2.0
            }
            XPoint::BoxRight => self.text_width + self.border_right,
        }
    }

    /// Absolute coordinate of a vertical anchor point.
    ///
    /// By convention [`YPoint::Top`] is at 0.
    pub fn abs_y(&mut self, point: YPoint) -> f32 {
        self.finalize();
        match point {
            YPoint::Top => 0.0,
            YPoint::Center => self.text_height / 2.0,
            YPoint::Bottom => self.text_height,
            YPoint::BoxTop => -self.border_top,
            YPoint::BoxCenter => {
                -self.border_top + (self.border_top + self.text_height + self.border_bottom) / 2.0
            }
            YPoint::BoxBottom => self.text_height + self.border_bottom,
            YPoint::TopBaseline => self.lines.first().expect("text box always has a line").y,
            YPoint::BottomBaseline => self.lines.last().expect("text box always has a line").y,
        }
    }

    /// Coordinate of a horizontal anchor point relative to the configured
    /// gravity.
    pub fn offset_x(&mut self, point: XPoint) -> f32 {
        if point == self.xgrav {
            0.0
        } else {
            self.abs_x(point) - self.abs_x(self.xgrav)
        }
    }

    /// Coordinate of a vertical anchor point relative to the configured
    /// gravity.
    pub fn offset_y(&mut self, point: YPoint) -> f32 {
        if point == self.ygrav {
            0.0
        } else {
            self.abs_y(point) - self.abs_y(self.ygrav)
        }
    }

    /// The bounding box (text area plus borders) when the gravity anchor is
    /// placed at `(x, y)`.
    pub fn bounding_box_at(&mut self, x: f32, y: f32) -> Box2D<f32> {
        let x0 = self.offset_x(XPoint::BoxLeft);
        let x1 = self.offset_x(XPoint::BoxRight);
        let y0 = self.offset_y(YPoint::BoxTop);
        let y1 = self.offset_y(YPoint::BoxBottom);
        Box2D::new(Point2D::new(x + x0, y + y0), Point2D::new(x + x1, y + y1))
    }

    /// The text area when the gravity anchor is placed at `(x, y)`.
    pub fn content_box_at(&mut self, x: f32, y: f32) -> Box2D<f32> {
        let x0 = self.offset_x(XPoint::Left);
        let x1 = self.offset_x(XPoint::Right);
        let y0 = self.offset_y(YPoint::Top);
        let y1 = self.offset_y(YPoint::Bottom);
        Box2D::new(Point2D::new(x + x0, y + y0), Point2D::new(x + x1, y + y1))
    }
}

/// Rendering.
impl TextBox {
    /// Draws every block with its captured attributes, the top-left of the
    /// text area at `(x, y)`.
    ///
    /// Each block is filled first, then stroked; a paint step whose style is
    /// [`PaintStyle::None`] is skipped, and [`PaintStyle::Context`] leaves
    /// the color choice to the canvas.
    pub fn draw(&mut self, canvas: &mut dyn Canvas, x: f32, y: f32) {
        self.finalize();
        let stroke_width = self.stroke_width;
        for line in &self.lines {
            for block in &line.blocks {
                let Some(run) = &block.run else {
                    continue;
                };
                let pos = Point2D::new(x + line.x + block.x, y + line.y);
                let font = &block.attributes.font;

                match block.attributes.fill {
                    PaintStyle::None => {}
                    PaintStyle::Context => canvas.fill_glyph_run(pos, font, run, None),
                    PaintStyle::Color(color) => canvas.fill_glyph_run(pos, font, run, Some(color)),
                }
                match block.attributes.stroke {
                    PaintStyle::None => {}
                    PaintStyle::Context => {
                        canvas.stroke_glyph_run(pos, font, run, None, stroke_width)
                    }
                    PaintStyle::Color(color) => {
                        canvas.stroke_glyph_run(pos, font, run, Some(color), stroke_width)
                    }
                }
            }
        }
    }

    /// Fills the bounding box with the configured box color, if its alpha is
    /// non-zero. Call before [`TextBox::draw`] to paint a backdrop.
    pub fn draw_box(&mut self, canvas: &mut dyn Canvas, x: f32, y: f32) {
        if self.box_fill.a() == 0 {
            return;
        }
        let rect = self.bounding_box_at(x, y);
        canvas.fill_rect(rect, Some(self.box_fill));
    }
}
