//! # Tanzaku
//!
//! A styled text box layout library for titles, captions and on-screen
//! labels.
//!
//! ## Overview
//!
//! A [`TextBox`] collects short runs of text that may switch font, fill,
//! stroke and alignment mid-stream through an inline markup language, lays
//! them out into measured lines, and composites them onto a [`Canvas`]. Fonts
//! are resolved by alias through a [`FontRegistry`] built on `fontdb` and
//! `fontdue`.
//!
//! ## Markup
//!
//! Markup is introduced by a configurable escape character (`^` by default);
//! doubling it produces the character itself. The commands:
//!
//! * `^F[name]` — switch to the font registered under `name`
//! * `^C[rgb]` / `^c[rgb]` — fill / stroke with a hex color (3, 4, 6 or 8
//!   digits as `rgb`, `argb`, `rrggbb`, `aarrggbb`)
//! * `^X` / `^N` — fill with the canvas style / do not fill
//! * `^x` / `^n` — stroke with the canvas style / do not stroke
//! * `^<`, `^=`, `^>` — align the current line left, center, right
//! * `^r` / `^R` — reset the paint styles / also reset the font
//! * `^E<c>` — rebind the escape character to `c`
//!
//! A malformed sequence is kept as literal text; markup never fails.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tanzaku::{FontRegistry, TextBox, XPoint, YPoint};
//!
//! // 1. Register fonts under aliases.
//! let mut fonts = FontRegistry::new();
//! fonts.load_system_fonts();
//! let query = tanzaku::fontdb::Query {
//!     families: &[tanzaku::fontdb::Family::SansSerif],
//!     ..Default::default()
//! };
//! let title = fonts
//!     .register_query("title", &query, 32.0)
//!     .expect("no usable font");
//! fonts.register("fallback", title.clone());
//!
//! // 2. Fill a box, switching styles inline.
//! let mut text = TextBox::new(title);
//! text.append("Hello, ^C[F00]world^R!", &fonts);
//!
//! // 3. Measure and place it by an anchor of your choice.
//! text.set_gravity(XPoint::Center, YPoint::BoxBottom);
//! let _size = (text.width(), text.height());
//! // text.draw(&mut canvas, 640.0, 700.0);
//! ```

pub mod canvas;
pub mod color;
pub mod font;
pub mod font_registry;
mod markup;
pub mod style;
pub mod textbox;

#[cfg(test)]
mod test_util;

// common re-exports
pub use canvas::{Canvas, Pixmap};
pub use color::Rgba32;
pub use font::{FontFace, FontHandle, FontdueFace, LineMetrics, ShapedGlyph, ShapedRun};
pub use font_registry::{FALLBACK_ALIAS, FontRegistry};
pub use style::{Attributes, PaintStyle};
pub use textbox::{Align, TextBox, XPoint, YPoint};

// re-export dependencies
pub use euclid;
pub use fontdb;
pub use fontdue;
