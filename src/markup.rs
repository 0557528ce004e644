//! The inline markup mini-language.
//!
//! An escape sequence starts at the configured escape character and mutates
//! attribute or alignment state without producing visible text. Parsing is
//! kept pure here: [`parse`] recognizes one sequence and reports the command
//! plus how many input bytes it spans, and the text box applies the effect.
//! A malformed sequence is reported as `None`, which the appender converts
//! into a literal escape character — markup mistakes never abort anything.

use crate::{color::Rgba32, textbox::Align};

/// One recognized escape sequence.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Command {
    /// A doubled escape character; emits the character itself as text.
    Literal(char),
    /// `E<c>`: rebind the escape character to `c`.
    SetEscape(char),
    /// `R`: reset font, fill and stroke to the box defaults.
    ResetFull,
    /// `r`: reset fill and stroke, keep the font.
    ResetStyle,
    StrokeNone,
    StrokeContext,
    StrokeColor(Rgba32),
    FillNone,
    FillContext,
    FillColor(Rgba32),
    /// `<`, `=` or `>`: change the current line's alignment.
    Align(Align),
    /// `F[name]`: switch to the registered font alias.
    Font(String),
}

/// Recognizes one escape sequence at the start of `input`.
///
/// `input` must begin with `escape`. On success, returns the command and the
/// number of bytes consumed (including the escape character itself). `None`
/// means the sequence is invalid and the escape character should be treated
/// as a regular character.
pub(crate) fn parse(input: &str, escape: char) -> Option<(Command, usize)> {
    debug_assert!(input.starts_with(escape));

    let esc_len = escape.len_utf8();
    let rest = &input[esc_len..];
    let mut chars = rest.chars();
    let cmd = chars.next()?;

    if cmd == escape {
        // A doubled escape character stands for itself, no matter what
        // follows it.
        return Some((Command::Literal(escape), esc_len * 2));
    }

    let consumed = esc_len + cmd.len_utf8();
    match cmd {
        'E' => {
            let c = chars.next()?;
            Some((Command::SetEscape(c), consumed + c.len_utf8()))
        }
        'R' => Some((Command::ResetFull, consumed)),
        'r' => Some((Command::ResetStyle, consumed)),
        'n' => Some((Command::StrokeNone, consumed)),
        'x' => Some((Command::StrokeContext, consumed)),
        'c' => {
            let (color, arg_len) = quoted_hex(&rest[1..])?;
            Some((Command::StrokeColor(color), consumed + arg_len))
        }
        'N' => Some((Command::FillNone, consumed)),
        'X' => Some((Command::FillContext, consumed)),
        'C' => {
            let (color, arg_len) = quoted_hex(&rest[1..])?;
            Some((Command::FillColor(color), consumed + arg_len))
        }
        '<' => Some((Command::Align(Align::Left), consumed)),
        '=' => Some((Command::Align(Align::Center), consumed)),
        '>' => Some((Command::Align(Align::Right), consumed)),
        'F' => {
            let (name, arg_len) = quoted(&rest[1..])?;
            Some((Command::Font(name.to_owned()), consumed + arg_len))
        }
        _ => None,
    }
}

/// Parses a `[`-quoted span; returns the contents and the bytes consumed
/// including both brackets. An unterminated bracket is invalid.
fn quoted(text: &str) -> Option<(&str, usize)> {
    let inner = text.strip_prefix('[')?;
    let end = inner.find(']')?;
    Some((&inner[..end], end + 2))
}

fn quoted_hex(text: &str) -> Option<(Rgba32, usize)> {
    let (arg, consumed) = quoted(text)?;
    Some((Rgba32::parse_hex(arg)?, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_caret(input: &str) -> Option<(Command, usize)> {
        parse(input, '^')
    }

    #[test]
    fn doubled_escape_is_literal() {
        assert_eq!(parse_caret("^^"), Some((Command::Literal('^'), 2)));
        // Even when a valid command letter follows: both characters are
        // consumed and nothing else is interpreted.
        assert_eq!(parse_caret("^^R"), Some((Command::Literal('^'), 2)));
    }

    #[test]
    fn simple_commands_consume_two_bytes() {
        assert_eq!(parse_caret("^R"), Some((Command::ResetFull, 2)));
        assert_eq!(parse_caret("^r"), Some((Command::ResetStyle, 2)));
        assert_eq!(parse_caret("^n"), Some((Command::StrokeNone, 2)));
        assert_eq!(parse_caret("^x"), Some((Command::StrokeContext, 2)));
        assert_eq!(parse_caret("^N"), Some((Command::FillNone, 2)));
        assert_eq!(parse_caret("^X"), Some((Command::FillContext, 2)));
        assert_eq!(parse_caret("^<"), Some((Command::Align(Align::Left), 2)));
        assert_eq!(parse_caret("^="), Some((Command::Align(Align::Center), 2)));
        assert_eq!(parse_caret("^>"), Some((Command::Align(Align::Right), 2)));
    }

    #[test]
    fn trailing_text_does_not_change_the_consumed_length() {
        assert_eq!(parse_caret("^Rabc"), Some((Command::ResetFull, 2)));
    }

    #[test]
    fn set_escape_takes_the_next_character() {
        assert_eq!(parse_caret("^E#"), Some((Command::SetEscape('#'), 3)));
        assert_eq!(parse_caret("^E§"), Some((Command::SetEscape('§'), 4)));
        assert_eq!(parse_caret("^E"), None);
    }

    #[test]
    fn colors_consume_brackets_and_digits() {
        assert_eq!(
            parse_caret("^C[F00]"),
            Some((Command::FillColor(Rgba32::from_argb(0xFFFF_0000)), 7))
        );
        assert_eq!(
            parse_caret("^c[8034af56]rest"),
            Some((Command::StrokeColor(Rgba32::from_argb(0x8034_AF56)), 12))
        );
    }

    #[test]
    fn malformed_colors_reject_the_whole_sequence() {
        assert_eq!(parse_caret("^C[zz]"), None);
        assert_eq!(parse_caret("^C[12345]"), None);
        assert_eq!(parse_caret("^C[F00"), None);
        assert_eq!(parse_caret("^CF00]"), None);
        assert_eq!(parse_caret("^C"), None);
    }

    #[test]
    fn font_names_are_quoted() {
        assert_eq!(
            parse_caret("^F[bold-XL]"),
            Some((Command::Font("bold-XL".to_owned()), 11))
        );
        assert_eq!(parse_caret("^F[]"), Some((Command::Font(String::new()), 4)));
        assert_eq!(parse_caret("^F[bold"), None);
        assert_eq!(parse_caret("^F"), None);
    }

    #[test]
    fn unknown_commands_and_bare_escapes_are_invalid() {
        assert_eq!(parse_caret("^"), None);
        assert_eq!(parse_caret("^Q"), None);
        assert_eq!(parse_caret("^ "), None);
    }

    #[test]
    fn multi_byte_escape_characters_count_in_bytes() {
        assert_eq!(parse("§§", '§'), Some((Command::Literal('§'), 4)));
        assert_eq!(parse("§R", '§'), Some((Command::ResetFull, 3)));
        assert_eq!(
            parse("§C[0F0]", '§'),
            Some((Command::FillColor(Rgba32::from_argb(0xFF00_FF00)), 8))
        );
    }
}
