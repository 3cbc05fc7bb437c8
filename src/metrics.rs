//! Deterministic text measurement for the PDF base font.
//!
//! Pages are rendered with the builtin Helvetica faces, so the layout engine can measure strings
//! with the standard Helvetica advance widths instead of loading font files. Wrapping and
//! truncation therefore never depend on the environment.

/// Millimetres per typographic point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.15;

const ELLIPSIS: &str = "...";

/// Advance widths of Helvetica for the printable ASCII range `0x20..=0x7e`, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

const FALLBACK_WIDTH: u16 = 556;

fn char_width(c: char) -> u16 {
    match c {
        ' '..='~' => HELVETICA_WIDTHS[c as usize - 0x20],
        '\u{2014}' => 1000,
        '\u{2013}' => 556,
        '\u{2022}' => 350,
        '\u{a9}' => 737,
        _ => FALLBACK_WIDTH,
    }
}

/// Width of `text` in millimetres at `font_size` points.
pub fn text_width(text: &str, font_size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    f64::from(units) / 1000.0 * font_size * MM_PER_PT
}

/// Distance between consecutive baselines in millimetres at `font_size` points.
pub fn line_height(font_size: f64) -> f64 {
    font_size * LINE_HEIGHT_FACTOR * MM_PER_PT
}

/// Wraps `text` so that no line is wider than `max_width` millimetres.
///
/// Explicit newlines start a new line. Words wider than the column are broken between
/// characters. An empty input produces no lines.
pub fn wrap_text(text: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_owned()
            } else {
                format!("{current} {word}")
            };
            if text_width(&candidate, font_size) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width(word, font_size) <= max_width {
                current = word.to_owned();
            } else {
                let mut pieces = break_word(word, max_width, font_size);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

fn break_word(word: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if text_width(&current, font_size) > max_width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::replace(&mut current, c.to_string()));
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Shortens `text` to `max_chars` characters, ending in `...` when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Shortens `text` so it fits `max_width` millimetres, ending in `...` when cut.
pub fn truncate_to_width(text: &str, max_width: f64, font_size: f64) -> String {
    if text_width(text, font_size) <= max_width {
        return text.to_owned();
    }
    let budget = max_width - text_width(ELLIPSIS, font_size);
    let mut out = String::new();
    let mut used = 0.0;
    for c in text.chars() {
        let advance = f64::from(char_width(c)) / 1000.0 * font_size * MM_PER_PT;
        if used + advance > budget {
            break;
        }
        used += advance;
        out.push(c);
    }
    out.push_str(ELLIPSIS);
    out
}

/// Formats `value` with comma thousands separators.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, c) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_scale_with_font_size() {
        let small = text_width("Acme", 10.0);
        let large = text_width("Acme", 20.0);
        assert!((large - 2.0 * small).abs() < 1e-9);
        // "W" is wider than "i" in Helvetica.
        assert!(text_width("W", 10.0) > text_width("i", 10.0));
    }

    #[test]
    fn wrapping_respects_width_and_newlines() {
        let text = "the quick brown fox jumps over the lazy dog\nsecond paragraph";
        let lines = wrap_text(text, 30.0, 10.0);
        assert!(lines.len() > 2);
        assert_eq!(lines.last().map(String::as_str), Some("second paragraph"));
        for line in &lines {
            assert!(text_width(line, 10.0) <= 30.0, "line too wide: {line}");
        }
    }

    #[test]
    fn long_words_are_broken() {
        let url = "https://example.com/a/very/long/path/that/cannot/fit/on/one/line";
        let lines = wrap_text(url, 20.0, 8.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), url);
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap_text("", 50.0, 10.0).is_empty());
        assert!(wrap_text("   ", 50.0, 10.0).is_empty());
    }

    #[test]
    fn truncation_adds_ellipsis() {
        let title = "x".repeat(70);
        let short = truncate_chars(&title, 60);
        assert_eq!(short.chars().count(), 60);
        assert!(short.ends_with("..."));
        assert_eq!(truncate_chars("short", 60), "short");

        let fitted = truncate_to_width(&title, 20.0, 8.0);
        assert!(fitted.ends_with("..."));
        assert!(text_width(&fitted, 8.0) <= 20.0);
    }

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
