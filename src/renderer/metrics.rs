//! Helvetica advance widths for truncating label text.
//!
//! Widths are in 1/1000 em, covering ASCII 0x20..=0x7E. Index = (char as usize) - 32.
//! Characters outside the table use `AVERAGE_WIDTH`.

const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // sp ! " # $ % & ' ( ) * + , - . /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // : ; < = > ? @
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    278, 278, 278, 469, 556, 333, // [ \ ] ^ _ `
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
    334, 260, 334, 584, // { | } ~
];

const AVERAGE_WIDTH: u16 = 556;
const ELLIPSIS_WIDTH: u16 = 1000;

/// Appended to truncated lines
pub const ELLIPSIS: char = '\u{2026}';

fn char_width(c: char) -> u16 {
    let code = c as usize;
    if (32..=126).contains(&code) {
        HELVETICA_WIDTHS[code - 32]
    } else if c == ELLIPSIS {
        ELLIPSIS_WIDTH
    } else {
        AVERAGE_WIDTH
    }
}

/// Rendered width of `text` at `font_size`, in the font size's unit
pub fn text_width(text: &str, font_size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    f64::from(units) * font_size / 1000.0
}

/// Shorten `text` so it fits in `max_width`, ending with an ellipsis when cut
pub fn truncate_to_width(text: &str, max_width: f64, font_size: f64) -> String {
    if text_width(text, font_size) <= max_width {
        return text.to_string();
    }

    let budget = max_width - f64::from(ELLIPSIS_WIDTH) * font_size / 1000.0;
    let mut used = 0.0;
    let mut kept = String::new();
    for c in text.chars() {
        let w = f64::from(char_width(c)) * font_size / 1000.0;
        if used + w > budget {
            break;
        }
        used += w;
        kept.push(c);
    }
    if budget < 0.0 {
        return String::new();
    }
    let mut truncated = kept.trim_end().to_string();
    truncated.push(ELLIPSIS);
    truncated
}
