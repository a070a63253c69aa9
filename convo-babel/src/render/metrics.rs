//! Glyph metrics and WinAnsi encoding for the base-14 fonts.
//!
//! Widths are the standard Adobe AFM advance widths (1/1000 em) for the
//! printable ASCII range. Helvetica-Oblique shares Helvetica's widths and every
//! Courier glyph is 600 units wide.

use super::style::Font;

const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

const COURIER_WIDTH: u16 = 600;
const BULLET_WIDTH: u16 = 350;
const FALLBACK_WIDTH: u16 = 556;

/// Map a character to its WinAnsiEncoding byte, `?` when it has none.
pub fn win_ansi_byte(c: char) -> u8 {
    match c {
        '\t' => b' ',
        ' '..='~' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        _ => b'?',
    }
}

pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

/// Advance width of one encoded byte, in 1/1000 em.
fn byte_width(font: Font, byte: u8) -> u16 {
    let table = match font {
        Font::Mono => return COURIER_WIDTH,
        Font::Bold => &HELVETICA_BOLD_WIDTHS,
        Font::Regular | Font::Oblique => &HELVETICA_WIDTHS,
    };
    match byte {
        0x20..=0x7e => table[(byte - 0x20) as usize],
        0x95 => BULLET_WIDTH,
        _ => FALLBACK_WIDTH,
    }
}

/// Width of `text` set in `font` at `size` points.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| u32::from(byte_width(font, win_ansi_byte(c))))
        .sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap into lines no wider than `max_width`.
///
/// Hard line breaks are kept (empty lines included), leading spaces of a line
/// survive, and words wider than a whole line are broken between characters.
/// Every line holds at least one character, so the result is finite for any
/// positive width.
pub fn wrap_lines(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for hard_line in text.split('\n') {
        if hard_line.is_empty() {
            lines.push(String::new());
            continue;
        }
        wrap_hard_line(hard_line, font, size, max_width, &mut lines);
    }
    lines
}

fn wrap_hard_line(line: &str, font: Font, size: f32, max_width: f32, lines: &mut Vec<String>) {
    let mut current = String::new();
    let mut width = 0.0;

    for piece in line.split_inclusive(' ') {
        let visible = piece.trim_end_matches(' ');
        if width + text_width(visible, font, size) <= max_width {
            current.push_str(piece);
            width += text_width(piece, font, size);
            continue;
        }

        if !current.trim().is_empty() {
            lines.push(current.trim_end().to_string());
            current.clear();
            width = 0.0;
        }
        if visible.is_empty() {
            continue;
        }

        if text_width(visible, font, size) <= max_width {
            current.push_str(piece);
            width = text_width(piece, font, size);
            continue;
        }

        // A single word wider than the line.
        for c in visible.chars() {
            let w = text_width(c.encode_utf8(&mut [0; 4]), font, size);
            if width + w > max_width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                width = 0.0;
            }
            current.push(c);
            width += w;
        }
        if piece.len() > visible.len() {
            current.push(' ');
            width += text_width(" ", font, size);
        }
    }

    let tail = current.trim_end();
    if !tail.is_empty() || lines.is_empty() {
        lines.push(tail.to_string());
    }
}
