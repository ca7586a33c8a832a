//! Terminal output sanitizer.
//!
//! Interactive model CLIs paint spinners and rewrite lines while generating,
//! so the captured stream carries cursor-control escapes and braille spinner
//! glyphs that are not part of the answer. This module strips both.

/// Control sequences an interactive model CLI emits for cursor handling:
/// hide/show cursor, synchronized-update begin/end, cursor-to-column-1, and
/// the erase-line variants.
pub const CONTROL_SEQUENCES: [&str; 7] = [
    "\u{1b}[?25l",
    "\u{1b}[?25h",
    "\u{1b}[?2026l",
    "\u{1b}[?2026h",
    "\u{1b}[1G",
    "\u{1b}[K",
    "\u{1b}[2K",
];

/// True for code points in the braille-pattern block (U+2800..=U+28FF),
/// which spinner animations cycle through.
pub fn is_spinner_glyph(c: char) -> bool {
    ('\u{2800}'..='\u{28ff}').contains(&c)
}

/// Remove every braille spinner glyph and every known control sequence,
/// leaving all other characters in their original relative order.
///
/// Glyphs go first: a spinner frame can land in the middle of an escape,
/// and only this order cleans such input in a single, idempotent pass.
pub fn strip_terminal_noise(input: &str) -> String {
    let mut text = input.to_owned();
    text.retain(|c| !is_spinner_glyph(c));
    CONTROL_SEQUENCES
        .iter()
        .fold(text, |acc, seq| acc.replace(seq, ""))
}
