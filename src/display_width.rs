use unicode_width::UnicodeWidthStr;

/// Average glyph width as a fraction of the font size, for label estimates.
const GLYPH_ASPECT: f32 = 0.55;
const POINTS_PER_INCH: f32 = 72.0;

pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Label lines. A trailing newline does not open an extra line.
pub fn split_lines(s: &str) -> Vec<&str> {
    let trimmed = s.strip_suffix('\n').unwrap_or(s);
    trimmed.split('\n').collect()
}

/// Maximum display width among the lines of a label.
pub fn multiline_width(s: &str) -> usize {
    split_lines(s)
        .iter()
        .map(|line| display_width(line))
        .max()
        .unwrap_or(0)
}

pub fn line_count(s: &str) -> usize {
    split_lines(s).len()
}

/// Rough rendered width of a label in inches at `font_size` points.
pub fn estimated_inches(s: &str, font_size: f32) -> f32 {
    multiline_width(s) as f32 * font_size * GLYPH_ASPECT / POINTS_PER_INCH
}
