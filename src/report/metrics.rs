//! Advance widths for the builtin Helvetica faces.
//!
//! printpdf does not expose glyph metrics for builtin fonts, so centering
//! text needs the AFM widths. Units are 1/1000 em; index 0 is the space
//! character (0x20), the last entry is `~` (0x7E).

const MM_PER_PT: f32 = 0.352_778;

/// Width used for characters outside printable ASCII.
const FALLBACK_WIDTH: u16 = 556;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn glyph_width(c: char, face: Face) -> u16 {
    let table = match face {
        Face::Regular => &HELVETICA,
        Face::Bold => &HELVETICA_BOLD,
    };
    (c as u32)
        .checked_sub(0x20)
        .and_then(|i| table.get(i as usize))
        .copied()
        .unwrap_or(FALLBACK_WIDTH)
}

/// Rendered width of `text` in millimetres at `size_pt`.
pub fn text_width_mm(text: &str, size_pt: f32, face: Face) -> f32 {
    let units: u32 = text.chars().map(|c| glyph_width(c, face) as u32).sum();
    units as f32 / 1000.0 * size_pt * MM_PER_PT
}

/// Left x that centers `text` inside the band `[left, left + width]`.
pub fn centered_x(text: &str, size_pt: f32, face: Face, left: f32, width: f32) -> f32 {
    left + (width - text_width_mm(text, size_pt, face)) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_width() {
        assert_eq!(text_width_mm("", 10.0, Face::Regular), 0.0);
    }

    #[test]
    fn bold_label_is_wider() {
        let text = "Mean Corp. Hb Conc., MCHC 45 (H)";
        assert!(text_width_mm(text, 9.0, Face::Bold) > text_width_mm(text, 9.0, Face::Regular));
    }

    #[test]
    fn width_scales_with_size() {
        let small = text_width_mm("HEMOGLOBIN", 8.0, Face::Regular);
        let large = text_width_mm("HEMOGLOBIN", 16.0, Face::Regular);
        assert!((large - 2.0 * small).abs() < 1e-4);
    }

    #[test]
    fn known_glyph_widths() {
        // "W" is 944/1000 em in both faces
        let w = text_width_mm("W", 1.0 / MM_PER_PT, Face::Regular);
        assert!((w - 0.944).abs() < 1e-3);
        assert_eq!(glyph_width('i', Face::Regular), 222);
        assert_eq!(glyph_width('i', Face::Bold), 278);
        assert_eq!(glyph_width('~', Face::Regular), 584);
    }

    #[test]
    fn non_ascii_uses_fallback() {
        assert_eq!(glyph_width('µ', Face::Regular), FALLBACK_WIDTH);
        assert_eq!(glyph_width('\n', Face::Bold), FALLBACK_WIDTH);
    }

    #[test]
    fn centered_text_is_symmetric() {
        let x = centered_x("11-16 g/dL", 9.0, Face::Regular, 100.0, 45.0);
        let width = text_width_mm("11-16 g/dL", 9.0, Face::Regular);
        let left_gap = x - 100.0;
        let right_gap = 145.0 - (x + width);
        assert!((left_gap - right_gap).abs() < 1e-4);
    }
}
