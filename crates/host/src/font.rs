//! Bitmap fonts and text drawing
//!
//! Glyphs are stored column by column, least significant bit at the top.

use marquee_protocol::Rgb;

use crate::display::{DisplayManager, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphSet {
    /// Printable ASCII, 5x7
    Ascii5x7,
    /// Digits, colon and space, 3x5
    Digits3x5,
}

/// Glyph cell size of a fixed-width font
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Font {
    pub width: u16,
    pub height: u16,
    pub glyphs: GlyphSet,
}

/// Main message font
pub const TEXT_FONT: Font = Font {
    width: 6,
    height: 8,
    glyphs: GlyphSet::Ascii5x7,
};

/// Narrow clock font
pub const CLOCK_FONT: Font = Font {
    width: 4,
    height: 6,
    glyphs: GlyphSet::Digits3x5,
};

static BLANK: [u8; 5] = [0; 5];

#[rustfmt::skip]
static ASCII_5X7: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], [0x00, 0x00, 0x5f, 0x00, 0x00], [0x00, 0x07, 0x00, 0x07, 0x00],
    [0x14, 0x7f, 0x14, 0x7f, 0x14], [0x24, 0x2a, 0x7f, 0x2a, 0x12], [0x23, 0x13, 0x08, 0x64, 0x62],
    [0x36, 0x49, 0x55, 0x22, 0x50], [0x00, 0x05, 0x03, 0x00, 0x00], [0x00, 0x1c, 0x22, 0x41, 0x00],
    [0x00, 0x41, 0x22, 0x1c, 0x00], [0x08, 0x2a, 0x1c, 0x2a, 0x08], [0x08, 0x08, 0x3e, 0x08, 0x08],
    [0x00, 0x50, 0x30, 0x00, 0x00], [0x08, 0x08, 0x08, 0x08, 0x08], [0x00, 0x60, 0x60, 0x00, 0x00],
    [0x20, 0x10, 0x08, 0x04, 0x02], [0x3e, 0x51, 0x49, 0x45, 0x3e], [0x00, 0x42, 0x7f, 0x40, 0x00],
    [0x42, 0x61, 0x51, 0x49, 0x46], [0x21, 0x41, 0x45, 0x4b, 0x31], [0x18, 0x14, 0x12, 0x7f, 0x10],
    [0x27, 0x45, 0x45, 0x45, 0x39], [0x3c, 0x4a, 0x49, 0x49, 0x30], [0x01, 0x71, 0x09, 0x05, 0x03],
    [0x36, 0x49, 0x49, 0x49, 0x36], [0x06, 0x49, 0x49, 0x29, 0x1e], [0x00, 0x36, 0x36, 0x00, 0x00],
    [0x00, 0x56, 0x36, 0x00, 0x00], [0x08, 0x14, 0x22, 0x41, 0x00], [0x14, 0x14, 0x14, 0x14, 0x14],
    [0x00, 0x41, 0x22, 0x14, 0x08], [0x02, 0x01, 0x51, 0x09, 0x06], [0x32, 0x49, 0x79, 0x41, 0x3e],
    [0x7e, 0x11, 0x11, 0x11, 0x7e], [0x7f, 0x49, 0x49, 0x49, 0x36], [0x3e, 0x41, 0x41, 0x41, 0x22],
    [0x7f, 0x41, 0x41, 0x22, 0x1c], [0x7f, 0x49, 0x49, 0x49, 0x41], [0x7f, 0x09, 0x09, 0x09, 0x01],
    [0x3e, 0x41, 0x49, 0x49, 0x7a], [0x7f, 0x08, 0x08, 0x08, 0x7f], [0x00, 0x41, 0x7f, 0x41, 0x00],
    [0x20, 0x40, 0x41, 0x3f, 0x01], [0x7f, 0x08, 0x14, 0x22, 0x41], [0x7f, 0x40, 0x40, 0x40, 0x40],
    [0x7f, 0x02, 0x0c, 0x02, 0x7f], [0x7f, 0x04, 0x08, 0x10, 0x7f], [0x3e, 0x41, 0x41, 0x41, 0x3e],
    [0x7f, 0x09, 0x09, 0x09, 0x06], [0x3e, 0x41, 0x51, 0x21, 0x5e], [0x7f, 0x09, 0x19, 0x29, 0x46],
    [0x46, 0x49, 0x49, 0x49, 0x31], [0x01, 0x01, 0x7f, 0x01, 0x01], [0x3f, 0x40, 0x40, 0x40, 0x3f],
    [0x1f, 0x20, 0x40, 0x20, 0x1f], [0x3f, 0x40, 0x38, 0x40, 0x3f], [0x63, 0x14, 0x08, 0x14, 0x63],
    [0x07, 0x08, 0x70, 0x08, 0x07], [0x61, 0x51, 0x49, 0x45, 0x43], [0x00, 0x7f, 0x41, 0x41, 0x00],
    [0x02, 0x04, 0x08, 0x10, 0x20], [0x00, 0x41, 0x41, 0x7f, 0x00], [0x04, 0x02, 0x01, 0x02, 0x04],
    [0x40, 0x40, 0x40, 0x40, 0x40], [0x00, 0x01, 0x02, 0x04, 0x00], [0x20, 0x54, 0x54, 0x54, 0x78],
    [0x7f, 0x48, 0x44, 0x44, 0x38], [0x38, 0x44, 0x44, 0x44, 0x20], [0x38, 0x44, 0x44, 0x48, 0x7f],
    [0x38, 0x54, 0x54, 0x54, 0x18], [0x08, 0x7e, 0x09, 0x01, 0x02], [0x0c, 0x52, 0x52, 0x52, 0x3e],
    [0x7f, 0x08, 0x04, 0x04, 0x78], [0x00, 0x44, 0x7d, 0x40, 0x00], [0x20, 0x40, 0x44, 0x3d, 0x00],
    [0x7f, 0x10, 0x28, 0x44, 0x00], [0x00, 0x41, 0x7f, 0x40, 0x00], [0x7c, 0x04, 0x18, 0x04, 0x78],
    [0x7c, 0x08, 0x04, 0x04, 0x78], [0x38, 0x44, 0x44, 0x44, 0x38], [0x7c, 0x14, 0x14, 0x14, 0x08],
    [0x08, 0x14, 0x14, 0x18, 0x7c], [0x7c, 0x08, 0x04, 0x04, 0x08], [0x48, 0x54, 0x54, 0x54, 0x20],
    [0x04, 0x3f, 0x44, 0x40, 0x20], [0x3c, 0x40, 0x40, 0x20, 0x7c], [0x1c, 0x20, 0x40, 0x20, 0x1c],
    [0x3c, 0x40, 0x30, 0x40, 0x3c], [0x44, 0x28, 0x10, 0x28, 0x44], [0x0c, 0x50, 0x50, 0x50, 0x3c],
    [0x44, 0x64, 0x54, 0x4c, 0x44], [0x00, 0x08, 0x36, 0x41, 0x00], [0x00, 0x00, 0x7f, 0x00, 0x00],
    [0x00, 0x41, 0x36, 0x08, 0x00], [0x10, 0x08, 0x08, 0x10, 0x08],
];

#[rustfmt::skip]
static DIGITS_3X5: [[u8; 3]; 10] = [
    [0x1f, 0x11, 0x1f], [0x12, 0x1f, 0x10], [0x1d, 0x15, 0x17], [0x15, 0x15, 0x1f], [0x07, 0x04, 0x1f],
    [0x17, 0x15, 0x1d], [0x1f, 0x15, 0x1d], [0x01, 0x01, 0x1f], [0x1f, 0x15, 0x1f], [0x17, 0x15, 0x1f],
];

impl Font {
    /// Columns of `ch`; unknown characters draw blank
    pub fn columns(self, ch: u8) -> &'static [u8] {
        match self.glyphs {
            GlyphSet::Ascii5x7 => match ch {
                b' '..=b'~' => &ASCII_5X7[usize::from(ch - b' ')],
                _ => &BLANK,
            },
            GlyphSet::Digits3x5 => match ch {
                b'0'..=b'9' => &DIGITS_3X5[usize::from(ch - b'0')],
                b':' => &[0x00, 0x0a, 0x00],
                _ => &BLANK[..3],
            },
        }
    }
}

/// Draw `glyphs` left to right starting at column `x`, one character every
/// `advance` columns. `x` may lie left of `clip`; only pixels inside `clip`
/// are written.
pub fn draw_text<I>(display: &mut DisplayManager, font: Font, glyphs: I, x: i32, advance: u16, clip: Region)
where
    I: IntoIterator<Item = (u8, Rgb)>,
{
    let clip_left = i32::from(clip.x);
    let clip_right = clip_left + i32::from(clip.width);
    let rows = font.height.min(8).min(clip.height);

    let mut left = x;
    for (ch, color) in glyphs {
        if left >= clip_right {
            break;
        }
        for (dx, &bits) in (0i32..).zip(font.columns(ch)) {
            let px = left + dx;
            if px < clip_left || px >= clip_right {
                continue;
            }
            for row in 0..rows {
                if bits & (1 << row) != 0 {
                    display.set_pixel(px as u16, clip.y + row, color);
                }
            }
        }
        left += i32::from(advance);
    }
}
