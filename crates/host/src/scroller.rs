//! Scrolling and static text on a region of the display

use marquee_protocol::interpolate::COLOR_ESCAPE;
use marquee_protocol::Rgb;
use tracing::warn;

use crate::display::{DisplayManager, Region};
use crate::font::{draw_text, Font};

pub const DEFAULT_MAX_LENGTH: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    Static,
    Scrolling,
}

/// One character on screen with its resolved color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: u8,
    pub color: Rgb,
}

pub struct TextScroller {
    region: Region,
    font: Font,
    color: Rgb,
    mode: ScrollMode,
    max_length: usize,
    padding: Vec<u8>,
    buffer: Vec<u8>,
    offset: usize,
}

impl TextScroller {
    pub fn new(region: Region, font: Font) -> Self {
        // Enough leading blanks for a message to enter from the right edge
        let num_spaces = 1 + usize::from(region.width / (font.width + 1));
        Self {
            region,
            font,
            color: Rgb::WHITE,
            mode: ScrollMode::Scrolling,
            max_length: DEFAULT_MAX_LENGTH,
            padding: vec![b' '; num_spaces],
            buffer: Vec::new(),
            offset: 0,
        }
    }

    pub const fn region(&self) -> Region {
        self.region
    }

    pub const fn font(&self) -> Font {
        self.font
    }

    pub const fn mode(&self) -> ScrollMode {
        self.mode
    }

    pub const fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn set_max_length(&mut self, max_length: usize) {
        self.max_length = max_length;
    }

    fn truncated<'a>(&self, text: &'a [u8]) -> &'a [u8] {
        if text.len() > self.max_length {
            warn!(
                len = text.len(),
                max = self.max_length,
                "message truncated"
            );
            &text[..self.max_length]
        } else {
            text
        }
    }

    /// Show `text` without moving. Nothing is drawn while the display is off.
    pub fn show_static(&mut self, text: &[u8], display: &mut DisplayManager) {
        self.mode = ScrollMode::Static;
        let message = self.truncated(text).to_vec();

        if display.is_enabled() {
            self.erase_area(display);
            self.buffer = message;
            self.offset = 0;
        }
    }

    /// Start scrolling `text` in from the right
    pub fn show_scroll(&mut self, text: &[u8]) {
        self.mode = ScrollMode::Scrolling;
        let mut buffer = self.padding.clone();
        buffer.extend_from_slice(self.truncated(text));
        self.buffer = buffer;
        self.restart();
    }

    /// Scroll the current message again from the start
    pub fn restart(&mut self) {
        self.mode = ScrollMode::Scrolling;
        self.offset = 0;
    }

    /// Let static text scroll off so a queued message can follow it
    pub fn enable_scrolling(&mut self) {
        self.mode = ScrollMode::Scrolling;
    }

    pub fn erase_area(&self, display: &mut DisplayManager) {
        display.fill_area(self.region, Rgb::BLACK);
    }

    const fn cell_width(&self) -> usize {
        self.font.width as usize + 1
    }

    /// Advance one column. Returns `false` once the message has scrolled
    /// completely off; static text never ends.
    pub fn animate(&mut self) -> bool {
        if self.mode == ScrollMode::Static {
            return true;
        }
        let total = self.glyphs().len() * self.cell_width();
        if self.offset >= total {
            return false;
        }
        self.offset += 1;
        true
    }

    /// Decode the buffer, applying inline color escapes
    pub fn glyphs(&self) -> Vec<Glyph> {
        let mut glyphs = Vec::with_capacity(self.buffer.len());
        let mut color = self.color;
        let mut bytes = self.buffer.as_slice();

        while let Some((&b, rest)) = bytes.split_first() {
            if b == COLOR_ESCAPE && rest.len() >= 3 {
                color = Rgb::new(rest[0], rest[1], rest[2]);
                bytes = &rest[3..];
                continue;
            }
            glyphs.push(Glyph { ch: b, color });
            bytes = rest;
        }

        glyphs
    }

    /// Draw the visible part of the message into its region
    pub fn render(&self, display: &mut DisplayManager) {
        self.erase_area(display);
        let cell = self.cell_width();
        let first = self.offset / cell;
        let x = i32::from(self.region.x) - (self.offset % cell) as i32;
        let glyphs = self.glyphs().into_iter().skip(first).map(|g| (g.ch, g.color));
        draw_text(display, self.font, glyphs, x, cell as u16, self.region);
    }

    /// Characters currently inside the region
    pub fn visible_glyphs(&self) -> Vec<Glyph> {
        let cell = self.cell_width();
        let first = self.offset / cell;
        let count = usize::from(self.region.width).div_ceil(cell);
        self.glyphs().into_iter().skip(first).take(count).collect()
    }

    pub fn visible_text(&self) -> String {
        let bytes: Vec<u8> = self.visible_glyphs().iter().map(|g| g.ch).collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// The whole message without padding or escapes
    pub fn message(&self) -> String {
        let skip = if self.mode == ScrollMode::Scrolling {
            self.padding.len()
        } else {
            0
        };
        let bytes: Vec<u8> = self.glyphs().iter().skip(skip).map(|g| g.ch).collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
