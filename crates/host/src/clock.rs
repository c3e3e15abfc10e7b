use chrono::{DateTime, TimeZone};
use marquee_protocol::{Hsv, Rgb};

use crate::display::{DisplayManager, Region};
use crate::font::{draw_text, Font};

/// Wall clock drawn beside the message, slowly cycling through the hues
pub struct Clock {
    region: Region,
    font: Font,
    hue: u8,
    text: String,
}

impl Clock {
    pub const fn new(region: Region, font: Font) -> Self {
        Self {
            region,
            font,
            hue: 0,
            text: String::new(),
        }
    }

    pub const fn region(&self) -> Region {
        self.region
    }

    pub const fn font(&self) -> Font {
        self.font
    }

    pub fn color(&self) -> Rgb {
        Hsv::new(self.hue, 0xff, 0xff).to_rgb()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Once-a-second update: next hue, new time string
    pub fn tick<Tz: TimeZone>(&mut self, now: &DateTime<Tz>, display: &mut DisplayManager)
    where
        Tz::Offset: std::fmt::Display,
    {
        self.hue = self.hue.wrapping_add(1);
        self.set_text(now.format("%l:%M:%S").to_string(), display);
    }

    pub fn set_text(&mut self, text: String, display: &mut DisplayManager) {
        if display.is_enabled() {
            display.fill_area(self.region, Rgb::BLACK);
            let color = self.color();
            let glyphs = text.bytes().map(|b| (b, color));
            draw_text(display, self.font, glyphs, i32::from(self.region.x), self.font.width, self.region);
            self.text = text;
        }
    }
}
