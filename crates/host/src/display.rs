//! Frame buffer for the LED matrix
//!
//! Holds one `Rgb` per pixel plus the output state a real LED driver keeps:
//! global brightness, an on/off switch and an optional power budget.

use marquee_protocol::Rgb;

/// Per-channel draw of a fully lit LED, in milliamps
const MILLIAMPS_PER_CHANNEL: u32 = 20;

/// Rectangle on the display, in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Region {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Region {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }
}

/// Supply limit for the whole display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerLimit {
    pub volts: u8,
    pub max_milliamps: u32,
}

pub struct DisplayManager {
    width: u16,
    height: u16,
    pixels: Vec<Rgb>,
    brightness: u8,
    enabled: bool,
    power: Option<PowerLimit>,
}

impl DisplayManager {
    /// Starts enabled, dark, and with brightness turned down
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; usize::from(width) * usize::from(height)],
            brightness: 10,
            enabled: true,
            power: None,
        }
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    pub fn set_max_power(&mut self, volts: u8, max_milliamps: u32) {
        self.power = Some(PowerLimit { volts, max_milliamps });
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Out-of-bounds writes are dropped
    pub fn set_pixel(&mut self, x: u16, y: u16, color: Rgb) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    pub fn pixel(&self, x: u16, y: u16) -> Option<Rgb> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Fill `region`, clipped to the display
    pub fn fill_area(&mut self, region: Region, color: Rgb) {
        let x_end = region.x.saturating_add(region.width).min(self.width);
        let y_end = region.y.saturating_add(region.height).min(self.height);
        for y in region.y..y_end {
            for x in region.x..x_end {
                self.set_pixel(x, y, color);
            }
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Rgb::BLACK);
    }

    /// Draw at full brightness, before any power limiting
    fn full_draw_milliamps(&self) -> u32 {
        self.pixels
            .iter()
            .map(|p| (u32::from(p.r) + u32::from(p.g) + u32::from(p.b)) * MILLIAMPS_PER_CHANNEL / 255)
            .sum()
    }

    /// Brightness actually applied, lowered when the frame would exceed the power budget
    pub fn effective_brightness(&self) -> u8 {
        let Some(limit) = self.power else {
            return self.brightness;
        };

        let full = self.full_draw_milliamps();
        let requested = full * (u32::from(self.brightness) + 1) / 256;
        if full == 0 || requested <= limit.max_milliamps {
            return self.brightness;
        }

        let allowed = (limit.max_milliamps * 256 / full).saturating_sub(1);
        allowed.min(u32::from(self.brightness)) as u8
    }

    /// Estimated supply draw of the current frame, in milliwatts
    pub fn estimated_milliwatts(&self) -> u32 {
        let volts = self.power.map_or(5, |p| u32::from(p.volts));
        let draw = self.full_draw_milliamps() * (u32::from(self.effective_brightness()) + 1) / 256;
        draw * volts
    }

    /// What the LEDs show: scaled pixels, or all black when disabled
    pub fn frame(&self) -> Vec<Rgb> {
        if !self.enabled {
            return vec![Rgb::BLACK; self.pixels.len()];
        }
        let scale = self.effective_brightness();
        self.pixels.iter().map(|p| p.scale(scale)).collect()
    }
}
