//! Marquee controller
//!
//! Owns the display and layout and runs the message cycle: scroll the
//! current message, pick up a queued one when it ends, otherwise announce
//! `ready` and pause before repeating.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, TimeZone};
use marquee_protocol::{interpolate, DisplayCommand, LightCommand, ReadyState, Rgb, TextCommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use crate::config::Config;
use crate::display::DisplayManager;
use crate::layout::{Layout, Sidebar};
use crate::life::SEED_DENSITY;

pub type SharedMarquee = Arc<RwLock<Marquee>>;

/// Snapshot returned by the status API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarqueeStatus {
    pub enabled: bool,
    pub color: String,
    pub brightness: u8,
    pub effective_brightness: u8,
    pub speed_ms: u32,
    pub message: String,
    pub visible: String,
    pub queued: bool,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock: Option<String>,
}

/// What the LEDs currently show, row by row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSnapshot {
    pub width: u16,
    pub height: u16,
    pub effective_brightness: u8,
    pub milliwatts: u32,
    /// `#rrggbb` per pixel, after brightness scaling
    pub pixels: Vec<String>,
}

pub struct Marquee {
    display: DisplayManager,
    layout: Layout,
    speed_ms: u32,
    wait: Duration,
    life_period: Duration,
    scroll_next: Option<Vec<u8>>,
    waiting_since: Option<Instant>,
    ready: watch::Sender<ReadyState>,
    rng: StdRng,
}

impl Marquee {
    pub fn new(config: &Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_rng(config: &Config, mut rng: StdRng) -> Self {
        let d = &config.display;
        let mut display = DisplayManager::new(d.width, d.height);
        display.set_max_power(d.volts, d.max_milliamps);
        display.set_brightness(d.brightness);

        let mut layout = Layout::new(&display, d.sidebar, d.sidebar_width);
        layout.text_mut().set_max_length(d.max_message_len);
        if let Sidebar::Life(life) = layout.sidebar_mut() {
            life.seed(&mut rng, SEED_DENSITY);
        }

        let (ready, _) = watch::channel(ReadyState::default());

        Self {
            display,
            layout,
            speed_ms: config.scroll.speed_ms.max(1),
            wait: Duration::from_millis(config.scroll.wait_ms),
            life_period: Duration::from_millis(config.scroll.life_ms.max(1)),
            scroll_next: None,
            waiting_since: None,
            ready,
            rng,
        }
    }

    pub const fn display(&self) -> &DisplayManager {
        &self.display
    }

    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    pub const fn speed_ms(&self) -> u32 {
        self.speed_ms
    }

    /// Time between scroll steps
    pub fn scroll_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.speed_ms))
    }

    /// Time between sidebar updates, if there is a sidebar
    pub const fn sidebar_period(&self) -> Option<Duration> {
        match self.layout.sidebar() {
            Sidebar::None => None,
            Sidebar::Clock(_) => Some(Duration::from_secs(1)),
            Sidebar::Life(_) => Some(self.life_period),
        }
    }

    pub fn subscribe_ready(&self) -> watch::Receiver<ReadyState> {
        self.ready.subscribe()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.borrow().ready
    }

    fn publish_ready(&self, ready: bool) {
        debug!(ready, "ready state");
        self.ready.send_replace(ReadyState { ready });
    }

    /// One animation step
    pub fn tick(&mut self, now: Instant) {
        if !self.display.is_enabled() {
            self.display.clear();
            return;
        }

        if let Some(started) = self.waiting_since {
            if now.saturating_duration_since(started) > self.wait {
                self.waiting_since = None;
                match self.scroll_next.take() {
                    Some(next) => self.layout.text_mut().show_scroll(&next),
                    None => self.layout.text_mut().restart(),
                }
                // Clients may queue ahead again
                self.publish_ready(false);
            }
        } else if !self.layout.text_mut().animate() {
            if let Some(next) = self.scroll_next.take() {
                self.layout.text_mut().show_scroll(&next);
                self.publish_ready(false);
            } else {
                self.waiting_since = Some(now);
                self.publish_ready(true);
            }
        }

        self.layout.text().render(&mut self.display);
    }

    /// Advance the sidebar: clock from local time, or one Life generation
    pub fn sidebar_tick(&mut self) {
        match self.layout.sidebar_mut() {
            Sidebar::Clock(clock) => clock.tick(&Local::now(), &mut self.display),
            Sidebar::Life(life) => life.animate(&mut self.rng, &mut self.display),
            Sidebar::None => {}
        }
    }

    pub fn clock_tick<Tz: TimeZone>(&mut self, now: &DateTime<Tz>)
    where
        Tz::Offset: std::fmt::Display,
    {
        if let Sidebar::Clock(clock) = self.layout.sidebar_mut() {
            clock.tick(now, &mut self.display);
        }
    }

    pub fn set_color(&mut self, color: Rgb) {
        info!(%color, "text color");
        self.layout.text_mut().set_color(color);
    }

    pub fn set_brightness(&mut self, brightness: u8) {
        info!(brightness, "brightness");
        self.display.set_brightness(brightness);
    }

    /// Milliseconds per column; zero is raised to one
    pub fn set_speed(&mut self, speed_ms: u32) {
        info!(speed_ms, "scroll speed");
        self.speed_ms = speed_ms.max(1);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        info!(enabled, "display");
        self.display.set_enabled(enabled);
    }

    /// Show `text` now, or after the current message when `queue` is set
    pub fn show_text(&mut self, text: &[u8], queue: bool) {
        if queue {
            self.scroll_next = Some(text.to_vec());
        } else {
            self.layout.text_mut().show_scroll(text);
        }
    }

    pub fn show_static(&mut self, text: &[u8]) {
        self.layout.text_mut().show_static(text, &mut self.display);
        if self.display.is_enabled() {
            self.layout.text().render(&mut self.display);
        }
    }

    /// Full-width message area, used when the sidebar must give way
    pub fn remove_sidebar(&mut self) {
        self.layout.remove_sidebar(&self.display);
    }

    pub fn apply_light(&mut self, cmd: &LightCommand) {
        if let Some(enabled) = cmd.enabled() {
            self.set_enabled(enabled);
        }
        if let Some(brightness) = cmd.brightness {
            self.set_brightness(brightness);
        }
        if let Some(color) = cmd.color {
            self.set_color(color);
        }
    }

    pub fn apply_text(&mut self, cmd: &TextCommand) {
        let text = interpolate(&cmd.text);
        if cmd.is_static() {
            self.show_static(&text);
        } else {
            self.scroll_next = Some(text);
            self.layout.text_mut().enable_scrolling();
        }
    }

    pub fn apply_display(&mut self, cmd: &DisplayCommand) {
        if let Some(enabled) = cmd.enabled {
            self.set_enabled(enabled);
        }
        if let Some(speed) = cmd.speed {
            self.set_speed(speed);
        }
        if let Some(color) = cmd.rgb() {
            self.set_color(color);
        }
    }

    pub fn snapshot(&self) -> MarqueeStatus {
        let text = self.layout.text();
        MarqueeStatus {
            enabled: self.display.is_enabled(),
            color: text.color().to_hex(),
            brightness: self.display.brightness(),
            effective_brightness: self.display.effective_brightness(),
            speed_ms: self.speed_ms,
            message: text.message(),
            visible: text.visible_text(),
            queued: self.scroll_next.is_some(),
            ready: self.is_ready(),
            clock: self.layout.clock().map(|c| c.text().to_string()),
        }
    }

    pub fn frame(&self) -> FrameSnapshot {
        FrameSnapshot {
            width: self.display.width(),
            height: self.display.height(),
            effective_brightness: self.display.effective_brightness(),
            milliwatts: self.display.estimated_milliwatts(),
            pixels: self.display.frame().into_iter().map(Rgb::to_hex).collect(),
        }
    }
}

/// Drive `tick` at the current scroll speed until the task is dropped
pub async fn run_animation(marquee: SharedMarquee) {
    loop {
        let period = marquee.read().await.scroll_period();
        tokio::time::sleep(period).await;
        marquee.write().await.tick(Instant::now());
    }
}

/// Drive the sidebar; returns at once when there is none
pub async fn run_sidebar(marquee: SharedMarquee) {
    let Some(period) = marquee.read().await.sidebar_period() else {
        return;
    };
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        marquee.write().await.sidebar_tick();
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;
    use crate::layout::SidebarKind;
    use crate::scroller::ScrollMode;

    fn config() -> Config {
        let mut config = Config::default();
        config.display.width = 14;
        config.display.sidebar = SidebarKind::None;
        config.scroll.wait_ms = 100;
        config
    }

    fn marquee() -> Marquee {
        Marquee::with_rng(&config(), StdRng::seed_from_u64(1))
    }

    /// Tick until the current message has scrolled off
    fn run_to_end(m: &mut Marquee, now: Instant) {
        for _ in 0..10_000 {
            if m.is_ready() || m.waiting_since.is_some() {
                return;
            }
            let queued = m.scroll_next.is_some();
            m.tick(now);
            if queued && m.scroll_next.is_none() {
                return;
            }
        }
        panic!("message never ended");
    }

    #[test]
    fn test_idle_cycle_publishes_ready() {
        let mut m = marquee();
        let mut ready = m.subscribe_ready();
        let start = Instant::now();

        m.show_text(b"hi", false);
        run_to_end(&mut m, start);
        assert!(m.is_ready());
        assert!(ready.has_changed().unwrap());
        assert!(ready.borrow_and_update().ready);

        // Still waiting before the pause is over
        m.tick(start + Duration::from_millis(50));
        assert!(m.is_ready());

        m.tick(start + Duration::from_millis(200));
        assert!(!m.is_ready());
        assert_eq!(m.snapshot().message, "hi");
    }

    #[test]
    fn test_queued_message_follows_current() {
        let mut m = marquee();
        let start = Instant::now();
        m.show_text(b"first", false);
        m.show_text(b"second", true);
        assert!(m.snapshot().queued);

        run_to_end(&mut m, start);
        assert!(!m.is_ready());
        assert!(!m.snapshot().queued);
        assert_eq!(m.snapshot().message, "second");
    }

    #[test]
    fn test_queue_while_waiting_is_shown_after_pause() {
        let mut m = marquee();
        let start = Instant::now();
        m.show_text(b"a", false);
        run_to_end(&mut m, start);
        assert!(m.is_ready());

        m.show_text(b"next", true);
        m.tick(start + Duration::from_millis(500));
        assert_eq!(m.snapshot().message, "next");
        assert!(!m.is_ready());
    }

    #[test]
    fn test_disabled_display_does_not_animate() {
        let mut m = marquee();
        m.show_text(b"hi", false);
        m.set_enabled(false);
        let before = m.snapshot().visible;
        for _ in 0..200 {
            m.tick(Instant::now());
        }
        assert_eq!(m.snapshot().visible, before);
        assert!(!m.is_ready());
    }

    #[test]
    fn test_commands() {
        let mut m = marquee();

        m.apply_light(&LightCommand {
            state: Some("OFF".into()),
            brightness: Some(99),
            color: Some(Rgb::new(1, 2, 3)),
        });
        let status = m.snapshot();
        assert!(!status.enabled);
        assert_eq!(status.brightness, 99);
        assert_eq!(status.color, "#010203");

        m.apply_display(&DisplayCommand {
            enabled: Some(true),
            speed: Some(0),
            color: Some("ff8000".into()),
        });
        let status = m.snapshot();
        assert!(status.enabled);
        assert_eq!(status.speed_ms, 1);
        assert_eq!(status.color, "#ff8000");
    }

    #[test]
    fn test_text_command_static_and_queued() {
        let mut m = marquee();
        m.apply_text(&TextCommand {
            text: "STOP".into(),
            scroll: Some(false),
        });
        assert_eq!(m.layout().text().mode(), ScrollMode::Static);
        assert_eq!(m.snapshot().message, "STOP");

        m.apply_text(&TextCommand {
            text: "go {#00ff00}green".into(),
            scroll: None,
        });
        assert_eq!(m.layout().text().mode(), ScrollMode::Scrolling);
        assert!(m.snapshot().queued);
        run_to_end(&mut m, Instant::now());
        assert_eq!(m.snapshot().message, "go green");
    }

    fn lit_pixels(frame: &FrameSnapshot) -> Vec<(u16, u16)> {
        (0u16..)
            .zip(&frame.pixels)
            .filter(|(_, p)| p.as_str() != "#000000")
            .map(|(i, _)| (i % frame.width, i / frame.width))
            .collect()
    }

    #[test]
    fn test_scrolling_text_lights_text_region() {
        let mut cfg = config();
        cfg.display.width = 96;
        cfg.display.brightness = 255;
        let mut m = Marquee::with_rng(&cfg, StdRng::seed_from_u64(4));
        m.set_color(Rgb::WHITE);
        m.show_text(b"HELLO WORLD", false);
        assert!(lit_pixels(&m.frame()).is_empty());

        // 14 padding cells of 7 columns sit in front of the message
        let start = Instant::now();
        for _ in 0..(14 * 7 + 10) {
            m.tick(start);
        }

        let frame = m.frame();
        let region = m.layout().text().region();
        let lit = lit_pixels(&frame);
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(x, y)| x < region.width && y < region.height));
        assert!(frame.milliwatts > 0);
    }

    #[test]
    fn test_static_text_drawn_at_once() {
        let mut m = marquee();
        m.set_brightness(255);
        m.show_static(b"I");
        let frame = m.frame();
        assert_eq!(lit_pixels(&frame).len(), 7 + 2 + 2);

        m.set_enabled(false);
        assert!(lit_pixels(&m.frame()).is_empty());
    }

    #[test]
    fn test_clock_sidebar() {
        let mut cfg = config();
        cfg.display.width = 96;
        cfg.display.sidebar = SidebarKind::Clock;
        let mut m = Marquee::with_rng(&cfg, StdRng::seed_from_u64(2));
        assert_eq!(m.sidebar_period(), Some(Duration::from_secs(1)));

        let noon = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 12, 30, 0)
            .unwrap();
        m.clock_tick(&noon);
        assert_eq!(m.snapshot().clock.as_deref(), Some("12:30:00"));
        let clock = m.layout().clock().unwrap().region();
        assert!(lit_pixels(&m.frame()).iter().any(|&(x, _)| x >= clock.x));

        m.remove_sidebar();
        assert_eq!(m.sidebar_period(), None);
        assert_eq!(m.snapshot().clock, None);
    }

    #[test]
    fn test_life_sidebar_is_seeded() {
        let mut cfg = config();
        cfg.display.width = 96;
        cfg.display.sidebar = SidebarKind::Life;
        cfg.display.sidebar_width = 16;
        let mut m = Marquee::with_rng(&cfg, StdRng::seed_from_u64(3));

        assert!(m.layout().life().unwrap().live_count() > 0);
        assert_eq!(m.sidebar_period(), Some(Duration::from_millis(150)));
        m.sidebar_tick();
    }
}
