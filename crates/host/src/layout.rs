//! Splitting the display between the message and an optional sidebar

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::display::{DisplayManager, Region};
use crate::life::Life;
use crate::font::{Font, CLOCK_FONT, TEXT_FONT};
use crate::scroller::TextScroller;

/// What occupies the right-hand side of the display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarKind {
    None,
    #[default]
    Clock,
    Life,
}

pub enum Sidebar {
    None,
    Clock(Clock),
    Life(Life),
}

pub struct Layout {
    text: TextScroller,
    sidebar: Sidebar,
}

impl Layout {
    /// Message at the left, sidebar `sidebar_width` pixels wide at the right.
    /// A zero width gives the message the whole display.
    pub fn new(display: &DisplayManager, kind: SidebarKind, sidebar_width: u16) -> Self {
        let width = display.width();
        let sidebar_width = if kind == SidebarKind::None { 0 } else { sidebar_width };

        match kind {
            SidebarKind::Clock if sidebar_width > 0 => Self::with_clock(width, sidebar_width, TEXT_FONT, CLOCK_FONT),
            SidebarKind::Life if sidebar_width > 0 && sidebar_width < width.saturating_sub(1) => {
                Self::with_life(width, display.height(), sidebar_width, TEXT_FONT)
            }
            _ => Self::text_only(width, TEXT_FONT),
        }
    }

    pub fn text_only(width: u16, font: Font) -> Self {
        Self {
            text: TextScroller::new(Region::new(0, 0, width, font.height + 1), font),
            sidebar: Sidebar::None,
        }
    }

    fn with_clock(width: u16, clock_width: u16, font: Font, clock_font: Font) -> Self {
        let clock_width = clock_width.min(width);
        let text = TextScroller::new(Region::new(0, 0, width - clock_width, font.height + 1), font);
        // One blank column separates the clock from the message
        let clock = Clock::new(
            Region::new(width - clock_width + 1, 0, clock_width - 1, clock_font.height + 1),
            clock_font,
        );
        Self {
            text,
            sidebar: Sidebar::Clock(clock),
        }
    }

    fn with_life(width: u16, height: u16, life_width: u16, font: Font) -> Self {
        let text = TextScroller::new(Region::new(0, 0, width - life_width - 1, font.height + 1), font);
        let life = Life::new(Region::new(width - life_width, 0, life_width, height));
        Self {
            text,
            sidebar: Sidebar::Life(life),
        }
    }

    pub const fn text(&self) -> &TextScroller {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut TextScroller {
        &mut self.text
    }

    pub const fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn sidebar_mut(&mut self) -> &mut Sidebar {
        &mut self.sidebar
    }

    pub const fn clock(&self) -> Option<&Clock> {
        match &self.sidebar {
            Sidebar::Clock(clock) => Some(clock),
            _ => None,
        }
    }

    pub const fn life(&self) -> Option<&Life> {
        match &self.sidebar {
            Sidebar::Life(life) => Some(life),
            _ => None,
        }
    }

    /// Give the message the full width, starting over with an empty message
    pub fn remove_sidebar(&mut self, display: &DisplayManager) {
        let mut text = TextScroller::new(Region::new(0, 0, display.width(), self.text.font().height + 1), self.text.font());
        text.set_color(self.text.color());
        self.text = text;
        self.sidebar = Sidebar::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_layout_regions() {
        let display = DisplayManager::new(96, 8);
        let layout = Layout::new(&display, SidebarKind::Clock, 32);

        assert_eq!(layout.text().region(), Region::new(0, 0, 64, TEXT_FONT.height + 1));
        let clock = layout.clock().unwrap();
        assert_eq!(clock.region(), Region::new(65, 0, 31, CLOCK_FONT.height + 1));
    }

    #[test]
    fn test_life_layout_regions() {
        let display = DisplayManager::new(96, 8);
        let layout = Layout::new(&display, SidebarKind::Life, 16);

        assert_eq!(layout.text().region().width, 96 - 16 - 1);
        assert_eq!(layout.life().unwrap().region(), Region::new(80, 0, 16, 8));
    }

    #[test]
    fn test_zero_width_sidebar_is_text_only() {
        let display = DisplayManager::new(96, 8);
        for kind in [SidebarKind::Clock, SidebarKind::Life, SidebarKind::None] {
            let layout = Layout::new(&display, kind, 0);
            assert!(matches!(layout.sidebar(), Sidebar::None));
            assert_eq!(layout.text().region().width, 96);
        }
    }

    #[test]
    fn test_remove_sidebar() {
        let display = DisplayManager::new(96, 8);
        let mut layout = Layout::new(&display, SidebarKind::Clock, 32);
        layout.remove_sidebar(&display);
        assert!(layout.clock().is_none());
        assert_eq!(layout.text().region().width, 96);
    }
}
