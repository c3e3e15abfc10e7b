//! Conway's Game of Life as a sidebar animation
//!
//! Cells store an age: `LIVE` for living cells, counting down to 0 after
//! death so that dead cells fade out. The board reseeds itself when it stops
//! changing, falls into a short cycle, or has run for `MAX_ROUNDS`.

use marquee_protocol::Rgb;
use rand::Rng;

use crate::display::{DisplayManager, Region};

pub const LIVE: u8 = 9;
pub const MAX_ROUNDS: u32 = 200;
pub const SEED_DENSITY: f64 = 0.3;

/// Colors a freshly seeded board may use for its living cells
const LIVE_COLORS: [Rgb; 8] = [
    Rgb::new(0x00, 0xff, 0x00),
    Rgb::new(0x00, 0x00, 0xff),
    Rgb::new(0xff, 0x00, 0x00),
    Rgb::new(0xb8, 0xe9, 0x86),
    Rgb::new(0xf8, 0xb7, 0x00),
    Rgb::new(0x50, 0xe3, 0xc2),
    Rgb::new(0xfe, 0x13, 0xd4),
    Rgb::new(0x90, 0x13, 0xfe),
];

/// Ages 1..=8, oldest first
const FADE_PALETTE: [Rgb; 8] = [
    Rgb::new(52, 41, 51),
    Rgb::new(68, 50, 58),
    Rgb::new(83, 60, 63),
    Rgb::new(96, 71, 67),
    Rgb::new(106, 84, 71),
    Rgb::new(114, 98, 77),
    Rgb::new(118, 113, 87),
    Rgb::new(119, 128, 100),
];

/// `[x][y]` with a permanently dead one-cell border
type Board = Vec<Vec<u8>>;

pub struct Life {
    region: Region,
    /// Current generation first, then the three before it
    history: [Board; 4],
    rounds: u32,
    live_color: Rgb,
}

impl Life {
    /// An empty board; call `seed` to populate it
    pub fn new(region: Region) -> Self {
        let empty = Self::blank(region);
        Self {
            region,
            history: [empty.clone(), empty.clone(), empty.clone(), empty],
            rounds: 0,
            live_color: LIVE_COLORS[0],
        }
    }

    fn blank(region: Region) -> Board {
        vec![vec![0; usize::from(region.height) + 2]; usize::from(region.width) + 2]
    }

    pub const fn region(&self) -> Region {
        self.region
    }

    pub const fn rounds(&self) -> u32 {
        self.rounds
    }

    pub const fn live_color(&self) -> Rgb {
        self.live_color
    }

    /// Age of the cell at region coordinates
    pub fn age(&self, x: u16, y: u16) -> u8 {
        self.history[0][usize::from(x) + 1][usize::from(y) + 1]
    }

    pub fn set_alive(&mut self, x: u16, y: u16) {
        if x < self.region.width && y < self.region.height {
            self.history[0][usize::from(x) + 1][usize::from(y) + 1] = LIVE;
        }
    }

    pub fn live_count(&self) -> usize {
        self.history[0].iter().flatten().filter(|&&c| c == LIVE).count()
    }

    /// Fresh random board; each cell lives with probability `density`
    pub fn seed<R: Rng>(&mut self, rng: &mut R, density: f64) {
        let mut board = Self::blank(self.region);
        for column in board.iter_mut().skip(1).take(usize::from(self.region.width)) {
            for cell in column.iter_mut().skip(1).take(usize::from(self.region.height)) {
                if rng.gen_bool(density) {
                    *cell = LIVE;
                }
            }
        }
        self.history[0] = board;
        self.rounds = 0;
        self.live_color = LIVE_COLORS[rng.gen_range(0..LIVE_COLORS.len())];
    }

    /// Compute the next generation, reseeding when the board has gone stale
    pub fn evolve<R: Rng>(&mut self, rng: &mut R) {
        self.history.rotate_right(1);
        let prev = &self.history[1];
        let mut next = Self::blank(self.region);

        for x in 1..=usize::from(self.region.width) {
            for y in 1..=usize::from(self.region.height) {
                let neighbors = [
                    (x - 1, y - 1),
                    (x, y - 1),
                    (x + 1, y - 1),
                    (x - 1, y),
                    (x + 1, y),
                    (x - 1, y + 1),
                    (x, y + 1),
                    (x + 1, y + 1),
                ]
                .iter()
                .filter(|&&(nx, ny)| prev[nx][ny] == LIVE)
                .count();

                let cell = prev[x][y];
                let survives = if cell == LIVE {
                    neighbors == 2 || neighbors == 3
                } else {
                    neighbors == 3
                };
                next[x][y] = if survives { LIVE } else { cell.saturating_sub(1) };
            }
        }

        self.history[0] = next;

        let repeated = self.history[1..].iter().any(|old| *old == self.history[0]);
        if repeated {
            self.seed(rng, SEED_DENSITY);
            return;
        }
        self.rounds += 1;
        if self.rounds > MAX_ROUNDS {
            self.seed(rng, SEED_DENSITY);
        }
    }

    fn color_of(&self, age: u8) -> Rgb {
        match age {
            0 => Rgb::BLACK,
            LIVE => self.live_color,
            a => FADE_PALETTE[usize::from(a) - 1],
        }
    }

    pub fn render(&self, display: &mut DisplayManager) {
        for x in 0..self.region.width {
            for y in 0..self.region.height {
                let color = self.color_of(self.age(x, y));
                display.set_pixel(self.region.x + x, self.region.y + y, color);
            }
        }
    }

    pub fn animate<R: Rng>(&mut self, rng: &mut R, display: &mut DisplayManager) {
        self.evolve(rng);
        self.render(display);
    }
}
