//! Bundled demo host: a palette-cycled backdrop and a movable block.
//!
//! Arrows or WASD move the block while held, Escape exits cleanly. The demo is
//! what the binary runs when no other game is linked in, and it exercises the
//! whole pipeline: held keys, palette changes and full-raster redraws.

use crate::frame::IndexedFrame;
use crate::host::{ExitStatus, GameHost, StepStatus};
use crate::types::{FrameView, KeyCode, SOURCE_HEIGHT, SOURCE_WIDTH};

/// Palette indices `1..=GRADIENT_LEN` hold the cycling gradient.
const GRADIENT_LEN: u8 = 128;
const BLOCK_COLOR: u8 = 255;
const BORDER_COLOR: u8 = 254;
const BLOCK_SIZE: usize = 12;
const BLOCK_SPEED: usize = 3;

#[derive(Debug, Default, Clone, Copy)]
struct Held {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl Held {
    fn slot(&mut self, key: KeyCode) -> Option<&mut bool> {
        match key {
            KeyCode::Up | KeyCode::Char(b'w') => Some(&mut self.up),
            KeyCode::Down | KeyCode::Char(b's') => Some(&mut self.down),
            KeyCode::Left | KeyCode::Char(b'a') => Some(&mut self.left),
            KeyCode::Right | KeyCode::Char(b'd') => Some(&mut self.right),
            _ => None,
        }
    }
}

pub struct DemoHost {
    frame: IndexedFrame,
    held: Held,
    block_x: usize,
    block_y: usize,
    ticks: u64,
    /// Rotate the gradient once every this many ticks; 0 freezes it.
    cycle_every: u64,
    quit: bool,
}

impl Default for DemoHost {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoHost {
    pub fn new() -> Self {
        let mut frame = IndexedFrame::new();
        for i in 0..GRADIENT_LEN {
            frame.set_color(i + 1, gradient_channel(i, 0), gradient_channel(i, 43), gradient_channel(i, 86));
        }
        frame.set_color(BORDER_COLOR, 96, 96, 96);
        frame.set_color(BLOCK_COLOR, 255, 255, 255);

        let mut host = Self {
            frame,
            held: Held::default(),
            block_x: (SOURCE_WIDTH - BLOCK_SIZE) / 2,
            block_y: (SOURCE_HEIGHT - BLOCK_SIZE) / 2,
            ticks: 0,
            cycle_every: 2,
            quit: false,
        };
        host.draw();
        host
    }

    pub fn with_cycle_every(mut self, ticks: u64) -> Self {
        self.cycle_every = ticks;
        self
    }

    /// Top-left corner of the block.
    pub fn block_position(&self) -> (usize, usize) {
        (self.block_x, self.block_y)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn advance_block(&mut self) {
        let max_x = SOURCE_WIDTH - BLOCK_SIZE - 1;
        let max_y = SOURCE_HEIGHT - BLOCK_SIZE - 1;
        if self.held.left {
            self.block_x = self.block_x.saturating_sub(BLOCK_SPEED).max(1);
        }
        if self.held.right {
            self.block_x = (self.block_x + BLOCK_SPEED).min(max_x);
        }
        if self.held.up {
            self.block_y = self.block_y.saturating_sub(BLOCK_SPEED).max(1);
        }
        if self.held.down {
            self.block_y = (self.block_y + BLOCK_SPEED).min(max_y);
        }
    }

    fn draw(&mut self) {
        for y in 0..SOURCE_HEIGHT {
            for x in 0..SOURCE_WIDTH {
                self.frame.set(x, y, backdrop(x, y));
            }
        }
        self.frame.fill_rect(0, 0, SOURCE_WIDTH, 1, BORDER_COLOR);
        self.frame.fill_rect(0, SOURCE_HEIGHT - 1, SOURCE_WIDTH, 1, BORDER_COLOR);
        self.frame.fill_rect(0, 0, 1, SOURCE_HEIGHT, BORDER_COLOR);
        self.frame.fill_rect(SOURCE_WIDTH - 1, 0, 1, SOURCE_HEIGHT, BORDER_COLOR);
        self.frame
            .fill_rect(self.block_x, self.block_y, BLOCK_SIZE, BLOCK_SIZE, BLOCK_COLOR);
    }
}

impl GameHost for DemoHost {
    fn key_down(&mut self, key: KeyCode) {
        if key == KeyCode::Escape {
            self.quit = true;
            return;
        }
        if let Some(slot) = self.held.slot(key) {
            *slot = true;
        }
    }

    fn key_up(&mut self, key: KeyCode) {
        if let Some(slot) = self.held.slot(key) {
            *slot = false;
        }
    }

    fn step(&mut self) -> StepStatus {
        if self.quit {
            return StepStatus::Exited(ExitStatus::clean());
        }

        self.ticks += 1;
        if self.cycle_every != 0 && self.ticks % self.cycle_every == 0 {
            self.frame.cycle_colors(1, GRADIENT_LEN);
        }
        self.advance_block();
        self.draw();
        StepStatus::Running
    }

    fn frame(&self) -> FrameView<'_> {
        self.frame.view()
    }
}

/// Diagonal bands over the gradient range.
fn backdrop(x: usize, y: usize) -> u8 {
    let band = (x / 2 + y + (x ^ y) / 8) % GRADIENT_LEN as usize;
    band as u8 + 1
}

/// Triangle wave over the gradient, shifted per channel.
fn gradient_channel(i: u8, shift: u8) -> u8 {
    let t = (i as u16 + shift as u16) % GRADIENT_LEN as u16;
    let half = GRADIENT_LEN as u16 / 2;
    let v = if t < half { t } else { GRADIENT_LEN as u16 - t };
    (v * 255 / half) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(host: &mut DemoHost, ticks: usize) {
        for _ in 0..ticks {
            assert_eq!(host.step(), StepStatus::Running);
        }
    }

    #[test]
    fn block_moves_only_while_key_is_held() {
        let mut host = DemoHost::new();
        let (x0, y0) = host.block_position();

        host.key_down(KeyCode::Right);
        run(&mut host, 2);
        assert_eq!(host.block_position(), (x0 + 2 * BLOCK_SPEED, y0));

        host.key_up(KeyCode::Right);
        run(&mut host, 2);
        assert_eq!(host.block_position(), (x0 + 2 * BLOCK_SPEED, y0));
    }

    #[test]
    fn wasd_mirrors_arrows() {
        let mut host = DemoHost::new();
        let (x0, y0) = host.block_position();
        host.key_down(KeyCode::Char(b'w'));
        host.key_down(KeyCode::Char(b'a'));
        run(&mut host, 1);
        assert_eq!(host.block_position(), (x0 - BLOCK_SPEED, y0 - BLOCK_SPEED));
    }

    #[test]
    fn block_stays_inside_border() {
        let mut host = DemoHost::new();
        host.key_down(KeyCode::Left);
        host.key_down(KeyCode::Up);
        run(&mut host, 200);
        assert_eq!(host.block_position(), (1, 1));
        assert_eq!(host.frame().index_at(0, 0), BORDER_COLOR);
        assert_eq!(host.frame().index_at(1, 1), BLOCK_COLOR);

        host.key_up(KeyCode::Left);
        host.key_up(KeyCode::Up);
        host.key_down(KeyCode::Right);
        host.key_down(KeyCode::Down);
        run(&mut host, 200);
        assert_eq!(
            host.block_position(),
            (SOURCE_WIDTH - BLOCK_SIZE - 1, SOURCE_HEIGHT - BLOCK_SIZE - 1)
        );
    }

    #[test]
    fn escape_exits_cleanly_on_next_step() {
        let mut host = DemoHost::new();
        run(&mut host, 1);
        host.key_down(KeyCode::Escape);
        assert_eq!(host.step(), StepStatus::Exited(ExitStatus::clean()));
    }

    #[test]
    fn gradient_cycles_on_schedule() {
        let mut host = DemoHost::new().with_cycle_every(2);
        let before = host.frame().rgb(1);
        run(&mut host, 1);
        assert_eq!(host.frame().rgb(1), before);
        run(&mut host, 1);
        assert_eq!(host.ticks(), 2);
        assert_eq!(host.frame().rgb(GRADIENT_LEN), before);

        let mut frozen = DemoHost::new().with_cycle_every(0);
        let before = frozen.frame().rgb(1);
        run(&mut frozen, 10);
        assert_eq!(frozen.frame().rgb(1), before);
    }

    #[test]
    fn backdrop_stays_in_gradient_range() {
        for y in 0..SOURCE_HEIGHT {
            for x in 0..SOURCE_WIDTH {
                let i = backdrop(x, y);
                assert!((1..=GRADIENT_LEN).contains(&i));
            }
        }
    }
}
