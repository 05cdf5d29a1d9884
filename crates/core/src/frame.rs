//! Owned indexed-color framebuffer for game hosts.

use crate::types::{FrameView, PALETTE_BYTES, PALETTE_SIZE, SOURCE_HEIGHT, SOURCE_WIDTH};

/// Number of pixels in the source raster.
pub const FRAME_PIXELS: usize = SOURCE_WIDTH * SOURCE_HEIGHT;

/// 320x200 indexed raster plus its 256-entry palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFrame {
    pixels: Box<[u8; FRAME_PIXELS]>,
    palette: Box<[u8; PALETTE_BYTES]>,
}

impl Default for IndexedFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexedFrame {
    pub fn new() -> Self {
        Self {
            pixels: Box::new([0; FRAME_PIXELS]),
            palette: Box::new([0; PALETTE_BYTES]),
        }
    }

    /// Borrow the frame for one render call.
    pub fn view(&self) -> FrameView<'_> {
        FrameView::new(&self.pixels, &self.palette)
    }

    pub fn pixels(&self) -> &[u8; FRAME_PIXELS] {
        &self.pixels
    }

    pub fn palette(&self) -> &[u8; PALETTE_BYTES] {
        &self.palette
    }

    #[inline(always)]
    fn idx(x: usize, y: usize) -> Option<usize> {
        if x >= SOURCE_WIDTH || y >= SOURCE_HEIGHT {
            return None;
        }
        Some(y * SOURCE_WIDTH + x)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        Self::idx(x, y).map(|i| self.pixels[i])
    }

    pub fn set(&mut self, x: usize, y: usize, index: u8) {
        if let Some(i) = Self::idx(x, y) {
            self.pixels[i] = index;
        }
    }

    pub fn clear(&mut self, index: u8) {
        self.pixels.fill(index);
    }

    /// Fill a rectangle, clipped to the raster.
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, index: u8) {
        let x_end = x.saturating_add(w).min(SOURCE_WIDTH);
        let y_end = y.saturating_add(h).min(SOURCE_HEIGHT);
        for row in y.min(y_end)..y_end {
            let start = row * SOURCE_WIDTH;
            self.pixels[start + x.min(x_end)..start + x_end].fill(index);
        }
    }

    pub fn set_color(&mut self, index: u8, r: u8, g: u8, b: u8) {
        let i = index as usize * 3;
        self.palette[i] = r;
        self.palette[i + 1] = g;
        self.palette[i + 2] = b;
    }

    pub fn color(&self, index: u8) -> (u8, u8, u8) {
        self.view().rgb(index)
    }

    /// Rotate palette entries `first..=last` by one step.
    pub fn cycle_colors(&mut self, first: u8, last: u8) {
        if first >= last || last as usize >= PALETTE_SIZE {
            return;
        }
        let range = first as usize * 3..(last as usize + 1) * 3;
        self.palette[range].rotate_left(3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_are_bounds_checked() {
        let mut f = IndexedFrame::new();
        f.set(3, 4, 9);
        assert_eq!(f.get(3, 4), Some(9));
        f.set(SOURCE_WIDTH, 0, 1);
        assert_eq!(f.get(SOURCE_WIDTH, 0), None);
    }

    #[test]
    fn fill_rect_clips_to_raster() {
        let mut f = IndexedFrame::new();
        f.fill_rect(SOURCE_WIDTH - 2, SOURCE_HEIGHT - 2, 10, 10, 7);
        assert_eq!(f.get(SOURCE_WIDTH - 1, SOURCE_HEIGHT - 1), Some(7));
        assert_eq!(f.get(SOURCE_WIDTH - 3, SOURCE_HEIGHT - 1), Some(0));
        assert_eq!(f.pixels().iter().filter(|&&p| p == 7).count(), 4);
    }

    #[test]
    fn cycle_colors_rotates_range() {
        let mut f = IndexedFrame::new();
        f.set_color(1, 10, 0, 0);
        f.set_color(2, 20, 0, 0);
        f.set_color(3, 30, 0, 0);
        f.cycle_colors(1, 3);
        assert_eq!(f.color(1), (20, 0, 0));
        assert_eq!(f.color(2), (30, 0, 0));
        assert_eq!(f.color(3), (10, 0, 0));
    }
}
