//! Sixel frame encoder.
//!
//! Each 6-row band of the source raster is emitted once per palette color that
//! appears in it. Within a color pass, every column contributes a 6-bit mask;
//! horizontal scaling is done with repeat counts and vertical scaling with the
//! raster aspect ratio, so the work per frame does not depend on the scale.
//!
//! Palette index `i` is addressed as color register `(i + 1) % 256`, both in
//! the palette declarations and in color selection, which keeps register 0 for
//! the last palette entry.

use tracing::{debug, warn};

use crate::types::{FrameView, PALETTE_BYTES, PALETTE_SIZE, SOURCE_HEIGHT, SOURCE_WIDTH};

/// Rows packed into one sixel character.
pub const BAND_HEIGHT: usize = 6;

/// Output bytes reserved per unit of scale.
///
/// This is an empirical estimate, far above what typical frames need.
pub const BUFFER_BYTES_PER_SCALE: usize = 500_000;

/// `ESC P ; 1 q`: sixel introducer with transparent background.
const INTRODUCER: &[u8] = b"\x1bP;1q";
const TERMINATOR: &[u8] = b"\x1b\\";

/// 0-255 component to 0-100 percent, rounded.
const PERCENT: [u8; 256] = percent_table();

const fn percent_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = ((i * 100 + 128) / 255) as u8;
        i += 1;
    }
    table
}

/// Color register used for palette index `index`.
#[inline(always)]
pub fn color_register(index: usize) -> usize {
    (index + 1) % PALETTE_SIZE
}

/// Encodes frames into one reusable buffer.
#[derive(Debug, Clone)]
pub struct SixelEncoder {
    scale: usize,
    xindent: usize,
    yindent: usize,
    padding_lines: usize,
    palette: [u8; PALETTE_BYTES],
    palette_initialized: bool,
    buf: Vec<u8>,
    reserved: usize,
}

impl SixelEncoder {
    pub fn new(screen_height: u32, screen_width: u32) -> Self {
        let mut encoder = Self {
            scale: 1,
            xindent: 0,
            yindent: 0,
            padding_lines: 0,
            palette: [0; PALETTE_BYTES],
            palette_initialized: false,
            buf: Vec::new(),
            reserved: 0,
        };
        encoder.configure(screen_height, screen_width);
        encoder
    }

    /// Fit the source raster into a screen of the given pixel size.
    pub fn configure(&mut self, screen_height: u32, screen_width: u32) {
        let height = screen_height as usize;
        let width = screen_width as usize;

        self.scale = (height / SOURCE_HEIGHT).min(width / SOURCE_WIDTH).max(1);
        self.xindent = width.saturating_sub(SOURCE_WIDTH * self.scale) / 2;
        self.yindent = height.saturating_sub(SOURCE_HEIGHT * self.scale) / 2;
        self.padding_lines = self.yindent / (BAND_HEIGHT * self.scale);

        self.reserved = BUFFER_BYTES_PER_SCALE * self.scale;
        self.buf.reserve(self.reserved.saturating_sub(self.buf.len()));

        debug!(
            scale = self.scale,
            xindent = self.xindent,
            yindent = self.yindent,
            "sixel geometry"
        );
    }

    pub fn scale(&self) -> usize {
        self.scale
    }

    pub fn xindent(&self) -> usize {
        self.xindent
    }

    pub fn yindent(&self) -> usize {
        self.yindent
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Encode one frame and return the complete escape sequence.
    ///
    /// The returned slice borrows the internal buffer and is valid until the
    /// next call.
    pub fn encode(&mut self, frame: FrameView<'_>) -> &[u8] {
        self.buf.clear();

        let emit_palette = !self.palette_initialized || self.palette != *frame.palette;
        self.palette = *frame.palette;
        self.palette_initialized = true;

        let mut w = SixelWriter::new(&mut self.buf);
        w.raw(INTRODUCER);
        // Pixel aspect ratio scale:1 stretches every sixel vertically.
        w.control(b'"');
        w.decimal(self.scale);
        w.raw(b";1");
        for _ in 0..self.padding_lines {
            w.control(b'-');
        }
        if emit_palette {
            debug!("palette changed");
            encode_palette(&mut w, frame.palette);
        }

        let left_margin = -(self.xindent as isize);
        let scale = self.scale;
        for (band, y0) in (0..SOURCE_HEIGHT).step_by(BAND_HEIGHT).enumerate() {
            if band > 0 {
                w.control(b'-');
            }
            let rows = BAND_HEIGHT.min(SOURCE_HEIGHT - y0);
            let band_pixels = &frame.pixels[y0 * SOURCE_WIDTH..(y0 + rows) * SOURCE_WIDTH];

            let mut present = [false; PALETTE_SIZE];
            for &index in band_pixels {
                present[index as usize] = true;
            }

            let mut last_x = left_margin;
            for color in (0..PALETTE_SIZE).filter(|&c| present[c]) {
                let index = color as u8;
                let mut selected = false;

                for x in 0..SOURCE_WIDTH {
                    let mut mask = 0u8;
                    for row in 0..rows {
                        if band_pixels[row * SOURCE_WIDTH + x] == index {
                            mask |= 1 << row;
                        }
                    }
                    if mask == 0 {
                        continue;
                    }

                    let scaled_x = (x * scale) as isize;
                    if !selected {
                        selected = true;
                        if scaled_x < last_x {
                            w.control(b'$');
                            last_x = left_margin;
                        }
                        w.control(b'#');
                        w.decimal(color_register(color));
                    }
                    w.sixel(0, (scaled_x - last_x) as usize);
                    w.sixel(mask, scale);
                    last_x = scaled_x + scale as isize;
                }
            }
        }

        w.raw(TERMINATOR);

        if self.buf.capacity() > self.reserved {
            warn!(
                len = self.buf.len(),
                reserved = self.reserved,
                "sixel frame exceeded the reserved buffer"
            );
            self.reserved = self.buf.capacity();
        }

        &self.buf
    }
}

fn encode_palette(w: &mut SixelWriter<'_>, palette: &[u8; PALETTE_BYTES]) {
    for index in 0..PALETTE_SIZE {
        let rgb = &palette[index * 3..index * 3 + 3];
        w.control(b'#');
        w.decimal(color_register(index));
        w.raw(b";2;");
        w.decimal(PERCENT[rgb[0] as usize] as usize);
        w.raw(b";");
        w.decimal(PERCENT[rgb[1] as usize] as usize);
        w.raw(b";");
        w.decimal(PERCENT[rgb[2] as usize] as usize);
    }
}

/// Appends sixel tokens, merging adjacent runs of the same character.
struct SixelWriter<'a> {
    out: &'a mut Vec<u8>,
    pending: Option<(u8, usize)>,
}

impl<'a> SixelWriter<'a> {
    fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out, pending: None }
    }

    /// Queue `count` copies of the sixel with bit pattern `mask`.
    fn sixel(&mut self, mask: u8, count: usize) {
        if count == 0 {
            return;
        }
        let ch = b'?' + mask;
        match &mut self.pending {
            Some((pending, n)) if *pending == ch => *n += count,
            _ => {
                self.flush_run();
                self.pending = Some((ch, count));
            }
        }
    }

    fn flush_run(&mut self) {
        let Some((ch, count)) = self.pending.take() else {
            return;
        };
        // Short runs are cheaper as literals than as `!count`.
        if count <= 3 {
            for _ in 0..count {
                self.out.push(ch);
            }
        } else {
            self.out.push(b'!');
            push_decimal(self.out, count);
            self.out.push(ch);
        }
    }

    fn control(&mut self, byte: u8) {
        self.flush_run();
        self.out.push(byte);
    }

    fn decimal(&mut self, n: usize) {
        self.flush_run();
        push_decimal(self.out, n);
    }

    fn raw(&mut self, bytes: &[u8]) {
        self.flush_run();
        self.out.extend_from_slice(bytes);
    }
}

fn push_decimal(out: &mut Vec<u8>, mut n: usize) {
    let mut digits = [0u8; 20];
    let mut i = digits.len();
    loop {
        i -= 1;
        digits[i] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    out.extend_from_slice(&digits[i..]);
}
