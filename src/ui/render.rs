//! Software drawing into the softbuffer frame: scaled image blit, filled
//! rectangles and a 5x7 bitmap font for overlays.

pub const BG_COLOR: u32 = 0x001F1F1F;

pub type Rgba = (u8, u8, u8, u8);

// 5x7 bitmap font covering ASCII 32..127, four glyphs per line. Each glyph is
// 5 columns packed into 5 bytes (LSB = top row).
static FONT_5X7: [[u8; 5]; 96] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], [0x00, 0x00, 0x5F, 0x00, 0x00], [0x00, 0x07, 0x00, 0x07, 0x00], [0x14, 0x7F, 0x14, 0x7F, 0x14],
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], [0x23, 0x13, 0x08, 0x64, 0x62], [0x36, 0x49, 0x55, 0x22, 0x50], [0x00, 0x05, 0x03, 0x00, 0x00],
    [0x00, 0x1C, 0x22, 0x41, 0x00], [0x00, 0x41, 0x22, 0x1C, 0x00], [0x14, 0x08, 0x3E, 0x08, 0x14], [0x08, 0x08, 0x3E, 0x08, 0x08],
    [0x00, 0x50, 0x30, 0x00, 0x00], [0x08, 0x08, 0x08, 0x08, 0x08], [0x00, 0x60, 0x60, 0x00, 0x00], [0x20, 0x10, 0x08, 0x04, 0x02],
    [0x3E, 0x51, 0x49, 0x45, 0x3E], [0x00, 0x42, 0x7F, 0x40, 0x00], [0x42, 0x61, 0x51, 0x49, 0x46], [0x21, 0x41, 0x45, 0x4B, 0x31],
    [0x18, 0x14, 0x12, 0x7F, 0x10], [0x27, 0x45, 0x45, 0x45, 0x39], [0x3C, 0x4A, 0x49, 0x49, 0x30], [0x01, 0x71, 0x09, 0x05, 0x03],
    [0x36, 0x49, 0x49, 0x49, 0x36], [0x06, 0x49, 0x49, 0x29, 0x1E], [0x00, 0x36, 0x36, 0x00, 0x00], [0x00, 0x56, 0x36, 0x00, 0x00],
    [0x08, 0x14, 0x22, 0x41, 0x00], [0x14, 0x14, 0x14, 0x14, 0x14], [0x00, 0x41, 0x22, 0x14, 0x08], [0x02, 0x01, 0x51, 0x09, 0x06],
    [0x3E, 0x41, 0x5D, 0x55, 0x1E], [0x7E, 0x11, 0x11, 0x11, 0x7E], [0x7F, 0x49, 0x49, 0x49, 0x36], [0x3E, 0x41, 0x41, 0x41, 0x22],
    [0x7F, 0x41, 0x41, 0x22, 0x1C], [0x7F, 0x49, 0x49, 0x49, 0x41], [0x7F, 0x09, 0x09, 0x09, 0x01], [0x3E, 0x41, 0x49, 0x49, 0x7A],
    [0x7F, 0x08, 0x08, 0x08, 0x7F], [0x00, 0x41, 0x7F, 0x41, 0x00], [0x20, 0x40, 0x41, 0x3F, 0x01], [0x7F, 0x08, 0x14, 0x22, 0x41],
    [0x7F, 0x40, 0x40, 0x40, 0x40], [0x7F, 0x02, 0x0C, 0x02, 0x7F], [0x7F, 0x04, 0x08, 0x10, 0x7F], [0x3E, 0x41, 0x41, 0x41, 0x3E],
    [0x7F, 0x09, 0x09, 0x09, 0x06], [0x3E, 0x41, 0x51, 0x21, 0x5E], [0x7F, 0x09, 0x19, 0x29, 0x46], [0x46, 0x49, 0x49, 0x49, 0x31],
    [0x01, 0x01, 0x7F, 0x01, 0x01], [0x3F, 0x40, 0x40, 0x40, 0x3F], [0x1F, 0x20, 0x40, 0x20, 0x1F], [0x3F, 0x40, 0x38, 0x40, 0x3F],
    [0x63, 0x14, 0x08, 0x14, 0x63], [0x07, 0x08, 0x70, 0x08, 0x07], [0x61, 0x51, 0x49, 0x45, 0x43], [0x00, 0x7F, 0x41, 0x41, 0x00],
    [0x02, 0x04, 0x08, 0x10, 0x20], [0x00, 0x41, 0x41, 0x7F, 0x00], [0x04, 0x02, 0x01, 0x02, 0x04], [0x40, 0x40, 0x40, 0x40, 0x40],
    [0x00, 0x01, 0x02, 0x04, 0x00], [0x20, 0x54, 0x54, 0x54, 0x78], [0x7F, 0x48, 0x44, 0x44, 0x38], [0x38, 0x44, 0x44, 0x44, 0x20],
    [0x38, 0x44, 0x44, 0x48, 0x7F], [0x38, 0x54, 0x54, 0x54, 0x18], [0x08, 0x7E, 0x09, 0x01, 0x02], [0x0C, 0x52, 0x52, 0x52, 0x3E],
    [0x7F, 0x08, 0x04, 0x04, 0x78], [0x00, 0x44, 0x7D, 0x40, 0x00], [0x20, 0x40, 0x44, 0x3D, 0x00], [0x7F, 0x10, 0x28, 0x44, 0x00],
    [0x00, 0x41, 0x7F, 0x40, 0x00], [0x7C, 0x04, 0x18, 0x04, 0x78], [0x7C, 0x08, 0x04, 0x04, 0x78], [0x38, 0x44, 0x44, 0x44, 0x38],
    [0x7C, 0x14, 0x14, 0x14, 0x08], [0x08, 0x14, 0x14, 0x18, 0x7C], [0x7C, 0x08, 0x04, 0x04, 0x08], [0x48, 0x54, 0x54, 0x54, 0x20],
    [0x04, 0x3F, 0x44, 0x40, 0x20], [0x3C, 0x40, 0x40, 0x20, 0x7C], [0x1C, 0x20, 0x40, 0x20, 0x1C], [0x3C, 0x40, 0x30, 0x40, 0x3C],
    [0x44, 0x28, 0x10, 0x28, 0x44], [0x0C, 0x50, 0x50, 0x50, 0x3C], [0x44, 0x64, 0x54, 0x4C, 0x44], [0x00, 0x08, 0x36, 0x41, 0x00],
    [0x00, 0x00, 0x7F, 0x00, 0x00], [0x00, 0x41, 0x36, 0x08, 0x00], [0x10, 0x08, 0x08, 0x10, 0x08], [0x00, 0x00, 0x00, 0x00, 0x00],
];

/// Pack RGB into softbuffer u32 format: 0x00RRGGBB.
pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

fn unpack_rgb(v: u32) -> (u8, u8, u8) {
    ((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

fn blend(dst: u32, color: Rgba) -> u32 {
    let a = color.3 as u32;
    let (dr, dg, db) = unpack_rgb(dst);
    let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a)) / 255) as u8;
    rgb(mix(color.0, dr), mix(color.1, dg), mix(color.2, db))
}

/// Mutable view of the framebuffer with its dimensions.
pub struct Frame<'a> {
    pub buf: &'a mut [u32],
    pub width: u32,
    pub height: u32,
}

impl<'a> Frame<'a> {
    pub fn new(buf: &'a mut [u32], width: u32, height: u32) -> Self {
        Self { buf, width, height }
    }

    pub fn clear(&mut self, color: u32) {
        self.buf.fill(color);
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let off = (y as u32 * self.width + x as u32) as usize;
        self.buf[off] = blend(self.buf[off], color);
    }

    fn draw_char(&mut self, ch: char, px: i32, py: i32, scale: u32, color: Rgba) {
        let idx = (ch as u32).wrapping_sub(32) as usize;
        let Some(glyph) = FONT_5X7.get(idx) else { return };
        for (col, bits) in glyph.iter().enumerate() {
            for row in 0..7u32 {
                if bits & (1 << row) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let x = px + (col as u32 * scale + sx) as i32;
                        let y = py + (row * scale + sy) as i32;
                        self.blend_pixel(x, y, color);
                    }
                }
            }
        }
    }

    /// Draw a string. Returns the x position after the last character.
    pub fn draw_text(&mut self, text: &str, px: i32, py: i32, scale: u32, color: Rgba) -> i32 {
        let mut x = px;
        for ch in text.chars() {
            self.draw_char(ch, x, py, scale, color);
            x += (6 * scale) as i32; // 5 pixels + 1 spacing
        }
        x
    }

    pub fn fill_rect(&mut self, rx: i32, ry: i32, rw: u32, rh: u32, color: Rgba) {
        for row in 0..rh as i32 {
            for col in 0..rw as i32 {
                self.blend_pixel(rx + col, ry + row, color);
            }
        }
    }

    /// Nearest-neighbour blit of an RGBA image whose top-left lands at
    /// `(x0, y0)` after scaling by `scale`.
    pub fn blit_scaled(&mut self, src: &[u8], src_w: u32, src_h: u32, x0: f64, y0: f64, scale: f64) {
        if scale <= 0.0 || src_w == 0 || src_h == 0 {
            return;
        }
        let draw_w = src_w as f64 * scale;
        let draw_h = src_h as f64 * scale;

        let dx_start = x0.max(0.0) as u32;
        let dy_start = y0.max(0.0) as u32;
        let dx_end = ((x0 + draw_w).ceil().max(0.0) as u32).min(self.width);
        let dy_end = ((y0 + draw_h).ceil().max(0.0) as u32).min(self.height);

        let inv_scale = 1.0 / scale;
        for dy in dy_start..dy_end {
            let sy = ((dy as f64 - y0) * inv_scale) as u32;
            if sy >= src_h {
                continue;
            }
            let row = dy as usize * self.width as usize;
            for dx in dx_start..dx_end {
                let sx = ((dx as f64 - x0) * inv_scale) as u32;
                if sx >= src_w {
                    continue;
                }
                let si = (sy as usize * src_w as usize + sx as usize) * 4;
                let Some(px) = src.get(si..si + 4) else { continue };
                let di = row + dx as usize;
                match px[3] {
                    255 => self.buf[di] = rgb(px[0], px[1], px[2]),
                    0 => {}
                    a => self.buf[di] = blend(self.buf[di], (px[0], px[1], px[2], a)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_packing() {
        assert_eq!(rgb(0x12, 0x34, 0x56), 0x00123456);
        assert_eq!(unpack_rgb(0x00123456), (0x12, 0x34, 0x56));
    }

    #[test]
    fn blit_doubles_pixels() {
        // 2x1 source: red, green
        let src = [255, 0, 0, 255, 0, 255, 0, 255];
        let mut buf = vec![0u32; 4 * 2];
        let mut frame = Frame::new(&mut buf, 4, 2);
        frame.blit_scaled(&src, 2, 1, 0.0, 0.0, 2.0);
        let red = rgb(255, 0, 0);
        let green = rgb(0, 255, 0);
        assert_eq!(buf, vec![red, red, green, green, red, red, green, green]);
    }

    #[test]
    fn blit_clips_negative_origin() {
        let src = [10, 20, 30, 255, 40, 50, 60, 255];
        let mut buf = vec![0u32; 2];
        let mut frame = Frame::new(&mut buf, 2, 1);
        frame.blit_scaled(&src, 2, 1, -1.0, 0.0, 1.0);
        assert_eq!(buf, vec![rgb(40, 50, 60), 0]);
    }

    #[test]
    fn text_stays_inside_frame() {
        let mut buf = vec![0u32; 10 * 10];
        let mut frame = Frame::new(&mut buf, 10, 10);
        let end = frame.draw_text("Hi!", 8, 8, 2, (255, 255, 255, 255));
        assert_eq!(end, 8 + 3 * 12);
        assert!(buf.iter().any(|&p| p != 0));
    }
}
