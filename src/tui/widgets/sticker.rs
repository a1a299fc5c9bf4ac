//! Half-block image widget.
//!
//! Each terminal cell shows two vertical pixels: the upper one as the
//! foreground of `▀`, the lower one as the background. The image is scaled to
//! fit the area with its aspect ratio preserved and centered.

use image::{imageops, imageops::FilterType, Rgba, RgbaImage};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::tui::theme;

const UPPER_HALF: &str = "▀";

pub struct StickerWidget<'a> {
    image: &'a RgbaImage,
    background: (u8, u8, u8),
}

impl<'a> StickerWidget<'a> {
    pub fn new(image: &'a RgbaImage) -> Self {
        let background = match theme::BG_BASE {
            Color::Rgb(r, g, b) => (r, g, b),
            _ => (0, 0, 0),
        };
        Self { image, background }
    }

    /// Color transparent pixels are blended onto.
    pub fn background(mut self, r: u8, g: u8, b: u8) -> Self {
        self.background = (r, g, b);
        self
    }

    fn composite(&self, pixel: &Rgba<u8>) -> Color {
        let alpha = pixel[3] as f32 / 255.0;
        let (br, bg, bb) = self.background;
        let mix = |c: u8, back: u8| (c as f32 * alpha + back as f32 * (1.0 - alpha)).round() as u8;
        Color::Rgb(mix(pixel[0], br), mix(pixel[1], bg), mix(pixel[2], bb))
    }
}

/// Pixel size that fits `(width, height)` into `cols` x `rows` half-block
/// cells while keeping the aspect ratio.
pub fn fit_dimensions(width: u32, height: u32, cols: u16, rows: u16) -> (u32, u32) {
    let max_w = cols as u32;
    let max_h = rows as u32 * 2;
    if width == 0 || height == 0 || max_w == 0 || max_h == 0 {
        return (0, 0);
    }
    let scale = (max_w as f32 / width as f32).min(max_h as f32 / height as f32);
    let w = ((width as f32 * scale).floor() as u32).clamp(1, max_w);
    let h = ((height as f32 * scale).floor() as u32).clamp(1, max_h);
    (w, h)
}

impl Widget for StickerWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (w, h) = fit_dimensions(self.image.width(), self.image.height(), area.width, area.height);
        if w == 0 || h == 0 {
            return;
        }

        let scaled = if (w, h) == self.image.dimensions() {
            self.image.clone()
        } else {
            imageops::resize(self.image, w, h, FilterType::Triangle)
        };

        let cell_rows = h.div_ceil(2) as u16;
        let x0 = area.x + (area.width - w as u16) / 2;
        let y0 = area.y + (area.height - cell_rows) / 2;

        for row in 0..cell_rows {
            for col in 0..w as u16 {
                let top = scaled.get_pixel(col as u32, row as u32 * 2);
                let bottom_y = row as u32 * 2 + 1;
                let bottom = if bottom_y < h {
                    self.composite(scaled.get_pixel(col as u32, bottom_y))
                } else {
                    self.composite(&Rgba([0, 0, 0, 0]))
                };

                if let Some(cell) = buf.cell_mut((x0 + col, y0 + row)) {
                    cell.set_symbol(UPPER_HALF)
                        .set_style(Style::default().fg(self.composite(top)).bg(bottom));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_square_into_wide_area() {
        // 10 rows = 20 pixels tall, width limited by height
        assert_eq!(fit_dimensions(100, 100, 80, 10), (20, 20));
    }

    #[test]
    fn test_fit_wide_image_into_narrow_area() {
        assert_eq!(fit_dimensions(200, 100, 10, 20), (10, 5));
    }

    #[test]
    fn test_fit_empty_area() {
        assert_eq!(fit_dimensions(10, 10, 0, 5), (0, 0));
    }

    #[test]
    fn test_renders_half_blocks_with_colors() {
        let mut image = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        image.put_pixel(0, 1, Rgba([0, 0, 255, 255]));

        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        StickerWidget::new(&image).render(area, &mut buf);

        let cell = buf.cell((0, 0)).unwrap();
        assert_eq!(cell.symbol(), UPPER_HALF);
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn test_transparent_pixels_use_background() {
        let image = RgbaImage::from_pixel(1, 2, Rgba([255, 255, 255, 0]));
        let area = Rect::new(0, 0, 1, 1);
        let mut buf = Buffer::empty(area);
        StickerWidget::new(&image)
            .background(10, 20, 30)
            .render(area, &mut buf);

        assert_eq!(buf.cell((0, 0)).unwrap().fg, Color::Rgb(10, 20, 30));
    }

    #[test]
    fn test_image_is_centered() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255]));
        let area = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);
        StickerWidget::new(&image).render(area, &mut buf);

        // 4x4 pixels -> 4 columns x 2 rows, offset (10 - 4) / 2 = 3
        assert_eq!(buf.cell((2, 0)).unwrap().symbol(), " ");
        assert_eq!(buf.cell((3, 0)).unwrap().symbol(), UPPER_HALF);
        assert_eq!(buf.cell((6, 1)).unwrap().symbol(), UPPER_HALF);
        assert_eq!(buf.cell((7, 1)).unwrap().symbol(), " ");
    }
}
