//! Single-line text rasterization.
//!
//! Glyphs are mapped through the font's charmap and laid out left to right by
//! advance width; no shaping or kerning is applied.

use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::Format;
use swash::FontRef;

use super::resources::Bitmap;
use crate::ui::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextError {
    InvalidFont,
    Empty,
}

pub fn render_line(font_data: &[u8], size: f32, text: &str, color: Color) -> Result<Bitmap, TextError> {
    let font = FontRef::from_index(font_data, 0).ok_or(TextError::InvalidFont)?;
    let metrics = font.metrics(&[]);
    if metrics.units_per_em == 0 {
        return Err(TextError::InvalidFont);
    }
    let scale = size / f32::from(metrics.units_per_em);
    let ascent = metrics.ascent * scale;
    let descent = metrics.descent.abs() * scale;

    let charmap = font.charmap();
    let glyph_metrics = font.glyph_metrics(&[]);
    let glyphs: Vec<(u16, f32)> = text
        .chars()
        .map(|ch| {
            let id = charmap.map(ch);
            (id, glyph_metrics.advance_width(id) * scale)
        })
        .collect();

    let width = glyphs.iter().map(|(_, advance)| advance).sum::<f32>().ceil() as u32;
    let height = (ascent + descent).ceil() as u32;
    if width == 0 || height == 0 {
        return Err(TextError::Empty);
    }

    let mut context = ScaleContext::new();
    let mut scaler = context.builder(font).size(size).hint(false).build();
    let mut render = Render::new(&[Source::Outline]);
    render.format(Format::Alpha);

    let mut bitmap = Bitmap::transparent(width, height);
    let baseline = ascent.round() as i32;
    let mut pen_x = 0.0f32;
    for (id, advance) in glyphs {
        if let Some(image) = render.render(&mut scaler, id) {
            let placement = image.placement;
            blit_coverage(
                &mut bitmap,
                &image.data,
                placement.width,
                placement.height,
                pen_x.round() as i32 + placement.left,
                baseline - placement.top,
                color,
            );
        }
        pen_x += advance;
    }
    Ok(bitmap)
}

/// Writes an 8-bit coverage mask in `color`, keeping the stronger alpha where
/// glyphs overlap. Pixels outside the bitmap are clipped.
pub(crate) fn blit_coverage(
    target: &mut Bitmap,
    coverage: &[u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    color: Color,
) {
    for row in 0..height as i32 {
        let ty = y + row;
        if ty < 0 || ty >= target.height as i32 {
            continue;
        }
        for col in 0..width as i32 {
            let tx = x + col;
            if tx < 0 || tx >= target.width as i32 {
                continue;
            }
            let src = coverage[(row * width as i32 + col) as usize];
            let alpha = (u16::from(src) * u16::from(color.a) / 255) as u8;
            let offset = ((ty as u32 * target.width + tx as u32) * 4) as usize;
            let pixel = &mut target.pixels[offset..offset + 4];
            if alpha > pixel[3] {
                pixel.copy_from_slice(&[color.r, color.g, color.b, alpha]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blit_clips_and_keeps_max_alpha() {
        let mut bitmap = Bitmap::transparent(3, 2);
        let mask = [255, 100, 50, 10];
        blit_coverage(&mut bitmap, &mask, 2, 2, 2, 0, Color::WHITE);
        // only the left column of the mask lands inside
        assert_eq!(&bitmap.pixels[8..12], &[255, 255, 255, 255]);
        assert_eq!(&bitmap.pixels[20..24], &[255, 255, 255, 50]);
        assert_eq!(bitmap.pixels[0..8], [0; 8]);

        blit_coverage(&mut bitmap, &[20], 1, 1, 2, 1, Color::WHITE);
        assert_eq!(bitmap.pixels[23], 50);
    }

    #[test]
    fn rejects_garbage_font() {
        let err = render_line(b"not a font", 70.0, "Hello", Color::WHITE).unwrap_err();
        assert_eq!(err, TextError::InvalidFont);
    }
}
