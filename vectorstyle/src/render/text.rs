//! Label rasterization with `ab_glyph`.

use std::path::Path;

use ab_glyph::{point, Font, FontVec, Glyph, PxScale, ScaleFont};
use tiny_skia::{Color, ColorU8, Pixmap};

use super::error::RenderError;

/// A single TrueType/OpenType face used for every label.
pub struct LabelFont {
    font: FontVec,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFont")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

/// Horizontal extent and line height of a laid-out label, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    pub height: f32,
    pub ascent: f32,
}

impl LabelFont {
    /// Parse font bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, RenderError> {
        let font = FontVec::try_from_vec(bytes).map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    /// Read and parse a font file.
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let bytes = std::fs::read(path)
            .map_err(|e| RenderError::Font(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(bytes)
    }

    fn layout(&self, text: &str, size: f32) -> (Vec<Glyph>, TextMetrics) {
        let scale = PxScale::from(size);
        let scaled = self.font.as_scaled(scale);
        let ascent = scaled.ascent();

        let mut glyphs = Vec::with_capacity(text.len());
        let mut caret = 0.0f32;
        let mut previous = None;
        for c in text.chars() {
            if c.is_control() {
                continue;
            }
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(scale, point(caret, ascent)));
            caret += scaled.h_advance(id);
            previous = Some(id);
        }

        let metrics = TextMetrics {
            width: caret,
            height: ascent - scaled.descent(),
            ascent,
        };
        (glyphs, metrics)
    }

    /// Measure `text` at `size` pixels.
    pub fn measure(&self, text: &str, size: f32) -> TextMetrics {
        self.layout(text, size).1
    }

    /// Rasterize `text` into a premultiplied pixmap whose top-left corner is
    /// the top of the line box. `None` for empty or invisible text.
    pub fn rasterize(&self, text: &str, size: f32, color: Color) -> Option<Pixmap> {
        let (glyphs, metrics) = self.layout(text, size);
        let width = metrics.width.ceil().max(0.0) as u32;
        let height = metrics.height.ceil().max(0.0) as u32;
        let mut pixmap = Pixmap::new(width, height)?;

        let mut coverage = vec![0.0f32; (width * height) as usize];
        for glyph in glyphs {
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|x, y, c| {
                let px = x as i32 + bounds.min.x as i32;
                let py = y as i32 + bounds.min.y as i32;
                if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                    let idx = (py as u32 * width + px as u32) as usize;
                    coverage[idx] = coverage[idx].max(c.min(1.0));
                }
            });
        }

        let rgba = color.to_color_u8();
        for (dst, c) in pixmap.pixels_mut().iter_mut().zip(coverage) {
            let alpha = (rgba.alpha() as f32 * c).round() as u8;
            *dst = ColorU8::from_rgba(rgba.red(), rgba.green(), rgba.blue(), alpha).premultiply();
        }
        Some(pixmap)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_font() -> LabelFont {
        LabelFont::load(Path::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/DejaVuSans.ttf"
        )))
        .unwrap()
    }

    #[test]
    fn test_rasterize_line_box() {
        let font = test_font();
        let metrics = font.measure("H", 24.0);
        assert!((metrics.height - 24.0).abs() < 0.01);
        assert!((metrics.width - 15.5).abs() < 0.1);

        let label = font.rasterize("H", 24.0, Color::BLACK).unwrap();
        assert_eq!((label.width(), label.height()), (16, 24));
    }

    #[test]
    fn test_rasterize_inks_glyph_with_color_alpha() {
        let font = test_font();
        let label = font
            .rasterize("H", 24.0, Color::from_rgba8(0, 0, 255, 128))
            .unwrap();

        // Left stem of the H, halfway down the cap height.
        let stem = label.pixel(3, 12).unwrap().demultiply();
        assert!((126..=129).contains(&stem.alpha()), "alpha {}", stem.alpha());
        assert!(stem.blue() > 250);

        // Counter between the stems, above the crossbar.
        assert_eq!(label.pixel(8, 6).unwrap().alpha(), 0);
        // Above the cap height.
        assert_eq!(label.pixel(8, 1).unwrap().alpha(), 0);
    }

    #[test]
    fn test_rasterize_empty_text() {
        assert!(test_font().rasterize("", 24.0, Color::BLACK).is_none());
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let result = LabelFont::from_bytes(b"definitely not a font".to_vec());
        assert!(matches!(result, Err(RenderError::Font(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = LabelFont::load(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/font.ttf"));
    }
}
