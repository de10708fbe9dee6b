//! Sprite atlas decoding.

use std::collections::HashMap;

use image::{imageops, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use tiny_skia::{ColorU8, Pixmap};
use tracing::{debug, warn};

use super::error::SpriteError;

/// One rectangle of the sprite index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteIndexEntry {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "pixelRatio", default = "default_pixel_ratio")]
    pub pixel_ratio: f32,
}

fn default_pixel_ratio() -> f32 {
    1.0
}

/// Sprite name → rectangle in the atlas image.
pub type SpriteIndex = HashMap<String, SpriteIndexEntry>;

/// Parse a sprite index JSON document.
pub fn parse_sprite_index(bytes: &[u8]) -> Result<SpriteIndex, SpriteError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// A standalone icon image in straight (non-premultiplied) RGBA.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteImage {
    pixels: RgbaImage,
    pixel_ratio: f32,
}

impl SpriteImage {
    pub fn new(pixels: RgbaImage, pixel_ratio: f32) -> Self {
        Self {
            pixels,
            pixel_ratio,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Straight RGBA pixel data.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Copy into an off-screen premultiplied pixmap suitable for
    /// source-over compositing. Returns `None` for an empty image.
    pub fn to_pixmap(&self) -> Option<Pixmap> {
        let mut pixmap = Pixmap::new(self.width(), self.height())?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(self.pixels.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        Some(pixmap)
    }
}

/// Icons keyed by sprite name.
#[derive(Debug, Clone, Default)]
pub struct SpriteAtlas {
    sprites: HashMap<String, SpriteImage>,
}

impl SpriteAtlas {
    /// An atlas with no icons, used until sprites finish loading.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode the atlas PNG once and copy out every indexed rectangle.
    pub fn from_parts(index_json: &[u8], image_png: &[u8]) -> Result<Self, SpriteError> {
        let index = parse_sprite_index(index_json)?;
        let image = image::load_from_memory_with_format(image_png, ImageFormat::Png)?.to_rgba8();
        Ok(Self::from_index(&index, &image))
    }

    /// Copy every rectangle of `index` out of `atlas`.
    ///
    /// Entries that are empty or extend past the atlas bounds are skipped.
    pub fn from_index(index: &SpriteIndex, atlas: &RgbaImage) -> Self {
        let mut sprites = HashMap::with_capacity(index.len());
        for (name, entry) in index {
            let in_bounds = entry.x.checked_add(entry.width).is_some_and(|r| r <= atlas.width())
                && entry.y.checked_add(entry.height).is_some_and(|b| b <= atlas.height());
            if entry.width == 0 || entry.height == 0 || !in_bounds {
                warn!(
                    sprite = %name,
                    x = entry.x,
                    y = entry.y,
                    width = entry.width,
                    height = entry.height,
                    "Sprite rectangle outside atlas image, skipping"
                );
                continue;
            }

            let pixels = imageops::crop_imm(atlas, entry.x, entry.y, entry.width, entry.height)
                .to_image();
            sprites.insert(name.clone(), SpriteImage::new(pixels, entry.pixel_ratio));
        }
        debug!(count = sprites.len(), "Sprite atlas built");
        Self { sprites }
    }

    /// Insert one icon.
    pub fn insert(&mut self, name: impl Into<String>, image: SpriteImage) {
        self.sprites.insert(name.into(), image);
    }

    pub fn get(&self, name: &str) -> Option<&SpriteImage> {
        self.sprites.get(name)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Icon names in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sprites.keys().map(String::as_str)
    }
}
