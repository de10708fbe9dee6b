//! Icon sprite atlas.
//!
//! A style's `sprite` base path resolves to two resources:
//! - `{sprite}.json` - sprite name → `{x, y, width, height}` rectangle
//! - `{sprite}.png` - the packed atlas image
//!
//! [`SpriteAtlas::from_parts`] decodes the PNG once and copies every
//! rectangle into its own [`SpriteImage`], so drawing an icon never touches
//! the atlas again. Alpha is kept per pixel; [`SpriteImage::to_pixmap`]
//! produces the premultiplied off-screen copy used for compositing.

mod atlas;
mod error;

pub use atlas::{parse_sprite_index, SpriteAtlas, SpriteImage, SpriteIndex, SpriteIndexEntry};
pub use error::SpriteError;
