//! Asynchronous style and sprite loading.
//!
//! A [`VectorStyle`] starts empty and fills in as loads complete:
//!
//! ```text
//! load(url) ──spawn──► fetch style JSON ──► publish StyleDocument
//!                                           │
//!                            ┌──────────────┴──────────────┐
//!                            ▼                             ▼
//!                  fetch sprite + ".json"        fetch sprite + ".png"
//!                            └──────────────┬──────────────┘
//!                                           ▼
//!                                 publish SpriteAtlas
//! ```
//!
//! Failures are logged and leave the previously published state in place.
//! Every render takes a snapshot of the current document and atlas, so
//! rendering before or during a load is safe.

mod fetcher;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub use fetcher::{
    is_remote, AnyFetcher, FetchError, FileFetcher, HttpFetcher, ResourceFetcher,
    DEFAULT_TIMEOUT_SECS,
};

#[cfg(test)]
pub use fetcher::tests::MockFetcher;

use crate::config::RenderConfig;
use crate::coord::TileId;
use crate::render::{RenderError, RenderOutcome, Surface, TileStyler};
use crate::sprite::{SpriteAtlas, SpriteError};
use crate::style::{StyleDocument, StyleError};
use crate::tile::VectorTile;

/// Errors raised while loading a style or its sprites.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to fetch {location}: {source}")]
    Fetch {
        location: String,
        #[source]
        source: FetchError,
    },

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Sprite(#[from] SpriteError),
}

async fn fetch<F: ResourceFetcher + ?Sized>(fetcher: &F, location: &str) -> Result<Vec<u8>, LoadError> {
    fetcher
        .fetch(location)
        .await
        .map_err(|source| LoadError::Fetch {
            location: location.to_string(),
            source,
        })
}

/// Fetch and parse a style document.
pub async fn load_style<F: ResourceFetcher + ?Sized>(
    fetcher: &F,
    location: &str,
) -> Result<StyleDocument, LoadError> {
    let bytes = fetch(fetcher, location).await?;
    Ok(StyleDocument::from_json(&bytes)?)
}

/// Fetch the sprite index and image concurrently and build the atlas.
///
/// Returns `Ok(None)` when the document declares no sprite.
pub async fn load_sprites<F: ResourceFetcher + ?Sized>(
    fetcher: &F,
    document: &StyleDocument,
) -> Result<Option<SpriteAtlas>, LoadError> {
    let (Some(index_url), Some(image_url)) = (document.sprite_index_url(), document.sprite_image_url())
    else {
        return Ok(None);
    };

    let (index, image) = tokio::join!(fetch(fetcher, &index_url), fetch(fetcher, &image_url));
    let atlas = SpriteAtlas::from_parts(&index?, &image?)?;
    Ok(Some(atlas))
}

/// Published state shared between a style and its load tasks.
#[derive(Debug)]
struct SharedState {
    document: RwLock<Arc<StyleDocument>>,
    sprites: RwLock<Arc<SpriteAtlas>>,
    generation: AtomicU64,
}

impl SharedState {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    /// Replace the document if `generation` is still current. The check
    /// runs under the write lock so a newer load is never overwritten.
    fn publish_document(&self, generation: u64, document: Arc<StyleDocument>) -> bool {
        let mut slot = self.document.write();
        if !self.is_current(generation) {
            return false;
        }
        *slot = document;
        true
    }

    /// Replace the atlas if `generation` is still current.
    fn publish_sprites(&self, generation: u64, sprites: Arc<SpriteAtlas>) -> bool {
        let mut slot = self.sprites.write();
        if !self.is_current(generation) {
            return false;
        }
        *slot = sprites;
        true
    }
}

/// A style whose document and sprites load in the background.
#[derive(Debug, Clone)]
pub struct VectorStyle {
    state: Arc<SharedState>,
    config: Arc<RenderConfig>,
}

impl VectorStyle {
    /// An empty style. Renders paint only the default background until a
    /// document is published.
    pub fn new(config: RenderConfig) -> Self {
        Self {
            state: Arc::new(SharedState {
                document: RwLock::new(Arc::new(StyleDocument::empty())),
                sprites: RwLock::new(Arc::new(SpriteAtlas::empty())),
                generation: AtomicU64::new(0),
            }),
            config: Arc::new(config),
        }
    }

    /// Create a style and start loading `location` in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn load<F>(fetcher: Arc<F>, location: impl Into<String>, config: RenderConfig) -> (Self, LoadHandle)
    where
        F: ResourceFetcher + 'static,
    {
        let style = Self::new(config);
        let handle = style.reload(fetcher, location);
        (style, handle)
    }

    /// Start loading `location` into this style. A newer load supersedes
    /// any load still in flight: the older one no longer publishes.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn reload<F>(&self, fetcher: Arc<F>, location: impl Into<String>) -> LoadHandle
    where
        F: ResourceFetcher + 'static,
    {
        let location = location.into();
        let generation = self.state.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let state = Arc::clone(&self.state);
        let task = tokio::spawn(run_load(fetcher, location, state, generation));
        LoadHandle::new(task)
    }

    /// Snapshot of the current document.
    pub fn document(&self) -> Arc<StyleDocument> {
        Arc::clone(&self.state.document.read())
    }

    /// Snapshot of the current sprite atlas.
    pub fn sprites(&self) -> Arc<SpriteAtlas> {
        Arc::clone(&self.state.sprites.read())
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Replace the document directly, for hosts that parse styles
    /// themselves.
    pub fn set_document(&self, document: StyleDocument) {
        *self.state.document.write() = Arc::new(document);
    }

    /// Replace the sprite atlas directly.
    pub fn set_sprites(&self, sprites: SpriteAtlas) {
        *self.state.sprites.write() = Arc::new(sprites);
    }

    /// Draw `tile` with the currently published document and sprites.
    ///
    /// See [`TileStyler::draw_tile`].
    pub fn render_tile<S, T>(
        &self,
        surface: &mut S,
        tile: &T,
        native: TileId,
        requested: TileId,
    ) -> Result<RenderOutcome, RenderError>
    where
        S: Surface + ?Sized,
        T: VectorTile,
    {
        let document = self.document();
        let sprites = self.sprites();
        TileStyler::new(&document, &sprites, &self.config).draw_tile(surface, tile, native, requested)
    }
}

async fn run_load<F>(fetcher: Arc<F>, location: String, state: Arc<SharedState>, generation: u64)
where
    F: ResourceFetcher + 'static,
{
    let document = match load_style(fetcher.as_ref(), &location).await {
        Ok(document) => Arc::new(document),
        Err(e) => {
            error!(location = %location, error = %e, "Style load failed");
            return;
        }
    };

    if !state.publish_document(generation, Arc::clone(&document)) {
        debug!(location = %location, "Superseded style load discarded");
        return;
    }
    info!(location = %location, layers = document.len(), "Style loaded");

    match load_sprites(fetcher.as_ref(), &document).await {
        Ok(Some(atlas)) => {
            let icons = atlas.len();
            if state.publish_sprites(generation, Arc::new(atlas)) {
                info!(sprite = document.sprite().unwrap_or_default(), icons, "Sprites loaded");
            } else {
                debug!(location = %location, "Superseded sprite load discarded");
            }
        }
        Ok(None) => debug!(location = %location, "Style declares no sprite"),
        Err(e) => {
            error!(sprite = document.sprite().unwrap_or_default(), error = %e, "Sprite load failed");
        }
    }
}

/// Handle to a background load.
///
/// Dropping the handle detaches the load unless [`abort_on_drop`] was set.
///
/// [`abort_on_drop`]: LoadHandle::abort_on_drop
#[derive(Debug)]
pub struct LoadHandle {
    task: Option<JoinHandle<()>>,
    abort_on_drop: bool,
}

impl LoadHandle {
    fn new(task: JoinHandle<()>) -> Self {
        Self {
            task: Some(task),
            abort_on_drop: false,
        }
    }

    /// Cancel the load when this handle is dropped.
    pub fn abort_on_drop(mut self) -> Self {
        self.abort_on_drop = true;
        self
    }

    /// Cancel the load. Already-published state is kept.
    pub fn cancel(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the load to finish (successfully or not).
    pub async fn wait(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Style load task failed");
                }
            }
        }
    }
}

impl Drop for LoadHandle {
    fn drop(&mut self) {
        if self.abort_on_drop {
            if let Some(task) = self.task.take() {
                task.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, RecordingSurface};
    use crate::tile::MemoryTile;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::time::Duration;
    use tiny_skia::Color;

    const STYLE: &[u8] = br#"{
        "sprite": "sprites/basic",
        "layers": [
            {"id": "bg", "type": "background", "paint": {"background-color": "red"}},
            {"id": "water", "type": "fill", "source-layer": "water",
             "paint": {"fill-color": "blue"}}
        ]
    }"#;

    fn sprite_png() -> Vec<u8> {
        let mut png = Vec::new();
        RgbaImage::from_pixel(4, 4, Rgba([0, 128, 0, 255]))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        png
    }

    fn full_fetcher() -> MockFetcher {
        MockFetcher::new()
            .with("style.json", STYLE.to_vec())
            .with(
                "sprites/basic.json",
                br#"{"park": {"x": 0, "y": 0, "width": 4, "height": 4}}"#.to_vec(),
            )
            .with("sprites/basic.png", sprite_png())
    }

    #[tokio::test]
    async fn test_load_style_and_sprites() {
        let fetcher = Arc::new(full_fetcher());
        let (style, handle) = VectorStyle::load(Arc::clone(&fetcher), "style.json", RenderConfig::default());
        handle.wait().await;

        assert_eq!(style.document().len(), 2);
        assert!(style.sprites().get("park").is_some());

        let requests = fetcher.requests.lock();
        assert_eq!(requests[0], "style.json");
        assert_eq!(requests.len(), 3);
    }

    #[tokio::test]
    async fn test_style_fetch_failure_leaves_empty_document() {
        let (style, handle) =
            VectorStyle::load(Arc::new(MockFetcher::new()), "missing.json", RenderConfig::default());
        handle.wait().await;
        assert!(style.document().is_empty());
        assert!(style.sprites().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_style_json() {
        let fetcher = MockFetcher::new().with("style.json", b"{oops".to_vec());
        let result = load_style(&fetcher, "style.json").await;
        assert!(matches!(result, Err(LoadError::Style(_))));
    }

    #[tokio::test]
    async fn test_sprite_failure_keeps_document() {
        let fetcher = MockFetcher::new().with("style.json", STYLE.to_vec());
        let (style, handle) = VectorStyle::load(Arc::new(fetcher), "style.json", RenderConfig::default());
        handle.wait().await;
        assert_eq!(style.document().len(), 2);
        assert!(style.sprites().is_empty());
    }

    #[tokio::test]
    async fn test_load_sprites_without_sprite() {
        let document = StyleDocument::from_json(br#"{"layers": []}"#).unwrap();
        let result = load_sprites(&MockFetcher::new(), &document).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_load_sprites_reports_fetch_error() {
        let document = StyleDocument::from_json(STYLE).unwrap();
        let fetcher = MockFetcher::new().with("sprites/basic.png", sprite_png());
        let err = load_sprites(&fetcher, &document).await.unwrap_err();
        assert!(matches!(err, LoadError::Fetch { ref location, .. } if location == "sprites/basic.json"));
    }

    #[tokio::test]
    async fn test_render_before_load_is_safe() {
        let style = VectorStyle::new(RenderConfig::default());
        let mut surface = RecordingSurface::new(256, 256);
        let tile = MemoryTile::new();
        let outcome = style
            .render_tile(&mut surface, &tile, TileId::new(0, 0, 0), TileId::new(0, 0, 0))
            .unwrap();
        assert!(matches!(outcome, RenderOutcome::Complete { layers_drawn: 0, .. }));
        assert_eq!(surface.commands(), &[DrawCommand::FillAll(Color::BLACK)]);
    }

    #[tokio::test]
    async fn test_cancel_keeps_published_state() {
        let fetcher = full_fetcher().with_delay(Duration::from_secs(30));
        let style = VectorStyle::new(RenderConfig::default());
        style.set_document(StyleDocument::from_json(STYLE).unwrap());

        let handle = style.reload(Arc::new(fetcher), "style.json");
        handle.cancel();
        tokio::task::yield_now().await;

        assert_eq!(style.document().len(), 2);
        assert!(style.sprites().is_empty());
    }

    #[tokio::test]
    async fn test_newer_load_supersedes_older() {
        let slow = MockFetcher::new()
            .with("old.json", br#"{"layers": [{"id": "old", "type": "background"}]}"#.to_vec())
            .with_delay(Duration::from_millis(200));
        let fast = MockFetcher::new().with("new.json", STYLE.to_vec());

        let style = VectorStyle::new(RenderConfig::default());
        let old = style.reload(Arc::new(slow), "old.json");
        let new = style.reload(Arc::new(fast), "new.json");
        new.wait().await;
        old.wait().await;

        assert!(style.document().layer("water").is_some());
        assert!(style.document().layer("old").is_none());
    }

    #[test]
    fn test_stale_generation_never_publishes() {
        let style = VectorStyle::new(RenderConfig::default());
        style.state.generation.store(2, Ordering::Release);

        let stale = Arc::new(StyleDocument::from_json(STYLE).unwrap());
        assert!(!style.state.publish_document(1, stale));
        assert!(style.document().is_empty());
        assert!(!style.state.publish_sprites(1, Arc::new(SpriteAtlas::empty())));

        let current = Arc::new(StyleDocument::from_json(STYLE).unwrap());
        assert!(style.state.publish_document(2, current));
        assert_eq!(style.document().len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_survives_replacement() {
        let style = VectorStyle::new(RenderConfig::default());
        style.set_document(StyleDocument::from_json(STYLE).unwrap());
        let snapshot = style.document();
        style.set_document(StyleDocument::empty());
        assert_eq!(snapshot.len(), 2);
        assert!(style.document().is_empty());
    }
}
