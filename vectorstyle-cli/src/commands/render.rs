//! `render` command: draw one tile to a PNG file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use tracing::{info, warn};
use vectorstyle::config::RenderConfig;
use vectorstyle::coord::TileId;
use vectorstyle::loader::load_sprites;
use vectorstyle::render::{LabelFont, PixmapSurface, RenderOutcome, TileStyler};
use vectorstyle::sprite::SpriteAtlas;
use vectorstyle::tile::MemoryTile;

use super::common::fetch_style;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Style document (path or http(s) URL)
    #[arg(long)]
    pub style: String,

    /// Decoded tile as JSON
    #[arg(long)]
    pub tile: PathBuf,

    /// Tile the data belongs to, as z/x/y
    #[arg(long)]
    pub native: TileId,

    /// Tile to draw, as z/x/y (defaults to --native)
    #[arg(long)]
    pub requested: Option<TileId>,

    /// Output size in pixels (overrides the config file)
    #[arg(long)]
    pub size: Option<u32>,

    /// Draw the native tile even when a deeper tile is requested
    #[arg(long)]
    pub no_overzoom: bool,

    /// TrueType/OpenType font for labels (overrides the config file)
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Output PNG path
    #[arg(long, short)]
    pub out: PathBuf,
}

/// Apply command-line overrides on top of the configured render options.
fn effective_config(args: &RenderArgs, mut config: RenderConfig) -> Result<RenderConfig, CliError> {
    if let Some(size) = args.size {
        if size == 0 {
            return Err(CliError::InvalidArgument("--size must be positive".to_string()));
        }
        config.tile_size = size;
    }
    if args.no_overzoom {
        config.overzoom = false;
    }
    if let Some(font) = &args.font {
        config.font_path = Some(font.clone());
    }
    Ok(config)
}

fn read_tile(path: &Path) -> Result<MemoryTile, CliError> {
    let bytes = std::fs::read(path).map_err(|e| CliError::Tile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    MemoryTile::from_json(&bytes).map_err(|e| CliError::Tile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

pub async fn run(args: RenderArgs, config: RenderConfig) -> Result<(), CliError> {
    let config = effective_config(&args, config)?;
    let requested = args.requested.unwrap_or(args.native);
    let tile = read_tile(&args.tile)?;

    let (fetcher, document) = fetch_style(&args.style).await?;
    let sprites = match load_sprites(&fetcher, &document).await {
        Ok(atlas) => atlas.unwrap_or_else(SpriteAtlas::empty),
        Err(e) => {
            warn!(error = %e, "Sprites unavailable, icons will be skipped");
            SpriteAtlas::empty()
        }
    };

    let font = match &config.font_path {
        Some(path) => Some(Arc::new(LabelFont::load(path)?)),
        None => None,
    };

    let mut surface = PixmapSurface::new(config.tile_size, config.tile_size)?.with_font(font);
    let outcome =
        TileStyler::new(&document, &sprites, &config).draw_tile(&mut surface, &tile, args.native, requested)?;
    surface.save_png(&args.out)?;

    info!(native = %args.native, requested = %requested, out = %args.out.display(), "Tile rendered");
    match outcome {
        RenderOutcome::Complete {
            layers_drawn,
            features_drawn,
        } => println!(
            "Rendered {} ({} layers, {} features) to {}",
            requested,
            layers_drawn,
            features_drawn,
            args.out.display()
        ),
        RenderOutcome::Blank { source_layer } => println!(
            "Rendered {} to {} (stopped at blank source layer '{}')",
            requested,
            args.out.display(),
            source_layer
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RenderArgs {
        RenderArgs {
            style: "style.json".to_string(),
            tile: PathBuf::from("tile.json"),
            native: "0/0/0".parse().unwrap(),
            requested: None,
            size: None,
            no_overzoom: false,
            font: None,
            out: PathBuf::from("out.png"),
        }
    }

    #[test]
    fn test_effective_config_keeps_defaults() {
        let config = effective_config(&args(), RenderConfig::default()).unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_effective_config_overrides() {
        let mut args = args();
        args.size = Some(512);
        args.no_overzoom = true;
        args.font = Some(PathBuf::from("/fonts/label.ttf"));

        let config = effective_config(&args, RenderConfig::default()).unwrap();
        assert_eq!(config.tile_size, 512);
        assert!(!config.overzoom);
        assert_eq!(config.font_path, Some(PathBuf::from("/fonts/label.ttf")));
    }

    #[test]
    fn test_effective_config_rejects_zero_size() {
        let mut args = args();
        args.size = Some(0);
        assert!(matches!(
            effective_config(&args, RenderConfig::default()),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_read_tile_missing_file() {
        let result = read_tile(Path::new("/nonexistent/tile.json"));
        assert!(matches!(result, Err(CliError::Tile { .. })));
    }

    #[tokio::test]
    async fn test_render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("style.json"),
            br#"{"layers": [{"id": "bg", "type": "background", "paint": {"background-color": "rgb(0, 0, 255)"}}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("tile.json"), br#"{"layers": {}}"#).unwrap();

        let mut args = args();
        args.style = dir.path().join("style.json").to_string_lossy().into_owned();
        args.tile = dir.path().join("tile.json");
        args.out = dir.path().join("out.png");
        args.size = Some(16);

        run(args, RenderConfig::default()).await.unwrap();
        let png = std::fs::read(dir.path().join("out.png")).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
