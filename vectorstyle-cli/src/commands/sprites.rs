//! `sprites` command: list the icons of a style's sprite atlas.

use clap::Args;
use vectorstyle::loader::load_sprites;
use vectorstyle::sprite::SpriteAtlas;

use super::common::fetch_style;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct SpritesArgs {
    /// Style document (path or http(s) URL)
    #[arg(long)]
    pub style: String,
}

fn sprite_listing(atlas: &SpriteAtlas) -> Vec<String> {
    let mut names: Vec<&str> = atlas.names().collect();
    names.sort_unstable();
    names
        .into_iter()
        .filter_map(|name| {
            let image = atlas.get(name)?;
            Some(format!(
                "{:<32} {}x{} @{}x",
                name,
                image.width(),
                image.height(),
                image.pixel_ratio()
            ))
        })
        .collect()
}

pub async fn run(args: SpritesArgs) -> Result<(), CliError> {
    let (fetcher, document) = fetch_style(&args.style).await?;
    let Some(atlas) = load_sprites(&fetcher, &document).await? else {
        println!("Style declares no sprite");
        return Ok(());
    };
    for line in sprite_listing(&atlas) {
        println!("{}", line);
    }
    println!("{} icons", atlas.len());
    Ok(())
}
