//! Helpers shared across CLI commands.

use std::path::Path;

use vectorstyle::config::ConfigFile;
use vectorstyle::loader::{
    is_remote, load_style, AnyFetcher, FileFetcher, HttpFetcher, LoadError,
};
use vectorstyle::style::StyleDocument;

use crate::error::CliError;

/// Load the config file given on the command line, or the default one.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}

/// Build a fetcher for a style given as a URL or a path, plus the location
/// to fetch the style itself from.
///
/// Local styles resolve relative sprite paths against the style's directory.
pub fn fetcher_for(style: &str) -> Result<(AnyFetcher, String), CliError> {
    let http = HttpFetcher::new().map_err(|source| {
        CliError::Load(LoadError::Fetch {
            location: style.to_string(),
            source,
        })
    })?;

    if is_remote(style) {
        return Ok((AnyFetcher::new(http, FileFetcher::new()), style.to_string()));
    }

    let path = Path::new(style.strip_prefix("file://").unwrap_or(style));
    let file_name = path
        .file_name()
        .ok_or_else(|| CliError::InvalidArgument(format!("'{}' is not a style file", style)))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    Ok((
        AnyFetcher::new(http, FileFetcher::with_base_dir(dir)),
        file_name.to_string_lossy().into_owned(),
    ))
}

/// Fetch and parse the style, failing loudly.
pub async fn fetch_style(style: &str) -> Result<(AnyFetcher, StyleDocument), CliError> {
    let (fetcher, location) = fetcher_for(style)?;
    let document = load_style(&fetcher, &location).await?;
    Ok((fetcher, document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use vectorstyle::loader::ResourceFetcher;

    #[test]
    fn test_fetcher_for_remote_style() {
        let (_, location) = fetcher_for("https://example.com/styles/bright.json").unwrap();
        assert_eq!(location, "https://example.com/styles/bright.json");
    }

    #[test]
    fn test_fetcher_for_rejects_directory_like_path() {
        assert!(matches!(fetcher_for(".."), Err(CliError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_fetcher_for_local_style_resolves_siblings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.json"), br#"{"layers": []}"#).unwrap();
        std::fs::write(dir.path().join("sprite.json"), b"{}").unwrap();

        let style_path = dir.path().join("style.json");
        let (fetcher, location) = fetcher_for(style_path.to_str().unwrap()).unwrap();
        assert_eq!(location, "style.json");
        assert_eq!(fetcher.fetch("sprite.json").await.unwrap(), b"{}");
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\ntile_size = 512").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.render.tile_size, 512);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Some(Path::new("/nonexistent/config.ini")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
