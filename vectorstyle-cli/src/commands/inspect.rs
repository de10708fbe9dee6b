//! `inspect` command: list a style's layers in draw order.

use std::fmt::Write as _;

use clap::Args;
use vectorstyle::style::{StyleDocument, StyleLayer};

use super::common::fetch_style;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Style document (path or http(s) URL)
    #[arg(long)]
    pub style: String,

    /// Print the parsed layers as JSON
    #[arg(long)]
    pub json: bool,
}

fn zoom_bound(bound: Option<f64>) -> String {
    bound.map(|z| z.to_string()).unwrap_or_else(|| "-".to_string())
}

fn layer_row(index: usize, layer: &StyleLayer) -> String {
    let layer_type = serde_json::to_value(layer.layer_type)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "unsupported".to_string());
    let source = if layer.source_layer.is_empty() {
        "-"
    } else {
        layer.source_layer.as_str()
    };
    format!(
        "{:>4}  {:<32} {:<12} {:<24} {}..{}",
        index,
        layer.id,
        layer_type,
        source,
        zoom_bound(layer.minzoom),
        zoom_bound(layer.maxzoom)
    )
}

fn layer_table(document: &StyleDocument) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<32} {:<12} {:<24} {}",
        "#", "ID", "TYPE", "SOURCE LAYER", "ZOOM"
    );
    for (index, layer) in document.layers().iter().enumerate() {
        let _ = writeln!(out, "{}", layer_row(index, layer));
    }
    let _ = write!(
        out,
        "{} layers, sprite: {}",
        document.len(),
        document.sprite().unwrap_or("none")
    );
    out
}

pub async fn run(args: InspectArgs) -> Result<(), CliError> {
    let (_, document) = fetch_style(&args.style).await?;
    if args.json {
        let json = serde_json::to_string_pretty(document.layers())
            .map_err(|e| CliError::InvalidArgument(format!("cannot serialize layers: {}", e)))?;
        println!("{}", json);
    } else {
        println!("{}", layer_table(&document));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLE: &[u8] = br#"{
        "sprite": "sprites/basic",
        "layers": [
            {"id": "bg", "type": "background"},
            {"id": "water", "type": "fill", "source-layer": "water", "minzoom": 2, "maxzoom": 14},
            {"id": "dots", "type": "circle", "source-layer": "poi"}
        ]
    }"#;

    #[test]
    fn test_layer_table_rows() {
        let document = StyleDocument::from_json(STYLE).unwrap();
        let table = layer_table(&document);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains("bg") && lines[1].contains("background"));
        assert!(lines[2].contains("water") && lines[2].contains("fill") && lines[2].contains("2..14"));
        assert!(lines[3].contains("unsupported") && lines[3].contains("-..-"));
        assert_eq!(lines[4], "3 layers, sprite: sprites/basic");
    }
}
