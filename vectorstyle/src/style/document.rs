//! Parsed style document.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use super::error::StyleError;
use super::layer::StyleLayer;

/// Suffix appended to the `sprite` base path for the sprite index.
pub const SPRITE_INDEX_SUFFIX: &str = ".json";

/// Suffix appended to the `sprite` base path for the sprite image.
pub const SPRITE_IMAGE_SUFFIX: &str = ".png";

#[derive(Deserialize)]
struct RawStyle {
    #[serde(default)]
    layers: Vec<serde_json::Value>,
    #[serde(default)]
    sprite: Option<String>,
}

fn parse_layer(index: usize, value: serde_json::Value) -> Option<StyleLayer> {
    let id = value
        .get("id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<no id>")
        .to_string();
    match serde_json::from_value::<StyleLayer>(value) {
        Ok(layer) => Some(layer),
        Err(e) => {
            warn!(layer = %id, index, error = %e, "Skipping unparseable style layer");
            None
        }
    }
}

/// An ordered collection of style layers.
///
/// Layer order is document order and is the draw order: later layers paint
/// over earlier ones. Lookup by id goes through a side index and never
/// changes iteration order.
///
/// # Example
///
/// ```
/// use vectorstyle::style::StyleDocument;
///
/// let doc = StyleDocument::from_json(br#"{
///     "sprite": "https://example.com/sprites/basic",
///     "layers": [
///         {"id": "bg", "type": "background"},
///         {"id": "water", "type": "fill", "source-layer": "water"}
///     ]
/// }"#).unwrap();
///
/// let ids: Vec<&str> = doc.layers().iter().map(|l| l.id.as_str()).collect();
/// assert_eq!(ids, ["bg", "water"]);
/// assert_eq!(
///     doc.sprite_index_url().as_deref(),
///     Some("https://example.com/sprites/basic.json")
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct StyleDocument {
    layers: Vec<StyleLayer>,
    by_id: HashMap<String, usize>,
    sprite: Option<String>,
}

impl StyleDocument {
    /// A document with no layers, as seen before a style finishes loading.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a document from layers in draw order.
    pub fn new(layers: Vec<StyleLayer>, sprite: Option<String>) -> Self {
        let mut by_id = HashMap::with_capacity(layers.len());
        for (index, layer) in layers.iter().enumerate() {
            if by_id.insert(layer.id.clone(), index).is_some() {
                warn!(layer = %layer.id, "Duplicate style layer id, lookup returns the last one");
            }
        }
        Self {
            layers,
            by_id,
            sprite,
        }
    }

    /// Parse a style JSON document.
    ///
    /// Only `layers` and `sprite` are read; other top-level fields are
    /// ignored. A layer that does not parse is skipped with a warning; the
    /// rest of the document is kept.
    pub fn from_json(bytes: &[u8]) -> Result<Self, StyleError> {
        let raw: RawStyle = serde_json::from_slice(bytes)?;
        let layers = raw
            .layers
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| parse_layer(index, value))
            .collect();
        Ok(Self::new(layers, raw.sprite))
    }

    /// Layers in draw order.
    pub fn layers(&self) -> &[StyleLayer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Look up a layer by id.
    pub fn layer(&self, id: &str) -> Option<&StyleLayer> {
        self.by_id.get(id).map(|&i| &self.layers[i])
    }

    /// Layers bound to a source layer, in draw order.
    pub fn layers_for_source<'a>(
        &'a self,
        source_layer: &'a str,
    ) -> impl Iterator<Item = &'a StyleLayer> + 'a {
        self.layers
            .iter()
            .filter(move |l| l.source_layer == source_layer)
    }

    /// The `sprite` base path, if declared.
    pub fn sprite(&self) -> Option<&str> {
        self.sprite.as_deref()
    }

    /// `sprite + ".json"`
    pub fn sprite_index_url(&self) -> Option<String> {
        self.sprite
            .as_ref()
            .map(|base| format!("{}{}", base, SPRITE_INDEX_SUFFIX))
    }

    /// `sprite + ".png"`
    pub fn sprite_image_url(&self) -> Option<String> {
        self.sprite
            .as_ref()
            .map(|base| format!("{}{}", base, SPRITE_IMAGE_SUFFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::LayerType;

    const STYLE: &[u8] = br#"{
        "version": 8,
        "sprite": "sprites/bright",
        "sources": {"osm": {"type": "vector"}},
        "layers": [
            {"id": "z-last-alphabetically", "type": "background"},
            {"id": "a-water", "type": "fill", "source-layer": "water"},
            {"id": "m-roads", "type": "line", "source-layer": "transportation"},
            {"id": "b-water-outline", "type": "line", "source-layer": "water"}
        ]
    }"#;

    #[test]
    fn test_preserves_document_order() {
        let doc = StyleDocument::from_json(STYLE).unwrap();
        let ids: Vec<&str> = doc.layers().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(
            ids,
            ["z-last-alphabetically", "a-water", "m-roads", "b-water-outline"]
        );
    }

    #[test]
    fn test_lookup_by_id() {
        let doc = StyleDocument::from_json(STYLE).unwrap();
        assert_eq!(doc.layer("m-roads").unwrap().layer_type, LayerType::Line);
        assert!(doc.layer("missing").is_none());
    }

    #[test]
    fn test_layers_for_source() {
        let doc = StyleDocument::from_json(STYLE).unwrap();
        let ids: Vec<&str> = doc
            .layers_for_source("water")
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(ids, ["a-water", "b-water-outline"]);
    }

    #[test]
    fn test_sprite_urls() {
        let doc = StyleDocument::from_json(STYLE).unwrap();
        assert_eq!(doc.sprite(), Some("sprites/bright"));
        assert_eq!(doc.sprite_index_url().as_deref(), Some("sprites/bright.json"));
        assert_eq!(doc.sprite_image_url().as_deref(), Some("sprites/bright.png"));
    }

    #[test]
    fn test_no_sprite() {
        let doc = StyleDocument::from_json(br#"{"layers": []}"#).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.sprite_index_url(), None);
    }

    #[test]
    fn test_unparseable_layer_is_skipped() {
        let doc = StyleDocument::from_json(
            br##"{"layers": [
                {"id": "water", "type": "fill", "source-layer": "water", "paint": {"fill-color": "#0000ff"}},
                {"id": "parks", "type": "fill", "source-layer": "landuse", "paint": {"fill-color": 12}, "minzoom": {}}
            ]}"##,
        )
        .unwrap();
        let ids: Vec<&str> = doc.layers().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["water"]);
    }

    #[test]
    fn test_property_function_keeps_document() {
        let doc = StyleDocument::from_json(
            br##"{"layers": [
                {"id": "water", "type": "fill", "source-layer": "water", "paint": {"fill-color": "#0000ff"}},
                {"id": "parks", "type": "fill", "source-layer": "landuse",
                 "paint": {"fill-color": {"property": "class", "type": "categorical", "stops": [["park", "#0f0"]]}}}
            ]}"##,
        )
        .unwrap();
        assert_eq!(doc.len(), 2);
        assert!(doc.layer("parks").unwrap().resolve_paint(10.0).fill_color.is_none());
    }

    #[test]
    fn test_invalid_json() {
        let result = StyleDocument::from_json(b"{not json");
        assert!(matches!(result, Err(StyleError::Json(_))));
    }

    #[test]
    fn test_duplicate_ids_keep_both_in_order() {
        let doc = StyleDocument::from_json(
            br#"{"layers": [
                {"id": "dup", "type": "fill", "source-layer": "a"},
                {"id": "dup", "type": "line", "source-layer": "b"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.layer("dup").unwrap().layer_type, LayerType::Line);
    }
}
