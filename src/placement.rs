use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

/// Transform adjustments for one asset once it has been loaded.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Name of the node to adjust. Without it the asset's own group node is adjusted.
    #[serde(default)]
    pub anchor: Option<String>,
    /// Replaces the translation.
    #[serde(default)]
    pub position: Option<[f32; 3]>,
    /// Multiplies the current scale.
    #[serde(default)]
    pub scale: Option<f32>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AssetPlacement {
    pub asset: String,
    #[serde(flatten)]
    pub placement: Placement,
}

/// Placements keyed by asset id (the root file name).
#[derive(Clone, Debug, Default)]
pub struct PlacementTable {
    entries: HashMap<String, Placement>,
}

impl PlacementTable {
    pub fn from_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    pub fn from_json(source: &str) -> Result<Self> {
        let placements: Vec<AssetPlacement> = serde_json::from_str(source)?;
        Ok(placements.into_iter().collect())
    }

    pub fn insert(&mut self, asset: impl Into<String>, placement: Placement) {
        let asset = asset.into();
        if self.entries.insert(asset.clone(), placement).is_some() {
            log::warn!("Replacing placement for asset {asset}");
        }
    }

    pub fn get(&self, asset: &str) -> Option<&Placement> {
        self.entries.get(asset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<AssetPlacement> for PlacementTable {
    fn from_iter<T: IntoIterator<Item = AssetPlacement>>(iter: T) -> Self {
        let mut table = Self::default();
        for entry in iter {
            table.insert(entry.asset, entry.placement);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_placement_list() {
        let table = PlacementTable::from_json(
            r#"[
                {"asset": "CubeRoom.gltf", "position": [0, 0, 0], "scale": 300},
                {"asset": "scene.gltf", "anchor": "Sofa", "scale": 0.6}
            ]"#,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get("CubeRoom.gltf"),
            Some(&Placement {
                anchor: None,
                position: Some([0.0, 0.0, 0.0]),
                scale: Some(300.0),
            })
        );
        assert_eq!(table.get("scene.gltf").unwrap().anchor.as_deref(), Some("Sofa"));
        assert!(table.get("Duck.gltf").is_none());
    }

    #[test]
    fn rejects_entries_without_an_asset() {
        assert!(PlacementTable::from_json(r#"[{"scale": 2}]"#).is_err());
    }
}
