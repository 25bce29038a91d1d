use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use crate::placement::{Placement, PlacementTable};
use crate::resource::file_name;

/// One asset set to fetch and view at startup.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreloadAsset {
    /// URL of the scene file.
    pub root: String,
    /// Prefix the asset's relative references are keyed under in the fetched map.
    #[serde(default)]
    pub root_path: String,
    /// Every URL to fetch before the asset is viewed, keyed by the URL itself.
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub placement: Option<Placement>,
}

impl PreloadAsset {
    pub fn asset_id(&self) -> &str {
        file_name(&self.root)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct PreloadManifest {
    pub assets: Vec<PreloadAsset>,
}

impl PreloadManifest {
    pub fn from_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    pub fn from_json(source: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(source)?;
        log::debug!("Preload manifest lists {} assets", manifest.assets.len());
        Ok(manifest)
    }

    /// Adds the placements carried by manifest entries to `table`.
    pub fn merge_placements(&self, table: &mut PlacementTable) {
        for asset in &self.assets {
            if let Some(placement) = &asset.placement {
                table.insert(asset.asset_id(), placement.clone());
            }
        }
    }
}
