use crate::error::ResolveError;
use crate::resource::{Resource, ResourceMap};

/// The scene file of a resource map and the path prefix its dependencies are keyed under.
#[derive(Clone, Debug)]
pub struct RootSelection {
    pub key: String,
    pub resource: Resource,
    pub root_path: String,
}

/// Finds the single `.gltf` / `.glb` resource of `map`.
///
/// Several candidates are rejected instead of picking one by iteration order.
pub fn resolve_root(map: &ResourceMap) -> Result<RootSelection, ResolveError> {
    let mut candidates: Vec<(&String, &Resource)> = map
        .iter()
        .filter(|(_, resource)| resource.is_scene_file())
        .collect();

    match candidates.len() {
        0 => Err(ResolveError::NoRootAsset),
        1 => {
            let (key, resource) = candidates.remove(0);
            let root_path = key.strip_suffix(&resource.name).unwrap_or(key).to_string();

            log::debug!("Resolved root asset {key} under \"{root_path}\"");

            Ok(RootSelection {
                key: key.clone(),
                resource: resource.clone(),
                root_path,
            })
        }
        _ => {
            let mut keys: Vec<String> = candidates.into_iter().map(|(key, _)| key.clone()).collect();
            keys.sort();
            Err(ResolveError::AmbiguousRoot(keys))
        }
    }
}
