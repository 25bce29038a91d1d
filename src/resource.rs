use std::collections::HashMap;
use std::sync::Arc;

/// One file of a scene: the scene description, a binary buffer or a texture image.
#[derive(Clone, Debug)]
pub struct Resource {
    pub name: String,
    /// `None` means no content-type override.
    pub content_type: Option<&'static str>,
    data: Arc<[u8]>,
}

impl Resource {
    pub fn new(name: impl Into<String>, content_type: Option<&'static str>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type,
            data: data.into(),
        }
    }

    /// Builds a resource named after the last segment of `path`, with an inferred content type.
    pub fn from_path_bytes(path: &str, data: Vec<u8>) -> Self {
        Self::new(file_name(path), content_type_for(path), data)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn shared_data(&self) -> Arc<[u8]> {
        self.data.clone()
    }

    pub fn is_scene_file(&self) -> bool {
        is_scene_file_name(&self.name)
    }
}

/// Path/key to resource lookup for a single load attempt.
#[derive(Clone, Debug, Default)]
pub struct ResourceMap {
    entries: HashMap<String, Resource>,
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Resource> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Resource)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Resource)> for ResourceMap {
    fn from_iter<T: IntoIterator<Item = (String, Resource)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// What a load starts from: a URL the caller owns, or an in-memory resource.
#[derive(Clone, Debug)]
pub enum RootSource {
    Url(String),
    Resource(Resource),
}

impl RootSource {
    /// Identity used to look up per-asset metadata.
    pub fn asset_id(&self) -> String {
        match self {
            RootSource::Url(url) => file_name(url).to_string(),
            RootSource::Resource(resource) => resource.name.clone(),
        }
    }
}

impl From<&str> for RootSource {
    fn from(value: &str) -> Self {
        RootSource::Url(value.to_string())
    }
}

impl From<Resource> for RootSource {
    fn from(value: Resource) -> Self {
        RootSource::Resource(value)
    }
}

pub fn is_scene_file_name(name: &str) -> bool {
    name.ends_with(".gltf") || name.ends_with(".glb")
}

/// Last path segment of a URL or slash separated path, ignoring any query or fragment.
pub fn file_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

/// Extension of the last path segment, taken after its first `.`.
pub fn extension(url: &str) -> Option<&str> {
    file_name(url).split_once('.').map(|(_, extension)| extension)
}

pub fn content_type_for(url: &str) -> Option<&'static str> {
    match extension(url)? {
        "bin" => Some("application/octet-stream"),
        "gltf" => Some(""),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_follow_the_extension_table() {
        assert_eq!(
            content_type_for("/Assets/CubeRoom/CubeRoom.bin"),
            Some("application/octet-stream")
        );
        assert_eq!(content_type_for("/Assets/CubeRoom/CubeRoom.gltf"), Some(""));
        assert_eq!(content_type_for("a.png"), Some("image/png"));
        assert_eq!(content_type_for("textures/a.jpg"), Some("image/jpeg"));
        assert_eq!(content_type_for("textures/a.jpeg"), Some("image/jpeg"));
        assert_eq!(content_type_for("scene.glb"), None);
        assert_eq!(content_type_for("README"), None);
    }

    #[test]
    fn extension_only_looks_at_the_last_segment() {
        assert_eq!(extension("../Assets1/Sofa/scene.bin"), Some("bin"));
        assert_eq!(extension("https://example.com/v1.2/model.png?x=1"), Some("png"));
        assert_eq!(extension("archive.tar.gz"), Some("tar.gz"));
        assert_eq!(extension("https://example.com/v1.2/model"), None);
    }

    #[test]
    fn asset_id_is_the_file_name() {
        assert_eq!(RootSource::from("../Assets1/Sofa/scene.gltf").asset_id(), "scene.gltf");

        let resource = Resource::from_path_bytes("/Box/Box.glb", vec![]);
        assert_eq!(RootSource::from(resource).asset_id(), "Box.glb");
    }
}
