use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use base64::Engine;

use crate::camera::OrbitalCameraController;
use crate::error::{Error, FetchError, MissingTextureError};
use crate::fetch::{resolve_relative, ResourceFetcher};
use crate::object_url::ObjectUrlStore;
use crate::render::scene::{Scene, SceneNode};
use crate::render::{LoadRequest, Renderer, RendererSettings, SceneHandle};
use crate::resource::file_name;

/// Builds a scene graph from glTF assets without drawing it.
pub struct SceneGraphRenderer<F: ResourceFetcher> {
    fetcher: F,
    settings: RendererSettings,
    scene: Scene,
    controls: OrbitalCameraController,
}

impl<F: ResourceFetcher> SceneGraphRenderer<F> {
    pub fn new(settings: RendererSettings, fetcher: F) -> Self {
        let controls = match settings.camera_position {
            Some(position) => OrbitalCameraController::from_position(position),
            None => OrbitalCameraController::default(),
        };

        if !settings.preset.is_empty() {
            log::info!("Using renderer preset: {}", settings.preset);
        }

        let scene = Scene {
            camera: controls.calculate_camera_transform(),
            ..Default::default()
        };

        Self {
            fetcher,
            settings,
            scene,
            controls,
        }
    }

    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }
}

impl<F: ResourceFetcher> Renderer for SceneGraphRenderer<F> {
    async fn load(&mut self, request: LoadRequest<'_>) -> Result<SceneHandle> {
        let (asset_id, document) = match request.object_urls.resolve(request.url) {
            Some(resource) => (resource.name.clone(), resource.shared_data()),
            None => (
                file_name(request.url).to_string(),
                read_uri(&self.fetcher, &request, request.url).await?.data,
            ),
        };

        log::info!("Loading glTF asset {asset_id} from {}", request.url);

        let gltf = gltf::Gltf::from_slice(&document)?;

        let mut loader = AssetLoader {
            fetcher: &self.fetcher,
            request,
            used_keys: HashSet::new(),
        };

        let buffers = loader.load_buffers(&gltf).await?;
        let image_count = loader.load_images(&gltf, &buffers).await?;

        let scene = match gltf.default_scene().or_else(|| gltf.scenes().next()) {
            Some(scene) => scene,
            None => {
                return Err(Error::new(String::from(
                    "The glTF asset does not contain any scene.",
                ))
                .into())
            }
        };

        let mut visited = HashSet::new();
        let mut roots = vec![];
        for node in scene.nodes() {
            roots.push(load_node(&node, &mut visited)?);
        }

        let group = SceneNode::group(asset_id.clone(), roots);
        let node_count = group.node_count() - 1;
        let index = self.scene.add(group);

        let mut used_keys: Vec<String> = loader.used_keys.into_iter().collect();
        used_keys.sort();

        log::info!("Loaded glTF asset {asset_id}: {node_count} nodes, {image_count} images");

        Ok(SceneHandle {
            index,
            asset_id,
            document,
            used_keys,
            node_count,
            image_count,
        })
    }

    fn clear(&mut self) {
        self.scene.clear();
    }

    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    fn controls(&mut self) -> &mut OrbitalCameraController {
        &mut self.controls
    }
}

/// Bytes for a URI referenced by an asset, and the resource map key they came from.
struct UriData {
    data: Arc<[u8]>,
    key: Option<String>,
}

struct AssetLoader<'a, F: ResourceFetcher> {
    fetcher: &'a F,
    request: LoadRequest<'a>,
    used_keys: HashSet<String>,
}

impl<F: ResourceFetcher> AssetLoader<'_, F> {
    async fn load_buffers(&mut self, gltf: &gltf::Gltf) -> Result<Vec<Arc<[u8]>>> {
        let mut buffers = Vec::new();

        for buffer in gltf.buffers() {
            let data: Arc<[u8]> = match buffer.source() {
                gltf::buffer::Source::Bin => match gltf.blob.as_deref() {
                    Some(blob) => Arc::from(blob),
                    None => {
                        return Err(Error::new(String::from(
                            "The GLB file has no binary chunk.",
                        ))
                        .into())
                    }
                },
                gltf::buffer::Source::Uri(uri) => self
                    .load_uri(uri)
                    .await
                    .with_context(|| format!("Loading buffer {}", buffer.index()))?,
            };

            if data.len() < buffer.length() {
                return Err(Error::new(format!(
                    "Buffer {} is shorter than declared: {} < {} bytes",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                ))
                .into());
            }

            log::debug!("Loaded buffer {} ({} bytes)", buffer.index(), data.len());
            buffers.push(data);
        }

        Ok(buffers)
    }

    async fn load_images(&mut self, gltf: &gltf::Gltf, buffers: &[Arc<[u8]>]) -> Result<usize> {
        let mut count = 0;

        for image in gltf.images() {
            let (source, data, mime_type) = match image.source() {
                gltf::image::Source::Uri { uri, mime_type } => {
                    let source = self.display_uri(uri);
                    let data = match self.load_uri(uri).await {
                        Ok(data) => data,
                        Err(error) => {
                            return Err(MissingTextureError::new(&source, error.to_string()).into())
                        }
                    };
                    (source, data, mime_type)
                }
                gltf::image::Source::View { view, mime_type } => {
                    let buffer = &buffers[view.buffer().index()];
                    let begin = view.offset();
                    let end = begin + view.length();

                    if end > buffer.len() {
                        return Err(Error::new(format!(
                            "Image {} reads past the end of buffer {}",
                            image.index(),
                            view.buffer().index()
                        ))
                        .into());
                    }

                    (
                        format!("image {}", image.index()),
                        Arc::from(&buffer[begin..end]),
                        Some(mime_type),
                    )
                }
            };

            decode_image(&source, &data, mime_type)?;
            log::debug!("Decoded image {source}");
            count += 1;
        }

        Ok(count)
    }

    async fn load_uri(&mut self, uri: &str) -> Result<Arc<[u8]>> {
        if let Some(encoded) = uri.strip_prefix("data:") {
            return decode_data_uri(encoded);
        }

        let uri_data = read_uri(self.fetcher, &self.request, uri).await?;
        if let Some(key) = uri_data.key {
            self.used_keys.insert(key);
        }

        Ok(uri_data.data)
    }

    fn display_uri(&self, uri: &str) -> String {
        let key = resource_key(self.request.root_path, uri);

        match self.request.resources.contains_key(&key)
            || ObjectUrlStore::is_object_url(self.request.url)
        {
            true => key,
            false => resolve_relative(self.request.url, uri),
        }
    }
}

/// Map key a relative URI is stored under. The URI is percent-decoded first.
pub fn resource_key(root_path: &str, uri: &str) -> String {
    let relative = uri
        .strip_prefix("./")
        .or_else(|| uri.strip_prefix('/'))
        .unwrap_or(uri);
    let relative = percent_encoding::percent_decode_str(relative).decode_utf8_lossy();
    format!("{root_path}{relative}")
}

/// Looks `uri` up in the resource map, then falls back to fetching it relative to the load URL.
async fn read_uri<F: ResourceFetcher>(
    fetcher: &F,
    request: &LoadRequest<'_>,
    uri: &str,
) -> Result<UriData> {
    let is_root = uri == request.url;
    let key = match is_root {
        true => uri.to_string(),
        false => resource_key(request.root_path, uri),
    };

    if let Some(resource) = request.resources.get(&key) {
        log::debug!("Resolved {uri} from resource {key}");
        return Ok(UriData {
            data: resource.shared_data(),
            key: Some(key),
        });
    }

    if ObjectUrlStore::is_object_url(request.url) {
        return Err(FetchError::new(&key, "not part of the dropped files").into());
    }

    let url = match is_root {
        true => uri.to_string(),
        false => resolve_relative(request.url, uri),
    };

    Ok(UriData {
        data: fetcher.fetch(&url).await?.into(),
        key: None,
    })
}

fn decode_data_uri(encoded: &str) -> Result<Arc<[u8]>> {
    let (header, payload) = match encoded.split_once(',') {
        Some(parts) => parts,
        None => return Err(Error::new(String::from("Malformed data URI.")).into()),
    };

    if !header.ends_with(";base64") {
        return Err(Error::new(format!("Unsupported data URI encoding: {header}")).into());
    }

    let data = base64::engine::general_purpose::STANDARD.decode(payload)?;
    Ok(data.into())
}

fn decode_image(source: &str, data: &[u8], mime_type: Option<&str>) -> Result<()> {
    let image_format = match mime_type {
        Some(mime_type) => match image::ImageFormat::from_mime_type(mime_type) {
            Some(image_format) => Some(image_format),
            None => {
                return Err(MissingTextureError::new(
                    source,
                    format!("The given MIME type is not supported: {mime_type}"),
                )
                .into())
            }
        },
        None => None,
    };

    let decoded = match image_format {
        Some(image_format) => image::load_from_memory_with_format(data, image_format),
        None => image::load_from_memory(data),
    };

    match decoded {
        Ok(_) => Ok(()),
        Err(error) => Err(MissingTextureError::new(source, error.to_string()).into()),
    }
}

fn load_node(node: &gltf::Node, visited: &mut HashSet<usize>) -> Result<SceneNode> {
    if !visited.insert(node.index()) {
        return Err(Error::new(format!(
            "A node with the given ID has already been loaded: {}",
            node.index()
        ))
        .into());
    }

    log::debug!(
        "Loading glTF node: {} - [{}]",
        node.name().unwrap_or("<UNNAMED>"),
        node.index()
    );

    let mut children = vec![];
    for child in node.children() {
        children.push(load_node(&child, visited)?);
    }

    Ok(SceneNode {
        name: node.name().map(String::from),
        local_transform: node.transform().into(),
        primitive_count: node.mesh().map_or(0, |mesh| mesh.primitives().count()),
        children,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::classify::classify;
    use crate::fetch::tests::MemoryFetcher;
    use crate::resource::{Resource, ResourceMap};

    const SCENE: &str = r#"{
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"nodes": [0]}],
        "nodes": [
            {"name": "Root", "children": [1]},
            {"name": "Sofa", "translation": [1, 2, 3]}
        ],
        "buffers": [{"uri": "scene.bin", "byteLength": 4}]
    }"#;

    const TEXTURED: &str = r#"{
        "asset": {"version": "2.0"},
        "scenes": [{"nodes": [0]}],
        "nodes": [{"name": "Box"}],
        "images": [{"uri": "textures/color.png"}]
    }"#;

    fn png() -> Vec<u8> {
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image::RgbaImage::new(1, 1))
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn resources(entries: &[(&str, Vec<u8>)]) -> ResourceMap {
        entries
            .iter()
            .map(|(key, data)| (key.to_string(), Resource::from_path_bytes(key, data.clone())))
            .collect()
    }

    fn renderer(files: &[(&str, &[u8])]) -> SceneGraphRenderer<MemoryFetcher> {
        SceneGraphRenderer::new(RendererSettings::default(), MemoryFetcher::new(files))
    }

    fn load_dropped(
        renderer: &mut SceneGraphRenderer<MemoryFetcher>,
        root_key: &str,
        root_path: &str,
        map: &ResourceMap,
    ) -> Result<SceneHandle> {
        let store = ObjectUrlStore::new();
        let temporary = store.create(map.get(root_key).unwrap());
        let request = LoadRequest {
            url: temporary.url(),
            root_path,
            resources: map,
            object_urls: &store,
        };
        pollster::block_on(renderer.load(request))
    }

    #[test]
    fn loads_dropped_files_through_the_resource_map() {
        let map = resources(&[
            ("/Sofa/scene.gltf", SCENE.as_bytes().to_vec()),
            ("/Sofa/scene.bin", vec![0; 4]),
            ("/Sofa/unused.png", png()),
        ]);
        let mut renderer = renderer(&[]);

        let handle = load_dropped(&mut renderer, "/Sofa/scene.gltf", "/Sofa/", &map).unwrap();

        assert_eq!(handle.index, 0);
        assert_eq!(handle.asset_id, "scene.gltf");
        assert_eq!(handle.node_count, 2);
        assert_eq!(handle.used_keys, vec!["/Sofa/scene.bin".to_string()]);

        let group = &mut renderer.scene_mut().children[0];
        let sofa = group.find_mut("Sofa").unwrap();
        assert_eq!(sofa.local_transform.translation, cgmath::Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn remote_roots_fetch_their_dependencies() {
        let mut renderer = renderer(&[
            ("https://example.com/Sofa/scene.gltf", SCENE.as_bytes()),
            ("https://example.com/Sofa/scene.bin", &b"\0\0\0\0"[..]),
        ]);
        let store = ObjectUrlStore::new();
        let map = ResourceMap::new();
        let request = LoadRequest {
            url: "https://example.com/Sofa/scene.gltf",
            root_path: "",
            resources: &map,
            object_urls: &store,
        };

        let handle = pollster::block_on(renderer.load(request)).unwrap();

        assert_eq!(handle.asset_id, "scene.gltf");
        assert!(handle.used_keys.is_empty());
        assert_eq!(store.created_count(), 0);
    }

    #[test]
    fn scenes_accumulate_until_cleared() {
        let map = resources(&[
            ("scene.gltf", SCENE.as_bytes().to_vec()),
            ("scene.bin", vec![0; 4]),
        ]);
        let mut renderer = renderer(&[]);

        load_dropped(&mut renderer, "scene.gltf", "", &map).unwrap();
        let second = load_dropped(&mut renderer, "scene.gltf", "", &map).unwrap();

        assert_eq!(second.index, 1);
        assert_eq!(renderer.scene().children.len(), 2);

        renderer.clear();
        assert!(renderer.scene().children.is_empty());
    }

    #[test]
    fn missing_dropped_buffer_is_a_transport_error() {
        let map = resources(&[("scene.gltf", SCENE.as_bytes().to_vec())]);
        let mut renderer = renderer(&[]);

        let error = load_dropped(&mut renderer, "scene.gltf", "", &map).unwrap_err();

        assert!(error.chain().any(|cause| cause.is::<FetchError>()));
        assert!(renderer.scene().children.is_empty());
    }

    #[test]
    fn short_buffers_are_rejected() {
        let map = resources(&[
            ("scene.gltf", SCENE.as_bytes().to_vec()),
            ("scene.bin", vec![0; 2]),
        ]);
        let mut renderer = renderer(&[]);

        let error = load_dropped(&mut renderer, "scene.gltf", "", &map).unwrap_err();

        assert!(error.to_string().contains("shorter than declared"));
    }

    #[test]
    fn embedded_buffers_are_decoded() {
        let document = SCENE.replace(
            "\"uri\": \"scene.bin\"",
            "\"uri\": \"data:application/octet-stream;base64,AAAAAA==\"",
        );
        let map = resources(&[("scene.gltf", document.into_bytes())]);
        let mut renderer = renderer(&[]);

        let handle = load_dropped(&mut renderer, "scene.gltf", "", &map).unwrap();

        assert!(handle.used_keys.is_empty());
    }

    #[test]
    fn textures_are_decoded() {
        let map = resources(&[
            ("/Box/Box.gltf", TEXTURED.as_bytes().to_vec()),
            ("/Box/textures/color.png", png()),
        ]);
        let mut renderer = renderer(&[]);

        let handle = load_dropped(&mut renderer, "/Box/Box.gltf", "/Box/", &map).unwrap();

        assert_eq!(handle.image_count, 1);
        assert_eq!(handle.used_keys, vec!["/Box/textures/color.png".to_string()]);
    }

    #[test]
    fn missing_texture_is_reported_by_name() {
        let map = resources(&[("/Box/Box.gltf", TEXTURED.as_bytes().to_vec())]);
        let mut renderer = renderer(&[]);

        let error = load_dropped(&mut renderer, "/Box/Box.gltf", "/Box/", &map).unwrap_err();

        assert!(error.is::<MissingTextureError>());
        assert_eq!(classify(&error), "Missing texture: color.png");
    }

    #[test]
    fn undecodable_texture_counts_as_missing() {
        let map = resources(&[
            ("/Box/Box.gltf", TEXTURED.as_bytes().to_vec()),
            ("/Box/textures/color.png", b"not a png".to_vec()),
        ]);
        let mut renderer = renderer(&[]);

        let error = load_dropped(&mut renderer, "/Box/Box.gltf", "/Box/", &map).unwrap_err();

        assert_eq!(classify(&error), "Missing texture: color.png");
    }

    #[test]
    fn malformed_documents_fail_to_parse() {
        let map = resources(&[("scene.gltf", b"<!DOCTYPE html>".to_vec())]);
        let mut renderer = renderer(&[]);

        let error = load_dropped(&mut renderer, "scene.gltf", "", &map).unwrap_err();

        assert!(classify(&error).starts_with("Unable to parse file content"));
    }

    #[test]
    fn camera_starts_at_the_configured_position() {
        let settings = RendererSettings {
            preset: String::new(),
            camera_position: Some([0.0, 0.0, 4.0]),
        };
        let mut renderer = SceneGraphRenderer::new(settings, MemoryFetcher::new(&[]));

        let translation = renderer.controls().calculate_camera_transform().translation;

        assert!((translation.z - 4.0).abs() < 1e-4);
        assert!((renderer.scene().camera.translation.z - 4.0).abs() < 1e-4);
    }

    #[test]
    fn auto_rotation_moves_the_scene_camera() {
        let mut renderer = renderer(&[]);
        let before = renderer.scene().camera.translation;

        assert!(!renderer.update(std::time::Duration::from_secs(1)));

        renderer.controls().toggle_auto_rotate();
        assert!(renderer.update(std::time::Duration::from_secs(1)));
        assert_ne!(renderer.scene().camera.translation, before);
    }

    #[test]
    fn resource_keys_strip_relative_prefixes() {
        assert_eq!(resource_key("/Sofa/", "./scene.bin"), "/Sofa/scene.bin");
        assert_eq!(resource_key("/Sofa/", "textures/a.png"), "/Sofa/textures/a.png");
        assert_eq!(resource_key("", "scene.bin"), "scene.bin");
        assert_eq!(resource_key("/Sofa/", "my%20scene.bin"), "/Sofa/my scene.bin");
    }

    #[test]
    fn percent_encoded_uris_match_dropped_file_names() {
        let document = r#"{
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": [0]}],
            "nodes": [{"name": "Box"}],
            "buffers": [{"uri": "my%20scene.bin", "byteLength": 4}],
            "images": [{"uri": "textures/base%20color.png"}]
        }"#;
        let map = resources(&[
            ("/Box/Box.gltf", document.as_bytes().to_vec()),
            ("/Box/my scene.bin", vec![0; 4]),
            ("/Box/textures/base color.png", png()),
        ]);
        let mut renderer = renderer(&[]);

        let handle = load_dropped(&mut renderer, "/Box/Box.gltf", "/Box/", &map).unwrap();

        assert_eq!(handle.image_count, 1);
        assert_eq!(
            handle.used_keys,
            vec![
                "/Box/my scene.bin".to_string(),
                "/Box/textures/base color.png".to_string()
            ]
        );
    }
}
