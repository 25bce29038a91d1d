use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::camera::OrbitalCameraController;
use crate::object_url::ObjectUrlStore;
use crate::options::AppOptions;
use crate::render::scene::Scene;
use crate::resource::ResourceMap;

pub mod loader;
pub mod scene;

/// What a renderer needs to load one asset.
#[derive(Clone, Copy)]
pub struct LoadRequest<'a> {
    pub url: &'a str,
    pub root_path: &'a str,
    pub resources: &'a ResourceMap,
    pub object_urls: &'a ObjectUrlStore,
}

/// A loaded asset, as the child it was added as in the session scene.
#[derive(Clone, Debug)]
pub struct SceneHandle {
    pub index: usize,
    pub asset_id: String,
    /// Raw bytes of the root document, kept for validation.
    pub document: Arc<[u8]>,
    /// Resource map keys the asset referenced.
    pub used_keys: Vec<String>,
    pub node_count: usize,
    pub image_count: usize,
}

#[cfg(test)]
impl SceneHandle {
    pub fn for_test(index: usize, asset_id: &str) -> Self {
        Self {
            index,
            asset_id: asset_id.to_string(),
            document: Arc::from(&b"{}"[..]),
            used_keys: vec![],
            node_count: 0,
            image_count: 0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RendererSettings {
    pub preset: String,
    pub camera_position: Option<[f32; 3]>,
}

impl From<&AppOptions> for RendererSettings {
    fn from(value: &AppOptions) -> Self {
        Self {
            preset: value.preset.clone(),
            camera_position: value.camera_position,
        }
    }
}

pub trait Renderer {
    fn load(&mut self, request: LoadRequest<'_>) -> impl Future<Output = Result<SceneHandle>>;
    fn clear(&mut self);
    fn scene(&self) -> &Scene;
    fn scene_mut(&mut self) -> &mut Scene;
    fn controls(&mut self) -> &mut OrbitalCameraController;

    /// Advances the orbit controls and moves the scene camera. Returns whether it moved.
    fn update(&mut self, delta_time: Duration) -> bool {
        match self.controls().generate_updated_camera_transform(delta_time) {
            Some(transform) => {
                self.scene_mut().camera = transform;
                true
            }
            None => false,
        }
    }
}
