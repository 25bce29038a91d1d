use anyhow::Result;

use crate::data::transform::Transform;
use crate::error::Error;
use crate::placement::Placement;
use crate::render::SceneHandle;

pub struct SceneNode {
    pub name: Option<String>,
    pub local_transform: Transform,
    pub primitive_count: usize,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn group(name: impl Into<String>, children: Vec<SceneNode>) -> Self {
        Self {
            name: Some(name.into()),
            local_transform: Transform::default(),
            primitive_count: 0,
            children,
        }
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        if self.name.as_deref() == Some(name) {
            return Some(self);
        }

        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(name))
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }
}

/// Everything loaded into a viewer session. Every load appends one child.
#[derive(Default)]
pub struct Scene {
    pub children: Vec<SceneNode>,
    /// World transform of the camera, driven by the orbit controls.
    pub camera: Transform,
}

impl Scene {
    pub fn add(&mut self, node: SceneNode) -> usize {
        self.children.push(node);
        self.children.len() - 1
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn asset_mut(&mut self, handle: &SceneHandle) -> Result<&mut SceneNode> {
        match self.children.get_mut(handle.index) {
            Some(node) if node.name.as_deref() == Some(handle.asset_id.as_str()) => Ok(node),
            _ => Err(Error::new(format!(
                "The asset {} is no longer part of the scene",
                handle.asset_id
            ))
            .into()),
        }
    }

    /// Applies `placement` to its anchor inside the asset loaded as `handle`.
    pub fn place(&mut self, handle: &SceneHandle, placement: &Placement) -> Result<()> {
        let asset = self.asset_mut(handle)?;

        let node = match &placement.anchor {
            Some(anchor) => match asset.find_mut(anchor) {
                Some(node) => node,
                None => {
                    return Err(Error::new(format!(
                        "No node named {anchor} exists in asset {}",
                        handle.asset_id
                    ))
                    .into())
                }
            },
            None => asset,
        };

        if let Some(position) = placement.position {
            node.local_transform.translation = position.into();
        }

        if let Some(scale) = placement.scale {
            node.local_transform.scale_uniformly(scale);
        }

        Ok(())
    }
}
