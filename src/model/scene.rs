//! Scene graph collaborator: a flat list of named transforms plus cameras,
//! read from a TOML layout, and the one-time binding of the nodes gameplay
//! needs.

use std::env;
use std::fs;
use std::path::Path;

use glam::{Mat4, Quat, Vec3};
use serde::Deserialize;

use crate::error::SceneError;
use crate::model::bowls::{BowlContents, POOL_CAPACITY};
use crate::model::camera::Camera;

/// Path to a scene file replacing the bundled kitchen layout.
pub const SCENE_ENV_VAR: &str = "KITCHEN_SCENE";

/// The kitchen layout shipped with the game.
pub const BUNDLED_SCENE: &str = include_str!("../../assets/kitchen.scene.toml");

pub const PLAYER_NODE: &str = "Player";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Handle to a camera, only handed out by [`SceneBindings::bind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(usize);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Unit box standing on its origin: x/y in [-0.5, 0.5], z in [0, 1].
    #[default]
    Box,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transform {
    pub name: String,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default = "identity")]
    pub rotation: Quat,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    #[serde(default = "grey")]
    pub color: [f32; 4],
    #[serde(default)]
    pub shape: Shape,
}

fn identity() -> Quat {
    Quat::IDENTITY
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

fn grey() -> [f32; 4] {
    [0.6, 0.6, 0.6, 1.0]
}

impl Transform {
    pub fn local_to_world(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[derive(Debug, Deserialize)]
struct CameraDesc {
    #[serde(default = "default_fov")]
    fov_y_degrees: f32,
    #[serde(default = "default_near")]
    z_near: f32,
    #[serde(default = "default_far")]
    z_far: f32,
}

fn default_fov() -> f32 {
    60.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    1000.0
}

#[derive(Debug, Deserialize)]
struct SceneFile {
    #[serde(default, rename = "node")]
    nodes: Vec<Transform>,
    #[serde(default, rename = "camera")]
    cameras: Vec<CameraDesc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    transforms: Vec<Transform>,
    cameras: Vec<Camera>,
}

impl SceneGraph {
    pub fn from_toml_str(src: &str) -> Result<Self, SceneError> {
        let file: SceneFile = toml::from_str(src)?;
        let cameras = file
            .cameras
            .into_iter()
            .map(|c| Camera::new(c.fov_y_degrees.to_radians(), c.z_near, c.z_far))
            .collect();
        Ok(Self {
            transforms: file.nodes,
            cameras,
        })
    }

    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let src = fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    pub fn bundled() -> Result<Self, SceneError> {
        Self::from_toml_str(BUNDLED_SCENE)
    }

    /// The file named by [`SCENE_ENV_VAR`], else the bundled layout.
    pub fn from_env() -> Result<Self, SceneError> {
        match env::var(SCENE_ENV_VAR) {
            Ok(path) => {
                tracing::info!(%path, "loading scene");
                Self::load(Path::new(&path))
            }
            Err(_) => Self::bundled(),
        }
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.transforms.iter().position(|t| t.name == name).map(NodeId)
    }

    pub fn node(&self, id: NodeId) -> &Transform {
        &self.transforms[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Transform {
        &mut self.transforms[id.0]
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn camera(&self, id: CameraId) -> &Camera {
        &self.cameras[id.0]
    }

    pub fn camera_mut(&mut self, id: CameraId) -> &mut Camera {
        &mut self.cameras[id.0]
    }
}

/// Typed handles to every node gameplay drives. Built once; a missing name
/// or a camera count other than one is fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBindings {
    pub player: NodeId,
    pub camera: CameraId,
    /// Indexed by [`BowlContents::index`], then slot.
    pub bowls: [[NodeId; POOL_CAPACITY]; 4],
}

impl SceneBindings {
    pub fn bind(scene: &SceneGraph) -> Result<Self, SceneError> {
        let require = |name: &str| scene.find(name).ok_or_else(|| SceneError::MissingNode(name.to_string()));

        let player = require(PLAYER_NODE)?;
        let mut bowls = [[player; POOL_CAPACITY]; 4];
        for contents in BowlContents::ALL {
            for (slot, node) in bowls[contents.index()].iter_mut().enumerate() {
                *node = require(&contents.node_name(slot))?;
            }
        }

        if scene.cameras().len() != 1 {
            return Err(SceneError::CameraCount(scene.cameras().len()));
        }

        tracing::debug!(nodes = scene.transforms().len(), "scene bound");
        Ok(Self {
            player,
            camera: CameraId(0),
            bowls,
        })
    }

    pub fn bowl(&self, contents: BowlContents, slot: usize) -> NodeId {
        self.bowls[contents.index()][slot]
    }

    pub fn all_bowls(&self) -> impl Iterator<Item = (BowlContents, usize, NodeId)> + '_ {
        BowlContents::ALL.into_iter().flat_map(move |contents| {
            self.bowls[contents.index()]
                .iter()
                .enumerate()
                .map(move |(slot, node)| (contents, slot, *node))
        })
    }
}
