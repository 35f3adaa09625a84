// VIEW: Rendering and graphics
pub mod gpu_init;
pub mod render;
pub mod ui;

pub use gpu_init::GpuContext;
pub use render::SceneRenderer;

use crate::model::{Camera, Hud, SceneGraph};

/// Everything needed to draw one frame, borrowed from the session.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub scene: &'a SceneGraph,
    pub camera: &'a Camera,
    pub hud: &'a Hud,
}

/// Drawing collaborator. The native host implements it with wgpu + egui;
/// tests can record frames instead.
pub trait Renderer {
    fn draw(&mut self, frame: &FrameView<'_>);
}
