// CONTROLLER: Input, game logic, and update loop
pub mod camera_controller;
pub mod input;
pub mod interaction;
pub mod session;

pub use camera_controller::{CameraRig, PlayerController};
pub use input::{Action, InputEvent, InputState, Key, KeyBindings};
pub use interaction::{Interaction, Surroundings};
pub use session::Session;
