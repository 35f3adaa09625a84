//! A short third-person cooking round: carry bowls between the stack, the
//! rice box, three rice cookers and the delivery hatch, and fill the orders
//! on the ticket board before they run out.

pub mod audio;
pub mod config;
pub mod error;
pub mod logging;

// MVC Architecture
pub mod controller;
pub mod model;
pub mod view;

pub use config::Tuning;
pub use controller::Session;
pub use error::{AudioError, ConfigError, SceneError, StartupError};
pub use model::SceneGraph;
