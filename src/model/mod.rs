// MODEL: Game state and data
pub mod appliance;
pub mod bowls;
pub mod camera;
pub mod hud;
pub mod player;
pub mod scene;
pub mod tickets;

pub use appliance::{CookerState, RiceCooker, COOKER_COUNT};
pub use bowls::{BowlContents, BowlPools, HeldBowl, POOL_CAPACITY};
pub use camera::Camera;
pub use hud::{Hud, OrderLine, Prompt};
pub use player::{Basis, Player};
pub use scene::{CameraId, NodeId, SceneBindings, SceneGraph, Shape, Transform};
pub use tickets::{OrderKind, Ticket, TicketBoard, TICKET_SLOTS};
