pub mod controller;
pub mod error;
pub mod hearts;
pub mod host;
pub mod level;
pub mod screen;

pub use controller::{ControllerBuilder, ScreenStateController};
pub use error::HudError;
pub use host::{AudioManager, CanvasHost, LevelHost, PlayerStatus, SceneHost, SceneRequest};
pub use screen::{Canvas, ScreenState};
