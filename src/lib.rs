/// Level HUD: screen-state controller for a level scene.
///
/// `hud` is the engine-independent core. `sim` and `ui` are the terminal
/// host the `levelhud` binary runs it in.

pub mod config;
pub mod hud;
pub mod sim;
pub mod ui;
