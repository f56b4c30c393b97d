/// Errors raised while bringing a level's HUD up.
///
/// All of these describe a misconfigured scene. They are returned from
/// `ControllerBuilder::build` and are never recovered from at runtime.

use std::num::ParseIntError;

use thiserror::Error;

use crate::hud::screen::Canvas;

#[derive(Debug, Error)]
pub enum HudError {
    #[error("level scene has no player entity")]
    MissingPlayer,

    #[error("level scene has no audio manager")]
    MissingAudio,

    #[error("scene name {name:?} must end in a space-separated level number")]
    SceneName {
        name: String,
        #[source]
        source: ParseIntError,
    },

    #[error("level number in scene name {name:?} cannot be incremented")]
    LevelNumberOverflow { name: String },

    #[error("{canvas:?} canvas has no element at {path:?}")]
    MissingElement { canvas: Canvas, path: &'static str },
}
