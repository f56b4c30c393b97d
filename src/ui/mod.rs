pub mod gamepad;
pub mod host;
pub mod input;
pub mod renderer;
pub mod sound;
