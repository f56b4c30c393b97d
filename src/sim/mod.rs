pub mod event;
pub mod scene;
pub mod world;
