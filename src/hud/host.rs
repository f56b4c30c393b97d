/// Collaborator interfaces the HUD controller drives.
///
/// The controller owns none of these. A frame driver implements them on top
/// of whatever renders, plays sound and loads scenes, then hands them to
/// `ControllerBuilder` and `ScreenStateController::tick`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::hud::hearts::Vec2;
use crate::hud::screen::Canvas;

/// Read-only view of the level's player.
pub trait PlayerStatus {
    fn hit_points(&self) -> u32;
    fn has_won(&self) -> bool;
    fn has_lost(&self) -> bool;
}

/// The process-wide audio manager.
pub trait AudioManager {
    fn is_playing(&self, track: &str) -> bool;
    fn play(&mut self, track: &str);
    fn fade_in(&mut self, track: &str);
    /// Pause pausable voices and duck the music.
    fn pause(&mut self);
    fn resume(&mut self);
    /// Resume, then fade everything out from the ducked level.
    fn resume_with_fadeout(&mut self);
    fn stop_all(&mut self);
    fn fade_out_all(&mut self);
    fn stop_pausable_sounds(&mut self);
}

/// Target of a scene-load request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneRequest {
    Name(String),
    Index(usize),
}

pub trait SceneHost {
    /// Fire-and-forget; the host decides when the switch happens.
    fn load_scene(&mut self, request: SceneRequest);
    fn active_scene_name(&self) -> String;
    fn active_scene_index(&self) -> usize;
    fn can_scene_be_loaded(&self, name: &str) -> bool;
    fn time_scale(&self) -> f32;
    fn set_time_scale(&mut self, scale: f32);
    /// Was the key bound to `binding` pressed down this frame?
    fn key_down(&self, binding: &str) -> bool;
}

/// UI side of the host: canvases, elements addressed by path, heart icons.
pub trait CanvasHost {
    type Heart;

    fn set_canvas_active(&mut self, canvas: Canvas, active: bool);
    /// Returns false when the canvas has no text element at `path`.
    fn set_text(&mut self, canvas: Canvas, path: &str, text: &str) -> bool;
    /// Returns false when the canvas has no element at `path`.
    fn set_element_active(&mut self, canvas: Canvas, path: &str, active: bool) -> bool;
    fn spawn_heart(&mut self, canvas: Canvas, pos: Vec2) -> Self::Heart;
    fn destroy_heart(&mut self, heart: Self::Heart);
}

/// Everything a level scene host provides.
pub trait LevelHost: SceneHost + CanvasHost {}

impl<T: SceneHost + CanvasHost> LevelHost for T {}

// ── Shared handles ──
//
// The frame driver keeps ownership of the player and the audio manager and
// shares them with the controller through `Rc<RefCell<_>>`.

impl<T: PlayerStatus + ?Sized> PlayerStatus for Rc<RefCell<T>> {
    fn hit_points(&self) -> u32 {
        self.borrow().hit_points()
    }
    fn has_won(&self) -> bool {
        self.borrow().has_won()
    }
    fn has_lost(&self) -> bool {
        self.borrow().has_lost()
    }
}

impl<T: AudioManager + ?Sized> AudioManager for Rc<RefCell<T>> {
    fn is_playing(&self, track: &str) -> bool {
        self.borrow().is_playing(track)
    }
    fn play(&mut self, track: &str) {
        self.borrow_mut().play(track)
    }
    fn fade_in(&mut self, track: &str) {
        self.borrow_mut().fade_in(track)
    }
    fn pause(&mut self) {
        self.borrow_mut().pause()
    }
    fn resume(&mut self) {
        self.borrow_mut().resume()
    }
    fn resume_with_fadeout(&mut self) {
        self.borrow_mut().resume_with_fadeout()
    }
    fn stop_all(&mut self) {
        self.borrow_mut().stop_all()
    }
    fn fade_out_all(&mut self) {
        self.borrow_mut().fade_out_all()
    }
    fn stop_pausable_sounds(&mut self) {
        self.borrow_mut().stop_pausable_sounds()
    }
}
