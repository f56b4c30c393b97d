/// Terminal scene host.
///
/// Implements the HUD's `SceneHost` and `CanvasHost` on top of the scene
/// catalog, the keyboard/gamepad trackers and a small retained UI tree
/// that the renderer draws from. Scene loads are queued and applied by the
/// frame driver at the end of the frame.

use std::collections::{HashMap, HashSet};

use crossterm::event::KeyCode;
use tracing::{info, warn};

use crate::hud::controller::{LEVEL_NUMBER_PATH, NEXT_LEVEL_BUTTON_PATH};
use crate::hud::hearts::Vec2;
use crate::hud::host::{CanvasHost, SceneHost, SceneRequest};
use crate::hud::screen::Canvas;
use crate::sim::scene::SceneCatalog;
use crate::ui::gamepad::GamepadState;
use crate::ui::input::{parse_key, InputError, InputState};

pub const RESUME_BUTTON_PATH: &str = "Resume Button";
pub const RESTART_BUTTON_PATH: &str = "Restart Button";
pub const QUIT_BUTTON_PATH: &str = "Quit Button";

#[derive(Clone, Debug, PartialEq)]
pub struct UiElement {
    pub path: &'static str,
    pub text: String,
    pub active: bool,
}

#[derive(Clone, Debug, Default)]
pub struct CanvasNode {
    pub active: bool,
    /// Draw order.
    pub elements: Vec<UiElement>,
}

impl CanvasNode {
    fn with(elements: &[(&'static str, &str)]) -> Self {
        CanvasNode {
            active: false,
            elements: elements
                .iter()
                .map(|&(path, text)| UiElement { path, text: text.to_string(), active: true })
                .collect(),
        }
    }

    fn find_mut(&mut self, path: &str) -> Option<&mut UiElement> {
        self.elements.iter_mut().find(|e| e.path == path)
    }

    pub fn find(&self, path: &str) -> Option<&UiElement> {
        self.elements.iter().find(|e| e.path == path)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeartSprite {
    pub canvas: Canvas,
    pub pos: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeartId(usize);

pub struct TerminalHost {
    catalog: SceneCatalog,
    active: usize,
    pending: Option<usize>,
    time_scale: f32,

    bindings: HashMap<String, KeyCode>,
    pad_pause_binding: String,
    pressed: HashSet<String>,

    canvases: HashMap<Canvas, CanvasNode>,
    hearts: Vec<Option<HeartSprite>>,
}

impl TerminalHost {
    /// `pause_binding` is also triggered by the gamepad's pause button.
    pub fn new(catalog: SceneCatalog, pause_binding: &str) -> Result<Self, InputError> {
        let mut bindings = HashMap::new();
        bindings.insert(pause_binding.to_string(), parse_key(pause_binding)?);

        let active = catalog.menu_index();
        Ok(TerminalHost {
            catalog,
            active,
            pending: None,
            time_scale: 1.0,
            bindings,
            pad_pause_binding: pause_binding.to_string(),
            pressed: HashSet::new(),
            canvases: HashMap::new(),
            hearts: Vec::new(),
        })
    }

    pub fn catalog(&self) -> &SceneCatalog {
        &self.catalog
    }

    /// Latch this frame's pressed bindings.
    pub fn begin_frame(&mut self, kb: &InputState, gp: &GamepadState) {
        self.pressed.clear();
        for (name, code) in &self.bindings {
            if kb.was_pressed(*code) {
                self.pressed.insert(name.clone());
            }
        }
        if gp.pause_pressed() {
            self.pressed.insert(self.pad_pause_binding.clone());
        }
    }

    pub fn take_pending(&mut self) -> Option<usize> {
        self.pending.take()
    }

    /// Switch to a scene: drops the previous scene's UI and hearts.
    pub fn enter_scene(&mut self, index: usize) {
        self.active = index;
        self.hearts.clear();
        self.canvases = level_canvases();
        info!(scene = self.catalog.name(index).unwrap_or("?"), index, "scene active");
    }

    pub fn canvas(&self, canvas: Canvas) -> Option<&CanvasNode> {
        self.canvases.get(&canvas)
    }

    pub fn visible_canvases(&self) -> Vec<Canvas> {
        Canvas::ALL
            .into_iter()
            .filter(|c| self.canvases.get(c).map_or(false, |n| n.active))
            .collect()
    }

    pub fn element_active(&self, canvas: Canvas, path: &str) -> bool {
        self.canvases
            .get(&canvas)
            .map_or(false, |n| n.active && n.find(path).map_or(false, |e| e.active))
    }

    pub fn hearts(&self) -> impl Iterator<Item = &HeartSprite> {
        self.hearts.iter().flatten()
    }
}

/// UI tree of a level scene.
fn level_canvases() -> HashMap<Canvas, CanvasNode> {
    let mut map = HashMap::new();
    map.insert(Canvas::InGame, CanvasNode::with(&[(LEVEL_NUMBER_PATH, "")]));
    map.insert(
        Canvas::Paused,
        CanvasNode::with(&[
            (LEVEL_NUMBER_PATH, ""),
            (RESUME_BUTTON_PATH, "[P] Resume"),
            (RESTART_BUTTON_PATH, "[R] Restart"),
            (QUIT_BUTTON_PATH, "[Q] Quit"),
        ]),
    );
    map.insert(
        Canvas::Win,
        CanvasNode::with(&[
            (LEVEL_NUMBER_PATH, ""),
            (NEXT_LEVEL_BUTTON_PATH, "[N] Next Level"),
            (RESTART_BUTTON_PATH, "[R] Restart"),
            (QUIT_BUTTON_PATH, "[Q] Quit"),
        ]),
    );
    map.insert(
        Canvas::Lose,
        CanvasNode::with(&[
            (LEVEL_NUMBER_PATH, ""),
            (RESTART_BUTTON_PATH, "[R] Restart"),
            (QUIT_BUTTON_PATH, "[Q] Quit"),
        ]),
    );
    map
}

impl SceneHost for TerminalHost {
    fn load_scene(&mut self, request: SceneRequest) {
        match self.catalog.resolve(&request) {
            Some(index) => {
                info!(?request, index, "scene load requested");
                self.pending = Some(index);
            }
            None => warn!(?request, "scene not in catalog"),
        }
    }

    fn active_scene_name(&self) -> String {
        self.catalog.name(self.active).unwrap_or_default().to_string()
    }

    fn active_scene_index(&self) -> usize {
        self.active
    }

    fn can_scene_be_loaded(&self, name: &str) -> bool {
        self.catalog.contains(name)
    }

    fn time_scale(&self) -> f32 {
        self.time_scale
    }

    fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    fn key_down(&self, binding: &str) -> bool {
        self.pressed.contains(binding)
    }
}

impl CanvasHost for TerminalHost {
    type Heart = HeartId;

    fn set_canvas_active(&mut self, canvas: Canvas, active: bool) {
        self.canvases.entry(canvas).or_default().active = active;
    }

    fn set_text(&mut self, canvas: Canvas, path: &str, text: &str) -> bool {
        match self.canvases.get_mut(&canvas).and_then(|n| n.find_mut(path)) {
            Some(el) => {
                el.text = text.to_string();
                true
            }
            None => false,
        }
    }

    fn set_element_active(&mut self, canvas: Canvas, path: &str, active: bool) -> bool {
        match self.canvases.get_mut(&canvas).and_then(|n| n.find_mut(path)) {
            Some(el) => {
                el.active = active;
                true
            }
            None => false,
        }
    }

    fn spawn_heart(&mut self, canvas: Canvas, pos: Vec2) -> HeartId {
        let sprite = HeartSprite { canvas, pos };
        match self.hearts.iter().position(Option::is_none) {
            Some(slot) => {
                self.hearts[slot] = Some(sprite);
                HeartId(slot)
            }
            None => {
                self.hearts.push(Some(sprite));
                HeartId(self.hearts.len() - 1)
            }
        }
    }

    fn destroy_heart(&mut self, heart: HeartId) {
        if let Some(slot) = self.hearts.get_mut(heart.0) {
            *slot = None;
        }
    }
}
