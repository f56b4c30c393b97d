/// Scene catalog: the ordered list of scenes the frame driver can load.
///
/// Position in the list is the scene's build index. The menu scene is named
/// in config; every other scene is a level and must be named
/// `"<label> <number>"`.

use crate::config::GameConfig;
use crate::hud::host::SceneRequest;

#[derive(Clone, Debug)]
pub struct SceneCatalog {
    names: Vec<String>,
    menu: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SceneKind {
    Menu,
    Level,
}

impl SceneCatalog {
    pub fn new(names: Vec<String>, menu: impl Into<String>) -> Self {
        let menu = menu.into();
        let mut names = names;
        if !names.contains(&menu) {
            names.insert(0, menu.clone());
        }
        SceneCatalog { names, menu }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.scenes.order.clone(), config.hud.menu_scene.clone())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn menu_index(&self) -> usize {
        self.index_of(&self.menu).unwrap_or(0)
    }

    pub fn kind(&self, index: usize) -> SceneKind {
        match self.name(index) {
            Some(name) if name == self.menu => SceneKind::Menu,
            _ => SceneKind::Level,
        }
    }

    /// First level scene in build order.
    pub fn first_level(&self) -> Option<usize> {
        (0..self.names.len()).find(|&i| self.kind(i) == SceneKind::Level)
    }

    pub fn resolve(&self, request: &SceneRequest) -> Option<usize> {
        match request {
            SceneRequest::Name(name) => self.index_of(name),
            SceneRequest::Index(i) => (*i < self.names.len()).then_some(*i),
        }
    }
}
