/// Screen state machine for a level.
///
/// Exactly one of the four canvases is visible at a time, and which one is a
/// pure function of the current `ScreenState`. `Won` and `Lost` are terminal
/// for the win/lose triggers: once entered, the level instance never enters
/// either of them again.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Canvas {
    InGame,
    Paused,
    Win,
    Lose,
}

impl Canvas {
    pub const ALL: [Canvas; 4] = [Canvas::InGame, Canvas::Paused, Canvas::Win, Canvas::Lose];
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ScreenState {
    #[default]
    Playing,
    Paused,
    Won,
    Lost,
}

impl ScreenState {
    /// The single canvas shown for this screen.
    pub fn canvas(self) -> Canvas {
        match self {
            ScreenState::Playing => Canvas::InGame,
            ScreenState::Paused => Canvas::Paused,
            ScreenState::Won => Canvas::Win,
            ScreenState::Lost => Canvas::Lose,
        }
    }

    /// Result of a pause-key press. `None` means the press is ignored.
    pub fn toggled(self) -> Option<ScreenState> {
        match self {
            ScreenState::Playing => Some(ScreenState::Paused),
            ScreenState::Paused => Some(ScreenState::Playing),
            ScreenState::Won | ScreenState::Lost => None,
        }
    }

    /// Win/lose triggers only fire before the level has ended.
    pub fn accepts_outcome(self) -> bool {
        matches!(self, ScreenState::Playing | ScreenState::Paused)
    }
}
