/// Events emitted during a corridor step.
/// The frame driver consumes these for sound.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunEvent {
    Hurt { x: usize },
    Died,
    ReachedGoal,
}
