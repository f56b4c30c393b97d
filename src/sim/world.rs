/// Corridor level: the playable part of a level scene.
///
/// A single row of cells. The player starts at the left end and walks
/// toward the goal at the right end; every spike stepped onto costs one hit
/// point. Layout is derived from the level number so each level differs
/// without needing level files.

use crate::hud::host::PlayerStatus;
use crate::sim::event::RunEvent;

const BASE_LENGTH: usize = 24;
const LENGTH_PER_LEVEL: usize = 6;
const MAX_EXTRA_LEVELS: usize = 8;
/// No spikes this close to the start or the goal.
const SAFE_MARGIN: usize = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Floor,
    Spike,
    Goal,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct RunPlayer {
    pub x: usize,
    pub hp: u32,
    pub won: bool,
    pub lost: bool,
}

#[derive(Clone, Debug)]
pub struct CorridorWorld {
    pub tiles: Vec<Tile>,
    pub player: RunPlayer,
    pub tick: u64,
}

impl CorridorWorld {
    pub fn for_level(number: i64, hit_points: u32) -> Self {
        let n = number.clamp(1, MAX_EXTRA_LEVELS as i64 + 1) as usize;
        let len = BASE_LENGTH + LENGTH_PER_LEVEL * (n - 1);
        // Spikes get denser as levels go up
        let spacing = 9usize.saturating_sub(n).max(3);

        let tiles = (0..len)
            .map(|x| {
                if x == len - 1 {
                    Tile::Goal
                } else if x >= SAFE_MARGIN
                    && x + SAFE_MARGIN < len
                    && (x + n * 2) % spacing == 0
                {
                    Tile::Spike
                } else {
                    Tile::Floor
                }
            })
            .collect();

        CorridorWorld {
            tiles,
            player: RunPlayer { x: 0, hp: hit_points, won: false, lost: hit_points == 0 },
            tick: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn is_over(&self) -> bool {
        self.player.won || self.player.lost
    }

    /// Advance one game tick. Does nothing once the run is over.
    pub fn step(&mut self, movement: Option<MoveDir>) -> Vec<RunEvent> {
        let mut events = Vec::new();
        if self.is_over() {
            return events;
        }
        self.tick += 1;

        let Some(dir) = movement else { return events };
        let p = &mut self.player;
        let target = match dir {
            MoveDir::Left => p.x.checked_sub(1),
            MoveDir::Right => (p.x + 1 < self.tiles.len()).then_some(p.x + 1),
        };
        let Some(x) = target else { return events };
        p.x = x;

        match self.tiles[x] {
            Tile::Floor => {}
            Tile::Spike => {
                p.hp = p.hp.saturating_sub(1);
                events.push(RunEvent::Hurt { x });
                if p.hp == 0 {
                    p.lost = true;
                    events.push(RunEvent::Died);
                }
            }
            Tile::Goal => {
                p.won = true;
                events.push(RunEvent::ReachedGoal);
            }
        }
        events
    }
}

impl PlayerStatus for CorridorWorld {
    fn hit_points(&self) -> u32 {
        self.player.hp
    }
    fn has_won(&self) -> bool {
        self.player.won
    }
    fn has_lost(&self) -> bool {
        self.player.lost
    }
}
