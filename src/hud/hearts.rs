/// Heart row: one icon per hit point on the in-game canvas.
///
/// The row is never diffed. Whenever the count is wrong every icon is
/// destroyed and the whole row is spawned again, left to right from the
/// base position.

use crate::hud::host::CanvasHost;
use crate::hud::screen::Canvas;

/// Canvas-space position (UI units, not terminal cells).
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }
}

/// Position of the `index`-th heart.
pub fn heart_position(base: Vec2, gap: f32, index: usize) -> Vec2 {
    Vec2::new(base.x + gap * index as f32, base.y)
}

pub struct HeartRow<K> {
    base: Vec2,
    gap: f32,
    icons: Vec<K>,
}

impl<K> HeartRow<K> {
    pub fn new(base: Vec2, gap: f32) -> Self {
        HeartRow { base, gap, icons: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    pub fn needs_redraw(&self, hit_points: u32) -> bool {
        self.icons.len() != hit_points as usize
    }

    /// Destroy every icon, then spawn exactly `hit_points` new ones.
    pub fn redraw<H>(&mut self, host: &mut H, hit_points: u32)
    where
        H: CanvasHost<Heart = K> + ?Sized,
    {
        self.clear(host);
        for i in 0..hit_points as usize {
            let pos = heart_position(self.base, self.gap, i);
            self.icons.push(host.spawn_heart(Canvas::InGame, pos));
        }
    }

    pub fn clear<H>(&mut self, host: &mut H)
    where
        H: CanvasHost<Heart = K> + ?Sized,
    {
        for icon in self.icons.drain(..) {
            host.destroy_heart(icon);
        }
    }
}
