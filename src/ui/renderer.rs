/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// Each frame is composed into `front`, compared cell by cell with `back`
/// (the previous frame), and only changed cells are emitted. Commands are
/// batched with `queue!` and flushed once, then the buffers swap.
///
/// The level view draws the corridor underneath and every visible canvas of
/// the `TerminalHost` on top of it, so whatever the HUD controller toggles is
/// exactly what appears on screen.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::hud::controller::LEVEL_NUMBER_PATH;
use crate::hud::hearts::Vec2;
use crate::hud::host::SceneHost;
use crate::hud::screen::Canvas;
use crate::sim::scene::{SceneCatalog, SceneKind};
use crate::sim::world::{CorridorWorld, Tile};
use crate::ui::host::TerminalHost;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every "empty" cell. Clearing with the same
    /// RGB keeps row gaps on VTE terminals the same color as the cells.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Differs from any real cell, so every position gets diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let x = centered_col(self.width, s.chars().count());
        self.put_str(x, y, s, fg, bg);
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for row in y..y + h {
            for col in x..x + w {
                self.set(col, row, Cell::new(' ', Color::Reset, bg));
            }
        }
    }
}

// ── Layout ──

/// Canvas-space pixels per terminal column / row.
const PX_PER_COL: f32 = 30.0;
const PX_PER_ROW: f32 = 30.0;

const LABEL_ROW: usize = 0;
const CORRIDOR_ROW: usize = 5;
const HELP_ROW_FROM_BOTTOM: usize = 2;

const HEART_FG: Color = Color::Rgb { r: 230, g: 50, b: 70 };
const TITLE_FG: Color = Color::Rgb { r: 255, g: 220, b: 50 };
const KEY_FG: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const DIM_FG: Color = Color::Rgb { r: 120, g: 120, b: 120 };
const BOX_BG: Color = Color::Rgb { r: 40, g: 40, b: 40 };

fn centered_col(width: usize, len: usize) -> usize {
    width.saturating_sub(len) / 2
}

/// Terminal cell a canvas-space position lands on.
fn heart_cell(pos: Vec2) -> (usize, usize) {
    let col = (pos.x / PX_PER_COL).round().max(0.0) as usize;
    let row = (pos.y / PX_PER_ROW).round().max(0.0) as usize;
    (col, row)
}

fn canvas_title(canvas: Canvas) -> &'static str {
    match canvas {
        Canvas::InGame => "",
        Canvas::Paused => "PAUSED",
        Canvas::Win => "LEVEL COMPLETE",
        Canvas::Lose => "YOU DIED",
    }
}

/// What to draw this frame.
pub enum View<'a> {
    Menu { catalog: &'a SceneCatalog, anim_tick: u64 },
    Level { host: &'a TerminalHost, world: &'a CorridorWorld, pause_key: &'a str },
}

impl View<'_> {
    fn scene_key(&self) -> usize {
        match self {
            View::Menu { catalog, .. } => catalog.menu_index(),
            View::Level { host, .. } => host.active_scene_index(),
        }
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_scene: Option<usize>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_scene: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, view: &View) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Scene change → clear for a clean transition
        let scene = view.scene_key();
        if self.last_scene != Some(scene) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_scene = Some(scene);
        }

        self.front.clear();
        match view {
            View::Menu { catalog, anim_tick } => self.compose_menu(catalog, *anim_tick),
            View::Level { host, world, pause_key } => self.compose_level(host, world, pause_key),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors, not ResetColor: the terminal default may
        // differ from BASE_BG.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Main menu ──

    fn compose_menu(&mut self, catalog: &SceneCatalog, anim_tick: u64) {
        let top = self.term_h / 3;
        self.front.put_centered(top, "╔══════════════════╗", TITLE_FG, Color::Reset);
        self.front.put_centered(top + 1, "║    MAIN  MENU    ║", TITLE_FG, Color::Reset);
        self.front.put_centered(top + 2, "╚══════════════════╝", TITLE_FG, Color::Reset);

        let levels: Vec<&str> = (0..catalog.len())
            .filter(|&i| catalog.kind(i) == SceneKind::Level)
            .filter_map(|i| catalog.name(i))
            .collect();
        let mut row = top + 4;
        for name in &levels {
            self.front.put_centered(row, name, DIM_FG, Color::Reset);
            row += 1;
        }

        // Blink the prompt
        let prompt = if levels.is_empty() {
            "No levels configured   [Q] Quit"
        } else if (anim_tick / 8) % 2 == 0 {
            "[Enter] Start   [Q] Quit"
        } else {
            "                        "
        };
        self.front.put_centered(row + 1, prompt, KEY_FG, Color::Reset);
    }

    // ── Level scene ──

    fn compose_level(&mut self, host: &TerminalHost, world: &CorridorWorld, pause_key: &str) {
        self.compose_corridor(world);

        for canvas in host.visible_canvases() {
            match canvas {
                Canvas::InGame => self.compose_in_game(host),
                overlay => self.compose_overlay(host, overlay),
            }
        }

        if self.term_h > HELP_ROW_FROM_BOTTOM {
            let help = format!(" ←/→ Move   {pause_key} Pause   Ctrl-C Exit");
            self.front.put_str(0, self.term_h - HELP_ROW_FROM_BOTTOM, &help, DIM_FG, Color::Reset);
        }
    }

    fn compose_corridor(&mut self, world: &CorridorWorld) {
        let x0 = centered_col(self.front.width, world.len());
        for (i, tile) in world.tiles.iter().enumerate() {
            let cell = if i == world.player.x {
                let fg = if world.player.lost { DIM_FG } else { Color::White };
                Cell::new('@', fg, Color::Reset)
            } else {
                match tile {
                    Tile::Floor => Cell::new('·', Color::DarkGrey, Color::Reset),
                    Tile::Spike => Cell::new('^', Color::Rgb { r: 200, g: 60, b: 60 }, Color::Reset),
                    Tile::Goal => Cell::new('⚑', Color::Rgb { r: 80, g: 220, b: 120 }, Color::Reset),
                }
            };
            self.front.set(x0 + i, CORRIDOR_ROW, cell);
        }
        let floor: String = "▀".repeat(world.len());
        self.front.put_str(x0, CORRIDOR_ROW + 1, &floor, Color::Rgb { r: 70, g: 60, b: 40 }, Color::Reset);
    }

    fn compose_in_game(&mut self, host: &TerminalHost) {
        if let Some(label) = host.canvas(Canvas::InGame).and_then(|n| n.find(LEVEL_NUMBER_PATH)) {
            self.front.put_str(1, LABEL_ROW, &label.text, TITLE_FG, Color::Reset);
        }
        for heart in host.hearts().filter(|h| h.canvas == Canvas::InGame) {
            let (col, row) = heart_cell(heart.pos);
            self.front.set(col, row, Cell::new('♥', HEART_FG, Color::Reset));
        }
    }

    fn compose_overlay(&mut self, host: &TerminalHost, canvas: Canvas) {
        let Some(node) = host.canvas(canvas) else { return };

        let box_w = 30_usize.min(self.front.width);
        let box_h = (node.elements.len() + 4).min(self.front.height);
        let box_x = centered_col(self.front.width, box_w);
        let box_y = CORRIDOR_ROW.saturating_sub(2);
        self.front.fill_rect(box_x, box_y, box_w, box_h, BOX_BG);

        let title = canvas_title(canvas);
        self.front.put_str(box_x + centered_col(box_w, title.len()), box_y + 1, title, TITLE_FG, BOX_BG);

        let mut row = box_y + 2;
        for el in node.elements.iter().filter(|e| e.active) {
            let fg = if el.path == LEVEL_NUMBER_PATH { Color::White } else { KEY_FG };
            let len = el.text.chars().count();
            self.front.put_str(box_x + centered_col(box_w, len), row, &el.text, fg, BOX_BG);
            row += 1;
        }
    }
}
