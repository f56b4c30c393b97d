/// Entry point and frame loop.

use std::cell::RefCell;
use std::fs::File;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use tracing::{error, info, Level};

use levelhud::config::GameConfig;
use levelhud::hud::controller::NEXT_LEVEL_BUTTON_PATH;
use levelhud::hud::level::LevelIdentity;
use levelhud::hud::{Canvas, ControllerBuilder, HudError, SceneHost, SceneRequest, ScreenStateController};
use levelhud::sim::event::RunEvent;
use levelhud::sim::scene::{SceneCatalog, SceneKind};
use levelhud::sim::world::{CorridorWorld, MoveDir};
use levelhud::ui::gamepad::GamepadState;
use levelhud::ui::host::{HeartId, TerminalHost, QUIT_BUTTON_PATH, RESTART_BUTTON_PATH, RESUME_BUTTON_PATH};
use levelhud::ui::input::InputState;
use levelhud::ui::renderer::{Renderer, View};
use levelhud::ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

type SharedWorld = Rc<RefCell<CorridorWorld>>;
type SharedSound = Rc<RefCell<SoundEngine>>;
type Hud = ScreenStateController<SharedWorld, SharedSound, HeartId>;

enum Scene {
    Menu,
    Level { world: SharedWorld, hud: Hud },
}

fn main() {
    let (config, config_source) = GameConfig::load();
    init_logging(&config);
    config_source.log();

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("fatal: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Log to a file; the terminal belongs to the renderer.
fn init_logging(config: &GameConfig) {
    if config.log.file.is_empty() {
        return;
    }
    let file = match File::create(&config.log.file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Cannot open log file {}: {e}", config.log.file);
            return;
        }
    };
    let level = config.log.level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
}

fn game_loop(renderer: &mut Renderer, config: &GameConfig) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = SceneCatalog::from_config(config);
    let mut host = TerminalHost::new(catalog, &config.hud.pause_key)?;
    let sound: SharedSound = Rc::new(RefCell::new(SoundEngine::new(&config.hud.tracks)));

    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let mut last_tick = Instant::now();
    let mut last_frame = Instant::now();
    let mut anim_tick: u64 = 0;

    let menu = host.catalog().menu_index();
    let mut scene = enter_scene(menu, &mut host, &sound, config)?;
    info!(scenes = host.catalog().len(), "started");

    loop {
        kb.drain_events();
        gp.update();
        host.begin_frame(&kb, &gp);

        if kb.ctrl_c_pressed() {
            break;
        }

        match &mut scene {
            Scene::Menu => {
                if kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed() {
                    match host.catalog().first_level() {
                        Some(first) => host.load_scene(SceneRequest::Index(first)),
                        None => info!("no level scenes configured"),
                    }
                } else if kb.any_pressed(KEYS_EXIT) || gp.cancel_pressed() {
                    break;
                }
            }
            Scene::Level { world, hud } => {
                if last_tick.elapsed() >= tick_rate {
                    // Time scale 0 freezes the corridor
                    if host.time_scale() > 0.0 {
                        let events = world.borrow_mut().step(detect_movement(&kb, &gp));
                        process_sound_events(&sound, &events, config);
                    }
                    last_tick = Instant::now();
                }

                hud.tick(&mut host);
                handle_buttons(hud, &mut host, &kb, &gp, config);
            }
        }

        let now = Instant::now();
        sound.borrow_mut().update(now.duration_since(last_frame).as_secs_f32());
        last_frame = now;

        if let Some(index) = host.take_pending() {
            scene = enter_scene(index, &mut host, &sound, config)?;
            last_tick = Instant::now();
        }

        anim_tick = anim_tick.wrapping_add(1);
        match &scene {
            Scene::Menu => renderer.render(&View::Menu { catalog: host.catalog(), anim_tick })?,
            Scene::Level { world, .. } => {
                let world = world.borrow();
                renderer.render(&View::Level { host: &host, world: &world, pause_key: &config.hud.pause_key })?;
            }
        }
        std::thread::sleep(FRAME_SLEEP);
    }

    info!("exiting");
    Ok(())
}

/// Activate a scene and build whatever runs in it.
fn enter_scene(
    index: usize,
    host: &mut TerminalHost,
    sound: &SharedSound,
    config: &GameConfig,
) -> Result<Scene, HudError> {
    host.enter_scene(index);
    match host.catalog().kind(index) {
        SceneKind::Menu => Ok(Scene::Menu),
        SceneKind::Level => {
            let level = LevelIdentity::parse(&host.active_scene_name())?;
            let world = Rc::new(RefCell::new(CorridorWorld::for_level(
                level.number(),
                config.player.hit_points,
            )));
            let hud = ControllerBuilder::new(config.hud.clone())
                .player(Rc::clone(&world))
                .audio(Rc::clone(sound))
                .build(host)?;
            Ok(Scene::Level { world, hud })
        }
    }
}

fn process_sound_events(sound: &SharedSound, events: &[RunEvent], config: &GameConfig) {
    for event in events {
        if let RunEvent::Hurt { .. } = event {
            sound.borrow_mut().play_hurt(&config.hud.tracks.hurt);
        }
    }
}

/// Canvas buttons. A button only reacts while it is shown.
fn handle_buttons(hud: &mut Hud, host: &mut TerminalHost, kb: &InputState, gp: &GamepadState, config: &GameConfig) {
    let overlay = hud.screen().canvas();

    // The pause key already toggled this frame
    if kb.any_pressed(KEYS_PAUSE_BUTTON) && !host.key_down(&config.hud.pause_key) {
        if overlay == Canvas::InGame || host.element_active(overlay, RESUME_BUTTON_PATH) {
            hud.toggle_pause(host);
        }
        return;
    }

    if (kb.any_pressed(KEYS_RESTART) || gp.restart_pressed()) && host.element_active(overlay, RESTART_BUTTON_PATH) {
        hud.restart(host);
    } else if (kb.any_pressed(KEYS_QUIT) || gp.cancel_pressed()) && host.element_active(overlay, QUIT_BUTTON_PATH) {
        hud.quit(host);
    } else if (kb.any_pressed(KEYS_NEXT) || gp.confirm_pressed()) && host.element_active(overlay, NEXT_LEVEL_BUTTON_PATH) {
        hud.next_level(host);
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_EXIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_PAUSE_BUTTON: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_NEXT: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N')];

fn detect_movement(kb: &InputState, gp: &GamepadState) -> Option<MoveDir> {
    if kb.any_held(KEYS_LEFT) || kb.any_pressed(KEYS_LEFT) || gp.left_held() {
        Some(MoveDir::Left)
    } else if kb.any_held(KEYS_RIGHT) || kb.any_pressed(KEYS_RIGHT) || gp.right_held() {
        Some(MoveDir::Right)
    } else {
        None
    }
}
