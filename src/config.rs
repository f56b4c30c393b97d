/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::hud::hearts::Vec2;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub hud: HudConfig,
    pub scenes: SceneConfig,
    pub player: PlayerConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
    pub tick_rate_ms: u64,
}

/// Author-set knobs of the level HUD.
#[derive(Clone, Debug)]
pub struct HudConfig {
    pub heart_pos: Vec2,
    pub heart_gap: f32,
    pub show_health: bool,
    pub pause_key: String,
    pub tracks: TrackNames,
    pub menu_scene: String,
}

#[derive(Clone, Debug)]
pub struct TrackNames {
    pub level_theme: String,
    pub victory: String,
    pub defeat: String,
    pub hurt: String,
}

#[derive(Clone, Debug)]
pub struct SceneConfig {
    /// Scene names in build order; position = scene index.
    pub order: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct PlayerConfig {
    pub hit_points: u32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub pause: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub restart: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Log file path. Empty disables logging.
    pub file: String,
    pub level: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    hud: TomlHud,
    #[serde(default)]
    audio: TomlAudio,
    #[serde(default)]
    scenes: TomlScenes,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlHud {
    #[serde(default = "default_heart_x")]
    heart_x: f32,
    #[serde(default = "default_heart_y")]
    heart_y: f32,
    #[serde(default = "default_heart_gap")]
    heart_gap: f32,
    #[serde(default = "default_true")]
    show_health: bool,
    #[serde(default = "default_pause_key")]
    pause_key: String,
}

#[derive(Deserialize, Debug)]
struct TomlAudio {
    #[serde(default = "default_level_theme")]
    level_theme: String,
    #[serde(default = "default_victory")]
    victory: String,
    #[serde(default = "default_defeat")]
    defeat: String,
    #[serde(default = "default_hurt")]
    hurt: String,
}

#[derive(Deserialize, Debug)]
struct TomlScenes {
    #[serde(default = "default_main_menu")]
    main_menu: String,
    #[serde(default = "default_scene_order")]
    order: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlPlayer {
    #[serde(default = "default_hit_points")]
    hit_points: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_pause")]
    pause: Vec<String>,
    #[serde(default = "default_pad_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_pad_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_pad_restart")]
    restart: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

// ── Defaults ──

fn default_heart_x() -> f32 { 30.0 }
fn default_heart_y() -> f32 { 60.0 }
fn default_heart_gap() -> f32 { 60.0 }
fn default_true() -> bool { true }
fn default_pause_key() -> String { "Esc".into() }

fn default_level_theme() -> String { "Level Theme".into() }
fn default_victory() -> String { "Victory Jingle".into() }
fn default_defeat() -> String { "Defeat Jingle".into() }
fn default_hurt() -> String { "Hurt".into() }

fn default_main_menu() -> String { "Main Menu".into() }
fn default_scene_order() -> Vec<String> {
    vec!["Main Menu".into(), "Level 1".into(), "Level 2".into(), "Level 3".into()]
}

fn default_hit_points() -> u32 { 3 }

fn default_pad_pause() -> Vec<String> { vec!["Start".into()] }
fn default_pad_confirm() -> Vec<String> { vec!["A".into()] }
fn default_pad_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_pad_restart() -> Vec<String> { vec!["Y".into()] }

fn default_log_file() -> String { "levelhud.log".into() }
fn default_log_level() -> String { "info".into() }

fn default_tick_rate() -> u64 { 90 }

impl Default for TomlHud {
    fn default() -> Self {
        TomlHud {
            heart_x: default_heart_x(),
            heart_y: default_heart_y(),
            heart_gap: default_heart_gap(),
            show_health: default_true(),
            pause_key: default_pause_key(),
        }
    }
}

impl Default for TomlAudio {
    fn default() -> Self {
        TomlAudio {
            level_theme: default_level_theme(),
            victory: default_victory(),
            defeat: default_defeat(),
            hurt: default_hurt(),
        }
    }
}

impl Default for TomlScenes {
    fn default() -> Self {
        TomlScenes {
            main_menu: default_main_menu(),
            order: default_scene_order(),
        }
    }
}

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer { hit_points: default_hit_points() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            pause: default_pad_pause(),
            confirm: default_pad_confirm(),
            cancel: default_pad_cancel(),
            restart: default_pad_restart(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { tick_rate_ms: default_tick_rate() }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        GameConfig {
            hud: HudConfig {
                heart_pos: Vec2::new(t.hud.heart_x, t.hud.heart_y),
                heart_gap: t.hud.heart_gap,
                show_health: t.hud.show_health,
                pause_key: t.hud.pause_key,
                tracks: TrackNames {
                    level_theme: t.audio.level_theme,
                    victory: t.audio.victory,
                    defeat: t.audio.defeat,
                    hurt: t.audio.hurt,
                },
                menu_scene: t.scenes.main_menu,
            },
            scenes: SceneConfig { order: t.scenes.order },
            player: PlayerConfig { hit_points: t.player.hit_points },
            gamepad: GamepadConfig {
                pause: t.gamepad.pause,
                confirm: t.gamepad.confirm,
                cancel: t.gamepad.cancel,
                restart: t.gamepad.restart,
            },
            log: LogConfig {
                file: t.log.file,
                level: t.log.level,
            },
            tick_rate_ms: t.general.tick_rate_ms,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

impl Default for HudConfig {
    fn default() -> Self {
        GameConfig::default().hud
    }
}

// ── Loading ──

/// Where the loaded config came from. Loading runs before the log
/// subscriber exists, so the caller logs this afterwards.
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    /// No config.toml in any candidate directory.
    Defaults,
    /// A config.toml was found but could not be read or parsed.
    Unusable { path: PathBuf, error: String },
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!(path = %path.display(), "loaded config"),
            ConfigSource::Defaults => info!("no config.toml found, using defaults"),
            ConfigSource::Unusable { path, error } => {
                warn!(path = %path.display(), "config.toml unusable, using defaults: {error}")
            }
        }
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG data home, (4) system data directory.
    /// Missing file or missing keys fall back to defaults.
    pub fn load() -> (Self, ConfigSource) {
        let (parsed, source) = load_toml(&candidate_dirs());
        (parsed.into(), source)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(Into::into)
    }
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/levelhud");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    let sys = PathBuf::from("/usr/share/levelhud");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories. The first one found wins,
/// even if it turns out to be unusable.
fn load_toml(search_dirs: &[PathBuf]) -> (TomlConfig, ConfigSource) {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            return match read_toml(&path) {
                Ok(cfg) => (cfg, ConfigSource::File(path)),
                Err(e) => (
                    TomlConfig::default(),
                    ConfigSource::Unusable { path, error: e.to_string() },
                ),
            };
        }
    }
    (TomlConfig::default(), ConfigSource::Defaults)
}

fn read_toml(path: &Path) -> Result<TomlConfig, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.hud.heart_gap, 60.0);
        assert!(cfg.hud.show_health);
        assert_eq!(cfg.hud.pause_key, "Esc");
        assert_eq!(cfg.hud.menu_scene, "Main Menu");
        assert_eq!(cfg.hud.tracks.level_theme, "Level Theme");
        assert_eq!(cfg.hud.tracks.victory, "Victory Jingle");
        assert_eq!(cfg.hud.tracks.defeat, "Defeat Jingle");
        assert_eq!(cfg.scenes.order[0], "Main Menu");
        assert_eq!(cfg.player.hit_points, 3);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            r#"
            [hud]
            heart_gap = 45.0
            pause_key = "P"

            [scenes]
            order = ["Main Menu", "Forest 1", "Forest 2"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.hud.heart_gap, 45.0);
        assert_eq!(cfg.hud.pause_key, "P");
        assert_eq!(cfg.hud.heart_pos, Vec2::new(30.0, 60.0));
        assert_eq!(cfg.scenes.order, vec!["Main Menu", "Forest 1", "Forest 2"]);
        assert_eq!(cfg.hud.menu_scene, "Main Menu");
        assert_eq!(cfg.log.level, "info");
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("levelhud-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn unusable_file_falls_back_and_reports_why() {
        let dir = scratch_dir("bad");
        std::fs::write(dir.join("config.toml"), "[hud]\nheart_gap = \"wide\"").unwrap();

        let (cfg, source) = load_toml(&[dir.clone()]);
        let cfg: GameConfig = cfg.into();
        assert_eq!(cfg.hud.heart_gap, 60.0);
        match source {
            ConfigSource::Unusable { path, error } => {
                assert_eq!(path, dir.join("config.toml"));
                assert!(!error.is_empty());
            }
            other => panic!("expected Unusable, got {other:?}"),
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn first_config_found_is_used() {
        let empty = scratch_dir("empty");
        let good = scratch_dir("good");
        std::fs::write(good.join("config.toml"), "[player]\nhit_points = 5").unwrap();

        let (cfg, source) = load_toml(&[empty.clone(), good.clone()]);
        assert_eq!(GameConfig::from(cfg).player.hit_points, 5);
        assert!(matches!(source, ConfigSource::File(ref p) if *p == good.join("config.toml")));

        let (_, source) = load_toml(&[empty.clone()]);
        assert!(matches!(source, ConfigSource::Defaults));

        std::fs::remove_dir_all(&empty).unwrap();
        std::fs::remove_dir_all(&good).unwrap();
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(GameConfig::from_toml_str("[hud]\nshow_health = \"yes\"").is_err());
    }
}
