/// Level screen controller.
///
/// Owns the screen state of one level instance. The frame driver builds it
/// once when the level scene becomes active and calls `tick` every rendered
/// frame, including while the time scale is 0: pausing freezes game time,
/// not the HUD.
///
/// Per frame, in this order:
///   1. heart row reconciled against the player's hit points
///   2. pause key toggles Playing <-> Paused
///   3. win check
///   4. lose check
///
/// Win is checked before lose, so a frame where both hold ends on `Won`.

use tracing::{debug, info, warn};

use crate::config::HudConfig;
use crate::hud::error::HudError;
use crate::hud::hearts::HeartRow;
use crate::hud::host::{AudioManager, LevelHost, PlayerStatus, SceneRequest};
use crate::hud::level::LevelIdentity;
use crate::hud::screen::{Canvas, ScreenState};

/// Text element showing the level name on every canvas.
pub const LEVEL_NUMBER_PATH: &str = "Level number";
/// Button on the win canvas; hidden when there is no next level.
pub const NEXT_LEVEL_BUTTON_PATH: &str = "Next Level Button";

/// Collects the controller's collaborators before the level starts.
pub struct ControllerBuilder<P, A> {
    config: HudConfig,
    player: Option<P>,
    audio: Option<A>,
}

impl<P: PlayerStatus, A: AudioManager> ControllerBuilder<P, A> {
    pub fn new(config: HudConfig) -> Self {
        ControllerBuilder { config, player: None, audio: None }
    }

    pub fn player(mut self, player: P) -> Self {
        self.player = Some(player);
        self
    }

    pub fn audio(mut self, audio: A) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Bring the level HUD up against the active scene.
    pub fn build<H>(self, host: &mut H) -> Result<ScreenStateController<P, A, H::Heart>, HudError>
    where
        H: LevelHost + ?Sized,
    {
        let player = self.player.ok_or(HudError::MissingPlayer)?;
        let audio = self.audio.ok_or(HudError::MissingAudio)?;
        let config = self.config;

        let level = LevelIdentity::parse(&host.active_scene_name())?;

        let label = level.display_label();
        for canvas in Canvas::ALL {
            if !host.set_text(canvas, LEVEL_NUMBER_PATH, &label) {
                return Err(HudError::MissingElement { canvas, path: LEVEL_NUMBER_PATH });
            }
        }

        let next_level_exists = host.can_scene_be_loaded(level.next_name());
        if !next_level_exists
            && !host.set_element_active(Canvas::Win, NEXT_LEVEL_BUTTON_PATH, false)
        {
            return Err(HudError::MissingElement {
                canvas: Canvas::Win,
                path: NEXT_LEVEL_BUTTON_PATH,
            });
        }

        let mut controller = ScreenStateController {
            hearts: HeartRow::new(config.heart_pos, config.heart_gap),
            screen: ScreenState::Playing,
            config,
            player,
            audio,
            level,
            next_level_exists,
        };
        controller.show_screen(host);

        if controller.config.show_health {
            let hp = controller.player.hit_points();
            controller.hearts.redraw(host, hp);
        }

        let theme = controller.config.tracks.level_theme.as_str();
        if !controller.audio.is_playing(theme) {
            controller.audio.fade_in(theme);
        }

        info!(
            level = controller.level.name(),
            next = controller.level.next_name(),
            next_exists = controller.next_level_exists,
            "level HUD ready"
        );
        Ok(controller)
    }
}

pub struct ScreenStateController<P, A, K> {
    config: HudConfig,
    player: P,
    audio: A,
    screen: ScreenState,
    hearts: HeartRow<K>,
    level: LevelIdentity,
    next_level_exists: bool,
}

impl<P: PlayerStatus, A: AudioManager, K> ScreenStateController<P, A, K> {
    pub fn screen(&self) -> ScreenState {
        self.screen
    }

    pub fn level(&self) -> &LevelIdentity {
        &self.level
    }

    pub fn next_level_exists(&self) -> bool {
        self.next_level_exists
    }

    /// Per-frame reconciliation.
    pub fn tick<H>(&mut self, host: &mut H)
    where
        H: LevelHost<Heart = K> + ?Sized,
    {
        if self.config.show_health {
            let hp = self.player.hit_points();
            if self.hearts.needs_redraw(hp) {
                debug!(from = self.hearts.len(), to = hp, "redrawing hearts");
                self.hearts.redraw(host, hp);
            }
        }

        if host.key_down(&self.config.pause_key) {
            self.toggle_pause(host);
        }

        if self.player.has_won() && self.screen.accepts_outcome() {
            self.enter_won(host);
        }

        if self.player.has_lost() && self.screen.accepts_outcome() {
            self.enter_lost(host);
        }
    }

    pub fn toggle_pause<H>(&mut self, host: &mut H)
    where
        H: LevelHost<Heart = K> + ?Sized,
    {
        match self.screen.toggled() {
            Some(ScreenState::Paused) => self.pause(host),
            Some(ScreenState::Playing) => self.resume(host),
            _ => debug!(screen = ?self.screen, "pause ignored"),
        }
    }

    pub fn pause<H>(&mut self, host: &mut H)
    where
        H: LevelHost<Heart = K> + ?Sized,
    {
        if self.screen != ScreenState::Playing {
            warn!(screen = ?self.screen, "pause requested outside play");
            return;
        }
        self.screen = ScreenState::Paused;
        host.set_time_scale(0.0);
        self.show_screen(host);
        self.audio.pause();
        info!(level = self.level.name(), "paused");
    }

    pub fn resume<H>(&mut self, host: &mut H)
    where
        H: LevelHost<Heart = K> + ?Sized,
    {
        if self.screen != ScreenState::Paused {
            warn!(screen = ?self.screen, "resume requested while not paused");
            return;
        }
        self.screen = ScreenState::Playing;
        host.set_time_scale(1.0);
        self.show_screen(host);
        self.audio.resume();
        info!(level = self.level.name(), "resumed");
    }

    /// Leave for the menu scene.
    pub fn quit<H>(&mut self, host: &mut H)
    where
        H: LevelHost<Heart = K> + ?Sized,
    {
        // Paused audio is already ducked; fade from there instead of jumping back up
        if host.time_scale() == 0.0 {
            self.audio.resume_with_fadeout();
        } else {
            self.audio.fade_out_all();
        }
        host.set_time_scale(1.0);
        info!(level = self.level.name(), menu = %self.config.menu_scene, "quitting to menu");
        host.load_scene(SceneRequest::Name(self.config.menu_scene.clone()));
    }

    /// Reload the active scene.
    pub fn restart<H>(&mut self, host: &mut H)
    where
        H: LevelHost<Heart = K> + ?Sized,
    {
        self.audio.stop_pausable_sounds();
        host.set_time_scale(1.0);
        self.audio.resume();
        let index = host.active_scene_index();
        info!(level = self.level.name(), index, "restarting level");
        host.load_scene(SceneRequest::Index(index));
    }

    /// Load the next level. Returns false, and does nothing, when it does not exist.
    pub fn next_level<H>(&mut self, host: &mut H) -> bool
    where
        H: LevelHost<Heart = K> + ?Sized,
    {
        if !self.next_level_exists {
            warn!(level = self.level.name(), "no next level");
            return false;
        }
        self.audio.fade_out_all();
        host.set_time_scale(1.0);
        self.audio.resume();
        info!(next = self.level.next_name(), "advancing to next level");
        host.load_scene(SceneRequest::Name(self.level.next_name().to_string()));
        true
    }

    // ── Internal ──

    fn enter_won<H>(&mut self, host: &mut H)
    where
        H: LevelHost<Heart = K> + ?Sized,
    {
        self.screen = ScreenState::Won;
        self.show_screen(host);
        self.audio.stop_all();
        self.audio.play(&self.config.tracks.victory);
        info!(level = self.level.name(), "level won");
    }

    fn enter_lost<H>(&mut self, host: &mut H)
    where
        H: LevelHost<Heart = K> + ?Sized,
    {
        self.screen = ScreenState::Lost;
        self.show_screen(host);
        self.audio.fade_in(&self.config.tracks.defeat);
        info!(level = self.level.name(), "level lost");
    }

    fn show_screen<H>(&self, host: &mut H)
    where
        H: LevelHost + ?Sized,
    {
        let visible = self.screen.canvas();
        for canvas in Canvas::ALL {
            host.set_canvas_active(canvas, canvas == visible);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::rc::Rc;

    use crate::hud::hearts::Vec2;
    use crate::hud::host::{CanvasHost, SceneHost};

    // ── Fakes ──

    #[derive(Default)]
    struct FakePlayer {
        hp: u32,
        won: bool,
        lost: bool,
    }

    impl PlayerStatus for FakePlayer {
        fn hit_points(&self) -> u32 { self.hp }
        fn has_won(&self) -> bool { self.won }
        fn has_lost(&self) -> bool { self.lost }
    }

    /// Audio manager that records every call.
    #[derive(Default)]
    struct RecordingAudio {
        calls: Vec<String>,
        playing: HashSet<String>,
    }

    impl RecordingAudio {
        fn count(&self, call: &str) -> usize {
            self.calls.iter().filter(|c| c.as_str() == call).count()
        }
    }

    impl AudioManager for RecordingAudio {
        fn is_playing(&self, track: &str) -> bool { self.playing.contains(track) }
        fn play(&mut self, track: &str) {
            self.playing.insert(track.to_string());
            self.calls.push(format!("play {track}"));
        }
        fn fade_in(&mut self, track: &str) {
            self.playing.insert(track.to_string());
            self.calls.push(format!("fade_in {track}"));
        }
        fn pause(&mut self) { self.calls.push("pause".into()); }
        fn resume(&mut self) { self.calls.push("resume".into()); }
        fn resume_with_fadeout(&mut self) { self.calls.push("resume_with_fadeout".into()); }
        fn stop_all(&mut self) {
            self.playing.clear();
            self.calls.push("stop_all".into());
        }
        fn fade_out_all(&mut self) { self.calls.push("fade_out_all".into()); }
        fn stop_pausable_sounds(&mut self) { self.calls.push("stop_pausable_sounds".into()); }
    }

    struct FakeHost {
        scenes: Vec<String>,
        active: usize,
        time_scale: f32,
        pressed: HashSet<String>,
        loads: Vec<SceneRequest>,
        canvases: HashMap<Canvas, bool>,
        /// (canvas, path) -> (text, active)
        elements: HashMap<(Canvas, String), (String, bool)>,
        hearts: Vec<(u32, Vec2)>,
        next_heart: u32,
    }

    impl FakeHost {
        fn new(scenes: &[&str], active: usize) -> Self {
            let mut elements = HashMap::new();
            for canvas in Canvas::ALL {
                elements.insert((canvas, LEVEL_NUMBER_PATH.to_string()), (String::new(), true));
            }
            elements.insert((Canvas::Win, NEXT_LEVEL_BUTTON_PATH.to_string()), (String::new(), true));
            FakeHost {
                scenes: scenes.iter().map(|s| s.to_string()).collect(),
                active,
                time_scale: 1.0,
                pressed: HashSet::new(),
                loads: Vec::new(),
                canvases: HashMap::new(),
                elements,
                hearts: Vec::new(),
                next_heart: 0,
            }
        }

        fn press(&mut self, key: &str) {
            self.pressed.insert(key.to_string());
        }

        fn release_all(&mut self) {
            self.pressed.clear();
        }

        fn visible(&self) -> Vec<Canvas> {
            Canvas::ALL
                .into_iter()
                .filter(|c| self.canvases.get(c).copied().unwrap_or(false))
                .collect()
        }

        fn element(&self, canvas: Canvas, path: &str) -> &(String, bool) {
            &self.elements[&(canvas, path.to_string())]
        }
    }

    impl SceneHost for FakeHost {
        fn load_scene(&mut self, request: SceneRequest) { self.loads.push(request); }
        fn active_scene_name(&self) -> String { self.scenes[self.active].clone() }
        fn active_scene_index(&self) -> usize { self.active }
        fn can_scene_be_loaded(&self, name: &str) -> bool { self.scenes.iter().any(|s| s == name) }
        fn time_scale(&self) -> f32 { self.time_scale }
        fn set_time_scale(&mut self, scale: f32) { self.time_scale = scale; }
        fn key_down(&self, binding: &str) -> bool { self.pressed.contains(binding) }
    }

    impl CanvasHost for FakeHost {
        type Heart = u32;

        fn set_canvas_active(&mut self, canvas: Canvas, active: bool) {
            self.canvases.insert(canvas, active);
        }

        fn set_text(&mut self, canvas: Canvas, path: &str, text: &str) -> bool {
            match self.elements.get_mut(&(canvas, path.to_string())) {
                Some(el) => { el.0 = text.to_string(); true }
                None => false,
            }
        }

        fn set_element_active(&mut self, canvas: Canvas, path: &str, active: bool) -> bool {
            match self.elements.get_mut(&(canvas, path.to_string())) {
                Some(el) => { el.1 = active; true }
                None => false,
            }
        }

        fn spawn_heart(&mut self, _canvas: Canvas, pos: Vec2) -> u32 {
            self.next_heart += 1;
            self.hearts.push((self.next_heart, pos));
            self.next_heart
        }

        fn destroy_heart(&mut self, heart: u32) {
            self.hearts.retain(|(id, _)| *id != heart);
        }
    }

    type Player = Rc<RefCell<FakePlayer>>;
    type Audio = Rc<RefCell<RecordingAudio>>;
    type Controller = ScreenStateController<Player, Audio, u32>;

    fn setup(scenes: &[&str], active: usize, hp: u32) -> (Controller, FakeHost, Player, Audio) {
        setup_with(HudConfig::default(), scenes, active, hp)
    }

    fn setup_with(
        config: HudConfig,
        scenes: &[&str],
        active: usize,
        hp: u32,
    ) -> (Controller, FakeHost, Player, Audio) {
        let mut host = FakeHost::new(scenes, active);
        let player = Rc::new(RefCell::new(FakePlayer { hp, ..Default::default() }));
        let audio = Rc::new(RefCell::new(RecordingAudio::default()));
        let ctl = ControllerBuilder::new(config)
            .player(player.clone())
            .audio(audio.clone())
            .build(&mut host)
            .unwrap();
        (ctl, host, player, audio)
    }

    const SCENES: &[&str] = &["Main Menu", "Forest 1", "Forest 2"];

    // ── Initialization ──

    #[test]
    fn build_requires_player_and_audio() {
        let mut host = FakeHost::new(SCENES, 1);
        let no_player = ControllerBuilder::<Player, Audio>::new(HudConfig::default())
            .audio(Rc::new(RefCell::new(RecordingAudio::default())))
            .build(&mut host);
        assert!(matches!(no_player, Err(HudError::MissingPlayer)));

        let no_audio = ControllerBuilder::<Player, Audio>::new(HudConfig::default())
            .player(Rc::new(RefCell::new(FakePlayer::default())))
            .build(&mut host);
        assert!(matches!(no_audio, Err(HudError::MissingAudio)));
    }

    #[test]
    fn build_rejects_scene_without_level_number() {
        let mut host = FakeHost::new(SCENES, 0);
        let result = ControllerBuilder::new(HudConfig::default())
            .player(Rc::new(RefCell::new(FakePlayer::default())))
            .audio(Rc::new(RefCell::new(RecordingAudio::default())))
            .build(&mut host);
        assert!(matches!(result, Err(HudError::SceneName { .. })));
    }

    #[test]
    fn build_rejects_canvas_without_level_label() {
        let mut host = FakeHost::new(SCENES, 1);
        host.elements.remove(&(Canvas::Lose, LEVEL_NUMBER_PATH.to_string()));
        let result = ControllerBuilder::new(HudConfig::default())
            .player(Rc::new(RefCell::new(FakePlayer::default())))
            .audio(Rc::new(RefCell::new(RecordingAudio::default())))
            .build(&mut host);
        assert!(matches!(
            result,
            Err(HudError::MissingElement { canvas: Canvas::Lose, .. })
        ));
    }

    #[test]
    fn build_rejects_last_level_without_next_button() {
        let mut host = FakeHost::new(SCENES, 2);
        host.elements.remove(&(Canvas::Win, NEXT_LEVEL_BUTTON_PATH.to_string()));
        let result = ControllerBuilder::new(HudConfig::default())
            .player(Rc::new(RefCell::new(FakePlayer { hp: 3, ..Default::default() })))
            .audio(Rc::new(RefCell::new(RecordingAudio::default())))
            .build(&mut host);
        assert!(matches!(
            result,
            Err(HudError::MissingElement { canvas: Canvas::Win, path: NEXT_LEVEL_BUTTON_PATH })
        ));
    }

    #[test]
    fn next_button_may_be_absent_when_a_next_level_exists() {
        let mut host = FakeHost::new(SCENES, 1);
        host.elements.remove(&(Canvas::Win, NEXT_LEVEL_BUTTON_PATH.to_string()));
        let result = ControllerBuilder::new(HudConfig::default())
            .player(Rc::new(RefCell::new(FakePlayer { hp: 3, ..Default::default() })))
            .audio(Rc::new(RefCell::new(RecordingAudio::default())))
            .build(&mut host);
        assert!(result.is_ok());
    }

    #[test]
    fn startup_shows_play_canvas_labels_and_hearts() {
        let (ctl, host, _, audio) = setup(SCENES, 1, 3);

        assert_eq!(ctl.screen(), ScreenState::Playing);
        assert_eq!(host.visible(), vec![Canvas::InGame]);
        for canvas in Canvas::ALL {
            assert_eq!(host.element(canvas, LEVEL_NUMBER_PATH).0, "FOREST 1");
        }
        assert_eq!(host.hearts.len(), 3);
        assert!(ctl.next_level_exists());
        assert!(host.element(Canvas::Win, NEXT_LEVEL_BUTTON_PATH).1);
        assert_eq!(audio.borrow().calls, vec!["fade_in Level Theme"]);
    }

    #[test]
    fn theme_already_playing_is_left_alone() {
        let mut host = FakeHost::new(SCENES, 1);
        let audio = Rc::new(RefCell::new(RecordingAudio::default()));
        audio.borrow_mut().playing.insert("Level Theme".into());
        let _ctl = ControllerBuilder::new(HudConfig::default())
            .player(Rc::new(RefCell::new(FakePlayer { hp: 1, ..Default::default() })))
            .audio(audio.clone())
            .build(&mut host)
            .unwrap();
        assert!(audio.borrow().calls.is_empty());
    }

    #[test]
    fn last_level_hides_next_button() {
        let (mut ctl, mut host, _, audio) = setup(SCENES, 2, 3);
        assert!(!ctl.next_level_exists());
        assert!(!host.element(Canvas::Win, NEXT_LEVEL_BUTTON_PATH).1);

        assert!(!ctl.next_level(&mut host));
        assert!(host.loads.is_empty());
        assert_eq!(audio.borrow().count("fade_out_all"), 0);
    }

    // ── Hearts ──

    #[test]
    fn hearts_follow_hit_points_every_frame() {
        let (mut ctl, mut host, player, _) = setup(SCENES, 1, 3);

        player.borrow_mut().hp = 1;
        ctl.tick(&mut host);
        assert_eq!(host.hearts.len(), 1);
        assert_eq!(host.hearts[0].1, Vec2::new(30.0, 60.0));

        player.borrow_mut().hp = 4;
        ctl.tick(&mut host);
        let xs: Vec<f32> = host.hearts.iter().map(|(_, p)| p.x).collect();
        assert_eq!(xs, vec![30.0, 90.0, 150.0, 210.0]);

        player.borrow_mut().hp = 0;
        ctl.tick(&mut host);
        assert!(host.hearts.is_empty());
    }

    #[test]
    fn unchanged_hit_points_keep_existing_icons() {
        let (mut ctl, mut host, _, _) = setup(SCENES, 1, 2);
        let before: Vec<u32> = host.hearts.iter().map(|(id, _)| *id).collect();
        ctl.tick(&mut host);
        ctl.tick(&mut host);
        let after: Vec<u32> = host.hearts.iter().map(|(id, _)| *id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn hearts_update_while_paused() {
        let (mut ctl, mut host, player, _) = setup(SCENES, 1, 3);
        ctl.pause(&mut host);
        player.borrow_mut().hp = 2;
        ctl.tick(&mut host);
        assert_eq!(host.hearts.len(), 2);
    }

    #[test]
    fn health_display_can_be_disabled() {
        let config = HudConfig { show_health: false, ..HudConfig::default() };
        let (mut ctl, mut host, player, _) = setup_with(config, SCENES, 1, 3);
        assert!(host.hearts.is_empty());
        player.borrow_mut().hp = 2;
        ctl.tick(&mut host);
        assert!(host.hearts.is_empty());
    }

    // ── Pause ──

    #[test]
    fn pause_key_toggles_play_and_pause() {
        let (mut ctl, mut host, _, audio) = setup(SCENES, 1, 3);

        host.press("Esc");
        ctl.tick(&mut host);
        assert_eq!(ctl.screen(), ScreenState::Paused);
        assert_eq!(host.time_scale, 0.0);
        assert_eq!(host.visible(), vec![Canvas::Paused]);
        assert_eq!(audio.borrow().count("pause"), 1);

        // Held key is not a new press
        host.release_all();
        ctl.tick(&mut host);
        assert_eq!(ctl.screen(), ScreenState::Paused);

        host.press("Esc");
        ctl.tick(&mut host);
        assert_eq!(ctl.screen(), ScreenState::Playing);
        assert_eq!(host.time_scale, 1.0);
        assert_eq!(host.visible(), vec![Canvas::InGame]);
        assert_eq!(audio.borrow().count("resume"), 1);
    }

    #[test]
    fn pause_uses_configured_binding() {
        let config = HudConfig { pause_key: "P".into(), ..HudConfig::default() };
        let (mut ctl, mut host, _, _) = setup_with(config, SCENES, 1, 3);
        host.press("Esc");
        ctl.tick(&mut host);
        assert_eq!(ctl.screen(), ScreenState::Playing);
        host.release_all();
        host.press("P");
        ctl.tick(&mut host);
        assert_eq!(ctl.screen(), ScreenState::Paused);
    }

    #[test]
    fn pause_key_ignored_after_level_ends() {
        let (mut ctl, mut host, player, audio) = setup(SCENES, 1, 3);
        player.borrow_mut().lost = true;
        ctl.tick(&mut host);
        assert_eq!(ctl.screen(), ScreenState::Lost);

        host.press("Esc");
        ctl.tick(&mut host);
        assert_eq!(ctl.screen(), ScreenState::Lost);
        assert_eq!(host.time_scale, 1.0);
        assert_eq!(host.visible(), vec![Canvas::Lose]);
        assert_eq!(audio.borrow().count("pause"), 0);

        // Button entry points follow the same guard
        ctl.pause(&mut host);
        ctl.resume(&mut host);
        assert_eq!(ctl.screen(), ScreenState::Lost);
    }

    // ── Win / lose ──

    #[test]
    fn win_fires_once() {
        let (mut ctl, mut host, player, audio) = setup(SCENES, 1, 3);
        player.borrow_mut().won = true;
        for _ in 0..5 {
            ctl.tick(&mut host);
        }
        assert_eq!(ctl.screen(), ScreenState::Won);
        assert_eq!(host.visible(), vec![Canvas::Win]);
        assert_eq!(audio.borrow().count("stop_all"), 1);
        assert_eq!(audio.borrow().count("play Victory Jingle"), 1);
    }

    #[test]
    fn lose_fires_once() {
        let (mut ctl, mut host, player, audio) = setup(SCENES, 1, 3);
        player.borrow_mut().lost = true;
        ctl.tick(&mut host);
        ctl.tick(&mut host);
        assert_eq!(ctl.screen(), ScreenState::Lost);
        assert_eq!(host.visible(), vec![Canvas::Lose]);
        assert_eq!(audio.borrow().count("fade_in Defeat Jingle"), 1);
    }

    #[test]
    fn win_beats_lose_in_the_same_frame() {
        let (mut ctl, mut host, player, audio) = setup(SCENES, 1, 3);
        {
            let mut p = player.borrow_mut();
            p.won = true;
            p.lost = true;
        }
        ctl.tick(&mut host);
        assert_eq!(ctl.screen(), ScreenState::Won);
        assert_eq!(host.visible(), vec![Canvas::Win]);
        assert_eq!(audio.borrow().count("fade_in Defeat Jingle"), 0);
    }

    #[test]
    fn lost_level_cannot_be_won_later() {
        let (mut ctl, mut host, player, _) = setup(SCENES, 1, 3);
        player.borrow_mut().lost = true;
        ctl.tick(&mut host);
        player.borrow_mut().won = true;
        ctl.tick(&mut host);
        assert_eq!(ctl.screen(), ScreenState::Lost);
    }

    #[test]
    fn win_is_detected_while_paused() {
        let (mut ctl, mut host, player, _) = setup(SCENES, 1, 3);
        host.press("Esc");
        player.borrow_mut().won = true;
        ctl.tick(&mut host);
        assert_eq!(ctl.screen(), ScreenState::Won);
        assert_eq!(host.visible(), vec![Canvas::Win]);
    }

    // ── Scene transitions ──

    #[test]
    fn next_level_loads_by_name() {
        let (mut ctl, mut host, player, audio) = setup(SCENES, 1, 3);
        player.borrow_mut().won = true;
        ctl.tick(&mut host);

        assert!(ctl.next_level(&mut host));
        assert_eq!(host.loads, vec![SceneRequest::Name("Forest 2".into())]);
        let audio = audio.borrow();
        let tail: Vec<&str> = audio.calls.iter().rev().take(2).rev().map(String::as_str).collect();
        assert_eq!(tail, vec!["fade_out_all", "resume"]);
    }

    #[test]
    fn next_level_after_win_while_paused_unfreezes_time() {
        let (mut ctl, mut host, player, _) = setup(SCENES, 1, 3);
        ctl.pause(&mut host);
        assert_eq!(host.time_scale, 0.0);

        player.borrow_mut().won = true;
        ctl.tick(&mut host);
        assert_eq!(ctl.screen(), ScreenState::Won);

        assert!(ctl.next_level(&mut host));
        assert_eq!(host.time_scale, 1.0);
        assert_eq!(host.loads, vec![SceneRequest::Name("Forest 2".into())]);
    }

    #[test]
    fn quit_while_playing_fades_out() {
        let (mut ctl, mut host, _, audio) = setup(SCENES, 1, 3);
        ctl.quit(&mut host);
        assert_eq!(audio.borrow().count("fade_out_all"), 1);
        assert_eq!(audio.borrow().count("resume_with_fadeout"), 0);
        assert_eq!(host.time_scale, 1.0);
        assert_eq!(host.loads, vec![SceneRequest::Name("Main Menu".into())]);
    }

    #[test]
    fn quit_while_paused_fades_from_ducked_level() {
        let (mut ctl, mut host, _, audio) = setup(SCENES, 1, 3);
        ctl.pause(&mut host);
        ctl.quit(&mut host);
        assert_eq!(audio.borrow().count("resume_with_fadeout"), 1);
        assert_eq!(audio.borrow().count("fade_out_all"), 0);
        assert_eq!(host.time_scale, 1.0);
        assert_eq!(host.loads, vec![SceneRequest::Name("Main Menu".into())]);
    }

    #[test]
    fn restart_reloads_active_scene_by_index() {
        let (mut ctl, mut host, _, audio) = setup(SCENES, 2, 3);
        ctl.pause(&mut host);
        ctl.restart(&mut host);

        assert_eq!(host.time_scale, 1.0);
        assert_eq!(host.loads, vec![SceneRequest::Index(2)]);
        let audio = audio.borrow();
        let tail: Vec<&str> = audio.calls.iter().rev().take(2).rev().map(String::as_str).collect();
        assert_eq!(tail, vec!["stop_pausable_sounds", "resume"]);
    }
}
