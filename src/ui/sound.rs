/// Sound engine: procedural 8-bit style music and jingles via rodio.
///
/// All tracks are generated as in-memory WAV buffers at init time and
/// addressed by the names in `[audio]` of config.toml. Each playing track is
/// a voice with its own Sink so it can be paused, ducked or faded alone.
///
/// Voices are either pausable (effects) or not (music, jingles). Pausing
/// the game pauses pausable voices and ducks the rest; fades are advanced
/// by `update` once per frame.
///
/// Compile without the "sound" feature to disable audio entirely (the stub
/// SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::Duration;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
    use tracing::{debug, warn};

    use crate::config::TrackNames;
    use crate::hud::host::AudioManager;

    const SAMPLE_RATE: u32 = 22050;
    const FADE_IN: Duration = Duration::from_millis(800);
    const FADE_OUT_SECS: f32 = 1.2;
    /// Music volume while the game is paused.
    const DUCK_VOLUME: f32 = 0.3;

    struct TrackDef {
        wav: Arc<Vec<u8>>,
        looped: bool,
        pausable: bool,
    }

    struct Voice {
        track: String,
        sink: Sink,
        pausable: bool,
        volume: f32,
        /// Volume lost per second while fading out.
        fade_rate: Option<f32>,
    }

    pub struct SoundEngine {
        /// None when no output device is available; the engine then runs silent.
        output: Option<(OutputStream, OutputStreamHandle)>,
        tracks: HashMap<String, TrackDef>,
        voices: Vec<Voice>,
        paused: bool,
    }

    impl SoundEngine {
        pub fn new(names: &TrackNames) -> Self {
            let output = match OutputStream::try_default() {
                Ok(pair) => Some(pair),
                Err(e) => {
                    warn!("no audio output, running silent: {e}");
                    None
                }
            };

            let mut tracks = HashMap::new();
            let mut add = |name: &str, samples: Vec<f32>, looped: bool, pausable: bool| {
                tracks.insert(
                    name.to_string(),
                    TrackDef { wav: Arc::new(make_wav(&samples)), looped, pausable },
                );
            };
            add(&names.level_theme, gen_theme(), true, false);
            add(&names.victory, gen_victory(), false, false);
            add(&names.defeat, gen_defeat(), false, false);
            add(&names.hurt, gen_hurt(), false, true);

            SoundEngine {
                output,
                tracks,
                voices: Vec::new(),
                paused: false,
            }
        }

        fn start(&mut self, track: &str, fade_in: bool) {
            let Some((_, handle)) = &self.output else { return };
            let Some(def) = self.tracks.get(track) else {
                warn!(track, "unknown audio track");
                return;
            };
            let sink = match Sink::try_new(handle) {
                Ok(s) => s,
                Err(e) => {
                    warn!(track, "could not open sink: {e}");
                    return;
                }
            };

            let cursor = Cursor::new(def.wav.as_ref().clone());
            let appended = if def.looped {
                Decoder::new_looped(cursor).map(|src| {
                    if fade_in { sink.append(src.fade_in(FADE_IN)) } else { sink.append(src) }
                })
            } else {
                Decoder::new(cursor).map(|src| {
                    if fade_in { sink.append(src.fade_in(FADE_IN)) } else { sink.append(src) }
                })
            };
            if let Err(e) = appended {
                warn!(track, "could not decode track: {e}");
                return;
            }

            let volume = if self.paused && !def.pausable { DUCK_VOLUME } else { 1.0 };
            sink.set_volume(volume);
            debug!(track, fade_in, "voice started");
            self.voices.push(Voice {
                track: track.to_string(),
                sink,
                pausable: def.pausable,
                volume,
                fade_rate: None,
            });
        }

        /// Advance fades and drop finished voices. Call once per frame.
        pub fn update(&mut self, dt: f32) {
            for v in &mut self.voices {
                if let Some(rate) = v.fade_rate {
                    v.volume = (v.volume - rate * dt).max(0.0);
                    v.sink.set_volume(v.volume);
                    if v.volume <= 0.0 {
                        v.sink.stop();
                    }
                }
            }
            self.voices.retain(|v| !v.sink.empty());
        }

        fn fade_all(&mut self) {
            for v in &mut self.voices {
                v.fade_rate = Some((v.volume / FADE_OUT_SECS).max(0.05));
            }
        }

        // Effects used by the frame driver, outside the HUD

        pub fn play_hurt(&mut self, track: &str) {
            self.start(track, false);
        }
    }

    impl AudioManager for SoundEngine {
        fn is_playing(&self, track: &str) -> bool {
            self.voices
                .iter()
                .any(|v| v.track == track && v.fade_rate.is_none() && !v.sink.empty())
        }

        fn play(&mut self, track: &str) {
            self.start(track, false);
        }

        fn fade_in(&mut self, track: &str) {
            self.start(track, true);
        }

        fn pause(&mut self) {
            self.paused = true;
            for v in &mut self.voices {
                if v.pausable {
                    v.sink.pause();
                } else if v.fade_rate.is_none() {
                    v.volume = DUCK_VOLUME;
                    v.sink.set_volume(v.volume);
                }
            }
        }

        fn resume(&mut self) {
            self.paused = false;
            for v in &mut self.voices {
                if v.pausable {
                    v.sink.play();
                } else if v.fade_rate.is_none() {
                    v.volume = 1.0;
                    v.sink.set_volume(v.volume);
                }
            }
        }

        fn resume_with_fadeout(&mut self) {
            self.paused = false;
            for v in &mut self.voices {
                if v.pausable {
                    v.sink.play();
                }
            }
            self.fade_all();
        }

        fn stop_all(&mut self) {
            for v in self.voices.drain(..) {
                v.sink.stop();
            }
        }

        fn fade_out_all(&mut self) {
            self.fade_all();
        }

        fn stop_pausable_sounds(&mut self) {
            self.voices.retain(|v| {
                if v.pausable {
                    v.sink.stop();
                }
                !v.pausable
            });
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn tone(freq: f32, duration: f32, volume: f32, decay: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * decay;
                // Sine + 3rd harmonic for a square-ish retro timbre
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.7
                    + (t * freq * 3.0 * 2.0 * std::f32::consts::PI).sin() * 0.3;
                wave * env * volume
            })
            .collect()
    }

    /// Level theme: a looping two-bar arpeggio in A minor.
    fn gen_theme() -> Vec<f32> {
        let notes = [
            220.0_f32, 261.6, 329.6, 261.6, 220.0, 261.6, 329.6, 392.0,
            174.6, 220.0, 261.6, 220.0, 196.0, 246.9, 293.7, 246.9,
        ];
        notes.iter().flat_map(|&f| tone(f, 0.18, 0.12, 0.6)).collect()
    }

    /// Victory: ascending fanfare C5 E5 G5 C6 with a sustained top note.
    fn gen_victory() -> Vec<f32> {
        let mut samples: Vec<f32> = [523.0_f32, 659.0, 784.0]
            .iter()
            .flat_map(|&f| tone(f, 0.1, 0.3, 0.3))
            .collect();
        samples.extend(tone(1047.0, 0.45, 0.3, 1.0));
        samples
    }

    /// Defeat: slow descending A4 F#4 Eb4 C4 with a tail fade.
    fn gen_defeat() -> Vec<f32> {
        let mut samples: Vec<f32> = [440.0_f32, 370.0, 311.0, 261.0]
            .iter()
            .flat_map(|&f| tone(f, 0.2, 0.3, 0.3))
            .collect();
        let fade_len = samples.len() / 4;
        let total = samples.len();
        for (i, s) in samples.iter_mut().enumerate().skip(total - fade_len) {
            *s *= (total - i) as f32 / fade_len as f32;
        }
        samples
    }

    /// Hurt: short noise burst over a falling tone.
    fn gen_hurt() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.12) as usize;
        let mut rng: u32 = 12345;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 300.0 - t * 180.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let body = (ti * freq * 2.0 * std::f32::consts::PI).sin();
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                (body * 0.5 + noise * 0.5) * (1.0 - t) * 0.3
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a 16-bit PCM WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new(_names: &crate::config::TrackNames) -> Self { SoundEngine }
    pub fn update(&mut self, _dt: f32) {}
    pub fn play_hurt(&mut self, _track: &str) {}
}

#[cfg(not(feature = "sound"))]
impl crate::hud::host::AudioManager for SoundEngine {
    fn is_playing(&self, _track: &str) -> bool { false }
    fn play(&mut self, _track: &str) {}
    fn fade_in(&mut self, _track: &str) {}
    fn pause(&mut self) {}
    fn resume(&mut self) {}
    fn resume_with_fadeout(&mut self) {}
    fn stop_all(&mut self) {}
    fn fade_out_all(&mut self) {}
    fn stop_pausable_sounds(&mut self) {}
}
