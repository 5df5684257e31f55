//! Audio cue playback
//!
//! Procedurally generated sound effects - no external files needed. The
//! simulation emits symbolic cues; this adapter maps them to oscillator tones
//! and forwards them to whatever output device is available. With no device
//! every cue is a silent no-op.

use crate::settings::Settings;
use crate::sim::Cue;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// A single enveloped oscillator burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    /// Time for the envelope to decay to silence
    pub duration_s: f32,
    pub waveform: Waveform,
}

impl Tone {
    pub const fn new(frequency_hz: f32, duration_s: f32, waveform: Waveform) -> Self {
        Self {
            frequency_hz,
            duration_s,
            waveform,
        }
    }
}

/// Peak gain of a tone before volume scaling
pub const TONE_PEAK_GAIN: f32 = 0.3;

/// Tones played for a cue, in start order
pub fn tones_for(cue: Cue) -> &'static [Tone] {
    use Waveform::*;

    const JUMP: [Tone; 1] = [Tone::new(400.0, 0.2, Sine)];
    const DAMAGE: [Tone; 1] = [Tone::new(200.0, 0.5, Sawtooth)];
    const LEVEL_UP: [Tone; 2] = [Tone::new(600.0, 0.5, Sine), Tone::new(800.0, 0.3, Square)];
    const BOSS_SPAWN: [Tone; 1] = [Tone::new(300.0, 1.0, Sawtooth)];
    const BOSS_ATTACK: [Tone; 1] = [Tone::new(200.0, 0.3, Sawtooth)];
    const BOSS_DEFEAT: [Tone; 1] = [Tone::new(100.0, 0.5, Square)];
    const COLLECT: [Tone; 1] = [Tone::new(800.0, 0.3, Sine)];
    const SHIELD_HIT: [Tone; 1] = [Tone::new(500.0, 0.2, Square)];
    const SHIELD_BLAST: [Tone; 1] = [Tone::new(600.0, 0.3, Square)];
    const GAME_OVER: [Tone; 1] = [Tone::new(200.0, 0.5, Sawtooth)];

    match cue {
        Cue::Jump => &JUMP,
        Cue::Damage => &DAMAGE,
        Cue::LevelUp => &LEVEL_UP,
        Cue::BossSpawn => &BOSS_SPAWN,
        Cue::BossAttack => &BOSS_ATTACK,
        Cue::BossDefeat => &BOSS_DEFEAT,
        Cue::Collect => &COLLECT,
        Cue::ShieldHit => &SHIELD_HIT,
        Cue::ShieldBlast => &SHIELD_BLAST,
        Cue::GameOver => &GAME_OVER,
    }
}

/// An output device able to play tones. Playback is fire-and-forget.
pub trait ToneSink {
    fn play_tone(&mut self, tone: Tone, gain: f32);
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Option<Box<dyn ToneSink>>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("has_sink", &self.sink.is_some())
            .field("master_volume", &self.master_volume)
            .field("sfx_volume", &self.sfx_volume)
            .field("muted", &self.muted)
            .finish()
    }
}

impl AudioManager {
    pub fn new(sink: Option<Box<dyn ToneSink>>) -> Self {
        if sink.is_none() {
            log::warn!("No audio output available - audio disabled");
        }
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn from_settings(sink: Option<Box<dyn ToneSink>>, settings: &Settings) -> Self {
        let mut audio = Self::new(sink);
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);
        audio
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a cue
    pub fn play(&mut self, cue: Cue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(sink) = self.sink.as_mut() else { return };

        for &tone in tones_for(cue) {
            sink.play_tone(tone, vol * TONE_PEAK_GAIN);
        }
    }
}
