//! Audio using the Web Audio API
//!
//! Short procedural cues for pops and splashes. Audio is optional: if the
//! context cannot be created the manager stays silent.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::effects::Preset;
use crate::settings::Settings;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Bubble or click burst
    Pop,
    /// Drip splash or wave agitation
    Splash,
    /// Celebration cone
    Whoosh,
}

impl SoundEffect {
    /// Cue played when a preset's click action fires
    pub fn for_preset(preset: Preset) -> Option<Self> {
        match preset {
            Preset::BubblePop | Preset::FloatingBubbles | Preset::FishSparks => {
                Some(SoundEffect::Pop)
            }
            Preset::Drips | Preset::Ocean => Some(SoundEffect::Splash),
            Preset::Confetti | Preset::Celebration => Some(SoundEffect::Whoosh),
            Preset::SlimeField => None,
        }
    }
}

pub struct AudioManager {
    ctx: Option<AudioContext>,
    volume: f32,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // May fail outside a secure context or with autoplay restrictions
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: settings.effective_volume(),
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.volume = settings.effective_volume();
    }

    pub fn play(&self, effect: SoundEffect) {
        let vol = self.volume;
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Pop => play_pop(ctx, vol),
            SoundEffect::Splash => play_splash(ctx, vol),
            SoundEffect::Whoosh => play_whoosh(ctx, vol),
        }
    }
}

fn create_osc(
    ctx: &AudioContext,
    freq: f32,
    osc_type: OscillatorType,
) -> Option<(OscillatorNode, GainNode)> {
    let osc = ctx.create_oscillator().ok()?;
    let gain = ctx.create_gain().ok()?;

    osc.set_type(osc_type);
    osc.frequency().set_value(freq);
    osc.connect_with_audio_node(&gain).ok()?;
    gain.connect_with_audio_node(&ctx.destination()).ok()?;

    Some((osc, gain))
}

/// Quick upward blip
fn play_pop(ctx: &AudioContext, vol: f32) {
    let Some((osc, gain)) = create_osc(ctx, 520.0, OscillatorType::Sine) else {
        return;
    };
    let t = ctx.current_time();

    gain.gain().set_value_at_time(vol * 0.35, t).ok();
    gain.gain()
        .exponential_ramp_to_value_at_time(0.01, t + 0.08)
        .ok();
    osc.frequency().set_value_at_time(520.0, t).ok();
    osc.frequency()
        .exponential_ramp_to_value_at_time(1100.0, t + 0.06)
        .ok();

    osc.start().ok();
    osc.stop_with_when(t + 0.1).ok();
}

/// Falling plop
fn play_splash(ctx: &AudioContext, vol: f32) {
    let Some((osc, gain)) = create_osc(ctx, 900.0, OscillatorType::Triangle) else {
        return;
    };
    let t = ctx.current_time();

    gain.gain().set_value_at_time(vol * 0.3, t).ok();
    gain.gain()
        .exponential_ramp_to_value_at_time(0.01, t + 0.18)
        .ok();
    osc.frequency().set_value_at_time(900.0, t).ok();
    osc.frequency()
        .exponential_ramp_to_value_at_time(180.0, t + 0.15)
        .ok();

    osc.start().ok();
    osc.stop_with_when(t + 0.2).ok();
}

/// Rising sweep with a soft sparkle on top
fn play_whoosh(ctx: &AudioContext, vol: f32) {
    let t = ctx.current_time();

    if let Some((osc, gain)) = create_osc(ctx, 200.0, OscillatorType::Sawtooth) {
        gain.gain().set_value_at_time(vol * 0.15, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.35)
            .ok();
        osc.frequency().set_value_at_time(200.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(800.0, t + 0.3)
            .ok();
        osc.start().ok();
        osc.stop_with_when(t + 0.4).ok();
    }

    for (i, freq) in [1500.0, 2200.0].iter().enumerate() {
        let delay = 0.05 + i as f64 * 0.04;
        if let Some((osc, gain)) = create_osc(ctx, *freq, OscillatorType::Sine) {
            let t = t + delay;
            gain.gain().set_value_at_time(vol * 0.12, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.3).ok();
        }
    }
}
