//! Preset effects
//!
//! An [`Effect`] bundles the shared engine pieces an animation needs: an
//! ambient particle field, a burst layer drawn on top of it, spawn policies,
//! render styles and any auxiliary state (the ocean's wave bands). Presets
//! only differ in configuration.

pub mod ocean;
pub mod presets;
pub mod slime;

pub use ocean::WaveBand;
pub use slime::SlimeTuning;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::renderer::{DrawSurface, ImmediateRenderer, ParticleStyle};
use crate::settings::Settings;
use crate::sim::{
    Bounds, BurstSpawner, EdgePolicy, ParticleSystem, PeriodicSpawner, PressureField, Rgba,
    SpawnOrigin,
};

/// Seed offset separating the burst layer's RNG stream from the field's
const BURST_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;
/// Size hint used when a burst is triggered without one
pub const DEFAULT_BURST_SIZE: f32 = 60.0;
/// Pad for bubbles spawned just off-screen
const OFF_SCREEN_PAD: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preset {
    /// Celebration cone of paper confetti
    Confetti,
    /// Click anywhere to burst pop confetti
    BubblePop,
    /// Drifting bubbles that pop into confetti when clicked
    FloatingBubbles,
    /// Sparks that explode and then swim like flying fish
    FishSparks,
    /// Rolling wave bands that swell and spray near the pointer
    Ocean,
    /// Ambient drips with large ripples on click
    Drips,
    /// Anchored bubble field pulled by the pointer and pushed by pressure imprints
    SlimeField,
    /// Confetti ring plus flying fish, fired when a press is released over the surface
    Celebration,
}

impl Preset {
    pub const ALL: [Preset; 8] = [
        Preset::Confetti,
        Preset::BubblePop,
        Preset::FloatingBubbles,
        Preset::FishSparks,
        Preset::Ocean,
        Preset::Drips,
        Preset::SlimeField,
        Preset::Celebration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Confetti => "confetti",
            Preset::BubblePop => "bubble_pop",
            Preset::FloatingBubbles => "floating_bubbles",
            Preset::FishSparks => "fish_sparks",
            Preset::Ocean => "ocean",
            Preset::Drips => "drips",
            Preset::SlimeField => "slime_field",
            Preset::Celebration => "celebration",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|p| p.as_str() == key)
    }

    fn field_edge(&self) -> EdgePolicy {
        match self {
            Preset::FloatingBubbles => EdgePolicy::Wrap,
            Preset::SlimeField => EdgePolicy::Bounce { restitution: 0.4 },
            _ => EdgePolicy::default(),
        }
    }

    fn field_style(&self) -> ParticleStyle {
        match self {
            Preset::FloatingBubbles => ParticleStyle::Bubble { fill: 0.25, rim: 1.5 },
            Preset::Drips => ParticleStyle::Ring { width: 2.0 },
            _ => ParticleStyle::Disc,
        }
    }

    fn background(&self) -> Option<Rgba> {
        match self {
            Preset::Ocean => Some(Rgba::from_hex(presets::OCEAN_BACKGROUND, 1.0)),
            _ => None,
        }
    }

    fn periodic(&self) -> Option<PeriodicSpawner> {
        match self {
            Preset::FloatingBubbles => Some(PeriodicSpawner::new(
                presets::FLOATING_INTERVAL,
                1,
                SpawnOrigin::OffScreen {
                    pad: OFF_SCREEN_PAD,
                },
            )),
            Preset::Drips => Some(PeriodicSpawner::new(
                presets::DRIP_INTERVAL,
                presets::DRIP_BATCH,
                SpawnOrigin::Anywhere,
            )),
            _ => None,
        }
    }

    fn burst(&self) -> BurstSpawner {
        match self {
            Preset::Confetti => presets::confetti_burst(),
            Preset::FishSparks => presets::fish_burst(),
            _ => presets::pop_burst(),
        }
    }

    /// Clicking hits individual particles
    pub fn poppable(&self) -> bool {
        matches!(self, Preset::FloatingBubbles)
    }

    /// The burst fires on release rather than on press
    pub fn bursts_on_release(&self) -> bool {
        matches!(self, Preset::Celebration)
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mounted animation
pub struct Effect {
    preset: Preset,
    settings: Settings,
    slime: SlimeTuning,
    size: Vec2,
    /// Ambient population (bubbles, ripples, spray)
    field: ParticleSystem,
    /// Short-lived bursts drawn over the field
    bursts: ParticleSystem,
    field_renderer: ImmediateRenderer,
    burst_renderer: ImmediateRenderer,
    periodic: Option<PeriodicSpawner>,
    burst: BurstSpawner,
    waves: Vec<WaveBand>,
    /// Seconds the current press has been held, for release bursts
    press: Option<f32>,
    /// Reused polyline buffer for wave drawing
    scratch: Vec<Vec2>,
}

impl Effect {
    pub fn new(preset: Preset, width: f32, height: f32, seed: u64, settings: Settings) -> Self {
        let slime = settings.slime_tuning();
        let cap = match preset {
            Preset::FloatingBubbles => presets::FLOATING_CAP,
            _ => settings.max_particles(),
        };

        let pressure = match preset {
            Preset::SlimeField => PressureField::new(slime.pressure),
            _ => PressureField::disabled(),
        };
        let field = ParticleSystem::with_capacity(seed, cap)
            .with_bounds(Bounds::new(width, height, preset.field_edge()))
            .with_pressure(pressure);
        let bursts = ParticleSystem::with_capacity(seed ^ BURST_SEED_SALT, settings.max_particles())
            .with_bounds(Bounds::new(width, height, EdgePolicy::default()));

        let mut field_renderer = ImmediateRenderer::new(preset.field_style(), preset.background());
        field_renderer.show_imprints = settings.show_imprints;

        let mut effect = Self {
            preset,
            slime,
            size: Vec2::new(width.max(0.0), height.max(0.0)),
            field,
            bursts,
            field_renderer,
            burst_renderer: ImmediateRenderer::new(ParticleStyle::Disc, None),
            periodic: preset.periodic(),
            burst: preset.burst(),
            waves: Vec::new(),
            press: None,
            scratch: Vec::new(),
            settings,
        };
        effect.populate();
        log::info!(
            "Effect {} ready at {:.0}x{:.0} with {} particles",
            preset,
            width,
            height,
            effect.population()
        );
        effect
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn field(&self) -> &ParticleSystem {
        &self.field
    }

    pub fn bursts(&self) -> &ParticleSystem {
        &self.bursts
    }

    pub fn waves(&self) -> &[WaveBand] {
        &self.waves
    }

    /// Live particles across both layers
    pub fn population(&self) -> usize {
        self.field.len() + self.bursts.len()
    }

    /// Initial population for the preset
    fn populate(&mut self) {
        let size = self.size;
        match self.preset {
            Preset::FloatingBubbles => {
                let count = scaled_count(presets::FLOATING_INITIAL, self.settings.quality.population_scale());
                for _ in 0..count {
                    let rng = self.field.rng_mut();
                    let pos = SpawnOrigin::Anywhere.sample(rng, size);
                    let params = presets::floating_bubble(rng, pos);
                    self.field.spawn(params);
                }
            }
            Preset::SlimeField => {
                let count = scaled_count(self.slime.bubble_count, self.settings.quality.population_scale());
                for _ in 0..count {
                    let params = presets::slime_bubble(self.field.rng_mut(), size, &self.slime);
                    self.field.spawn(params);
                }
            }
            Preset::Ocean => {
                self.waves = ocean::random_bands(self.field.rng_mut(), size.y);
            }
            Preset::Confetti
            | Preset::BubblePop
            | Preset::FishSparks
            | Preset::Drips
            | Preset::Celebration => {}
        }
    }

    /// Advance everything by `dt` seconds (already clamped by the driver)
    pub fn update(&mut self, dt: f32) {
        if !(dt > 0.0 && dt.is_finite()) {
            return;
        }

        for wave in self.waves.iter_mut() {
            wave.advance(dt);
        }
        if let Some(held) = self.press.as_mut() {
            *held += dt;
        }

        if let Some(spawner) = self.periodic.as_mut() {
            match self.preset {
                Preset::FloatingBubbles => {
                    spawner.update(dt, &mut self.field, presets::floating_bubble);
                }
                Preset::Drips => {
                    spawner.update(dt, &mut self.field, presets::drip_ripple);
                }
                _ => {}
            }
        }

        self.field.tick(dt);
        self.bursts.tick(dt);
    }

    /// Draw one frame: full clear, wave bands, field, bursts
    pub fn render<S: DrawSurface + ?Sized>(&mut self, surface: &mut S) {
        self.field_renderer.begin(surface);

        let width = surface.size().x;
        for wave in &self.waves {
            wave.sample_into(width, &mut self.scratch);
            surface.stroke_polyline(&self.scratch, 1.5, Rgba::WHITE.with_alpha(0.3));
        }

        self.field_renderer
            .draw_particles(surface, self.field.live_particles());
        if self.field_renderer.show_imprints {
            self.field_renderer
                .draw_imprints(surface, self.field.pressure());
        }
        self.burst_renderer
            .draw_particles(surface, self.bursts.live_particles());
        surface.present();
    }

    /// Pointer moved over the surface (surface-local coordinates)
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let pos = Vec2::new(x, y);
        self.field.input_mut().pointer_move(pos);
        if self.preset == Preset::Ocean {
            self.agitate_waves(pos);
        }
    }

    /// Primary button pressed. Returns true when something burst or popped.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.field.input_mut().pointer_down(Vec2::new(x, y));
        match self.preset {
            Preset::SlimeField => false,
            Preset::FloatingBubbles => self.pop_at(x, y).is_some(),
            Preset::Celebration => {
                self.press = Some(0.0);
                false
            }
            _ => self.spawn_burst(x, y, DEFAULT_BURST_SIZE) > 0,
        }
    }

    /// Primary button released. Release-burst presets fire at the pointer if
    /// the press is still over the surface; returns true when they do.
    /// Holding longer grows the burst.
    pub fn pointer_up(&mut self) -> bool {
        let input = *self.field.input();
        self.field.input_mut().pointer_up();
        let Some(held) = self.press.take() else {
            return false;
        };
        let over = input.active
            && input.down
            && (0.0..=self.size.x).contains(&input.pointer.x)
            && (0.0..=self.size.y).contains(&input.pointer.y);
        if !over {
            return false;
        }
        let hint = presets::celebration_base_size(self.size.x) * (1.0 + held);
        self.spawn_burst(input.pointer.x, input.pointer.y, hint) > 0
    }

    /// Press interrupted by the host; nothing fires
    pub fn pointer_cancel(&mut self) {
        self.press = None;
        self.field.input_mut().pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.press = None;
        self.field.input_mut().pointer_leave();
    }

    /// Device tilt, each axis roughly in [-1, 1]
    pub fn set_tilt(&mut self, x: f32, y: f32) {
        let tilt = Vec2::new(x, y);
        self.field.input_mut().set_tilt(tilt);
        self.bursts.input_mut().set_tilt(tilt);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        let width = width.max(0.0);
        let height = height.max(0.0);
        if self.size.y > 0.0 {
            let ratio = height / self.size.y;
            for wave in self.waves.iter_mut() {
                wave.y_offset *= ratio;
            }
        }
        self.size = Vec2::new(width, height);
        self.field.resize(width, height);
        self.bursts.resize(width, height);
    }

    /// Clear everything and respawn the initial population in one step
    pub fn reset(&mut self) {
        self.field.clear();
        self.bursts.clear();
        if let Some(spawner) = self.periodic.as_mut() {
            spawner.reset();
        }
        self.waves.clear();
        self.press = None;
        self.populate();
        log::info!("Effect {} reset ({} particles)", self.preset, self.population());
    }

    /// Remove every particle without respawning (unmount)
    pub fn clear(&mut self) {
        self.field.clear();
        self.bursts.clear();
        self.waves.clear();
        self.press = None;
    }

    /// Trigger the preset's burst at a point. Returns particles spawned.
    pub fn spawn_burst(&mut self, x: f32, y: f32, size_hint: f32) -> usize {
        let origin = Vec2::new(x, y);
        if !origin.is_finite() {
            return 0;
        }
        let scale = self.settings.burst_scale();
        match self.preset {
            Preset::Drips => {
                if scale <= 0.0 {
                    return 0;
                }
                self.field.spawn(presets::splash_ripple(origin));
                1
            }
            Preset::Ocean => self.agitate_waves(origin),
            Preset::Confetti => {
                self.burst
                    .scaled(scale)
                    .spawn(&mut self.bursts, origin, size_hint, presets::confetti_flake)
            }
            Preset::FishSparks => {
                self.burst
                    .scaled(scale)
                    .spawn(&mut self.bursts, origin, size_hint, presets::fish_spark)
            }
            Preset::Celebration => self.celebrate(origin, size_hint),
            Preset::BubblePop | Preset::FloatingBubbles | Preset::SlimeField => {
                self.burst
                    .scaled(scale)
                    .spawn(&mut self.bursts, origin, size_hint, presets::pop_flake)
            }
        }
    }

    /// Pop the top-most field particle under the point and burst from it.
    /// Returns the burst size, or `None` if nothing was hit.
    pub fn pop_at(&mut self, x: f32, y: f32) -> Option<usize> {
        if !self.preset.poppable() {
            return None;
        }
        let id = self.field.hit_test(Vec2::new(x, y))?;
        let popped = self.field.pop(id)?;
        let diameter = popped.radius() * 2.0;
        let count = self.burst.scaled(self.settings.burst_scale()).spawn(
            &mut self.bursts,
            popped.pos,
            diameter,
            presets::pop_flake,
        );
        Some(count)
    }

    /// Confetti ring, accent flakes and flying fish sized by the target's size
    fn celebrate(&mut self, origin: Vec2, size_hint: f32) -> usize {
        let scale = presets::celebration_scale(size_hint, self.size.x);
        let counts =
            presets::CelebrationCounts::for_scale(scale).scaled(self.settings.burst_scale());
        let speed = presets::celebration_speed(scale);

        let mut spawned = presets::fixed_burst(counts.confetti, speed, (0.5, 1.5)).spawn(
            &mut self.bursts,
            origin,
            0.0,
            |rng, shot| presets::celebration_flake(rng, shot, scale),
        );
        spawned += presets::fixed_burst(counts.accents, speed, (0.5, 1.5)).spawn(
            &mut self.bursts,
            origin,
            0.0,
            |rng, shot| presets::celebration_accent(rng, shot, scale),
        );
        let fish = presets::fish_burst();
        spawned += presets::fixed_burst(counts.fish, fish.base_speed, fish.speed_spread).spawn(
            &mut self.bursts,
            origin,
            0.0,
            presets::fish_spark,
        );
        log::debug!("celebration x{:.2}: {:?}", scale, counts);
        spawned
    }

    /// Swell bands near `pos.y` and throw spray along them
    fn agitate_waves(&mut self, pos: Vec2) -> usize {
        let spray = scaled_count(ocean::SPRAY_PER_AGITATION, self.settings.burst_scale());
        let width = self.size.x;
        let mut spawned = 0;
        for wave in self.waves.iter_mut().filter(|w| w.near(pos.y)) {
            wave.agitate();
            for _ in 0..spray {
                let rng = self.field.rng_mut();
                let x = rng.random::<f32>() * width;
                let params = presets::ocean_spray(rng, Vec2::new(x, wave.y_at(x)));
                self.field.spawn(params);
                spawned += 1;
            }
        }
        spawned
    }

    /// Apply new settings; slime tuning changes respawn the field
    pub fn apply_settings(&mut self, settings: Settings) {
        let retune = settings.slime_tuning() != self.slime
            || settings.quality.population_scale() != self.settings.quality.population_scale();
        let cap = match self.preset {
            Preset::FloatingBubbles => presets::FLOATING_CAP,
            _ => settings.max_particles(),
        };
        self.field.set_capacity(cap);
        self.bursts.set_capacity(settings.max_particles());
        self.field_renderer.show_imprints = settings.show_imprints;
        self.slime = settings.slime_tuning();
        self.settings = settings;
        if retune && matches!(self.preset, Preset::SlimeField | Preset::FloatingBubbles) {
            self.reset();
        }
    }
}

fn scaled_count(count: usize, scale: f32) -> usize {
    (count as f32 * scale.max(0.0)).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, RecordingSurface};
    use crate::settings::QualityPreset;

    fn high() -> Settings {
        Settings::from_preset(QualityPreset::High)
    }

    fn run(effect: &mut Effect, frames: usize, dt: f32) {
        for _ in 0..frames {
            effect.update(dt);
        }
    }

    fn assert_finite(effect: &Effect) {
        for p in effect
            .field()
            .live_particles()
            .iter()
            .chain(effect.bursts().live_particles())
        {
            assert!(p.pos.is_finite() && p.vel.is_finite(), "{p:?}");
            assert!(p.age >= 0.0 && p.age <= p.lifetime);
        }
    }

    #[test]
    fn test_preset_names_roundtrip() {
        for preset in Preset::ALL {
            assert_eq!(Preset::parse(preset.as_str()), Some(preset));
        }
        assert_eq!(Preset::parse("Slime-Field"), Some(Preset::SlimeField));
        assert_eq!(Preset::parse("nope"), None);
    }

    #[test]
    fn test_every_preset_runs_and_stays_finite() {
        for preset in Preset::ALL {
            let mut effect = Effect::new(preset, 800.0, 600.0, 42, high());
            effect.pointer_move(400.0, 300.0);
            effect.pointer_down(400.0, 300.0);
            effect.spawn_burst(200.0, 200.0, 80.0);
            run(&mut effect, 180, 1.0 / 60.0);
            effect.pointer_up();
            effect.pointer_leave();
            run(&mut effect, 60, 0.05);
            assert_finite(&effect);
            let mut surface = RecordingSurface::new(800.0, 600.0);
            effect.render(&mut surface);
            assert!(matches!(surface.commands()[0], DrawCommand::Clear(_)));
        }
    }

    #[test]
    fn test_confetti_burst_count_and_expiry() {
        let mut effect = Effect::new(Preset::Confetti, 800.0, 600.0, 1, high());
        assert_eq!(effect.spawn_burst(400.0, 150.0, 0.0), 150);
        assert_eq!(effect.population(), 150);
        run(&mut effect, 100, 0.05);
        assert_eq!(effect.population(), 0);
    }

    #[test]
    fn test_bursts_disabled_by_settings() {
        let mut settings = high();
        settings.particles = false;
        let mut effect = Effect::new(Preset::BubblePop, 800.0, 600.0, 1, settings);
        assert_eq!(effect.spawn_burst(10.0, 10.0, 60.0), 0);
        assert!(!effect.pointer_down(10.0, 10.0));
        assert_eq!(effect.population(), 0);
    }

    #[test]
    fn test_floating_bubbles_pop() {
        let mut effect = Effect::new(Preset::FloatingBubbles, 800.0, 600.0, 7, high());
        assert_eq!(effect.field().len(), presets::FLOATING_INITIAL);

        let at = effect.field().live_particles()[5].pos;
        let top = effect.field().hit_test(at).expect("bubble under its own center");
        let diameter = effect.field().get(top).map(|p| p.radius() * 2.0).unwrap_or(0.0);
        let expected = effect.burst.count_for(diameter);
        let hit = effect.pop_at(at.x, at.y);
        assert_eq!(hit, Some(expected));
        assert_eq!(effect.field().len(), presets::FLOATING_INITIAL - 1);
        assert_eq!(effect.bursts().len(), expected);

        // Bubbles wrap instead of leaving, and one more arrives every interval
        run(&mut effect, 41, 0.05);
        assert_eq!(effect.field().len(), presets::FLOATING_INITIAL);
        for p in effect.field().live_particles() {
            assert!(p.pos.x >= 0.0 && p.pos.x <= 800.0);
            assert!(p.pos.y >= 0.0 && p.pos.y <= 600.0);
        }
    }

    #[test]
    fn test_pop_misses_outside_bubbles() {
        let mut effect = Effect::new(Preset::FloatingBubbles, 800.0, 600.0, 7, high());
        effect.clear();
        assert_eq!(effect.pop_at(10.0, 10.0), None);
        let mut confetti = Effect::new(Preset::Confetti, 800.0, 600.0, 7, high());
        assert_eq!(confetti.pop_at(10.0, 10.0), None);
    }

    #[test]
    fn test_drips_spawn_on_interval() {
        let mut effect = Effect::new(Preset::Drips, 800.0, 600.0, 3, high());
        run(&mut effect, 5, 0.05);
        // 0.25 s -> two batches of five
        assert_eq!(effect.field().len(), 10);
        assert_eq!(effect.spawn_burst(100.0, 100.0, 0.0), 1);
        assert_eq!(effect.field().len(), 11);
    }

    #[test]
    fn test_slime_reset_restores_population() {
        let mut effect = Effect::new(Preset::SlimeField, 800.0, 600.0, 9, high());
        let count = effect.slime.bubble_count;
        assert_eq!(effect.field().len(), count);
        effect.pointer_down(400.0, 300.0);
        for i in 0..20 {
            effect.pointer_move(300.0 + i as f32 * 5.0, 300.0);
            effect.update(0.02);
        }
        assert!(!effect.field().pressure().is_empty());
        assert!(effect.field().pressure().len() <= crate::consts::IMPRINT_CAP);

        effect.spawn_burst(100.0, 100.0, 40.0);
        effect.reset();
        assert_eq!(effect.field().len(), count);
        assert!(effect.bursts().is_empty());
        assert!(effect.field().pressure().is_empty());
    }

    #[test]
    fn test_slime_bubbles_stay_inside() {
        let mut effect = Effect::new(Preset::SlimeField, 400.0, 300.0, 11, high());
        effect.pointer_down(200.0, 150.0);
        run(&mut effect, 300, 1.0 / 60.0);
        for p in effect.field().live_particles() {
            let r = p.radius();
            assert!(p.pos.x - r >= -1e-3 && p.pos.x + r <= 400.0 + 1e-3, "{p:?}");
            assert!(p.pos.y - r >= -1e-3 && p.pos.y + r <= 300.0 + 1e-3, "{p:?}");
        }
    }

    #[test]
    fn test_celebration_fires_on_release() {
        let mut effect = Effect::new(Preset::Celebration, 800.0, 600.0, 4, high());
        assert!(!effect.pointer_down(400.0, 300.0));
        assert_eq!(effect.population(), 0);

        // Held for 0.2 s: the hint grows to 1.2x the base target size
        run(&mut effect, 4, 0.05);
        assert!(effect.pointer_up());
        let counts = presets::CelebrationCounts::for_scale(1.2);
        assert_eq!(effect.bursts().len(), counts.total());
        assert!(counts.confetti >= 60 && counts.accents >= 8 && counts.fish >= 28);
        let fish = effect
            .bursts()
            .live_particles()
            .iter()
            .filter(|p| p.forces.turn.is_some())
            .count();
        assert_eq!(fish, counts.fish);

        // A second release without a press does nothing
        assert!(!effect.pointer_up());
    }

    #[test]
    fn test_celebration_needs_release_over_surface() {
        let mut effect = Effect::new(Preset::Celebration, 800.0, 600.0, 4, high());
        effect.pointer_down(400.0, 300.0);
        effect.pointer_leave();
        assert!(!effect.pointer_up());

        effect.pointer_down(400.0, 300.0);
        effect.pointer_move(900.0, 300.0);
        assert!(!effect.pointer_up());

        effect.pointer_down(400.0, 300.0);
        effect.pointer_cancel();
        assert!(!effect.pointer_up());
        assert_eq!(effect.population(), 0);

        let mut settings = high();
        settings.particles = false;
        let mut quiet = Effect::new(Preset::Celebration, 800.0, 600.0, 4, settings);
        quiet.pointer_down(10.0, 10.0);
        assert!(!quiet.pointer_up());
        assert_eq!(quiet.population(), 0);
    }

    #[test]
    fn test_celebration_burst_scales_with_size_hint() {
        let mut effect = Effect::new(Preset::Celebration, 800.0, 600.0, 4, high());
        let small = effect.spawn_burst(100.0, 100.0, 0.0);
        effect.clear();
        let large = effect.spawn_burst(100.0, 100.0, 1000.0);
        assert_eq!(small, presets::CelebrationCounts::for_scale(0.8).total());
        assert_eq!(large, presets::CelebrationCounts::for_scale(1.6).total());
        assert!(small < large);
    }

    #[test]
    fn test_ocean_pointer_agitates_nearby_bands() {
        let mut effect = Effect::new(Preset::Ocean, 800.0, 600.0, 5, high());
        assert_eq!(effect.waves().len(), ocean::WAVE_COUNT);
        let y = effect.waves()[0].y_offset;
        let near = effect.waves().iter().filter(|w| w.near(y)).count();
        effect.pointer_move(100.0, y);
        assert_eq!(effect.field().len(), near * ocean::SPRAY_PER_AGITATION);
        let band = effect.waves()[0];
        assert!((band.amplitude - band.rest_amplitude * 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_resize_rescales_bands_and_bounds() {
        let mut effect = Effect::new(Preset::Ocean, 800.0, 600.0, 5, high());
        let before = effect.waves()[3].y_offset;
        effect.resize(400.0, 300.0);
        assert!((effect.waves()[3].y_offset - before * 0.5).abs() < 1e-3);
        assert_eq!(effect.field().bounds().map(|b| b.size()), Some(Vec2::new(400.0, 300.0)));
    }

    #[test]
    fn test_render_layers_bursts_over_field() {
        let mut effect = Effect::new(Preset::FloatingBubbles, 800.0, 600.0, 2, high());
        effect.spawn_burst(50.0, 50.0, 60.0);
        let mut surface = RecordingSurface::new(800.0, 600.0);
        effect.render(&mut surface);
        let frame = surface.last_frame();
        // Bubbles draw a fill and a rim; bursts are plain discs afterwards
        let first_ring = frame
            .iter()
            .position(|c| matches!(c, DrawCommand::Ring { .. }))
            .expect("bubble rim");
        let last_ring = frame
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Ring { .. }))
            .expect("bubble rim");
        assert!(first_ring > 0);
        assert!(matches!(frame[last_ring + 1], DrawCommand::Disc { .. }));
        assert_eq!(frame.last(), Some(&DrawCommand::Present));
    }
}
