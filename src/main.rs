//! Fidget FX entry point
//!
//! In the browser this mounts an effect on every `[data-fidget=...]` element
//! and exposes mount/unmount hooks to the page. Natively it runs a headless
//! demo of each preset.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::Element;

    use fidget_fx::platform;
    use fidget_fx::{MountedEffect, Preset, QualityPreset, Settings, mount, mount_dom, mount_gpu};

    thread_local! {
        static MOUNTED: RefCell<Vec<(String, MountedEffect)>> = const { RefCell::new(Vec::new()) };
        static SETTINGS: RefCell<Settings> = RefCell::new(Settings::default());
    }

    fn current_settings() -> Settings {
        SETTINGS.with(|s| s.borrow().clone())
    }

    fn register(id: &str, mounted: MountedEffect) {
        MOUNTED.with(|m| {
            let mut m = m.borrow_mut();
            // Remounting replaces (and thereby unmounts) the old effect
            m.retain(|(existing, _)| existing != id);
            m.push((id.to_string(), mounted));
        });
    }

    /// Mount `preset` on a canvas by id. Returns false (and logs) on failure.
    #[wasm_bindgen]
    pub fn fidget_mount(canvas_id: &str, preset: &str) -> bool {
        let Some(preset) = Preset::parse(preset) else {
            log::warn!("Unknown preset '{}'", preset);
            return false;
        };
        match mount(canvas_id, preset, &current_settings()) {
            Ok(mounted) => {
                register(canvas_id, mounted);
                true
            }
            Err(e) => {
                log::warn!("Mount on '{}' skipped: {}", canvas_id, e);
                false
            }
        }
    }

    /// Stop and clear the effect on a canvas
    #[wasm_bindgen]
    pub fn fidget_unmount(canvas_id: &str) -> bool {
        let removed = MOUNTED.with(|m| {
            let mut m = m.borrow_mut();
            let idx = m.iter().position(|(id, _)| id == canvas_id)?;
            Some(m.remove(idx).1)
        });
        match removed {
            Some(mounted) => {
                mounted.unmount();
                log::info!("Unmounted '{}'", canvas_id);
                true
            }
            None => false,
        }
    }

    /// Trigger a burst on a mounted canvas at surface-local coordinates
    #[wasm_bindgen]
    pub fn fidget_burst(canvas_id: &str, x: f32, y: f32, size_hint: f32) -> u32 {
        MOUNTED.with(|m| {
            m.borrow()
                .iter()
                .find(|(id, _)| id == canvas_id)
                .map(|(_, mounted)| mounted.spawn_burst(x, y, size_hint) as u32)
                .unwrap_or(0)
        })
    }

    /// Restart the population of a mounted canvas
    #[wasm_bindgen]
    pub fn fidget_reset(canvas_id: &str) {
        MOUNTED.with(|m| {
            if let Some((_, mounted)) = m.borrow().iter().find(|(id, _)| id == canvas_id) {
                mounted.reset();
            }
        });
    }

    /// Persist `settings` and push them to every mounted effect
    fn install_settings(settings: Settings) {
        settings.save();
        MOUNTED.with(|m| {
            for (_, mounted) in m.borrow().iter() {
                mounted.apply_settings(&settings);
            }
        });
        SETTINGS.with(|s| *s.borrow_mut() = settings);
    }

    /// Replace the settings (JSON) for every mounted effect and persist them
    #[wasm_bindgen]
    pub fn fidget_apply_settings(json: &str) -> bool {
        match Settings::from_json(json) {
            Ok(settings) => {
                install_settings(settings);
                true
            }
            Err(e) => {
                log::warn!("Settings rejected: {}", e);
                false
            }
        }
    }

    /// Switch the quality preset ("low", "medium", "high") for every effect
    #[wasm_bindgen]
    pub fn fidget_set_quality(name: &str) -> bool {
        let Some(preset) = QualityPreset::parse(name) else {
            log::warn!("Unknown quality '{}'", name);
            return false;
        };
        let mut settings = current_settings();
        settings.apply_preset(preset);
        log::info!("Quality set to {}", preset.as_str());
        install_settings(settings);
        true
    }

    async fn mount_element(element: Element, settings: &Settings) {
        let id = element.id();
        if id.is_empty() {
            log::warn!("Fidget element without an id skipped");
            return;
        }
        let name = element.get_attribute("data-fidget").unwrap_or_default();
        let Some(preset) = Preset::parse(&name) else {
            log::warn!("Unknown preset '{}' on '{}'", name, id);
            return;
        };

        let backend = element.get_attribute("data-backend").unwrap_or_default();
        let result = match backend.as_str() {
            "webgpu" => match mount_gpu(&id, preset, settings).await {
                Ok(mounted) => Ok(mounted),
                Err(e) => {
                    log::warn!("WebGPU unavailable for '{}' ({}), using canvas 2D", id, e);
                    mount(&id, preset, settings)
                }
            },
            "dom" => mount_dom(&id, preset, settings),
            _ => mount(&id, preset, settings),
        };

        match result {
            Ok(mounted) => {
                log::info!("Mounted {} on '{}'", preset, id);
                register(&id, mounted);
            }
            Err(e) => log::warn!("Mount on '{}' skipped: {}", id, e),
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Fidget FX starting...");

        let mut settings = Settings::load();
        settings.reduced_motion |= platform::prefers_reduced_motion();
        settings.coarse_pointer |= platform::has_coarse_pointer();
        SETTINGS.with(|s| *s.borrow_mut() = settings.clone());

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::warn!("No document - nothing to mount");
            return;
        };
        let Ok(nodes) = document.query_selector_all("[data-fidget]") else {
            return;
        };
        for i in 0..nodes.length() {
            let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            mount_element(element, &settings).await;
        }

        log::info!("Fidget FX running ({} effects)", nodes.length());
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Fidget FX (native) starting...");
    log::info!("Browser rendering requires the wasm build - running a headless demo");

    let filter = std::env::args().nth(1).and_then(|name| fidget_fx::Preset::parse(&name));
    for preset in fidget_fx::Preset::ALL {
        if filter.is_none_or(|only| only == preset) {
            headless::run(preset);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use fidget_fx::renderer::RecordingSurface;
    use fidget_fx::{AnimationDriver, Effect, ManualScheduler, Preset, Settings};

    const WIDTH: f32 = 800.0;
    const HEIGHT: f32 = 600.0;
    const FRAME_MS: f64 = 1000.0 / 60.0;
    const FRAMES: usize = 180;

    /// Drive one preset for three simulated seconds with a scripted pointer
    pub fn run(preset: Preset) {
        let effect = Rc::new(RefCell::new(Effect::new(
            preset,
            WIDTH,
            HEIGHT,
            42,
            Settings::default(),
        )));
        let surface = Rc::new(RefCell::new(RecordingSurface::new(WIDTH, HEIGHT)));

        let scheduler = ManualScheduler::new();
        let driver = AnimationDriver::new(scheduler.clone());
        {
            let effect = Rc::clone(&effect);
            let surface = Rc::clone(&surface);
            driver.start(move |dt| {
                let mut effect = effect.borrow_mut();
                let mut surface = surface.borrow_mut();
                effect.update(dt);
                surface.take();
                effect.render(&mut *surface);
            });
        }

        let mut peak = 0;
        for frame in 0..FRAMES {
            let t = frame as f32 / FRAMES as f32;
            let x = WIDTH * (0.2 + 0.6 * t);
            let y = HEIGHT * 0.5 + (t * std::f32::consts::TAU).sin() * 100.0;
            {
                let mut effect = effect.borrow_mut();
                effect.pointer_move(x, y);
                if frame % 60 == 0 {
                    effect.pointer_down(x, y);
                } else if frame % 60 == 10 {
                    effect.pointer_up();
                }
            }
            scheduler.pump(frame as f64 * FRAME_MS);
            peak = peak.max(effect.borrow().population());
        }
        driver.stop();

        let effect = effect.borrow();
        let surface = surface.borrow();
        log::info!(
            "{:>16}: {} frames, peak {} particles, {} alive, {} discs last frame",
            preset.as_str(),
            driver.frames(),
            peak,
            effect.population(),
            surface.disc_count()
        );
    }
}
