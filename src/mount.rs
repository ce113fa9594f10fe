//! Browser mounting
//!
//! Binds an [`Effect`] to a `<canvas>` (or, for the DOM backend, a container
//! element): listeners write pointer, tilt and resize input into the shared
//! effect, and a `requestAnimationFrame` driver ticks and draws it. Dropping
//! the handle unmounts.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    DeviceOrientationEvent, Event, EventTarget, HtmlCanvasElement, HtmlElement, PointerEvent,
};

use crate::audio::{AudioManager, SoundEffect};
use crate::driver::AnimationDriver;
use crate::effects::{Effect, Preset};
use crate::error::{FxError, Result};
use crate::platform::RafScheduler;
use crate::renderer::{Canvas2dSurface, DiscRenderState, DomNodeHost, DrawSurface, RetainedRenderer};
use crate::settings::Settings;

/// Tilt angle (degrees) mapped to a full unit of tilt
const TILT_RANGE_DEG: f64 = 45.0;

/// Where frames go
enum View {
    /// Immediate-mode surface redrawn every frame
    Surface(Box<dyn DrawSurface>),
    /// One persistent element per particle; ids are per system so each layer
    /// keeps its own node map
    Nodes {
        field: RetainedRenderer<DomNodeHost>,
        bursts: RetainedRenderer<DomNodeHost>,
    },
}

/// Everything one frame needs, behind a single borrow
struct Scene {
    effect: Effect,
    view: View,
    audio: Option<AudioManager>,
}

impl Scene {
    fn frame(&mut self, dt: f32) {
        self.effect.update(dt);
        match &mut self.view {
            View::Surface(surface) => self.effect.render(surface.as_mut()),
            View::Nodes { field, bursts } => {
                field.render(self.effect.field().live_particles());
                bursts.render(self.effect.bursts().live_particles());
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let View::Surface(surface) = &mut self.view {
            surface.set_size(width, height);
        }
        self.effect.resize(width as f32, height as f32);
    }

    fn play_cue(&self, preset: Preset) {
        if let (Some(audio), Some(cue)) = (self.audio.as_ref(), SoundEffect::for_preset(preset)) {
            audio.play(cue);
        }
    }

    fn clear(&mut self) {
        self.effect.clear();
        if let View::Nodes { field, bursts } = &mut self.view {
            field.clear();
            bursts.clear();
        }
    }
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

/// A live effect on a canvas or container
pub struct MountedEffect {
    element: HtmlElement,
    scene: Rc<RefCell<Scene>>,
    driver: AnimationDriver<RafScheduler>,
    listeners: Vec<Listener>,
}

/// Mount `preset` on `<canvas id=canvas_id>` with a 2D context
pub fn mount(canvas_id: &str, preset: Preset, settings: &Settings) -> Result<MountedEffect> {
    let canvas = find_canvas(canvas_id)?;
    let mut surface = Canvas2dSurface::new(canvas.clone())?;
    let (width, height) = surface.fit_to_client();
    let view = View::Surface(Box::new(surface));
    MountedEffect::new(canvas.into(), view, preset, settings, width, height)
}

/// Mount `preset` on `<canvas id=canvas_id>` with the WebGPU disc renderer
pub async fn mount_gpu(
    canvas_id: &str,
    preset: Preset,
    settings: &Settings,
) -> Result<MountedEffect> {
    let canvas = find_canvas(canvas_id)?;
    let width = canvas.client_width().max(1) as u32;
    let height = canvas.client_height().max(1) as u32;
    canvas.set_width(width);
    canvas.set_height(height);

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU,
        ..Default::default()
    });
    let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .map_err(|e| FxError::Gpu(e.to_string()))?;
    log::info!("Using adapter: {:?}", adapter.get_info().name);

    let render_state = DiscRenderState::new(surface, &adapter, width, height).await?;
    let view = View::Surface(Box::new(render_state));
    MountedEffect::new(canvas.into(), view, preset, settings, width, height)
}

/// Mount `preset` as positioned `<div>`s inside the element `container_id`
pub fn mount_dom(container_id: &str, preset: Preset, settings: &Settings) -> Result<MountedEffect> {
    let document = document()?;
    let host = DomNodeHost::from_id(&document, container_id)?;
    let element = host.container().clone();
    let width = element.client_width().max(1) as u32;
    let height = element.client_height().max(1) as u32;
    let view = View::Nodes {
        field: RetainedRenderer::new(host.clone()),
        bursts: RetainedRenderer::new(host),
    };
    MountedEffect::new(element, view, preset, settings, width, height)
}

fn document() -> Result<web_sys::Document> {
    let window = web_sys::window().ok_or(FxError::MissingWindow)?;
    window.document().ok_or(FxError::MissingDocument)
}

fn find_canvas(id: &str) -> Result<HtmlCanvasElement> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| FxError::MissingSurface(id.to_string()))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| FxError::NotACanvas(id.to_string()))
}

impl MountedEffect {
    fn new(
        element: HtmlElement,
        view: View,
        preset: Preset,
        settings: &Settings,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let seed = js_sys::Date::now() as u64;
        let effect = Effect::new(preset, width as f32, height as f32, seed, settings.clone());
        let audio = settings.sound.then(|| AudioManager::new(settings));
        let scene = Rc::new(RefCell::new(Scene {
            effect,
            view,
            audio,
        }));

        let mut mounted = Self {
            element,
            scene,
            driver: AnimationDriver::new(RafScheduler),
            listeners: Vec::new(),
        };
        mounted.bind_listeners()?;
        mounted.start();
        Ok(mounted)
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    /// (Re)start the frame loop
    pub fn start(&self) {
        let scene = Rc::clone(&self.scene);
        self.driver.start(move |dt| scene.borrow_mut().frame(dt));
    }

    /// Pause the frame loop; particles are kept
    pub fn stop(&self) {
        self.driver.stop();
    }

    pub fn reset(&self) {
        self.scene.borrow_mut().effect.reset();
    }

    pub fn spawn_burst(&self, x: f32, y: f32, size_hint: f32) -> usize {
        self.scene.borrow_mut().effect.spawn_burst(x, y, size_hint)
    }

    pub fn pop_at(&self, x: f32, y: f32) -> Option<usize> {
        self.scene.borrow_mut().effect.pop_at(x, y)
    }

    pub fn apply_settings(&self, settings: &Settings) {
        let mut scene = self.scene.borrow_mut();
        scene.effect.apply_settings(settings.clone());
        if !settings.sound {
            scene.audio = None;
        } else if let Some(audio) = scene.audio.as_mut() {
            audio.apply_settings(settings);
        } else {
            scene.audio = Some(AudioManager::new(settings));
        }
    }

    /// Stop the loop, remove listeners and drop every particle
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        self.driver.stop();
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.kind,
                listener.closure.as_ref().unchecked_ref(),
            );
        }
        if let Ok(mut scene) = self.scene.try_borrow_mut() {
            scene.clear();
        }
    }

    fn listen<F>(&mut self, target: EventTarget, kind: &'static str, handler: F) -> Result<()>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .map_err(|_| FxError::ContextUnavailable(format!("{kind} listener")))?;
        self.listeners.push(Listener {
            target,
            kind,
            closure,
        });
        Ok(())
    }

    fn bind_listeners(&mut self) -> Result<()> {
        let window = web_sys::window().ok_or(FxError::MissingWindow)?;
        let document = window.document().ok_or(FxError::MissingDocument)?;
        let target: EventTarget = self.element.clone().into();

        // Pointer move
        {
            let scene = Rc::clone(&self.scene);
            let element = self.element.clone();
            self.listen(target.clone(), "pointermove", move |event| {
                if let Some((x, y)) = local_point(&element, &event) {
                    scene.borrow_mut().effect.pointer_move(x, y);
                }
            })?;
        }

        // Pointer down: the preset's click action (release-burst presets only arm)
        {
            let scene = Rc::clone(&self.scene);
            let element = self.element.clone();
            self.listen(target.clone(), "pointerdown", move |event| {
                let Some((x, y)) = local_point(&element, &event) else {
                    return;
                };
                let mut scene = scene.borrow_mut();
                let preset = scene.effect.preset();
                if scene.effect.pointer_down(x, y) {
                    scene.play_cue(preset);
                }
            })?;
        }

        // Pointer release: release-burst presets fire here
        {
            let scene = Rc::clone(&self.scene);
            self.listen(target.clone(), "pointerup", move |_event| {
                let mut scene = scene.borrow_mut();
                let preset = scene.effect.preset();
                if scene.effect.pointer_up() {
                    scene.play_cue(preset);
                }
            })?;
        }

        // Cancel and leave drop the press without firing
        {
            let scene = Rc::clone(&self.scene);
            self.listen(target.clone(), "pointercancel", move |_event| {
                scene.borrow_mut().effect.pointer_cancel();
            })?;
        }
        {
            let scene = Rc::clone(&self.scene);
            self.listen(target, "pointerleave", move |_event| {
                scene.borrow_mut().effect.pointer_leave();
            })?;
        }

        // Resize: match the backing store to the layout size
        {
            let scene = Rc::clone(&self.scene);
            let element = self.element.clone();
            self.listen(window.clone().into(), "resize", move |_event| {
                let width = element.client_width().max(1) as u32;
                let height = element.client_height().max(1) as u32;
                scene.borrow_mut().resize(width, height);
            })?;
        }

        // Device tilt (ignored where the permission is denied or absent)
        {
            let scene = Rc::clone(&self.scene);
            self.listen(window.into(), "deviceorientation", move |event| {
                let Ok(event) = event.dyn_into::<DeviceOrientationEvent>() else {
                    return;
                };
                let x = event.gamma().unwrap_or(0.0) / TILT_RANGE_DEG;
                let y = event.beta().unwrap_or(0.0) / TILT_RANGE_DEG;
                scene.borrow_mut().effect.set_tilt(x as f32, y as f32);
            })?;
        }

        // Pause while the page is hidden; a loop stopped by the page stays stopped
        {
            let scene = Rc::clone(&self.scene);
            let driver = self.driver.clone();
            let doc = document.clone();
            self.listen(document.into(), "visibilitychange", move |_event| {
                if doc.hidden() {
                    if driver.suspend() {
                        log::info!("Page hidden - animation paused");
                    }
                } else {
                    let scene = Rc::clone(&scene);
                    if driver.resume(move |dt| scene.borrow_mut().frame(dt)) {
                        log::info!("Page visible - animation resumed");
                    }
                }
            })?;
        }

        Ok(())
    }
}

impl Drop for MountedEffect {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Event position relative to the element's top-left corner
fn local_point(element: &HtmlElement, event: &Event) -> Option<(f32, f32)> {
    let event = event.dyn_ref::<PointerEvent>()?;
    let rect = element.get_bounding_client_rect();
    let x = event.client_x() as f64 - rect.left();
    let y = event.client_y() as f64 - rect.top();
    Some((x as f32, y as f32))
}
