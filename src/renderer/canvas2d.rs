//! Canvas 2D surface
//!
//! Drawing happens in CSS pixels; the backing store is scaled by the clamped
//! device pixel ratio so output stays sharp on HiDPI screens.

use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::surface::DrawSurface;
use crate::error::{FxError, Result};
use crate::platform;
use crate::sim::Rgba;

pub struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Layout size in CSS pixels
    size: Vec2,
    pixel_ratio: f64,
    /// Reused style string; colors repeat far more often than they change
    css: String,
    fill_rgb: Option<[u8; 3]>,
    stroke_rgb: Option<[u8; 3]>,
}

impl Canvas2dSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| FxError::ContextUnavailable("2d".into()))?;
        Ok(Self {
            canvas,
            ctx,
            size: Vec2::ZERO,
            pixel_ratio: 1.0,
            css: String::with_capacity(24),
            fill_rgb: None,
            stroke_rgb: None,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Match the backing store to the element's layout size. Returns the
    /// size in CSS pixels.
    pub fn fit_to_client(&mut self) -> (u32, u32) {
        let width = self.canvas.client_width().max(1) as u32;
        let height = self.canvas.client_height().max(1) as u32;
        self.set_size(width, height);
        (width, height)
    }

    /// Resizing the backing store resets the context state, so the transform
    /// and cached styles are reapplied
    fn apply_backing_size(&mut self, width: u32, height: u32, ratio: f64) {
        let device_w = ((width as f64) * ratio).round().max(1.0) as u32;
        let device_h = ((height as f64) * ratio).round().max(1.0) as u32;
        if self.canvas.width() != device_w || self.canvas.height() != device_h {
            self.canvas.set_width(device_w);
            self.canvas.set_height(device_h);
        }
        let _ = self.ctx.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0);
        self.fill_rgb = None;
        self.stroke_rgb = None;
        self.size = Vec2::new(width as f32, height as f32);
        self.pixel_ratio = ratio;
    }

    #[allow(deprecated)]
    fn set_fill(&mut self, color: Rgba) {
        let rgb = color.to_rgb8();
        if self.fill_rgb != Some(rgb) {
            color.write_css_rgb(&mut self.css);
            self.ctx.set_fill_style(&JsValue::from_str(&self.css));
            self.fill_rgb = Some(rgb);
        }
        self.ctx.set_global_alpha(color.a.clamp(0.0, 1.0) as f64);
    }

    #[allow(deprecated)]
    fn set_stroke(&mut self, color: Rgba, width: f32) {
        let rgb = color.to_rgb8();
        if self.stroke_rgb != Some(rgb) {
            color.write_css_rgb(&mut self.css);
            self.ctx.set_stroke_style(&JsValue::from_str(&self.css));
            self.stroke_rgb = Some(rgb);
        }
        self.ctx.set_global_alpha(color.a.clamp(0.0, 1.0) as f64);
        self.ctx.set_line_width(width as f64);
    }
}

impl DrawSurface for Canvas2dSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self, background: Option<Rgba>) {
        let w = self.size.x as f64;
        let h = self.size.y as f64;
        self.ctx.clear_rect(0.0, 0.0, w, h);
        if let Some(bg) = background {
            self.set_fill(bg);
            self.ctx.fill_rect(0.0, 0.0, w, h);
        }
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius as f64,
            0.0,
            std::f64::consts::TAU,
        );
        self.set_fill(color);
        self.ctx.fill();
    }

    fn stroke_ring(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius as f64,
            0.0,
            std::f64::consts::TAU,
        );
        self.set_stroke(color, width);
        self.ctx.stroke();
    }

    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Rgba) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        self.set_stroke(color, width);
        self.ctx.stroke();
    }

    /// `width`/`height` are CSS pixels; the pixel ratio is re-read so moving
    /// the window between screens picks up the new density
    fn set_size(&mut self, width: u32, height: u32) {
        let ratio = platform::device_pixel_ratio();
        self.apply_backing_size(width.max(1), height.max(1), ratio);
    }
}
