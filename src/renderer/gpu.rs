//! WebGPU disc backend
//!
//! Batches every disc, ring and polyline stamp of a frame into one instance
//! buffer and draws them with a single instanced SDF pass. The instance buffer
//! is reused across frames and only grows.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use wgpu::util::DeviceExt;

use super::surface::DrawSurface;
use crate::error::{FxError, Result};
use crate::sim::Rgba;

/// Initial instance buffer capacity
const INITIAL_INSTANCES: usize = 1024;
/// Most disc stamps emitted for one polyline
const MAX_POLYLINE_STAMPS: usize = 4096;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2],
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct DiscInstance {
    pub center: [f32; 2],
    pub radius: f32,
    /// 0 for a filled disc, otherwise ring stroke width
    pub ring: f32,
    pub color: [f32; 4],
}

impl DiscInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32, 2 => Float32, 3 => Float32x4];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DiscInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

fn to_array(color: Rgba) -> [f32; 4] {
    [color.r, color.g, color.b, color.a]
}

/// Disc stamps along a polyline, spaced half a stroke width apart
pub fn polyline_stamps(points: &[Vec2], width: f32, color: Rgba, out: &mut Vec<DiscInstance>) {
    let radius = (width * 0.5).max(0.5);
    let spacing = radius.max(0.5);
    let color = to_array(color);
    let mut emitted = 0;
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = a.distance(b);
        let steps = ((len / spacing).ceil() as usize).max(1);
        for i in 0..steps {
            if emitted >= MAX_POLYLINE_STAMPS {
                return;
            }
            let p = a.lerp(b, i as f32 / steps as f32);
            out.push(DiscInstance {
                center: p.to_array(),
                radius,
                ring: 0.0,
                color,
            });
            emitted += 1;
        }
    }
    if let Some(last) = points.last() {
        if emitted < MAX_POLYLINE_STAMPS {
            out.push(DiscInstance {
                center: last.to_array(),
                radius,
                ring: 0.0,
                color,
            });
        }
    }
}

pub struct DiscRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,

    /// Instances recorded since the last clear
    instances: Vec<DiscInstance>,
    clear_color: wgpu::Color,

    pub size: (u32, u32),
}

impl DiscRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("disc-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .map_err(|e| FxError::Gpu(e.to_string()))?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        // Colors are already sRGB-encoded CSS values
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| FxError::Gpu("surface reports no formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        log::info!("Surface config: {}x{}, format: {:?}", width, height, surface_format);
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("disc_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("disc_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                resolution: [width.max(1) as f32, height.max(1) as f32],
                _pad: [0.0; 2],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("disc_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("disc_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("disc_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("disc_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[DiscInstance::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let instance_buffer = Self::create_instance_buffer(&device, INITIAL_INSTANCES);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            bind_group,
            instance_buffer,
            instance_capacity: INITIAL_INSTANCES,
            instances: Vec::with_capacity(INITIAL_INSTANCES),
            clear_color: wgpu::Color::TRANSPARENT,
            size: (width.max(1), height.max(1)),
        })
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("disc_instances"),
            size: (std::mem::size_of::<DiscInstance>() * capacity) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
            let globals = Globals {
                resolution: [new_width as f32, new_height as f32],
                _pad: [0.0; 2],
            };
            self.queue
                .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        }
    }

    /// Instances recorded for the current frame
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Upload the recorded instances and draw them
    pub fn flush(&mut self) -> std::result::Result<(), wgpu::SurfaceError> {
        if self.instances.len() > self.instance_capacity {
            self.instance_capacity = self.instances.len().next_power_of_two();
            self.instance_buffer = Self::create_instance_buffer(&self.device, self.instance_capacity);
            log::debug!("Grew disc instance buffer to {}", self.instance_capacity);
        }
        if !self.instances.is_empty() {
            self.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&self.instances),
            );
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("disc_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("disc_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if !self.instances.is_empty() {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &self.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
                render_pass.draw(0..6, 0..self.instances.len() as u32);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl DrawSurface for DiscRenderState {
    fn size(&self) -> Vec2 {
        Vec2::new(self.size.0 as f32, self.size.1 as f32)
    }

    fn clear(&mut self, background: Option<Rgba>) {
        self.instances.clear();
        self.clear_color = match background {
            Some(c) => wgpu::Color {
                r: c.r as f64,
                g: c.g as f64,
                b: c.b as f64,
                a: c.a as f64,
            },
            None => wgpu::Color::TRANSPARENT,
        };
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.instances.push(DiscInstance {
            center: center.to_array(),
            radius,
            ring: 0.0,
            color: to_array(color),
        });
    }

    fn stroke_ring(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba) {
        self.instances.push(DiscInstance {
            center: center.to_array(),
            radius,
            ring: width.max(0.5),
            color: to_array(color),
        });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Rgba) {
        polyline_stamps(points, width, color, &mut self.instances);
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.resize(width, height);
    }

    fn present(&mut self) {
        match self.flush() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                self.resize(self.size.0, self.size.1);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory!");
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<DiscInstance>(), 32);
        assert_eq!(std::mem::size_of::<Globals>(), 16);
    }

    #[test]
    fn test_polyline_stamps_cover_segments() {
        let mut out = Vec::new();
        let points = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)];
        polyline_stamps(&points, 2.0, Rgba::WHITE, &mut out);
        // 1 px spacing over 10 px plus the end cap
        assert_eq!(out.len(), 11);
        assert_eq!(out[0].center, [0.0, 0.0]);
        assert_eq!(out.last().map(|i| i.center), Some([10.0, 0.0]));
    }

    #[test]
    fn test_polyline_stamps_bounded() {
        let mut out = Vec::new();
        let points = [Vec2::ZERO, Vec2::new(1.0e6, 0.0)];
        polyline_stamps(&points, 1.0, Rgba::WHITE, &mut out);
        assert_eq!(out.len(), MAX_POLYLINE_STAMPS);
        polyline_stamps(&[], 1.0, Rgba::WHITE, &mut out);
        assert_eq!(out.len(), MAX_POLYLINE_STAMPS);
    }
}
