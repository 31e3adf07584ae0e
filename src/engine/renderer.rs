use std::ops::Range;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use wgpu::SurfaceError;
use winit::{dpi::PhysicalSize, window::Window};

use super::resources::Bitmap;
use crate::ui::{Color, DrawCommand, Rect, Scene, TextureId};

struct GpuTexture {
    bind_group: wgpu::BindGroup,
    // Keeps the GPU allocation alive for the bind group.
    _texture: wgpu::Texture,
}

enum Batch {
    Fill(Range<u32>),
    Texture(TextureId, Range<u32>),
}

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    fill_pipeline: wgpu::RenderPipeline,
    texture_pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    textures: Vec<GpuTexture>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(|err| anyhow!("failed to create surface: {err}"))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("No suitable GPU adapters found"))?;

        let required_limits = if cfg!(target_arch = "wasm32") {
            wgpu::Limits::downlevel_webgl2_defaults()
        } else {
            wgpu::Limits::default()
        };
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("tapmark-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let alpha_mode = surface_caps
            .alpha_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::CompositeAlphaMode::Opaque)
            .unwrap_or(surface_caps.alpha_modes[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tapmark-shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tapmark-texture-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let fill_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tapmark-fill-pipeline-layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });
        let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tapmark-texture-pipeline-layout"),
            bind_group_layouts: &[&texture_layout],
            push_constant_ranges: &[],
        });

        let fill_pipeline = create_pipeline(
            &device,
            "tapmark-fill-pipeline",
            &fill_layout,
            &shader,
            ("vs_fill", "fs_fill"),
            FillVertex::layout(),
            config.format,
        );
        let texture_pipeline = create_pipeline(
            &device,
            "tapmark-texture-pipeline",
            &textured_layout,
            &shader,
            ("vs_texture", "fs_texture"),
            TextureVertex::layout(),
            config.format,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tapmark-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            fill_pipeline,
            texture_pipeline,
            texture_layout,
            sampler,
            textures: Vec::new(),
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Fails without touching the device when the bitmap is empty or larger
    /// than the adapter allows.
    pub fn upload(&mut self, bitmap: &Bitmap) -> Result<TextureId> {
        check_texture_size(
            bitmap.width,
            bitmap.height,
            self.device.limits().max_texture_dimension_2d,
        )?;
        let extent = wgpu::Extent3d {
            width: bitmap.width,
            height: bitmap.height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tapmark-texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &bitmap.pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * bitmap.width),
                rows_per_image: Some(bitmap.height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tapmark-texture-bind-group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        self.textures.push(GpuTexture {
            bind_group,
            _texture: texture,
        });
        Ok(TextureId(self.textures.len() - 1))
    }

    pub fn render(&mut self, scene: &Scene) -> Result<(), SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut fill_vertices = Vec::new();
        let mut texture_vertices = Vec::new();
        let mut batches: Vec<Batch> = Vec::new();
        for command in &scene.commands {
            match command {
                DrawCommand::Fill { rect, color } => {
                    let start = fill_vertices.len() as u32;
                    self.fill_quad(*rect, *color, &mut fill_vertices);
                    let end = fill_vertices.len() as u32;
                    match batches.last_mut() {
                        Some(Batch::Fill(range)) if range.end == start => range.end = end,
                        _ => batches.push(Batch::Fill(start..end)),
                    }
                }
                DrawCommand::Texture { texture, dst } => {
                    if texture.0 >= self.textures.len() {
                        tracing::warn!(texture = texture.0, "draw of unknown texture skipped");
                        continue;
                    }
                    let start = texture_vertices.len() as u32;
                    self.texture_quad(*dst, &mut texture_vertices);
                    let end = texture_vertices.len() as u32;
                    batches.push(Batch::Texture(*texture, start..end));
                }
            }
        }

        let fill_buffer = self.vertex_buffer("tapmark-fill-vertices", &fill_vertices);
        let texture_buffer = self.vertex_buffer("tapmark-texture-vertices", &texture_vertices);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tapmark-render-encoder"),
            });

        {
            let [r, g, b, a] = self.shade(scene.clear);
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tapmark-render-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(r),
                            g: f64::from(g),
                            b: f64::from(b),
                            a: f64::from(a),
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for batch in &batches {
                match batch {
                    Batch::Fill(range) => {
                        if let Some(buffer) = fill_buffer.as_ref() {
                            render_pass.set_pipeline(&self.fill_pipeline);
                            render_pass.set_vertex_buffer(0, buffer.slice(..));
                            render_pass.draw(range.clone(), 0..1);
                        }
                    }
                    Batch::Texture(id, range) => {
                        if let Some(buffer) = texture_buffer.as_ref() {
                            render_pass.set_pipeline(&self.texture_pipeline);
                            render_pass.set_bind_group(0, &self.textures[id.0].bind_group, &[]);
                            render_pass.set_vertex_buffer(0, buffer.slice(..));
                            render_pass.draw(range.clone(), 0..1);
                        }
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn vertex_buffer<V: Pod>(&self, label: &str, vertices: &[V]) -> Option<wgpu::Buffer> {
        if vertices.is_empty() {
            return None;
        }
        Some(
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
        )
    }

    /// Colours are sRGB bytes; an sRGB target expects linear values.
    fn shade(&self, color: Color) -> [f32; 4] {
        let [r, g, b, a] = color.to_f32();
        if self.config.format.is_srgb() {
            [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a]
        } else {
            [r, g, b, a]
        }
    }

    fn corners(&self, rect: Rect) -> Option<[[f32; 2]; 4]> {
        if self.size.width == 0 || self.size.height == 0 {
            return None;
        }
        let width = self.size.width as f32;
        let height = self.size.height as f32;

        let left = (rect.x / width) * 2.0 - 1.0;
        let right = ((rect.x + rect.width) / width) * 2.0 - 1.0;
        let top = 1.0 - (rect.y / height) * 2.0;
        let bottom = 1.0 - ((rect.y + rect.height) / height) * 2.0;
        Some([[left, top], [right, top], [right, bottom], [left, bottom]])
    }

    fn fill_quad(&self, rect: Rect, color: Color, out: &mut Vec<FillVertex>) {
        let Some([v0, v1, v2, v3]) = self.corners(rect) else {
            return;
        };
        let color = self.shade(color);
        let v = |position: [f32; 2]| FillVertex { position, color };
        out.extend_from_slice(&[v(v0), v(v2), v(v1), v(v0), v(v3), v(v2)]);
    }

    fn texture_quad(&self, rect: Rect, out: &mut Vec<TextureVertex>) {
        let Some([v0, v1, v2, v3]) = self.corners(rect) else {
            return;
        };
        let v = |position: [f32; 2], uv: [f32; 2]| TextureVertex { position, uv };
        out.extend_from_slice(&[
            v(v0, [0.0, 0.0]),
            v(v2, [1.0, 1.0]),
            v(v1, [1.0, 0.0]),
            v(v0, [0.0, 0.0]),
            v(v3, [0.0, 1.0]),
            v(v2, [1.0, 1.0]),
        ]);
    }
}

pub(crate) fn check_texture_size(width: u32, height: u32, limit: u32) -> Result<()> {
    if width == 0 || height == 0 {
        bail!("texture is empty ({width}x{height})");
    }
    if width > limit || height > limit {
        bail!("texture {width}x{height} exceeds the {limit}px device limit");
    }
    Ok(())
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    (vs_entry, fs_entry): (&str, &str),
    vertex_layout: wgpu::VertexBufferLayout<'static>,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: vs_entry,
            buffers: &[vertex_layout],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: fs_entry,
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct FillVertex {
    position: [f32; 2],
    color: [f32; 4],
}

impl FillVertex {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<FillVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as u64,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct TextureVertex {
    position: [f32; 2],
    uv: [f32; 2],
}

impl TextureVertex {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TextureVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as u64,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

const SHADER: &str = r#"
struct FillIn {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
};

struct FillOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_fill(in: FillIn) -> FillOut {
    var out: FillOut;
    out.position = vec4<f32>(in.position, 0.0, 1.0);
    out.color = in.color;
    return out;
}

@fragment
fn fs_fill(in: FillOut) -> @location(0) vec4<f32> {
    return in.color;
}

struct TextureIn {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
};

struct TextureOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0) var t_image: texture_2d<f32>;
@group(0) @binding(1) var s_image: sampler;

@vertex
fn vs_texture(in: TextureIn) -> TextureOut {
    var out: TextureOut;
    out.position = vec4<f32>(in.position, 0.0, 1.0);
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_texture(in: TextureOut) -> @location(0) vec4<f32> {
    return textureSample(t_image, s_image, in.uv);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_size_within_limit() {
        assert!(check_texture_size(1, 1, 2048).is_ok());
        assert!(check_texture_size(2048, 64, 2048).is_ok());
    }

    #[test]
    fn oversized_or_empty_textures_are_rejected() {
        assert!(check_texture_size(2049, 64, 2048).is_err());
        assert!(check_texture_size(64, 9000, 8192).is_err());
        assert!(check_texture_size(0, 64, 2048).is_err());
        assert!(check_texture_size(64, 0, 2048).is_err());
    }
}
