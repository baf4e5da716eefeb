//! Instanced shape pipeline.
//!
//! Every [`DrawItem`] becomes one instance of a screen-space quad. The
//! fragment shader computes the shape's coverage from its local coordinates,
//! so edges are antialiased without multisampling. Shapes are drawn into a
//! persistent offscreen target: a cleared frame starts from the backdrop
//! color, a faded frame loads the previous contents and draws the fade as a
//! translucent full-frame rectangle first.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::canvas::{Backdrop, DrawItem, DrawList, Rgba, Shape};

/// Format the shapes are blended in. Values are stored as they are given,
/// like a 2D canvas.
pub(crate) const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
/// The same texels viewed as sRGB, so the blit decodes them correctly.
pub(crate) const SAMPLE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

const MIN_INSTANCE_CAPACITY: usize = 256;

const KIND_RECT: u32 = 0;
const KIND_DISC: u32 = 1;
const KIND_RING: u32 = 2;
const KIND_ELLIPSE: u32 = 3;
const KIND_TRIANGLE: u32 = 4;

/// Shape shader. Coverage is the signed distance to the edge in pixels,
/// shifted by half a pixel and clamped.
pub const SHAPE_SHADER: &str = r#"
struct Frame {
    size: vec2<f32>,
    _pad: vec2<f32>,
};

@group(0) @binding(0) var<uniform> frame: Frame;

struct ShapeInput {
    @location(0) color: vec4<f32>,
    // centre xy, quad half extents zw
    @location(1) bounds: vec4<f32>,
    @location(2) shape: vec4<f32>,
    @location(3) extra: vec4<f32>,
    @location(4) kind: u32,
    @location(5) rotation: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) local: vec2<f32>,
    @location(2) pixel: vec2<f32>,
    @location(3) @interpolate(flat) kind: u32,
    @location(4) @interpolate(flat) shape: vec4<f32>,
    @location(5) @interpolate(flat) extra: vec4<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    instance: ShapeInput,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );

    let local = quad_vertices[vertex_index] * instance.bounds.zw;
    let c = cos(instance.rotation);
    let s = sin(instance.rotation);
    let turned = vec2<f32>(local.x * c - local.y * s, local.x * s + local.y * c);
    let pixel = instance.bounds.xy + turned;

    // Canvas y grows down, clip y grows up.
    let ndc = vec2<f32>(pixel.x / frame.size.x * 2.0 - 1.0, 1.0 - pixel.y / frame.size.y * 2.0);

    var out: VertexOutput;
    out.clip_position = vec4<f32>(ndc, 0.0, 1.0);
    out.color = instance.color;
    out.local = local;
    out.pixel = pixel;
    out.kind = instance.kind;
    out.shape = instance.shape;
    out.extra = instance.extra;
    return out;
}

fn edge_distance(p: vec2<f32>, a: vec2<f32>, b: vec2<f32>, winding: f32) -> f32 {
    let e = b - a;
    return winding * (e.x * (p.y - a.y) - e.y * (p.x - a.x)) / length(e);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var coverage = 1.0;
    switch in.kind {
        case 1u: {
            // disc: shape.x = radius
            coverage = clamp(in.shape.x - length(in.local) + 0.5, 0.0, 1.0);
        }
        case 2u: {
            // ring: shape.x = radius, shape.y = stroke width
            let off = abs(length(in.local) - in.shape.x);
            coverage = clamp(in.shape.y * 0.5 - off + 0.5, 0.0, 1.0);
        }
        case 3u: {
            // ellipse: shape.xy = semi-axes, local is already in the ellipse frame
            let q = length(in.local / in.shape.xy);
            coverage = clamp((1.0 - q) * min(in.shape.x, in.shape.y) + 0.5, 0.0, 1.0);
        }
        case 4u: {
            // triangle: corners shape.xy, shape.zw, extra.xy; extra.z = winding
            let a = in.shape.xy;
            let b = in.shape.zw;
            let c = in.extra.xy;
            let w = in.extra.z;
            let d = min(
                min(edge_distance(in.pixel, a, b, w), edge_distance(in.pixel, b, c, w)),
                edge_distance(in.pixel, c, a, w),
            );
            coverage = clamp(d + 0.5, 0.0, 1.0);
        }
        default: {}
    }

    if coverage <= 0.0 {
        discard;
    }
    return vec4<f32>(in.color.rgb, in.color.a * coverage);
}
"#;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct FrameUniforms {
    size: [f32; 2],
    _pad: [f32; 2],
}

/// Per-instance vertex data for one shape.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct ShapeInstance {
    color: [f32; 4],
    bounds: [f32; 4],
    shape: [f32; 4],
    extra: [f32; 4],
    kind: u32,
    rotation: f32,
    _pad: [f32; 2],
}

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 6] = [
    wgpu::VertexAttribute {
        offset: std::mem::offset_of!(ShapeInstance, color) as wgpu::BufferAddress,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x4,
    },
    wgpu::VertexAttribute {
        offset: std::mem::offset_of!(ShapeInstance, bounds) as wgpu::BufferAddress,
        shader_location: 1,
        format: wgpu::VertexFormat::Float32x4,
    },
    wgpu::VertexAttribute {
        offset: std::mem::offset_of!(ShapeInstance, shape) as wgpu::BufferAddress,
        shader_location: 2,
        format: wgpu::VertexFormat::Float32x4,
    },
    wgpu::VertexAttribute {
        offset: std::mem::offset_of!(ShapeInstance, extra) as wgpu::BufferAddress,
        shader_location: 3,
        format: wgpu::VertexFormat::Float32x4,
    },
    wgpu::VertexAttribute {
        offset: std::mem::offset_of!(ShapeInstance, kind) as wgpu::BufferAddress,
        shader_location: 4,
        format: wgpu::VertexFormat::Uint32,
    },
    wgpu::VertexAttribute {
        offset: std::mem::offset_of!(ShapeInstance, rotation) as wgpu::BufferAddress,
        shader_location: 5,
        format: wgpu::VertexFormat::Float32,
    },
];

impl ShapeInstance {
    fn new(kind: u32, color: Rgba, centre: Vec2, half: Vec2) -> Self {
        Self {
            color: color.to_array(),
            bounds: [centre.x, centre.y, half.x, half.y],
            shape: [0.0; 4],
            extra: [0.0; 4],
            kind,
            rotation: 0.0,
            _pad: [0.0; 2],
        }
    }

    pub(crate) fn from_item(item: &DrawItem) -> Self {
        let fringe = Vec2::splat(1.0);
        match item.shape {
            Shape::Rect { min, max } => {
                Self::new(KIND_RECT, item.color, (min + max) * 0.5, (max - min) * 0.5)
            }
            Shape::Disc { center, radius } => Self {
                shape: [radius, 0.0, 0.0, 0.0],
                ..Self::new(KIND_DISC, item.color, center, Vec2::splat(radius) + fringe)
            },
            Shape::Ring {
                center,
                radius,
                width,
            } => Self {
                shape: [radius, width, 0.0, 0.0],
                ..Self::new(
                    KIND_RING,
                    item.color,
                    center,
                    Vec2::splat(radius + width * 0.5) + fringe,
                )
            },
            Shape::Ellipse {
                center,
                radii,
                rotation,
            } => Self {
                shape: [radii.x, radii.y, 0.0, 0.0],
                rotation,
                ..Self::new(KIND_ELLIPSE, item.color, center, radii + fringe)
            },
            Shape::Triangle { points: [a, b, c] } => {
                let (min, max) = item.shape.bounds();
                let winding = (b - a).perp_dot(c - a).signum();
                Self {
                    shape: [a.x, a.y, b.x, b.y],
                    extra: [c.x, c.y, winding, 0.0],
                    ..Self::new(KIND_TRIANGLE, item.color, (min + max) * 0.5, (max - min) * 0.5)
                }
            }
        }
    }

    /// Full-frame rectangle for a trail fade.
    fn full_frame(width: u32, height: u32, color: Rgba) -> Self {
        let half = Vec2::new(width as f32, height as f32) * 0.5;
        Self::new(KIND_RECT, color, half, half)
    }
}

/// What one frame asks of the GPU.
#[derive(Debug, PartialEq)]
pub(crate) struct FramePlan {
    /// `Some` clears the target first; `None` draws over the previous frame.
    pub clear: Option<Rgba>,
    pub instances: Vec<ShapeInstance>,
}

impl FramePlan {
    pub(crate) fn from_list(list: &DrawList) -> Self {
        let mut instances = Vec::with_capacity(list.len() + 1);
        let clear = match list.backdrop() {
            Some(Backdrop::Clear(color)) => Some(color),
            Some(Backdrop::Fade(color)) => {
                if color.a > 0.0 {
                    instances.push(ShapeInstance::full_frame(list.width(), list.height(), color));
                }
                None
            }
            None => None,
        };
        instances.extend(list.items().iter().map(ShapeInstance::from_item));
        Self { clear, instances }
    }
}

/// The offscreen texture shapes are drawn into.
pub(crate) struct ShapeTarget {
    pub texture: wgpu::Texture,
    view: wgpu::TextureView,
    pub sample_view: wgpu::TextureView,
    pub size: (u32, u32),
}

pub(crate) struct ShapeRenderer {
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    target: Option<ShapeTarget>,
}

impl ShapeRenderer {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shape Shader"),
            source: wgpu::ShaderSource::Wgsl(SHAPE_SHADER.into()),
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shape Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shape Bind Group Layout"),
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
            label: Some("Shape Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shape Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shape Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<ShapeInstance>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &INSTANCE_ATTRIBUTES,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let instance_buffer = create_instance_buffer(device, MIN_INSTANCE_CAPACITY);

        Self {
            pipeline,
            frame_buffer,
            bind_group,
            instance_buffer,
            instance_capacity: MIN_INSTANCE_CAPACITY,
            target: None,
        }
    }

    pub(crate) fn target(&self) -> Option<&ShapeTarget> {
        self.target.as_ref()
    }

    /// Make sure the target matches `size`. Returns `true` if it was
    /// reallocated, which also drops any trail history.
    pub(crate) fn ensure_target(&mut self, device: &wgpu::Device, size: (u32, u32)) -> bool {
        if self.target.as_ref().map(|t| t.size) == Some(size) {
            return false;
        }
        log::debug!("allocating {}x{} shape target", size.0, size.1);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shape Target"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[SAMPLE_FORMAT],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sample_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Shape Target sRGB View"),
            format: Some(SAMPLE_FORMAT),
            ..Default::default()
        });

        self.target = Some(ShapeTarget {
            texture,
            view,
            sample_view,
            size,
        });
        true
    }

    /// Record the frame in `list` into the target.
    pub(crate) fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        list: &DrawList,
    ) {
        let plan = FramePlan::from_list(list);

        if plan.instances.len() > self.instance_capacity {
            self.instance_capacity = plan.instances.len().next_power_of_two();
            self.instance_buffer = create_instance_buffer(device, self.instance_capacity);
        }
        if !plan.instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&plan.instances));
        }
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms {
                size: [list.width() as f32, list.height() as f32],
                _pad: [0.0; 2],
            }),
        );

        let Some(target) = &self.target else {
            return;
        };
        let load = match plan.clear {
            Some(color) => wgpu::LoadOp::Clear(wgpu::Color {
                r: color.r as f64,
                g: color.g as f64,
                b: color.b as f64,
                a: 1.0,
            }),
            None => wgpu::LoadOp::Load,
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shape Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if plan.instances.is_empty() {
            return;
        }
        let bytes = (plan.instances.len() * std::mem::size_of::<ShapeInstance>()) as u64;
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..bytes));
        render_pass.draw(0..6, 0..plan.instances.len() as u32);
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Shape Instance Buffer"),
        size: (capacity * std::mem::size_of::<ShapeInstance>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
