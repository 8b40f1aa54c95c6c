//! Observer-mode overlay: the display frustum, the virtual screen and the
//! tracked eye, drawn as world-space line segments.

use crate::data::types::LineVertex;
use glam::{Mat4, Vec3};
use parallax_core::DisplayCamera;

/// How far past the virtual screen the frustum edges are drawn, meters.
const FRUSTUM_REACH_PAST_SCREEN: f32 = 0.5;
const EYE_MARKER_HALF_SIZE: f32 = 0.02;
const MAX_LINE_VERTICES: usize = 64;

const FRUSTUM_COLOR: [f32; 4] = [0.176, 0.969, 1.000, 1.0];
const SCREEN_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const EYE_COLOR: [f32; 4] = [1.0, 0.85, 0.2, 1.0];

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct LineUniforms {
    view_proj: [[f32; 4]; 4],
}

pub struct LinePipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
}

impl LinePipeline {
    pub fn new(
        device: &wgpu::Device,
        color_fmt: wgpu::TextureFormat,
        depth_fmt: wgpu::TextureFormat,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Overlay Uniform Buffer"),
            size: std::mem::size_of::<LineUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Overlay VB"),
            size: (MAX_LINE_VERTICES * std::mem::size_of::<LineVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Overlay BGL"),
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
            label: Some("Overlay Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Overlay WGSL"),
            source: wgpu::ShaderSource::Wgsl(LINES_WGSL.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Overlay Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Overlay Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<LineVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 0,
                        },
                        wgpu::VertexAttribute {
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32x4,
                            offset: 12,
                        },
                    ],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_fmt,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_fmt,
                depth_write_enabled: false, // Do not occlude the model
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            bind_group,
            uniform_buffer,
            vertex_buffer,
        }
    }

    pub fn draw<'a>(
        &'a self,
        rpass: &mut wgpu::RenderPass<'a>,
        queue: &wgpu::Queue,
        view_proj: Mat4,
        vertices: &[LineVertex],
    ) {
        let vertices = &vertices[..vertices.len().min(MAX_LINE_VERTICES)];
        if vertices.is_empty() {
            return;
        }
        let uniforms = LineUniforms {
            view_proj: view_proj.to_cols_array_2d(),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.draw(0..vertices.len() as u32, 0..1);
    }
}

/// Line-list vertices for the display camera's frustum, the virtual screen
/// rectangle at `z = 0` and a cross at the eye.
pub fn build_overlay(display: &DisplayCamera, screen_size: (f32, f32)) -> Vec<LineVertex> {
    let mut out = Vec::with_capacity(30);
    let mut segment = |a: Vec3, b: Vec3, color: [f32; 4]| {
        out.push(LineVertex { position: a.to_array(), color });
        out.push(LineVertex { position: b.to_array(), color });
    };

    let (w, h) = screen_size;
    let screen = [
        Vec3::new(-w / 2.0, -h / 2.0, 0.0),
        Vec3::new(w / 2.0, -h / 2.0, 0.0),
        Vec3::new(w / 2.0, h / 2.0, 0.0),
        Vec3::new(-w / 2.0, h / 2.0, 0.0),
    ];
    for i in 0..4 {
        segment(screen[i], screen[(i + 1) % 4], SCREEN_COLOR);
    }

    let eye = display.position;
    let frustum = &display.frustum;
    let reach = (eye.z.abs() + FRUSTUM_REACH_PAST_SCREEN) / frustum.near;
    let corners = frustum.corners_view();
    let ends: [Vec3; 4] = std::array::from_fn(|i| eye + display.orientation * (corners[i] * reach));
    for i in 0..4 {
        segment(eye, ends[i], FRUSTUM_COLOR);
        segment(ends[i], ends[(i + 1) % 4], FRUSTUM_COLOR);
    }

    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        let d = axis * EYE_MARKER_HALF_SIZE;
        segment(eye - d, eye + d, EYE_COLOR);
    }

    out
}

pub const LINES_WGSL: &str = r#"
struct LineUniforms {
    view_proj: mat4x4<f32>,
};
@group(0) @binding(0) var<uniform> U: LineUniforms;

struct VSOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>) -> VSOut {
    var out: VSOut;
    out.clip = U.view_proj * vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VSOut) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use parallax_core::config::ScreenConfig;
    use parallax_core::projection::OffAxisProjector;

    fn display(eye: Vec3) -> (DisplayCamera, (f32, f32)) {
        let mut projector = OffAxisProjector::new(ScreenConfig::default());
        projector.set_viewport(1600, 900);
        (projector.display_camera(eye), projector.screen_size())
    }

    #[test]
    fn frustum_edges_pass_through_screen_corners() {
        let eye = Vec3::new(0.12, -0.04, 0.55);
        let (cam, (w, h)) = display(eye);
        let lines = build_overlay(&cam, (w, h));
        assert_eq!(lines.len(), 30);
        assert!(lines.len() <= MAX_LINE_VERTICES);

        let expected = [
            Vec3::new(-w / 2.0, -h / 2.0, 0.0),
            Vec3::new(w / 2.0, -h / 2.0, 0.0),
            Vec3::new(w / 2.0, h / 2.0, 0.0),
            Vec3::new(-w / 2.0, h / 2.0, 0.0),
        ];
        // Frustum segments follow the 8 screen-rectangle vertices: eye ray, then far edge.
        for (i, corner) in expected.iter().enumerate() {
            let ray = &lines[8 + i * 4..8 + i * 4 + 2];
            let a = Vec3::from_array(ray[0].position);
            let b = Vec3::from_array(ray[1].position);
            assert_eq!(a, eye);
            let t = a.z / (a.z - b.z);
            let hit = a + (b - a) * t;
            assert!((hit - *corner).length() < 1e-4, "corner {i}: {hit:?} vs {corner:?}");
            assert!(b.z < 0.0);
        }
    }

    #[test]
    fn eye_marker_is_centred_on_the_eye() {
        let eye = Vec3::new(-0.2, 0.1, 0.8);
        let (cam, size) = display(eye);
        let lines = build_overlay(&cam, size);
        for pair in lines[24..].chunks(2) {
            let mid = (Vec3::from_array(pair[0].position) + Vec3::from_array(pair[1].position)) / 2.0;
            assert!((mid - eye).length() < 1e-6);
            assert_eq!(pair[0].color, EYE_COLOR);
        }
    }
}
