//! The rendering orchestrator. Owns the GPU context, the depth target and
//! the scene pipelines; the app layers egui on top of each frame.

pub mod context;
pub mod pipelines;
pub mod targets;

use self::{
    context::GfxContext,
    pipelines::{
        lines::{build_overlay, LinePipeline},
        mesh::MeshPipeline,
    },
    targets::{DepthTarget, DEPTH_FORMAT},
};
use crate::{camera::make_mesh_uniform, data::types::MeshGpu};
use glam::{Mat4, Vec3};
use parallax_core::{FrameView, RenderSource};
use std::sync::Arc;
use winit::window::Window;

/// Direction toward the key light: in front of the screen and above.
const LIGHT_DIRECTION: Vec3 = Vec3::new(0.0, 2.0, 2.0);
const MODEL_COLOR: [f32; 4] = [0.82, 0.84, 0.88, 1.0];
const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.02, g: 0.02, b: 0.04, a: 1.0 };

pub struct Renderer {
    pub gfx: GfxContext,
    pub depth: DepthTarget,
    pub mesh: MeshPipeline,
    pub lines: LinePipeline,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window).await?;

        let depth = DepthTarget::new(&gfx.device, gfx.size);
        let mesh = MeshPipeline::new(&gfx.device, gfx.config.format, DEPTH_FORMAT);
        let lines = LinePipeline::new(&gfx.device, gfx.config.format, DEPTH_FORMAT);
        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        Ok(Self {
            gfx,
            depth,
            mesh,
            lines,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.depth.resize(&self.gfx.device, new_size);
        }
    }

    /// Draws the scene from the camera selected in `view`. The observer view
    /// also shows the display frustum, screen and eye.
    pub fn render(
        &mut self,
        swap_view: &wgpu::TextureView,
        view: &FrameView,
        model: Option<(&MeshGpu, Mat4)>,
    ) {
        let overlay = match view.source {
            RenderSource::Observer => build_overlay(&view.display, view.screen_size),
            RenderSource::Display => Vec::new(),
        };

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some((mesh, transform)) = model {
                let uniform = make_mesh_uniform(view.view_proj, transform, LIGHT_DIRECTION, MODEL_COLOR);
                self.mesh.draw(&mut pass, &self.gfx.queue, &uniform, mesh);
            }

            self.lines
                .draw(&mut pass, &self.gfx.queue, view.view_proj, &overlay);
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }
}
