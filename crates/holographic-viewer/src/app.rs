use crate::{
    assets::{AssetProvider, LoadedAsset, ObjLibrary},
    camera::PointerInput,
    config::Config,
    data::types::MeshGpu,
    net::{FeedMessage, LandmarkFeed},
    renderer::Renderer,
    ui::{self, PanelState, UiAction},
};
use anyhow::Result;
use crossbeam_channel::{bounded, Receiver};
use parallax_core::{CameraMode, ManipulableTarget, Session, SessionEvent};
use std::{sync::Arc, thread::JoinHandle};
use winit::{
    event::{ElementState, WindowEvent},
    window::Window,
};

/// Frames buffered between the feed thread and the render loop.
const FEED_QUEUE_LEN: usize = 4;

pub struct App {
    pub renderer: Renderer,
    pub session: Session,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pointer: PointerInput,
    library: ObjLibrary,
    model: Option<MeshGpu>,
    load_error: Option<String>,
    feed_rx: Receiver<FeedMessage>,
    _feed_thread: Option<JoinHandle<()>>,
}

impl App {
    pub async fn new(window: Arc<Window>, config: &Config) -> Result<Self> {
        let renderer = Renderer::new(window.clone()).await?;
        let size = renderer.gfx.size;

        let mut session = Session::new(config.session())?;
        session.apply(SessionEvent::SetInvertX(config.invert_x));
        session.apply(SessionEvent::Resized {
            width: size.width,
            height: size.height,
        });

        let (tx, feed_rx) = bounded(FEED_QUEUE_LEN);
        let feed_thread = match LandmarkFeed::bind(config.landmark_addr) {
            Ok(feed) => Some(feed.spawn(config.feed_timeout(), tx)),
            Err(e) => {
                session.apply(SessionEvent::SourceUnavailable(format!(
                    "cannot listen on {}: {e}",
                    config.landmark_addr
                )));
                None
            }
        };

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        let mut app = Self {
            renderer,
            session,
            egui_ctx,
            egui_state,
            pointer: PointerInput::new(),
            library: ObjLibrary::scan(&config.models_dir),
            model: None,
            load_error: None,
            feed_rx,
            _feed_thread: feed_thread,
        };

        if let Some(first) = app.library.names().first().cloned() {
            app.select_model(&first);
        }

        Ok(app)
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            self.session.apply(SessionEvent::Resized {
                width: new_size.width,
                height: new_size.height,
            });
        }
    }

    /// Returns `true` when egui consumed the event.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);

        // Always track the cursor; releases always reach the session so a
        // drag that ends over the panel does not stick.
        if let Some(pointer) = self.pointer.translate(event) {
            let is_release = matches!(
                event,
                WindowEvent::MouseInput {
                    state: ElementState::Released,
                    ..
                }
            );
            if !response.consumed || is_release {
                self.session.apply(SessionEvent::Pointer(pointer));
            }
        }
        if response.consumed {
            return true;
        }

        if let WindowEvent::Resized(physical_size) = event {
            self.resize(*physical_size);
        }

        false
    }

    /// Loads `name` and makes it the displayed object. On failure the current
    /// model stays on screen.
    pub fn select_model(&mut self, name: &str) {
        match load_and_fit(&self.library, &mut self.session, name) {
            Ok(asset) => {
                let gpu = self
                    .renderer
                    .mesh
                    .upload(&self.renderer.gfx.device, name, &asset.mesh);
                self.model = Some(gpu);
                self.load_error = None;
            }
            Err(e) => {
                log::error!("Failed to load model '{name}': {e:#}");
                self.load_error = Some(format!("Could not load {name}"));
            }
        }
    }

    /// Applies everything the feed delivered since the last frame.
    fn drain_feed(&mut self) {
        let pending: Vec<FeedMessage> = self.feed_rx.try_iter().collect();
        for msg in pending {
            self.session.apply(feed_event(msg));
        }
    }

    fn apply_ui_action(&mut self, action: UiAction) {
        match action {
            UiAction::Calibrate => self.session.apply(SessionEvent::Calibrate),
            UiAction::SetInvertX(on) => self.session.apply(SessionEvent::SetInvertX(on)),
            UiAction::SetObserver(on) => {
                let mode = if on { CameraMode::Observer } else { CameraMode::Display };
                self.session.apply(SessionEvent::SetCameraMode(mode));
            }
            UiAction::SelectModel(name) => self.select_model(&name),
        }
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        self.drain_feed();
        let view = self.session.frame_view();

        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let model = self
            .model
            .as_ref()
            .zip(self.session.target().map(|t| t.transform.matrix()));
        self.renderer.render(&swap_view, &view, model);

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);

        let panel = PanelState {
            status: self.session.status().to_string(),
            invert_x: self.session.invert_x(),
            observer: self.session.camera_mode() == CameraMode::Observer,
            models: self.library.names(),
            current_model: self.model.as_ref().map(|m| m.name.as_str()),
            eye: self.session.eye_position(),
            calibration_offset: self.session.calibration().offset(),
            load_error: self.load_error.as_deref(),
        };
        let actions = ui::draw_panel(&self.egui_ctx, &panel);

        let egui_output = self.egui_ctx.end_frame();
        self.egui_state
            .handle_platform_output(window, egui_output.platform_output);
        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });

        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }

        self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(std::iter::once(encoder.finish()));
        frame.present();

        // Panel actions take effect from the next frame.
        for action in actions {
            self.apply_ui_action(action);
        }

        Ok(())
    }
}

/// Loads `name` and installs its auto-fitted target in `session`. On error
/// the session keeps whatever target it had.
fn load_and_fit(
    provider: &impl AssetProvider,
    session: &mut Session,
    name: &str,
) -> Result<LoadedAsset> {
    let asset = provider.load(name)?;
    let fit_size = session.config().interaction.fit_size_m;
    session.replace_target(Some(ManipulableTarget::fit(&asset.bounds, fit_size)));
    Ok(asset)
}

fn feed_event(msg: FeedMessage) -> SessionEvent {
    match msg {
        FeedMessage::Frame(frame) => SessionEvent::Landmarks(frame),
        FeedMessage::Stalled => SessionEvent::SourceStalled,
        FeedMessage::Unavailable(reason) => SessionEvent::SourceUnavailable(reason),
    }
}
