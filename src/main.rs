use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

mod cli;
mod config;
mod error;
mod playback;
mod renderer;
mod rose;
mod scene;
mod ui;

use config::RoseConfig;
use playback::{DetachedSink, PlaybackToggle};
use renderer::GpuState;
use rose::{RoseEngine, RoseResult};
use scene::{FrameLoopHandle, GroupPose, InputSender, SceneAnimator, SurfaceEvent};
use ui::{RoseStats, UiActions, UiState, apply_theme, draw_help_overlay, draw_side_panel};

const DEFAULT_LOG_FILTER: &str = "rose3d=info";

struct App {
    config: RoseConfig,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    egui_ctx: egui::Context,

    animator: SceneAnimator,
    input: InputSender,
    frame_loop: Option<FrameLoopHandle>,
    pose: Option<GroupPose>,
    primary_touch: Option<u64>,

    rose_engine: RoseEngine,
    music: PlaybackToggle<DetachedSink>,
    ui_state: UiState,
    stats: RoseStats,

    frame_count: u32,
    fps_timer: Instant,
    last_vsync_state: bool,
    last_frame_time: Instant,
}

impl App {
    fn new(config: RoseConfig, hide_panel: bool) -> Self {
        let animator = SceneAnimator::new(config.window.width, config.window.height);
        let input = animator.sender();

        let rose_engine = RoseEngine::new(config.rose.seed);
        rose_engine.grow();

        let ui_state = UiState::from_config(&config, hide_panel);
        let music = PlaybackToggle::new(DetachedSink::new(config.audio.track.clone()));

        Self {
            window: None,
            gpu: None,
            egui_state: None,
            egui_renderer: None,
            egui_ctx: egui::Context::default(),

            animator,
            input,
            frame_loop: None,
            pose: None,
            primary_touch: None,

            rose_engine,
            music,
            last_vsync_state: ui_state.vsync_enabled,
            ui_state,
            stats: RoseStats::default(),

            frame_count: 0,
            fps_timer: Instant::now(),
            last_frame_time: Instant::now(),

            config,
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>) {
        match pollster::block_on(GpuState::new(window.clone(), self.ui_state.vsync_enabled)) {
            Ok(mut gpu) => {
                gpu.set_background(self.config.render.background);

                let egui_state = egui_winit::State::new(
                    self.egui_ctx.clone(),
                    self.egui_ctx.viewport_id(),
                    &window,
                    Some(window.scale_factor() as f32),
                    None,
                    Some(2048),
                );
                let egui_renderer =
                    egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);

                apply_theme(&self.egui_ctx);

                self.gpu = Some(gpu);
                self.egui_state = Some(egui_state);
                self.egui_renderer = Some(egui_renderer);
                self.stats.gpu_available = true;
            }
            Err(e) => {
                tracing::warn!("GPU unavailable, continuing without 3D rendering: {e}");
            }
        }

        self.window = Some(window);
    }

    fn update(&mut self, event_loop: &ActiveEventLoop) {
        self.frame_count += 1;
        if self.fps_timer.elapsed().as_secs_f32() >= 1.0 {
            self.stats.fps = self.frame_count as f32 / self.fps_timer.elapsed().as_secs_f32();
            self.frame_count = 0;
            self.fps_timer = Instant::now();
        }

        self.music.poll();

        while let Some(result) = self.rose_engine.try_recv_result() {
            match result {
                RoseResult::Grown(baked) => {
                    self.stats.vertices = baked.vertices.len();
                    self.stats.triangles = baked.triangle_count();
                    self.stats.petals = baked.petals;
                    self.stats.sepals = baked.sepals;

                    if let Some(gpu) = &mut self.gpu {
                        gpu.upload_rose(&baked);
                    }
                    tracing::info!(
                        petals = baked.petals,
                        sepals = baked.sepals,
                        triangles = baked.triangle_count(),
                        "rose ready"
                    );
                }
                RoseResult::Error(e) => tracing::debug!("rose not regrown: {e}"),
            }
        }

        match self.animator.tick(Instant::now()) {
            Some(pose) => {
                let state = self.animator.state();
                self.stats.pointer = state.pointer.to_array();
                self.stats.rotation = state.rotation.to_array();
                self.stats.dropped_events = self.animator.dropped_events();
                self.pose = Some(pose);
            }
            None => self.shutdown(event_loop),
        }
    }

    /// Disposes the frame loop, releases the GPU state and leaves the event
    /// loop. Runs once.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        let Some(frame_loop) = self.frame_loop.take() else {
            return;
        };
        frame_loop.dispose();

        tracing::info!(frames = self.animator.frames(), "shutting down");
        self.rose_engine.stop();
        self.egui_renderer = None;
        self.egui_state = None;
        self.gpu = None;
        self.pose = None;
        event_loop.exit();
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        if self.ui_state.fps_cap_enabled && self.ui_state.fps_cap > 0 {
            let frame_duration = Duration::from_secs_f64(1.0 / self.ui_state.fps_cap as f64);
            let elapsed = self.last_frame_time.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            }
        }
        self.last_frame_time = Instant::now();

        let (Some(window), Some(egui_state)) = (&self.window, &mut self.egui_state) else {
            return;
        };

        let raw_input = egui_state.take_egui_input(window);
        let music_glyph = self.music.glyph();
        let last_error = self.rose_engine.last_error();

        let mut ui_actions = UiActions::default();

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if self.ui_state.show_panel {
                ui_actions = draw_side_panel(
                    ctx,
                    &mut self.ui_state,
                    &self.stats,
                    &last_error,
                    music_glyph,
                );
            }

            if self.ui_state.show_help {
                draw_help_overlay(ctx);
            }
        });

        self.handle_ui_actions(ui_actions);

        let Some(gpu) = &mut self.gpu else { return };
        let Some(window) = &self.window else { return };
        let Some(egui_state) = &mut self.egui_state else {
            return;
        };
        let Some(egui_renderer) = &mut self.egui_renderer else {
            return;
        };

        egui_state.handle_platform_output(window, full_output.platform_output);

        if self.ui_state.vsync_enabled != self.last_vsync_state {
            gpu.set_vsync(self.ui_state.vsync_enabled);
            self.last_vsync_state = self.ui_state.vsync_enabled;
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.resize(gpu.size);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("out of GPU memory");
                event_loop.exit();
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::debug!("surface timeout, frame skipped");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Some(pose) = &self.pose {
            gpu.update_scene(self.animator.camera(), pose, self.animator.lights());
        }

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in full_output.textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, id, &delta);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Encoder"),
            });

        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        gpu.render_rose(&view, &mut encoder);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
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

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in full_output.textures_delta.free {
            egui_renderer.free_texture(&id);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        window.request_redraw();
    }

    fn handle_ui_actions(&mut self, actions: UiActions) {
        if actions.regrow {
            self.regrow();
        }

        if actions.toggle_music {
            self.toggle_music();
        }
    }

    fn regrow(&mut self) {
        tracing::debug!("regrow requested");
        self.rose_engine.grow();
    }

    fn toggle_music(&mut self) {
        match self.music.toggle() {
            Ok(state) => tracing::debug!(?state, "music toggled"),
            Err(e) => tracing::warn!("music unavailable: {e}"),
        }
    }

    fn dispose(&mut self) {
        if let Some(frame_loop) = &self.frame_loop {
            frame_loop.dispose();
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::KeyR => self.regrow(),
            KeyCode::KeyM => self.toggle_music(),
            KeyCode::KeyH => self.ui_state.show_panel = !self.ui_state.show_panel,
            KeyCode::Escape => self.dispose(),
            _ => {}
        }
    }

    fn handle_touch(&mut self, id: u64, phase: TouchPhase, x: f32, y: f32) {
        match phase {
            TouchPhase::Started if self.primary_touch.is_none() => {
                self.primary_touch = Some(id);
                self.input.send(SurfaceEvent::TouchStart { x, y });
            }
            TouchPhase::Moved if self.primary_touch == Some(id) => {
                self.input.send(SurfaceEvent::TouchMove { x, y });
            }
            TouchPhase::Ended | TouchPhase::Cancelled if self.primary_touch == Some(id) => {
                self.primary_touch = None;
                self.input.send(SurfaceEvent::TouchEnd);
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.init_gpu(window);

        self.frame_loop = Some(self.animator.start());
        self.input.send(SurfaceEvent::Resize {
            width: size.width,
            height: size.height,
        });
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(egui_state) = &mut self.egui_state {
            if let Some(window) = &self.window {
                let response = egui_state.on_window_event(window, &event);
                if response.consumed {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
                self.input.send(SurfaceEvent::Resize {
                    width: size.width,
                    height: size.height,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.input.send(SurfaceEvent::PointerMove {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }

            WindowEvent::CursorLeft { .. } => {
                self.input.send(SurfaceEvent::PointerLeave);
            }

            WindowEvent::Touch(touch) => {
                self.handle_touch(
                    touch.id,
                    touch.phase,
                    touch.location.x as f32,
                    touch.location.y as f32,
                );
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(key) = event.physical_key {
                        self.handle_key(key);
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                self.update(event_loop);
                if self.pose.is_some() {
                    self.render(event_loop);
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    let args = cli::parse();

    let filter = match args.log_level.as_deref() {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|e| {
            eprintln!("invalid log filter {level:?} ({e}), using {DEFAULT_LOG_FILTER}");
            EnvFilter::new(DEFAULT_LOG_FILTER)
        }),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("rose3d v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = config::load(args.config.as_deref());
    if args.seed.is_some() {
        config.rose.seed = args.seed;
    }
    if let Some(seed) = config.rose.seed {
        tracing::info!(seed, "using fixed seed");
    }

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            tracing::error!("failed to create event loop: {e}");
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, args.no_panel);
    if let Err(e) = event_loop.run_app(&mut app) {
        tracing::error!("event loop error: {e}");
    }
    tracing::info!("shutdown complete");
}
