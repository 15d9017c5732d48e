use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use tiledrive_input::InputState;
use tiledrive_kernel::GridWorld;
use tiledrive_physics::RapierBackend;
use tiledrive_render_wgpu::{ChaseCamera, WgpuRenderer};
use tiledrive_scene::{FixedTimestep, Scene, SceneAssets, SceneConfig};
use tiledrive_tools::SceneInspector;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode as WinitKey, PhysicalKey};
use winit::window::{Window, WindowId};

mod keys;

#[derive(Parser)]
#[command(name = "tiledrive-desktop", about = "Drive around a tile-grid map")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config (YAML)
    #[arg(long, default_value = "assets/scene.yaml")]
    scene: PathBuf,
}

type DriveScene = Scene<RapierBackend, WgpuRenderer>;

/// Everything loaded from disk, kept so the scene can be rebuilt.
struct SceneSource {
    config: SceneConfig,
    world: GridWorld,
    assets: SceneAssets,
}

impl SceneSource {
    fn load(path: &Path) -> Result<Self> {
        let base = path.parent().unwrap_or(Path::new("."));
        let config = SceneConfig::load(path)?;
        let world = config
            .load_world(base)
            .with_context(|| format!("loading map {}", config.map.display()))?;
        let assets = SceneAssets::load(&config, base)?;
        Ok(Self {
            config,
            world,
            assets,
        })
    }

    fn build(&self, renderer: WgpuRenderer) -> Result<DriveScene> {
        Ok(Scene::build(
            self.world.clone(),
            &self.assets,
            &self.config,
            RapierBackend::new(self.config.gravity),
            renderer,
        )?)
    }
}

/// Application state.
struct AppState {
    source: SceneSource,
    scene: Option<DriveScene>,
    input: InputState,
    camera: ChaseCamera,
    clock: FixedTimestep,
    show_hud: bool,
    mouse_captured: bool,
    last_frame: Instant,
    fps: f32,
}

impl AppState {
    fn new(source: SceneSource) -> Self {
        let clock = FixedTimestep::new(source.config.timestep, 5);
        Self {
            source,
            scene: None,
            input: InputState::new(),
            camera: ChaseCamera::default(),
            clock,
            show_hud: true,
            mouse_captured: false,
            last_frame: Instant::now(),
            fps: 0.0,
        }
    }

    fn attach(&mut self, renderer: WgpuRenderer) {
        match self.source.build(renderer) {
            Ok(scene) => {
                if let Some(pose) = scene.vehicle_pose() {
                    self.camera.snap_to(pose.position, pose.yaw());
                }
                self.scene = Some(scene);
            }
            Err(e) => tracing::error!("failed to build scene: {e:#}"),
        }
    }

    /// Tear the scene down and rebuild it on the same renderer.
    fn reset(&mut self) {
        let Some(scene) = self.scene.take() else {
            return;
        };
        match scene.teardown() {
            Ok((_, renderer)) => {
                self.attach(renderer);
                tracing::info!("scene reset");
            }
            Err(e) => tracing::error!("failed to tear down scene: {e}"),
        }
    }

    fn update(&mut self, dt: f32) {
        if dt > 0.0 {
            self.fps = self.fps * 0.9 + (1.0 / dt) * 0.1;
        }
        let Some(scene) = &mut self.scene else {
            return;
        };
        let input = self.input.snapshot();
        for _ in 0..self.clock.advance(dt) {
            scene.frame(&input, self.clock.step());
        }
        if let Some(pose) = scene.vehicle_pose() {
            self.camera.follow(pose.position, pose.yaw(), dt);
        }
    }

    fn handle_key(&mut self, key: WinitKey, pressed: bool) {
        if let Some(code) = keys::to_key_code(key) {
            self.input.set(code, pressed);
        }
        if !pressed {
            return;
        }
        match key {
            WinitKey::F1 => self.show_hud = !self.show_hud,
            WinitKey::KeyR => self.reset(),
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }
        let Some(scene) = &self.scene else {
            egui::Window::new("tiledrive").show(ctx, |ui| {
                ui.label("No scene loaded. See the log for errors.");
            });
            return;
        };

        let summary = SceneInspector::summary(scene);
        let mut reset = false;
        egui::Window::new("tiledrive")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.label(format!("FPS: {:.0}", self.fps));
                ui.label(format!("Frame: {}", summary.frame));
                ui.label(format!(
                    "Map: {}x{}  obstacles: {}",
                    summary.map.width, summary.map.height, summary.map.obstacles
                ));
                ui.label(format!(
                    "Bodies: {}  ground shapes: {}  nodes: {}",
                    summary.bodies, summary.ground_shapes, summary.nodes
                ));
                ui.separator();
                match &summary.vehicle {
                    Some(vehicle) => {
                        let p = vehicle.position;
                        ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                        ui.label(format!("Heading: {:.1} deg", vehicle.heading_degrees));
                        match vehicle.cell {
                            Some(cell) => ui.label(format!("Cell: {cell}")),
                            None => ui.label("Cell: off map"),
                        };
                    }
                    None => {
                        ui.label("Vehicle: missing");
                    }
                }
                ui.separator();
                if ui.button("Reset (R)").clicked() {
                    reset = true;
                }
                ui.small("WASD: Drive | RMB: Orbit | Wheel: Zoom | F1: Toggle HUD");
            });
        if reset {
            self.reset();
        }
    }
}

struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("tiledrive")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("tiledrive_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            egui_winit,
            egui_renderer,
        })
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.25);
        self.state.last_frame = now;
        self.state.update(dt);

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Some(scene) = &mut self.state.scene {
            scene
                .render_mut()
                .render(&gpu.device, &gpu.queue, &view, &self.state.camera);
        }

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        let gpu = match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => gpu,
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
                event_loop.exit();
                return;
            }
        };

        self.state.camera.aspect = gpu.aspect();
        let renderer = WgpuRenderer::new(
            &gpu.device,
            gpu.config.format,
            gpu.config.width,
            gpu.config.height,
        );
        self.state.attach(renderer);
        self.gpu = Some(gpu);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    self.state.camera.aspect = gpu.aspect();
                    if let Some(scene) = &mut self.state.scene {
                        scene
                            .render_mut()
                            .resize(&gpu.device, gpu.config.width, gpu.config.height);
                    }
                }
            }
            WindowEvent::Focused(false) => {
                self.state.input.clear();
                self.state.mouse_captured = false;
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: btn_state,
                ..
            } => {
                self.state.mouse_captured = btn_state == ElementState::Pressed;
                if let Some(gpu) = &self.gpu {
                    gpu.window.set_cursor_visible(!self.state.mouse_captured);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
                };
                self.state.camera.zoom(amount);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.mouse_captured {
                self.state.camera.orbit(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("tiledrive-desktop starting");
    let source = SceneSource::load(&cli.scene)
        .with_context(|| format!("loading scene {}", cli.scene.display()))?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp {
        state: AppState::new(source),
        gpu: None,
        egui_ctx: EguiContext::default(),
    };
    event_loop.run_app(&mut app)?;

    Ok(())
}
