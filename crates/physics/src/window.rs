//! # Window renderer
//!
//! Draws the world into a `winit` window with a single `wgpu` full-screen
//! pass. Every body is uploaded as a [`ShapeInstance`] and the fragment
//! shader shades its signed distance, so circles and rotated rectangles
//! come out anti-aliased without any meshes.
//!
//! The event loop is pumped once per frame instead of being handed control,
//! which lets the caller keep driving the simulation. `winit` allows one
//! event loop per process, so the window is shared by every
//! [`Environment`](crate::Environment) on the thread through [`draw`].

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowBuilder};

use crate::body::Shape;
use crate::error::PhysicsError;
use crate::simulator::Simulator;
use crate::world::{World, MAX_BODIES};

const TITLE: &str = "Fulcrum";
const DEFAULT_VIEW: [f32; 4] = [0.0, 0.0, 1920.0, 1080.0];

/// GPU layout of one body, matching `Shape` in `window.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ShapeInstance {
    pub center: [f32; 2],
    pub half_extents: [f32; 2],
    pub color: [f32; 4],
    pub axis: [f32; 2],
    /// `0` circle, `1` rect.
    pub kind: u32,
    _pad: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct FrameUniform {
    view: [f32; 4],
    resolution: [f32; 2],
    count: u32,
    _pad: u32,
}

/// Shapes in draw order. Later bodies are painted over earlier ones.
#[must_use]
pub fn shape_instances(world: &World) -> Vec<ShapeInstance> {
    world
        .bodies
        .iter()
        .take(MAX_BODIES)
        .map(|body| {
            let (kind, half_extents) = match body.shape {
                Shape::Circle { radius } => (0, [radius, radius]),
                Shape::Rect { width, height } => (1, [width * 0.5, height * 0.5]),
            };
            ShapeInstance {
                center: body.position.to_array(),
                half_extents,
                color: body.color.map(|c| f32::from(c) / 255.0),
                axis: body.axis().to_array(),
                kind,
                _pad: 0,
            }
        })
        .collect()
}

/// World rectangle shown in the window: the scene bounds, or a 1920x1080
/// canvas when the scene has none.
#[must_use]
pub fn view_rect(world: &World) -> [f32; 4] {
    world
        .bounds
        .map_or(DEFAULT_VIEW, |b| [b.left, b.top, b.right, b.bottom])
}

pub struct WindowRenderer {
    event_loop: EventLoop<()>,
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    shapes_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    open: bool,
}

fn window_error(e: impl std::fmt::Display) -> PhysicsError {
    PhysicsError::Window(e.to_string())
}

impl WindowRenderer {
    /// Opens the window and builds the pipeline.
    ///
    /// # Errors
    ///
    /// Fails without a display, a GPU adapter or a second event loop.
    #[allow(clippy::too_many_lines)]
    pub fn new(title: &str) -> Result<Self, PhysicsError> {
        let event_loop = EventLoop::new().map_err(window_error)?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(title)
                .with_inner_size(LogicalSize::new(1280.0, 720.0))
                .build(&event_loop)
                .map_err(window_error)?,
        );

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(window_error)?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| window_error("no compatible GPU adapter"))?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("fulcrum device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
            },
            None,
        ))
        .map_err(window_error)?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .first()
            .copied()
            .ok_or_else(|| window_error("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame"),
            contents: bytemuck::bytes_of(&FrameUniform::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let shapes_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shapes"),
            size: (MAX_BODIES * std::mem::size_of::<ShapeInstance>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("fulcrum bind layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("fulcrum bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: shapes_buffer.as_entire_binding(),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fulcrum shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("window.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fulcrum pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("fulcrum pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        tracing::info!(width = config.width, height = config.height, "opened render window");
        Ok(Self {
            event_loop,
            window,
            surface,
            device,
            queue,
            config,
            pipeline,
            frame_buffer,
            shapes_buffer,
            bind_group,
            open: true,
        })
    }

    /// Handles pending window events, then draws the simulator's world.
    /// Returns whether the window is still open; a closed window draws
    /// nothing.
    ///
    /// # Errors
    ///
    /// Fails if a frame cannot be acquired from the surface.
    pub fn draw(&mut self, sim: &Simulator) -> Result<bool, PhysicsError> {
        if !self.open {
            return Ok(false);
        }

        let mut closed = false;
        let mut resized = None;
        let status = self.event_loop.pump_events(Some(Duration::ZERO), |event, elwt| {
            if let Event::WindowEvent { event, .. } = event {
                match event {
                    WindowEvent::CloseRequested => {
                        closed = true;
                        elwt.exit();
                    }
                    WindowEvent::Resized(size) => resized = Some(size),
                    _ => {}
                }
            }
        });
        if closed || matches!(status, PumpStatus::Exit(_)) {
            tracing::info!("render window closed");
            self.open = false;
            return Ok(false);
        }
        if let Some(size) = resized.filter(|s| s.width > 0 && s.height > 0) {
            self.config.width = size.width;
            self.config.height = size.height;
            self.surface.configure(&self.device, &self.config);
        }

        let world = sim.world();
        let shapes = shape_instances(world);
        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        let frame = FrameUniform {
            view: view_rect(world),
            resolution: [self.config.width as f32, self.config.height as f32],
            count: shapes.len() as u32,
            _pad: 0,
        };
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));
        if !shapes.is_empty() {
            self.queue
                .write_buffer(&self.shapes_buffer, 0, bytemuck::cast_slice(&shapes));
        }

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(true);
            }
            Err(e) => return Err(window_error(e)),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("frame") });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        Ok(true)
    }
}

thread_local! {
    static WINDOW: RefCell<Option<WindowRenderer>> = const { RefCell::new(None) };
}

/// Draws `sim` into the thread's window, opening it on first use.
///
/// # Errors
///
/// Fails if the window cannot be opened or a frame cannot be drawn.
pub fn draw(sim: &Simulator) -> Result<bool, PhysicsError> {
    WINDOW.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(WindowRenderer::new(TITLE)?);
        }
        match slot.as_mut() {
            Some(renderer) => renderer.draw(sim),
            None => Ok(false),
        }
    })
}
