// src/gfx/context.rs
//! GPU context for the backdrop.
//!
//! Owns the surface, device, queue, both render pipelines, and the
//! ping-pong pair of single-channel cell textures. The engine thread is the
//! only owner; nothing here is shared.

use wgpu::*;

use log::debug;

use crate::config::Config;
use crate::engine::grid::GridSize;
use crate::engine::inject::Patch;
use crate::error::BackdropError;

use super::shaders;
use super::uniforms::UniformBuffer;

const CELL_FORMAT: TextureFormat = TextureFormat::R8Unorm;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct StepParams {
    resolution: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct PaintParams {
    grid_size: [f32; 2],
    cell_params: [f32; 2],
    opacity: f32,
    _padding: f32,
}

/// The cell-state texture pair plus the bind groups that read each side.
///
/// `step_binds[i]` and `paint_binds[i]` read texture `i`; the step pass
/// renders into the other one. Rebuilt wholesale on every (re)seed.
struct CellTextures {
    textures: [Texture; 2],
    views: [TextureView; 2],
    step_binds: [BindGroup; 2],
    paint_binds: [BindGroup; 2],
    size: GridSize,
}

/// All GPU state owned by the engine thread.
pub struct GpuContext {
    surface: Surface<'static>,
    device: Device,
    queue: Queue,
    surface_config: SurfaceConfiguration,
    cell_layout: BindGroupLayout,
    sampler: Sampler,
    step_pipeline: RenderPipeline,
    paint_pipeline: RenderPipeline,
    step_params: UniformBuffer<StepParams>,
    paint_params: UniformBuffer<PaintParams>,
    cell_size: u32,
    cell_gap: u32,
    cells: Option<CellTextures>,
}

impl GpuContext {
    /// Bring up the full GPU stack on the given surface target.
    ///
    /// Any failure here is a fatal precondition for the backdrop: there is
    /// no software fallback.
    pub async fn new(
        target: SurfaceTarget<'static>,
        width: u32,
        height: u32,
        config: &Config,
    ) -> Result<GpuContext, BackdropError> {
        let instance = Instance::new(&InstanceDescriptor {
            backends: Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(target)?;

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Backdrop Device"),
                required_features: Features::default(),
                required_limits: Limits {
                    max_texture_dimension_2d: 4096,
                    ..Limits::downlevel_defaults()
                },
                memory_hints: MemoryHints::default(),
                trace: Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: PresentMode::AutoVsync,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        // Repeat addressing is what makes the grid toroidal: neighbor
        // lookups past an edge sample the opposite edge.
        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some("Cell Sampler"),
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            mipmap_filter: FilterMode::Nearest,
            ..Default::default()
        });

        // Both pipelines see the same bind group shape: the cell texture,
        // the shared sampler, and one uniform buffer.
        let cell_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Cell Bind Group Layout"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        multisampled: false,
                        view_dimension: TextureViewDimension::D2,
                        sample_type: TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 2,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Backdrop Pipeline Layout"),
            bind_group_layouts: &[&cell_layout],
            push_constant_ranges: &[],
        });

        let step_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            "Step",
            shaders::STEP_SHADER,
            CELL_FORMAT,
            None,
        );
        let paint_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            "Paint",
            shaders::PAINT_SHADER,
            format,
            Some(BlendState::ALPHA_BLENDING),
        );

        let step_params = UniformBuffer::new(&device);
        let paint_params = UniformBuffer::new(&device);

        debug!("backdrop GPU context ready, surface format {format:?}");

        Ok(GpuContext {
            surface,
            device,
            queue,
            surface_config,
            cell_layout,
            sampler,
            step_pipeline,
            paint_pipeline,
            step_params,
            paint_params,
            cell_size: config.cell_size,
            cell_gap: config.cell_gap,
            cells: None,
        })
    }

    /// Reconfigure the surface for new window dimensions.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Replace the texture pair with freshly seeded contents. Destroys
    /// whatever state the previous grid held.
    pub fn rebuild_grid(&mut self, size: GridSize, seed_cells: &[u8]) {
        debug_assert_eq!(seed_cells.len(), size.cell_count());

        let extent = Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        };
        let make_texture = |label: &str| {
            self.device.create_texture(&TextureDescriptor {
                label: Some(label),
                size: extent,
                mip_level_count: 1,
                sample_count: 1,
                dimension: TextureDimension::D2,
                format: CELL_FORMAT,
                usage: TextureUsages::RENDER_ATTACHMENT
                    | TextureUsages::TEXTURE_BINDING
                    | TextureUsages::COPY_DST,
                view_formats: &[],
            })
        };
        let textures = [make_texture("Cell Texture A"), make_texture("Cell Texture B")];
        let views = [
            textures[0].create_view(&TextureViewDescriptor::default()),
            textures[1].create_view(&TextureViewDescriptor::default()),
        ];

        // Seed goes into texture A; B starts zeroed and is the first step
        // target.
        self.queue.write_texture(
            textures[0].as_image_copy(),
            seed_cells,
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size.width),
                rows_per_image: Some(size.height),
            },
            extent,
        );

        let step_binds = [
            create_cell_bind_group(
                &self.device,
                &self.cell_layout,
                "Step Bind Group A",
                &views[0],
                &self.sampler,
                self.step_params.binding_resource(),
            ),
            create_cell_bind_group(
                &self.device,
                &self.cell_layout,
                "Step Bind Group B",
                &views[1],
                &self.sampler,
                self.step_params.binding_resource(),
            ),
        ];
        let paint_binds = [
            create_cell_bind_group(
                &self.device,
                &self.cell_layout,
                "Paint Bind Group A",
                &views[0],
                &self.sampler,
                self.paint_params.binding_resource(),
            ),
            create_cell_bind_group(
                &self.device,
                &self.cell_layout,
                "Paint Bind Group B",
                &views[1],
                &self.sampler,
                self.paint_params.binding_resource(),
            ),
        ];

        self.step_params.update_content(
            &self.queue,
            StepParams {
                resolution: [size.width as f32, size.height as f32],
            },
        );

        self.cells = Some(CellTextures {
            textures,
            views,
            step_binds,
            paint_binds,
            size,
        });
    }

    /// Stamp a patch of cell bytes into the current texture. Takes effect
    /// on the next paint and the following step.
    pub fn write_patch(&mut self, current: usize, patch: &Patch) {
        let Some(cells) = &self.cells else { return };
        if patch.width == 0 || patch.height == 0 {
            return;
        }

        self.queue.write_texture(
            TexelCopyTextureInfo {
                texture: &cells.textures[current],
                mip_level: 0,
                origin: Origin3d {
                    x: patch.x,
                    y: patch.y,
                    z: 0,
                },
                aspect: TextureAspect::All,
            },
            &patch.cells,
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(patch.width),
                rows_per_image: Some(patch.height),
            },
            Extent3d {
                width: patch.width,
                height: patch.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Run one compute pass: read the current texture, render the next
    /// generation into the other one. The caller swaps its index afterwards.
    pub fn step(&mut self, current: usize) {
        let Some(cells) = &self.cells else { return };
        let next = 1 - current;

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Step Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Step Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &cells.views[next],
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color::BLACK),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.step_pipeline);
            pass.set_bind_group(0, &cells.step_binds[current], &[]);
            pass.draw(0..3, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Draw the current cell state to the surface at the given opacity.
    ///
    /// A lost or outdated surface reconfigures and skips the frame; that is
    /// routine during window resizes, not an error worth surfacing.
    pub fn paint(&mut self, current: usize, opacity: f32) -> Result<(), BackdropError> {
        let Some(cells) = &self.cells else {
            return Ok(());
        };

        self.paint_params.update_content(
            &self.queue,
            PaintParams {
                grid_size: [cells.size.width as f32, cells.size.height as f32],
                cell_params: [self.cell_size as f32, self.cell_gap as f32],
                opacity,
                _padding: 0.0,
            },
        );

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let view = frame.texture.create_view(&TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Paint Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Paint Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color::TRANSPARENT),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.paint_pipeline);
            pass.set_bind_group(0, &cells.paint_binds[current], &[]);
            pass.draw(0..3, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn create_cell_bind_group(
    device: &Device,
    layout: &BindGroupLayout,
    label: &str,
    view: &TextureView,
    sampler: &Sampler,
    params: BindingResource,
) -> BindGroup {
    device.create_bind_group(&BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            BindGroupEntry {
                binding: 0,
                resource: BindingResource::TextureView(view),
            },
            BindGroupEntry {
                binding: 1,
                resource: BindingResource::Sampler(sampler),
            },
            BindGroupEntry {
                binding: 2,
                resource: params,
            },
        ],
    })
}

fn create_pipeline(
    device: &Device,
    layout: &PipelineLayout,
    name: &str,
    source: &str,
    target_format: TextureFormat,
    blend: Option<BlendState>,
) -> RenderPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some(&format!("{name} Shader")),
        source: ShaderSource::Wgsl(source.into()),
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(&format!("{name} Pipeline")),
        layout: Some(layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: target_format,
                blend,
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}
