//! Device-parallel dispatch over wgpu.
//!
//! The zone kernel is ported to WGSL (`euler2d.wgsl`) and launched as one
//! invocation per interior zone on a 16x16 workgroup grid, with an
//! in-kernel bounds check against the mesh extent. The host side here
//! owns only what a single dispatch needs: staging copies of the field
//! arrays and a lazily-created device context shared by all calls.
//!
//! WGSL has no 64-bit floats, so the device backend computes in `f32`.
//! It is intended for exploratory throughput, not for runs that must
//! match the two CPU backends bitwise; those two are the reproducible
//! pair. If no adapter is available the dispatch functions quietly leave
//! their output untouched, mirroring how a build without the `gpu`
//! feature behaves.

use std::sync::OnceLock;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::eos::EquationOfState;
use crate::mesh::StructuredMesh;
use crate::patch::NUM_GUARD;
use crate::solver::AdvanceConfig;
use crate::source::{BufferZone, PointMass, SinkModel};
use crate::state::NCONS;

const SHADER: &str = include_str!("euler2d.wgsl");
const WORKGROUP: u32 = 16;

/// A wgpu device, queue, and the compiled kernel pipelines.
pub struct GpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    /// One layout serves all three kernels: the parameter block, the
    /// masses, two read-only field arrays, and the read-write output.
    /// The map kernels are bound with the primitive array in both input
    /// slots.
    layout: wgpu::BindGroupLayout,
    advance_rk: wgpu::ComputePipeline,
    primitive_to_conserved: wgpu::ComputePipeline,
    max_wavespeed: wgpu::ComputePipeline,
}

static CONTEXT: OnceLock<Option<GpuContext>> = OnceLock::new();

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl GpuContext {
    /// The process-wide context, created on first use. `None` when no
    /// adapter is available.
    pub fn get() -> Option<&'static GpuContext> {
        CONTEXT
            .get_or_init(|| match Self::new() {
                Ok(context) => Some(context),
                Err(error) => {
                    log::warn!("device-parallel mode unavailable: {}", error);
                    None
                }
            })
            .as_ref()
    }

    fn new() -> Result<Self, crate::error::Error> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| crate::error::Error::Device("no suitable adapter".to_owned()))?;

        let info = adapter.get_info();
        log::info!("device-parallel mode on {} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("fv-rs"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))
        .map_err(|e| crate::error::Error::Device(e.to_string()))?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("euler2d"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("euler2d"),
            entries: &[
                uniform_entry(0),
                storage_entry(1, true),
                storage_entry(2, true),
                storage_entry(3, true),
                storage_entry(4, false),
            ],
        });

        let pipeline = |entry: &str, layout: &wgpu::BindGroupLayout| {
            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(entry),
                bind_group_layouts: &[layout],
                push_constant_ranges: &[],
            });
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(entry),
                layout: Some(&pipeline_layout),
                module: &module,
                entry_point: entry,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            })
        };

        Ok(Self {
            advance_rk: pipeline("advance_rk", &layout),
            primitive_to_conserved: pipeline("primitive_to_conserved", &layout),
            max_wavespeed: pipeline("max_wavespeed", &layout),
            layout,
            device,
            queue,
        })
    }
}

/// The kernel parameter block, mirrored field-for-field in the shader.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Params {
    ni: i32,
    nj: i32,
    x0: f32,
    y0: f32,
    dx: f32,
    dy: f32,
    eos_type: u32,
    eos_value: f32,
    buffer_type: u32,
    num_masses: u32,
    sigma: f32,
    ring_pressure: f32,
    ring_mass: f32,
    damping_rate: f32,
    domain_radius: f32,
    ring_width: f32,
    alpha: f32,
    rk_weight: f32,
    dt: f32,
    velocity_ceiling: f32,
    cooling_coefficient: f32,
    density_floor: f32,
    pressure_floor: f32,
    pad: f32,
}

/// A point mass as the shader sees it.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct GpuPointMass {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    mass: f32,
    rate: f32,
    radius: f32,
    model: u32,
}

fn encode_masses(masses: &[PointMass]) -> Vec<GpuPointMass> {
    if masses.is_empty() {
        // Zero-sized bindings are not allowed; a zero-mass entry with the
        // count set to zero keeps the buffer non-empty and inert.
        return vec![GpuPointMass::zeroed()];
    }
    masses
        .iter()
        .map(|m| GpuPointMass {
            x: m.position.0 as f32,
            y: m.position.1 as f32,
            vx: m.velocity.0 as f32,
            vy: m.velocity.1 as f32,
            mass: m.mass as f32,
            rate: m.sink_rate as f32,
            radius: m.softening_radius as f32,
            model: match m.sink_model {
                SinkModel::Inactive => 0,
                SinkModel::AccelerationFree => 1,
                SinkModel::TorqueFree => 2,
                SinkModel::ForceFree => 3,
            },
        })
        .collect()
}

fn encode_params(
    mesh: &StructuredMesh,
    eos: &EquationOfState,
    buffer: &BufferZone,
    num_masses: usize,
    config: Option<&AdvanceConfig>,
) -> Params {
    let (x0, y0) = mesh.origin();
    let mut params = Params {
        ni: mesh.ni() as i32,
        nj: mesh.nj() as i32,
        x0: x0 as f32,
        y0: y0 as f32,
        dx: mesh.dx() as f32,
        dy: mesh.dy() as f32,
        num_masses: num_masses as u32,
        ..Params::zeroed()
    };
    match eos {
        EquationOfState::GammaLaw => params.eos_type = 0,
        EquationOfState::Isothermal {
            sound_speed_squared,
        } => {
            params.eos_type = 1;
            params.eos_value = *sound_speed_squared as f32;
        }
        EquationOfState::LocallyIsothermal {
            mach_number_squared,
        } => {
            params.eos_type = 2;
            params.eos_value = *mach_number_squared as f32;
        }
    }
    if let BufferZone::Keplerian(ring) = buffer {
        params.buffer_type = 1;
        params.sigma = ring.sigma as f32;
        params.ring_pressure = ring.pressure as f32;
        params.ring_mass = ring.mass as f32;
        params.damping_rate = ring.damping_rate as f32;
        params.domain_radius = ring.domain_radius as f32;
        params.ring_width = ring.ring_width as f32;
    }
    if let Some(config) = config {
        params.alpha = config.alpha as f32;
        params.rk_weight = config.rk_weight as f32;
        params.dt = config.dt as f32;
        params.velocity_ceiling = config.velocity_ceiling as f32;
        params.cooling_coefficient = config.cooling_coefficient as f32;
        params.density_floor = config.density_floor as f32;
        params.pressure_floor = config.pressure_floor as f32;
    }
    params
}

fn demote(data: &[f64]) -> Vec<f32> {
    data.iter().map(|&x| x as f32).collect()
}

/// Runs `pipeline` over the interior grid with the given bindings, then
/// reads the output buffer back to the host.
fn launch(
    context: &GpuContext,
    pipeline: &wgpu::ComputePipeline,
    layout: &wgpu::BindGroupLayout,
    params: &Params,
    masses: &[GpuPointMass],
    inputs: &[&[f32]],
    output_len: usize,
) -> Vec<f32> {
    let device = &context.device;

    let params_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("params"),
        contents: bytemuck::bytes_of(params),
        usage: wgpu::BufferUsages::UNIFORM,
    });
    let masses_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("masses"),
        contents: bytemuck::cast_slice(masses),
        usage: wgpu::BufferUsages::STORAGE,
    });
    let input_bufs: Vec<_> = inputs
        .iter()
        .map(|data| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("input"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::STORAGE,
            })
        })
        .collect();
    let output_buf = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("output"),
        size: (output_len * std::mem::size_of::<f32>()) as u64,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    });
    let staging_buf = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("staging"),
        size: output_buf.size(),
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut entries = vec![
        wgpu::BindGroupEntry {
            binding: 0,
            resource: params_buf.as_entire_binding(),
        },
        wgpu::BindGroupEntry {
            binding: 1,
            resource: masses_buf.as_entire_binding(),
        },
    ];
    for (n, buf) in input_bufs.iter().enumerate() {
        entries.push(wgpu::BindGroupEntry {
            binding: 2 + n as u32,
            resource: buf.as_entire_binding(),
        });
    }
    entries.push(wgpu::BindGroupEntry {
        binding: 2 + input_bufs.len() as u32,
        resource: output_buf.as_entire_binding(),
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: None,
        layout,
        entries: &entries,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor::default());
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(
            (params.nj as u32).div_ceil(WORKGROUP),
            (params.ni as u32).div_ceil(WORKGROUP),
            1,
        );
    }
    encoder.copy_buffer_to_buffer(&output_buf, 0, &staging_buf, 0, output_buf.size());
    context.queue.submit(Some(encoder.finish()));

    let slice = staging_buf.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).ok();
    });
    context.device.poll(wgpu::Maintain::Wait);
    rx.recv()
        .expect("map_async callback dropped")
        .expect("staging buffer map failed");
    let result = bytemuck::cast_slice::<u8, f32>(&slice.get_mapped_range()).to_vec();
    staging_buf.unmap();
    result
}

/// Device version of
/// [`compute_rk_substage_euler_2d`](crate::compute_rk_substage_euler_2d).
/// Writes the
/// interior zones of `primitive_wr`; a missing adapter is a no-op.
pub fn compute_rk_substage_device(
    mesh: &StructuredMesh,
    conserved_rk: &[f64],
    primitive_rd: &[f64],
    primitive_wr: &mut [f64],
    config: &AdvanceConfig,
) {
    let Some(context) = GpuContext::get() else {
        return;
    };
    let params = encode_params(mesh, &config.eos, &config.buffer, config.masses.len(), Some(config));
    let masses = encode_masses(config.masses);
    let out = launch(
        context,
        &context.advance_rk,
        &context.layout,
        &params,
        &masses,
        &[&demote(conserved_rk), &demote(primitive_rd)],
        primitive_wr.len(),
    );

    // Only interior zones are defined by the kernel; guard zones of the
    // output stay host-owned.
    let jump = (mesh.nj() + 2 * NUM_GUARD) * NCONS;
    for i in 0..mesh.ni() {
        let row = (i + NUM_GUARD) * jump + NUM_GUARD * NCONS;
        let len = mesh.nj() * NCONS;
        for (dst, src) in primitive_wr[row..row + len]
            .iter_mut()
            .zip(&out[row..row + len])
        {
            *dst = *src as f64;
        }
    }
}

/// Device version of
/// [`compute_conserved_euler_2d`](crate::compute_conserved_euler_2d). A
/// missing adapter is a no-op.
pub fn compute_conserved_device(
    mesh: &StructuredMesh,
    primitive: &[f64],
    conserved: &mut [f64],
) {
    let Some(context) = GpuContext::get() else {
        return;
    };
    let params = encode_params(mesh, &EquationOfState::GammaLaw, &BufferZone::None, 0, None);
    let masses = encode_masses(&[]);
    let prim = demote(primitive);
    let out = launch(
        context,
        &context.primitive_to_conserved,
        &context.layout,
        &params,
        &masses,
        &[&prim, &prim],
        conserved.len(),
    );
    for (dst, src) in conserved.iter_mut().zip(&out) {
        *dst = *src as f64;
    }
}

/// Device version of
/// [`compute_max_wavespeed_euler_2d`](crate::compute_max_wavespeed_euler_2d).
/// A missing adapter is a no-op.
pub fn compute_max_wavespeed_device(
    mesh: &StructuredMesh,
    primitive: &[f64],
    wavespeed: &mut [f64],
    eos: EquationOfState,
    masses: &[PointMass],
) {
    let Some(context) = GpuContext::get() else {
        return;
    };
    let params = encode_params(mesh, &eos, &BufferZone::None, masses.len(), None);
    let masses = encode_masses(masses);
    let prim = demote(primitive);
    let out = launch(
        context,
        &context.max_wavespeed,
        &context.layout,
        &params,
        &masses,
        &[&prim, &prim],
        wavespeed.len(),
    );
    for (dst, src) in wavespeed.iter_mut().zip(&out) {
        *dst = *src as f64;
    }
}
