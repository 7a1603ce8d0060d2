//! Public solver operations and execution-mode dispatch.
//!
//! Three operations are exposed to the driver, each running over the
//! interior index space `[0, ni) x [0, nj)` of a mesh patch:
//!
//! - [`compute_conserved_euler_2d`]: fills a conserved array from a
//!   guarded primitive array
//! - [`compute_rk_substage_euler_2d`]: advances a guarded primitive array
//!   through one Runge-Kutta substage (see [`AdvanceConfig`])
//! - [`compute_max_wavespeed_euler_2d`]: fills a one-field array with
//!   each zone's largest signal speed, for the driver's CFL reduction
//!
//! Each operation takes an [`ExecutionMode`] selecting how the interior is
//! swept. The zone math is identical in every mode; the serial and
//! thread-parallel backends produce bitwise-identical output. A mode the
//! crate was not built with leaves the output untouched; the driver is
//! expected to request only modes it has compiled in.
//!
//! Within one substage the read and write primitive arrays must be
//! distinct (double buffering); no other ordering exists between zones.

use std::str::FromStr;

use crate::eos::EquationOfState;
use crate::error::Error;
use crate::mesh::StructuredMesh;
use crate::patch::{Patch, PatchMut, NUM_GUARD};
use crate::source::{BufferZone, PointMass};
use crate::state::NCONS;

#[cfg(feature = "gpu")]
pub mod gpu;
pub mod zone;

use zone::{advance_rk_zone, advance_rk_zone_inviscid, primitive_to_conserved_zone, wavespeed_zone};

/// How an operation sweeps the interior zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One thread, row-major order
    Serial,
    /// Interior rows partitioned across the rayon thread pool
    /// (`feature = "parallel"`)
    ThreadParallel,
    /// One device task per interior zone (`feature = "gpu"`)
    DeviceParallel,
}

impl FromStr for ExecutionMode {
    type Err = Error;

    /// Parse an execution-mode name. Matching is case-insensitive on the
    /// hyphenated variant names.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "serial" => Ok(Self::Serial),
            "thread-parallel" => Ok(Self::ThreadParallel),
            "device-parallel" => Ok(Self::DeviceParallel),
            _ => Err(Error::UnrecognizedName {
                kind: "execution mode",
                value: name.to_owned(),
            }),
        }
    }
}

/// Everything one Runge-Kutta substage needs besides the field arrays.
///
/// # Example
///
/// ```
/// use fv_rs::{AdvanceConfig, EquationOfState, PointMass, SinkModel};
///
/// let masses = [PointMass {
///     mass: 1.0,
///     sink_rate: 10.0,
///     sink_model: SinkModel::TorqueFree,
///     ..PointMass::default()
/// }];
/// let config = AdvanceConfig::new(EquationOfState::GammaLaw)
///     .with_masses(&masses)
///     .with_alpha(0.1)
///     .with_dt(1e-4)
///     .with_rk_weight(0.5);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct AdvanceConfig<'a> {
    /// The equation of state
    pub eos: EquationOfState,
    /// The wave-damping region, if any
    pub buffer: BufferZone,
    /// The gravitating point masses, in a fixed order
    pub masses: &'a [PointMass],
    /// The alpha-viscosity parameter; zero selects the inviscid fast path
    pub alpha: f64,
    /// The Runge-Kutta averaging weight `a` in
    /// `U <- (1 - a) U + a U_rk`; zero is a plain forward-Euler substage
    pub rk_weight: f64,
    /// The timestep of this substage
    pub dt: f64,
    /// Velocity magnitude ceiling per component
    pub velocity_ceiling: f64,
    /// Beta-cooling coefficient; zero disables cooling
    pub cooling_coefficient: f64,
    /// Density floor
    pub density_floor: f64,
    /// Pressure floor
    pub pressure_floor: f64,
}

impl<'a> AdvanceConfig<'a> {
    /// A substage configuration with no masses, no buffer, no viscosity,
    /// no cooling, and permissive floors.
    pub fn new(eos: EquationOfState) -> Self {
        Self {
            eos,
            buffer: BufferZone::None,
            masses: &[],
            alpha: 0.0,
            rk_weight: 0.0,
            dt: 0.0,
            velocity_ceiling: 1e16,
            cooling_coefficient: 0.0,
            density_floor: 1e-10,
            pressure_floor: 1e-10,
        }
    }

    /// Set the wave-damping region.
    pub fn with_buffer(mut self, buffer: BufferZone) -> Self {
        self.buffer = buffer;
        self
    }

    /// Set the point-mass list.
    pub fn with_masses(mut self, masses: &'a [PointMass]) -> Self {
        self.masses = masses;
        self
    }

    /// Set the alpha-viscosity parameter.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the Runge-Kutta averaging weight.
    pub fn with_rk_weight(mut self, rk_weight: f64) -> Self {
        self.rk_weight = rk_weight;
        self
    }

    /// Set the substage timestep.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set the per-component velocity ceiling.
    pub fn with_velocity_ceiling(mut self, velocity_ceiling: f64) -> Self {
        self.velocity_ceiling = velocity_ceiling;
        self
    }

    /// Set the beta-cooling coefficient.
    pub fn with_cooling_coefficient(mut self, cooling_coefficient: f64) -> Self {
        self.cooling_coefficient = cooling_coefficient;
        self
    }

    /// Set the density and pressure floors.
    pub fn with_floors(mut self, density_floor: f64, pressure_floor: f64) -> Self {
        self.density_floor = density_floor;
        self.pressure_floor = pressure_floor;
        self
    }
}

/// Converts a guarded primitive array to an interior-only conserved array.
///
/// `primitive` has extent `(ni + 4, nj + 4, 4)` with two guard layers;
/// `conserved` has extent `(ni, nj, 4)`.
pub fn compute_conserved_euler_2d(
    mesh: &StructuredMesh,
    primitive: &[f64],
    conserved: &mut [f64],
    mode: ExecutionMode,
) {
    let prim = Patch::from_slice(mesh, NCONS, NUM_GUARD, primitive);
    let (ni, nj) = (mesh.ni() as i64, mesh.nj() as i64);

    match mode {
        ExecutionMode::Serial => {
            let mut cons = PatchMut::from_slice(mesh, NCONS, 0, conserved);
            for i in 0..ni {
                for j in 0..nj {
                    let u = primitive_to_conserved_zone(&prim, i, j);
                    cons.set(i, j, &u.to_array());
                }
            }
        }

        ExecutionMode::ThreadParallel => {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                let row = NCONS * mesh.nj();
                conserved.par_chunks_mut(row).enumerate().for_each(|(r, out)| {
                    let i = r as i64;
                    let mut out = PatchMut::with_extent([i, 0], [1, nj], NCONS, out);
                    for j in 0..nj {
                        let u = primitive_to_conserved_zone(&prim, i, j);
                        out.set(i, j, &u.to_array());
                    }
                });
            }
        }

        ExecutionMode::DeviceParallel => {
            #[cfg(feature = "gpu")]
            gpu::compute_conserved_device(mesh, primitive, conserved);
        }
    }
}

/// Advances a guarded primitive array through one Runge-Kutta substage.
///
/// `conserved_rk` is the interior-only substage anchor, `primitive_rd` the
/// guarded input, and `primitive_wr` the guarded output; the two primitive
/// arrays must be distinct buffers. Guard zones of the output are left
/// untouched. The inviscid fast path is taken when `config.alpha == 0`.
pub fn compute_rk_substage_euler_2d(
    mesh: &StructuredMesh,
    conserved_rk: &[f64],
    primitive_rd: &[f64],
    primitive_wr: &mut [f64],
    config: &AdvanceConfig,
    mode: ExecutionMode,
) {
    let cons = Patch::from_slice(mesh, NCONS, 0, conserved_rk);
    let prim = Patch::from_slice(mesh, NCONS, NUM_GUARD, primitive_rd);
    let (ni, nj) = (mesh.ni() as i64, mesh.nj() as i64);

    match mode {
        ExecutionMode::Serial => {
            let mut out = PatchMut::from_slice(mesh, NCONS, NUM_GUARD, primitive_wr);
            if config.alpha == 0.0 {
                for i in 0..ni {
                    for j in 0..nj {
                        let p = advance_rk_zone_inviscid(mesh, &cons, &prim, config, i, j);
                        out.set(i, j, &p.to_array());
                    }
                }
            } else {
                for i in 0..ni {
                    for j in 0..nj {
                        let p = advance_rk_zone(mesh, &cons, &prim, config, i, j);
                        out.set(i, j, &p.to_array());
                    }
                }
            }
        }

        ExecutionMode::ThreadParallel => {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                let ng = NUM_GUARD as i64;
                let row = NCONS * (mesh.nj() + 2 * NUM_GUARD);
                primitive_wr
                    .par_chunks_mut(row)
                    .enumerate()
                    .skip(NUM_GUARD)
                    .take(mesh.ni())
                    .for_each(|(r, out)| {
                        let i = r as i64 - ng;
                        let mut out =
                            PatchMut::with_extent([i, -ng], [1, nj + 2 * ng], NCONS, out);
                        if config.alpha == 0.0 {
                            for j in 0..nj {
                                let p = advance_rk_zone_inviscid(mesh, &cons, &prim, config, i, j);
                                out.set(i, j, &p.to_array());
                            }
                        } else {
                            for j in 0..nj {
                                let p = advance_rk_zone(mesh, &cons, &prim, config, i, j);
                                out.set(i, j, &p.to_array());
                            }
                        }
                    });
            }
        }

        ExecutionMode::DeviceParallel => {
            #[cfg(feature = "gpu")]
            gpu::compute_rk_substage_device(mesh, conserved_rk, primitive_rd, primitive_wr, config);
        }
    }
}

/// Fills a one-field interior array with each zone's largest signal
/// speed, `max(|vx| + cs, |vy| + cs)`.
pub fn compute_max_wavespeed_euler_2d(
    mesh: &StructuredMesh,
    primitive: &[f64],
    wavespeed: &mut [f64],
    eos: EquationOfState,
    masses: &[PointMass],
    mode: ExecutionMode,
) {
    let prim = Patch::from_slice(mesh, NCONS, NUM_GUARD, primitive);
    let (ni, nj) = (mesh.ni() as i64, mesh.nj() as i64);

    match mode {
        ExecutionMode::Serial => {
            let mut out = PatchMut::from_slice(mesh, 1, 0, wavespeed);
            for i in 0..ni {
                for j in 0..nj {
                    let a = wavespeed_zone(&eos, masses, mesh, &prim, i, j);
                    out.set(i, j, &[a]);
                }
            }
        }

        ExecutionMode::ThreadParallel => {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                let row = mesh.nj();
                wavespeed.par_chunks_mut(row).enumerate().for_each(|(r, out)| {
                    let i = r as i64;
                    let mut out = PatchMut::with_extent([i, 0], [1, nj], 1, out);
                    for j in 0..nj {
                        let a = wavespeed_zone(&eos, masses, mesh, &prim, i, j);
                        out.set(i, j, &[a]);
                    }
                });
            }
        }

        ExecutionMode::DeviceParallel => {
            #[cfg(feature = "gpu")]
            gpu::compute_max_wavespeed_device(mesh, primitive, wavespeed, eos, masses);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SinkModel;
    use crate::state::{Primitive, GAMMA_LAW_INDEX};

    fn uniform_primitive(mesh: &StructuredMesh, p: Primitive) -> Vec<f64> {
        let n = (mesh.ni() + 2 * NUM_GUARD) * (mesh.nj() + 2 * NUM_GUARD) * NCONS;
        let mut data = vec![0.0; n];
        for zone in data.chunks_mut(NCONS) {
            zone.copy_from_slice(&p.to_array());
        }
        data
    }

    #[test]
    fn test_uniform_state_is_a_fixed_point() {
        let mesh = StructuredMesh::square(1.0, 8);
        let state = Primitive::new(1.0, 0.2, -0.1, 1.0);
        let prim = uniform_primitive(&mesh, state);
        let mut cons = vec![0.0; mesh.total_zones() * NCONS];
        compute_conserved_euler_2d(&mesh, &prim, &mut cons, ExecutionMode::Serial);

        let config = AdvanceConfig::new(EquationOfState::GammaLaw).with_dt(1e-2);
        let mut out = prim.clone();
        compute_rk_substage_euler_2d(&mesh, &cons, &prim, &mut out, &config, ExecutionMode::Serial);

        for (a, b) in out.chunks(NCONS).zip(prim.chunks(NCONS)) {
            for q in 0..NCONS {
                assert!(
                    (a[q] - b[q]).abs() < 1e-14,
                    "uniform state drifted: {} -> {}",
                    b[q],
                    a[q]
                );
            }
        }
    }

    #[test]
    fn test_viscosity_is_inert_on_a_uniform_state() {
        // With a point mass present the disk height, and with it nu, is
        // finite; a uniform state has zero strain everywhere, so the
        // viscous path must reproduce the inviscid path exactly.
        let mesh = StructuredMesh::square(1.0, 8);
        let masses = [PointMass {
            mass: 1.0,
            ..PointMass::default()
        }];
        let state = Primitive::new(1.0, 0.1, 0.0, 1.0);
        let prim = uniform_primitive(&mesh, state);
        let mut cons = vec![0.0; mesh.total_zones() * NCONS];
        compute_conserved_euler_2d(&mesh, &prim, &mut cons, ExecutionMode::Serial);

        let inviscid = AdvanceConfig::new(EquationOfState::GammaLaw)
            .with_masses(&masses)
            .with_dt(1e-3);
        let viscous = inviscid.with_alpha(0.1);

        let mut out_a = prim.clone();
        let mut out_b = prim.clone();
        compute_rk_substage_euler_2d(&mesh, &cons, &prim, &mut out_a, &inviscid, ExecutionMode::Serial);
        compute_rk_substage_euler_2d(&mesh, &cons, &prim, &mut out_b, &viscous, ExecutionMode::Serial);
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn test_wavespeed_of_a_uniform_state() {
        let mesh = StructuredMesh::square(1.0, 4);
        let state = Primitive::new(1.0, 0.3, -0.4, 1.0);
        let prim = uniform_primitive(&mesh, state);
        let mut a = vec![0.0; mesh.total_zones()];
        compute_max_wavespeed_euler_2d(
            &mesh,
            &prim,
            &mut a,
            EquationOfState::GammaLaw,
            &[],
            ExecutionMode::Serial,
        );
        let cs = (GAMMA_LAW_INDEX * 1.0 / 1.0).sqrt();
        let expected = state.max_wavespeed(GAMMA_LAW_INDEX);
        assert!(a.iter().all(|&x| x == expected));
        assert!((expected - (0.4 + cs)).abs() < 1e-15);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_serial_bitwise() {
        let mesh = StructuredMesh::square(1.0, 12);
        let n = (mesh.ni() + 2 * NUM_GUARD) * (mesh.nj() + 2 * NUM_GUARD) * NCONS;
        let mut prim = vec![0.0; n];
        for (z, zone) in prim.chunks_mut(NCONS).enumerate() {
            let s = z as f64 * 0.1;
            zone.copy_from_slice(&[1.0 + 0.3 * s.sin(), 0.2 * s.cos(), -0.1 * s.sin(), 1.0]);
        }
        let mut cons = vec![0.0; mesh.total_zones() * NCONS];
        compute_conserved_euler_2d(&mesh, &prim, &mut cons, ExecutionMode::Serial);

        let masses = [PointMass {
            mass: 0.5,
            sink_rate: 5.0,
            sink_model: SinkModel::AccelerationFree,
            ..PointMass::default()
        }];
        let config = AdvanceConfig::new(EquationOfState::GammaLaw)
            .with_masses(&masses)
            .with_alpha(0.05)
            .with_dt(1e-4)
            .with_rk_weight(0.5)
            .with_cooling_coefficient(0.2);

        let mut out_serial = prim.clone();
        let mut out_threads = prim.clone();
        compute_rk_substage_euler_2d(
            &mesh,
            &cons,
            &prim,
            &mut out_serial,
            &config,
            ExecutionMode::Serial,
        );
        compute_rk_substage_euler_2d(
            &mesh,
            &cons,
            &prim,
            &mut out_threads,
            &config,
            ExecutionMode::ThreadParallel,
        );
        assert_eq!(out_serial, out_threads);

        let mut cons_serial = cons.clone();
        let mut cons_threads = cons.clone();
        compute_conserved_euler_2d(&mesh, &prim, &mut cons_serial, ExecutionMode::Serial);
        compute_conserved_euler_2d(&mesh, &prim, &mut cons_threads, ExecutionMode::ThreadParallel);
        assert_eq!(cons_serial, cons_threads);

        let mut a_serial = vec![0.0; mesh.total_zones()];
        let mut a_threads = vec![0.0; mesh.total_zones()];
        compute_max_wavespeed_euler_2d(
            &mesh,
            &prim,
            &mut a_serial,
            EquationOfState::GammaLaw,
            &masses,
            ExecutionMode::Serial,
        );
        compute_max_wavespeed_euler_2d(
            &mesh,
            &prim,
            &mut a_threads,
            EquationOfState::GammaLaw,
            &masses,
            ExecutionMode::ThreadParallel,
        );
        assert_eq!(a_serial, a_threads);
    }

    #[test]
    fn test_execution_mode_from_str() {
        assert_eq!("serial".parse::<ExecutionMode>().unwrap(), ExecutionMode::Serial);
        assert_eq!(
            "thread-parallel".parse::<ExecutionMode>().unwrap(),
            ExecutionMode::ThreadParallel
        );
        assert_eq!(
            "Device-Parallel".parse::<ExecutionMode>().unwrap(),
            ExecutionMode::DeviceParallel
        );
        assert!("quantum".parse::<ExecutionMode>().is_err());
    }
}
