//! The per-zone update kernel.
//!
//! Everything here is a pure function of one zone's stencil: the kernel
//! reads the primitive neighborhood, assembles reconstruction, fluxes,
//! and sources, and returns the updated state. How zones are iterated,
//! and where the result is stored, is the business of the dispatch layer
//! in the parent module. Keeping the kernel free of iteration and layout
//! concerns is what lets the same math run serially, across threads, and
//! on a device.

use crate::flux::{hlle_flux, shear_strain, viscous_face_correction};
use crate::limiter::plm_gradient;
use crate::mesh::StructuredMesh;
use crate::patch::Patch;
use crate::solver::AdvanceConfig;
use crate::source::buffer::buffer_source_term;
use crate::source::cooling::cooling_term;
use crate::source::gravity::{disk_height, point_masses_source_term};
use crate::source::PointMass;
use crate::state::{Conserved, Direction, Primitive};

/// Converts the primitive state of zone `(i, j)` to conserved variables.
#[inline]
pub fn primitive_to_conserved_zone(primitive: &Patch, i: i64, j: i64) -> Conserved {
    Primitive::from_slice(primitive.get(i, j)).to_conserved()
}

/// The largest signal speed in zone `(i, j)`.
#[inline]
pub fn wavespeed_zone(
    eos: &crate::eos::EquationOfState,
    masses: &[PointMass],
    mesh: &StructuredMesh,
    primitive: &Patch,
    i: i64,
    j: i64,
) -> f64 {
    let (xc, yc) = mesh.cell_center(i, j);
    let pc = Primitive::from_slice(primitive.get(i, j));
    let cs2 = eos.sound_speed_squared(&pc, masses, xc, yc);
    pc.max_wavespeed(cs2)
}

// ---------------------------------------------------------------------------
//                  tj
//
//       +-------+-------+-------+
//       |       |       |       |
//       |  lr   |  rj   |  rr   |
//       |       |       |       |
//       +-------+-------+-------+
//       |       |       |       |
//   ki  |  li  -|+  cc -|+  ri  |  ti
//       |       |       |       |
//       +-------+-------+-------+
//       |       |       |       |
//       |  ll   |  lj   |  rl   |
//       |       |       |       |
//       +-------+-------+-------+
//
//                  kj
// ---------------------------------------------------------------------------

/// Advances zone `(i, j)` through one Runge-Kutta substage, including the
/// alpha-viscosity stress, and returns its updated primitive state.
///
/// The face sound speeds are evaluated from the far neighbor zone of each
/// face (the left neighbor for the left face, and so on); the two zones
/// sharing a face therefore see it with slightly different sound speeds
/// when the sound speed varies in space. The viscosity coefficient is
/// evaluated once at the zone center and reused on all four faces.
pub fn advance_rk_zone(
    mesh: &StructuredMesh,
    conserved_rk: &Patch,
    primitive_rd: &Patch,
    config: &AdvanceConfig,
    i: i64,
    j: i64,
) -> Primitive {
    let dx = mesh.dx();
    let dy = mesh.dy();
    let (xc, yc) = mesh.cell_center(i, j);
    let masses = config.masses;

    let un = Conserved::from_slice(conserved_rk.get(i, j));
    let pcc = Primitive::from_slice(primitive_rd.get(i, j));
    let pli = Primitive::from_slice(primitive_rd.get(i - 1, j));
    let pri = Primitive::from_slice(primitive_rd.get(i + 1, j));
    let plj = Primitive::from_slice(primitive_rd.get(i, j - 1));
    let prj = Primitive::from_slice(primitive_rd.get(i, j + 1));
    let pki = Primitive::from_slice(primitive_rd.get(i - 2, j));
    let pti = Primitive::from_slice(primitive_rd.get(i + 2, j));
    let pkj = Primitive::from_slice(primitive_rd.get(i, j - 2));
    let ptj = Primitive::from_slice(primitive_rd.get(i, j + 2));
    let pll = Primitive::from_slice(primitive_rd.get(i - 1, j - 1));
    let plr = Primitive::from_slice(primitive_rd.get(i - 1, j + 1));
    let prl = Primitive::from_slice(primitive_rd.get(i + 1, j - 1));
    let prr = Primitive::from_slice(primitive_rd.get(i + 1, j + 1));

    let gxli = plm_gradient(&pki, &pli, &pcc);
    let gxcc = plm_gradient(&pli, &pcc, &pri);
    let gxri = plm_gradient(&pcc, &pri, &pti);
    let gylj = plm_gradient(&pkj, &plj, &pcc);
    let gycc = plm_gradient(&plj, &pcc, &prj);
    let gyrj = plm_gradient(&pcc, &prj, &ptj);
    let gyli = plm_gradient(&pll, &pli, &plr);
    let gyri = plm_gradient(&prl, &pri, &prr);
    let gxlj = plm_gradient(&pll, &plj, &prl);
    let gxrj = plm_gradient(&plr, &prj, &prr);

    let plim = pli + gxli * 0.5;
    let plip = pcc - gxcc * 0.5;
    let prim = pcc + gxcc * 0.5;
    let prip = pri - gxri * 0.5;
    let pljm = plj + gylj * 0.5;
    let pljp = pcc - gycc * 0.5;
    let prjm = pcc + gycc * 0.5;
    let prjp = prj - gyrj * 0.5;

    let (xli, yli) = mesh.cell_center(i - 1, j);
    let (xri, yri) = mesh.cell_center(i + 1, j);
    let (xlj, ylj) = mesh.cell_center(i, j - 1);
    let (xrj, yrj) = mesh.cell_center(i, j + 1);
    let cs2li = config.eos.sound_speed_squared(&pli, masses, xli, yli);
    let cs2ri = config.eos.sound_speed_squared(&pri, masses, xri, yri);
    let cs2lj = config.eos.sound_speed_squared(&plj, masses, xlj, ylj);
    let cs2rj = config.eos.sound_speed_squared(&prj, masses, xrj, yrj);

    let mut fli = hlle_flux(&plim, &plip, cs2li, Direction::X);
    let mut fri = hlle_flux(&prim, &prip, cs2ri, Direction::X);
    let mut flj = hlle_flux(&pljm, &pljp, cs2lj, Direction::Y);
    let mut frj = hlle_flux(&prjm, &prjp, cs2rj, Direction::Y);

    let sli = shear_strain(&gxli, &gyli, dx, dy);
    let sri = shear_strain(&gxri, &gyri, dx, dy);
    let slj = shear_strain(&gxlj, &gylj, dx, dy);
    let srj = shear_strain(&gxrj, &gyrj, dx, dy);
    let scc = shear_strain(&gxcc, &gycc, dx, dy);

    let h = disk_height(masses, xc, yc, &pcc);
    let cs2cc = config.eos.sound_speed_squared(&pcc, masses, xc, yc);
    let nu = config.alpha * h * cs2cc.sqrt(); // nu is centered

    fli = fli - viscous_face_correction(nu, (&pli, &sli), (&pcc, &scc), Direction::X);
    fri = fri - viscous_face_correction(nu, (&pcc, &scc), (&pri, &sri), Direction::X);
    flj = flj - viscous_face_correction(nu, (&plj, &slj), (&pcc, &scc), Direction::Y);
    frj = frj - viscous_face_correction(nu, (&pcc, &scc), (&prj, &srj), Direction::Y);

    let mut ucc = pcc.to_conserved();
    buffer_source_term(&config.buffer, xc, yc, config.dt, &mut ucc);
    point_masses_source_term(masses, xc, yc, config.dt, &pcc, h, &mut ucc);
    cooling_term(config.cooling_coefficient, config.dt, &pcc, &mut ucc);

    ucc = ucc - ((fri - fli) / dx + (frj - flj) / dy) * config.dt;
    ucc = ucc * (1.0 - config.rk_weight) + un * config.rk_weight;

    ucc.to_primitive(
        config.velocity_ceiling,
        config.density_floor,
        config.pressure_floor,
    )
}

/// Advances zone `(i, j)` through one Runge-Kutta substage on the
/// inviscid fast path, which reads only the cross-shaped part of the
/// stencil and skips the strain tensors entirely.
pub fn advance_rk_zone_inviscid(
    mesh: &StructuredMesh,
    conserved_rk: &Patch,
    primitive_rd: &Patch,
    config: &AdvanceConfig,
    i: i64,
    j: i64,
) -> Primitive {
    let dx = mesh.dx();
    let dy = mesh.dy();
    let (xc, yc) = mesh.cell_center(i, j);
    let masses = config.masses;

    let un = Conserved::from_slice(conserved_rk.get(i, j));
    let pcc = Primitive::from_slice(primitive_rd.get(i, j));
    let pli = Primitive::from_slice(primitive_rd.get(i - 1, j));
    let pri = Primitive::from_slice(primitive_rd.get(i + 1, j));
    let plj = Primitive::from_slice(primitive_rd.get(i, j - 1));
    let prj = Primitive::from_slice(primitive_rd.get(i, j + 1));
    let pki = Primitive::from_slice(primitive_rd.get(i - 2, j));
    let pti = Primitive::from_slice(primitive_rd.get(i + 2, j));
    let pkj = Primitive::from_slice(primitive_rd.get(i, j - 2));
    let ptj = Primitive::from_slice(primitive_rd.get(i, j + 2));

    let gxli = plm_gradient(&pki, &pli, &pcc);
    let gxcc = plm_gradient(&pli, &pcc, &pri);
    let gxri = plm_gradient(&pcc, &pri, &pti);
    let gylj = plm_gradient(&pkj, &plj, &pcc);
    let gycc = plm_gradient(&plj, &pcc, &prj);
    let gyrj = plm_gradient(&pcc, &prj, &ptj);

    let plim = pli + gxli * 0.5;
    let plip = pcc - gxcc * 0.5;
    let prim = pcc + gxcc * 0.5;
    let prip = pri - gxri * 0.5;
    let pljm = plj + gylj * 0.5;
    let pljp = pcc - gycc * 0.5;
    let prjm = pcc + gycc * 0.5;
    let prjp = prj - gyrj * 0.5;

    let (xli, yli) = mesh.cell_center(i - 1, j);
    let (xri, yri) = mesh.cell_center(i + 1, j);
    let (xlj, ylj) = mesh.cell_center(i, j - 1);
    let (xrj, yrj) = mesh.cell_center(i, j + 1);
    let cs2li = config.eos.sound_speed_squared(&pli, masses, xli, yli);
    let cs2ri = config.eos.sound_speed_squared(&pri, masses, xri, yri);
    let cs2lj = config.eos.sound_speed_squared(&plj, masses, xlj, ylj);
    let cs2rj = config.eos.sound_speed_squared(&prj, masses, xrj, yrj);

    let fli = hlle_flux(&plim, &plip, cs2li, Direction::X);
    let fri = hlle_flux(&prim, &prip, cs2ri, Direction::X);
    let flj = hlle_flux(&pljm, &pljp, cs2lj, Direction::Y);
    let frj = hlle_flux(&prjm, &prjp, cs2rj, Direction::Y);

    let h = disk_height(masses, xc, yc, &pcc);

    let mut ucc = pcc.to_conserved();
    buffer_source_term(&config.buffer, xc, yc, config.dt, &mut ucc);
    point_masses_source_term(masses, xc, yc, config.dt, &pcc, h, &mut ucc);
    cooling_term(config.cooling_coefficient, config.dt, &pcc, &mut ucc);

    ucc = ucc - ((fri - fli) / dx + (frj - flj) / dy) * config.dt;
    ucc = ucc * (1.0 - config.rk_weight) + un * config.rk_weight;

    ucc.to_primitive(
        config.velocity_ceiling,
        config.density_floor,
        config.pressure_floor,
    )
}
