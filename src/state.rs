//! Primitive and conserved hydrodynamic state tuples.
//!
//! The 2D Euler system evolves four fields per zone. Two equivalent
//! representations are used:
//!
//! ```text
//! primitive  P = (rho, vx, vy, p)
//! conserved  U = (rho, rho vx, rho vy, E),   E = p / (gamma - 1) + rho (vx^2 + vy^2) / 2
//! ```
//!
//! The adiabatic index is a fixed law constant, `gamma = 5/3`.
//!
//! Conversion from conserved to primitive variables applies a density
//! floor, a velocity ceiling, and a pressure floor; the gas pressure is
//! recomputed from the *clamped* velocities so that the operation is
//! idempotent on any admissible state. Floors are the failure semantics of
//! the whole crate: the kernel repairs non-physical states in place rather
//! than reporting them.

use std::ops::{Add, Div, Mul, Sub};

/// Number of conserved (and primitive) fields per zone.
pub const NCONS: usize = 4;

/// The adiabatic index of the gamma-law equation of state.
pub const GAMMA_LAW_INDEX: f64 = 5.0 / 3.0;

/// A coordinate axis of the mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// The i (x) axis
    X,
    /// The j (y) axis
    Y,
}

/// Primitive hydrodynamic state: mass density, velocity, gas pressure.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Primitive {
    /// Surface density
    pub rho: f64,
    /// x-velocity
    pub vx: f64,
    /// y-velocity
    pub vy: f64,
    /// Gas pressure
    pub p: f64,
}

/// Conserved hydrodynamic state: mass, momentum, total energy.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Conserved {
    /// Surface density
    pub rho: f64,
    /// x-momentum
    pub px: f64,
    /// y-momentum
    pub py: f64,
    /// Total energy
    pub en: f64,
}

impl Primitive {
    /// Create a new primitive state.
    #[inline(always)]
    pub fn new(rho: f64, vx: f64, vy: f64, p: f64) -> Self {
        Self { rho, vx, vy, p }
    }

    /// Read a primitive state from a field slice.
    #[inline(always)]
    pub fn from_slice(f: &[f64]) -> Self {
        Self {
            rho: f[0],
            vx: f[1],
            vy: f[2],
            p: f[3],
        }
    }

    /// Convert to array representation.
    #[inline(always)]
    pub fn to_array(self) -> [f64; NCONS] {
        [self.rho, self.vx, self.vy, self.p]
    }

    /// The velocity component along the given axis.
    #[inline(always)]
    pub fn velocity(&self, direction: Direction) -> f64 {
        match direction {
            Direction::X => self.vx,
            Direction::Y => self.vy,
        }
    }

    /// Convert to conserved variables.
    #[inline]
    pub fn to_conserved(self) -> Conserved {
        let px = self.rho * self.vx;
        let py = self.rho * self.vy;
        let en = self.p / (GAMMA_LAW_INDEX - 1.0)
            + 0.5 * self.rho * (self.vx * self.vx + self.vy * self.vy);
        Conserved {
            rho: self.rho,
            px,
            py,
            en,
        }
    }

    /// The physical (advective) flux of conserved quantities along the
    /// given axis.
    #[inline]
    pub fn flux(&self, cons: &Conserved, direction: Direction) -> Conserved {
        let vn = self.velocity(direction);
        let (fp_x, fp_y) = match direction {
            Direction::X => (self.p, 0.0),
            Direction::Y => (0.0, self.p),
        };
        Conserved {
            rho: vn * cons.rho,
            px: vn * cons.px + fp_x,
            py: vn * cons.py + fp_y,
            en: vn * (cons.en + self.p),
        }
    }

    /// The outermost characteristic speeds `(vn - cs, vn + cs)` along the
    /// given axis.
    #[inline]
    pub fn outer_wavespeeds(&self, cs2: f64, direction: Direction) -> (f64, f64) {
        let cs = cs2.sqrt();
        let vn = self.velocity(direction);
        (vn - cs, vn + cs)
    }

    /// The largest signal speed over both axes,
    /// `max(|vx| + cs, |vy| + cs)`.
    #[inline]
    pub fn max_wavespeed(&self, cs2: f64) -> f64 {
        let cs = cs2.sqrt();
        let ax = f64::max((self.vx - cs).abs(), (self.vx + cs).abs());
        let ay = f64::max((self.vy - cs).abs(), (self.vy + cs).abs());
        f64::max(ax, ay)
    }

}

impl Conserved {
    /// Create a new conserved state.
    #[inline(always)]
    pub fn new(rho: f64, px: f64, py: f64, en: f64) -> Self {
        Self { rho, px, py, en }
    }

    /// Read a conserved state from a field slice.
    #[inline(always)]
    pub fn from_slice(f: &[f64]) -> Self {
        Self {
            rho: f[0],
            px: f[1],
            py: f[2],
            en: f[3],
        }
    }

    /// Convert to array representation.
    #[inline(always)]
    pub fn to_array(self) -> [f64; NCONS] {
        [self.rho, self.px, self.py, self.en]
    }

    /// Convert to primitive variables, repairing non-physical states in
    /// place.
    ///
    /// The density is floored, each velocity component is clamped to the
    /// ceiling with its sign kept, and the pressure is recomputed from the
    /// clamped velocities before its own floor is applied. Applying this
    /// map twice gives the same result as applying it once.
    #[inline]
    pub fn to_primitive(
        self,
        velocity_ceiling: f64,
        density_floor: f64,
        pressure_floor: f64,
    ) -> Primitive {
        let rho = self.rho.max(density_floor);
        let vx = f64::copysign((self.px / rho).abs().min(velocity_ceiling), self.px);
        let vy = f64::copysign((self.py / rho).abs().min(velocity_ceiling), self.py);
        let p = ((self.en - 0.5 * rho * (vx * vx + vy * vy)) * (GAMMA_LAW_INDEX - 1.0))
            .max(pressure_floor);
        Primitive { rho, vx, vy, p }
    }
}

macro_rules! fieldwise_ops {
    ($t:ident, $a:ident, $b:ident, $c:ident, $d:ident) => {
        impl Add for $t {
            type Output = $t;
            #[inline(always)]
            fn add(self, u: $t) -> $t {
                $t {
                    $a: self.$a + u.$a,
                    $b: self.$b + u.$b,
                    $c: self.$c + u.$c,
                    $d: self.$d + u.$d,
                }
            }
        }
        impl Sub for $t {
            type Output = $t;
            #[inline(always)]
            fn sub(self, u: $t) -> $t {
                $t {
                    $a: self.$a - u.$a,
                    $b: self.$b - u.$b,
                    $c: self.$c - u.$c,
                    $d: self.$d - u.$d,
                }
            }
        }
        impl Mul<f64> for $t {
            type Output = $t;
            #[inline(always)]
            fn mul(self, s: f64) -> $t {
                $t {
                    $a: self.$a * s,
                    $b: self.$b * s,
                    $c: self.$c * s,
                    $d: self.$d * s,
                }
            }
        }
        impl Div<f64> for $t {
            type Output = $t;
            #[inline(always)]
            fn div(self, s: f64) -> $t {
                $t {
                    $a: self.$a / s,
                    $b: self.$b / s,
                    $c: self.$c / s,
                    $d: self.$d / s,
                }
            }
        }
    };
}

fieldwise_ops!(Primitive, rho, vx, vy, p);
fieldwise_ops!(Conserved, rho, px, py, en);
