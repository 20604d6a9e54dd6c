use crate::error::SourceError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Cap on disk rejection-sampling attempts; the expected count is 4/π.
pub const MAX_REJECTION_ATTEMPTS: usize = 10_000;

/// Angular distribution of emitted primaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AngularDistribution {
    Isotropic,
    Monodirectional { reference_uvw: [f64; 3] },
    /// Uniform within a cone of half-angle `apex` (radians) about `axis`.
    Cone { axis: [f64; 3], apex: f64 },
}

impl AngularDistribution {
    /// Create a new monodirectional distribution
    pub fn new_monodirectional(u: f64, v: f64, w: f64) -> Result<Self, SourceError> {
        Ok(Self::Monodirectional {
            reference_uvw: normalize([u, v, w])?,
        })
    }

    /// Create a new isotropic distribution
    pub fn new_isotropic() -> Self {
        Self::Isotropic
    }

    /// Cone about `axis`; `apex` is clamped to [0, π].
    pub fn new_cone(axis: [f64; 3], apex: f64) -> Result<Self, SourceError> {
        Ok(Self::Cone {
            axis: normalize(axis)?,
            apex: apex.clamp(0.0, PI),
        })
    }

    /// Sample a direction from this distribution
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> [f64; 3] {
        match self {
            AngularDistribution::Isotropic => {
                // cos runs from cos(0) = 1 down to cos(180°) = -1
                let cos_alpha = 1.0 - 2.0 * rng.gen::<f64>();
                let phi = 2.0 * PI * rng.gen::<f64>();
                polar_to_cartesian(cos_alpha, phi)
            }
            AngularDistribution::Monodirectional { reference_uvw } => *reference_uvw,
            AngularDistribution::Cone { axis, apex } => {
                let cos_alpha = 1.0 - rng.gen::<f64>() * (1.0 - apex.cos());
                let psi = 2.0 * PI * rng.gen::<f64>();
                rotate_uz(polar_to_cartesian(cos_alpha, psi), *axis)
            }
        }
    }
}

impl Default for AngularDistribution {
    fn default() -> Self {
        Self::Isotropic
    }
}

fn polar_to_cartesian(cos_alpha: f64, phi: f64) -> [f64; 3] {
    let sin_alpha = (1.0 - cos_alpha * cos_alpha).max(0.0).sqrt();
    [sin_alpha * phi.cos(), sin_alpha * phi.sin(), cos_alpha]
}

fn normalize(v: [f64; 3]) -> Result<[f64; 3], SourceError> {
    let mag = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if mag == 0.0 || !mag.is_finite() {
        return Err(SourceError::ZeroDirection);
    }
    Ok([v[0] / mag, v[1] / mag, v[2] / mag])
}

/// Rotate `d`, expressed in a frame whose z axis is +z, into the frame whose
/// z axis is the unit vector `new_uz`.
pub fn rotate_uz(d: [f64; 3], new_uz: [f64; 3]) -> [f64; 3] {
    let [u1, u2, u3] = new_uz;
    let up = u1 * u1 + u2 * u2;
    if up > 0.0 {
        let up = up.sqrt();
        let [px, py, pz] = d;
        [
            (u1 * u3 * px - u2 * py) / up + u1 * pz,
            (u2 * u3 * px + u1 * py) / up + u2 * pz,
            -up * px + u3 * pz,
        ]
    } else if u3 < 0.0 {
        [-d[0], d[1], -d[2]]
    } else {
        d
    }
}

/// Uniform point in the closed disk of `radius` centred on the origin, in the
/// xy plane, by rejection from the enclosing square. A zero radius returns
/// the origin without drawing.
pub fn sample_disk<R: Rng + ?Sized>(radius: f64, rng: &mut R) -> Result<[f64; 2], SourceError> {
    if !(radius >= 0.0) || !radius.is_finite() {
        return Err(SourceError::InvalidRadius(radius));
    }
    if radius == 0.0 {
        return Ok([0.0, 0.0]);
    }
    let r2 = radius * radius;
    for _ in 0..MAX_REJECTION_ATTEMPTS {
        let x = (2.0 * rng.gen::<f64>() - 1.0) * radius;
        let y = (2.0 * rng.gen::<f64>() - 1.0) * radius;
        if x * x + y * y <= r2 {
            return Ok([x, y]);
        }
    }
    Err(SourceError::RejectionExhausted {
        attempts: MAX_REJECTION_ATTEMPTS,
        radius,
    })
}
