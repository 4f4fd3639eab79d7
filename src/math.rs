use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// How a bone's local axes map onto anatomical directions.
///
/// `forward` points along the bone (towards the next joint), `up` points out
/// of the back of the hand. The pair must be near-orthogonal; the right
/// vector is always derived via cross product rather than stored.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneBasis {
    pub forward: Vec3,
    pub up: Vec3,
}

impl BoneBasis {
    pub const CANONICAL: BoneBasis = BoneBasis {
        forward: Vec3::Z,
        up: Vec3::Y,
    };

    pub fn new(forward: Vec3, up: Vec3) -> Self {
        Self {
            forward: forward.normalize(),
            up: up.normalize(),
        }
    }

    /// None if forward and up are (near) parallel or degenerate.
    pub fn validate(&self) -> Option<Self> {
        look_rotation(self.forward, self.up).map(|_| *self)
    }

    /// The world rotation for a source bone oriented by `rotation`, with this
    /// basis deciding which of the bone's local axes mean forward and up.
    pub fn world_rotation(&self, rotation: Quat) -> Option<Quat> {
        look_rotation(rotation * self.forward, rotation * self.up)
    }
}

/// Rotation whose local +Z maps to `forward` and local +Y maps to `up`
/// (after re-orthogonalization). None when the inputs are parallel or
/// zero-length, which a caller must treat as "skip this joint" rather than
/// letting NaN into the pose.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    let f = forward.try_normalize()?;
    let r = up.cross(f).try_normalize()?;
    let u = f.cross(r);
    Some(Quat::from_mat3(&Mat3::from_cols(r, u, f)))
}

/// Wrap an angle in degrees to [0, 360).
pub fn wrap_degrees(angle: f32) -> f32 {
    angle.rem_euclid(360.0)
}

/// Signed shortest angular distance from `from` to `to`, in (-180, 180].
pub fn delta_degrees(from: f32, to: f32) -> f32 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-5;

    #[track_caller]
    fn assert_vec3_eq(actual: Vec3, expected: Vec3) {
        assert!(
            actual.abs_diff_eq(expected, TOLERANCE),
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn look_rotation_maps_axes() {
        let cases = [
            (Vec3::Z, Vec3::Y),
            (Vec3::X, Vec3::Y),
            (Vec3::NEG_Y, Vec3::Z),
            (Vec3::new(1.0, 0.0, 1.0).normalize(), Vec3::Y),
            (
                Vec3::new(1.0, 1.0, 1.0).normalize(),
                Vec3::new(-1.0, 1.0, 0.0).normalize(),
            ),
        ];

        for (forward, up) in cases {
            let rot = look_rotation(forward, up).unwrap();
            assert_vec3_eq(rot * Vec3::Z, forward);
            assert_vec3_eq(rot * Vec3::Y, up);
        }
    }

    #[test]
    fn look_rotation_rejects_degenerate_input() {
        assert!(look_rotation(Vec3::Z, Vec3::Z).is_none());
        assert!(look_rotation(Vec3::Z, Vec3::NEG_Z).is_none());
        assert!(look_rotation(Vec3::ZERO, Vec3::Y).is_none());
        assert!(look_rotation(Vec3::X, Vec3::ZERO).is_none());
    }

    #[test]
    fn look_rotation_reorthogonalizes_up() {
        // A slightly skewed up vector still produces an orthonormal frame
        // with the exact forward direction.
        let forward = Vec3::Z;
        let up = Vec3::new(0.1, 1.0, 0.3).normalize();
        let rot = look_rotation(forward, up).unwrap();
        assert_vec3_eq(rot * Vec3::Z, forward);
        assert!((rot * Vec3::Y).dot(forward).abs() < TOLERANCE);
    }

    #[test]
    fn delta_degrees_wraps() {
        assert_eq!(delta_degrees(0.0, 90.0), 90.0);
        assert_eq!(delta_degrees(90.0, 0.0), -90.0);
        assert_eq!(delta_degrees(350.0, 10.0), 20.0);
        assert_eq!(delta_degrees(10.0, 350.0), -20.0);
        assert_eq!(delta_degrees(0.0, 180.0), 180.0);
    }

    #[test]
    fn wrap_degrees_range() {
        assert_eq!(wrap_degrees(-10.0), 350.0);
        assert_eq!(wrap_degrees(370.0), 10.0);
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
    }
}
