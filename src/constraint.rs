use crate::math::{delta_degrees, wrap_degrees};
use crate::skeleton::{HandJoint, Pose};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Restricts a target joint to a single rotational degree of freedom about
/// its local forward axis, within `[min_deg, max_deg]` (degrees, wrapped to
/// [0, 360)). `height_correction` is a fixed positional offset applied along
/// the joint's local up axis, orthogonal to the constrained axis.
///
/// Authored once as configuration; read every frame, never mutated at
/// runtime.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointConstraint {
    pub min_deg: f32,
    pub max_deg: f32,
    #[serde(default)]
    pub height_correction: f32,
}

impl JointConstraint {
    pub fn new(min_deg: f32, max_deg: f32) -> Self {
        Self {
            min_deg,
            max_deg,
            height_correction: 0.0,
        }
    }

    /// Clamp `theta` (degrees) into the allowed range. Out-of-range angles
    /// snap to whichever bound is angularly closer by signed wrapped delta,
    /// so a range like [10, 350] treats 5 as nearer to 10 than to 350.
    pub fn clamp_angle(&self, theta: f32) -> f32 {
        let theta = wrap_degrees(theta);
        let min = wrap_degrees(self.min_deg);
        let max = wrap_degrees(self.max_deg);

        let inside = if min <= max {
            (min..=max).contains(&theta)
        } else {
            // Range wraps through 0.
            theta >= min || theta <= max
        };
        if inside {
            return theta;
        }

        if delta_degrees(theta, min).abs() <= delta_degrees(theta, max).abs() {
            min
        } else {
            max
        }
    }

    /// Constrain a desired world rotation against the parent frame.
    ///
    /// The rotation is decomposed into the parent-local frame, reduced to
    /// its forward-axis angle, clamped, and rebuilt about that single axis;
    /// all other axes are zeroed. The height correction rides along the
    /// rebuilt joint's local up.
    pub fn apply(&self, parent: &Pose, world_pos: Vec3, world_rot: Quat) -> Pose {
        let local = parent.orientation.inverse() * world_rot;
        let (roll, _, _) = local.to_euler(glam::EulerRot::ZYX);
        let clamped = self.clamp_angle(roll.to_degrees());

        let orientation = parent.orientation * Quat::from_rotation_z(clamped.to_radians());
        let position = world_pos + orientation * Vec3::Y * self.height_correction;
        Pose {
            position,
            orientation,
        }
    }
}

/// Constraint lookup for the whole hand, built once from configuration.
#[derive(Clone, Debug, Default)]
pub struct ConstraintSet {
    by_joint: [Option<JointConstraint>; HandJoint::COUNT],
}

impl ConstraintSet {
    pub fn set(&mut self, joint: HandJoint, constraint: JointConstraint) {
        self.by_joint[joint as usize] = Some(constraint);
    }

    pub fn get(&self, joint: HandJoint) -> Option<&JointConstraint> {
        self.by_joint[joint as usize].as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::Pose;

    #[test]
    fn in_range_angles_pass_through() {
        let c = JointConstraint::new(10.0, 80.0);
        assert_eq!(c.clamp_angle(10.0), 10.0);
        assert_eq!(c.clamp_angle(45.0), 45.0);
        assert_eq!(c.clamp_angle(80.0), 80.0);
    }

    #[test]
    fn out_of_range_snaps_to_closer_bound() {
        let c = JointConstraint::new(10.0, 80.0);
        assert_eq!(c.clamp_angle(5.0), 10.0);
        assert_eq!(c.clamp_angle(100.0), 80.0);
        // 300 is 70 degrees from 10 going backwards through 0, but 220 from
        // 80; the wrapped delta picks 10.
        assert_eq!(c.clamp_angle(300.0), 10.0);
    }

    #[test]
    fn selection_crosses_zero_wrap() {
        // min=10, max=350, theta=5: 5 degrees from min, 15 from max.
        let c = JointConstraint::new(10.0, 350.0);
        assert_eq!(c.clamp_angle(5.0), 10.0);
        assert_eq!(c.clamp_angle(358.0), 350.0);
    }

    #[test]
    fn wrapping_range_contains_zero() {
        // [350, 10] is the 20-degree arc through 0.
        let c = JointConstraint::new(350.0, 10.0);
        assert_eq!(c.clamp_angle(0.0), 0.0);
        assert_eq!(c.clamp_angle(355.0), 355.0);
        assert_eq!(c.clamp_angle(5.0), 5.0);
        assert_eq!(c.clamp_angle(170.0), 10.0);
        assert_eq!(c.clamp_angle(190.0), 350.0);
    }

    #[test]
    fn negative_bounds_are_wrapped() {
        let c = JointConstraint::new(-10.0, 10.0);
        assert_eq!(c.clamp_angle(0.0), 0.0);
        assert_eq!(c.clamp_angle(-5.0), 355.0);
        assert_eq!(c.clamp_angle(20.0), 10.0);
    }

    #[test]
    fn apply_zeroes_other_axes() {
        let c = JointConstraint::new(0.0, 90.0);
        let parent = Pose::IDENTITY;
        // Desired rotation mixes all three axes.
        let desired =
            Quat::from_euler(glam::EulerRot::ZYX, 0.5_f32, 0.4, 0.3);
        let result = c.apply(&parent, Vec3::ZERO, desired);

        let (z, y, x) = result.orientation.to_euler(glam::EulerRot::ZYX);
        assert!((z - 0.5).abs() < 1e-4);
        assert!(y.abs() < 1e-6);
        assert!(x.abs() < 1e-6);
    }

    #[test]
    fn apply_respects_parent_frame() {
        let c = JointConstraint::new(0.0, 90.0);
        let parent = Pose::new(Vec3::ZERO, Quat::from_rotation_z(0.4));
        // World rotation 0.4 + 0.3 rad; the local angle is 0.3 rad, inside
        // the range, so the result reproduces the input.
        let desired = Quat::from_rotation_z(0.7);
        let result = c.apply(&parent, Vec3::ZERO, desired);
        let delta = result.orientation * desired.inverse();
        assert!(delta.to_axis_angle().1.abs() < 1e-5);
    }

    #[test]
    fn height_correction_moves_along_local_up() {
        let c = JointConstraint {
            min_deg: 0.0,
            max_deg: 0.0,
            height_correction: 0.01,
        };
        let result = c.apply(&Pose::IDENTITY, Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY);
        assert!(result
            .position
            .abs_diff_eq(Vec3::new(1.0, 2.01, 3.0), 1e-6));
    }
}
