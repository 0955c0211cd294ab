//! Boundary guard
//!
//! Projects a requested translation back onto the safety envelope. Each axis
//! is handled independently: a component that would carry the tool onto or
//! past a wall is replaced by the distance to that wall, the others pass
//! through untouched. The vector is never scaled as a whole.

use super::envelope::SafetyEnvelope;
use crate::motion::{Axis, Pose, Vector3, MM_PER_M};

/// Result of clamping a translation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Clamped {
    /// Translation that is safe to send (m)
    pub vector: Vector3,
    /// True if the request was already inside the envelope and is unchanged
    pub fully_within: bool,
}

/// Clamp `requested` so that `current + requested` stays within `envelope`
///
/// Pure function: the caller is responsible for reading the current pose.
pub fn clamp(requested: Vector3, current: &Pose, envelope: &SafetyEnvelope) -> Clamped {
    let mut vector = requested;
    let mut fully_within = true;

    for axis in Axis::ALL {
        let position = current.position(axis);
        let next = position + requested.component(axis) * MM_PER_M;
        if envelope.contains_on(axis, next) {
            continue;
        }

        let (min, max) = envelope.bounds(axis);
        let bound = if next <= min { min } else { max };
        vector.set_component(axis, (bound - position) / MM_PER_M);
        fully_within = false;
    }

    Clamped {
        vector,
        fully_within,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        let diff = a - b;
        diff < 1e-9 && diff > -1e-9
    }

    fn home() -> Pose {
        Pose::new(-100.0, -800.0, 300.0, 0.0, 3.14, 0.0)
    }

    #[test]
    fn test_inside_request_unchanged() {
        let request = Vector3::new(0.1, 0.02, 0.05);
        let result = clamp(request, &home(), &SafetyEnvelope::default());

        assert!(result.fully_within);
        assert_eq!(result.vector, request);
    }

    #[test]
    fn test_single_axis_violation_projected() {
        // Right by 25 cm from x=-100 would land at x=150, past max_x=100
        let request = Vector3::new(0.25, 0.01, -0.1);
        let result = clamp(request, &home(), &SafetyEnvelope::default());

        assert!(!result.fully_within);
        assert!(approx(result.vector.dx, 0.2));
        assert_eq!(result.vector.dy, 0.01);
        assert_eq!(result.vector.dz, -0.1);
    }

    #[test]
    fn test_lower_bound_violation_projected() {
        // Down by 40 cm from z=300 would land at z=-100, below min_z=6
        let request = Vector3::new(0.0, 0.0, -0.4);
        let result = clamp(request, &home(), &SafetyEnvelope::default());

        assert!(!result.fully_within);
        assert!(approx(result.vector.dz, -0.294));
    }

    #[test]
    fn test_exact_touch_counts_as_violation() {
        // x=-100 + 200 mm lands exactly on max_x=100
        let request = Vector3::new(0.2, 0.0, 0.0);
        let result = clamp(request, &home(), &SafetyEnvelope::default());

        assert!(!result.fully_within);
        assert!(approx(result.vector.dx, 0.2));
    }

    #[test]
    fn test_multiple_axes_clamped_independently() {
        let request = Vector3::new(-1.0, 1.0, 1.0);
        let result = clamp(request, &home(), &SafetyEnvelope::default());

        assert!(!result.fully_within);
        assert!(approx(result.vector.dx, -0.2));
        assert!(approx(result.vector.dy, 0.05));
        assert!(approx(result.vector.dz, 0.1));
    }

    #[test]
    fn test_orientation_is_not_touched() {
        let current = home();
        let result = clamp(Vector3::new(0.0, 0.0, 1.0), &current, &SafetyEnvelope::default());
        let target = current.translated(result.vector);

        assert_eq!(target.rx, current.rx);
        assert_eq!(target.ry, current.ry);
        assert_eq!(target.rz, current.rz);
    }

    fn inside_pose() -> impl Strategy<Value = Pose> {
        (-299.0f64..99.0, -849.0f64..-751.0, 7.0f64..399.0)
            .prop_map(|(x, y, z)| Pose::new(x, y, z, 0.0, 3.14, 0.0))
    }

    proptest! {
        #[test]
        fn prop_strictly_inside_is_identity(
            pose in inside_pose(),
            dx in -0.1f64..0.1,
            dy in -0.03f64..0.03,
            dz in -0.1f64..0.1,
        ) {
            let envelope = SafetyEnvelope::default();
            let request = Vector3::new(dx, dy, dz);
            prop_assume!(envelope.contains(&pose.translated(request)));

            let result = clamp(request, &pose, &envelope);
            prop_assert!(result.fully_within);
            prop_assert_eq!(result.vector, request);
        }

        #[test]
        fn prop_single_axis_violation(
            pose in inside_pose(),
            overshoot in 0.001f64..1.0,
            upward in any::<bool>(),
        ) {
            let envelope = SafetyEnvelope::default();
            let (min_z, max_z) = envelope.bounds(Axis::Z);
            let bound = if upward { max_z } else { min_z };
            let sign = if upward { 1.0 } else { -1.0 };
            let dz = (bound - pose.z) / MM_PER_M + sign * overshoot;
            let request = Vector3::new(0.0, 0.0, dz);

            let result = clamp(request, &pose, &envelope);
            prop_assert!(!result.fully_within);
            prop_assert!(approx(result.vector.dz, (bound - pose.z) / MM_PER_M));
            prop_assert_eq!(result.vector.dx, 0.0);
            prop_assert_eq!(result.vector.dy, 0.0);
        }

        #[test]
        fn prop_clamped_target_never_leaves_envelope(
            pose in inside_pose(),
            dx in -2.0f64..2.0,
            dy in -2.0f64..2.0,
            dz in -2.0f64..2.0,
        ) {
            let envelope = SafetyEnvelope::default();
            let result = clamp(Vector3::new(dx, dy, dz), &pose, &envelope);
            let target = pose.translated(result.vector);

            for axis in Axis::ALL {
                let (min, max) = envelope.bounds(axis);
                let p = target.position(axis);
                prop_assert!(p >= min - 1e-6 && p <= max + 1e-6);
            }
        }
    }
}
