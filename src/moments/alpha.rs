use std::any::Any;

use nalgebra as na;

use super::names::{ALPHA, CENTERED};
use super::MomentCentered;
use crate::database::{Moment, MomentDatabase, MomentError};
use crate::math::{flush_cancellation, rotated_moment, THIRD_ORDER};
use crate::object::MomentObject;

/// Scale-free third-order moments below this magnitude carry no orientation.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Orientation of the object, `0.5 * atan2(2 mu11, mu20 - mu02)`.
///
/// On its own the principal-axis angle is only known modulo pi. A moment built with
/// [MomentAlpha::with_reference] lifts that ambiguity: the current third-order moments,
/// rotated back by `alpha - ref_alpha`, must point the same way as the reference ones,
/// otherwise the object is turned the other way round and pi is added. The result is
/// wrapped to `(-pi, pi]`.
#[derive(Debug, Clone)]
pub struct MomentAlpha<F: na::RealField + Copy> {
    reference: Option<([F; 4], F)>,
    value: [F; 1],
}

impl<F: na::RealField + Copy> Default for MomentAlpha<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: na::RealField + Copy> MomentAlpha<F> {
    /// Alpha of a reference object, no disambiguation.
    pub fn new() -> Self {
        Self {
            reference: None,
            value: [F::zero()],
        }
    }

    /// Alpha tracked against a reference pose.
    ///
    /// # Arguments
    /// * `ref_mu3` - Third-order centered moments of the reference, ordered
    ///   `(3,0), (2,1), (1,2), (0,3)`
    /// * `ref_alpha` - Alpha of the reference object
    pub fn with_reference(ref_mu3: [F; 4], ref_alpha: F) -> Self {
        Self {
            reference: Some((ref_mu3, ref_alpha)),
            value: [F::zero()],
        }
    }

    pub fn value(&self) -> F {
        self.value[0]
    }

    pub fn reference(&self) -> Option<&([F; 4], F)> {
        self.reference.as_ref()
    }
}

fn wrap_angle<F: na::RealField + Copy>(angle: F) -> F {
    if angle > F::pi() {
        angle - F::two_pi()
    } else if angle <= -F::pi() {
        angle + F::two_pi()
    } else {
        angle
    }
}

impl<F: na::RealField + Copy> Moment<F> for MomentAlpha<F> {
    fn name(&self) -> &'static str {
        ALPHA
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[CENTERED]
    }

    fn update(&mut self, _object: &MomentObject<F>) {}

    fn compute(&mut self, database: &MomentDatabase<F>) -> Result<(), MomentError> {
        let centered = database.dependency::<MomentCentered<F>>(CENTERED)?;
        let mu20 = centered.require(ALPHA, 2, 0)?;
        let mu02 = centered.require(ALPHA, 0, 2)?;
        let mu11 = centered.require(ALPHA, 1, 1)?;

        if mu20 + mu02 <= F::zero() {
            return Err(MomentError::Degenerate {
                moment: ALPHA,
                reason: "object has no second-order spread",
            });
        }

        // An isotropic object has no principal axis, its alpha is 0
        let spread = mu20 + mu02;
        let two: F = na::convert(2.0);
        let shear = flush_cancellation(two * mu11, spread);
        let anisotropy = flush_cancellation(mu20 - mu02, spread);
        let mut alpha = shear.atan2(anisotropy) / two;

        if let Some((ref_mu3, ref_alpha)) = self
            .reference
            .filter(|(ref_mu3, _)| ref_mu3.iter().any(|m| !m.is_zero()))
        {
            centered.require(ALPHA, 3, 0)?;
            let mu00 = centered.require(ALPHA, 0, 0)?;
            if mu00 <= F::zero() {
                return Err(MomentError::Degenerate {
                    moment: ALPHA,
                    reason: "object has zero mass",
                });
            }

            let delta = alpha - ref_alpha;
            let rotated =
                THIRD_ORDER.map(|(p, q)| rotated_moment(centered.matrix(), delta, p, q));

            // Same normalization as eta(p, q) with p + q = 3
            let scale = spread / mu00;
            let threshold =
                na::convert::<f64, F>(SYMMETRY_TOLERANCE) * mu00 * scale * scale.sqrt();
            if rotated.iter().any(|m| m.abs() > threshold) {
                let alignment = rotated
                    .iter()
                    .zip(ref_mu3)
                    .fold(F::zero(), |acc, (&current, reference)| acc + current * reference);
                if alignment < F::zero() {
                    alpha += F::pi();
                }
            }
        }

        self.value = [wrap_angle(alpha)];
        Ok(())
    }

    fn values(&self) -> &[F] {
        &self.value
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moments::MomentGravityCenter;
    use crate::object::ObjectKind;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn alpha_of(points: &[(f64, f64)], alpha: MomentAlpha<f64>) -> Result<f64, MomentError> {
        alpha_of_kind(points, ObjectKind::Discrete, alpha)
    }

    fn alpha_of_kind(
        points: &[(f64, f64)],
        kind: ObjectKind,
        alpha: MomentAlpha<f64>,
    ) -> Result<f64, MomentError> {
        let points: Vec<_> = points.iter().map(|&(x, y)| na::Point2::new(x, y)).collect();
        let object = MomentObject::from_points(3, kind, &points).unwrap();

        let mut db = MomentDatabase::new();
        let gravity = db.link(MomentGravityCenter::new());
        let centered = db.link(MomentCentered::new());
        let handle = db.link(alpha);
        db.update_all(&object);
        db.compute(gravity)?;
        db.compute(centered)?;
        db.compute(handle)?;
        Ok(db.fetch(handle)?.value())
    }

    fn rotate(points: &[(f64, f64)], angle: f64) -> Vec<(f64, f64)> {
        let (s, c) = angle.sin_cos();
        points.iter().map(|&(x, y)| (c * x - s * y, s * x + c * y)).collect()
    }

    const ASYMMETRIC: [(f64, f64); 5] =
        [(0.0, 0.0), (0.4, 0.05), (0.9, 0.1), (0.3, 0.25), (-0.2, -0.1)];

    #[test]
    fn test_horizontal_segment() -> anyhow::Result<()> {
        let alpha = alpha_of(&[(-1.0, 0.0), (0.0, 0.0), (2.0, 0.0)], MomentAlpha::new())?;
        assert_relative_eq!(alpha, 0.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_diagonal_segment() -> anyhow::Result<()> {
        let alpha = alpha_of(&[(-1.0, -1.0), (0.5, 0.5), (1.0, 1.0)], MomentAlpha::new())?;
        assert_relative_eq!(alpha, PI / 4.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_symmetric_square() -> anyhow::Result<()> {
        let square = [(-0.1, -0.1), (0.1, -0.1), (0.1, 0.1), (-0.1, 0.1)];
        assert_relative_eq!(alpha_of(&square, MomentAlpha::new())?, 0.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_coincident_points_are_degenerate() {
        assert!(matches!(
            alpha_of(&[(0.2, 0.2); 4], MomentAlpha::new()),
            Err(MomentError::Degenerate { moment: ALPHA, .. })
        ));
    }

    #[test]
    fn test_reference_resolves_half_turn() -> anyhow::Result<()> {
        let ref_alpha = alpha_of(&ASYMMETRIC, MomentAlpha::new())?;
        let ref_mu3 = {
            let points: Vec<_> = ASYMMETRIC.iter().map(|&(x, y)| na::Point2::new(x, y)).collect();
            let object = MomentObject::from_points(3, ObjectKind::Discrete, &points)?;
            let mut db = MomentDatabase::new();
            let gravity = db.link(MomentGravityCenter::new());
            let centered = db.link(MomentCentered::new());
            db.update_all(&object);
            db.compute(gravity)?;
            db.compute(centered)?;
            let centered = db.fetch(centered)?;
            THIRD_ORDER.map(|(i, j)| centered.get(i, j).unwrap())
        };

        for turn in [0.3, 1.2, 2.0, -2.5, PI - 0.1] {
            let rotated = rotate(&ASYMMETRIC, turn);
            let tracked = alpha_of(&rotated, MomentAlpha::with_reference(ref_mu3, ref_alpha))?;
            let expected = wrap_angle(ref_alpha + turn);
            assert_relative_eq!(wrap_angle(tracked - expected), 0.0, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_symmetric_reference_skips_disambiguation() -> anyhow::Result<()> {
        let plain = alpha_of(&ASYMMETRIC, MomentAlpha::new())?;
        let tracked = alpha_of(&ASYMMETRIC, MomentAlpha::with_reference([0.0; 4], 1.0))?;
        assert_relative_eq!(plain, tracked, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_symmetric_object_keeps_principal_axis() -> anyhow::Result<()> {
        let square = [(-0.1, -0.1), (0.1, -0.1), (0.1, 0.1), (-0.1, 0.1)];
        let reference = MomentAlpha::with_reference([1e-3, 0.0, -2e-3, 0.0], 0.0);
        let tracked = alpha_of(&square, reference)?;
        assert_relative_eq!(tracked, 0.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_large_polygon_still_resolves_half_turn() -> anyhow::Result<()> {
        let shape = [
            (0.0, 0.0),
            (0.30, 0.02),
            (0.42, 0.15),
            (0.25, 0.22),
            (0.10, 0.35),
            (-0.05, 0.18),
        ];
        let large: Vec<_> = shape.iter().map(|&(x, y)| (x * 1e10, y * 1e10)).collect();

        let ref_alpha = alpha_of_kind(&large, ObjectKind::DensePolygon, MomentAlpha::new())?;
        let ref_mu3 = {
            let points: Vec<_> = large.iter().map(|&(x, y)| na::Point2::new(x, y)).collect();
            let object = MomentObject::from_points(3, ObjectKind::DensePolygon, &points)?;
            let mut db = MomentDatabase::new();
            let gravity = db.link(MomentGravityCenter::new());
            let centered = db.link(MomentCentered::new());
            db.update_all(&object);
            db.compute(gravity)?;
            db.compute(centered)?;
            let centered = db.fetch(centered)?;
            THIRD_ORDER.map(|(i, j)| centered.get(i, j).unwrap())
        };

        let rotated = rotate(&large, 2.5);
        let reference = MomentAlpha::with_reference(ref_mu3, ref_alpha);
        let tracked = alpha_of_kind(&rotated, ObjectKind::DensePolygon, reference)?;
        let expected = wrap_angle(ref_alpha + 2.5);
        assert_relative_eq!(wrap_angle(tracked - expected), 0.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_wrap_angle() {
        assert_relative_eq!(wrap_angle(1.5 * PI), -0.5 * PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-PI), PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(0.5), 0.5);
    }
}
