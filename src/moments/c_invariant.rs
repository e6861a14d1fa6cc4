use std::any::Any;

use nalgebra as na;

use super::names::{ALPHA, CENTERED, C_INVARIANT};
use super::{MomentAlpha, MomentCentered};
use crate::database::{Moment, MomentDatabase, MomentError};
use crate::math::{pow, rotated_moment};
use crate::object::MomentObject;

/// Number of components held by [MomentCInvariant].
pub const C_INVARIANT_COUNT: usize = 8;

/// Similarity invariants of the object, unchanged under translation, rotation and uniform
/// scaling.
///
/// Centered moments are normalized as
/// `eta(p, q) = (mu(p, q) / mu00) / ((mu20 + mu02) / mu00)^((p + q) / 2)`, which is scale
/// free for both discrete and dense objects. The components are:
///
/// | index | value |
/// |---|---|
/// | 0..=5 | Hu's invariants I2 to I7 over `eta` |
/// | 6 | `px`, `eta(3, 0)` measured along the alpha axis |
/// | 7 | `py`, `eta(0, 3)` measured along the alpha axis |
///
/// Hu's I1 is omitted since it is identically 1 under this normalization.
#[derive(Debug, Clone)]
pub struct MomentCInvariant<F: na::RealField + Copy> {
    values: [F; C_INVARIANT_COUNT],
}

impl<F: na::RealField + Copy> Default for MomentCInvariant<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: na::RealField + Copy> MomentCInvariant<F> {
    pub fn new() -> Self {
        Self {
            values: [F::zero(); C_INVARIANT_COUNT],
        }
    }

    /// Invariant component `index`, or `None` past the last one.
    pub fn get(&self, index: usize) -> Option<F> {
        self.values.get(index).copied()
    }

    pub fn px(&self) -> F {
        self.values[6]
    }

    pub fn py(&self) -> F {
        self.values[7]
    }
}

fn hu_invariants<F: na::RealField + Copy>(eta: impl Fn(usize, usize) -> F) -> [F; 6] {
    let three: F = na::convert(3.0);
    let four: F = na::convert(4.0);

    let (n20, n02, n11) = (eta(2, 0), eta(0, 2), eta(1, 1));
    let (n30, n21, n12, n03) = (eta(3, 0), eta(2, 1), eta(1, 2), eta(0, 3));

    let a = n30 - three * n12;
    let b = three * n21 - n03;
    let s = n30 + n12;
    let t = n21 + n03;

    [
        (n20 - n02).powi(2) + four * n11.powi(2),
        a.powi(2) + b.powi(2),
        s.powi(2) + t.powi(2),
        a * s * (s.powi(2) - three * t.powi(2)) + b * t * (three * s.powi(2) - t.powi(2)),
        (n20 - n02) * (s.powi(2) - t.powi(2)) + four * n11 * s * t,
        b * s * (s.powi(2) - three * t.powi(2)) - a * t * (three * s.powi(2) - t.powi(2)),
    ]
}

impl<F: na::RealField + Copy> Moment<F> for MomentCInvariant<F> {
    fn name(&self) -> &'static str {
        C_INVARIANT
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[CENTERED, ALPHA]
    }

    fn update(&mut self, _object: &MomentObject<F>) {}

    fn compute(&mut self, database: &MomentDatabase<F>) -> Result<(), MomentError> {
        let centered = database.dependency::<MomentCentered<F>>(CENTERED)?;
        let alpha = database.dependency::<MomentAlpha<F>>(ALPHA)?.value();
        centered.require(C_INVARIANT, 3, 0)?;

        let mu = centered.matrix();
        let mu00 = mu[(0, 0)];
        if mu00 <= F::zero() {
            return Err(MomentError::Degenerate {
                moment: C_INVARIANT,
                reason: "object has zero mass",
            });
        }
        let spread = (mu[(2, 0)] + mu[(0, 2)]) / mu00;
        if spread <= F::zero() {
            return Err(MomentError::Degenerate {
                moment: C_INVARIANT,
                reason: "object has no second-order spread",
            });
        }

        let scale = spread.sqrt();
        let normalize = |value: F, order: usize| value / mu00 / pow(scale, order);
        let eta = |p: usize, q: usize| normalize(mu[(p, q)], p + q);

        let hu = hu_invariants(eta);
        let px = normalize(rotated_moment(mu, alpha, 3, 0), 3);
        let py = normalize(rotated_moment(mu, alpha, 0, 3), 3);

        self.values = [hu[0], hu[1], hu[2], hu[3], hu[4], hu[5], px, py];
        Ok(())
    }

    fn values(&self) -> &[F] {
        &self.values
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

    fn invariants_of(
        points: &[(f64, f64)],
        kind: ObjectKind,
    ) -> anyhow::Result<MomentCInvariant<f64>> {
        let points: Vec<_> = points.iter().map(|&(x, y)| na::Point2::new(x, y)).collect();
        let object = MomentObject::from_points(3, kind, &points)?;

        let mut db = MomentDatabase::new();
        let gravity = db.link(MomentGravityCenter::new());
        let centered = db.link(MomentCentered::new());
        let alpha = db.link(MomentAlpha::new());
        let invariant = db.link(MomentCInvariant::new());
        db.update_all(&object);
        db.compute(gravity)?;
        db.compute(centered)?;
        db.compute(alpha)?;
        db.compute(invariant)?;
        Ok(db.fetch(invariant)?.clone())
    }

    const SHAPE: [(f64, f64); 5] = [(0.0, 0.0), (1.0, 0.1), (1.4, 0.8), (0.6, 1.3), (-0.2, 0.7)];

    #[test]
    fn test_translation_and_scale_invariance() -> anyhow::Result<()> {
        for kind in [ObjectKind::Discrete, ObjectKind::DensePolygon] {
            let reference = invariants_of(&SHAPE, kind)?;
            let moved: Vec<_> = SHAPE
                .iter()
                .map(|&(x, y)| (2.5 * x - 3.0, 2.5 * y + 1.0))
                .collect();
            let moved = invariants_of(&moved, kind)?;

            for i in 0..C_INVARIANT_COUNT {
                assert_relative_eq!(
                    reference.get(i).unwrap(),
                    moved.get(i).unwrap(),
                    epsilon = 1e-9
                );
            }
        }
        Ok(())
    }

    #[test]
    fn test_hu_invariants_survive_rotation() -> anyhow::Result<()> {
        let reference = invariants_of(&SHAPE, ObjectKind::DensePolygon)?;
        let (s, c) = 0.7f64.sin_cos();
        let rotated: Vec<_> = SHAPE.iter().map(|&(x, y)| (c * x - s * y, s * x + c * y)).collect();
        let rotated = invariants_of(&rotated, ObjectKind::DensePolygon)?;

        for i in 0..6 {
            assert_relative_eq!(reference.get(i).unwrap(), rotated.get(i).unwrap(), epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_out_of_range_component() {
        assert_eq!(MomentCInvariant::<f64>::new().get(C_INVARIANT_COUNT), None);
    }

    #[test]
    fn test_needs_third_order() -> anyhow::Result<()> {
        let points = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)].map(|(x, y)| na::Point2::new(x, y));
        let object = MomentObject::from_points(2, ObjectKind::DensePolygon, &points)?;

        let mut db = MomentDatabase::new();
        let gravity = db.link(MomentGravityCenter::new());
        let centered = db.link(MomentCentered::new());
        let alpha = db.link(MomentAlpha::new());
        let invariant = db.link(MomentCInvariant::new());
        db.update_all(&object);
        db.compute(gravity)?;
        db.compute(centered)?;
        db.compute(alpha)?;
        assert_eq!(
            db.compute(invariant),
            Err(MomentError::OrderTooLow {
                moment: C_INVARIANT,
                required: 3,
                available: 2
            })
        );
        Ok(())
    }
}
