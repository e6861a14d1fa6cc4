use std::any::Any;

use nalgebra as na;

use super::names::{AREA_NORMALIZED, GRAVITY, GRAVITY_NORMALIZED};
use super::{MomentAreaNormalized, MomentGravityCenter};
use crate::database::{Moment, MomentDatabase, MomentError};
use crate::object::MomentObject;

/// Gravity center scaled by the depth-equivalent factor: `(an * xg, an * yg)`.
#[derive(Debug, Clone)]
pub struct MomentGravityCenterNormalized<F: na::RealField + Copy> {
    values: [F; 2],
}

impl<F: na::RealField + Copy> Default for MomentGravityCenterNormalized<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: na::RealField + Copy> MomentGravityCenterNormalized<F> {
    pub fn new() -> Self {
        Self {
            values: [F::zero(); 2],
        }
    }

    pub fn xn(&self) -> F {
        self.values[0]
    }

    pub fn yn(&self) -> F {
        self.values[1]
    }
}

impl<F: na::RealField + Copy> Moment<F> for MomentGravityCenterNormalized<F> {
    fn name(&self) -> &'static str {
        GRAVITY_NORMALIZED
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[GRAVITY, AREA_NORMALIZED]
    }

    fn update(&mut self, _object: &MomentObject<F>) {}

    fn compute(&mut self, database: &MomentDatabase<F>) -> Result<(), MomentError> {
        let gravity = database.dependency::<MomentGravityCenter<F>>(GRAVITY)?;
        let an = database
            .dependency::<MomentAreaNormalized<F>>(AREA_NORMALIZED)?
            .value();

        self.values = [an * gravity.xg(), an * gravity.yg()];
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
    use crate::moments::{MomentBasic, MomentCentered};
    use crate::object::ObjectKind;
    use approx::assert_relative_eq;

    #[test]
    fn test_scales_gravity_center_by_depth() -> anyhow::Result<()> {
        let points =
            [(0.1, 0.2), (0.3, 0.2), (0.3, 0.4), (0.1, 0.4)].map(|(x, y)| na::Point2::new(x, y));
        let object = MomentObject::from_points(2, ObjectKind::DensePolygon, &points)?;

        let mut db = MomentDatabase::new();
        db.link(MomentBasic::new());
        let gravity = db.link(MomentGravityCenter::new());
        let centered = db.link(MomentCentered::new());
        let area = db.link(MomentAreaNormalized::new(0.01, 2.0));
        let normalized = db.link(MomentGravityCenterNormalized::new());
        db.update_all(&object);

        assert_eq!(
            db.compute(normalized),
            Err(MomentError::StaleDependency {
                moment: GRAVITY_NORMALIZED,
                dependency: GRAVITY
            })
        );

        db.compute(gravity)?;
        db.compute(centered)?;
        db.compute(area)?;
        db.compute(normalized)?;

        // Area 0.04 against a desired 0.01 at depth 2 gives an = 1
        let normalized = db.fetch(normalized)?;
        assert_relative_eq!(normalized.xn(), 0.2, epsilon = 1e-12);
        assert_relative_eq!(normalized.yn(), 0.3, epsilon = 1e-12);
        Ok(())
    }
}
