use std::any::Any;

use nalgebra as na;

use super::names::{AREA_NORMALIZED, BASIC, CENTERED};
use super::{MomentBasic, MomentCentered};
use crate::database::{Moment, MomentDatabase, MomentError};
use crate::object::{MomentObject, ObjectKind};

/// Depth-equivalent scale `an = dst_z * sqrt(dst_surface / a)`.
///
/// `a` is the current surface: `mu20 + mu02` for discrete objects, `m00` for dense ones.
#[derive(Debug, Clone)]
pub struct MomentAreaNormalized<F: na::RealField + Copy> {
    desired_surface: F,
    desired_depth: F,
    value: [F; 1],
}

impl<F: na::RealField + Copy> MomentAreaNormalized<F> {
    pub fn new(desired_surface: F, desired_depth: F) -> Self {
        Self {
            desired_surface,
            desired_depth,
            value: [F::zero()],
        }
    }

    pub fn value(&self) -> F {
        self.value[0]
    }

    pub fn desired_surface(&self) -> F {
        self.desired_surface
    }

    pub fn desired_depth(&self) -> F {
        self.desired_depth
    }
}

impl<F: na::RealField + Copy> Moment<F> for MomentAreaNormalized<F> {
    fn name(&self) -> &'static str {
        AREA_NORMALIZED
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[BASIC, CENTERED]
    }

    fn update(&mut self, _object: &MomentObject<F>) {}

    fn compute(&mut self, database: &MomentDatabase<F>) -> Result<(), MomentError> {
        let basic = database.dependency::<MomentBasic<F>>(BASIC)?;
        let surface = match basic.kind() {
            ObjectKind::Discrete => {
                let centered = database.dependency::<MomentCentered<F>>(CENTERED)?;
                centered.require(AREA_NORMALIZED, 2, 0)? + centered.require(AREA_NORMALIZED, 0, 2)?
            }
            ObjectKind::DensePolygon => basic.get(0, 0).unwrap_or_else(F::zero),
        };

        if surface <= F::zero() {
            return Err(MomentError::Degenerate {
                moment: AREA_NORMALIZED,
                reason: "object has no surface",
            });
        }

        self.value = [self.desired_depth * (self.desired_surface / surface).sqrt()];
        Ok(())
    }

    fn values(&self) -> &[F] {
        &self.value
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
