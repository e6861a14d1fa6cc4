use std::any::Any;

use nalgebra as na;

use super::names::GRAVITY;
use crate::database::{Moment, MomentDatabase, MomentError};
use crate::object::MomentObject;

/// Centroid `(m10 / m00, m01 / m00)` of the object.
#[derive(Debug, Clone)]
pub struct MomentGravityCenter<F: na::RealField + Copy> {
    /// `[m00, m10, m01]`, absent when the object is of order 0.
    raw: Option<[F; 3]>,
    available_order: usize,
    values: [F; 2],
}

impl<F: na::RealField + Copy> Default for MomentGravityCenter<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: na::RealField + Copy> MomentGravityCenter<F> {
    pub fn new() -> Self {
        Self {
            raw: None,
            available_order: 0,
            values: [F::zero(); 2],
        }
    }

    pub fn xg(&self) -> F {
        self.values[0]
    }

    pub fn yg(&self) -> F {
        self.values[1]
    }
}

impl<F: na::RealField + Copy> Moment<F> for MomentGravityCenter<F> {
    fn name(&self) -> &'static str {
        GRAVITY
    }

    fn update(&mut self, object: &MomentObject<F>) {
        self.available_order = object.order();
        self.raw = match (object.get(0, 0), object.get(1, 0), object.get(0, 1)) {
            (Some(m00), Some(m10), Some(m01)) => Some([m00, m10, m01]),
            _ => None,
        };
    }

    fn compute(&mut self, _database: &MomentDatabase<F>) -> Result<(), MomentError> {
        let [m00, m10, m01] = self.raw.ok_or(MomentError::OrderTooLow {
            moment: GRAVITY,
            required: 1,
            available: self.available_order,
        })?;

        if m00.is_zero() || !m00.is_finite() {
            return Err(MomentError::Degenerate {
                moment: GRAVITY,
                reason: "object has zero mass",
            });
        }

        self.values = [m10 / m00, m01 / m00];
        Ok(())
    }

    fn values(&self) -> &[F] {
        &self.values
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
