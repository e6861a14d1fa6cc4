use std::any::Any;

use nalgebra as na;

use super::names::{CENTERED, GRAVITY};
use super::MomentGravityCenter;
use crate::database::{Moment, MomentDatabase, MomentError};
use crate::math::{binomial, flush_cancellation, orders, pow};
use crate::object::MomentObject;

/// Moments `mu(i, j)` taken about the gravity center, for every `i + j` up to the object order.
///
/// `mu(i, j) = sum_k sum_l C(i, k) C(j, l) (-xg)^(i-k) (-yg)^(j-l) m(k, l)`
#[derive(Debug, Clone)]
pub struct MomentCentered<F: na::RealField + Copy> {
    raw: na::DMatrix<F>,
    order: usize,
    values: na::DMatrix<F>,
}

impl<F: na::RealField + Copy> Default for MomentCentered<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: na::RealField + Copy> MomentCentered<F> {
    pub fn new() -> Self {
        Self {
            raw: na::DMatrix::zeros(1, 1),
            order: 0,
            values: na::DMatrix::zeros(1, 1),
        }
    }

    /// Centered moment `mu(i, j)`, or `None` above the object order.
    pub fn get(&self, i: usize, j: usize) -> Option<F> {
        i.checked_add(j)
            .is_some_and(|n| n <= self.order)
            .then(|| self.values[(i, j)])
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Full table of centered moments, indexed `(i, j)`.
    pub fn matrix(&self) -> &na::DMatrix<F> {
        &self.values
    }

    /// Centered moment `mu(i, j)`, failing with [MomentError::OrderTooLow] on behalf of
    /// `moment` when the object does not reach order `i + j`.
    pub(crate) fn require(
        &self,
        moment: &'static str,
        i: usize,
        j: usize,
    ) -> Result<F, MomentError> {
        self.get(i, j).ok_or(MomentError::OrderTooLow {
            moment,
            required: i.saturating_add(j),
            available: self.order,
        })
    }
}

impl<F: na::RealField + Copy> Moment<F> for MomentCentered<F> {
    fn name(&self) -> &'static str {
        CENTERED
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[GRAVITY]
    }

    fn update(&mut self, object: &MomentObject<F>) {
        self.order = object.order();
        self.raw = object.values().clone();
    }

    fn compute(&mut self, database: &MomentDatabase<F>) -> Result<(), MomentError> {
        let gravity = database.dependency::<MomentGravityCenter<F>>(GRAVITY)?;
        let (dx, dy) = (-gravity.xg(), -gravity.yg());

        let mut values = na::DMatrix::zeros(self.order + 1, self.order + 1);
        for (i, j) in orders(self.order) {
            let mut sum = F::zero();
            let mut magnitude = F::zero();
            for k in 0..=i {
                for l in 0..=j {
                    let term = binomial::<F>(i, k)
                        * binomial::<F>(j, l)
                        * pow(dx, i - k)
                        * pow(dy, j - l)
                        * self.raw[(k, l)];
                    sum += term;
                    magnitude += term.abs();
                }
            }
            values[(i, j)] = flush_cancellation(sum, magnitude);
        }

        self.values = values;
        Ok(())
    }

    fn values(&self) -> &[F] {
        self.values.as_slice()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
