use std::any::Any;

use nalgebra as na;

use super::names::BASIC;
use crate::database::{Moment, MomentDatabase, MomentError};
use crate::object::{MomentObject, ObjectKind};

/// The raw moments of the object, exactly as broadcast.
#[derive(Debug, Clone)]
pub struct MomentBasic<F: na::RealField + Copy> {
    kind: ObjectKind,
    order: usize,
    values: na::DMatrix<F>,
}

impl<F: na::RealField + Copy> Default for MomentBasic<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: na::RealField + Copy> MomentBasic<F> {
    pub fn new() -> Self {
        Self {
            kind: ObjectKind::Discrete,
            order: 0,
            values: na::DMatrix::zeros(1, 1),
        }
    }

    /// Raw moment `m(i, j)`, or `None` above the captured order.
    pub fn get(&self, i: usize, j: usize) -> Option<F> {
        i.checked_add(j)
            .is_some_and(|n| n <= self.order)
            .then(|| self.values[(i, j)])
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn order(&self) -> usize {
        self.order
    }
}

impl<F: na::RealField + Copy> Moment<F> for MomentBasic<F> {
    fn name(&self) -> &'static str {
        BASIC
    }

    fn update(&mut self, object: &MomentObject<F>) {
        self.kind = object.kind();
        self.order = object.order();
        self.values = object.values().clone();
    }

    fn is_computed_on_update(&self) -> bool {
        true
    }

    fn compute(&mut self, _database: &MomentDatabase<F>) -> Result<(), MomentError> {
        Ok(())
    }

    fn values(&self) -> &[F] {
        self.values.as_slice()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
