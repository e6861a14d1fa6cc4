use itertools::Itertools;
use nalgebra as na;
use thiserror::Error;

use crate::math::{binomial, orders, pow};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MomentObjectError {
    #[error("Point {index} has a non-finite coordinate")]
    NonFinitePoint { index: usize },
}

/// How the points of a [MomentObject] are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// A finite set of sampled points, each contributing `x^i y^j`.
    Discrete,
    /// The filled interior of the polygon through the points.
    DensePolygon,
}

/// Raw moments `m(i, j)` of a 2D object for every `i + j <= order`.
///
/// One snapshot describes one frame. It is never mutated once built; databases copy it at
/// the start of an update pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentObject<F: na::RealField + Copy> {
    order: usize,
    kind: ObjectKind,
    values: na::DMatrix<F>,
}

impl<F: na::RealField + Copy> MomentObject<F> {
    /// An object of the given order and kind with every moment set to zero.
    pub fn new(order: usize, kind: ObjectKind) -> Self {
        Self {
            order,
            kind,
            values: na::DMatrix::zeros(order + 1, order + 1),
        }
    }

    /// Computes all raw moments up to `order` from a list of points.
    ///
    /// For [ObjectKind::DensePolygon] the points are the polygon vertices. The polygon is
    /// closed implicitly and a repeated closing vertex is ignored. Clockwise and
    /// counter-clockwise vertex lists give the same moments.
    ///
    /// # Errors
    /// * `MomentObjectError::NonFinitePoint` - If any coordinate is NaN or infinite
    pub fn from_points(
        order: usize,
        kind: ObjectKind,
        points: &[na::Point2<F>],
    ) -> Result<Self, MomentObjectError> {
        if let Some(index) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(MomentObjectError::NonFinitePoint { index });
        }

        let mut object = Self::new(order, kind);
        match kind {
            ObjectKind::Discrete => object.fill_discrete(points),
            ObjectKind::DensePolygon => object.fill_polygon(points),
        }
        Ok(object)
    }

    fn fill_discrete(&mut self, points: &[na::Point2<F>]) {
        for (i, j) in orders(self.order) {
            self.values[(i, j)] = points
                .iter()
                .fold(F::zero(), |acc, p| acc + pow(p.x, i) * pow(p.y, j));
        }
    }

    fn fill_polygon(&mut self, points: &[na::Point2<F>]) {
        let vertices = match (points.first(), points.last()) {
            (Some(first), Some(last)) if points.len() > 1 && first == last => {
                &points[..points.len() - 1]
            }
            _ => points,
        };
        if vertices.len() < 2 {
            return;
        }

        for (p, q) in orders(self.order) {
            let n = p + q;
            let normalization = na::convert::<f64, F>(((n + 2) * (n + 1)) as f64)
                * binomial::<F>(n, p);

            let mut sum = F::zero();
            for (a, b) in vertices.iter().circular_tuple_windows() {
                let cross = a.x * b.y - b.x * a.y;
                let mut edge = F::zero();
                for i in 0..=p {
                    for j in 0..=q {
                        edge += binomial::<F>(i + j, i)
                            * binomial::<F>(n - i - j, q - j)
                            * pow(a.x, i)
                            * pow(b.x, p - i)
                            * pow(a.y, j)
                            * pow(b.y, q - j);
                    }
                }
                sum += cross * edge;
            }
            self.values[(p, q)] = sum / normalization;
        }

        if self.values[(0, 0)] < F::zero() {
            self.values.neg_mut();
        }
    }

    /// Highest total order `i + j` available.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Raw moment `m(i, j)`, or `None` when `i + j` exceeds the object's order.
    pub fn get(&self, i: usize, j: usize) -> Option<F> {
        i.checked_add(j)
            .is_some_and(|n| n <= self.order)
            .then(|| self.values[(i, j)])
    }

    /// The full `(order + 1) x (order + 1)` moment table. Entries with `i + j > order` are zero.
    pub fn values(&self) -> &na::DMatrix<F> {
        &self.values
    }
}
