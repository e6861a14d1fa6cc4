use nalgebra as na;

use super::combinatorics::{binomial, pow};

/// Centered moment `mu'(p, q)` of the object expressed in a frame rotated by `angle`.
///
/// The rotated frame maps `(x, y)` to `(c x + s y, -s x + c y)` with `c = cos(angle)` and
/// `s = sin(angle)`, so a shape that was rotated by `angle` is brought back to its original
/// orientation. `centered` must hold every moment of order `p + q`.
pub fn rotated_moment<F: na::RealField + Copy>(
    centered: &na::DMatrix<F>,
    angle: F,
    p: usize,
    q: usize,
) -> F {
    let (s, c) = angle.sin_cos();
    let order = p + q;

    let mut value = F::zero();
    for r in 0..=p {
        for t in 0..=q {
            let coefficient = binomial::<F>(p, r)
                * binomial::<F>(q, t)
                * pow(c, r + q - t)
                * pow(s, p - r)
                * pow(-s, t);
            value += coefficient * centered[(r + t, order - r - t)];
        }
    }
    value
}
