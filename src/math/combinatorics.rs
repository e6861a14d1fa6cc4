use itertools::iproduct;
use nalgebra as na;

/// Third-order index pairs `(i, j)` ordered by decreasing power of the first axis.
///
/// This is the layout of reference third-order moments everywhere in the crate:
/// `(3,0), (2,1), (1,2), (0,3)`.
pub const THIRD_ORDER: [(usize, usize); 4] = [(3, 0), (2, 1), (1, 2), (0, 3)];

/// Relative magnitude below which a sum of moment terms is treated as cancelled out.
const CANCELLATION_TOLERANCE: f64 = 1e-12;

/// Binomial coefficient `C(n, k)` as a scalar of type `F`.
///
/// Returns zero when `k > n`.
pub fn binomial<F: na::RealField + Copy>(n: usize, k: usize) -> F {
    if k > n {
        return F::zero();
    }
    let k = k.min(n - k);

    // Multiplying before dividing keeps every intermediate value integral.
    (0..k).fold(F::one(), |acc, i| {
        acc * na::convert::<f64, F>((n - i) as f64) / na::convert::<f64, F>((i + 1) as f64)
    })
}

/// All index pairs `(i, j)` with `i + j <= order`, in row-major order.
pub fn orders(order: usize) -> impl Iterator<Item = (usize, usize)> {
    iproduct!(0..=order, 0..=order).filter(move |&(i, j)| i + j <= order)
}

/// Integer power of a scalar, `x^n` with `0^0 = 1`.
pub fn pow<F: na::RealField + Copy>(x: F, n: usize) -> F {
    x.powi(n as i32)
}

/// Flushes `sum` to exactly zero when it is only floating point residue of terms whose
/// absolute values add up to `magnitude`.
pub fn flush_cancellation<F: na::RealField + Copy>(sum: F, magnitude: F) -> F {
    if sum.abs() <= na::convert::<f64, F>(CANCELLATION_TOLERANCE) * magnitude {
        F::zero()
    } else {
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_binomial_small_values() {
        assert_relative_eq!(binomial::<f64>(0, 0), 1.0);
        assert_relative_eq!(binomial::<f64>(3, 1), 3.0);
        assert_relative_eq!(binomial::<f64>(4, 2), 6.0);
        assert_relative_eq!(binomial::<f64>(5, 5), 1.0);
        assert_relative_eq!(binomial::<f64>(10, 3), 120.0);
    }

    #[test]
    fn test_binomial_out_of_range() {
        assert_eq!(binomial::<f64>(2, 3), 0.0);
    }

    #[test]
    fn test_orders_cover_triangle() {
        let pairs: Vec<_> = orders(2).collect();
        assert_eq!(
            pairs,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (2, 0)]
        );
        assert_eq!(orders(3).count(), 10);
        assert!(orders(3).all(|(i, j)| i + j <= 3));
    }

    #[test]
    fn test_third_order_sums_to_three() {
        assert!(THIRD_ORDER.iter().all(|&(i, j)| i + j == 3));
        assert_eq!(THIRD_ORDER[0], (3, 0));
        assert_eq!(THIRD_ORDER[3], (0, 3));
    }

    #[test]
    fn test_pow_zero_exponent() {
        assert_eq!(pow(0.0f64, 0), 1.0);
        assert_eq!(pow(-2.0f64, 3), -8.0);
    }

    #[test]
    fn test_flush_cancellation() {
        assert_eq!(flush_cancellation(1e-17f64, 0.36), 0.0);
        assert_eq!(flush_cancellation(0.25f64, 0.36), 0.25);
        assert_eq!(flush_cancellation(0.0f64, 0.0), 0.0);
    }
}
