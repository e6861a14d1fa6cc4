mod combinatorics;
mod rotation;

pub use combinatorics::{binomial, flush_cancellation, orders, pow, THIRD_ORDER};
pub use rotation::rotated_moment;
