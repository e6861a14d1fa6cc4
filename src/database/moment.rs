use std::any::Any;
use std::fmt::Debug;

use nalgebra as na;

use super::{MomentDatabase, MomentError};
use crate::object::MomentObject;

/// A named computation unit living in a [MomentDatabase].
///
/// A moment goes through two steps per frame. [Moment::update] hands it the new object so it
/// can capture the raw statistics it needs, then [Moment::compute] derives its values from
/// those statistics and from peers that were already computed in the same pass.
pub trait Moment<F: na::RealField + Copy>: Debug + Any {
    /// Key under which the moment is linked. Unique per database.
    fn name(&self) -> &'static str;

    /// Names of the moments read by [Moment::compute]. The database refuses to compute this
    /// moment until every one of them is linked and fresh.
    fn dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    /// Captures the raw statistics of a new object snapshot.
    fn update(&mut self, object: &MomentObject<F>);

    /// Whether the values are final right after [Moment::update], with no compute step.
    fn is_computed_on_update(&self) -> bool {
        false
    }

    /// Derives the moment values. Peers are read through [MomentDatabase::dependency].
    fn compute(&mut self, database: &MomentDatabase<F>) -> Result<(), MomentError>;

    /// Flat view of the computed values.
    fn values(&self) -> &[F];

    fn as_any(&self) -> &dyn Any;
}
