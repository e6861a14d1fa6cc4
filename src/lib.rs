//! Interdependent geometric moments of 2D objects, as used by visual-servoing control laws.
//!
//! Moments are linked into a [MomentDatabase], which hands every new [MomentObject] to all of
//! them and computes each one from peers already computed in the same pass. The
//! [CommonDatabase] wires the usual set of moments together and updates them in dependency
//! order once per frame.

pub mod common;
pub mod database;
mod error;
pub mod math;
pub mod moments;
pub mod object;

pub use common::{
    reference_alpha, reference_mu3, reference_surface, CommonDatabase, CommonParameters,
    CommonParametersError,
};
pub use database::{Moment, MomentDatabase, MomentError, MomentHandle};
pub use error::Error;
pub use object::{MomentObject, MomentObjectError, ObjectKind};
