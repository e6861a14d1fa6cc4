mod alpha;
mod area_normalized;
mod basic;
mod c_invariant;
mod centered;
mod gravity;
mod gravity_normalized;

pub use alpha::MomentAlpha;
pub use area_normalized::MomentAreaNormalized;
pub use basic::MomentBasic;
pub use c_invariant::MomentCInvariant;
pub use centered::MomentCentered;
pub use gravity::MomentGravityCenter;
pub use gravity_normalized::MomentGravityCenterNormalized;

/// Keys under which the moments of this module link themselves into a database.
pub mod names {
    pub const BASIC: &str = "basic";
    pub const GRAVITY: &str = "gravity_center";
    pub const CENTERED: &str = "centered";
    pub const GRAVITY_NORMALIZED: &str = "gravity_center_normalized";
    pub const AREA_NORMALIZED: &str = "area_normalized";
    pub const C_INVARIANT: &str = "c_invariant";
    pub const ALPHA: &str = "alpha";
}
