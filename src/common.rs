//! Preconfigured database holding the moments used by visual-servoing control laws, and the
//! helpers that derive its construction parameters from a reference object.

use std::ops::Deref;

use nalgebra as na;
use thiserror::Error;
use tracing::{debug, warn};

use crate::database::{MomentDatabase, MomentError, MomentHandle};
use crate::math::THIRD_ORDER;
use crate::moments::names::ALPHA;
use crate::moments::{
    MomentAlpha, MomentAreaNormalized, MomentBasic, MomentCInvariant, MomentCentered,
    MomentGravityCenter, MomentGravityCenterNormalized,
};
use crate::object::{MomentObject, ObjectKind};
use crate::Error;

/// Lowest object order the common database can work with.
pub const MIN_ORDER: usize = 3;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommonParametersError {
    #[error("Reference third-order moments must have 4 components, got {0}")]
    ReferenceLength(usize),

    #[error("Parameter '{0}' is not finite")]
    NonFinite(&'static str),

    #[error("Destination surface must not be negative, got {0}")]
    NegativeSurface(f64),

    #[error("Destination depth must be positive, got {0}")]
    NonPositiveDepth(f64),
}

/// Calibration of a [CommonDatabase] to the desired pose.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonParameters<F: na::RealField + Copy> {
    /// Surface of the object at the desired pose.
    pub dst_surface: F,
    /// Third-order centered moments of the desired object, `(3,0), (2,1), (1,2), (0,3)`.
    pub ref_mu3: [F; 4],
    /// Orientation of the desired object.
    pub ref_alpha: F,
    /// Desired camera to object depth.
    pub dst_z: F,
}

impl<F: na::RealField + Copy> CommonParameters<F> {
    /// Validates and bundles the construction parameters.
    ///
    /// # Errors
    /// * `CommonParametersError::ReferenceLength` - If `ref_mu3` does not hold exactly 4 values
    /// * `CommonParametersError::NonFinite` - If any value is NaN or infinite
    /// * `CommonParametersError::NegativeSurface` - If `dst_surface < 0`
    /// * `CommonParametersError::NonPositiveDepth` - If `dst_z <= 0`
    pub fn try_new(
        dst_surface: F,
        ref_mu3: &[F],
        ref_alpha: F,
        dst_z: F,
    ) -> Result<Self, CommonParametersError> {
        let ref_mu3: [F; 4] = ref_mu3
            .try_into()
            .map_err(|_| CommonParametersError::ReferenceLength(ref_mu3.len()))?;

        if !dst_surface.is_finite() {
            return Err(CommonParametersError::NonFinite("dst_surface"));
        }
        if ref_mu3.iter().any(|m| !m.is_finite()) {
            return Err(CommonParametersError::NonFinite("ref_mu3"));
        }
        if !ref_alpha.is_finite() {
            return Err(CommonParametersError::NonFinite("ref_alpha"));
        }
        if !dst_z.is_finite() {
            return Err(CommonParametersError::NonFinite("dst_z"));
        }
        if dst_surface < F::zero() {
            return Err(CommonParametersError::NegativeSurface(
                dst_surface.to_subset_unchecked(),
            ));
        }
        if dst_z <= F::zero() {
            return Err(CommonParametersError::NonPositiveDepth(
                dst_z.to_subset_unchecked(),
            ));
        }

        Ok(Self {
            dst_surface,
            ref_mu3,
            ref_alpha,
            dst_z,
        })
    }

    /// Derives the parameters from the object seen at the desired pose.
    pub fn from_reference(object: &MomentObject<F>, dst_z: F) -> Result<Self, Error> {
        let dst_surface = reference_surface(object)?;
        let ref_mu3 = reference_mu3(object)?;
        let ref_alpha = reference_alpha(object)?;
        Ok(Self::try_new(dst_surface, &ref_mu3, ref_alpha, dst_z)?)
    }
}

/// A [MomentDatabase] pre-filled with the basic, gravity center, centered, normalized gravity
/// center, normalized area, C-invariant and alpha moments.
///
/// Unlike a plain database it knows the dependencies between its moments, so
/// [CommonDatabase::update_all] both broadcasts the object and computes everything in order.
///
/// # Example
/// ```rust
/// use momentdb::{CommonDatabase, CommonParameters, MomentObject, ObjectKind};
/// use nalgebra::Point2;
///
/// let vertices =
///     [(-1.0, -1.0), (2.0, -0.5), (1.5, 1.5), (-0.5, 1.0)].map(|(x, y)| Point2::new(x, y));
/// let object = MomentObject::from_points(5, ObjectKind::DensePolygon, &vertices)?;
///
/// let mut db = CommonDatabase::new(CommonParameters::from_reference(&object, 1.0)?);
/// db.update_all(&object)?;
///
/// assert!(db.get("c_invariant").is_some());
/// println!("{:?}", db.c_invariant()?.get(0));
/// # Ok::<(), momentdb::Error>(())
/// ```
#[derive(Debug)]
pub struct CommonDatabase<F: na::RealField + Copy> {
    database: MomentDatabase<F>,
    parameters: CommonParameters<F>,
    basic: MomentHandle<MomentBasic<F>>,
    gravity: MomentHandle<MomentGravityCenter<F>>,
    centered: MomentHandle<MomentCentered<F>>,
    gravity_normalized: MomentHandle<MomentGravityCenterNormalized<F>>,
    area_normalized: MomentHandle<MomentAreaNormalized<F>>,
    c_invariant: MomentHandle<MomentCInvariant<F>>,
    alpha: MomentHandle<MomentAlpha<F>>,
    valid: bool,
}

impl<F: na::RealField + Copy> CommonDatabase<F> {
    pub fn new(parameters: CommonParameters<F>) -> Self {
        let mut database = MomentDatabase::new();

        let basic = database.link(MomentBasic::new());
        let gravity = database.link(MomentGravityCenter::new());
        let centered = database.link(MomentCentered::new());
        let gravity_normalized = database.link(MomentGravityCenterNormalized::new());
        let area_normalized = database.link(MomentAreaNormalized::new(
            parameters.dst_surface,
            parameters.dst_z,
        ));
        let c_invariant = database.link(MomentCInvariant::new());
        let alpha = database.link(MomentAlpha::with_reference(
            parameters.ref_mu3,
            parameters.ref_alpha,
        ));

        Self {
            database,
            parameters,
            basic,
            gravity,
            centered,
            gravity_normalized,
            area_normalized,
            c_invariant,
            alpha,
            valid: false,
        }
    }

    pub fn parameters(&self) -> &CommonParameters<F> {
        &self.parameters
    }

    /// Whether the last [CommonDatabase::update_all] completed. Values must not be used otherwise.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Broadcasts `object` and computes every moment in dependency order:
    /// gravity center, centered, alpha, C-invariant, normalized area, normalized gravity center.
    ///
    /// The first failing step aborts the pass. The fault is logged and returned, and the
    /// database stays invalid until the next successful update.
    ///
    /// # Errors
    /// * `Error::InsufficientOrder` - If the object order is below [MIN_ORDER]
    /// * `Error::Moment` - If one of the steps fails
    pub fn update_all(&mut self, object: &MomentObject<F>) -> Result<(), Error> {
        self.valid = false;
        if object.order() < MIN_ORDER {
            warn!(order = object.order(), "Object order too low for the common database");
            self.database.invalidate();
            return Err(Error::InsufficientOrder {
                required: MIN_ORDER,
                available: object.order(),
            });
        }

        self.database.update_all(object);
        if let Err(e) = self.compute_in_order() {
            warn!(pass = self.database.pass(), error = %e, "Moment update aborted");
            return Err(e.into());
        }

        self.valid = true;
        debug!(pass = self.database.pass(), "Common moments updated");
        Ok(())
    }

    fn compute_in_order(&mut self) -> Result<(), MomentError> {
        self.database.compute(self.gravity)?;
        self.database.compute(self.centered)?;
        self.database.compute(self.alpha)?;
        self.database.compute(self.c_invariant)?;
        self.database.compute(self.area_normalized)?;
        self.database.compute(self.gravity_normalized)?;
        Ok(())
    }

    pub fn basic(&self) -> Result<&MomentBasic<F>, MomentError> {
        self.database.fetch(self.basic)
    }

    pub fn gravity(&self) -> Result<&MomentGravityCenter<F>, MomentError> {
        self.database.fetch(self.gravity)
    }

    pub fn centered(&self) -> Result<&MomentCentered<F>, MomentError> {
        self.database.fetch(self.centered)
    }

    pub fn alpha(&self) -> Result<&MomentAlpha<F>, MomentError> {
        self.database.fetch(self.alpha)
    }

    pub fn c_invariant(&self) -> Result<&MomentCInvariant<F>, MomentError> {
        self.database.fetch(self.c_invariant)
    }

    pub fn area_normalized(&self) -> Result<&MomentAreaNormalized<F>, MomentError> {
        self.database.fetch(self.area_normalized)
    }

    pub fn gravity_normalized(&self) -> Result<&MomentGravityCenterNormalized<F>, MomentError> {
        self.database.fetch(self.gravity_normalized)
    }
}

impl<F: na::RealField + Copy> Deref for CommonDatabase<F> {
    type Target = MomentDatabase<F>;

    fn deref(&self) -> &Self::Target {
        &self.database
    }
}

/// Private database holding the gravity center and centered moments of `object`, plus alpha
/// when requested, all computed for a single pass.
struct Bootstrap<F: na::RealField + Copy> {
    database: MomentDatabase<F>,
    centered: MomentHandle<MomentCentered<F>>,
    alpha: Option<MomentHandle<MomentAlpha<F>>>,
}

impl<F: na::RealField + Copy> Bootstrap<F> {
    fn run(object: &MomentObject<F>, with_alpha: bool) -> Result<Self, MomentError> {
        let mut database = MomentDatabase::new();
        let gravity = database.link(MomentGravityCenter::new());
        let centered = database.link(MomentCentered::new());
        let alpha = with_alpha.then(|| database.link(MomentAlpha::new()));

        database.update_all(object);
        database.compute(gravity)?;
        database.compute(centered)?;
        if let Some(alpha) = alpha {
            database.compute(alpha)?;
        }

        Ok(Self {
            database,
            centered,
            alpha,
        })
    }

    fn centered(&self) -> Result<&MomentCentered<F>, MomentError> {
        self.database.fetch(self.centered)
    }
}

/// Surface of an object: `mu20 + mu02` for a discrete point set, `m00` for a dense polygon.
pub fn reference_surface<F: na::RealField + Copy>(object: &MomentObject<F>) -> Result<F, Error> {
    let bootstrap = Bootstrap::run(object, false)?;
    let centered = bootstrap.centered()?;

    let surface = match object.kind() {
        ObjectKind::Discrete => {
            centered.require("surface", 2, 0)? + centered.require("surface", 0, 2)?
        }
        ObjectKind::DensePolygon => object.get(0, 0).unwrap_or_else(F::zero),
    };
    Ok(surface)
}

/// Orientation of an object, without reference disambiguation.
pub fn reference_alpha<F: na::RealField + Copy>(object: &MomentObject<F>) -> Result<F, Error> {
    let bootstrap = Bootstrap::run(object, true)?;
    let alpha = bootstrap.alpha.ok_or(MomentError::NotFound(ALPHA.to_string()))?;
    Ok(bootstrap.database.fetch(alpha)?.value())
}

/// Third-order centered moments of an object, ordered `(3,0), (2,1), (1,2), (0,3)`.
pub fn reference_mu3<F: na::RealField + Copy>(object: &MomentObject<F>) -> Result<[F; 4], Error> {
    let bootstrap = Bootstrap::run(object, false)?;
    let centered = bootstrap.centered()?;

    let mut mu3 = [F::zero(); 4];
    for (slot, &(i, j)) in mu3.iter_mut().zip(THIRD_ORDER.iter()) {
        *slot = centered.require("mu3", i, j)?;
    }
    Ok(mu3)
}
