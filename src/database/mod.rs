mod handle;
mod moment;

use std::collections::HashMap;

use nalgebra as na;
use thiserror::Error;
use tracing::{debug, trace};

use crate::object::MomentObject;
pub use handle::{DatabaseId, MomentHandle};
pub use moment::Moment;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MomentError {
    #[error("Moment '{0}' is not linked")]
    NotFound(String),

    #[error("Moment '{moment}' depends on '{dependency}', which is not linked")]
    MissingDependency {
        moment: &'static str,
        dependency: &'static str,
    },

    #[error("Moment '{moment}' depends on '{dependency}', which was not computed in this pass")]
    StaleDependency {
        moment: &'static str,
        dependency: &'static str,
    },

    #[error("Moment '{0}' was not computed in the current pass")]
    Stale(&'static str),

    #[error("Moment '{0}' is not of the requested type")]
    TypeMismatch(&'static str),

    #[error("Handle belongs to another database")]
    ForeignHandle,

    #[error("Moment '{0}' is being computed")]
    InProgress(&'static str),

    #[error("No object has been supplied to the database")]
    NoObject,

    #[error("Moment '{moment}' needs order {required}, the object provides {available}")]
    OrderTooLow {
        moment: &'static str,
        required: usize,
        available: usize,
    },

    #[error("Moment '{moment}' is degenerate: {reason}")]
    Degenerate {
        moment: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug)]
struct Slot<F: na::RealField + Copy> {
    name: &'static str,
    /// `None` only while the moment is detached for its own compute step.
    moment: Option<Box<dyn Moment<F>>>,
    /// Pass in which the moment was last computed successfully.
    computed: Option<u64>,
}

/// Registry of moments keyed by name.
///
/// The database owns its moments. Each call to [MomentDatabase::update_all] starts a new pass;
/// a moment is *fresh* once it has been computed in the current pass, and only fresh moments
/// can be read by peers or fetched through a handle.
#[derive(Debug)]
pub struct MomentDatabase<F: na::RealField + Copy> {
    id: DatabaseId,
    slots: Vec<Slot<F>>,
    index: HashMap<&'static str, usize>,
    object: Option<MomentObject<F>>,
    pass: u64,
}

impl<F: na::RealField + Copy> Default for MomentDatabase<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: na::RealField + Copy> MomentDatabase<F> {
    pub fn new() -> Self {
        Self {
            id: DatabaseId::next(),
            slots: Vec::new(),
            index: HashMap::new(),
            object: None,
            pass: 0,
        }
    }

    pub fn id(&self) -> DatabaseId {
        self.id
    }

    /// Registers `moment` under its name and returns the handle to its slot.
    ///
    /// Linking a name that is already present replaces the previous moment in place, so
    /// handles to that slot keep pointing at the latest moment with that name.
    pub fn link<M: Moment<F>>(&mut self, moment: M) -> MomentHandle<M> {
        let name = moment.name();
        let entry = Slot {
            name,
            moment: Some(Box::new(moment)),
            computed: None,
        };

        let slot = match self.index.get(name) {
            Some(&slot) => {
                trace!(moment = name, slot, "Replacing linked moment");
                self.slots[slot] = entry;
                slot
            }
            None => {
                let slot = self.slots.len();
                trace!(moment = name, slot, "Linking moment");
                self.slots.push(entry);
                self.index.insert(name, slot);
                slot
            }
        };

        MomentHandle::new(self.id, slot)
    }

    /// Looks up a linked moment by name.
    pub fn get(&self, name: &str) -> Option<&dyn Moment<F>> {
        self.index
            .get(name)
            .and_then(|&slot| self.slots[slot].moment.as_deref())
    }

    /// Looks up a linked moment by name and downcasts it to its concrete type.
    pub fn get_as<M: Moment<F>>(&self, name: &str) -> Option<&M> {
        self.get(name)?.as_any().downcast_ref::<M>()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names of the linked moments, in link order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|slot| slot.name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of update passes run so far.
    pub fn pass(&self) -> u64 {
        self.pass
    }

    /// Whether the named moment has been computed in the current pass.
    pub fn is_fresh(&self, name: &str) -> bool {
        self.index
            .get(name)
            .is_some_and(|&slot| self.is_slot_fresh(slot))
    }

    fn is_slot_fresh(&self, slot: usize) -> bool {
        self.object.is_some() && self.slots[slot].computed == Some(self.pass)
    }

    /// The object snapshot of the current pass.
    pub fn object(&self) -> Result<&MomentObject<F>, MomentError> {
        self.object.as_ref().ok_or(MomentError::NoObject)
    }

    /// Starts a new pass: hands `object` to every linked moment, in link order.
    ///
    /// Nothing is computed here. Moments that are final right after the update (see
    /// [Moment::is_computed_on_update]) become fresh, every other moment is stale until it is
    /// computed again.
    pub fn update_all(&mut self, object: &MomentObject<F>) {
        self.pass += 1;
        self.object = Some(object.clone());

        let pass = self.pass;
        for slot in &mut self.slots {
            slot.computed = None;
            if let Some(moment) = slot.moment.as_mut() {
                moment.update(object);
                if moment.is_computed_on_update() {
                    slot.computed = Some(pass);
                }
            }
        }

        debug!(
            pass,
            moments = self.slots.len(),
            order = object.order(),
            "Broadcast object to linked moments"
        );
    }

    /// Starts a new pass without an object, leaving every moment stale.
    ///
    /// Used when an object is rejected before it reaches the moments, so that the values of
    /// the previous pass can neither be read nor recomputed.
    pub fn invalidate(&mut self) {
        self.pass += 1;
        self.object = None;
        for slot in &mut self.slots {
            slot.computed = None;
        }
        debug!(pass = self.pass, "Invalidated linked moments");
    }

    /// Computes the moment behind `handle` from the current object and its fresh dependencies.
    ///
    /// # Errors
    /// * `MomentError::ForeignHandle` - If the handle was issued by another database
    /// * `MomentError::NoObject` - If [MomentDatabase::update_all] was never called
    /// * `MomentError::MissingDependency` / `MomentError::StaleDependency` - If a declared
    ///   dependency is absent or was not computed in the current pass
    /// * Any error raised by the moment's own computation
    pub fn compute<M>(&mut self, handle: MomentHandle<M>) -> Result<(), MomentError> {
        if handle.database != self.id {
            return Err(MomentError::ForeignHandle);
        }
        self.compute_slot(handle.slot)
    }

    /// Same as [MomentDatabase::compute], addressing the moment by name.
    pub fn compute_by_name(&mut self, name: &str) -> Result<(), MomentError> {
        match self.index.get(name) {
            Some(&slot) => self.compute_slot(slot),
            None => Err(MomentError::NotFound(name.to_string())),
        }
    }

    fn compute_slot(&mut self, slot: usize) -> Result<(), MomentError> {
        self.object()?;

        let name = self.slots[slot].name;
        let mut moment = self.slots[slot]
            .moment
            .take()
            .ok_or(MomentError::InProgress(name))?;

        let result = self
            .check_dependencies(moment.as_ref())
            .and_then(|()| moment.compute(self));

        let entry = &mut self.slots[slot];
        entry.moment = Some(moment);
        match &result {
            Ok(()) => {
                entry.computed = Some(self.pass);
                debug!(moment = name, pass = self.pass, "Computed moment");
            }
            Err(e) => {
                entry.computed = None;
                debug!(moment = name, pass = self.pass, error = %e, "Moment computation failed");
            }
        }
        result
    }

    fn check_dependencies(&self, moment: &dyn Moment<F>) -> Result<(), MomentError> {
        for &dependency in moment.dependencies() {
            let &slot = self
                .index
                .get(dependency)
                .ok_or(MomentError::MissingDependency {
                    moment: moment.name(),
                    dependency,
                })?;
            if !self.is_slot_fresh(slot) {
                return Err(MomentError::StaleDependency {
                    moment: moment.name(),
                    dependency,
                });
            }
        }
        Ok(())
    }

    /// Reads a peer from within [Moment::compute]. The peer must be linked, fresh and of type `M`.
    pub fn dependency<M: Moment<F>>(&self, name: &'static str) -> Result<&M, MomentError> {
        let &slot = self
            .index
            .get(name)
            .ok_or_else(|| MomentError::NotFound(name.to_string()))?;
        self.fresh_slot(slot)
    }

    /// Typed access to a fresh moment through the handle returned by [MomentDatabase::link].
    pub fn fetch<M: Moment<F>>(&self, handle: MomentHandle<M>) -> Result<&M, MomentError> {
        if handle.database != self.id {
            return Err(MomentError::ForeignHandle);
        }
        self.fresh_slot(handle.slot)
    }

    fn fresh_slot<M: Moment<F>>(&self, slot: usize) -> Result<&M, MomentError> {
        let entry = &self.slots[slot];
        if !self.is_slot_fresh(slot) {
            return Err(MomentError::Stale(entry.name));
        }
        entry
            .moment
            .as_deref()
            .ok_or(MomentError::InProgress(entry.name))?
            .as_any()
            .downcast_ref::<M>()
            .ok_or(MomentError::TypeMismatch(entry.name))
    }
}
