use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DATABASE_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a [MomentDatabase](super::MomentDatabase) instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatabaseId(u64);

impl DatabaseId {
    pub(crate) fn next() -> Self {
        Self(NEXT_DATABASE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Typed association between a linked moment and the database slot that owns it.
///
/// Returned by [MomentDatabase::link](super::MomentDatabase::link). It holds no reference to
/// the moment, it only says where to find it.
pub struct MomentHandle<M> {
    pub(crate) database: DatabaseId,
    pub(crate) slot: usize,
    _moment: PhantomData<fn() -> M>,
}

impl<M> MomentHandle<M> {
    pub(crate) fn new(database: DatabaseId, slot: usize) -> Self {
        Self {
            database,
            slot,
            _moment: PhantomData,
        }
    }

    pub fn database(&self) -> DatabaseId {
        self.database
    }
}

impl<M> Clone for MomentHandle<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for MomentHandle<M> {}

impl<M> PartialEq for MomentHandle<M> {
    fn eq(&self, other: &Self) -> bool {
        self.database == other.database && self.slot == other.slot
    }
}

impl<M> Debug for MomentHandle<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MomentHandle")
            .field("database", &self.database)
            .field("slot", &self.slot)
            .finish()
    }
}
