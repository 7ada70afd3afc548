//! The host-runtime seam
//!
//! Everything the scope resolver, enumerator and reference engine need from
//! the environment they inspect. [`Heap`] is the in-crate implementation;
//! other arenas can plug in by implementing this trait.

use crate::enumerate;
use crate::error::Result;
use crate::heap::{Heap, Instance, ObjectId};
use crate::types::{TypeRef, TypeRegistry};

/// A live, enumerable object space.
pub trait ObjectSpace {
    /// Type and namespace declarations.
    fn types(&self) -> &TypeRegistry;

    /// Every live instance, in a stable order.
    fn live_instances(&self) -> Vec<ObjectId>;

    /// Live instances whose exact type is `ty`.
    fn live_instances_of(&self, ty: TypeRef) -> Vec<ObjectId>;

    /// Request a reclamation pass. Returns how many instances went away.
    fn reclaim(&mut self) -> usize;

    /// Look up a live instance by identity.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for identities that are not live.
    fn lookup(&self, id: ObjectId) -> Result<&Instance>;

    /// Mutable lookup of a live instance.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for identities that are not live.
    fn lookup_mut(&mut self, id: ObjectId) -> Result<&mut Instance>;

    /// Candidate instances for reference queries within `roots`.
    ///
    /// The default enumerates everything in scope after a reclamation pass.
    /// Spaces that can cheaply narrow the candidates (for example from an
    /// index of which types can hold which) may override this.
    fn reference_instances(&mut self, roots: &[TypeRef]) -> Vec<ObjectId> {
        enumerate::instances_within(self, roots)
    }

    /// Qualified type name of a live instance, if any.
    fn type_name_of(&self, id: ObjectId) -> Option<&str> {
        let ty = self.lookup(id).ok()?.type_ref();
        self.types().name(ty)
    }
}

impl ObjectSpace for Heap {
    fn types(&self) -> &TypeRegistry {
        Heap::types(self)
    }

    fn live_instances(&self) -> Vec<ObjectId> {
        self.iter().map(Instance::id).collect()
    }

    fn live_instances_of(&self, ty: TypeRef) -> Vec<ObjectId> {
        self.iter()
            .filter(|instance| instance.type_ref() == ty)
            .map(Instance::id)
            .collect()
    }

    fn reclaim(&mut self) -> usize {
        self.collect()
    }

    fn lookup(&self, id: ObjectId) -> Result<&Instance> {
        self.instance(id)
    }

    fn lookup_mut(&mut self, id: ObjectId) -> Result<&mut Instance> {
        self.instance_mut(id)
    }
}
