//! The tracked object heap
//!
//! An arena of generation-stamped slots. Every instance created through
//! [`Heap::alloc`] is enumerable; nothing else is. Callers keep instances
//! alive by holding them (`alloc` hands out the first hold); everything not
//! reachable from a held instance is swept by [`Heap::collect`].

mod collect;
mod instance;

pub use instance::{Fields, Instance};

use serde::{Serialize, Serializer};
use std::fmt;
use tracing::{debug, trace};

use crate::config::HeapConfig;
use crate::error::{MassError, Result};
use crate::types::{TypeRef, TypeRegistry};
use crate::value::Value;

/// Identity of a heap instance.
///
/// Two identities are equal only if they name the same slot in the same
/// generation, so a handle to a reclaimed instance never matches whatever
/// later reuses its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    generation: u32,
    index: u32,
}

impl ObjectId {
    /// Packed numeric form, stable for the lifetime of the instance.
    pub fn as_u64(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.index)
    }

    /// Rebuild an identity from its packed numeric form.
    pub fn from_u64(raw: u64) -> Self {
        Self {
            generation: (raw >> 32) as u32,
            index: raw as u32,
        }
    }

    pub(crate) fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u64())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.as_u64())
    }
}

/// Running totals kept by a heap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Instances ever allocated
    pub allocated: usize,
    /// Instances swept by reclamation passes
    pub reclaimed: usize,
    /// Reclamation passes run
    pub collections: usize,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    holds: u32,
    instance: Option<Instance>,
}

/// Arena of live instances plus the type registry describing them.
///
/// # Example
///
/// ```
/// use mass::{Heap, TypeRegistry, Value};
///
/// let mut types = TypeRegistry::new();
/// let node = types.declare_class(None, "Node", &["next"]).unwrap();
///
/// let mut heap = Heap::new(types);
/// let a = heap.alloc(node).unwrap();
/// let b = heap.alloc(node).unwrap();
/// heap.set_field(a, "next", Value::Object(b)).unwrap();
///
/// // b stays alive through a after its own hold is released
/// heap.release(b).unwrap();
/// heap.collect();
/// assert!(heap.is_live(b));
///
/// heap.release(a).unwrap();
/// heap.collect();
/// assert!(heap.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Heap {
    types: TypeRegistry,
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    config: HeapConfig,
    stats: HeapStats,
}

impl Heap {
    /// Create an empty heap over a type registry.
    pub fn new(types: TypeRegistry) -> Self {
        Self::with_config(types, HeapConfig::default())
    }

    /// Create an empty heap with explicit configuration.
    pub fn with_config(types: TypeRegistry, config: HeapConfig) -> Self {
        Self {
            types,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            config,
            stats: HeapStats::default(),
        }
    }

    /// The type registry.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Mutable access to the type registry, for late declarations.
    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    /// Active configuration.
    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    /// Running totals.
    pub fn stats(&self) -> &HeapStats {
        &self.stats
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if no instance is live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    // ═══════════════════════════════════════════════════════════════════
    // Allocation and Holds
    // ═══════════════════════════════════════════════════════════════════

    /// Allocate an instance of a class with no fields set.
    ///
    /// The caller receives the instance's first hold. When the configured
    /// instance cap is reached a reclamation pass runs before giving up.
    ///
    /// # Errors
    ///
    /// - `UnknownType` if `ty` is not declared
    /// - `NotInstantiable` if `ty` is a module
    /// - `HeapExhausted` if the cap is still reached after reclamation
    pub fn alloc(&mut self, ty: TypeRef) -> Result<ObjectId> {
        let decl = self
            .types
            .get(ty)
            .ok_or_else(|| MassError::UnknownType(ty.to_string()))?;
        if !decl.is_class() {
            return Err(MassError::NotInstantiable(decl.name().to_string()));
        }

        if !self.config.has_room_for(self.live) {
            self.collect();
            if !self.config.has_room_for(self.live) {
                return Err(MassError::HeapExhausted {
                    max: self.config.max_instances,
                });
            }
        }

        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = ObjectId {
            generation: slot.generation,
            index,
        };
        slot.holds = 1;
        slot.instance = Some(Instance::new(id, ty));

        self.live += 1;
        self.stats.allocated += 1;
        trace!(%id, %ty, "allocated instance");
        Ok(id)
    }

    /// Add a hold on a live instance.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the instance is not live.
    pub fn hold(&mut self, id: ObjectId) -> Result<()> {
        let slot = self.live_slot_mut(id)?;
        slot.holds += 1;
        Ok(())
    }

    /// Drop a hold on a live instance.
    ///
    /// Returns `true` when this call dropped the last hold. The instance
    /// survives as long as another instance references it; with
    /// [`HeapConfig::reclaim_on_release`] a reclamation pass runs right away.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the instance is not live.
    pub fn release(&mut self, id: ObjectId) -> Result<bool> {
        let slot = self.live_slot_mut(id)?;
        if slot.holds == 0 {
            return Ok(false);
        }
        slot.holds -= 1;
        let last = slot.holds == 0;

        if last {
            debug!(%id, "last hold released");
            if self.config.reclaim_on_release {
                self.collect();
            }
        }
        Ok(last)
    }

    /// Number of holds on an instance (0 for dead identities).
    pub fn holds(&self, id: ObjectId) -> u32 {
        self.slot(id).map_or(0, |slot| slot.holds)
    }

    /// Check if an identity names a live instance.
    pub fn is_live(&self, id: ObjectId) -> bool {
        self.slot(id).is_some()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Instance Access
    // ═══════════════════════════════════════════════════════════════════

    /// Look up a live instance by identity.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the instance was never allocated or has been
    /// reclaimed.
    pub fn instance(&self, id: ObjectId) -> Result<&Instance> {
        self.slot(id)
            .and_then(|slot| slot.instance.as_ref())
            .ok_or(MassError::NotFound(id))
    }

    /// Mutable lookup of a live instance by identity.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the instance is not live.
    pub fn instance_mut(&mut self, id: ObjectId) -> Result<&mut Instance> {
        self.live_slot_mut(id)?
            .instance
            .as_mut()
            .ok_or(MassError::NotFound(id))
    }

    /// Set a field declared in the instance's field table.
    ///
    /// Returns the previous value, if the field was set.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the instance is not live
    /// - `UnknownField` if the type does not declare `name`
    pub fn set_field(
        &mut self,
        id: ObjectId,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        let ty = self.instance(id)?.type_ref();
        let decl = self
            .types
            .get(ty)
            .ok_or_else(|| MassError::UnknownType(ty.to_string()))?;
        if !decl.has_field(name) {
            return Err(MassError::UnknownField {
                field: name.to_string(),
                type_name: decl.name().to_string(),
            });
        }
        Ok(self.instance_mut(id)?.set(name, value.into()))
    }

    /// Read a field of a live instance.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the instance is not live.
    pub fn get_field(&self, id: ObjectId, name: &str) -> Result<Option<&Value>> {
        Ok(self.instance(id)?.field(name))
    }

    /// Qualified type name of a live instance.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the instance is not live.
    pub fn type_name(&self, id: ObjectId) -> Result<&str> {
        let ty = self.instance(id)?.type_ref();
        self.types
            .name(ty)
            .ok_or_else(|| MassError::UnknownType(ty.to_string()))
    }

    /// Iterate over live instances in arena order.
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.slots.iter().filter_map(|slot| slot.instance.as_ref())
    }

    fn slot(&self, id: ObjectId) -> Option<&Slot> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation && slot.instance.is_some())
    }

    fn live_slot_mut(&mut self, id: ObjectId) -> Result<&mut Slot> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation && slot.instance.is_some())
            .ok_or(MassError::NotFound(id))
    }
}
