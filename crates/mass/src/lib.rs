//! # Mass
//!
//! Identity-based reference discovery and detachment over a tracked object
//! heap.
//!
//! Mass answers two questions about a live object graph: *who holds this
//! instance?* and *can every one of those references be cut so the instance
//! becomes unreachable?* Both are answered either for the whole environment
//! or narrowed to a set of namespaces.
//!
//! ## Architecture
//!
//! - **Scope Resolver** ([`scope`]): namespace roots → concrete types
//! - **Instance Enumerator** ([`enumerate`]): types → live instances
//! - **Reference Graph Engine** ([`references`]): discovery and detachment
//! - **Host layer** ([`Heap`], [`ObjectSpace`]): the arena the engine inspects
//!
//! Only instances allocated through a [`Heap`] are visible. There is no
//! reflection over arbitrary process memory.
//!
//! ## Example
//!
//! ```
//! use mass::{Heap, TypeRegistry, Value};
//!
//! let mut types = TypeRegistry::new();
//! let foo = types.declare_class(None, "Foo", &["foo"]).unwrap();
//! let mut heap = Heap::new(types);
//!
//! let f1 = heap.alloc(foo).unwrap();
//! let f2 = heap.alloc(foo).unwrap();
//! heap.set_field(f2, "foo", Value::Object(f1)).unwrap();
//!
//! let refs = mass::references(&mut heap, Some(f1), &[]);
//! assert_eq!(refs.fields_of(f2), Some(&["foo".to_string()][..]));
//!
//! assert!(mass::detach(&mut heap, Some(f1), &[]));
//! assert!(mass::references(&mut heap, Some(f1), &[]).is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod enumerate;
pub mod error;
pub mod heap;
pub mod inspect;
pub mod references;
pub mod space;
pub mod types;
pub mod value;

// Re-export main types
pub use config::HeapConfig;
pub use enumerate::instances_within;
pub use error::{MassError, Result};
pub use heap::{Fields, Heap, HeapStats, Instance, ObjectId};
pub use inspect::{
    collect_unless_held, count, detach, detach_all, detach_scoped, detach_scoped_then,
    detach_then, get, index, print, references, report, Report, TypeCount,
};
pub use references::{find_references, Descriptor, OnDetached, ReferenceMap, Verification};
pub use space::ObjectSpace;
pub use types::{scope, TypeDecl, TypeKind, TypeRef, TypeRegistry};
pub use value::{HashableValue, Value};

/// Mass version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
