//! Type and namespace declarations
//!
//! The registry plays the role of the host's constant table: classes and
//! modules are declared with a qualified name, may be nested inside one
//! another, and classes carry the field table their instances are allowed
//! to populate.

pub mod scope;

use indexmap::IndexMap;
use std::fmt;

use crate::error::{MassError, Result};

/// Separator between the segments of a qualified name
pub const PATH_SEPARATOR: &str = "::";

/// Handle to a declaration in a [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeRef(u32);

impl TypeRef {
    /// Raw index into the registry
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// What a declaration is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Concrete, instantiable type
    Class,

    /// Namespace-only grouping; never instantiated
    Module,
}

/// A single class or module declaration.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    name: String,
    kind: TypeKind,
    fields: Vec<String>,
    constants: IndexMap<String, TypeRef>,
}

impl TypeDecl {
    /// Fully qualified name, e.g. `Foo::Bar`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class or module
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Whether instances of this declaration can exist
    pub fn is_class(&self) -> bool {
        self.kind == TypeKind::Class
    }

    /// Declared field table, in declaration order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Whether `field` is part of the field table
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Nested constants (name → declaration), in declaration order
    pub fn constants(&self) -> &IndexMap<String, TypeRef> {
        &self.constants
    }
}

/// Registry of every class and module known to a heap.
///
/// # Example
///
/// ```
/// use mass::TypeRegistry;
///
/// let mut types = TypeRegistry::new();
/// let foo = types.declare_class(None, "Foo", &["foo"]).unwrap();
/// let bar = types.declare_class(Some(foo), "Bar", &["fool"]).unwrap();
///
/// assert_eq!(types.name(bar), Some("Foo::Bar"));
/// assert_eq!(types.lookup("Foo::Bar"), Some(bar));
/// assert_eq!(types.nested(foo), vec![bar]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    decls: Vec<TypeDecl>,
    by_name: IndexMap<String, TypeRef>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Declaration
    // ═══════════════════════════════════════════════════════════════════

    /// Declare a class with the given field table.
    ///
    /// With a `parent`, the class is nested inside it and its qualified name
    /// is `Parent::Name`.
    ///
    /// # Errors
    ///
    /// - `UnknownType` if `parent` is not a declaration of this registry
    /// - `DuplicateDeclaration` if the qualified name is taken
    pub fn declare_class(
        &mut self,
        parent: Option<TypeRef>,
        name: &str,
        fields: &[&str],
    ) -> Result<TypeRef> {
        let fields = fields.iter().map(|f| f.to_string()).collect();
        self.declare(parent, name, TypeKind::Class, fields)
    }

    /// Declare a namespace-only module.
    ///
    /// # Errors
    ///
    /// Same as [`TypeRegistry::declare_class`].
    pub fn declare_module(&mut self, parent: Option<TypeRef>, name: &str) -> Result<TypeRef> {
        self.declare(parent, name, TypeKind::Module, Vec::new())
    }

    /// Bind an existing declaration under another name inside `namespace`.
    ///
    /// The target keeps its own qualified name, so scope resolution does not
    /// treat it as nested in `namespace`.
    ///
    /// # Errors
    ///
    /// - `UnknownType` if either handle is unknown
    /// - `DuplicateDeclaration` if `namespace` already has that constant
    pub fn alias(&mut self, namespace: TypeRef, name: &str, target: TypeRef) -> Result<()> {
        self.get(target)
            .ok_or_else(|| MassError::UnknownType(target.to_string()))?;
        let decl = self
            .decls
            .get_mut(namespace.index())
            .ok_or_else(|| MassError::UnknownType(namespace.to_string()))?;
        if decl.constants.contains_key(name) {
            return Err(MassError::DuplicateDeclaration(format!(
                "{}{}{}",
                decl.name, PATH_SEPARATOR, name
            )));
        }
        decl.constants.insert(name.to_string(), target);
        Ok(())
    }

    fn declare(
        &mut self,
        parent: Option<TypeRef>,
        name: &str,
        kind: TypeKind,
        fields: Vec<String>,
    ) -> Result<TypeRef> {
        let qualified = match parent {
            Some(p) => {
                let parent_name = self
                    .name(p)
                    .ok_or_else(|| MassError::UnknownType(p.to_string()))?;
                format!("{}{}{}", parent_name, PATH_SEPARATOR, name)
            }
            None => name.to_string(),
        };
        if self.by_name.contains_key(&qualified) {
            return Err(MassError::DuplicateDeclaration(qualified));
        }

        let ty = TypeRef(self.decls.len() as u32);
        self.decls.push(TypeDecl {
            name: qualified.clone(),
            kind,
            fields,
            constants: IndexMap::new(),
        });
        self.by_name.insert(qualified, ty);
        if let Some(p) = parent {
            self.decls[p.index()].constants.insert(name.to_string(), ty);
        }
        Ok(ty)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Lookup
    // ═══════════════════════════════════════════════════════════════════

    /// Get a declaration by handle.
    pub fn get(&self, ty: TypeRef) -> Option<&TypeDecl> {
        self.decls.get(ty.index())
    }

    /// Qualified name of a declaration.
    pub fn name(&self, ty: TypeRef) -> Option<&str> {
        self.get(ty).map(TypeDecl::name)
    }

    /// Find a declaration by qualified name.
    pub fn lookup(&self, name: &str) -> Option<TypeRef> {
        self.by_name.get(name).copied()
    }

    /// Declarations nested in `ty` (including aliases), in declaration order.
    ///
    /// Unknown handles have no nested declarations.
    pub fn nested(&self, ty: TypeRef) -> Vec<TypeRef> {
        self.get(ty)
            .map(|decl| decl.constants.values().copied().collect())
            .unwrap_or_default()
    }

    /// Iterate over every declaration.
    pub fn iter(&self) -> impl Iterator<Item = (TypeRef, &TypeDecl)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, decl)| (TypeRef(i as u32), decl))
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Check if nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}
