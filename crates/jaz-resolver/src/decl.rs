//! The declaration model: semantic entities produced by resolution.
//!
//! Declarations live in a [`DeclArena`] and reference one another by
//! [`DeclId`]; scopes and tree nodes refer to declarations the same way, so
//! there are no ownership cycles anywhere in the model.

use jaz_common::Modifiers;
use jaz_parser::{NodeId, Primitive};
use smallvec::SmallVec;

use crate::category;
use crate::context::UnitId;
use crate::scope::ScopeId;

/// Handle of a declaration within the run's [`DeclArena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct DeclId(pub u32);

impl DeclId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Backlink from a declaration to the syntax that declared it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SourceRef {
    pub unit: UnitId,
    pub node: NodeId,
}

/// A resolved type signature, used for field types and method signatures
/// once Pass 1 has resolved the declared type names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeSig {
    Void,
    Prim(Primitive),
    Named(DeclId),
    Array(Box<TypeSig>),
}

impl TypeSig {
    /// The named type at the core of this signature, if any.
    pub fn named(&self) -> Option<DeclId> {
        match self {
            TypeSig::Named(id) => Some(*id),
            TypeSig::Array(elem) => elem.named(),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSig {
    pub params: Vec<TypeSig>,
    pub ret: TypeSig,
}

#[derive(Clone, Debug)]
pub struct TypeDecl {
    /// `category::CLASS` or `category::INTERFACE`.
    pub category: u16,
    /// Enclosing package or outer type.
    pub container: Option<DeclId>,
    /// Declaring syntax; absent until the type's source has been loaded
    /// (placeholders) and always absent for synthesized built-ins.
    pub source: Option<SourceRef>,
    /// Where the placeholder's source can be loaded from, when known.
    pub source_file: Option<std::path::PathBuf>,
    /// Resolved by Pass 1 sub-pass A (classes only).
    pub superclass: Option<DeclId>,
    pub interfaces: SmallVec<[DeclId; 4]>,
    /// Member scope; built at most once, lazily, by Pass 0 or bootstrap.
    pub scope: Option<ScopeId>,
}

#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub container: DeclId,
    pub source: Option<SourceRef>,
    /// Resolved by Pass 1 sub-pass A.
    pub ty: Option<TypeSig>,
}

#[derive(Clone, Debug)]
pub struct MethodDecl {
    pub container: DeclId,
    pub source: Option<SourceRef>,
    pub is_constructor: bool,
    /// Resolved by Pass 1 sub-pass A.
    pub sig: Option<MethodSig>,
    /// Resolved declared-throws set.
    pub throws: Vec<DeclId>,
    /// The single superclass method this one overrides.
    pub overrides: Option<DeclId>,
    /// Methods in subtypes that override this one.
    pub overridden_by: Vec<DeclId>,
    /// Interface methods this method implements.
    pub implements: Vec<DeclId>,
}

#[derive(Clone, Debug)]
pub enum DeclKind {
    Package {
        parent: Option<DeclId>,
        /// Built lazily from the search path or the built-in registry.
        scope: Option<ScopeId>,
    },
    Type(TypeDecl),
    Field(FieldDecl),
    Method(MethodDecl),
    Local {
        source: SourceRef,
        ty: Option<TypeSig>,
    },
    Param {
        source: SourceRef,
        ty: Option<TypeSig>,
    },
    Label {
        /// The labeled statement the label names.
        source: SourceRef,
    },
}

#[derive(Clone, Debug)]
pub struct Decl {
    pub name: String,
    pub modifiers: Modifiers,
    pub kind: DeclKind,
}

impl Decl {
    pub fn category(&self) -> u16 {
        match &self.kind {
            DeclKind::Package { .. } => category::PACKAGE,
            DeclKind::Type(t) => t.category,
            DeclKind::Field(_) => category::FIELD,
            DeclKind::Method(m) => {
                if m.is_constructor {
                    category::CONSTRUCTOR
                } else {
                    category::METHOD
                }
            }
            DeclKind::Local { .. } => category::LOCAL_VAR,
            DeclKind::Param { .. } => category::PARAMETER,
            DeclKind::Label { .. } => category::LABEL,
        }
    }

    pub fn as_type(&self) -> Option<&TypeDecl> {
        match &self.kind {
            DeclKind::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodDecl> {
        match &self.kind {
            DeclKind::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_private(&self) -> bool {
        self.modifiers.contains(Modifiers::PRIVATE)
    }
}

/// Owning arena for all declarations of one resolution run.
#[derive(Debug, Default)]
pub struct DeclArena {
    decls: Vec<Decl>,
}

impl DeclArena {
    pub fn new() -> DeclArena {
        DeclArena::default()
    }

    pub fn alloc(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    pub fn get(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn get_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.index()]
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn name(&self, id: DeclId) -> &str {
        &self.get(id).name
    }

    /// Dotted qualified name of a package or type declaration, walking
    /// container links. Inner types are joined with '.'.
    pub fn qualified_name(&self, id: DeclId) -> String {
        let decl = self.get(id);
        let container = match &decl.kind {
            DeclKind::Package { parent, .. } => *parent,
            DeclKind::Type(t) => t.container,
            DeclKind::Field(f) => Some(f.container),
            DeclKind::Method(m) => Some(m.container),
            _ => None,
        };
        match container {
            Some(c) if !self.get(c).name.is_empty() => {
                format!("{}.{}", self.qualified_name(c), decl.name)
            }
            _ => decl.name.clone(),
        }
    }

    pub fn type_decl(&self, id: DeclId) -> &TypeDecl {
        self.get(id)
            .as_type()
            .unwrap_or_else(|| panic!("declaration {} is not a type", self.name(id)))
    }

    pub fn type_decl_mut(&mut self, id: DeclId) -> &mut TypeDecl {
        match &mut self.get_mut(id).kind {
            DeclKind::Type(t) => t,
            _ => panic!("declaration is not a type"),
        }
    }

    pub fn method_decl(&self, id: DeclId) -> &MethodDecl {
        self.get(id)
            .as_method()
            .unwrap_or_else(|| panic!("declaration {} is not a method", self.name(id)))
    }

    pub fn method_decl_mut(&mut self, id: DeclId) -> &mut MethodDecl {
        match &mut self.get_mut(id).kind {
            DeclKind::Method(m) => m,
            _ => panic!("declaration is not a method"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_names_walk_containers() {
        let mut arena = DeclArena::new();
        let root = arena.alloc(Decl {
            name: String::new(),
            modifiers: Modifiers::empty(),
            kind: DeclKind::Package {
                parent: None,
                scope: None,
            },
        });
        let java = arena.alloc(Decl {
            name: "java".into(),
            modifiers: Modifiers::empty(),
            kind: DeclKind::Package {
                parent: Some(root),
                scope: None,
            },
        });
        let lang = arena.alloc(Decl {
            name: "lang".into(),
            modifiers: Modifiers::empty(),
            kind: DeclKind::Package {
                parent: Some(java),
                scope: None,
            },
        });
        let object = arena.alloc(Decl {
            name: "Object".into(),
            modifiers: Modifiers::PUBLIC,
            kind: DeclKind::Type(TypeDecl {
                category: category::CLASS,
                container: Some(lang),
                source: None,
                source_file: None,
                superclass: None,
                interfaces: SmallVec::new(),
                scope: None,
            }),
        });
        assert_eq!(arena.qualified_name(object), "java.lang.Object");
        assert_eq!(arena.get(object).category(), category::CLASS);
    }

    #[test]
    fn array_signature_named_core() {
        let inner = TypeSig::Array(Box::new(TypeSig::Named(DeclId(7))));
        assert_eq!(inner.named(), Some(DeclId(7)));
        assert_eq!(TypeSig::Prim(Primitive::Int).named(), None);
    }
}
