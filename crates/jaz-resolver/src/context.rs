//! Per-run resolution state.
//!
//! All caches and arenas live in one [`ResolutionContext`] constructed
//! explicitly per run; there is no global state. Built-in declarations are
//! installed by an explicit bootstrap step in [`ResolutionContext::new`]
//! before any user code resolves.

use std::path::PathBuf;

use indexmap::IndexMap;
use jaz_common::Diagnostic;
use jaz_parser::{NodeArena, NodeId, parse_unit};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::builtins;
use crate::decl::{DeclArena, DeclId, DeclKind};
use crate::scope::{ScopeArena, ScopeId};

/// How far resolution proceeds for a compilation unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResolvePass {
    /// Pass 0: package linking and member registration.
    Package,
    /// Pass 1: class linking and inheritance fill-in (global fixpoint).
    Class,
    /// Pass 2: name, field, and jump-target resolution.
    Names,
}

impl ResolvePass {
    pub fn from_level(level: u8) -> Option<ResolvePass> {
        Some(match level {
            0 => ResolvePass::Package,
            1 => ResolvePass::Class,
            2 => ResolvePass::Names,
            _ => return None,
        })
    }
}

/// Handle of a compilation unit registered in the context.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

impl UnitId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One parsed compilation unit plus its resolution side tables.
///
/// Side tables are keyed by the raw node index; a `NodeId` is only
/// meaningful within this unit's arena.
#[derive(Debug)]
pub struct Unit {
    pub file: String,
    pub arena: NodeArena,
    pub root: NodeId,
    /// Package this unit declares into; set by Pass 0.
    pub package: Option<DeclId>,
    /// Innermost frame of the unit's import chain; set by Pass 0.
    pub file_scope: Option<ScopeId>,
    /// Frame holding single-type imports (two levels above the file scope).
    pub single_import_frame: Option<ScopeId>,
    /// Frame holding on-demand (wildcard) imports.
    pub on_demand_frame: Option<ScopeId>,
    /// Highest pass that has completed for this unit.
    pub pass_reached: Option<ResolvePass>,
    /// Set when a pass aborted mid-way; the unit must not be reused.
    pub poisoned: bool,
    /// Node index -> resolved declaration.
    resolved: FxHashMap<u32, DeclId>,
    /// Scope-introducing node index -> its scope.
    pub scope_of: FxHashMap<u32, ScopeId>,
    /// break/continue node index -> target statement node index.
    pub jump_target: FxHashMap<u32, u32>,
}

impl Unit {
    pub fn decl_of(&self, node: NodeId) -> Option<DeclId> {
        self.resolved.get(&node.0).copied()
    }

    /// Associate a node with its declaration. Idempotent: once resolved, a
    /// node's association is permanent and re-resolution is a no-op.
    pub fn set_decl(&mut self, node: NodeId, decl: DeclId) {
        self.resolved.entry(node.0).or_insert(decl);
    }

    pub fn is_resolved(&self, node: NodeId) -> bool {
        self.resolved.contains_key(&node.0)
    }

    /// All node -> declaration associations, for the ancillary visitors.
    pub fn resolved_entries(&self) -> impl Iterator<Item = (NodeId, DeclId)> + '_ {
        self.resolved.iter().map(|(&n, &d)| (NodeId(n), d))
    }

    pub fn reached(&self, pass: ResolvePass) -> bool {
        self.pass_reached.is_some_and(|p| p >= pass)
    }
}

/// Owner of every arena, cache, and search-path setting for one run.
///
/// All passes assume exclusive access; the pipeline is single-threaded by
/// design and a failed pass leaves the affected unit poisoned.
pub struct ResolutionContext {
    pub decls: DeclArena,
    pub scopes: ScopeArena,
    pub units: Vec<Unit>,
    units_by_file: IndexMap<String, UnitId>,
    /// Ordered source roots consulted when a type must be loaded on demand.
    pub search_path: Vec<PathBuf>,
    /// The unnamed root package.
    pub root_package: DeclId,
    /// Scope holding top-level packages; parent of every package scope.
    pub root_scope: ScopeId,
    /// The always-implicit built-in package (`java.lang`).
    pub java_lang: DeclId,
    /// The universal root type (`java.lang.Object`).
    pub object_type: DeclId,
    /// Built-in unchecked-exception root (`java.lang.RuntimeException`).
    pub runtime_exception: DeclId,
    /// Memo: canonical qualified type name -> declaration.
    pub loaded_types: FxHashMap<String, DeclId>,
    /// Memo: package qualified name -> declaration.
    pub(crate) packages: FxHashMap<String, DeclId>,
    /// Types Pass 1 sub-pass A has linked.
    pub(crate) class_linked: FxHashSet<DeclId>,
    /// Types Pass 1 sub-pass B has filled in (diamond guard).
    pub(crate) inheritance_done: FxHashSet<DeclId>,
}

impl ResolutionContext {
    /// Create a context and bootstrap the built-in declarations.
    pub fn new(search_path: Vec<PathBuf>) -> ResolutionContext {
        let mut decls = DeclArena::new();
        let mut scopes = ScopeArena::new();
        let root_scope = scopes.alloc(None);
        let root_package = decls.alloc(crate::decl::Decl {
            name: String::new(),
            modifiers: jaz_common::Modifiers::empty(),
            kind: DeclKind::Package {
                parent: None,
                scope: Some(root_scope),
            },
        });
        let mut ctx = ResolutionContext {
            decls,
            scopes,
            units: Vec::new(),
            units_by_file: IndexMap::new(),
            search_path,
            root_package,
            root_scope,
            // Placeholders until bootstrap runs.
            java_lang: root_package,
            object_type: root_package,
            runtime_exception: root_package,
            loaded_types: FxHashMap::default(),
            packages: FxHashMap::default(),
            class_linked: FxHashSet::default(),
            inheritance_done: FxHashSet::default(),
        };
        builtins::install(&mut ctx);
        ctx
    }

    /// Parse and register a source file. Registering the same file twice
    /// returns the existing unit.
    pub fn add_unit(&mut self, file: &str, source: &str) -> Result<UnitId, Diagnostic> {
        if let Some(&id) = self.units_by_file.get(file) {
            return Ok(id);
        }
        let parsed = parse_unit(file, source)?;
        Ok(self.register_unit(parsed.file, parsed.arena, parsed.root))
    }

    pub(crate) fn register_unit(&mut self, file: String, arena: NodeArena, root: NodeId) -> UnitId {
        let id = UnitId(self.units.len() as u32);
        tracing::debug!(file = %file, unit = id.0, "registered compilation unit");
        self.units.push(Unit {
            file: file.clone(),
            arena,
            root,
            package: None,
            file_scope: None,
            single_import_frame: None,
            on_demand_frame: None,
            pass_reached: None,
            poisoned: false,
            resolved: FxHashMap::default(),
            scope_of: FxHashMap::default(),
            jump_target: FxHashMap::default(),
        });
        self.units_by_file.insert(file, id);
        id
    }

    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id.index()]
    }

    pub fn unit_mut(&mut self, id: UnitId) -> &mut Unit {
        &mut self.units[id.index()]
    }

    pub fn unit_ids(&self) -> impl Iterator<Item = UnitId> {
        (0..self.units.len() as u32).map(UnitId)
    }

    /// Find or create the package declaration for a dotted name, creating
    /// intermediate packages as needed. An empty slice is the root package.
    pub fn get_or_create_package(&mut self, parts: &[&str]) -> DeclId {
        let mut current = self.root_package;
        let mut qualified = String::new();
        for part in parts {
            if !qualified.is_empty() {
                qualified.push('.');
            }
            qualified.push_str(part);
            if let Some(&existing) = self.packages.get(&qualified) {
                current = existing;
                continue;
            }
            let pkg = self.decls.alloc(crate::decl::Decl {
                name: (*part).to_string(),
                modifiers: jaz_common::Modifiers::empty(),
                kind: DeclKind::Package {
                    parent: Some(current),
                    scope: None,
                },
            });
            // A parent whose scope is already built must see the new child.
            if let DeclKind::Package {
                scope: Some(parent_scope),
                ..
            } = self.decls.get(current).kind
            {
                self.scopes.add(parent_scope, pkg);
            }
            self.packages.insert(qualified.clone(), pkg);
            tracing::debug!(package = %qualified, "created package declaration");
            current = pkg;
        }
        current
    }

    pub fn package_of(&self, qualified: &str) -> Option<DeclId> {
        if qualified.is_empty() {
            Some(self.root_package)
        } else {
            self.packages.get(qualified).copied()
        }
    }
}
