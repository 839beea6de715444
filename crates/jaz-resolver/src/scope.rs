//! Chained symbol tables.
//!
//! A scope is one frame of an outward chain. Frames keep their entries in
//! insertion order and never overwrite: the same name may be added many
//! times (ambiguity is a lookup-time concern, "first inserted wins" keeps
//! every run deterministic).

use crate::decl::{DeclArena, DeclId};

/// Handle of a scope frame within the run's [`ScopeArena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    entries: Vec<DeclId>,
}

#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> ScopeArena {
        ScopeArena::default()
    }

    pub fn alloc(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent,
            entries: Vec::new(),
        });
        id
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()].parent
    }

    /// Insert a declaration into this frame. Duplicates are allowed.
    pub fn add(&mut self, scope: ScopeId, decl: DeclId) {
        self.scopes[scope.index()].entries.push(decl);
    }

    pub fn entries(&self, scope: ScopeId) -> &[DeclId] {
        &self.scopes[scope.index()].entries
    }

    /// All declarations in this frame matching name and category mask, in
    /// insertion order.
    pub fn lookup_local(
        &self,
        decls: &DeclArena,
        scope: ScopeId,
        name: &str,
        mask: u16,
    ) -> Vec<DeclId> {
        self.scopes[scope.index()]
            .entries
            .iter()
            .copied()
            .filter(|&d| decls.get(d).category() & mask != 0 && decls.name(d) == name)
            .collect()
    }

    /// Walk outward from `scope`; the first frame with any match supplies
    /// all candidates. Nearest frame wins, then first-inserted wins.
    pub fn lookup(
        &self,
        decls: &DeclArena,
        scope: ScopeId,
        name: &str,
        mask: u16,
    ) -> Option<(ScopeId, Vec<DeclId>)> {
        let mut current = Some(scope);
        while let Some(frame) = current {
            let found = self.lookup_local(decls, frame, name, mask);
            if !found.is_empty() {
                return Some((frame, found));
            }
            current = self.parent(frame);
        }
        None
    }

    /// First match walking outward, ignoring any further candidates.
    pub fn lookup_first(
        &self,
        decls: &DeclArena,
        scope: ScopeId,
        name: &str,
        mask: u16,
    ) -> Option<DeclId> {
        self.lookup(decls, scope, name, mask)
            .map(|(_, found)| found[0])
    }

    /// Render the reachable names for a lookup-failure diagnostic,
    /// innermost frame first.
    pub fn dump(&self, decls: &DeclArena, scope: ScopeId) -> String {
        let mut out = String::new();
        let mut current = Some(scope);
        let mut depth = 0;
        while let Some(frame) = current {
            let names: Vec<&str> = self.entries(frame)
                .iter()
                .map(|&d| decls.name(d))
                .collect();
            out.push_str(&format!("  frame {depth}: [{}]\n", names.join(", ")));
            current = self.parent(frame);
            depth += 1;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category;
    use crate::decl::{Decl, DeclKind, SourceRef, TypeSig};
    use crate::context::UnitId;
    use jaz_common::Modifiers;
    use jaz_parser::NodeId;

    fn local(decls: &mut DeclArena, name: &str) -> DeclId {
        decls.alloc(Decl {
            name: name.into(),
            modifiers: Modifiers::empty(),
            kind: DeclKind::Local {
                source: SourceRef {
                    unit: UnitId(0),
                    node: NodeId(0),
                },
                ty: Some(TypeSig::Void),
            },
        })
    }

    fn label(decls: &mut DeclArena, name: &str) -> DeclId {
        decls.alloc(Decl {
            name: name.into(),
            modifiers: Modifiers::empty(),
            kind: DeclKind::Label {
                source: SourceRef {
                    unit: UnitId(0),
                    node: NodeId(0),
                },
            },
        })
    }

    #[test]
    fn nearest_frame_wins() {
        let mut decls = DeclArena::new();
        let mut scopes = ScopeArena::new();
        let outer = scopes.alloc(None);
        let inner = scopes.alloc(Some(outer));
        let a_outer = local(&mut decls, "a");
        let a_inner = local(&mut decls, "a");
        scopes.add(outer, a_outer);
        scopes.add(inner, a_inner);
        assert_eq!(
            scopes.lookup_first(&decls, inner, "a", category::LOCAL_VAR),
            Some(a_inner)
        );
        assert_eq!(
            scopes.lookup_first(&decls, outer, "a", category::LOCAL_VAR),
            Some(a_outer)
        );
    }

    #[test]
    fn category_mask_filters() {
        let mut decls = DeclArena::new();
        let mut scopes = ScopeArena::new();
        let frame = scopes.alloc(None);
        let v = local(&mut decls, "x");
        let l = label(&mut decls, "x");
        scopes.add(frame, v);
        scopes.add(frame, l);
        assert_eq!(
            scopes.lookup_first(&decls, frame, "x", category::LABEL),
            Some(l)
        );
        assert_eq!(
            scopes.lookup_first(&decls, frame, "x", category::LOCAL_VAR),
            Some(v)
        );
        assert_eq!(
            scopes.lookup(&decls, frame, "x", category::FIELD),
            None
        );
    }

    #[test]
    fn first_inserted_wins_within_frame() {
        let mut decls = DeclArena::new();
        let mut scopes = ScopeArena::new();
        let frame = scopes.alloc(None);
        let first = local(&mut decls, "dup");
        let second = local(&mut decls, "dup");
        scopes.add(frame, first);
        scopes.add(frame, second);
        let (_, all) = scopes.lookup(&decls, frame, "dup", category::LOCAL_VAR).unwrap();
        assert_eq!(all, vec![first, second]);
        assert_eq!(
            scopes.lookup_first(&decls, frame, "dup", category::LOCAL_VAR),
            Some(first)
        );
    }
}
