//! # Jack Symbol Table
//!
//! Two nested scopes: the class scope holds `static`/`field` declarations
//! and lives for the whole class; the subroutine scope holds arguments and
//! locals and resets on every subroutine. Indices are per-kind running
//! counters within their scope.

use std::collections::HashMap;

use crate::vm::parser::Segment;

/// Storage classification of a Jack identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Static,
    Field,
    Arg,
    Var,
}

impl VarKind {
    /// The VM segment this kind maps to at emission time.
    pub fn segment(self) -> Segment {
        match self {
            VarKind::Static => Segment::Static,
            VarKind::Field => Segment::This,
            VarKind::Arg => Segment::Argument,
            VarKind::Var => Segment::Local,
        }
    }
}

/// What the table knows about one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarInfo {
    pub ty: String,
    pub kind: VarKind,
    pub index: u16,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    class: HashMap<String, VarInfo>,
    subroutine: HashMap<String, VarInfo>,
    static_count: u16,
    field_count: u16,
    arg_count: u16,
    var_count: u16,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the subroutine scope; the class scope persists.
    pub fn start_subroutine(&mut self) {
        self.subroutine.clear();
        self.arg_count = 0;
        self.var_count = 0;
    }

    /// Define an identifier, assigning it the next index of its kind.
    pub fn define(&mut self, name: &str, ty: &str, kind: VarKind) -> u16 {
        let counter = match kind {
            VarKind::Static => &mut self.static_count,
            VarKind::Field => &mut self.field_count,
            VarKind::Arg => &mut self.arg_count,
            VarKind::Var => &mut self.var_count,
        };
        let index = *counter;
        *counter += 1;

        let info = VarInfo {
            ty: ty.to_string(),
            kind,
            index,
        };
        match kind {
            VarKind::Static | VarKind::Field => self.class.insert(name.to_string(), info),
            VarKind::Arg | VarKind::Var => self.subroutine.insert(name.to_string(), info),
        };
        index
    }

    /// Look up an identifier; the subroutine scope shadows the class scope.
    pub fn resolve(&self, name: &str) -> Option<&VarInfo> {
        self.subroutine.get(name).or_else(|| self.class.get(name))
    }

    /// Number of variables of `kind` defined in its scope so far.
    pub fn count(&self, kind: VarKind) -> u16 {
        match kind {
            VarKind::Static => self.static_count,
            VarKind::Field => self.field_count,
            VarKind::Arg => self.arg_count,
            VarKind::Var => self.var_count,
        }
    }
}
