//! Symbol table for name resolution
//!
//! Scopes live in an arena owned by the table and refer to their parent by
//! index, so a scope can never outlive the scope that encloses it.

use std::collections::HashMap;

use chronovyan_diagnostics::SourceLocation;
use tracing::trace;

use crate::Type;

/// Index of a scope in the table's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub usize);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);
}

/// A symbol definition
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub declared_type: Type,
    pub initialized: bool,
    pub location: SourceLocation,
}

impl Symbol {
    pub fn variable(name: impl Into<String>, declared_type: Type, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Variable,
            declared_type,
            initialized: false,
            location,
        }
    }
}

/// Kind of symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Constant,
    Function { arity: usize },
    Type,
}

/// One lexical block
#[derive(Debug, Default)]
pub struct Scope {
    symbols: HashMap<String, Symbol>,
    parent: Option<ScopeId>,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>) -> Self {
        Self {
            symbols: HashMap::new(),
            parent,
        }
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Add a symbol; returns false if the name is already declared here
    pub fn add_symbol(&mut self, symbol: Symbol) -> bool {
        if self.symbols.contains_key(&symbol.name) {
            return false;
        }
        self.symbols.insert(symbol.name.clone(), symbol);
        true
    }

    /// Look up a name in this scope only
    pub fn lookup_symbol_in_current_scope(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Stack of nested scopes, starting with the global scope
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(None)],
            current: ScopeId::GLOBAL,
        }
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0)
    }

    pub fn is_global(&self) -> bool {
        self.current == ScopeId::GLOBAL
    }

    /// Number of scopes between the current one and the global scope
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut id = self.current;
        while let Some(parent) = self.scopes[id.0].parent {
            depth += 1;
            id = parent;
        }
        depth
    }

    /// Enter a new scope nested in the current one
    pub fn enter_scope(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(Some(self.current)));
        self.current = id;
        trace!(scope = id.0, "enter scope");
        id
    }

    /// Exit the current scope
    ///
    /// # Panics
    ///
    /// Panics when called on the global scope.
    pub fn exit_scope(&mut self) {
        let Some(parent) = self.scopes[self.current.0].parent else {
            panic!("attempted to exit the global scope");
        };
        trace!(scope = self.current.0, "exit scope");
        self.current = parent;
    }

    /// Add a symbol to the current scope; returns false on redeclaration
    pub fn add_symbol(&mut self, symbol: Symbol) -> bool {
        self.scopes[self.current.0].add_symbol(symbol)
    }

    pub fn lookup_symbol_in_current_scope(&self, name: &str) -> Option<&Symbol> {
        self.scopes[self.current.0].lookup_symbol_in_current_scope(name)
    }

    /// Look up a name, walking outward from the current scope
    pub fn lookup_symbol(&self, name: &str) -> Option<&Symbol> {
        self.find_scope(name)
            .and_then(|id| self.scopes[id.0].symbols.get(name))
    }

    pub fn lookup_symbol_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        let id = self.find_scope(name)?;
        self.scopes[id.0].symbols.get_mut(name)
    }

    fn find_scope(&self, name: &str) -> Option<ScopeId> {
        let mut id = Some(self.current);
        while let Some(scope_id) = id {
            let scope = &self.scopes[scope_id.0];
            if scope.symbols.contains_key(name) {
                return Some(scope_id);
            }
            id = scope.parent;
        }
        None
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
