use thiserror::Error;
use tracing::trace;

use std::collections::HashMap;

use crate::value::Value;

#[cfg(test)]
pub mod test;

/// Number of scope hops from the current scope to the scope that declares
/// a name. Resolved while parsing, replayed while executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScopeHandle(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("'{0}' is not declared in this scope")]
    Undeclared(String),
}

#[derive(Debug)]
struct Scope<T> {
    bindings: HashMap<String, T>,
    parent: Option<usize>,
}

/// Stack of lexical scopes. Each scope links to the scope it is nested in,
/// which is normally the one below it; a function call links its scope to
/// the scope that holds the function instead.
#[derive(Debug)]
pub struct SymbolTable<T> {
    scopes: Vec<Scope<T>>,
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SymbolTable<T> {
    /// Creates a table holding only the root scope.
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope {
                bindings: HashMap::new(),
                parent: None,
            }],
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn enter_scope(&mut self) {
        let parent = self.scopes.len() - 1;
        self.push(parent);
    }

    /// Enters a scope nested in the scope `handle` points at, hiding every
    /// scope between it and the current one.
    pub fn enter_scope_under(&mut self, handle: ScopeHandle) {
        let Some(parent) = self.index_of(handle) else {
            unreachable!("scope handle {} reaches past the root scope", handle.0);
        };
        self.push(parent);
    }

    fn push(&mut self, parent: usize) {
        self.scopes.push(Scope {
            bindings: HashMap::new(),
            parent: Some(parent),
        });
        trace!(depth = self.scopes.len(), parent, "entered scope");
    }

    /// Drops the innermost scope with all its bindings. The root stays.
    pub fn leave_scope(&mut self) {
        assert!(self.scopes.len() > 1, "the root scope is never left");
        self.scopes.pop();
        trace!(depth = self.scopes.len(), "left scope");
    }

    fn current(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Visible scope indices, innermost first.
    fn chain(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(self.current()), |&index| self.scopes[index].parent)
    }

    fn index_of(&self, handle: ScopeHandle) -> Option<usize> {
        self.chain().nth(handle.0)
    }

    /// Binds `name` in the innermost scope. Callers check
    /// [`SymbolTable::is_declared_in_scope`] first.
    pub fn declare(&mut self, name: impl Into<String>, value: T) {
        let current = self.current();
        let previous = self.scopes[current].bindings.insert(name.into(), value);
        debug_assert!(previous.is_none(), "redeclared a name in one scope");
    }

    /// Overwrites the nearest visible binding of `name`.
    pub fn update(&mut self, name: &str, value: T) -> Result<(), ScopeError> {
        let handle = self
            .resolve(name)
            .ok_or_else(|| ScopeError::Undeclared(name.to_string()))?;
        self.update_at(handle, name, value)
    }

    pub fn update_at(
        &mut self,
        handle: ScopeHandle,
        name: &str,
        value: T,
    ) -> Result<(), ScopeError> {
        let slot = self
            .get_at_mut(handle, name)
            .ok_or_else(|| ScopeError::Undeclared(name.to_string()))?;
        *slot = value;
        Ok(())
    }

    /// Nearest visible binding of `name`.
    pub fn get(&self, name: &str) -> Result<&T, ScopeError> {
        self.chain()
            .find_map(|index| self.scopes[index].bindings.get(name))
            .ok_or_else(|| ScopeError::Undeclared(name.to_string()))
    }

    /// Hop count to the nearest scope declaring `name`.
    pub fn resolve(&self, name: &str) -> Option<ScopeHandle> {
        self.chain()
            .position(|index| self.scopes[index].bindings.contains_key(name))
            .map(ScopeHandle)
    }

    pub fn get_at(&self, handle: ScopeHandle, name: &str) -> Option<&T> {
        let index = self.index_of(handle)?;
        self.scopes[index].bindings.get(name)
    }

    pub fn get_at_mut(&mut self, handle: ScopeHandle, name: &str) -> Option<&mut T> {
        let index = self.index_of(handle)?;
        self.scopes[index].bindings.get_mut(name)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    pub fn is_declared_in_scope(&self, name: &str) -> bool {
        self.scopes[self.current()].bindings.contains_key(name)
    }
}

impl SymbolTable<Value> {
    /// Stores `value` in an existing binding, converted to the binding's
    /// declared type, and hands back what was stored.
    pub fn assign(
        &mut self,
        handle: ScopeHandle,
        name: &str,
        value: Value,
    ) -> Result<Value, ScopeError> {
        let slot = self
            .get_at_mut(handle, name)
            .ok_or_else(|| ScopeError::Undeclared(name.to_string()))?;
        let stored = value.cast(slot.data_type());
        *slot = stored.clone();
        Ok(stored)
    }
}
