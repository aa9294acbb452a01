use crate::value::Value;
use std::collections::HashMap;

/// One lexical scope: its own bindings plus the scope it is nested in.
///
/// The interpreter owns the innermost scope. Entering a block moves the
/// current scope into a fresh child's `enclosing` slot and leaving it moves it
/// back out, so the chain is always acyclic and parents outlive children.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Box<Environment>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enclosing(enclosing: Environment) -> Self {
        Self {
            values: HashMap::new(),
            enclosing: Some(Box::new(enclosing)),
        }
    }

    /// Give back the enclosing scope, dropping this one.
    pub fn into_enclosing(self) -> Option<Environment> {
        self.enclosing.map(|enclosing| *enclosing)
    }

    /// Bind `name` in this scope only, overwriting any previous binding here.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.get(name) {
            Some(value.clone())
        } else if let Some(ref enclosing) = self.enclosing {
            enclosing.get(name)
        } else {
            None
        }
    }

    /// Update the nearest existing binding of `name`. Returns `false` when no
    /// scope on the chain defines it; nothing is created in that case.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            true
        } else if let Some(ref mut enclosing) = self.enclosing {
            enclosing.assign(name, value)
        } else {
            false
        }
    }

    /// Number of scopes enclosing this one.
    pub fn depth(&self) -> usize {
        self.enclosing.as_ref().map_or(0, |enclosing| enclosing.depth() + 1)
    }
}
