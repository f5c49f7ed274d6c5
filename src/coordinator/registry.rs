//! Ordered worker endpoint registry
//!
//! Indices are positional routing hints, not stable identities: removing
//! an entry shifts every later index. Routing targets are always
//! recomputed modulo the current size, never trusted from a cached index.

/// Ordered collection of registered worker addresses
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    addresses: Vec<String>,
}

impl WorkerRegistry {
    /// Create a registry from the initial worker set
    pub fn new(initial: Vec<String>) -> Self {
        Self { addresses: initial }
    }

    /// Number of registered workers
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// True if no workers are registered
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Address at a positional index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.addresses.get(index).map(String::as_str)
    }

    /// Append a worker at the end of the order
    pub fn push(&mut self, address: String) {
        self.addresses.push(address);
    }

    /// Remove the worker at `index`, shifting later entries down
    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.addresses.len() {
            Some(self.addresses.remove(index))
        } else {
            None
        }
    }

    /// All addresses in registration order
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }
}
