use super::backend::GaBackend;
use crate::error::{GaError, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Default)]
struct Inner {
    docs: RefCell<BTreeMap<String, String>>,
    simulate_write_error: RefCell<bool>,
    writes: RefCell<usize>,
}

/// In-memory storage backend for testing.
///
/// Clones share the same documents, so a test can keep a handle while the
/// store owns another. Uses `RefCell` since the engine is single-threaded.
#[derive(Clone, Default)]
pub struct MemBackend {
    inner: Rc<Inner>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.inner.simulate_write_error.borrow_mut() = simulate;
    }

    /// Store a raw document as-is, bypassing serialization (e.g. corrupt JSON).
    pub fn insert_raw(&self, id: &str, content: &str) {
        self.inner
            .docs
            .borrow_mut()
            .insert(id.to_string(), content.to_string());
    }

    pub fn raw(&self, id: &str) -> Option<String> {
        self.inner.docs.borrow().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.docs.borrow().contains_key(id)
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        *self.inner.writes.borrow()
    }
}

impl GaBackend for MemBackend {
    fn read(&self, id: &str) -> Result<Option<String>> {
        Ok(self.raw(id))
    }

    fn write(&self, id: &str, content: &str) -> Result<()> {
        if *self.inner.simulate_write_error.borrow() {
            return Err(GaError::Store("Simulated write error".to_string()));
        }
        self.insert_raw(id, content);
        *self.inner.writes.borrow_mut() += 1;
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<bool> {
        Ok(self.inner.docs.borrow_mut().remove(id).is_some())
    }

    fn list_ids(&self) -> Result<Vec<String>> {
        Ok(self.inner.docs.borrow().keys().cloned().collect())
    }

    fn location(&self, id: &str) -> String {
        format!("memory://ga/{}.json", id)
    }
}
