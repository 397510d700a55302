use crate::error::Result;

/// Abstract interface for raw GA document I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while [`GaStore`](super::GaStore) handles the "what" (parse, save, list).
pub trait GaBackend {
    /// Read the raw JSON document of a GA.
    /// Returns Ok(None) if the document does not exist.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn read(&self, id: &str) -> Result<Option<String>>;

    /// Write a GA document.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write(&self, id: &str, content: &str) -> Result<()>;

    /// Delete a GA document. Returns whether a document was removed.
    fn remove(&self, id: &str) -> Result<bool>;

    /// Ids of every stored document, in no particular order.
    fn list_ids(&self) -> Result<Vec<String>>;

    /// Human-readable location of a document (real path or virtual URI).
    fn location(&self, id: &str) -> String;
}
