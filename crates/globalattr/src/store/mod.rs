//! # Storage Layer
//!
//! Durable CRUD for [`GlobalAttribute`]s, one JSON document per GA.
//!
//! The layer is split in two:
//! 1. **Backend** ([`GaBackend`]): raw document I/O. [`FsBackend`] for disk,
//!    [`MemBackend`] for tests.
//! 2. **Store** ([`GaStore`]): parse/save semantics on top of any backend.
//!
//! ## Behavior
//!
//! - `parse` fails with [`GaError::AttrNotFound`] when the document is absent.
//! - `save` repairs `gaId`/`id` first and rejects a key without identity.
//!   Numbers must be finite: JSON has no NaN or infinity.
//! - Ids name files, so every operation rejects ids that could leave the
//!   store directory (separators, `..`, NUL).
//! - `remove` is idempotent.
//! - `list` skips (and logs) documents that fail to parse, so one corrupt file
//!   cannot hide the rest. Results are sorted by id.
//!
//! ## Storage Layout
//!
//! ```text
//! <data>/storage/ga/
//! └── {gaId}.json     # {"key": {...}, "values": [...]}
//! ```

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::{GaError, Result};
use crate::model::GlobalAttribute;

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;

pub use backend::GaBackend;
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;

/// JSON layout of saved documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveFormat {
    /// Single line.
    Compact,
    /// Tab-indented.
    #[default]
    Indented,
}

impl SaveFormat {
    pub fn from_single_line(single_line: bool) -> Self {
        if single_line {
            SaveFormat::Compact
        } else {
            SaveFormat::Indented
        }
    }
}

/// Checks that `id` is usable as a document name.
pub fn validate_doc_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(GaError::Validation("global attribute id is empty".to_string()));
    }
    if id.contains(['/', '\\', '\0']) || id.contains("..") {
        return Err(GaError::Validation(format!(
            "invalid global attribute id {:?}",
            id
        )));
    }
    Ok(())
}

pub struct GaStore<B: GaBackend> {
    backend: B,
    format: SaveFormat,
}

impl<B: GaBackend> GaStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            format: SaveFormat::default(),
        }
    }

    pub fn with_format(mut self, format: SaveFormat) -> Self {
        self.format = format;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn format(&self) -> SaveFormat {
        self.format
    }

    pub fn exists(&self, id: &str) -> Result<bool> {
        if id.is_empty() {
            return Ok(false);
        }
        validate_doc_id(id)?;
        Ok(self.backend.read(id)?.is_some())
    }

    pub fn parse(&self, id: &str) -> Result<GlobalAttribute> {
        if id.is_empty() {
            return Err(GaError::AttrNotFound(id.to_string()));
        }
        validate_doc_id(id)?;
        let raw = match self.backend.read(id) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Err(GaError::AttrNotFound(id.to_string())),
            Err(e) => {
                error!(ga_id = %id, error = %e, "read global attribute failed");
                return Err(e);
            }
        };
        serde_json::from_str(&raw).map_err(|e| {
            error!(ga_id = %id, error = %e, "unmarshal global attribute failed");
            GaError::Serialization(e)
        })
    }

    pub fn save(&self, attr: &mut GlobalAttribute) -> Result<()> {
        attr.ensure_ga_id();
        let id = attr.id().to_string();
        if id.is_empty() {
            return Err(GaError::Validation(
                "global attribute key has no id".to_string(),
            ));
        }
        validate_doc_id(&id)?;
        if let Some(value) = attr
            .values
            .iter()
            .find(|v| v.number().is_some_and(|n| !n.content.is_finite()))
        {
            return Err(GaError::Validation(format!(
                "global attribute {} has a non-finite number for block {}",
                id, value.block_id
            )));
        }

        let data = self.serialize(attr).map_err(|e| {
            error!(ga_id = %id, error = %e, "marshal global attribute failed");
            e
        })?;
        if let Err(e) = self.backend.write(&id, &data) {
            error!(ga_id = %id, error = %e, "save global attribute failed");
            return Err(e);
        }
        debug!(ga_id = %id, location = %self.backend.location(&id), "saved global attribute");
        Ok(())
    }

    /// Deletes a GA document. Absent documents are not an error.
    pub fn remove(&self, id: &str) -> Result<()> {
        if id.is_empty() {
            return Ok(());
        }
        validate_doc_id(id)?;
        if let Err(e) = self.backend.remove(id) {
            error!(ga_id = %id, error = %e, "remove global attribute failed");
            return Err(e);
        }
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<GlobalAttribute>> {
        let mut ids = self.backend.list_ids()?;
        ids.sort();

        let mut attrs = Vec::with_capacity(ids.len());
        for id in ids {
            match self.parse(&id) {
                Ok(attr) => attrs.push(attr),
                Err(e) => {
                    warn!(ga_id = %id, error = %e, "skipping unreadable global attribute");
                }
            }
        }
        Ok(attrs)
    }

    fn serialize(&self, attr: &GlobalAttribute) -> Result<String> {
        match self.format {
            SaveFormat::Compact => Ok(serde_json::to_string(attr)?),
            SaveFormat::Indented => {
                let mut buf = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
                let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
                attr.serialize(&mut ser)?;
                String::from_utf8(buf).map_err(|e| GaError::Store(e.to_string()))
            }
        }
    }
}
