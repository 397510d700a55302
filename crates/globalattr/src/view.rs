//! The narrow slice of a tabular view (attribute view) the GA engine touches.
//!
//! A view is a list of columns ([`KeyValues`]); each column holds one value per
//! row, keyed by the row id in `Value::block_id`. The column of type `block`
//! says which content block each row stands for. Loading and saving views is
//! the host's job (see [`AttributeViews`](crate::host::AttributeViews)).

use serde::{Deserialize, Serialize};

use crate::attributes::{Key, KeyType, Value, ValueContent};
use crate::error::{GaError, Result};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeView {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key_values: Vec<KeyValues>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyValues {
    pub key: Key,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Value>,
}

impl KeyValues {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            values: Vec::new(),
        }
    }

    /// The cell of row `row_id`.
    pub fn value(&self, row_id: &str) -> Option<&Value> {
        self.values.iter().find(|v| v.block_id == row_id)
    }

    pub fn value_mut(&mut self, row_id: &str) -> Option<&mut Value> {
        self.values.iter_mut().find(|v| v.block_id == row_id)
    }
}

/// A row of a view and the content block it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowBinding {
    pub row_id: String,
    /// `None` for detached rows (no content block behind them).
    pub block_id: Option<String>,
}

impl AttributeView {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn key_values(&self, key_id: &str) -> Result<&KeyValues> {
        self.key_values
            .iter()
            .find(|kv| kv.key.id == key_id)
            .ok_or_else(|| self.missing_key(key_id))
    }

    pub fn key_values_mut(&mut self, key_id: &str) -> Result<&mut KeyValues> {
        let err = self.missing_key(key_id);
        self.key_values
            .iter_mut()
            .find(|kv| kv.key.id == key_id)
            .ok_or(err)
    }

    /// The primary column listing each row's block.
    pub fn block_key_values(&self) -> Option<&KeyValues> {
        self.key_values
            .iter()
            .find(|kv| kv.key.kind == KeyType::Block)
    }

    /// Every row of the view with its resolved content block.
    pub fn row_bindings(&self) -> Vec<RowBinding> {
        let Some(blocks) = self.block_key_values() else {
            return Vec::new();
        };
        blocks
            .values
            .iter()
            .filter(|v| !v.block_id.is_empty())
            .map(|v| RowBinding {
                row_id: v.block_id.clone(),
                block_id: bound_block_id(v),
            })
            .collect()
    }

    /// Content block behind `row_id`, if the row exists and is not detached.
    pub fn resolve_row_block(&self, row_id: &str) -> Option<String> {
        self.block_key_values()?
            .value(row_id)
            .and_then(bound_block_id)
    }

    fn missing_key(&self, key_id: &str) -> GaError {
        GaError::NotFound(format!("key {} in attribute view {}", key_id, self.id))
    }
}

fn bound_block_id(row: &Value) -> Option<String> {
    if row.is_detached {
        return None;
    }
    if !row.block_ref_id.is_empty() {
        return Some(row.block_ref_id.clone());
    }
    match &row.content {
        Some(ValueContent::Block(b)) if !b.id.is_empty() => Some(b.id.clone()),
        _ => None,
    }
}
