//! # Domain Model: Global Attributes
//!
//! A [`GlobalAttribute`] is the persisted aggregate: one [`Key`] (the schema)
//! plus the list of [`Value`]s bound to blocks. On disk it is a single JSON
//! document:
//!
//! ```text
//! {"key": {...}, "values": [{...}, ...]}
//! ```
//!
//! `values` is omitted when empty.
//!
//! ## Identity
//!
//! A GA is addressed by `key.gaId`, falling back to `key.id`. Both are kept
//! equal once persisted; [`GlobalAttribute::ensure_ga_id`] repairs whichever
//! side is missing before every save.
//!
//! ## Values
//!
//! At most one value exists per bound block (`blockRefID`). Stored values are
//! pure GA values: the view linkage fields (`keyID`, `blockID`) are cleared on
//! upsert.

use serde::{Deserialize, Serialize};

use crate::attributes::{Key, KeyType, SelectOption, Value};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GlobalAttribute {
    pub key: Key,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Value>,
}

impl GlobalAttribute {
    pub fn new(key: Key) -> Self {
        let mut attr = Self {
            key,
            values: Vec::new(),
        };
        attr.ensure_ga_id();
        attr
    }

    pub fn id(&self) -> &str {
        if self.key.ga_id.is_empty() {
            &self.key.id
        } else {
            &self.key.ga_id
        }
    }

    /// Makes `key.id` and `key.ga_id` agree, deriving the missing one.
    pub fn ensure_ga_id(&mut self) {
        if self.key.ga_id.is_empty() {
            self.key.ga_id = self.key.id.clone();
        } else if self.key.id.is_empty() {
            self.key.id = self.key.ga_id.clone();
        }
    }

    pub fn value(&self, block_id: &str) -> Option<&Value> {
        self.values.iter().find(|v| v.block_ref_id == block_id)
    }

    pub fn value_mut(&mut self, block_id: &str) -> Option<&mut Value> {
        self.values.iter_mut().find(|v| v.block_ref_id == block_id)
    }

    /// Stores a copy of `value` for `block_id`, replacing any existing entry
    /// in place. Returns false when `block_id` is empty.
    pub fn upsert_value(&mut self, block_id: &str, value: &Value) -> bool {
        if block_id.is_empty() {
            return false;
        }
        let mut stored = value.clone();
        stored.block_ref_id = block_id.to_string();
        stored.block_id.clear();
        stored.key_id.clear();

        match self.value_mut(block_id) {
            Some(existing) => *existing = stored,
            None => self.values.push(stored),
        }
        true
    }

    /// Removes the value bound to `block_id`. Returns whether one was removed.
    pub fn remove_value(&mut self, block_id: &str) -> bool {
        if block_id.is_empty() {
            return false;
        }
        match self.values.iter().position(|v| v.block_ref_id == block_id) {
            Some(idx) => {
                self.values.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn meta(&self) -> GlobalAttrMeta {
        GlobalAttrMeta::from_key(self.id(), &self.key)
    }
}

/// Schema summary returned by listing and binding operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalAttrMeta {
    pub ga_id: String,
    pub name: String,
    pub icon: String,
    pub desc: String,
    #[serde(rename = "type")]
    pub kind: KeyType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub number_format: String,
    #[serde(default)]
    pub template: String,
    pub is_custom_attr: bool,
    /// Computed from the block index rather than stored.
    #[serde(default)]
    pub builtin: bool,
    /// Edits can be written back to the block (always true for stored GAs).
    #[serde(default)]
    pub writable: bool,
}

impl GlobalAttrMeta {
    pub fn from_key(ga_id: &str, key: &Key) -> Self {
        Self {
            ga_id: ga_id.to_string(),
            name: key.name.clone(),
            icon: key.icon.clone(),
            desc: key.desc.clone(),
            kind: key.kind,
            options: key.options.clone(),
            number_format: key.number_format.clone(),
            template: key.template.clone(),
            is_custom_attr: key.is_custom_attr,
            builtin: false,
            writable: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::ValueContent;

    fn text_value(content: &str) -> Value {
        Value::with_content(KeyType::Text, ValueContent::text(content))
    }

    fn attr() -> GlobalAttribute {
        GlobalAttribute::new(Key::new("ga1", "Status", KeyType::Text))
    }

    #[test]
    fn ensure_ga_id_fills_either_side() {
        let mut a = GlobalAttribute {
            key: Key::new("x", "X", KeyType::Text),
            values: vec![],
        };
        a.ensure_ga_id();
        assert_eq!(a.key.ga_id, "x");

        let mut b = GlobalAttribute::default();
        b.key.ga_id = "y".into();
        b.ensure_ga_id();
        assert_eq!(b.key.id, "y");
        assert_eq!(b.id(), "y");
    }

    #[test]
    fn upsert_replaces_rather_than_duplicates() {
        let mut a = attr();
        assert!(a.upsert_value("b1", &text_value("first")));
        assert!(a.upsert_value("b1", &text_value("second")));

        assert_eq!(a.values.len(), 1);
        assert_eq!(a.values[0].text(), Some("second"));
        assert_eq!(a.values[0].block_ref_id, "b1");
    }

    #[test]
    fn upsert_clears_view_linkage() {
        let mut a = attr();
        let mut v = text_value("x");
        v.key_id = "col".into();
        v.block_id = "row".into();
        a.upsert_value("b1", &v);

        assert!(a.values[0].key_id.is_empty());
        assert!(a.values[0].block_id.is_empty());
    }

    #[test]
    fn upsert_keeps_position() {
        let mut a = attr();
        a.upsert_value("b1", &text_value("1"));
        a.upsert_value("b2", &text_value("2"));
        a.upsert_value("b1", &text_value("3"));
        assert_eq!(a.values[0].block_ref_id, "b1");
        assert_eq!(a.values[0].text(), Some("3"));
    }

    #[test]
    fn upsert_rejects_empty_block_id() {
        let mut a = attr();
        assert!(!a.upsert_value("", &text_value("x")));
        assert!(a.values.is_empty());
    }

    #[test]
    fn remove_value_reports_presence() {
        let mut a = attr();
        a.upsert_value("b1", &text_value("1"));
        a.upsert_value("b2", &text_value("2"));

        assert!(a.remove_value("b1"));
        assert_eq!(a.values.len(), 1);

        assert!(!a.remove_value("missing"));
        assert_eq!(a.values.len(), 1);
    }

    #[test]
    fn empty_values_are_omitted_from_json() {
        let json = serde_json::to_value(attr()).unwrap();
        assert!(json.get("values").is_none());
        assert_eq!(json["key"]["gaId"], "ga1");
    }

    #[test]
    fn meta_reflects_key() {
        let mut a = attr();
        a.key.is_custom_attr = true;
        let meta = a.meta();
        assert_eq!(meta.ga_id, "ga1");
        assert!(meta.is_custom_attr);
        assert!(meta.writable);
        assert!(!meta.builtin);
    }
}
