//! Attribute values.
//!
//! A [`Value`] is one instantiation of a [`Key`](super::Key) for one block.
//! The typed payload lives in [`ValueContent`], a sum type with one variant per
//! storage slot. It is flattened next to the envelope fields so the JSON looks
//! like the tabular-view format: `{"type": "text", "text": {"content": "..."}}`.
//! A cleared value keeps its `type` and carries no slot at all.

use super::key::KeyType;
use serde::{Deserialize, Serialize};

/// Fixed-point rendering with trailing zeros and a trailing dot removed.
pub fn format_number(n: f64) -> String {
    let s = format!("{:.6}", n);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "keyID", default, skip_serializing_if = "String::is_empty")]
    pub key_id: String,
    /// Row id when the value sits in a tabular view.
    #[serde(rename = "blockID", default, skip_serializing_if = "String::is_empty")]
    pub block_id: String,
    /// The bound content block.
    #[serde(rename = "blockRefID", default, skip_serializing_if = "String::is_empty")]
    pub block_ref_id: String,
    #[serde(rename = "type", default)]
    pub kind: KeyType,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_detached: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_render_auto_fill: bool,
    #[serde(flatten)]
    pub content: Option<ValueContent>,
}

impl Value {
    /// A value of `kind` with the type-appropriate empty payload.
    pub fn empty(kind: KeyType) -> Self {
        Self {
            kind,
            content: ValueContent::empty_for(kind),
            ..Default::default()
        }
    }

    pub fn with_content(kind: KeyType, content: ValueContent) -> Self {
        Self {
            kind,
            content: Some(content),
            ..Default::default()
        }
    }

    /// Drops every payload slot, keeping identity and timestamps.
    pub fn clear_content(&mut self) {
        self.content = None;
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Bumps `updated_at`; `created_at` is filled in when still unset.
    pub fn touch(&mut self, now: i64) {
        if self.created_at == 0 {
            self.created_at = now;
        }
        self.updated_at = now;
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(ValueContent::Text(t))
            | Some(ValueContent::Url(t))
            | Some(ValueContent::Email(t))
            | Some(ValueContent::Phone(t))
            | Some(ValueContent::Template(t)) => Some(&t.content),
            _ => None,
        }
    }

    pub fn selects(&self) -> &[ValueSelect] {
        match &self.content {
            Some(ValueContent::Selects(s)) => s,
            _ => &[],
        }
    }

    pub fn number(&self) -> Option<&ValueNumber> {
        match &self.content {
            Some(ValueContent::Number(n)) => Some(n),
            _ => None,
        }
    }

    pub fn date(&self) -> Option<&ValueDate> {
        match &self.content {
            Some(ValueContent::Date(d)) => Some(d),
            _ => None,
        }
    }

    pub fn checked(&self) -> Option<bool> {
        match &self.content {
            Some(ValueContent::Checkbox(c)) => Some(c.checked),
            _ => None,
        }
    }
}

/// Typed payload of a value. The variant names double as the JSON slot names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueContent {
    #[serde(rename = "block")]
    Block(ValueBlock),
    #[serde(rename = "text")]
    Text(ValueText),
    #[serde(rename = "number")]
    Number(ValueNumber),
    #[serde(rename = "date")]
    Date(ValueDate),
    /// Shared by `select` and `mSelect` keys.
    #[serde(rename = "mSelect")]
    Selects(Vec<ValueSelect>),
    #[serde(rename = "url")]
    Url(ValueText),
    #[serde(rename = "email")]
    Email(ValueText),
    #[serde(rename = "phone")]
    Phone(ValueText),
    #[serde(rename = "mAsset")]
    Assets(Vec<ValueAsset>),
    #[serde(rename = "template")]
    Template(ValueText),
    #[serde(rename = "created")]
    Created(ValueDate),
    #[serde(rename = "updated")]
    Updated(ValueDate),
    #[serde(rename = "checkbox")]
    Checkbox(ValueCheckbox),
    #[serde(rename = "relation")]
    Relation(ValueRelation),
    #[serde(rename = "rollup")]
    Rollup(ValueRollup),
}

impl ValueContent {
    /// Empty payload for a freshly bound block. `lineNumber` has no slot.
    pub fn empty_for(kind: KeyType) -> Option<Self> {
        let content = match kind {
            KeyType::Block => ValueContent::Block(ValueBlock::default()),
            KeyType::Text => ValueContent::Text(ValueText::default()),
            KeyType::Number => ValueContent::Number(ValueNumber::default()),
            KeyType::Date => ValueContent::Date(ValueDate::default()),
            KeyType::Select | KeyType::MultiSelect => ValueContent::Selects(Vec::new()),
            KeyType::Url => ValueContent::Url(ValueText::default()),
            KeyType::Email => ValueContent::Email(ValueText::default()),
            KeyType::Phone => ValueContent::Phone(ValueText::default()),
            KeyType::Asset => ValueContent::Assets(Vec::new()),
            KeyType::Template => ValueContent::Template(ValueText::default()),
            KeyType::Created => ValueContent::Created(ValueDate::default()),
            KeyType::Updated => ValueContent::Updated(ValueDate::default()),
            KeyType::Checkbox => ValueContent::Checkbox(ValueCheckbox::default()),
            KeyType::Relation => ValueContent::Relation(ValueRelation::default()),
            KeyType::Rollup => ValueContent::Rollup(ValueRollup::default()),
            KeyType::LineNumber => return None,
        };
        Some(content)
    }

    pub fn text(content: impl Into<String>) -> Self {
        ValueContent::Text(ValueText::new(content))
    }

    pub fn number(n: f64) -> Self {
        ValueContent::Number(ValueNumber::new(n))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueText {
    #[serde(default)]
    pub content: String,
}

impl ValueText {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueBlock {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueNumber {
    #[serde(default)]
    pub content: f64,
    #[serde(default)]
    pub is_not_empty: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    #[serde(default)]
    pub formatted_content: String,
}

impl ValueNumber {
    /// A non-empty number with its formatted rendering.
    pub fn new(content: f64) -> Self {
        Self {
            content,
            is_not_empty: true,
            format: String::new(),
            formatted_content: format_number(content),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueDate {
    /// Epoch millis.
    #[serde(default)]
    pub content: i64,
    #[serde(default)]
    pub is_not_empty: bool,
    #[serde(default)]
    pub has_end_date: bool,
    #[serde(default)]
    pub is_not_time: bool,
    #[serde(default)]
    pub content2: i64,
    #[serde(default)]
    pub is_not_empty2: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub formatted_content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValueSelect {
    pub content: String,
    #[serde(default)]
    pub color: String,
}

impl ValueSelect {
    pub fn new(content: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValueAsset {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValueCheckbox {
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValueRelation {
    #[serde(rename = "blockIDs", default)]
    pub block_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueRollup {
    #[serde(default)]
    pub contents: Vec<Value>,
}
