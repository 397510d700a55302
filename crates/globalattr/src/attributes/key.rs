//! Attribute schemas.
//!
//! A [`Key`] describes one attribute: its type, display metadata and, for
//! select-like types, the ordered option list. The same shape is used for
//! tabular-view columns and for global attributes, which is what lets a
//! column be cloned into a fresh GA.

use crate::error::{GaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of colors in the option palette.
pub const PALETTE_SIZE: usize = 14;

/// Palette color for the option at `index`, cycling through `"1"..="14"`.
pub fn auto_color(index: usize) -> String {
    ((index % PALETTE_SIZE) + 1).to_string()
}

/// The type of an attribute.
///
/// Serialized with the tabular-view wire names (`mSelect`, `lineNumber`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KeyType {
    #[serde(rename = "block")]
    Block,
    #[default]
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "select")]
    Select,
    #[serde(rename = "mSelect")]
    MultiSelect,
    #[serde(rename = "url")]
    Url,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "phone")]
    Phone,
    #[serde(rename = "mAsset")]
    Asset,
    #[serde(rename = "template")]
    Template,
    #[serde(rename = "created")]
    Created,
    #[serde(rename = "updated")]
    Updated,
    #[serde(rename = "checkbox")]
    Checkbox,
    #[serde(rename = "relation")]
    Relation,
    #[serde(rename = "rollup")]
    Rollup,
    #[serde(rename = "lineNumber")]
    LineNumber,
}

impl KeyType {
    pub const ALL: [KeyType; 17] = [
        KeyType::Block,
        KeyType::Text,
        KeyType::Number,
        KeyType::Date,
        KeyType::Select,
        KeyType::MultiSelect,
        KeyType::Url,
        KeyType::Email,
        KeyType::Phone,
        KeyType::Asset,
        KeyType::Template,
        KeyType::Created,
        KeyType::Updated,
        KeyType::Checkbox,
        KeyType::Relation,
        KeyType::Rollup,
        KeyType::LineNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Block => "block",
            KeyType::Text => "text",
            KeyType::Number => "number",
            KeyType::Date => "date",
            KeyType::Select => "select",
            KeyType::MultiSelect => "mSelect",
            KeyType::Url => "url",
            KeyType::Email => "email",
            KeyType::Phone => "phone",
            KeyType::Asset => "mAsset",
            KeyType::Template => "template",
            KeyType::Created => "created",
            KeyType::Updated => "updated",
            KeyType::Checkbox => "checkbox",
            KeyType::Relation => "relation",
            KeyType::Rollup => "rollup",
            KeyType::LineNumber => "lineNumber",
        }
    }

    /// Whether values of this type use the select option list.
    pub fn is_select_like(&self) -> bool {
        matches!(self, KeyType::Select | KeyType::MultiSelect)
    }

    /// Whether an inline attribute string can be parsed into this type.
    pub fn accepts_inline_value(&self) -> bool {
        matches!(
            self,
            KeyType::Text
                | KeyType::Number
                | KeyType::Date
                | KeyType::Select
                | KeyType::MultiSelect
                | KeyType::Url
                | KeyType::Email
                | KeyType::Phone
                | KeyType::Checkbox
        )
    }

    /// Computed types whose stored values are never touched by inline edits.
    pub fn is_computed(&self) -> bool {
        matches!(self, KeyType::Template | KeyType::Rollup)
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = GaError;

    /// Parses a type string. The empty string means `text`; descriptive
    /// aliases such as `multi-select` are accepted next to the wire names.
    fn from_str(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Ok(KeyType::Text);
        }
        if let Some(kind) = KeyType::ALL.iter().find(|k| k.as_str() == raw) {
            return Ok(*kind);
        }
        match raw {
            "multi-select" => Ok(KeyType::MultiSelect),
            "asset" => Ok(KeyType::Asset),
            "created-time" => Ok(KeyType::Created),
            "updated-time" => Ok(KeyType::Updated),
            "line-number" => Ok(KeyType::LineNumber),
            _ => Err(GaError::Validation(format!("unsupported key type: {}", raw))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
}

impl SelectOption {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            desc: String::new(),
        }
    }
}

/// Schema of one attribute (a view column or a global attribute).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    #[serde(default)]
    pub id: String,
    /// Identifier of the GA this key belongs to or is bound to.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ga_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: KeyType,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub number_format: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub is_custom_attr: bool,
}

impl Key {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: KeyType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    /// Color of the named option, appending it with the next palette color
    /// when the key does not know it yet.
    pub fn option_color_or_insert(&mut self, name: &str) -> String {
        if let Some(opt) = self.options.iter().find(|o| o.name == name) {
            return opt.color.clone();
        }
        let color = auto_color(self.options.len());
        self.options.push(SelectOption::new(name, color.clone()));
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_color_cycles_through_palette() {
        assert_eq!(auto_color(0), "1");
        assert_eq!(auto_color(13), "14");
        assert_eq!(auto_color(14), "1");
        assert_eq!(auto_color(15), "2");
    }

    #[test]
    fn key_type_parses_wire_names_and_aliases() {
        assert_eq!("mSelect".parse::<KeyType>().unwrap(), KeyType::MultiSelect);
        assert_eq!(
            "multi-select".parse::<KeyType>().unwrap(),
            KeyType::MultiSelect
        );
        assert_eq!("created-time".parse::<KeyType>().unwrap(), KeyType::Created);
        assert_eq!("lineNumber".parse::<KeyType>().unwrap(), KeyType::LineNumber);
        assert_eq!("".parse::<KeyType>().unwrap(), KeyType::Text);
    }

    #[test]
    fn key_type_rejects_unknown_strings() {
        let err = "colour".parse::<KeyType>().unwrap_err();
        assert!(matches!(err, GaError::Validation(_)));
        assert!(err.to_string().contains("unsupported key type: colour"));
    }

    #[test]
    fn key_type_serializes_with_wire_names() {
        assert_eq!(
            serde_json::to_string(&KeyType::MultiSelect).unwrap(),
            "\"mSelect\""
        );
        assert_eq!(
            serde_json::to_string(&KeyType::LineNumber).unwrap(),
            "\"lineNumber\""
        );
    }

    #[test]
    fn key_serializes_camel_case_and_skips_empty_fields() {
        let mut key = Key::new("k1", "Status", KeyType::Select);
        key.ga_id = "k1".into();
        key.is_custom_attr = true;
        let json = serde_json::to_value(&key).unwrap();
        assert_eq!(json["gaId"], "k1");
        assert_eq!(json["type"], "select");
        assert_eq!(json["isCustomAttr"], true);
        assert!(json.get("options").is_none());
        assert!(json.get("numberFormat").is_none());
    }

    #[test]
    fn option_color_or_insert_reuses_known_options() {
        let mut key = Key::new("k", "Status", KeyType::Select);
        key.options.push(SelectOption::new("Done", "7"));

        assert_eq!(key.option_color_or_insert("Done"), "7");
        assert_eq!(key.options.len(), 1);

        assert_eq!(key.option_color_or_insert("Todo"), "2");
        assert_eq!(key.options.len(), 2);
        assert_eq!(key.options[1].name, "Todo");
    }
}
