//! Builtin attribute specifications.
//!
//! A builtin attribute is a virtual GA computed from the block index instead
//! of being stored. Each entry declares where its value comes from
//! ([`Source`]) and, when editable, which inline attribute an edit is written
//! back to ([`WriteBack`]).

use std::collections::HashSet;

use crate::attributes::inline::split_csv;
use crate::attributes::{
    auto_color, format_number, KeyType, SelectOption, Value, ValueContent, ValueNumber,
    ValueSelect, ValueText,
};
use crate::error::{GaError, Result};
use crate::host::{IndexedBlock, InlineAttrs};
use crate::model::GlobalAttrMeta;

/// A string field of an indexed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockField {
    Id,
    ParentId,
    RootId,
    Hash,
    Box,
    Path,
    HPath,
    Name,
    Alias,
    Memo,
    Tag,
    Content,
    FContent,
    Markdown,
    Type,
    SubType,
    Ial,
    Created,
    Updated,
}

impl BlockField {
    pub fn get<'a>(&self, block: &'a IndexedBlock) -> &'a str {
        match self {
            BlockField::Id => &block.id,
            BlockField::ParentId => &block.parent_id,
            BlockField::RootId => &block.root_id,
            BlockField::Hash => &block.hash,
            BlockField::Box => &block.box_id,
            BlockField::Path => &block.path,
            BlockField::HPath => &block.hpath,
            BlockField::Name => &block.name,
            BlockField::Alias => &block.alias,
            BlockField::Memo => &block.memo,
            BlockField::Tag => &block.tag,
            BlockField::Content => &block.content,
            BlockField::FContent => &block.fcontent,
            BlockField::Markdown => &block.markdown,
            BlockField::Type => &block.kind,
            BlockField::SubType => &block.subtype,
            BlockField::Ial => &block.ial,
            BlockField::Created => &block.created,
            BlockField::Updated => &block.updated,
        }
    }
}

/// Where a builtin value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// An index field, verbatim.
    Field(BlockField),
    /// Content length; empty when zero.
    Length,
    /// Sort order; never empty.
    Sort,
    /// Inline attribute, falling back to an index field.
    InlineText { attr: &'static str, fallback: BlockField },
    /// Inline attribute as a single select.
    InlineSelect {
        attr: &'static str,
        fallback: Option<BlockField>,
    },
    /// Comma separated inline attribute as a multi-select.
    InlineMulti {
        attr: &'static str,
        fallback: Option<BlockField>,
    },
}

/// Inline attribute an edited value is serialized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteBack {
    Text(&'static str),
    Select(&'static str),
    MultiSelect {
        attr: &'static str,
        documents_only: bool,
    },
}

impl WriteBack {
    pub fn attr(&self) -> &'static str {
        match self {
            WriteBack::Text(attr) | WriteBack::Select(attr) => *attr,
            WriteBack::MultiSelect { attr, .. } => *attr,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuiltinSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub kind: KeyType,
    pub desc: &'static str,
    pub source: Source,
    pub write_back: Option<WriteBack>,
    /// Select options come from the current bookmark labels.
    pub bookmark_options: bool,
}

impl BuiltinSpec {
    const fn new(
        id: &'static str,
        name: &'static str,
        kind: KeyType,
        desc: &'static str,
        source: Source,
    ) -> Self {
        Self {
            id,
            name,
            icon: "",
            kind,
            desc,
            source,
            write_back: None,
            bookmark_options: false,
        }
    }

    const fn text(
        id: &'static str,
        name: &'static str,
        desc: &'static str,
        field: BlockField,
    ) -> Self {
        Self::new(id, name, KeyType::Text, desc, Source::Field(field))
    }

    const fn icon(mut self, icon: &'static str) -> Self {
        self.icon = icon;
        self
    }

    const fn writes(mut self, write_back: WriteBack) -> Self {
        self.write_back = Some(write_back);
        self
    }

    const fn bookmark_options(mut self) -> Self {
        self.bookmark_options = true;
        self
    }

    pub fn is_writable(&self) -> bool {
        self.write_back.is_some()
    }

    pub fn meta(&self, options: Vec<SelectOption>) -> GlobalAttrMeta {
        GlobalAttrMeta {
            ga_id: self.id.to_string(),
            name: self.name.to_string(),
            icon: self.icon.to_string(),
            desc: self.desc.to_string(),
            kind: self.kind,
            options,
            number_format: String::new(),
            template: String::new(),
            is_custom_attr: false,
            builtin: true,
            writable: self.is_writable(),
        }
    }

    /// Fills `value` from the index record and the block's inline attributes.
    /// Every previous payload slot is dropped first.
    pub fn hydrate(&self, value: &mut Value, block: &IndexedBlock, attrs: &InlineAttrs) {
        value.kind = self.kind;
        value.content = match self.source {
            Source::Field(field) => Some(ValueContent::Text(ValueText::new(field.get(block)))),
            Source::Length => Some(number_content(block.length, block.length != 0)),
            Source::Sort => Some(number_content(block.sort, true)),
            Source::InlineText { attr, fallback } => Some(ValueContent::Text(ValueText::new(
                attr_or(attrs, attr, fallback.get(block)),
            ))),
            Source::InlineSelect { attr, fallback } => {
                let fallback = fallback.map(|f| f.get(block)).unwrap_or_default();
                select_content(attr_or(attrs, attr, fallback))
            }
            Source::InlineMulti { attr, fallback } => {
                let items = match attrs.get(attr).filter(|v| !v.is_empty()) {
                    Some(raw) => split_csv(raw),
                    None => match fallback {
                        Some(BlockField::Tag) => split_index_tags(&block.tag),
                        Some(field) => split_csv(field.get(block)),
                        None => Vec::new(),
                    },
                };
                multi_select_content(&items)
            }
        };
    }

    /// Serializes an edited value into the inline attribute change it implies.
    ///
    /// `block` is the index record of the target block; it is only consulted
    /// for document-only attributes.
    pub fn write_back(&self, block: Option<&IndexedBlock>, value: &Value) -> Result<InlineAttrs> {
        let Some(write_back) = self.write_back else {
            return Err(GaError::Validation(format!(
                "global attribute {} is read-only",
                self.id
            )));
        };

        let content = match write_back {
            WriteBack::Text(_) => value.text().map(str::trim).unwrap_or_default().to_string(),
            WriteBack::Select(_) => value
                .selects()
                .first()
                .map(|s| s.content.trim().to_string())
                .unwrap_or_default(),
            WriteBack::MultiSelect {
                attr,
                documents_only,
            } => {
                if documents_only && !block.is_some_and(IndexedBlock::is_document) {
                    return Err(GaError::Validation(format!(
                        "global attribute {} is only writable for document blocks",
                        attr
                    )));
                }
                let contents: Vec<String> = value
                    .selects()
                    .iter()
                    .map(|s| s.content.trim().to_string())
                    .collect();
                dedup_non_empty(&contents).join(", ")
            }
        };

        let mut change = InlineAttrs::new();
        change.insert(write_back.attr().to_string(), content);
        Ok(change)
    }
}

fn attr_or<'a>(attrs: &'a InlineAttrs, name: &str, fallback: &'a str) -> &'a str {
    match attrs.get(name) {
        Some(v) if !v.is_empty() => v,
        _ => fallback,
    }
}

fn number_content(n: i64, is_not_empty: bool) -> ValueContent {
    let content = n as f64;
    ValueContent::Number(ValueNumber {
        content,
        is_not_empty,
        format: String::new(),
        formatted_content: if is_not_empty {
            format_number(content)
        } else {
            String::new()
        },
    })
}

fn select_content(raw: &str) -> Option<ValueContent> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Some(ValueContent::Selects(vec![ValueSelect::new(raw, auto_color(0))]))
}

/// Multi-select payload with palette colors by first-seen position.
pub fn multi_select_content(items: &[String]) -> Option<ValueContent> {
    let unique = dedup_non_empty(items);
    if unique.is_empty() {
        return None;
    }
    let selects = unique
        .into_iter()
        .enumerate()
        .map(|(i, item)| ValueSelect::new(item, auto_color(i)))
        .collect();
    Some(ValueContent::Selects(selects))
}

fn dedup_non_empty(items: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty() && seen.insert(item.to_string()))
        .map(str::to_string)
        .collect()
}

/// Splits the index tag form `#a# #b#` into `["a", "b"]`.
fn split_index_tags(raw: &str) -> Vec<String> {
    raw.split('#')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every builtin attribute, in catalogue order.
pub const BUILTINS: &[BuiltinSpec] = &[
    BuiltinSpec::text("id", "ID", "Block ID", BlockField::Id),
    BuiltinSpec::text("parentId", "Parent ID", "Parent block ID", BlockField::ParentId),
    BuiltinSpec::text("rootId", "Root ID", "Root block ID", BlockField::RootId),
    BuiltinSpec::text("hash", "Hash", "Content hash", BlockField::Hash),
    BuiltinSpec::text("box", "Box", "Notebook", BlockField::Box),
    BuiltinSpec::text("path", "Path", "Document path", BlockField::Path),
    BuiltinSpec::text("hPath", "HPath", "Human-readable path", BlockField::HPath),
    BuiltinSpec::new(
        "name",
        "Name",
        KeyType::Select,
        "Name",
        Source::InlineSelect {
            attr: "name",
            fallback: Some(BlockField::Name),
        },
    )
    .icon("iconN")
    .writes(WriteBack::Select("name")),
    BuiltinSpec::new(
        "alias",
        "Alias",
        KeyType::MultiSelect,
        "Alias",
        Source::InlineMulti {
            attr: "alias",
            fallback: Some(BlockField::Alias),
        },
    )
    .icon("iconA")
    .writes(WriteBack::MultiSelect {
        attr: "alias",
        documents_only: false,
    }),
    BuiltinSpec::new(
        "memo",
        "Memo",
        KeyType::Text,
        "Memo",
        Source::InlineText {
            attr: "memo",
            fallback: BlockField::Memo,
        },
    )
    .icon("iconM")
    .writes(WriteBack::Text("memo")),
    BuiltinSpec::new(
        "bookmark",
        "Bookmark",
        KeyType::Select,
        "Bookmark",
        Source::InlineSelect {
            attr: "bookmark",
            fallback: None,
        },
    )
    .icon("iconBookmark")
    .writes(WriteBack::Select("bookmark"))
    .bookmark_options(),
    BuiltinSpec::new(
        "tag",
        "Tag",
        KeyType::MultiSelect,
        "Tags",
        Source::InlineMulti {
            attr: "tags",
            fallback: Some(BlockField::Tag),
        },
    )
    .icon("iconTags")
    .writes(WriteBack::MultiSelect {
        attr: "tags",
        documents_only: true,
    }),
    BuiltinSpec::text("content", "Content", "Raw content", BlockField::Content),
    BuiltinSpec::text("fcontent", "FContent", "First child content", BlockField::FContent),
    BuiltinSpec::text("markdown", "Markdown", "Markdown content", BlockField::Markdown),
    BuiltinSpec::new("length", "Length", KeyType::Number, "Content length", Source::Length),
    BuiltinSpec::text("type", "Type", "Block type", BlockField::Type),
    BuiltinSpec::text("subType", "Subtype", "Block subtype", BlockField::SubType),
    BuiltinSpec::text("ial", "IAL", "Inline attribute list", BlockField::Ial),
    BuiltinSpec::new("sort", "Sort", KeyType::Number, "Sort order", Source::Sort),
    BuiltinSpec::text("created", "Created", "Created time", BlockField::Created),
    BuiltinSpec::text("updated", "Updated", "Updated time", BlockField::Updated),
];

/// Look up a builtin spec by id.
pub fn get_spec(id: &str) -> Option<&'static BuiltinSpec> {
    BUILTINS.iter().find(|spec| spec.id == id)
}
