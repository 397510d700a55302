//! Collaborators the engine calls into.
//!
//! The document tree, the block index, view persistence and client push are
//! owned by the hosting application. Each concern is a small trait; an engine
//! receives them bundled in [`Hosts`].

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::attributes::Key;
use crate::error::{GaError, Result};
use crate::view::AttributeView;

/// Inline attributes of one block, by attribute name.
pub type InlineAttrs = BTreeMap<String, String>;

/// Block type code of document blocks.
pub const DOCUMENT_BLOCK_TYPE: &str = "d";

/// A block record as cached by the block index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedBlock {
    pub id: String,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub root_id: String,
    #[serde(default)]
    pub hash: String,
    #[serde(rename = "box", default)]
    pub box_id: String,
    #[serde(default)]
    pub path: String,
    #[serde(rename = "hPath", default)]
    pub hpath: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub memo: String,
    /// Tags in index form: `#a# #b#`.
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub fcontent: String,
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub length: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub ial: String,
    #[serde(default)]
    pub sort: i64,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub updated: String,
}

impl IndexedBlock {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn is_document(&self) -> bool {
        self.kind == DOCUMENT_BLOCK_TYPE
    }
}

/// Tabular view persistence.
pub trait AttributeViews {
    fn load_view(&self, view_id: &str) -> Result<AttributeView>;
    fn save_view(&self, view: &AttributeView) -> Result<()>;
}

/// Inline attributes stored on blocks in the document tree.
pub trait BlockAttrs {
    fn attrs(&self, block_id: &str) -> Result<InlineAttrs>;

    /// Replaces the block's whole attribute set.
    fn write_attrs(&self, block_id: &str, attrs: &InlineAttrs) -> Result<()>;

    /// Applies `changes` on top of the current set. Empty values remove the
    /// attribute. Returns the previous set.
    fn update_attrs(&self, block_id: &str, changes: &InlineAttrs) -> Result<InlineAttrs> {
        let old = self.attrs(block_id)?;
        let mut new = old.clone();
        for (name, value) in changes {
            if value.is_empty() {
                new.remove(name);
            } else {
                new.insert(name.clone(), value.clone());
            }
        }
        self.write_attrs(block_id, &new)?;
        Ok(old)
    }
}

/// Read-only lookups against the block index.
pub trait BlockIndex {
    /// Records for the given ids. Unknown ids are absent from the result.
    fn blocks(&self, ids: &[String]) -> Vec<IndexedBlock>;

    /// Inline attributes for the given ids, keyed by block id.
    fn batch_attrs(&self, ids: &[String]) -> HashMap<String, InlineAttrs>;

    fn block(&self, id: &str) -> Option<IndexedBlock> {
        self.blocks(&[id.to_string()]).into_iter().next()
    }

    /// Currently known bookmark labels, in display order.
    fn bookmark_labels(&self) -> Vec<String>;
}

/// Schema-change push to clients.
pub trait Notifier {
    fn key_changed(&self, key: &Key);
}

pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Every collaborator an engine needs.
pub struct Hosts {
    pub views: Box<dyn AttributeViews>,
    pub blocks: Box<dyn BlockAttrs>,
    pub index: Box<dyn BlockIndex>,
    pub notifier: Box<dyn Notifier>,
    pub clock: Box<dyn Clock>,
}

impl Hosts {
    /// Inert collaborators for store-only tools. View and block writes fail;
    /// lookups come back empty.
    pub fn detached() -> Self {
        Self {
            views: Box::new(Detached),
            blocks: Box::new(Detached),
            index: Box::new(Detached),
            notifier: Box::new(Detached),
            clock: Box::new(SystemClock),
        }
    }
}

struct Detached;

fn not_attached(what: &str) -> GaError {
    GaError::Store(format!("{} are not attached", what))
}

impl AttributeViews for Detached {
    fn load_view(&self, _view_id: &str) -> Result<AttributeView> {
        Err(not_attached("attribute views"))
    }

    fn save_view(&self, _view: &AttributeView) -> Result<()> {
        Err(not_attached("attribute views"))
    }
}

impl BlockAttrs for Detached {
    fn attrs(&self, _block_id: &str) -> Result<InlineAttrs> {
        Ok(InlineAttrs::new())
    }

    fn write_attrs(&self, _block_id: &str, _attrs: &InlineAttrs) -> Result<()> {
        Err(not_attached("block attributes"))
    }
}

impl BlockIndex for Detached {
    fn blocks(&self, _ids: &[String]) -> Vec<IndexedBlock> {
        Vec::new()
    }

    fn batch_attrs(&self, _ids: &[String]) -> HashMap<String, InlineAttrs> {
        HashMap::new()
    }

    fn bookmark_labels(&self) -> Vec<String> {
        Vec::new()
    }
}

impl Notifier for Detached {
    fn key_changed(&self, _key: &Key) {}
}
