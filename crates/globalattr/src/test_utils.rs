//! In-memory collaborators for tests.
//!
//! Every fake is a cheap handle around shared state, so a test can keep one
//! clone for assertions while the engine owns the boxed other.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::api::GaApi;
use crate::attributes::{Key, KeyType, Value, ValueBlock, ValueContent};
use crate::error::{GaError, Result};
use crate::host::{
    AttributeViews, BlockAttrs, BlockIndex, Clock, Hosts, IndexedBlock, InlineAttrs, Notifier,
};
use crate::store::{GaStore, MemBackend};
use crate::view::{AttributeView, KeyValues};

#[derive(Clone, Default)]
pub struct MemViews {
    views: Rc<RefCell<HashMap<String, AttributeView>>>,
    saves: Rc<Cell<usize>>,
}

impl MemViews {
    pub fn insert(&self, view: AttributeView) {
        self.views.borrow_mut().insert(view.id.clone(), view);
    }

    pub fn get(&self, view_id: &str) -> Option<AttributeView> {
        self.views.borrow().get(view_id).cloned()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl AttributeViews for MemViews {
    fn load_view(&self, view_id: &str) -> Result<AttributeView> {
        self.get(view_id)
            .ok_or_else(|| GaError::NotFound(format!("attribute view {}", view_id)))
    }

    fn save_view(&self, view: &AttributeView) -> Result<()> {
        self.saves.set(self.saves.get() + 1);
        self.insert(view.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemBlocks {
    attrs: Rc<RefCell<HashMap<String, InlineAttrs>>>,
    writes: Rc<Cell<usize>>,
    failing: Rc<RefCell<HashSet<String>>>,
}

impl MemBlocks {
    pub fn set(&self, block_id: &str, attrs: InlineAttrs) {
        self.attrs.borrow_mut().insert(block_id.to_string(), attrs);
    }

    pub fn set_attr(&self, block_id: &str, name: &str, value: &str) {
        self.attrs
            .borrow_mut()
            .entry(block_id.to_string())
            .or_default()
            .insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, block_id: &str) -> InlineAttrs {
        self.attrs
            .borrow()
            .get(block_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn attr(&self, block_id: &str, name: &str) -> Option<String> {
        self.get(block_id).get(name).cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Makes every later write to `block_id` fail.
    pub fn fail_writes_for(&self, block_id: &str) {
        self.failing.borrow_mut().insert(block_id.to_string());
    }
}

impl BlockAttrs for MemBlocks {
    fn attrs(&self, block_id: &str) -> Result<InlineAttrs> {
        Ok(self.get(block_id))
    }

    fn write_attrs(&self, block_id: &str, attrs: &InlineAttrs) -> Result<()> {
        if self.failing.borrow().contains(block_id) {
            return Err(GaError::Store(format!("Simulated write error for {}", block_id)));
        }
        self.writes.set(self.writes.get() + 1);
        self.set(block_id, attrs.clone());
        Ok(())
    }
}

/// Block index over a fixed set of records. Inline attributes are read from
/// the linked [`MemBlocks`] so both views of a block agree.
#[derive(Clone, Default)]
pub struct MemIndex {
    blocks: Rc<RefCell<HashMap<String, IndexedBlock>>>,
    attrs: MemBlocks,
    labels: Rc<RefCell<Vec<String>>>,
    block_calls: Rc<Cell<usize>>,
    attr_calls: Rc<Cell<usize>>,
}

impl MemIndex {
    pub fn linked(attrs: MemBlocks) -> Self {
        Self {
            attrs,
            ..Default::default()
        }
    }

    pub fn insert(&self, block: IndexedBlock) {
        self.blocks.borrow_mut().insert(block.id.clone(), block);
    }

    pub fn set_bookmark_labels(&self, labels: &[&str]) {
        *self.labels.borrow_mut() = labels.iter().map(|l| l.to_string()).collect();
    }

    pub fn block_calls(&self) -> usize {
        self.block_calls.get()
    }

    pub fn attr_calls(&self) -> usize {
        self.attr_calls.get()
    }
}

impl BlockIndex for MemIndex {
    fn blocks(&self, ids: &[String]) -> Vec<IndexedBlock> {
        self.block_calls.set(self.block_calls.get() + 1);
        let blocks = self.blocks.borrow();
        ids.iter().filter_map(|id| blocks.get(id).cloned()).collect()
    }

    fn batch_attrs(&self, ids: &[String]) -> HashMap<String, InlineAttrs> {
        self.attr_calls.set(self.attr_calls.get() + 1);
        ids.iter()
            .map(|id| (id.clone(), self.attrs.get(id)))
            .filter(|(_, attrs)| !attrs.is_empty())
            .collect()
    }

    fn bookmark_labels(&self) -> Vec<String> {
        self.labels.borrow().clone()
    }
}

/// Records the id of every key pushed to clients.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    keys: Rc<RefCell<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn notified(&self) -> Vec<String> {
        self.keys.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn key_changed(&self, key: &Key) {
        self.keys.borrow_mut().push(key.id.clone());
    }
}

/// Clock that only moves when told to.
#[derive(Clone)]
pub struct FixedClock {
    now: Rc<Cell<i64>>,
}

impl FixedClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.set(now);
    }

    pub fn advance(&self, millis: i64) {
        self.now.set(self.now.get() + millis);
    }

    pub fn get(&self) -> i64 {
        self.now.get()
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.now.get()
    }
}

/// A fully wired engine over in-memory collaborators.
pub struct TestEnv {
    pub api: GaApi<MemBackend>,
    pub backend: MemBackend,
    pub views: MemViews,
    pub blocks: MemBlocks,
    pub index: MemIndex,
    pub notifier: RecordingNotifier,
    pub clock: FixedClock,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub const START: i64 = 1_700_000_000_000;

    pub fn new() -> Self {
        let backend = MemBackend::new();
        let views = MemViews::default();
        let blocks = MemBlocks::default();
        let index = MemIndex::linked(blocks.clone());
        let notifier = RecordingNotifier::default();
        let clock = FixedClock::new(Self::START);

        let hosts = Hosts {
            views: Box::new(views.clone()),
            blocks: Box::new(blocks.clone()),
            index: Box::new(index.clone()),
            notifier: Box::new(notifier.clone()),
            clock: Box::new(clock.clone()),
        };
        let api = GaApi::new(GaStore::new(backend.clone()), hosts);

        Self {
            api,
            backend,
            views,
            blocks,
            index,
            notifier,
            clock,
        }
    }
}

/// A view with a block column `kb` plus `column`. Each row is bound to the
/// given block, or detached when `None`.
pub fn view_with_column(
    view_id: &str,
    column: Key,
    rows: &[(&str, Option<&str>)],
) -> AttributeView {
    let mut blocks = KeyValues::new(Key::new("kb", "Block", KeyType::Block));
    for (row_id, block_id) in rows {
        blocks.values.push(Value {
            id: format!("cell-{}", row_id),
            block_id: row_id.to_string(),
            kind: KeyType::Block,
            is_detached: block_id.is_none(),
            content: Some(ValueContent::Block(ValueBlock {
                id: block_id.unwrap_or_default().to_string(),
                content: String::new(),
            })),
            ..Default::default()
        });
    }
    let mut view = AttributeView::new(view_id);
    view.key_values.push(blocks);
    view.key_values.push(KeyValues::new(column));
    view
}

/// A cell of `kind` for row `row_id`.
pub fn cell(row_id: &str, kind: KeyType, content: ValueContent) -> Value {
    let mut value = Value::with_content(kind, content);
    value.id = format!("val-{}", row_id);
    value.block_id = row_id.to_string();
    value
}
