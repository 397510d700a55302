//! # Builtin Attribute Registry
//!
//! Virtual GAs computed from block-index state. Their ids (`id`, `parentId`,
//! `tag`, `memo`, ...) are reserved: a stored GA can never shadow them, and
//! binding resolution checks this registry first.
//!
//! The registry is built once and injected into the engine; it is read-only
//! afterwards.
//!
//! ## Hydration
//!
//! [`BuiltinRegistry::hydrate_view`] fills every builtin-bound column of a
//! tabular view. Index lookups are batched: one block lookup and one inline
//! attribute lookup for all rows of the view, never one per row.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::attributes::{auto_color, Key, SelectOption, Value};
use crate::host::{BlockIndex, IndexedBlock, InlineAttrs};
use crate::ids::new_node_id;
use crate::model::GlobalAttrMeta;
use crate::view::AttributeView;

pub mod spec;

pub use spec::{get_spec, BlockField, BuiltinSpec, Source, WriteBack, BUILTINS};

pub struct BuiltinRegistry {
    specs: &'static [BuiltinSpec],
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl BuiltinRegistry {
    /// The full builtin catalogue.
    pub fn standard() -> Self {
        Self { specs: BUILTINS }
    }

    pub fn get(&self, id: &str) -> Option<&'static BuiltinSpec> {
        if id.is_empty() {
            return None;
        }
        self.specs.iter().find(|spec| spec.id == id)
    }

    pub fn is_builtin(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn specs(&self) -> &'static [BuiltinSpec] {
        self.specs
    }

    /// Select options of a builtin, resolving dynamic option sources.
    pub fn options(&self, spec: &BuiltinSpec, index: &dyn BlockIndex) -> Vec<SelectOption> {
        if !spec.bookmark_options || !spec.kind.is_select_like() {
            return Vec::new();
        }
        index
            .bookmark_labels()
            .into_iter()
            .enumerate()
            .map(|(i, label)| SelectOption::new(label, auto_color(i)))
            .collect()
    }

    pub fn meta(&self, spec: &BuiltinSpec, index: &dyn BlockIndex) -> GlobalAttrMeta {
        spec.meta(self.options(spec, index))
    }

    /// Every builtin's schema, sorted by id.
    pub fn metas(&self, index: &dyn BlockIndex) -> Vec<GlobalAttrMeta> {
        let mut metas: Vec<_> = self
            .specs
            .iter()
            .map(|spec| self.meta(spec, index))
            .collect();
        metas.sort_by(|a, b| a.ga_id.cmp(&b.ga_id));
        metas
    }

    /// Refreshes a builtin-bound column key with the builtin's schema.
    pub fn ensure_key_metadata(&self, key: &mut Key, spec: &BuiltinSpec, index: &dyn BlockIndex) {
        key.kind = spec.kind;
        if !spec.icon.is_empty() {
            key.icon = spec.icon.to_string();
        }
        key.desc = spec.desc.to_string();
        key.name = spec.name.to_string();
        let options = self.options(spec, index);
        if !options.is_empty() {
            key.options = options;
        }
    }

    /// Computes the values of every builtin-bound column of `view`.
    ///
    /// Rows whose block is missing from the index are left untouched. Returns
    /// the number of cells hydrated.
    pub fn hydrate_view(&self, view: &mut AttributeView, index: &dyn BlockIndex) -> usize {
        let bindings: Vec<(String, String)> = view
            .row_bindings()
            .into_iter()
            .filter_map(|row| row.block_id.map(|block_id| (row.row_id, block_id)))
            .collect();
        if bindings.is_empty() {
            return 0;
        }
        if !view
            .key_values
            .iter()
            .any(|kv| self.is_builtin(&kv.key.ga_id))
        {
            return 0;
        }

        let mut seen = HashSet::new();
        let block_ids: Vec<String> = bindings
            .iter()
            .filter(|(_, block_id)| seen.insert(block_id.clone()))
            .map(|(_, block_id)| block_id.clone())
            .collect();

        let blocks: HashMap<String, IndexedBlock> = index
            .blocks(&block_ids)
            .into_iter()
            .map(|b| (b.id.clone(), b))
            .collect();
        if blocks.is_empty() {
            return 0;
        }
        let attrs = index.batch_attrs(&block_ids);
        let empty_attrs = InlineAttrs::new();

        let mut hydrated = 0;
        for column in view.key_values.iter_mut() {
            let Some(spec) = self.get(&column.key.ga_id) else {
                continue;
            };
            self.ensure_key_metadata(&mut column.key, spec, index);

            let mut cells: HashMap<String, usize> = HashMap::with_capacity(column.values.len());
            for (pos, value) in column.values.iter().enumerate() {
                cells.entry(value.block_id.clone()).or_insert(pos);
            }

            for (row_id, block_id) in &bindings {
                let Some(block) = blocks.get(block_id) else {
                    continue;
                };
                let block_attrs = attrs.get(block_id).unwrap_or(&empty_attrs);

                let pos = match cells.get(row_id) {
                    Some(&pos) => pos,
                    None => {
                        column.values.push(Value {
                            id: new_node_id(),
                            key_id: column.key.id.clone(),
                            block_id: row_id.clone(),
                            ..Default::default()
                        });
                        let pos = column.values.len() - 1;
                        cells.insert(row_id.clone(), pos);
                        pos
                    }
                };
                let kind = column.key.kind;
                let value = &mut column.values[pos];
                value.block_id = row_id.clone();
                value.block_ref_id = block_id.clone();
                value.kind = kind;
                value.is_render_auto_fill = true;
                spec.hydrate(value, block, block_attrs);
                hydrated += 1;
            }
        }
        debug!(view_id = %view.id, cells = hydrated, "hydrated builtin attributes");
        hydrated
    }
}
