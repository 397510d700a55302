//! # API Facade
//!
//! [`GaApi`] is the single entry point for hosts. It owns the store, the
//! builtin registry and the collaborators, and dispatches every call to the
//! command layer. It does no business logic and no presentation: inputs are
//! typed requests, outputs are typed results.
//!
//! | Operation | Command |
//! |-----------|---------|
//! | [`list_attrs`](GaApi::list_attrs), [`create_attr`](GaApi::create_attr), [`get_attr`](GaApi::get_attr), [`delete_attr`](GaApi::delete_attr) | [`catalog`](commands::catalog) |
//! | [`mark_column`](GaApi::mark_column) | [`mark_column`](commands::mark_column) |
//! | [`sync_column`](GaApi::sync_column) | [`forward_sync`](commands::forward_sync) |
//! | [`bind_block`](GaApi::bind_block), [`unbind_block`](GaApi::unbind_block) | [`block_binding`](commands::block_binding) |
//! | [`set_block_attrs`](GaApi::set_block_attrs), [`attrs_changed`](GaApi::attrs_changed) | [`block_attrs`](commands::block_attrs) |
//! | [`hydrate_view`](GaApi::hydrate_view), [`write_builtin_cell`](GaApi::write_builtin_cell) | [`builtin`](crate::builtin) |

use tracing::debug;

use crate::attributes::Value;
use crate::builtin::BuiltinRegistry;
use crate::commands::{self, Ctx, Outcome};
use crate::error::{GaError, Result};
use crate::host::{Hosts, InlineAttrs};
use crate::model::{GlobalAttrMeta, GlobalAttribute};
use crate::store::{GaBackend, GaStore};
use crate::view::AttributeView;

pub use commands::block_binding::BindBlockRequest;
pub use commands::catalog::CreateAttrRequest;
pub use commands::forward_sync::ColumnSync;
pub use commands::mark_column::MarkColumnRequest;
pub use commands::reverse_sync::{AttrSync, SkipReason, SyncOutcome};

pub struct GaApi<B: GaBackend> {
    store: GaStore<B>,
    registry: BuiltinRegistry,
    hosts: Hosts,
}

impl<B: GaBackend> GaApi<B> {
    pub fn new(store: GaStore<B>, hosts: Hosts) -> Self {
        Self {
            store,
            registry: BuiltinRegistry::standard(),
            hosts,
        }
    }

    pub fn with_registry(mut self, registry: BuiltinRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn store(&self) -> &GaStore<B> {
        &self.store
    }

    pub fn registry(&self) -> &BuiltinRegistry {
        &self.registry
    }

    pub fn hosts(&self) -> &Hosts {
        &self.hosts
    }

    pub fn ctx(&self) -> Ctx<'_, B> {
        Ctx {
            store: &self.store,
            registry: &self.registry,
            hosts: &self.hosts,
        }
    }

    /// Builtins first, then stored GAs.
    pub fn list_attrs(&self) -> Result<Vec<GlobalAttrMeta>> {
        commands::catalog::list(&self.ctx())
    }

    pub fn create_attr(&self, req: CreateAttrRequest) -> Result<GlobalAttrMeta> {
        commands::catalog::create(&self.ctx(), req)
    }

    pub fn get_attr(&self, ga_id: &str) -> Result<GlobalAttribute> {
        commands::catalog::get(&self.ctx(), ga_id)
    }

    pub fn delete_attr(&self, ga_id: &str) -> Result<()> {
        commands::catalog::delete(&self.ctx(), ga_id)
    }

    pub fn mark_column(&self, req: MarkColumnRequest) -> Result<Outcome<Option<GlobalAttrMeta>>> {
        commands::mark_column::run(&self.ctx(), req)
    }

    pub fn sync_column(&self, view_id: &str, key_id: &str) -> Result<Outcome<ColumnSync>> {
        commands::forward_sync::sync_column(&self.ctx(), view_id, key_id)
    }

    /// Loads a view with its builtin-bound columns computed. The view is not
    /// saved; hydrated cells are render-time data.
    pub fn hydrate_view(&self, view_id: &str) -> Result<AttributeView> {
        let mut view = self.hosts.views.load_view(view_id)?;
        self.registry
            .hydrate_view(&mut view, self.hosts.index.as_ref());
        Ok(view)
    }

    /// Applies a builtin's write-back for one block. Returns the inline
    /// attribute change that was written.
    pub fn write_builtin_cell(
        &self,
        block_id: &str,
        ga_id: &str,
        value: &Value,
    ) -> Result<InlineAttrs> {
        if block_id.is_empty() || ga_id.is_empty() {
            return Err(GaError::Validation(
                "blockID and gaId are required".to_string(),
            ));
        }
        let spec = self.registry.get(ga_id).ok_or_else(|| {
            GaError::Validation(format!("global attribute {} is not builtin", ga_id))
        })?;
        let block = self.hosts.index.block(block_id);
        let changes = spec.write_back(block.as_ref(), value)?;
        self.hosts.blocks.update_attrs(block_id, &changes)?;
        debug!(ga_id = %ga_id, block_id = %block_id, "wrote builtin attribute back");
        Ok(changes)
    }

    pub fn bind_block(&self, req: BindBlockRequest) -> Result<Value> {
        commands::block_binding::bind(&self.ctx(), req)
    }

    pub fn unbind_block(&self, block_id: &str, ga_id: &str) -> Result<()> {
        commands::block_binding::unbind(&self.ctx(), block_id, ga_id)
    }

    pub fn set_block_attrs(&self, block_id: &str, changes: InlineAttrs) -> Result<Vec<AttrSync>> {
        commands::block_attrs::set_block_attrs(&self.ctx(), block_id, changes)
    }

    pub fn attrs_changed(
        &self,
        block_id: &str,
        old: &InlineAttrs,
        new: &InlineAttrs,
    ) -> Vec<AttrSync> {
        commands::block_attrs::attrs_changed(&self.ctx(), block_id, old, new)
    }
}
