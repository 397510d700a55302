//! # Command Layer
//!
//! The reconciliation logic of the GA engine. Each operation lives in its own
//! submodule as plain functions over a [`Ctx`]: the store, the builtin
//! registry and the host collaborators.
//!
//! ## Failure Policy
//!
//! Hard failures are returned as `Err`. Failures that are ignored by policy
//! (a best-effort flag save during column binding, a per-attribute skip
//! during reverse sync) are returned as data instead, through [`Outcome`] or
//! [`reverse_sync::AttrSync`], so callers and tests can tell a deliberate skip
//! from an accident.
//!
//! ## Command Modules
//!
//! - [`catalog`]: list, create, get and delete GAs
//! - [`mark_column`]: bind or unbind a view column to a GA
//! - [`forward_sync`]: push view cells into GA values
//! - [`reverse_sync`]: mirror `custom-*` inline attribute edits into GA values
//! - [`block_attrs`]: the inline attribute mutation entry point
//! - [`block_binding`]: bind or unbind a single block to a GA

use serde::Serialize;

use crate::builtin::BuiltinRegistry;
use crate::error::{GaError, Result};
use crate::host::{Hosts, InlineAttrs};
use crate::model::GlobalAttribute;
use crate::store::{GaBackend, GaStore};

pub mod block_attrs;
pub mod block_binding;
pub mod catalog;
pub mod forward_sync;
pub mod mark_column;
pub mod reverse_sync;

/// Prefix of inline attributes mirrored from custom GAs.
pub const CUSTOM_PREFIX: &str = "custom-";
/// Comma separated ids of the GAs a block is bound to.
pub const BOUND_GAS_ATTR: &str = "custom-gas";
/// Attribute view membership list, owned by the view engine.
pub const BOUND_AVS_ATTR: &str = "custom-avs";

/// Everything a command needs.
pub struct Ctx<'a, B: GaBackend> {
    pub store: &'a GaStore<B>,
    pub registry: &'a BuiltinRegistry,
    pub hosts: &'a Hosts,
}

impl<'a, B: GaBackend> Ctx<'a, B> {
    pub fn now(&self) -> i64 {
        self.hosts.clock.now_millis()
    }
}

/// A failure that did not abort the operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoftFailure {
    pub ga_id: String,
    pub operation: &'static str,
    pub error: String,
}

/// Result of an operation plus the failures it ignored.
#[derive(Debug)]
pub struct Outcome<T> {
    pub data: T,
    pub ignored: Vec<SoftFailure>,
}

impl<T> Outcome<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            ignored: Vec::new(),
        }
    }

    pub fn ignore(&mut self, ga_id: &str, operation: &'static str, error: &GaError) {
        self.ignored.push(SoftFailure {
            ga_id: ga_id.to_string(),
            operation,
            error: error.to_string(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.ignored.is_empty()
    }
}

/// First stored, non-builtin GA named `name` that is flagged custom.
pub fn find_custom_attr<B: GaBackend>(
    ctx: &Ctx<B>,
    name: &str,
) -> Result<Option<GlobalAttribute>> {
    Ok(ctx
        .store
        .list()?
        .into_iter()
        .find(|attr| {
            attr.key.is_custom_attr
                && attr.key.name == name
                && !ctx.registry.is_builtin(attr.id())
        }))
}

/// Fails with a conflict when another GA (not `exclude_id`) already owns the
/// custom attribute `name`.
pub fn check_custom_name_free<B: GaBackend>(
    ctx: &Ctx<B>,
    name: &str,
    exclude_id: &str,
) -> Result<()> {
    let taken = ctx.store.list()?.into_iter().find(|attr| {
        attr.key.is_custom_attr
            && attr.key.name == name
            && attr.id() != exclude_id
            && !ctx.registry.is_builtin(attr.id())
    });
    match taken {
        Some(other) => Err(GaError::Conflict(format!(
            "custom attribute name {} is already used by global attribute {}",
            name,
            other.id()
        ))),
        None => Ok(()),
    }
}

/// Name format check for custom attributes, as a crate error.
pub fn validate_custom_name(name: &str) -> Result<()> {
    crate::attributes::naming::validate_custom_attr_name(name)
        .map_err(|e| GaError::Validation(format!("{}: {}", e, name)))
}

pub fn custom_attr_name(name: &str) -> String {
    format!("{}{}", CUSTOM_PREFIX, name)
}

/// GA ids listed in a block's `custom-gas` attribute.
pub fn bound_ga_ids(attrs: &InlineAttrs) -> Vec<String> {
    attrs
        .get(BOUND_GAS_ATTR)
        .map(|raw| crate::attributes::inline::split_csv(raw))
        .unwrap_or_default()
}

/// The `custom-gas` list with `ga_id` appended, or `None` when it is
/// already listed.
pub fn with_membership(attrs: &InlineAttrs, ga_id: &str) -> Option<String> {
    let mut ids = bound_ga_ids(attrs);
    if ids.iter().any(|id| id == ga_id) {
        return None;
    }
    ids.push(ga_id.to_string());
    Some(ids.join(","))
}

/// The `custom-gas` list without `ga_id`, or `None` when it was not listed.
/// An emptied list comes back as `""`, which removes the attribute.
pub fn without_membership(attrs: &InlineAttrs, ga_id: &str) -> Option<String> {
    let ids = bound_ga_ids(attrs);
    if !ids.iter().any(|id| id == ga_id) {
        return None;
    }
    Some(
        ids.into_iter()
            .filter(|id| id != ga_id)
            .collect::<Vec<_>>()
            .join(","),
    )
}
