//! Reverse sync: inline `custom-*` attribute edits into GA values.
//!
//! Runs as a side effect of an inline attribute mutation, so nothing here
//! returns an error. Every changed custom attribute yields one [`AttrSync`]
//! saying what happened to it.
//!
//! For each changed `custom-<name>` (except `custom-avs` and `custom-gas`):
//!
//! 1. `<name>` must be a valid custom attribute name.
//! 2. A stored GA flagged custom with that exact name must exist.
//! 3. The block must list that GA in `custom-gas` (new set first, old set as
//!    fallback).
//! 4. A removed or emptied attribute clears the block's value. Anything else is
//!    parsed for the GA's type and written last-writer-wins: a stored value
//!    whose `updatedAt` is not older than the sync time is left alone.
//! 5. The GA is saved and its key pushed to clients.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use super::{
    bound_ga_ids, find_custom_attr, Ctx, BOUND_AVS_ATTR, BOUND_GAS_ATTR, CUSTOM_PREFIX,
};
use crate::attributes::inline::parse_inline;
use crate::attributes::naming::is_valid_custom_attr_name;
use crate::attributes::{KeyType, Value};
use crate::host::InlineAttrs;
use crate::ids::new_node_id;
use crate::model::GlobalAttribute;
use crate::store::GaBackend;

/// Result of syncing one inline attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttrSync {
    /// The inline attribute name, `custom-` prefix included.
    pub attr: String,
    pub outcome: SyncOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncOutcome {
    Applied { ga_id: String, cleared: bool },
    /// Ignored by policy.
    Skipped(SkipReason),
    /// The GA could not be saved.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    InvalidName,
    NoCustomAttr,
    LookupFailed(String),
    NotBound,
    UnsupportedType(KeyType),
    Unparsable,
    Stale,
    NothingToClear,
}

impl AttrSync {
    fn skipped(attr: &str, reason: SkipReason) -> Self {
        Self {
            attr: attr.to_string(),
            outcome: SyncOutcome::Skipped(reason),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Applied { .. })
    }
}

fn is_synced_attr(name: &str) -> bool {
    name.starts_with(CUSTOM_PREFIX) && name != BOUND_AVS_ATTR && name != BOUND_GAS_ATTR
}

/// Mirrors the custom attribute changes between `old` and `new` (the full
/// attribute sets of `block_id`) into their GAs.
pub fn run<B: GaBackend>(
    ctx: &Ctx<B>,
    block_id: &str,
    old: &InlineAttrs,
    new: &InlineAttrs,
) -> Vec<AttrSync> {
    if block_id.is_empty() {
        return Vec::new();
    }

    let changed: BTreeSet<&String> = old
        .keys()
        .chain(new.keys())
        .filter(|name| is_synced_attr(name))
        .filter(|name| old.get(*name) != new.get(*name))
        .collect();
    if changed.is_empty() {
        return Vec::new();
    }

    let members = {
        let listed = bound_ga_ids(new);
        if listed.is_empty() {
            bound_ga_ids(old)
        } else {
            listed
        }
    };

    let mut results = Vec::with_capacity(changed.len());
    for name in changed {
        let raw = new.get(name).map(String::as_str).unwrap_or_default();
        let result = sync_attr(ctx, block_id, name, raw, &members);
        if let SyncOutcome::Skipped(reason) = &result.outcome {
            debug!(
                block_id = %block_id,
                attr = %name,
                reason = ?reason,
                "custom attribute not synced"
            );
        }
        results.push(result);
    }
    results
}

fn sync_attr<B: GaBackend>(
    ctx: &Ctx<B>,
    block_id: &str,
    name: &str,
    raw: &str,
    members: &[String],
) -> AttrSync {
    let attr_name = &name[CUSTOM_PREFIX.len()..];
    if !is_valid_custom_attr_name(attr_name) {
        return AttrSync::skipped(name, SkipReason::InvalidName);
    }

    let attr = match find_custom_attr(ctx, attr_name) {
        Ok(Some(attr)) => attr,
        Ok(None) => return AttrSync::skipped(name, SkipReason::NoCustomAttr),
        Err(e) => {
            warn!(attr = %attr_name, error = %e, "look up custom attribute failed");
            return AttrSync::skipped(name, SkipReason::LookupFailed(e.to_string()));
        }
    };
    if !members.iter().any(|id| id == attr.id()) {
        return AttrSync::skipped(name, SkipReason::NotBound);
    }

    AttrSync {
        attr: name.to_string(),
        outcome: apply(ctx, attr, block_id, raw),
    }
}

/// Writes `raw` (empty means clear) as the value of `block_id` in `attr`.
fn apply<B: GaBackend>(
    ctx: &Ctx<B>,
    mut attr: GlobalAttribute,
    block_id: &str,
    raw: &str,
) -> SyncOutcome {
    let kind = attr.key.kind;
    if kind.is_computed() {
        return SyncOutcome::Skipped(SkipReason::UnsupportedType(kind));
    }

    let now = ctx.now();
    let cleared = raw.is_empty();
    if cleared {
        let Some(existing) = attr.value_mut(block_id) else {
            return SyncOutcome::Skipped(SkipReason::NothingToClear);
        };
        existing.clear_content();
        existing.updated_at = now;
    } else {
        if !kind.accepts_inline_value() {
            return SyncOutcome::Skipped(SkipReason::UnsupportedType(kind));
        }
        let Some(content) = parse_inline(&mut attr.key, raw) else {
            return SyncOutcome::Skipped(SkipReason::Unparsable);
        };

        match attr.value_mut(block_id) {
            Some(existing) => {
                if existing.updated_at >= now {
                    return SyncOutcome::Skipped(SkipReason::Stale);
                }
                existing.kind = kind;
                existing.content = Some(content);
                existing.updated_at = now;
            }
            None => {
                let value = Value {
                    id: new_node_id(),
                    kind,
                    created_at: now,
                    updated_at: now,
                    content: Some(content),
                    ..Default::default()
                };
                attr.upsert_value(block_id, &value);
            }
        }
    }

    let ga_id = attr.id().to_string();
    if let Err(e) = ctx.store.save(&mut attr) {
        warn!(
            ga_id = %ga_id,
            block_id = %block_id,
            error = %e,
            "save global attribute after inline sync failed"
        );
        return SyncOutcome::Failed(e.to_string());
    }
    ctx.hosts.notifier.key_changed(&attr.key);
    SyncOutcome::Applied { ga_id, cleared }
}
