//! Inline attribute mutation entry point.
//!
//! Writes a batch of attribute changes to one block, then runs reverse sync
//! over the block's complete old and new attribute sets.

use tracing::debug;

use super::reverse_sync::{self, AttrSync};
use super::Ctx;
use crate::attributes::inline::split_csv;
use crate::attributes::naming::is_valid_inline_attr_name;
use crate::error::{GaError, Result};
use crate::host::InlineAttrs;
use crate::store::GaBackend;

const TAGS_ATTR: &str = "tags";

/// Applies `changes` to `block_id`. Values are trimmed and lose one trailing
/// comma; values that end up empty remove the attribute. `tags` is
/// de-duplicated. Returns what reverse sync did for each changed custom
/// attribute.
pub fn set_block_attrs<B: GaBackend>(
    ctx: &Ctx<B>,
    block_id: &str,
    changes: InlineAttrs,
) -> Result<Vec<AttrSync>> {
    if block_id.is_empty() {
        return Err(GaError::Validation("blockID is required".to_string()));
    }
    if let Some(bad) = changes.keys().find(|name| !is_valid_inline_attr_name(name)) {
        return Err(GaError::Validation(format!(
            "invalid attribute name {} for block {}",
            bad, block_id
        )));
    }

    let old = ctx.hosts.blocks.attrs(block_id)?;
    let new = apply_changes(&old, normalize(changes));
    ctx.hosts.blocks.write_attrs(block_id, &new)?;
    debug!(block_id = %block_id, "updated inline attributes");

    Ok(attrs_changed(ctx, block_id, &old, &new))
}

/// Reverse sync alone, for hosts that write inline attributes themselves.
pub fn attrs_changed<B: GaBackend>(
    ctx: &Ctx<B>,
    block_id: &str,
    old: &InlineAttrs,
    new: &InlineAttrs,
) -> Vec<AttrSync> {
    reverse_sync::run(ctx, block_id, old, new)
}

fn normalize(mut changes: InlineAttrs) -> InlineAttrs {
    if let Some(raw) = changes.get_mut(TAGS_ATTR) {
        let mut tags: Vec<String> = Vec::new();
        for tag in split_csv(raw) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        if !tags.is_empty() {
            *raw = tags.join(",");
        }
    }

    for value in changes.values_mut() {
        let trimmed = value.trim();
        let trimmed = trimmed.strip_suffix(',').unwrap_or(trimmed);
        *value = trimmed.to_string();
    }
    changes
}

fn apply_changes(old: &InlineAttrs, changes: InlineAttrs) -> InlineAttrs {
    let mut new = old.clone();
    for (name, value) in changes {
        if value.is_empty() {
            new.remove(&name);
        } else {
            new.insert(name, value);
        }
    }
    new
}
