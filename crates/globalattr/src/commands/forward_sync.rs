//! Forward sync: view cells into GA values.
//!
//! Every row of a GA-bound column is resolved to its content block and the
//! row's cell is upserted into the GA under that block id. Detached rows have
//! no block; their cells only lose any stale `blockRefID`.

use tracing::{debug, warn};

use super::{custom_attr_name, with_membership, Ctx, Outcome, BOUND_GAS_ATTR};
use crate::attributes::inline::to_inline;
use crate::attributes::Value;
use crate::error::{GaError, Result};
use crate::host::InlineAttrs;
use crate::model::GlobalAttribute;
use crate::store::GaBackend;
use crate::view::AttributeView;

/// What a row sync did to one column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSync {
    /// Blocks whose value was pushed into the GA, in row order.
    pub synced: Vec<String>,
    /// Rows without a content block whose stale reference was dropped.
    pub detached: Vec<String>,
    /// Whether the GA's value list changed.
    pub changed: bool,
}

/// Upserts every bound row of column `key_id` into `attr`.
pub fn sync_column_rows(
    view: &mut AttributeView,
    key_id: &str,
    attr: &mut GlobalAttribute,
) -> Result<ColumnSync> {
    let rows = view.row_bindings();
    let column = view.key_values_mut(key_id)?;

    let mut sync = ColumnSync::default();
    for row in rows {
        let Some(cell) = column.value_mut(&row.row_id) else {
            continue;
        };
        match row.block_id {
            Some(block_id) => {
                cell.block_ref_id = block_id.clone();
                if !same_as_stored(attr, &block_id, cell) {
                    attr.upsert_value(&block_id, cell);
                    sync.changed = true;
                }
                sync.synced.push(block_id);
            }
            None => {
                if !cell.block_ref_id.is_empty() {
                    cell.block_ref_id.clear();
                    sync.detached.push(row.row_id);
                }
            }
        }
    }
    Ok(sync)
}

fn same_as_stored(attr: &GlobalAttribute, block_id: &str, cell: &Value) -> bool {
    let Some(stored) = attr.value(block_id) else {
        return false;
    };
    let mut incoming = cell.clone();
    incoming.block_ref_id = block_id.to_string();
    incoming.block_id.clear();
    incoming.key_id.clear();
    *stored == incoming
}

/// Pushes column `key_id` of view `view_id` into its bound GA after a cell
/// edit, then persists both. For custom GAs each synced value is mirrored
/// onto the block's `custom-<name>` attribute; mirror failures are ignored.
pub fn sync_column<B: GaBackend>(
    ctx: &Ctx<B>,
    view_id: &str,
    key_id: &str,
) -> Result<Outcome<ColumnSync>> {
    if view_id.is_empty() || key_id.is_empty() {
        return Err(GaError::Validation("avID or keyID is empty".to_string()));
    }
    let mut view = ctx.hosts.views.load_view(view_id)?;
    let ga_id = view.key_values(key_id)?.key.ga_id.clone();
    if ga_id.is_empty() {
        return Err(GaError::Validation(format!(
            "key {} in attribute view {} is not bound to a global attribute",
            key_id, view_id
        )));
    }
    if ctx.registry.is_builtin(&ga_id) {
        return Err(GaError::Validation(format!(
            "global attribute {} is builtin, write cells back per block instead",
            ga_id
        )));
    }

    let mut attr = ctx.store.parse(&ga_id)?;
    let sync = sync_column_rows(&mut view, key_id, &mut attr)?;
    if sync.changed {
        ctx.store.save(&mut attr)?;
    }
    ctx.hosts.views.save_view(&view)?;
    debug!(
        ga_id = %ga_id,
        view_id = %view_id,
        synced = sync.synced.len(),
        detached = sync.detached.len(),
        "synced column into global attribute"
    );

    let mut failures = Vec::new();
    if attr.key.is_custom_attr {
        for block_id in &sync.synced {
            if let Err(e) = mirror_value(ctx, &attr, block_id) {
                warn!(
                    ga_id = %ga_id,
                    block_id = %block_id,
                    error = %e,
                    "mirror custom attribute failed"
                );
                failures.push(e);
            }
        }
    }

    let mut outcome = Outcome::new(sync);
    for e in &failures {
        outcome.ignore(&ga_id, "mirror custom attribute", e);
    }
    Ok(outcome)
}

/// Writes the GA's value for `block_id` onto the block's `custom-<name>`
/// attribute and records the membership.
fn mirror_value<B: GaBackend>(
    ctx: &Ctx<B>,
    attr: &GlobalAttribute,
    block_id: &str,
) -> Result<()> {
    let Some(value) = attr.value(block_id) else {
        return Ok(());
    };
    let current = ctx.hosts.blocks.attrs(block_id)?;
    let name = custom_attr_name(&attr.key.name);
    let rendered = to_inline(value);

    let mut changes = InlineAttrs::new();
    if current.get(&name).map(String::as_str).unwrap_or_default() != rendered {
        changes.insert(name, rendered);
    }
    if let Some(list) = with_membership(&current, attr.id()) {
        changes.insert(BOUND_GAS_ATTR.to_string(), list);
    }
    if changes.is_empty() {
        return Ok(());
    }
    ctx.hosts.blocks.update_attrs(block_id, &changes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Key, KeyType, ValueContent};
    use crate::test_utils::{cell, view_with_column, TestEnv};

    fn status_column() -> Key {
        let mut key = Key::new("kc", "Status", KeyType::Text);
        key.ga_id = "ga-status".into();
        key
    }

    fn store_status(env: &TestEnv, custom: bool) {
        let mut key = Key::new("ga-status", "Status", KeyType::Text);
        key.is_custom_attr = custom;
        env.api
            .ctx()
            .store
            .save(&mut GlobalAttribute::new(key))
            .unwrap();
    }

    fn seeded_view() -> AttributeView {
        let mut view = view_with_column(
            "av1",
            status_column(),
            &[("r1", Some("b1")), ("r2", None), ("r3", Some("b3"))],
        );
        let column = view.key_values_mut("kc").unwrap();
        column
            .values
            .push(cell("r1", KeyType::Text, ValueContent::text("open")));
        let mut stale = cell("r2", KeyType::Text, ValueContent::text("orphan"));
        stale.block_ref_id = "gone".into();
        column.values.push(stale);
        view
    }

    #[test]
    fn rows_are_upserted_by_block_and_detached_rows_cleared() {
        let mut view = seeded_view();
        let mut attr = GlobalAttribute::new(Key::new("ga-status", "Status", KeyType::Text));

        let sync = sync_column_rows(&mut view, "kc", &mut attr).unwrap();

        assert_eq!(sync.synced, vec!["b1".to_string()]);
        assert_eq!(sync.detached, vec!["r2".to_string()]);
        assert!(sync.changed);
        assert_eq!(attr.values.len(), 1);
        assert_eq!(attr.value("b1").unwrap().text(), Some("open"));
        assert!(attr.value("b1").unwrap().block_id.is_empty());

        let column = view.key_values("kc").unwrap();
        assert_eq!(column.value("r1").unwrap().block_ref_id, "b1");
        assert!(column.value("r2").unwrap().block_ref_id.is_empty());
    }

    #[test]
    fn resync_without_edits_reports_no_change() {
        let mut view = seeded_view();
        let mut attr = GlobalAttribute::new(Key::new("ga-status", "Status", KeyType::Text));
        sync_column_rows(&mut view, "kc", &mut attr).unwrap();

        let again = sync_column_rows(&mut view, "kc", &mut attr).unwrap();
        assert!(!again.changed);
        assert_eq!(again.synced, vec!["b1".to_string()]);
        assert!(again.detached.is_empty());
    }

    #[test]
    fn missing_column_is_not_found() {
        let mut view = seeded_view();
        let mut attr = GlobalAttribute::default();
        let err = sync_column_rows(&mut view, "nope", &mut attr).unwrap_err();
        assert!(matches!(err, GaError::NotFound(_)));
    }

    #[test]
    fn sync_column_persists_ga_and_view() {
        let env = TestEnv::new();
        store_status(&env, false);
        env.views.insert(seeded_view());

        let outcome = sync_column(&env.api.ctx(), "av1", "kc").unwrap();

        assert!(outcome.is_clean());
        let stored = env.api.ctx().store.parse("ga-status").unwrap();
        assert_eq!(stored.value("b1").unwrap().text(), Some("open"));
        assert_eq!(env.views.save_count(), 1);
        assert!(env.blocks.get("b1").is_empty());
    }

    #[test]
    fn sync_column_mirrors_custom_values() {
        let env = TestEnv::new();
        store_status(&env, true);
        env.views.insert(seeded_view());

        sync_column(&env.api.ctx(), "av1", "kc").unwrap();

        assert_eq!(env.blocks.attr("b1", "custom-Status").as_deref(), Some("open"));
        assert_eq!(env.blocks.attr("b1", BOUND_GAS_ATTR).as_deref(), Some("ga-status"));

        let writes = env.blocks.write_count();
        sync_column(&env.api.ctx(), "av1", "kc").unwrap();
        assert_eq!(env.blocks.write_count(), writes);
    }

    #[test]
    fn mirror_failures_are_reported_without_aborting_the_sync() {
        let env = TestEnv::new();
        store_status(&env, true);
        let mut view = seeded_view();
        view.key_values_mut("kc")
            .unwrap()
            .values
            .push(cell("r3", KeyType::Text, ValueContent::text("closed")));
        env.views.insert(view);
        env.blocks.fail_writes_for("b1");

        let outcome = sync_column(&env.api.ctx(), "av1", "kc").unwrap();

        assert_eq!(outcome.ignored.len(), 1);
        assert_eq!(outcome.ignored[0].ga_id, "ga-status");
        assert_eq!(outcome.ignored[0].operation, "mirror custom attribute");
        assert_eq!(env.blocks.attr("b3", "custom-Status").as_deref(), Some("closed"));
        let stored = env.api.ctx().store.parse("ga-status").unwrap();
        assert_eq!(stored.value("b1").unwrap().text(), Some("open"));
        assert_eq!(env.views.save_count(), 1);
    }

    #[test]
    fn sync_column_rejects_unbound_and_builtin_columns() {
        let env = TestEnv::new();
        let ctx = env.api.ctx();

        let mut view = seeded_view();
        view.key_values_mut("kc").unwrap().key.ga_id.clear();
        env.views.insert(view);
        assert!(matches!(
            sync_column(&ctx, "av1", "kc"),
            Err(GaError::Validation(_))
        ));

        let mut view = seeded_view();
        view.key_values_mut("kc").unwrap().key.ga_id = "memo".into();
        env.views.insert(view);
        assert!(matches!(
            sync_column(&ctx, "av1", "kc"),
            Err(GaError::Validation(_))
        ));
    }

    #[test]
    fn sync_column_requires_existing_ga() {
        let env = TestEnv::new();
        env.views.insert(seeded_view());
        let err = sync_column(&env.api.ctx(), "av1", "kc").unwrap_err();
        assert!(err.is_attr_not_found());
        assert_eq!(env.views.save_count(), 0);
    }
}
