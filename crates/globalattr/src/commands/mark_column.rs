//! Binding a view column to a GA.
//!
//! Resolution order for the target: disable, then builtin, then a stored GA
//! (optionally created from the column's own key). Binding to a user GA also
//! seeds the GA's values from the column's rows.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::forward_sync::sync_column_rows;
use super::{check_custom_name_free, validate_custom_name, Ctx, Outcome};
use crate::error::{GaError, Result};
use crate::ids::new_node_id;
use crate::model::{GlobalAttrMeta, GlobalAttribute};
use crate::store::GaBackend;

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkColumnRequest {
    #[serde(rename = "avID")]
    pub av_id: String,
    #[serde(rename = "keyID")]
    pub key_id: String,
    #[serde(default)]
    pub ga_id: String,
    #[serde(default)]
    pub is_custom_attr: bool,
    #[serde(default)]
    pub create_if_absent: bool,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl MarkColumnRequest {
    pub fn new(av_id: impl Into<String>, key_id: impl Into<String>) -> Self {
        Self {
            av_id: av_id.into(),
            key_id: key_id.into(),
            ga_id: String::new(),
            is_custom_attr: false,
            create_if_absent: false,
            enabled: true,
        }
    }

    pub fn ga(mut self, ga_id: impl Into<String>) -> Self {
        self.ga_id = ga_id.into();
        self
    }

    pub fn custom(mut self, is_custom_attr: bool) -> Self {
        self.is_custom_attr = is_custom_attr;
        self
    }

    pub fn create_if_absent(mut self) -> Self {
        self.create_if_absent = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Binds (or unbinds) a column. Returns the resolved GA schema, `None` when
/// the column was unbound. A failed custom-flag save does not abort the
/// binding and is reported in [`Outcome::ignored`].
pub fn run<B: GaBackend>(
    ctx: &Ctx<B>,
    req: MarkColumnRequest,
) -> Result<Outcome<Option<GlobalAttrMeta>>> {
    if req.av_id.is_empty() || req.key_id.is_empty() {
        return Err(GaError::Validation("avID or keyID is empty".to_string()));
    }

    let mut view = ctx.hosts.views.load_view(&req.av_id)?;
    let column_key = view.key_values(&req.key_id)?.key.clone();

    if !req.enabled {
        let column = view.key_values_mut(&req.key_id)?;
        column.key.ga_id.clear();
        column.key.is_custom_attr = false;
        ctx.hosts.views.save_view(&view)?;
        info!(view_id = %req.av_id, key_id = %req.key_id, "unbound column from global attribute");
        return Ok(Outcome::new(None));
    }

    if let Some(spec) = ctx.registry.get(&req.ga_id) {
        let column = view.key_values_mut(&req.key_id)?;
        column.key.ga_id = spec.id.to_string();
        column.key.is_custom_attr = false;
        ctx.hosts.views.save_view(&view)?;
        info!(view_id = %req.av_id, key_id = %req.key_id, ga_id = %spec.id, "bound column to builtin attribute");
        return Ok(Outcome::new(Some(
            ctx.registry.meta(spec, ctx.hosts.index.as_ref()),
        )));
    }

    let loaded = if req.ga_id.is_empty() {
        None
    } else {
        match ctx.store.parse(&req.ga_id) {
            Ok(attr) => Some(attr),
            Err(e) if e.is_attr_not_found() && req.create_if_absent => None,
            Err(e) => return Err(e),
        }
    };
    let is_new = loaded.is_none();
    let mut attr = match loaded {
        Some(attr) => attr,
        None => {
            let mut key = column_key;
            let ga_id = if req.ga_id.is_empty() {
                new_node_id()
            } else {
                req.ga_id.clone()
            };
            key.id = ga_id.clone();
            key.ga_id = ga_id;
            key.is_custom_attr = req.is_custom_attr;
            GlobalAttribute::new(key)
        }
    };

    if req.is_custom_attr {
        validate_custom_name(&attr.key.name)?;
        check_custom_name_free(ctx, &attr.key.name, attr.id())?;
    }

    let mut outcome = Outcome::new(None);
    if is_new {
        ctx.store.save(&mut attr)?;
        info!(ga_id = %attr.id(), name = %attr.key.name, "created global attribute from column");
    } else if attr.key.is_custom_attr != req.is_custom_attr {
        attr.key.is_custom_attr = req.is_custom_attr;
        if let Err(e) = ctx.store.save(&mut attr) {
            warn!(ga_id = %attr.id(), error = %e, "update global attribute custom flag failed");
            outcome.ignore(attr.id(), "save custom flag", &e);
        }
    }

    {
        let column = view.key_values_mut(&req.key_id)?;
        column.key.ga_id = attr.id().to_string();
        column.key.is_custom_attr = req.is_custom_attr;
    }
    let sync = sync_column_rows(&mut view, &req.key_id, &mut attr)?;
    if sync.changed {
        ctx.store.save(&mut attr)?;
    }
    ctx.hosts.views.save_view(&view)?;
    info!(
        view_id = %req.av_id,
        key_id = %req.key_id,
        ga_id = %attr.id(),
        rows = sync.synced.len(),
        "bound column to global attribute"
    );

    outcome.data = Some(attr.meta());
    Ok(outcome)
}
