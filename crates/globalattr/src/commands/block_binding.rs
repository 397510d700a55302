//! Binding a single block to a GA, independently of any view column.
//!
//! Membership is recorded in the block's `custom-gas` attribute. For custom
//! GAs the value is also mirrored onto `custom-<name>`. These writes go
//! straight to the document collaborator and do not trigger reverse sync.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use super::{custom_attr_name, with_membership, without_membership, Ctx, BOUND_GAS_ATTR};
use crate::attributes::inline::{parse_inline, to_inline};
use crate::attributes::{Key, KeyType, Value, ValueContent, ValueDate};
use crate::error::{GaError, Result};
use crate::host::InlineAttrs;
use crate::ids::new_node_id;
use crate::store::GaBackend;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BindBlockRequest {
    #[serde(rename = "blockID")]
    pub block_id: String,
    #[serde(rename = "gaId")]
    pub ga_id: String,
    /// Initial value. Accepts `{"content": ...}`, a bare scalar or array, or a
    /// full value object with its typed slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
}

impl BindBlockRequest {
    pub fn new(block_id: impl Into<String>, ga_id: impl Into<String>) -> Self {
        Self {
            block_id: block_id.into(),
            ga_id: ga_id.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: JsonValue) -> Self {
        self.value = Some(value);
        self
    }
}

fn require_ids(block_id: &str, ga_id: &str) -> Result<()> {
    if block_id.is_empty() || ga_id.is_empty() {
        return Err(GaError::Validation(
            "blockID and gaId are required".to_string(),
        ));
    }
    Ok(())
}

fn reject_builtin<B: GaBackend>(ctx: &Ctx<B>, ga_id: &str) -> Result<()> {
    if ctx.registry.is_builtin(ga_id) {
        return Err(GaError::Validation(format!(
            "global attribute {} is builtin and cannot be bound to blocks",
            ga_id
        )));
    }
    Ok(())
}

/// Creates or updates the block's value in the GA and records membership.
/// Without an initial value an existing value is kept as is and a new one
/// gets the type's empty payload. Returns the stored value.
pub fn bind<B: GaBackend>(ctx: &Ctx<B>, req: BindBlockRequest) -> Result<Value> {
    require_ids(&req.block_id, &req.ga_id)?;
    reject_builtin(ctx, &req.ga_id)?;

    let mut attr = ctx.store.parse(&req.ga_id)?;
    let kind = attr.key.kind;
    let initial = match &req.value {
        Some(raw) => Some(initial_content(&mut attr.key, raw)?),
        None => None,
    };

    let mut value = match attr.value(&req.block_id) {
        Some(existing) => {
            let mut value = existing.clone();
            if let Some(content) = initial {
                value.content = content;
            }
            value
        }
        None => Value {
            id: new_node_id(),
            content: initial.unwrap_or_else(|| ValueContent::empty_for(kind)),
            ..Default::default()
        },
    };
    value.kind = kind;
    value.block_ref_id = req.block_id.clone();
    value.touch(ctx.now());
    attr.upsert_value(&req.block_id, &value);
    ctx.store.save(&mut attr)?;

    let current = ctx.hosts.blocks.attrs(&req.block_id)?;
    let mut changes = InlineAttrs::new();
    if let Some(list) = with_membership(&current, attr.id()) {
        changes.insert(BOUND_GAS_ATTR.to_string(), list);
    }
    if attr.key.is_custom_attr {
        changes.insert(custom_attr_name(&attr.key.name), to_inline(&value));
    }
    if !changes.is_empty() {
        ctx.hosts.blocks.update_attrs(&req.block_id, &changes)?;
    }
    ctx.hosts.notifier.key_changed(&attr.key);

    info!(ga_id = %attr.id(), block_id = %req.block_id, "bound block to global attribute");
    Ok(value)
}

/// Removes the block's value and membership. A GA that no longer exists is
/// tolerated; the membership is cleared anyway.
pub fn unbind<B: GaBackend>(ctx: &Ctx<B>, block_id: &str, ga_id: &str) -> Result<()> {
    require_ids(block_id, ga_id)?;
    reject_builtin(ctx, ga_id)?;

    let mirrored = match ctx.store.parse(ga_id) {
        Ok(mut attr) => {
            if attr.remove_value(block_id) {
                ctx.store.save(&mut attr)?;
                ctx.hosts.notifier.key_changed(&attr.key);
            }
            attr.key
                .is_custom_attr
                .then(|| custom_attr_name(&attr.key.name))
        }
        Err(e) if e.is_attr_not_found() => {
            warn!(
                ga_id = %ga_id,
                block_id = %block_id,
                "unbinding block from missing global attribute"
            );
            None
        }
        Err(e) => return Err(e),
    };

    let current = ctx.hosts.blocks.attrs(block_id)?;
    let mut changes = InlineAttrs::new();
    if let Some(list) = without_membership(&current, ga_id) {
        changes.insert(BOUND_GAS_ATTR.to_string(), list);
    }
    if let Some(name) = mirrored {
        if current.contains_key(&name) {
            changes.insert(name, String::new());
        }
    }
    if !changes.is_empty() {
        ctx.hosts.blocks.update_attrs(block_id, &changes)?;
    }

    info!(ga_id = %ga_id, block_id = %block_id, "unbound block from global attribute");
    Ok(())
}

/// Converts a JSON initial value into a payload for `key`'s type. `null`
/// means an empty payload. A JSON integer for a date key is epoch millis.
fn initial_content(key: &mut Key, raw: &JsonValue) -> Result<Option<ValueContent>> {
    let parsed = match raw {
        JsonValue::Null => return Ok(None),
        JsonValue::Object(map) => {
            if let Some(content) = map.get("content") {
                return initial_content(key, content);
            }
            let value: Value = serde_json::from_value(raw.clone())?;
            value.content
        }
        JsonValue::Number(n) if key.kind == KeyType::Number => n
            .as_f64()
            .filter(|n| n.is_finite())
            .map(ValueContent::number),
        JsonValue::Number(n) if key.kind == KeyType::Date => {
            n.as_i64().map(|millis| {
                ValueContent::Date(ValueDate {
                    content: millis,
                    is_not_empty: true,
                    ..Default::default()
                })
            })
        }
        JsonValue::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(|item| match item {
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            parse_inline(key, &parts.join(","))
        }
        JsonValue::String(s) => parse_inline(key, s),
        other => parse_inline(key, &other.to_string()),
    };
    match parsed {
        Some(content) => Ok(Some(content)),
        None => Err(GaError::Validation(format!(
            "cannot use {} as a {} value of global attribute {}",
            raw, key.kind, key.id
        ))),
    }
}
