//! GA catalogue: list, create, get and delete.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

use super::{check_custom_name_free, validate_custom_name, Ctx};
use crate::attributes::{Key, KeyType, SelectOption};
use crate::error::{GaError, Result};
use crate::ids::new_node_id;
use crate::model::{GlobalAttrMeta, GlobalAttribute};
use crate::store::GaBackend;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateAttrRequest {
    /// Explicit id; a node id is generated when empty.
    pub ga_id: String,
    pub name: String,
    pub icon: String,
    pub desc: String,
    /// Type string, `""` meaning text.
    #[serde(rename = "type")]
    pub kind: String,
    pub options: Vec<SelectOption>,
    pub number_format: String,
    pub template: String,
    pub is_custom_attr: bool,
}

impl CreateAttrRequest {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }
}

/// Builtins first (sorted by id), then stored GAs not shadowed by a builtin.
pub fn list<B: GaBackend>(ctx: &Ctx<B>) -> Result<Vec<GlobalAttrMeta>> {
    let stored = ctx.store.list()?;

    let mut metas = ctx.registry.metas(ctx.hosts.index.as_ref());
    let mut seen: HashSet<String> = metas.iter().map(|m| m.ga_id.clone()).collect();
    for attr in stored {
        let meta = attr.meta();
        if seen.insert(meta.ga_id.clone()) {
            metas.push(meta);
        }
    }
    Ok(metas)
}

pub fn create<B: GaBackend>(ctx: &Ctx<B>, req: CreateAttrRequest) -> Result<GlobalAttrMeta> {
    let kind: KeyType = req.kind.parse()?;

    let explicit = !req.ga_id.is_empty();
    let ga_id = if explicit { req.ga_id } else { new_node_id() };
    reject_builtin(ctx, &ga_id)?;
    if explicit && ctx.store.exists(&ga_id)? {
        return Err(GaError::Conflict(format!(
            "global attribute {} already exists",
            ga_id
        )));
    }
    if req.is_custom_attr {
        validate_custom_name(&req.name)?;
        check_custom_name_free(ctx, &req.name, &ga_id)?;
    }

    let key = Key {
        id: ga_id.clone(),
        ga_id,
        name: req.name,
        kind,
        icon: req.icon,
        desc: req.desc,
        number_format: req.number_format,
        template: req.template,
        options: req.options,
        is_custom_attr: req.is_custom_attr,
    };
    let mut attr = GlobalAttribute::new(key);
    ctx.store.save(&mut attr)?;
    info!(ga_id = %attr.id(), name = %attr.key.name, "created global attribute");
    Ok(attr.meta())
}

pub fn get<B: GaBackend>(ctx: &Ctx<B>, ga_id: &str) -> Result<GlobalAttribute> {
    reject_builtin(ctx, ga_id)?;
    ctx.store.parse(ga_id)
}

/// Deletes a stored GA. Deleting an absent GA is not an error.
pub fn delete<B: GaBackend>(ctx: &Ctx<B>, ga_id: &str) -> Result<()> {
    if ga_id.is_empty() {
        return Err(GaError::Validation("gaId is required".to_string()));
    }
    reject_builtin(ctx, ga_id)?;
    ctx.store.remove(ga_id)?;
    info!(ga_id = %ga_id, "deleted global attribute");
    Ok(())
}

fn reject_builtin<B: GaBackend>(ctx: &Ctx<B>, ga_id: &str) -> Result<()> {
    if ctx.registry.is_builtin(ga_id) {
        return Err(GaError::Validation(format!(
            "global attribute {} is builtin",
            ga_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    #[test]
    fn list_puts_builtins_first_then_stored() {
        let env = TestEnv::new();
        let ctx = env.api.ctx();
        let mut req = CreateAttrRequest::new("Status", "select");
        req.ga_id = "status".into();
        create(&ctx, req).unwrap();

        let metas = list(&ctx).unwrap();
        let builtin_count = crate::builtin::BUILTINS.len();
        assert_eq!(metas.len(), builtin_count + 1);
        assert!(metas[..builtin_count].iter().all(|m| m.builtin));
        assert_eq!(metas[builtin_count].ga_id, "status");
    }

    #[test]
    fn list_drops_stored_docs_shadowed_by_builtins() {
        let env = TestEnv::new();
        env.backend
            .insert_raw("memo", r#"{"key":{"id":"memo","name":"Shadow","type":"text"}}"#);
        let metas = list(&env.api.ctx()).unwrap();
        let memo: Vec<_> = metas.iter().filter(|m| m.ga_id == "memo").collect();
        assert_eq!(memo.len(), 1);
        assert!(memo[0].builtin);
    }

    #[test]
    fn create_generates_node_id() {
        let env = TestEnv::new();
        let meta = create(&env.api.ctx(), CreateAttrRequest::new("Due", "date")).unwrap();
        assert!(crate::ids::is_node_id(&meta.ga_id));
        assert_eq!(meta.kind, KeyType::Date);
        assert!(env.backend.contains(&meta.ga_id));
    }

    #[test]
    fn create_defaults_to_text_and_rejects_unknown_types() {
        let env = TestEnv::new();
        let ctx = env.api.ctx();
        let meta = create(&ctx, CreateAttrRequest::new("Note", "")).unwrap();
        assert_eq!(meta.kind, KeyType::Text);

        let err = create(&ctx, CreateAttrRequest::new("Bad", "colour")).unwrap_err();
        assert!(err.to_string().contains("unsupported key type: colour"));
    }

    #[test]
    fn create_rejects_builtin_and_taken_ids() {
        let env = TestEnv::new();
        let ctx = env.api.ctx();
        let mut req = CreateAttrRequest::new("Tag", "text");
        req.ga_id = "tag".into();
        assert!(matches!(create(&ctx, req), Err(GaError::Validation(_))));

        let mut req = CreateAttrRequest::new("A", "text");
        req.ga_id = "a".into();
        create(&ctx, req.clone()).unwrap();
        assert!(matches!(create(&ctx, req), Err(GaError::Conflict(_))));
    }

    #[test]
    fn create_custom_checks_name_rules() {
        let env = TestEnv::new();
        let ctx = env.api.ctx();
        let mut req = CreateAttrRequest::new("1st", "text");
        req.is_custom_attr = true;
        assert!(matches!(create(&ctx, req), Err(GaError::Validation(_))));

        let mut req = CreateAttrRequest::new("priority", "text");
        req.is_custom_attr = true;
        req.ga_id = "p1".into();
        create(&ctx, req.clone()).unwrap();

        req.ga_id = "p2".into();
        let err = create(&ctx, req).unwrap_err();
        assert!(matches!(err, GaError::Conflict(_)));
        assert!(err.to_string().contains("p1"));
    }

    #[test]
    fn get_and_delete() {
        let env = TestEnv::new();
        let ctx = env.api.ctx();
        let meta = create(&ctx, CreateAttrRequest::new("Due", "date")).unwrap();

        assert_eq!(get(&ctx, &meta.ga_id).unwrap().key.name, "Due");
        delete(&ctx, &meta.ga_id).unwrap();
        assert!(get(&ctx, &meta.ga_id).unwrap_err().is_attr_not_found());
        delete(&ctx, &meta.ga_id).unwrap();

        assert!(matches!(get(&ctx, "id"), Err(GaError::Validation(_))));
        assert!(matches!(delete(&ctx, "tag"), Err(GaError::Validation(_))));
    }
}
