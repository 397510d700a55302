//! Column, GA and inline attribute kept in agreement across the public API.

use globalattr::api::{BindBlockRequest, MarkColumnRequest, SkipReason, SyncOutcome};
use globalattr::attributes::{Key, KeyType, Value, ValueContent, ValueSelect};
use globalattr::host::{IndexedBlock, InlineAttrs};
use globalattr::test_utils::{cell, view_with_column, TestEnv};
use serde_json::json;

fn attrs(pairs: &[(&str, &str)]) -> InlineAttrs {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// View `av1` with a `priority` select column holding `low` for block `b1`.
fn priority_view(env: &TestEnv) {
    let mut view = view_with_column(
        "av1",
        Key::new("kc", "priority", KeyType::Select),
        &[("r1", Some("b1")), ("r2", Some("b2"))],
    );
    view.key_values_mut("kc").unwrap().values.push(cell(
        "r1",
        KeyType::Select,
        ValueContent::Selects(vec![ValueSelect::new("low", "1")]),
    ));
    env.views.insert(view);
}

fn mark_priority(env: &TestEnv) -> String {
    let outcome = env
        .api
        .mark_column(
            MarkColumnRequest::new("av1", "kc")
                .custom(true)
                .create_if_absent(),
        )
        .unwrap();
    assert!(outcome.is_clean());
    outcome.data.unwrap().ga_id
}

#[test]
fn column_value_round_trips_through_inline_attribute() {
    let env = TestEnv::new();
    priority_view(&env);
    let ga_id = mark_priority(&env);

    let stored = env.api.get_attr(&ga_id).unwrap();
    assert!(stored.key.is_custom_attr);
    assert_eq!(stored.value("b1").unwrap().selects()[0].content, "low");
    let view = env.views.get("av1").unwrap();
    assert_eq!(view.key_values("kc").unwrap().key.ga_id, ga_id);

    env.api.sync_column("av1", "kc").unwrap();
    assert_eq!(env.blocks.attr("b1", "custom-priority").as_deref(), Some("low"));
    assert_eq!(env.blocks.attr("b1", "custom-gas").as_deref(), Some(ga_id.as_str()));

    env.clock.advance(1);
    let results = env
        .api
        .set_block_attrs("b1", attrs(&[("custom-priority", "high")]))
        .unwrap();
    assert!(results[0].is_applied());

    let stored = env.api.get_attr(&ga_id).unwrap();
    let value = stored.value("b1").unwrap();
    assert_eq!(value.selects()[0].content, "high");
    assert_eq!(value.updated_at, TestEnv::START + 1);
    assert!(stored.key.options.iter().any(|o| o.name == "high"));
    assert!(env.notifier.notified().contains(&ga_id));
}

#[test]
fn edits_within_the_same_instant_do_not_overwrite() {
    let env = TestEnv::new();
    priority_view(&env);
    let ga_id = mark_priority(&env);
    env.api.sync_column("av1", "kc").unwrap();

    env.clock.advance(1);
    env.api
        .set_block_attrs("b1", attrs(&[("custom-priority", "high")]))
        .unwrap();
    let results = env
        .api
        .set_block_attrs("b1", attrs(&[("custom-priority", "medium")]))
        .unwrap();

    assert_eq!(results[0].outcome, SyncOutcome::Skipped(SkipReason::Stale));
    let stored = env.api.get_attr(&ga_id).unwrap();
    assert_eq!(stored.value("b1").unwrap().selects()[0].content, "high");
    assert_eq!(env.blocks.attr("b1", "custom-priority").as_deref(), Some("medium"));
}

#[test]
fn blocks_outside_the_ga_are_left_alone() {
    let env = TestEnv::new();
    priority_view(&env);
    let ga_id = mark_priority(&env);

    let results = env
        .api
        .set_block_attrs("b9", attrs(&[("custom-priority", "high")]))
        .unwrap();

    assert_eq!(results[0].outcome, SyncOutcome::Skipped(SkipReason::NotBound));
    assert!(env.api.get_attr(&ga_id).unwrap().value("b9").is_none());
}

#[test]
fn bind_and_unbind_a_single_block() {
    let env = TestEnv::new();
    priority_view(&env);
    let ga_id = mark_priority(&env);

    let value = env
        .api
        .bind_block(BindBlockRequest::new("b2", &ga_id).with_value(json!("medium")))
        .unwrap();
    assert_eq!(value.selects()[0].content, "medium");
    assert_eq!(env.blocks.attr("b2", "custom-priority").as_deref(), Some("medium"));
    assert_eq!(env.blocks.attr("b2", "custom-gas").as_deref(), Some(ga_id.as_str()));

    env.api.unbind_block("b2", &ga_id).unwrap();
    assert!(env.blocks.get("b2").is_empty());
    assert!(env.api.get_attr(&ga_id).unwrap().value("b2").is_none());
    assert!(env.api.get_attr(&ga_id).unwrap().value("b1").is_some());
}

#[test]
fn second_custom_attribute_with_the_same_name_is_refused() {
    let env = TestEnv::new();
    priority_view(&env);
    let ga_id = mark_priority(&env);

    env.views.insert(view_with_column(
        "av2",
        Key::new("kx", "priority", KeyType::Text),
        &[("r1", Some("b1"))],
    ));

    let err = env
        .api
        .mark_column(
            MarkColumnRequest::new("av2", "kx")
                .custom(true)
                .create_if_absent(),
        )
        .unwrap_err();
    assert!(err.to_string().contains(&ga_id));
    let view = env.views.get("av2").unwrap();
    assert!(view.key_values("kx").unwrap().key.ga_id.is_empty());
}

#[test]
fn builtin_column_reads_and_writes_block_attributes() {
    let env = TestEnv::new();
    env.views.insert(view_with_column(
        "av1",
        Key::new("kc", "Memo", KeyType::Text),
        &[("r1", Some("b1"))],
    ));
    env.index.insert(IndexedBlock::new("b1", "p"));
    env.blocks.set_attr("b1", "memo", "remember");

    let outcome = env
        .api
        .mark_column(MarkColumnRequest::new("av1", "kc").ga("memo"))
        .unwrap();
    assert_eq!(outcome.data.unwrap().ga_id, "memo");

    let view = env.api.hydrate_view("av1").unwrap();
    let hydrated = view.key_values("kc").unwrap().value("r1").unwrap().clone();
    assert_eq!(hydrated.text(), Some("remember"));

    let edited = Value::with_content(KeyType::Text, ValueContent::text("forget"));
    env.api.write_builtin_cell("b1", "memo", &edited).unwrap();
    assert_eq!(env.blocks.attr("b1", "memo").as_deref(), Some("forget"));
    assert!(env.api.store().list().unwrap().is_empty());
}

#[test]
fn unbinding_a_column_keeps_the_ga() {
    let env = TestEnv::new();
    priority_view(&env);
    let ga_id = mark_priority(&env);

    let outcome = env
        .api
        .mark_column(MarkColumnRequest::new("av1", "kc").disabled())
        .unwrap();

    assert!(outcome.data.is_none());
    let view = env.views.get("av1").unwrap();
    assert!(view.key_values("kc").unwrap().key.ga_id.is_empty());
    assert!(env.api.get_attr(&ga_id).is_ok());
}
