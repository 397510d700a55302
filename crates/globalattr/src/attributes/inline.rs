//! Conversion between inline attribute strings and typed values.
//!
//! Inline attributes are plain strings on a block. [`parse_inline`] turns one
//! into the payload for a key's type; [`to_inline`] renders a value back into
//! the string mirrored onto `custom-<name>` attributes.

use super::key::{Key, KeyType};
use super::value::{
    format_number, Value, ValueCheckbox, ValueContent, ValueDate, ValueNumber, ValueSelect,
    ValueText,
};
use chrono::{DateTime, Local, NaiveDate, TimeZone};

const DATE_FORMAT: &str = "%Y%m%d";
const DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Parses an inline attribute string into a payload for `key`'s type.
///
/// Returns `None` when the string does not parse or the type does not accept
/// inline values. New select options are appended to `key.options` with the
/// next palette color.
pub fn parse_inline(key: &mut Key, raw: &str) -> Option<ValueContent> {
    match key.kind {
        KeyType::Text => Some(ValueContent::Text(ValueText::new(raw))),
        KeyType::Number => raw
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(|n| ValueContent::Number(ValueNumber::new(n))),
        KeyType::Date => parse_date(raw).map(ValueContent::Date),
        KeyType::Select => {
            if raw.is_empty() {
                return Some(ValueContent::Selects(Vec::new()));
            }
            let color = key.option_color_or_insert(raw);
            Some(ValueContent::Selects(vec![ValueSelect::new(raw, color)]))
        }
        KeyType::MultiSelect => {
            let selects = split_csv(raw)
                .into_iter()
                .map(|part| {
                    let color = key.option_color_or_insert(&part);
                    ValueSelect::new(part, color)
                })
                .collect();
            Some(ValueContent::Selects(selects))
        }
        KeyType::Url => Some(ValueContent::Url(ValueText::new(raw))),
        KeyType::Email => Some(ValueContent::Email(ValueText::new(raw))),
        KeyType::Phone => Some(ValueContent::Phone(ValueText::new(raw))),
        KeyType::Checkbox => Some(ValueContent::Checkbox(ValueCheckbox {
            checked: raw == "true",
        })),
        _ => None,
    }
}

/// Parses `YYYYMMDD` (date only) or `YYYYMMDDhhmmss` in local time.
pub fn parse_date(raw: &str) -> Option<ValueDate> {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let is_not_time = match raw.len() {
        8 => true,
        14 => false,
        _ => return None,
    };

    let field = |range: std::ops::Range<usize>| raw.get(range)?.parse::<u32>().ok();
    let year = raw.get(0..4)?.parse::<i32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, field(4..6)?, field(6..8)?)?;
    let naive = if is_not_time {
        date.and_hms_opt(0, 0, 0)?
    } else {
        date.and_hms_opt(field(8..10)?, field(10..12)?, field(12..14)?)?
    };
    let local = Local.from_local_datetime(&naive).earliest()?;

    Some(ValueDate {
        content: local.timestamp_millis(),
        is_not_empty: true,
        is_not_time,
        ..Default::default()
    })
}

/// Renders a value as the inline attribute string mirrored onto blocks.
///
/// Select renders its content, multi-select joins with commas, dates use the
/// same compact forms [`parse_date`] accepts. Empty payloads render as `""`.
pub fn to_inline(value: &Value) -> String {
    match &value.content {
        None => String::new(),
        Some(ValueContent::Text(t))
        | Some(ValueContent::Url(t))
        | Some(ValueContent::Email(t))
        | Some(ValueContent::Phone(t))
        | Some(ValueContent::Template(t)) => t.content.clone(),
        Some(ValueContent::Block(b)) => b.content.clone(),
        Some(ValueContent::Number(n)) => {
            if n.is_not_empty {
                format_number(n.content)
            } else {
                String::new()
            }
        }
        Some(ValueContent::Date(d))
        | Some(ValueContent::Created(d))
        | Some(ValueContent::Updated(d)) => format_date(d),
        Some(ValueContent::Selects(selects)) => {
            if value.kind == KeyType::Select {
                selects
                    .first()
                    .map(|s| s.content.clone())
                    .unwrap_or_default()
            } else {
                selects
                    .iter()
                    .map(|s| s.content.as_str())
                    .collect::<Vec<_>>()
                    .join(",")
            }
        }
        Some(ValueContent::Checkbox(c)) => c.checked.to_string(),
        Some(ValueContent::Assets(assets)) => assets
            .iter()
            .map(|a| a.content.as_str())
            .collect::<Vec<_>>()
            .join(","),
        Some(ValueContent::Relation(r)) => r.block_ids.join(","),
        Some(ValueContent::Rollup(r)) => r
            .contents
            .iter()
            .map(to_inline)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(","),
    }
}

fn format_date(date: &ValueDate) -> String {
    if !date.is_not_empty {
        return String::new();
    }
    let Some(local) = DateTime::from_timestamp_millis(date.content).map(|t| t.with_timezone(&Local))
    else {
        return String::new();
    };
    let format = if date.is_not_time {
        DATE_FORMAT
    } else {
        DATETIME_FORMAT
    };
    local.format(format).to_string()
}

/// Comma split with trimming; empty parts are dropped.
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::key::SelectOption;

    fn key(kind: KeyType) -> Key {
        Key::new("k", "attr", kind)
    }

    #[test]
    fn parses_date_only_as_local_midnight() {
        let mut k = key(KeyType::Date);
        let parsed = parse_inline(&mut k, "20240101").unwrap();
        let expected = Local
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .earliest()
            .unwrap()
            .timestamp_millis();
        match parsed {
            ValueContent::Date(d) => {
                assert_eq!(d.content, expected);
                assert!(d.is_not_time);
                assert!(d.is_not_empty);
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn parses_date_time() {
        let d = parse_date("20240315083000").unwrap();
        let expected = Local
            .with_ymd_and_hms(2024, 3, 15, 8, 30, 0)
            .earliest()
            .unwrap()
            .timestamp_millis();
        assert_eq!(d.content, expected);
        assert!(!d.is_not_time);
    }

    #[test]
    fn rejects_other_date_lengths_and_garbage() {
        let mut k = key(KeyType::Date);
        assert!(parse_inline(&mut k, "2024010112").is_none());
        assert!(parse_inline(&mut k, "20240101123").is_none());
        assert!(parse_inline(&mut k, "2024-1-1").is_none());
        assert!(parse_inline(&mut k, "20241301").is_none());
        assert!(parse_inline(&mut k, "").is_none());
    }

    #[test]
    fn number_parse_failure_drops() {
        let mut k = key(KeyType::Number);
        assert!(parse_inline(&mut k, "abc").is_none());
        match parse_inline(&mut k, "3.50").unwrap() {
            ValueContent::Number(n) => {
                assert_eq!(n.content, 3.5);
                assert!(n.is_not_empty);
                assert_eq!(n.formatted_content, "3.5");
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn non_finite_numbers_drop() {
        let mut k = key(KeyType::Number);
        for raw in ["NaN", "nan", "inf", "-inf", "infinity"] {
            assert!(parse_inline(&mut k, raw).is_none(), "{} should not parse", raw);
        }
        assert!(parse_inline(&mut k, "1e308").is_some());
    }

    #[test]
    fn select_auto_colors_new_options() {
        let mut k = key(KeyType::Select);
        k.options.push(SelectOption::new("Todo", "5"));

        let known = parse_inline(&mut k, "Todo").unwrap();
        assert_eq!(known, ValueContent::Selects(vec![ValueSelect::new("Todo", "5")]));

        let fresh = parse_inline(&mut k, "Done").unwrap();
        assert_eq!(fresh, ValueContent::Selects(vec![ValueSelect::new("Done", "2")]));
        assert_eq!(k.options.len(), 2);
    }

    #[test]
    fn multi_select_splits_trims_and_drops_empties() {
        let mut k = key(KeyType::MultiSelect);
        let parsed = parse_inline(&mut k, " a, ,b ,").unwrap();
        assert_eq!(
            parsed,
            ValueContent::Selects(vec![ValueSelect::new("a", "1"), ValueSelect::new("b", "2")])
        );
    }

    #[test]
    fn checkbox_is_true_only_for_literal_true() {
        let mut k = key(KeyType::Checkbox);
        assert_eq!(
            parse_inline(&mut k, "true").unwrap(),
            ValueContent::Checkbox(ValueCheckbox { checked: true })
        );
        assert_eq!(
            parse_inline(&mut k, "TRUE").unwrap(),
            ValueContent::Checkbox(ValueCheckbox { checked: false })
        );
    }

    #[test]
    fn computed_and_relation_types_are_unsupported() {
        for kind in [KeyType::Relation, KeyType::Rollup, KeyType::Template] {
            let mut k = key(kind);
            assert!(parse_inline(&mut k, "x").is_none(), "{} accepted", kind);
        }
    }

    #[test]
    fn to_inline_round_trips_common_types() {
        let mut k = key(KeyType::MultiSelect);
        let content = parse_inline(&mut k, "a,b").unwrap();
        let value = Value::with_content(KeyType::MultiSelect, content);
        assert_eq!(to_inline(&value), "a,b");

        let mut k = key(KeyType::Date);
        let content = parse_inline(&mut k, "20240101").unwrap();
        let value = Value::with_content(KeyType::Date, content);
        assert_eq!(to_inline(&value), "20240101");

        let value = Value::with_content(
            KeyType::Select,
            ValueContent::Selects(vec![ValueSelect::new("Done", "1")]),
        );
        assert_eq!(to_inline(&value), "Done");

        assert_eq!(to_inline(&Value::empty(KeyType::Number)), "");
        assert_eq!(to_inline(&Value::empty(KeyType::Checkbox)), "false");
    }

    #[test]
    fn split_csv_trims() {
        assert_eq!(split_csv(" x ,y,,"), vec!["x".to_string(), "y".to_string()]);
        assert!(split_csv("").is_empty());
    }
}
