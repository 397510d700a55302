//! Text output for the catalog commands.
//!
//! Widths are applied to plain text before styling so columns line up with
//! or without color.

use console::style;
use globalattr::attributes::inline::to_inline;
use globalattr::{GlobalAttrMeta, GlobalAttribute};

const ID_WIDTH: usize = 24;
const NAME_WIDTH: usize = 18;
const TYPE_WIDTH: usize = 10;

pub fn attr_list(metas: &[GlobalAttrMeta]) -> String {
    if metas.is_empty() {
        return "No global attributes.\n".to_string();
    }

    let mut out = String::new();
    for meta in metas {
        let mut line = format!(
            "{} {} {}",
            style(format!("{:<w$}", meta.ga_id, w = ID_WIDTH)).dim(),
            style(format!("{:<w$}", meta.name, w = NAME_WIDTH)).bold(),
            style(format!("{:<w$}", meta.kind.as_str(), w = TYPE_WIDTH)).cyan(),
        );
        if meta.builtin {
            let tag = if meta.writable { "builtin" } else { "builtin, read-only" };
            line.push_str(&format!(" {}", style(tag).yellow()));
        }
        if meta.is_custom_attr {
            line.push_str(&format!(" {}", style("custom").green()));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn created(meta: &GlobalAttrMeta) -> String {
    format!(
        "Created global attribute {} ({})",
        style(&meta.name).bold(),
        meta.ga_id
    )
}

pub fn attr_detail(attr: &GlobalAttribute) -> String {
    let key = &attr.key;
    let mut out = format!("{} ({})\n", style(&key.name).bold(), attr.id());
    out.push_str(&format!("type: {}\n", key.kind));
    if key.is_custom_attr {
        out.push_str(&format!("inline attribute: custom-{}\n", key.name));
    }
    if !key.desc.is_empty() {
        out.push_str(&format!("description: {}\n", key.desc));
    }
    if !key.options.is_empty() {
        let names: Vec<&str> = key.options.iter().map(|o| o.name.as_str()).collect();
        out.push_str(&format!("options: {}\n", names.join(", ")));
    }

    if attr.values.is_empty() {
        out.push_str("no bound blocks\n");
        return out;
    }
    out.push_str(&format!("values ({}):\n", attr.values.len()));
    for value in &attr.values {
        out.push_str(&format!(
            "  {} {}\n",
            style(format!("{:<w$}", value.block_ref_id, w = ID_WIDTH)).dim(),
            to_inline(value)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use globalattr::attributes::{Key, KeyType, SelectOption, Value, ValueContent};

    fn plain() {
        console::set_colors_enabled(false);
    }

    fn meta(id: &str, name: &str, kind: KeyType, custom: bool) -> GlobalAttrMeta {
        let mut key = Key::new(id, name, kind);
        key.is_custom_attr = custom;
        GlobalAttrMeta::from_key(id, &key)
    }

    fn builtin(id: &str, name: &str, writable: bool) -> GlobalAttrMeta {
        let mut meta = meta(id, name, KeyType::Text, false);
        meta.builtin = true;
        meta.writable = writable;
        meta
    }

    #[test]
    fn list_marks_builtin_and_custom() {
        plain();
        let out = attr_list(&[
            builtin("memo", "Memo", true),
            builtin("hash", "Hash", false),
            meta("g1", "Status", KeyType::Select, true),
        ]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("memo "));
        assert!(lines[0].ends_with("builtin"));
        assert!(lines[1].ends_with("builtin, read-only"));
        assert!(lines[2].contains("Status"));
        assert!(lines[2].contains("select"));
        assert!(lines[2].ends_with("custom"));
    }

    #[test]
    fn empty_list_says_so() {
        plain();
        assert_eq!(attr_list(&[]), "No global attributes.\n");
    }

    #[test]
    fn detail_shows_options_and_values() {
        plain();
        let mut key = Key::new("g1", "Status", KeyType::Text);
        key.is_custom_attr = true;
        key.options.push(SelectOption::new("Done", "1"));
        let mut attr = GlobalAttribute::new(key);
        attr.upsert_value(
            "b1",
            &Value::with_content(KeyType::Text, ValueContent::text("ship it")),
        );

        let out = attr_detail(&attr);
        assert!(out.starts_with("Status (g1)\n"));
        assert!(out.contains("type: text\n"));
        assert!(out.contains("inline attribute: custom-Status\n"));
        assert!(out.contains("options: Done\n"));
        assert!(out.contains("values (1):\n"));
        assert!(out.contains("ship it"));
    }

    #[test]
    fn detail_without_values() {
        plain();
        let attr = GlobalAttribute::new(Key::new("g1", "Status", KeyType::Text));
        assert!(attr_detail(&attr).ends_with("no bound blocks\n"));
    }
}
