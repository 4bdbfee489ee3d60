//! Turns a downloaded form page into a [`Form`].
//!
//! Everything that knows about the upstream markup lives here. The primary
//! source is the `FB_PUBLIC_LOAD_DATA_` JSON blob the page embeds in a script
//! tag; when that is missing or unreadable the named `entry.*` inputs of the
//! rendered page are scanned instead.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use super::{FieldKind, Form, FormField, FormUrls};
use crate::error::Error;

static LOAD_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)FB_PUBLIC_LOAD_DATA_\s*=\s*(.*?);\s*</script>").unwrap()
});

static FBZX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""fbzx":"([^"]+)""#).unwrap());

static ENTRY_INPUT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"input[name^="entry."], textarea[name^="entry."]"#).unwrap()
});

static HIDDEN_INPUT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[type="hidden"]"#).unwrap());

static PAGE_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

const MAX_LABEL_CHARS: usize = 80;

/// Choice grid. Every answer group is a row, even when there is only one.
const GRID: i64 = 7;

/// Parse a form page. Fails when no question can be found by either method.
pub fn parse_page(html: &str, urls: &FormUrls) -> Result<Form, Error> {
    let document = Html::parse_document(html);

    let data = extract_load_data(html);
    let mut fields = data.as_ref().map(fields_from_load_data).unwrap_or_default();

    if fields.is_empty() {
        tracing::debug!("No embedded form data found, scanning entry inputs");
        fields = fields_from_inputs(&document);
    }

    if fields.is_empty() {
        return Err(Error::Fetch(
            "Could not find any questions in the form. Make sure the URL is correct \
             and the form doesn't require sign-in."
                .to_string(),
        ));
    }

    let title = data
        .as_ref()
        .and_then(form_title)
        .or_else(|| page_title(&document));

    Ok(Form {
        form_id: urls.form_id.clone(),
        title,
        view_url: urls.view_url.clone(),
        submit_url: urls.submit_url.clone(),
        fields,
        hidden_fields: hidden_fields(&document, html),
    })
}

fn extract_load_data(html: &str) -> Option<Value> {
    let caps = LOAD_DATA_RE.captures(html)?;
    match serde_json::from_str(&caps[1]) {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::debug!("FB_PUBLIC_LOAD_DATA_ is not valid JSON: {e}");
            None
        }
    }
}

/// `data[1][1]` holds the questions; each answer group in `item[4]` becomes one field.
fn fields_from_load_data(data: &Value) -> Vec<FormField> {
    let Some(items) = data.get(1).and_then(|d| d.get(1)).and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut fields: Vec<FormField> = Vec::new();

    for item in items {
        let Some(item) = item.as_array() else {
            continue;
        };
        if item.len() < 5 {
            continue;
        }

        let title = item[1]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Unknown");
        let type_code = item[3].as_i64();

        let Some(groups) = item[4].as_array() else {
            continue;
        };

        for group in groups {
            let Some(group) = group.as_array() else {
                continue;
            };
            let Some(id) = group.first().and_then(entry_id) else {
                continue;
            };
            let id = format!("entry.{id}");
            if fields.iter().any(|f| f.id == id) {
                continue;
            }

            let options: Vec<String> = group
                .get(1)
                .and_then(Value::as_array)
                .map(|opts| {
                    opts.iter()
                        .filter_map(|opt| opt.get(0).and_then(Value::as_str))
                        .filter(|label| !label.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();

            let required = group.get(2).and_then(Value::as_i64) == Some(1);

            let row = group.get(3).and_then(row_label);
            let label = match row {
                Some(row) if groups.len() > 1 || type_code == Some(GRID) => {
                    format!("{title} [{row}]")
                }
                _ => title.to_string(),
            };

            let kind = kind_for(type_code, !options.is_empty());

            fields.push(FormField {
                id,
                label,
                kind,
                required,
                options: if kind == FieldKind::Text { Vec::new() } else { options },
            });
        }
    }

    fields
}

/// Entry IDs appear either as a bare number or wrapped in a one-element list.
fn entry_id(value: &Value) -> Option<String> {
    let id = match value {
        Value::Array(inner) => inner.first()?,
        other => other,
    };
    match id {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(|v| v.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Grid rows carry their label either as a string or as a one-element list.
fn row_label(value: &Value) -> Option<&str> {
    let label = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Array(inner) => inner.first().and_then(Value::as_str),
        _ => None,
    };
    label.filter(|s| !s.is_empty())
}

fn kind_for(type_code: Option<i64>, has_options: bool) -> FieldKind {
    let kind = match type_code {
        Some(0 | 1 | 9 | 10) => FieldKind::Text,
        Some(4) => FieldKind::MultiChoice,
        Some(2 | 3 | 5 | 7 | 18) => FieldKind::SingleChoice,
        _ if has_options => FieldKind::SingleChoice,
        _ => FieldKind::Text,
    };

    // A choice question we could not read any options for can only take text.
    if kind != FieldKind::Text && !has_options {
        FieldKind::Text
    } else {
        kind
    }
}

fn form_title(data: &Value) -> Option<String> {
    data.get(1)
        .and_then(|d| d.get(8))
        .and_then(Value::as_str)
        .or_else(|| data.get(3).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn page_title(document: &Html) -> Option<String> {
    document
        .select(&PAGE_TITLE)
        .next()
        .map(|el| normalize_text(el.text()))
        .filter(|s| !s.is_empty())
}

fn fields_from_inputs(document: &Html) -> Vec<FormField> {
    let mut fields: Vec<FormField> = Vec::new();

    for input in document.select(&ENTRY_INPUT) {
        let el = input.value();
        let Some(name) = el.attr("name") else {
            continue;
        };
        let input_type = el.attr("type").unwrap_or("text").to_ascii_lowercase();
        if input_type == "hidden" || name.ends_with("_sentinel") {
            continue;
        }

        let kind = match input_type.as_str() {
            "radio" => FieldKind::SingleChoice,
            "checkbox" => FieldKind::MultiChoice,
            _ => FieldKind::Text,
        };
        let option = el
            .attr("value")
            .filter(|v| !v.is_empty() && kind != FieldKind::Text);

        if let Some(existing) = fields.iter_mut().find(|f| f.id == name) {
            if let Some(value) = option {
                if !existing.has_option(value) {
                    existing.options.push(value.to_string());
                }
            }
            continue;
        }

        fields.push(FormField {
            id: name.to_string(),
            label: nearest_label(input).unwrap_or_else(|| name.to_string()),
            kind,
            required: el.attr("required").is_some(),
            options: option.into_iter().map(str::to_string).collect(),
        });
    }

    for field in &mut fields {
        if field.kind != FieldKind::Text && field.options.is_empty() {
            field.kind = FieldKind::Text;
        }
    }

    fields
}

fn nearest_label(input: ElementRef<'_>) -> Option<String> {
    input
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| {
            el.value().name() == "div"
                && el
                    .value()
                    .attr("class")
                    .is_some_and(|c| c.contains("freebirdFormview"))
        })
        .map(|el| normalize_text(el.text()))
        .filter(|text| !text.is_empty())
        .map(|text| text.chars().take(MAX_LABEL_CHARS).collect())
}

fn normalize_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extra keys the response endpoint expects alongside the answers.
fn hidden_fields(document: &Html, html: &str) -> BTreeMap<String, String> {
    let mut hidden = BTreeMap::new();

    for input in document.select(&HIDDEN_INPUT) {
        let el = input.value();
        let Some(name) = el.attr("name").filter(|n| !n.is_empty()) else {
            continue;
        };
        // Checkbox sentinels are sent back as-is; other entry inputs are questions.
        if name.starts_with("entry.") && !name.ends_with("_sentinel") {
            continue;
        }
        hidden.insert(name.to_string(), el.attr("value").unwrap_or("").to_string());
    }

    if !hidden.contains_key("fbzx") {
        if let Some(caps) = FBZX_RE.captures(html) {
            hidden.insert("fbzx".to_string(), caps[1].to_string());
        }
    }

    hidden
        .entry("fvv".to_string())
        .or_insert_with(|| "1".to_string());
    hidden
        .entry("pageHistory".to_string())
        .or_insert_with(|| "0".to_string());

    hidden
}
