use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::row::{ContentRow, ContentType, LinkType};

/// Nested content as handed to pages: `{ section: { key: value } }` for a
/// whole page, `{ key: value }` for a single section.
pub type ContentTree = Map<String, Value>;

/// Stored link types, keyed `section.key`.
pub type LinkTypes = BTreeMap<String, LinkType>;

pub fn link_key(section: &str, key: &str) -> String {
    format!("{section}.{key}")
}

/// Link types of the rows that carry one.
pub fn link_types(rows: &[ContentRow]) -> LinkTypes {
    rows.iter()
        .filter_map(|r| Some((link_key(&r.section, &r.content_key), r.link_type?)))
        .collect()
}

/// Which rows a load covers and, with it, the shape of the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentScope {
    /// Every section of the page, grouped under section names.
    Page,
    /// One section, keys flattened to the top level.
    Section(String),
}

impl ContentScope {
    pub fn from_section(section: Option<&str>) -> Self {
        match section {
            Some(s) if !s.is_empty() => ContentScope::Section(s.to_string()),
            _ => ContentScope::Page,
        }
    }

    pub fn section(&self) -> Option<&str> {
        match self {
            ContentScope::Page => None,
            ContentScope::Section(s) => Some(s),
        }
    }
}

/// Decode a stored value. JSON that fails to parse stays the raw string.
pub fn decode_value(row: &ContentRow) -> Value {
    match row.content_type {
        ContentType::Text => Value::String(row.content_value.clone()),
        ContentType::Json => match serde_json::from_str(&row.content_value) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    page = %row.page,
                    section = %row.section,
                    key = %row.content_key,
                    error = %err,
                    "stored JSON content is malformed, keeping raw string"
                );
                Value::String(row.content_value.clone())
            }
        },
    }
}

/// Fold rows (already ordered by `display_order`) into a tree.
///
/// A later row with the same section and key overwrites an earlier one.
pub fn fold_rows(rows: &[ContentRow], scope: &ContentScope) -> ContentTree {
    let mut tree = ContentTree::new();

    for row in rows {
        let value = decode_value(row);
        match scope {
            ContentScope::Section(_) => {
                tree.insert(row.content_key.clone(), value);
            }
            ContentScope::Page => {
                let section = tree
                    .entry(row.section.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !section.is_object() {
                    *section = Value::Object(Map::new());
                }
                if let Value::Object(keys) = section {
                    keys.insert(row.content_key.clone(), value);
                }
            }
        }
    }

    tree
}

/// Merge fetched content over the fallback. Fallback values survive only
/// where the fetched tree has no entry.
///
/// For a page scope the merge goes one level down, so a section that is
/// only partly stored keeps the fallback for its missing keys.
pub fn merge_over_fallback(
    fetched: ContentTree,
    fallback: &ContentTree,
    scope: &ContentScope,
) -> ContentTree {
    let mut merged = fallback.clone();

    for (key, value) in fetched {
        match (scope, merged.get_mut(&key), value) {
            (ContentScope::Page, Some(Value::Object(base)), Value::Object(section)) => {
                for (inner_key, inner_value) in section {
                    base.insert(inner_key, inner_value);
                }
            }
            (_, _, value) => {
                merged.insert(key, value);
            }
        }
    }

    merged
}

/// Inverse of [`fold_rows`] for a page tree: one row per `(section, key)`.
///
/// Strings become `text` rows, anything else is serialized as `json`.
/// `display_order` counts up in tree order.
pub fn unfold_tree(page: &str, tree: &ContentTree) -> Vec<ContentRow> {
    let mut rows = Vec::new();

    for (section, keys) in tree {
        let Value::Object(keys) = keys else {
            tracing::warn!(page, section = %section, "section is not an object, skipped");
            continue;
        };
        for (key, value) in keys {
            let row = match value {
                Value::String(s) => ContentRow::text(page, section, key, s.clone()),
                other => ContentRow::json(page, section, key, other.to_string()),
            };
            rows.push(row.with_order(rows.len() as i32));
        }
    }

    rows
}
