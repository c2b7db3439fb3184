use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::ops::{DraftOp, ListPath};
use super::DraftError;
use crate::content::reshape::{fold_rows, merge_over_fallback, unfold_tree};
use crate::content::{ContentRow, ContentScope, ContentTree, LinkType};

/// Unsaved copy of a page's content tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    page: String,
    content: ContentTree,
    link_types: BTreeMap<(String, String), LinkType>,
    dirty: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkEntry {
    pub section: String,
    pub key: String,
    pub link_type: LinkType,
}

/// Serializable view of a draft for the admin API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    pub page: String,
    pub content: ContentTree,
    pub links: Vec<LinkEntry>,
    pub dirty: bool,
}

fn item_id(item: &Value) -> Option<&str> {
    item.get("id").and_then(Value::as_str)
}

fn list_mut<'a>(
    content: &'a mut ContentTree,
    path: &ListPath,
) -> Result<&'a mut Vec<Value>, DraftError> {
    let section = content
        .entry(path.section.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(keys) = section else {
        return Err(DraftError::NotAnObject(path.section.clone()));
    };

    let mut list = keys
        .entry(path.key.clone())
        .or_insert_with(|| Value::Array(Vec::new()));

    for parent in &path.within {
        let Value::Array(items) = list else {
            return Err(DraftError::NotAList(path.to_string()));
        };
        let item = items
            .iter_mut()
            .find(|i| item_id(i) == Some(parent.id.as_str()))
            .ok_or_else(|| DraftError::ItemNotFound(parent.id.clone()))?;
        let Value::Object(fields) = item else {
            return Err(DraftError::NotAnObject(parent.id.clone()));
        };
        list = fields
            .entry(parent.field.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
    }

    match list {
        Value::Array(items) => Ok(items),
        _ => Err(DraftError::NotAList(path.to_string())),
    }
}

fn position(items: &[Value], id: &str) -> Result<usize, DraftError> {
    items
        .iter()
        .position(|i| item_id(i) == Some(id))
        .ok_or_else(|| DraftError::ItemNotFound(id.to_string()))
}

impl Draft {
    /// A draft holding only the given defaults.
    pub fn new(page: impl Into<String>, defaults: ContentTree) -> Self {
        Self {
            page: page.into(),
            content: defaults,
            link_types: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Stored rows overlaid onto the defaults.
    pub fn from_rows(page: impl Into<String>, defaults: &ContentTree, rows: &[ContentRow]) -> Self {
        let fetched = fold_rows(rows, &ContentScope::Page);
        let link_types = rows
            .iter()
            .filter_map(|r| {
                r.link_type
                    .map(|l| ((r.section.clone(), r.content_key.clone()), l))
            })
            .collect();

        Self {
            page: page.into(),
            content: merge_over_fallback(fetched, defaults, &ContentScope::Page),
            link_types,
            dirty: false,
        }
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn content(&self) -> &ContentTree {
        &self.content
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn link_type(&self, section: &str, key: &str) -> Option<LinkType> {
        self.link_types
            .get(&(section.to_string(), key.to_string()))
            .copied()
    }

    pub fn view(&self) -> DraftView {
        DraftView {
            page: self.page.clone(),
            content: self.content.clone(),
            links: self
                .link_types
                .iter()
                .map(|((section, key), link_type)| LinkEntry {
                    section: section.clone(),
                    key: key.clone(),
                    link_type: *link_type,
                })
                .collect(),
            dirty: self.dirty,
        }
    }

    /// Apply one operation. Returns the id of an added item.
    pub fn apply(&mut self, op: DraftOp) -> Result<Option<String>, DraftError> {
        match op {
            DraftOp::SetField {
                section,
                key,
                value,
                link_type,
            } => {
                self.set_field(&section, &key, value, link_type)?;
                Ok(None)
            }
            DraftOp::AddItem { list, item } => self.add_item(&list, item).map(Some),
            DraftOp::UpdateItem { list, id, fields } => {
                self.update_item(&list, &id, fields)?;
                Ok(None)
            }
            DraftOp::RemoveItem { list, id } => {
                self.remove_item(&list, &id)?;
                Ok(None)
            }
            DraftOp::MoveItem { list, id, to } => {
                self.move_item(&list, &id, to)?;
                Ok(None)
            }
        }
    }

    pub fn set_field(
        &mut self,
        section: &str,
        key: &str,
        value: Value,
        link_type: Option<LinkType>,
    ) -> Result<(), DraftError> {
        let entry = self
            .content
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(keys) = entry else {
            return Err(DraftError::NotAnObject(section.to_string()));
        };
        keys.insert(key.to_string(), value);

        if let Some(link_type) = link_type {
            self.link_types
                .insert((section.to_string(), key.to_string()), link_type);
        }
        self.dirty = true;
        Ok(())
    }

    pub fn add_item(&mut self, path: &ListPath, item: Value) -> Result<String, DraftError> {
        let Value::Object(mut fields) = item else {
            return Err(DraftError::InvalidItem(
                "list items must be JSON objects".into(),
            ));
        };

        let id = match fields.get("id").and_then(Value::as_str) {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => Uuid::new_v4().simple().to_string(),
        };
        fields.insert("id".into(), Value::String(id.clone()));

        let items = list_mut(&mut self.content, path)?;
        if items.iter().any(|i| item_id(i) == Some(id.as_str())) {
            return Err(DraftError::DuplicateItem(id));
        }
        items.push(Value::Object(fields));
        self.dirty = true;
        Ok(id)
    }

    pub fn update_item(
        &mut self,
        path: &ListPath,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), DraftError> {
        let items = list_mut(&mut self.content, path)?;
        let index = position(items, id)?;
        let Value::Object(existing) = &mut items[index] else {
            return Err(DraftError::NotAnObject(id.to_string()));
        };
        for (name, value) in fields {
            if name != "id" {
                existing.insert(name, value);
            }
        }
        self.dirty = true;
        Ok(())
    }

    pub fn remove_item(&mut self, path: &ListPath, id: &str) -> Result<Value, DraftError> {
        let items = list_mut(&mut self.content, path)?;
        let index = position(items, id)?;
        let removed = items.remove(index);
        self.dirty = true;
        Ok(removed)
    }

    pub fn move_item(&mut self, path: &ListPath, id: &str, to: usize) -> Result<(), DraftError> {
        let items = list_mut(&mut self.content, path)?;
        let index = position(items, id)?;
        let item = items.remove(index);
        let to = to.min(items.len());
        items.insert(to, item);
        self.dirty = true;
        Ok(())
    }

    /// Rows that represent this draft in the store.
    pub fn to_rows(&self) -> Vec<ContentRow> {
        unfold_tree(&self.page, &self.content)
            .into_iter()
            .map(|mut row| {
                row.link_type = self.link_type(&row.section, &row.content_key);
                row
            })
            .collect()
    }
}
