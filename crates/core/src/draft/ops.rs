/// Draft operation definitions, applied one by one to an in-memory draft.
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content::LinkType;

/// Steps from a list item down into one of its nested lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: String,
    pub field: String,
}

/// Address of a repeatable list inside a draft.
///
/// `{ section: "parkRules", key: "categories" }` is the list of rule
/// categories; adding `within: [{ id: "pets", field: "rules" }]` addresses
/// the rules of the `pets` category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPath {
    pub section: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub within: Vec<ParentRef>,
}

impl ListPath {
    pub fn new(section: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
            within: Vec::new(),
        }
    }

    pub fn nested(mut self, id: impl Into<String>, field: impl Into<String>) -> Self {
        self.within.push(ParentRef {
            id: id.into(),
            field: field.into(),
        });
        self
    }
}

impl fmt::Display for ListPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section, self.key)?;
        for parent in &self.within {
            write!(f, "[{}].{}", parent.id, parent.field)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DraftOp {
    /// Replace a single value. A missing `linkType` keeps the current one.
    SetField {
        section: String,
        key: String,
        value: Value,
        #[serde(rename = "linkType", default, skip_serializing_if = "Option::is_none")]
        link_type: Option<LinkType>,
    },
    /// Append an item; an `id` is generated when the item has none.
    AddItem { list: ListPath, item: Value },
    /// Merge fields into an item. The `id` field cannot be changed.
    UpdateItem {
        list: ListPath,
        id: String,
        fields: Map<String, Value>,
    },
    RemoveItem { list: ListPath, id: String },
    /// Move an item to position `to`, clamped to the end of the list.
    MoveItem { list: ListPath, id: String, to: usize },
}
