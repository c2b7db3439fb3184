use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How `content_value` should be interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Json,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Json => "json",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = std::convert::Infallible;

    /// Anything other than `json` is read as plain text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.eq_ignore_ascii_case("json") {
            ContentType::Json
        } else {
            ContentType::Text
        })
    }
}

/// Marks a link-valued key as pointing inside the site or elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Internal,
    External,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Internal => "internal",
            LinkType::External => "external",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "internal" => Some(LinkType::Internal),
            "external" => Some(LinkType::External),
            _ => None,
        }
    }
}

/// One `(page, section, key) -> value` record of the `page_content` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRow {
    pub page: String,
    pub section: String,
    pub content_key: String,
    pub content_value: String,
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<LinkType>,
    #[serde(default)]
    pub display_order: i32,
}

impl ContentRow {
    pub fn text(
        page: impl Into<String>,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            page: page.into(),
            section: section.into(),
            content_key: key.into(),
            content_value: value.into(),
            content_type: ContentType::Text,
            link_type: None,
            display_order: 0,
        }
    }

    pub fn json(
        page: impl Into<String>,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            content_type: ContentType::Json,
            ..Self::text(page, section, key, value)
        }
    }

    pub fn with_order(mut self, display_order: i32) -> Self {
        self.display_order = display_order;
        self
    }

    pub fn with_link_type(mut self, link_type: LinkType) -> Self {
        self.link_type = Some(link_type);
        self
    }
}
