//! Page view models built from loaded content.
//!
//! Every read carries its own literal fallback, so a page renders even when
//! a stored value is missing or has the wrong shape.

mod items;
pub mod pages;

pub use items::{Accommodation, Faq, Feature, RuleCategory};

use lodge_site_core::content::{link_key, ContentTree, LinkType, LinkTypes};
use lodge_site_core::pages::Page;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Read access to a page-scoped content tree.
pub struct PageContent<'a> {
    page: Page,
    tree: &'a ContentTree,
    links: Option<&'a LinkTypes>,
}

impl<'a> PageContent<'a> {
    pub fn new(page: Page, tree: &'a ContentTree) -> Self {
        Self {
            page,
            tree,
            links: None,
        }
    }

    /// Stored link types, consulted by [`PageContent::link`].
    pub fn with_links(mut self, links: &'a LinkTypes) -> Self {
        self.links = Some(links);
        self
    }

    fn link_type(&self, section: &str, key: &str) -> Option<LinkType> {
        self.links?.get(&link_key(section, key)).copied()
    }

    /// A link whose href is read from `section.key`, or `fallback_href`.
    pub fn link(&self, label: impl Into<String>, section: &str, key: &str, fallback_href: &str) -> Link {
        let href = self.text(section, key, fallback_href);
        Link::typed(label, href, self.link_type(section, key))
    }

    /// A link only when `section.key` holds an href.
    pub fn opt_link(&self, label: impl Into<String>, section: &str, key: &str) -> Option<Link> {
        let href = self.opt_text(section, key)?;
        Some(Link::typed(label, href, self.link_type(section, key)))
    }

    fn value(&self, section: &str, key: &str) -> Option<&'a Value> {
        self.tree.get(section).and_then(|s| s.get(key))
    }

    /// A text field, or `fallback` when absent, empty or not a scalar.
    pub fn text(&self, section: &str, key: &str, fallback: &str) -> String {
        self.opt_text(section, key)
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn opt_text(&self, section: &str, key: &str) -> Option<String> {
        match self.value(section, key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// A structured list. Items of the wrong shape are skipped with a
    /// warning; a list stored as an unparseable string reads as empty.
    pub fn list<T: DeserializeOwned>(&self, section: &str, key: &str) -> Vec<T> {
        let items = match self.value(section, key) {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::String(raw)) => match serde_json::from_str::<Vec<Value>>(raw) {
                Ok(items) => items,
                Err(err) => {
                    tracing::warn!(page = %self.page, section, key, error = %err, "list content is not valid JSON");
                    return Vec::new();
                }
            },
            Some(Value::Null) | None => return Vec::new(),
            Some(other) => {
                tracing::warn!(page = %self.page, section, key, found = %other, "list content is not an array");
                return Vec::new();
            }
        };

        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    tracing::warn!(page = %self.page, section, key, error = %err, "skipping malformed list item");
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub label: String,
    pub href: String,
    pub external: bool,
}

impl Link {
    /// External when the target leaves the site.
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self::typed(label, href, None)
    }

    /// A stored link type wins; without one, absolute http(s) URLs are
    /// external.
    pub fn typed(label: impl Into<String>, href: impl Into<String>, link_type: Option<LinkType>) -> Self {
        let href = href.into();
        let external = match link_type {
            Some(t) => t == LinkType::External,
            None => href.starts_with("http://") || href.starts_with("https://"),
        };
        Self {
            label: label.into(),
            href,
            external,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hero {
    pub title: String,
    pub subtitle: String,
    pub image: Option<String>,
    pub cta: Option<Link>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Card {
    pub title: String,
    pub body: String,
    pub image: Option<String>,
    pub meta: Option<String>,
    pub bullets: Vec<String>,
    pub link: Option<Link>,
}

/// One vertical band of a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub anchor: String,
    pub heading: Option<String>,
    pub body: Option<String>,
    pub note: Option<String>,
    pub cards: Vec<Card>,
    pub faqs: Vec<Faq>,
    pub details: Vec<(String, String)>,
    pub link: Option<Link>,
}

impl Block {
    pub fn new(anchor: &str) -> Self {
        Self {
            anchor: anchor.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub page: Page,
    pub hero: Hero,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
    pub active: bool,
}

pub fn nav(current: Option<Page>) -> Vec<NavItem> {
    Page::ALL
        .into_iter()
        .map(|page| NavItem {
            label: page.nav_label(),
            href: page.path(),
            active: Some(page) == current,
        })
        .collect()
}

/// Contact details repeated in the footer of every page.
#[derive(Debug, Clone, PartialEq)]
pub struct Footer {
    pub address: String,
    pub phone: String,
    pub email: String,
    pub hours: String,
}

impl Footer {
    /// Built from the `details` section of the contact page.
    pub fn from_details(details: &ContentTree) -> Self {
        let get = |key: &str, fallback: &str| {
            details
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        Self {
            address: get("address", "1200 Lakeshore Road, Pine Ridge"),
            phone: get("phone", "(555) 010-2030"),
            email: get("email", "stay@pineridge.example"),
            hours: get("hours", "Office open daily"),
        }
    }
}
