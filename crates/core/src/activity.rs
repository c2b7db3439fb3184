//! Gallery and attraction cards stored in `activity_images`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category used by the activities page for its attraction cards.
pub const ATTRACTION_CATEGORY: &str = "attraction";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityImage {
    pub id: Uuid,
    pub key: String,
    pub image_url: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "learnMore", default)]
    pub learn_more: Option<String>,
    pub category: String,
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivityImage {
    pub key: String,
    pub image_url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "learnMore", default)]
    pub learn_more: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    /// Appended after the last card of the category when absent.
    #[serde(default)]
    pub display_order: Option<i32>,
}

fn default_category() -> String {
    ATTRACTION_CATEGORY.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityImageUpdate {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "learnMore", default)]
    pub learn_more: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub display_order: Option<i32>,
}

impl ActivityImage {
    pub fn from_new(new: NewActivityImage, display_order: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: new.key,
            image_url: new.image_url,
            title: new.title,
            description: new.description,
            learn_more: new.learn_more,
            category: new.category,
            display_order: new.display_order.unwrap_or(display_order),
        }
    }

    pub fn apply(&mut self, update: ActivityImageUpdate) {
        if let Some(key) = update.key {
            self.key = key;
        }
        if let Some(image_url) = update.image_url {
            self.image_url = image_url;
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(learn_more) = update.learn_more {
            self.learn_more = Some(learn_more);
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(display_order) = update.display_order {
            self.display_order = display_order;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn learn_more_uses_camel_case_on_the_wire() {
        let json = r#"{"key":"falls","image_url":"/media/falls.jpg","title":"Falls","learnMore":"https://falls.example"}"#;
        let new: NewActivityImage = serde_json::from_str(json).unwrap();
        assert_eq!(new.learn_more.as_deref(), Some("https://falls.example"));
        assert_eq!(new.category, ATTRACTION_CATEGORY);

        let image = ActivityImage::from_new(new, 3);
        assert_eq!(image.display_order, 3);
        let back = serde_json::to_value(&image).unwrap();
        assert_eq!(back["learnMore"], "https://falls.example");
    }

    #[test]
    fn apply_only_touches_given_fields() {
        let mut image = ActivityImage::from_new(
            NewActivityImage {
                key: "lake".into(),
                image_url: "/media/lake.jpg".into(),
                title: "Lake".into(),
                description: "Swim".into(),
                learn_more: None,
                category: default_category(),
                display_order: Some(0),
            },
            0,
        );
        image.apply(ActivityImageUpdate {
            title: Some("Crystal Lake".into()),
            ..Default::default()
        });
        assert_eq!(image.title, "Crystal Lake");
        assert_eq!(image.description, "Swim");
    }
}
