use lodge_site_core::activity::ActivityImage;
use lodge_site_core::pages::Page;

use super::{Accommodation, Block, Card, Faq, Feature, Hero, Link, PageContent, PageView, RuleCategory};

/// Build the view for `page`. `attractions` replaces the attraction cards
/// of the activities page when the gallery table has entries.
pub fn build(content: &PageContent<'_>, page: Page, attractions: &[ActivityImage]) -> PageView {
    let blocks = match page {
        Page::Home => home(content),
        Page::About => about(content),
        Page::Accommodations => accommodations(content),
        Page::Amenities => amenities(content),
        Page::Activities => activities(content, attractions),
        Page::Reservations => reservations(content),
        Page::RulesFaqs => rules_faqs(content),
        Page::Contact => contact(content),
    };
    PageView {
        page,
        hero: hero(content, page),
        blocks,
    }
}

fn hero(content: &PageContent<'_>, page: Page) -> Hero {
    if page == Page::Home {
        let cta = content
            .opt_text("hero", "ctaText")
            .map(|label| content.link(label, "hero", "ctaLink", Page::Reservations.path()));
        return Hero {
            title: content.text("hero", "title", "Pine Ridge RV Park & Lodge"),
            subtitle: content.text("hero", "subtitle", "Your home base in the valley."),
            image: content.opt_text("hero", "image"),
            cta,
        };
    }

    Hero {
        title: content.text("header", "title", page.nav_label()),
        subtitle: content.text("header", "subtitle", ""),
        image: content.opt_text("header", "image"),
        cta: None,
    }
}

fn feature_cards(items: Vec<Feature>) -> Vec<Card> {
    items
        .into_iter()
        .map(|f| Card {
            link: f.learn_more.map(|href| Link::new("Learn more", href)),
            title: f.title,
            body: f.description,
            image: f.image,
            ..Default::default()
        })
        .collect()
}

/// A heading plus a card grid read from `{section}.items`.
fn feature_block(content: &PageContent<'_>, section: &str, heading: &str) -> Block {
    Block {
        heading: Some(content.text(section, "heading", heading)),
        cards: feature_cards(content.list(section, "items")),
        ..Block::new(section)
    }
}

fn home(content: &PageContent<'_>) -> Vec<Block> {
    let welcome = Block {
        heading: Some(content.text("welcome", "heading", "Welcome")),
        body: content.opt_text("welcome", "body"),
        ..Block::new("welcome")
    };
    let call_to_action = Block {
        heading: Some(content.text("callToAction", "heading", "Plan Your Visit")),
        body: content.opt_text("callToAction", "body"),
        link: Some(content.link(
            content.text("callToAction", "buttonText", "Book Now"),
            "callToAction",
            "buttonLink",
            Page::Reservations.path(),
        )),
        ..Block::new("callToAction")
    };
    vec![
        welcome,
        feature_block(content, "highlights", "Highlights"),
        call_to_action,
    ]
}

fn about(content: &PageContent<'_>) -> Vec<Block> {
    let story = Block {
        heading: Some(content.text("story", "heading", "Our Story")),
        body: content.opt_text("story", "body"),
        ..Block::new("story")
    };
    vec![story, feature_block(content, "values", "Our Values")]
}

fn accommodations(content: &PageContent<'_>) -> Vec<Block> {
    let items: Vec<Accommodation> = content.list("accommodations", "accommodations");
    let cards = items
        .into_iter()
        .map(|a| Card {
            title: a.name,
            body: a.description,
            image: a.image,
            meta: Some(a.price).filter(|p| !p.is_empty()),
            bullets: a.features.into_iter().map(|f| f.text).collect(),
            link: Some(Link::new("Reserve", Page::Reservations.path())),
        })
        .collect();
    vec![Block {
        cards,
        ..Block::new("accommodations")
    }]
}

fn amenities(content: &PageContent<'_>) -> Vec<Block> {
    vec![feature_block(content, "amenities", "Amenities")]
}

fn activities(content: &PageContent<'_>, attractions: &[ActivityImage]) -> Vec<Block> {
    let mut nearby = feature_block(content, "attractions", "Nearby Attractions");
    if !attractions.is_empty() {
        nearby.cards = attractions
            .iter()
            .map(|a| Card {
                title: a.title.clone(),
                body: a.description.clone(),
                image: Some(a.image_url.clone()),
                link: a.learn_more.clone().map(|href| Link::new("Learn more", href)),
                ..Default::default()
            })
            .collect();
    }
    vec![feature_block(content, "onSite", "At the Park"), nearby]
}

fn reservations(content: &PageContent<'_>) -> Vec<Block> {
    let mut details = Vec::new();
    if let Some(phone) = content.opt_text("booking", "phone") {
        details.push(("Phone".to_string(), phone));
    }
    if let Some(email) = content.opt_text("booking", "email") {
        details.push(("Email".to_string(), email));
    }
    let booking = Block {
        heading: Some(content.text("booking", "heading", "Book Your Stay")),
        body: content.opt_text("booking", "body"),
        details,
        link: content.opt_link("Book online", "booking", "bookingLink"),
        ..Block::new("booking")
    };
    vec![booking, feature_block(content, "policies", "Policies")]
}

fn rules_faqs(content: &PageContent<'_>) -> Vec<Block> {
    let note = Block {
        note: content.opt_text("importantNote", "importantNote"),
        ..Block::new("importantNote")
    };

    let categories: Vec<RuleCategory> = content.list("parkRules", "categories");
    let rules = Block {
        heading: Some("Park Rules".to_string()),
        cards: categories
            .into_iter()
            .map(|c| Card {
                title: c.title,
                bullets: c.rules.into_iter().map(|r| r.text).collect(),
                ..Default::default()
            })
            .collect(),
        ..Block::new("parkRules")
    };

    let faqs: Vec<Faq> = content.list("faqs", "faqs");
    let faqs = Block {
        heading: Some("Frequently Asked Questions".to_string()),
        faqs,
        ..Block::new("faqs")
    };

    vec![note, rules, faqs]
}

fn contact(content: &PageContent<'_>) -> Vec<Block> {
    let rows = [
        ("Address", "address"),
        ("Phone", "phone"),
        ("Email", "email"),
        ("Hours", "hours"),
    ];
    let details = rows
        .into_iter()
        .filter_map(|(label, key)| {
            content
                .opt_text("details", key)
                .map(|value| (label.to_string(), value))
        })
        .collect();
    vec![Block {
        heading: Some("Get in Touch".to_string()),
        details,
        link: content.opt_link("Open map", "details", "mapLink"),
        ..Block::new("details")
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodge_site_core::activity::{NewActivityImage, ATTRACTION_CATEGORY};
    use lodge_site_core::content::ContentTree;
    use serde_json::json;

    fn view(page: Page, tree: &ContentTree) -> PageView {
        build(&PageContent::new(page, tree), page, &[])
    }

    #[test]
    fn every_page_renders_from_defaults() {
        for page in Page::ALL {
            let defaults = page.defaults();
            let view = view(page, &defaults);
            assert!(!view.hero.title.is_empty(), "{page} has no title");
            assert!(!view.blocks.is_empty(), "{page} has no blocks");
        }
    }

    #[test]
    fn empty_tree_uses_literal_fallbacks() {
        let empty = ContentTree::new();
        let home = view(Page::Home, &empty);
        assert_eq!(home.hero.title, "Pine Ridge RV Park & Lodge");
        assert!(home.hero.cta.is_none());
        assert_eq!(home.blocks[0].heading.as_deref(), Some("Welcome"));

        let about = view(Page::About, &empty);
        assert_eq!(about.hero.title, "About");
        assert!(about.blocks[1].cards.is_empty());
    }

    #[test]
    fn rules_page_lists_categories_and_faqs() {
        let defaults = Page::RulesFaqs.defaults();
        let view = view(Page::RulesFaqs, &defaults);
        let rules = &view.blocks[1];
        assert_eq!(rules.cards.len(), 3);
        assert_eq!(rules.cards[1].title, "Pets");
        assert_eq!(view.blocks[2].faqs.len(), 3);
        assert!(view.blocks[0].note.is_some());
    }

    #[test]
    fn stored_attractions_replace_default_cards() {
        let defaults = Page::Activities.defaults();
        let image = ActivityImage::from_new(
            NewActivityImage {
                key: "river".into(),
                image_url: "/media/river.jpg".into(),
                title: "River Tubing".into(),
                description: "Float the lazy river.".into(),
                learn_more: None,
                category: ATTRACTION_CATEGORY.into(),
                display_order: None,
            },
            0,
        );
        let view = build(
            &PageContent::new(Page::Activities, &defaults),
            Page::Activities,
            &[image],
        );
        let nearby = &view.blocks[1];
        assert_eq!(nearby.cards.len(), 1);
        assert_eq!(nearby.cards[0].title, "River Tubing");
        assert_eq!(nearby.cards[0].image.as_deref(), Some("/media/river.jpg"));
    }

    #[test]
    fn accommodation_features_become_bullets() {
        let tree = match json!({
            "accommodations": {
                "accommodations": [
                    { "id": "a", "name": "Yurt", "description": "Round", "price": "", "features": [{ "id": "f", "text": "Heated" }] }
                ]
            }
        }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let view = view(Page::Accommodations, &tree);
        let card = &view.blocks[0].cards[0];
        assert_eq!(card.bullets, ["Heated"]);
        assert!(card.meta.is_none());
    }
}
