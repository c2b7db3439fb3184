//! The fixed set of marketing pages and their fallback content.
//!
//! Fallback trees double as the seed of admin drafts, so every repeatable
//! list item carries an `id`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::content::ContentTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Home,
    About,
    Accommodations,
    Amenities,
    Activities,
    Reservations,
    RulesFaqs,
    Contact,
}

impl Page {
    pub const ALL: [Page; 8] = [
        Page::Home,
        Page::About,
        Page::Accommodations,
        Page::Amenities,
        Page::Activities,
        Page::Reservations,
        Page::RulesFaqs,
        Page::Contact,
    ];

    /// Identifier used in the `page` column.
    pub fn id(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::About => "about",
            Page::Accommodations => "accommodations",
            Page::Amenities => "amenities",
            Page::Activities => "activities",
            Page::Reservations => "reservations",
            Page::RulesFaqs => "rules-faqs",
            Page::Contact => "contact",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    pub fn path(&self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::About => "/about",
            Page::Accommodations => "/accommodations",
            Page::Amenities => "/amenities",
            Page::Activities => "/activities",
            Page::Reservations => "/reservations",
            Page::RulesFaqs => "/rules-faqs",
            Page::Contact => "/contact",
        }
    }

    pub fn nav_label(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::About => "About",
            Page::Accommodations => "Accommodations",
            Page::Amenities => "Amenities",
            Page::Activities => "Activities",
            Page::Reservations => "Reservations",
            Page::RulesFaqs => "Rules & FAQs",
            Page::Contact => "Contact",
        }
    }

    /// Literal content served when nothing is stored.
    pub fn defaults(&self) -> ContentTree {
        let value = match self {
            Page::Home => home(),
            Page::About => about(),
            Page::Accommodations => accommodations(),
            Page::Amenities => amenities(),
            Page::Activities => activities(),
            Page::Reservations => reservations(),
            Page::RulesFaqs => rules_faqs(),
            Page::Contact => contact(),
        };
        match value {
            Value::Object(map) => map,
            _ => ContentTree::new(),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

fn home() -> Value {
    json!({
        "hero": {
            "title": "Pine Ridge RV Park & Lodge",
            "subtitle": "Full hookups, lakeside cabins and starry nights in the heart of the valley.",
            "image": "/static/images/hero-home.jpg",
            "ctaText": "Book Your Stay",
            "ctaLink": "/reservations"
        },
        "welcome": {
            "heading": "Welcome, Neighbor",
            "body": "Whether you roll in with a forty-foot rig or a backpack, Pine Ridge is a quiet base camp for exploring the river, the trails and the small towns around them."
        },
        "highlights": {
            "heading": "Why Guests Come Back",
            "items": [
                { "id": "hookups", "title": "Full Hookups", "description": "30/50 amp power, water and sewer at every pull-through site." },
                { "id": "lake", "title": "Lake Access", "description": "A short walk to the dock, kayak launch and swimming beach." },
                { "id": "lodge", "title": "The Lodge", "description": "Cozy rooms, a fireplace lounge and fresh coffee every morning." }
            ]
        },
        "callToAction": {
            "heading": "Ready for the Open Road?",
            "body": "Sites fill quickly during the summer season. Reserve early to get your favorite spot.",
            "buttonText": "Check Availability",
            "buttonLink": "/reservations"
        }
    })
}

fn about() -> Value {
    json!({
        "header": {
            "title": "About Us",
            "subtitle": "A family-run park since 1987.",
            "image": "/static/images/hero-about.jpg"
        },
        "story": {
            "heading": "Our Story",
            "body": "What started as a handful of tent pads beside the lake has grown into a full-service RV park and lodge. We are still family-owned, and we still know most of our regulars by name."
        },
        "values": {
            "heading": "What We Care About",
            "items": [
                { "id": "clean", "title": "Clean Facilities", "description": "Restrooms and showers cleaned several times a day." },
                { "id": "quiet", "title": "Peace and Quiet", "description": "Generous site spacing and enforced quiet hours." },
                { "id": "local", "title": "Local Roots", "description": "We partner with nearby outfitters, farms and guides." }
            ]
        }
    })
}

fn accommodations() -> Value {
    json!({
        "header": {
            "title": "Accommodations",
            "subtitle": "From full-hookup RV sites to lodge rooms with a view.",
            "image": "/static/images/hero-accommodations.jpg"
        },
        "accommodations": {
            "accommodations": [
                {
                    "id": "rv-sites",
                    "name": "RV Sites",
                    "description": "Level pull-through and back-in sites with full hookups.",
                    "price": "From $55 / night",
                    "image": "/static/images/rv-sites.jpg",
                    "features": [
                        { "id": "power", "text": "30 and 50 amp service" },
                        { "id": "wifi", "text": "Free Wi-Fi" },
                        { "id": "firepit", "text": "Fire pit and picnic table" }
                    ]
                },
                {
                    "id": "cabins",
                    "name": "Lakeside Cabins",
                    "description": "Rustic one-room cabins a few steps from the water.",
                    "price": "From $95 / night",
                    "image": "/static/images/cabins.jpg",
                    "features": [
                        { "id": "beds", "text": "Sleeps four" },
                        { "id": "porch", "text": "Covered porch" }
                    ]
                },
                {
                    "id": "lodge-rooms",
                    "name": "Lodge Rooms",
                    "description": "Comfortable rooms in the main lodge with private baths.",
                    "price": "From $130 / night",
                    "image": "/static/images/lodge-rooms.jpg",
                    "features": [
                        { "id": "bath", "text": "Private bathroom" },
                        { "id": "breakfast", "text": "Continental breakfast" }
                    ]
                }
            ]
        }
    })
}

fn amenities() -> Value {
    json!({
        "header": {
            "title": "Amenities",
            "subtitle": "Everything you need, nothing you don't.",
            "image": "/static/images/hero-amenities.jpg"
        },
        "amenities": {
            "heading": "On-Site Amenities",
            "items": [
                { "id": "showers", "title": "Hot Showers", "description": "Private, heated shower rooms open around the clock." },
                { "id": "laundry", "title": "Laundry", "description": "Coin-free washers and dryers next to the lodge." },
                { "id": "store", "title": "Camp Store", "description": "Ice, firewood, groceries and fishing licenses." },
                { "id": "dog-park", "title": "Dog Park", "description": "A fenced off-leash area for four-legged guests." }
            ]
        }
    })
}

fn activities() -> Value {
    json!({
        "header": {
            "title": "Activities & Attractions",
            "subtitle": "Adventure starts at your campsite.",
            "image": "/static/images/hero-activities.jpg"
        },
        "onSite": {
            "heading": "At the Park",
            "items": [
                { "id": "kayak", "title": "Kayak Rentals", "description": "Hourly and daily rentals from the dock." },
                { "id": "fishing", "title": "Fishing", "description": "Bass and trout from the shore or the pier." },
                { "id": "campfire", "title": "Campfire Nights", "description": "Saturday s'mores around the big fire ring." }
            ]
        },
        "attractions": {
            "heading": "Nearby Attractions",
            "items": [
                { "id": "falls", "title": "Cedar Falls", "description": "A two-mile hike to a forty-foot waterfall.", "image": "/static/images/falls.jpg", "learnMore": "https://www.example.org/cedar-falls" },
                { "id": "town", "title": "Historic Main Street", "description": "Antiques, diners and a Saturday farmers market.", "image": "/static/images/main-street.jpg" }
            ]
        }
    })
}

fn reservations() -> Value {
    json!({
        "header": {
            "title": "Reservations",
            "subtitle": "Plan your stay.",
            "image": "/static/images/hero-reservations.jpg"
        },
        "booking": {
            "heading": "Book Online or Call Us",
            "body": "Online booking is available year-round. For groups of three or more sites, please call the office.",
            "phone": "(555) 010-2030",
            "email": "stay@pineridge.example",
            "bookingLink": "https://booking.example.com/pine-ridge"
        },
        "policies": {
            "heading": "Reservation Policies",
            "items": [
                { "id": "checkin", "title": "Check-in / Check-out", "description": "Check-in after 2 PM, check-out by 11 AM." },
                { "id": "cancel", "title": "Cancellations", "description": "Full refund up to 7 days before arrival, minus a $10 fee." },
                { "id": "deposit", "title": "Deposit", "description": "One night's fee is due when booking." }
            ]
        }
    })
}

fn rules_faqs() -> Value {
    json!({
        "header": {
            "title": "Park Rules & FAQs",
            "subtitle": "A few guidelines so everyone enjoys their stay."
        },
        "importantNote": {
            "importantNote": "Quiet hours are 10 PM to 7 AM. Please be considerate of your neighbors."
        },
        "parkRules": {
            "categories": [
                {
                    "id": "general",
                    "title": "General",
                    "rules": [
                        { "id": "speed", "text": "Speed limit in the park is 5 MPH." },
                        { "id": "visitors", "text": "Visitors must register at the office." }
                    ]
                },
                {
                    "id": "pets",
                    "title": "Pets",
                    "rules": [
                        { "id": "leash", "text": "Pets must be leashed outside your site." },
                        { "id": "cleanup", "text": "Please clean up after your pet." }
                    ]
                },
                {
                    "id": "fires",
                    "title": "Campfires",
                    "rules": [
                        { "id": "rings", "text": "Fires only in provided fire rings." },
                        { "id": "bans", "text": "Observe posted burn bans." }
                    ]
                }
            ]
        },
        "faqs": {
            "faqs": [
                { "id": "wifi", "question": "Is there Wi-Fi?", "answer": "Yes, free Wi-Fi covers the whole park." },
                { "id": "pets", "question": "Are pets allowed?", "answer": "Yes, up to two pets per site." },
                { "id": "late", "question": "Can I arrive after hours?", "answer": "Call ahead and we will leave your site details at the night drop box." }
            ]
        }
    })
}

fn contact() -> Value {
    json!({
        "header": {
            "title": "Contact Us",
            "subtitle": "We're happy to help plan your trip."
        },
        "details": {
            "address": "1200 Lakeshore Road, Pine Ridge, ST 00000",
            "phone": "(555) 010-2030",
            "email": "stay@pineridge.example",
            "hours": "Office open daily, 8 AM to 8 PM",
            "mapLink": "https://maps.example.com/?q=Pine+Ridge+RV+Park"
        }
    })
}
