use serde::Deserialize;

/// Generic card item used by highlights, amenities, policies and
/// attractions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Feature {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    #[serde(rename = "learnMore")]
    pub learn_more: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Faq {
    pub id: String,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Rule {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuleCategory {
    pub id: String,
    pub title: String,
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FeatureText {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Accommodation {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: Option<String>,
    pub features: Vec<FeatureText>,
}
