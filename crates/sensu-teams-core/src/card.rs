//! The legacy Office 365 connector `MessageCard` format accepted by Teams
//! incoming webhooks.

use serde::{Deserialize, Serialize};

const CARD_TYPE: &str = "MessageCard";
const CARD_CONTEXT: &str = "https://schema.org/extensions";

/// A name/value line item in a card section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fact {
    pub name: String,
    pub value: String,
}

impl Fact {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Image shown next to the section, usually the monitoring system's logo.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub activity_image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facts: Vec<Fact>,
}

impl Section {
    pub fn add_fact(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.facts.push(Fact::new(name, value));
    }
}

/// The notification payload posted to the webhook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageCard {
    #[serde(rename = "@type")]
    pub card_type: String,
    #[serde(rename = "@context")]
    pub context: String,
    pub summary: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    pub theme_color: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Default for MessageCard {
    fn default() -> Self {
        Self {
            card_type: CARD_TYPE.to_string(),
            context: CARD_CONTEXT.to_string(),
            summary: String::new(),
            title: String::new(),
            text: String::new(),
            theme_color: String::new(),
            sections: Vec::new(),
        }
    }
}

impl MessageCard {
    /// Facts of all sections, in order.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.sections.iter().flat_map(|s| s.facts.iter())
    }

    /// Value of the first fact called `name`.
    #[must_use]
    pub fn fact(&self, name: &str) -> Option<&str> {
        self.facts()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_in_connector_field_order() {
        let mut section = Section::default();
        section.add_fact("Entity", "entity1");
        let card = MessageCard {
            summary: "s".to_string(),
            title: "t".to_string(),
            theme_color: "#008450".to_string(),
            sections: vec![section],
            ..MessageCard::default()
        };

        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(
            json,
            r##"{"@type":"MessageCard","@context":"https://schema.org/extensions","summary":"s","title":"t","themeColor":"#008450","sections":[{"facts":[{"name":"Entity","value":"entity1"}]}]}"##
        );
    }

    #[test]
    fn text_and_activity_image_are_written_when_set() {
        let card = MessageCard {
            text: "body".to_string(),
            sections: vec![Section {
                activity_image: "https://example.org/logo.png".to_string(),
                facts: vec![],
            }],
            ..MessageCard::default()
        };

        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["text"], "body");
        assert_eq!(
            value["sections"][0]["activityImage"],
            "https://example.org/logo.png"
        );
        assert!(value["sections"][0].get("facts").is_none());
    }
}
