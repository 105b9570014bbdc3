use std::collections::HashMap;

use serde::Serialize;

/// Entity type emitted by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityType {
    Person,
    Location,
    /// Any other tag the classifier emits (e.g. ORGANIZATION), kept by label.
    Other(String),
}

impl EntityType {
    pub fn from_label(label: &str) -> Self {
        match label.to_uppercase().as_str() {
            "PERSON" | "PER" => EntityType::Person,
            "LOCATION" | "LOC" | "GPE" => EntityType::Location,
            other => EntityType::Other(other.to_string()),
        }
    }

    pub fn as_label(&self) -> &str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::Location => "LOCATION",
            EntityType::Other(label) => label,
        }
    }

    /// Span text → count key. Location spans recognized across a line wrap
    /// carry the raw newline; it is folded out of the key. Person keys are
    /// left untouched.
    pub fn normalize(&self, text: &str) -> String {
        match self {
            EntityType::Location => text.replace('\n', ""),
            _ => text.to_string(),
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Per-document entity tally. The person and location tables always exist,
/// possibly empty; other span types are tallied under their label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    pub people: HashMap<String, u32>,
    pub locations: HashMap<String, u32>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub other: HashMap<String, HashMap<String, u32>>,
}

impl EntityCounts {
    pub fn record(&mut self, ty: &EntityType, text: &str) {
        let key = ty.normalize(text);
        let table = match ty {
            EntityType::Person => &mut self.people,
            EntityType::Location => &mut self.locations,
            EntityType::Other(label) => self.other.entry(label.clone()).or_default(),
        };
        *table.entry(key).or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty() && self.locations.is_empty() && self.other.is_empty()
    }
}
