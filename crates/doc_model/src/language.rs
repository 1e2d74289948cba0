use serde::{Deserialize, Serialize};

/// A source language a documentation entity is available in.
///
/// Two languages are equal when both the display name and the identifier
/// match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLanguage {
    pub name: String,
    pub id: String,
}

impl SourceLanguage {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    pub fn swift() -> Self {
        Self::new("Swift", "swift")
    }

    pub fn objective_c() -> Self {
        Self::new("Objective-C", "occ")
    }
}
