use serde::Serialize;

/// A major ILCS topic, e.g. `{ series: "700", name: "RIGHTS AND REMEDIES" }`.
///
/// Topics are only ever produced by the classifier from the fixed list in
/// `sources::ilcs::topics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Topic {
    pub series: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    pub number: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
    pub url: Option<String>,
    pub acts: Vec<Act>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Act {
    pub prefix: String,
    pub title: String,
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtopic: Option<SubtopicRef>,
    pub sections: Vec<Section>,
}

/// Subtopic reference by name only; resolution happens in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtopicRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub header: SectionHeader,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SectionSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionHeader {
    /// `5 ILCS 100/1-5` for a header reading `(5 ILCS 100/1-5)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSource {
    pub raw: String,
    pub public_acts: Vec<String>,
}

/// Which level of the index a raw blob describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Chapter,
    Act,
    Section,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Chapter => "chapter",
            RecordKind::Act => "act",
            RecordKind::Section => "section",
        }
    }
}
