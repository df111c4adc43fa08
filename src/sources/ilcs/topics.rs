use crate::types::Topic;

/// Major ILCS topics in series order. Earlier entries win when a text names
/// more than one topic.
pub const MAJOR_TOPICS: [Topic; 9] = [
    Topic {
        series: "00",
        name: "GOVERNMENT",
    },
    Topic {
        series: "100",
        name: "EDUCATION",
    },
    Topic {
        series: "200",
        name: "REGULATION",
    },
    Topic {
        series: "300",
        name: "HUMAN NEEDS",
    },
    Topic {
        series: "400",
        name: "HEALTH AND SAFETY",
    },
    Topic {
        series: "500",
        name: "AGRICULTURE AND CONSERVATION",
    },
    Topic {
        series: "600",
        name: "TRANSPORTATION",
    },
    Topic {
        series: "700",
        name: "RIGHTS AND REMEDIES",
    },
    Topic {
        series: "800",
        name: "BUSINESS AND EMPLOYMENT",
    },
];

pub fn classify_topic(text: &str) -> Option<Topic> {
    MAJOR_TOPICS
        .iter()
        .find(|topic| text.contains(topic.name))
        .copied()
}
