//! Static Subject/Topic Catalog
//!
//! Fallback suggestions and related-topic lookups when the completion
//! service gives us nothing to work with.

/// Known subjects and representative topics
pub const SUBJECT_TOPICS: &[(&str, &[&str])] = &[
    ("Mathematics", &["Algebra", "Geometry", "Calculus", "Statistics", "Trigonometry"]),
    ("Biology", &["Photosynthesis", "Cell Structure", "Genetics", "Evolution", "Ecology"]),
    ("Chemistry", &["Periodic Table", "Chemical Bonds", "Stoichiometry", "Acids and Bases"]),
    ("Physics", &["Newton's Laws", "Electricity", "Waves", "Thermodynamics"]),
    ("History", &["World War II", "Ancient Rome", "The Renaissance", "Cold War"]),
    ("Geography", &["Plate Tectonics", "Climate Zones", "Rivers and Landforms"]),
    ("English", &["Grammar", "Poetry Analysis", "Essay Writing", "Shakespeare"]),
    ("Computer Science", &["Data Structures", "Algorithms", "Databases", "Networking"]),
];

/// All known subject names
pub fn subjects() -> Vec<&'static str> {
    SUBJECT_TOPICS.iter().map(|(s, _)| *s).collect()
}

/// Topics for a subject (case-insensitive lookup)
pub fn topics_for(subject: &str) -> &'static [&'static str] {
    SUBJECT_TOPICS
        .iter()
        .find(|(s, _)| s.eq_ignore_ascii_case(subject))
        .map_or(&[], |(_, topics)| *topics)
}

/// Up to `cap` topics related to a subject, excluding the current topic
///
/// Exclusion is case-insensitive so "algebra" filters out "Algebra".
pub fn related_topics(subject: &str, exclude: Option<&str>, cap: usize) -> Vec<String> {
    topics_for(subject)
        .iter()
        .filter(|t| {
            exclude.is_none_or(|current| !t.eq_ignore_ascii_case(current.trim()))
        })
        .take(cap)
        .map(|t| (*t).to_string())
        .collect()
}

/// Example "subject: topic, topic" lines for the slot-filling fallback
pub fn example_lines() -> Vec<String> {
    SUBJECT_TOPICS
        .iter()
        .take(4)
        .map(|(subject, topics)| format!("{}: {}", subject, topics[..2.min(topics.len())].join(", ")))
        .collect()
}
