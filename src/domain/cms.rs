//! Landing-page content sections and their stored encoding.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::text_enum;

text_enum! {
    pub enum CmsContentType("content type") {
        HomePage => "HOME_PAGE",
    }
}

text_enum! {
    pub enum SectionKind("section type") {
        Hero => "hero",
        Features => "features",
        Stats => "stats",
        Tournaments => "tournaments",
        News => "news",
        Cta => "cta",
        RichText => "rich_text",
    }
}

pub const LEGACY_SECTION_ID: &str = "legacy-content";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: SectionKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    #[serde(default)]
    pub order: i32,

    #[serde(default)]
    pub content: Value,
}

const fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SectionError {
    #[error("Section id is required")]
    MissingId,

    #[error("Duplicate section id: {0}")]
    DuplicateId(String),
}

/// Rejects sections that could not be addressed individually by the editor.
pub fn validate_sections(sections: &[Section]) -> Result<(), SectionError> {
    let mut seen = std::collections::HashSet::new();
    for section in sections {
        let id = section.id.trim();
        if id.is_empty() {
            return Err(SectionError::MissingId);
        }
        if !seen.insert(id) {
            return Err(SectionError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

/// Result of decoding a stored content column.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSections {
    pub sections: Vec<Section>,
    pub legacy: bool,
}

#[derive(Deserialize)]
struct Envelope {
    sections: Vec<Section>,
}

/// Decodes the stored column. Content that is neither a section list nor a
/// `{"sections": [...]}` object is carried over as one `rich_text` section.
#[must_use]
pub fn decode_sections(raw: &str) -> DecodedSections {
    if let Ok(sections) = serde_json::from_str::<Vec<Section>>(raw) {
        return DecodedSections {
            sections,
            legacy: false,
        };
    }

    if let Ok(envelope) = serde_json::from_str::<Envelope>(raw) {
        return DecodedSections {
            sections: envelope.sections,
            legacy: false,
        };
    }

    DecodedSections {
        sections: vec![Section {
            id: LEGACY_SECTION_ID.to_string(),
            kind: SectionKind::RichText,
            title: None,
            enabled: true,
            order: 0,
            content: json!({ "html": raw }),
        }],
        legacy: true,
    }
}

#[must_use]
pub fn encode_sections(sections: &[Section]) -> String {
    serde_json::to_string(sections).unwrap_or_else(|_| "[]".to_string())
}

/// Enabled sections in display order, as served to visitors.
#[must_use]
pub fn visible_sections(sections: Vec<Section>) -> Vec<Section> {
    let mut visible: Vec<Section> = sections.into_iter().filter(|s| s.enabled).collect();
    visible.sort_by_key(|s| s.order);
    visible
}

/// Built-in landing page served until an administrator saves content.
#[must_use]
pub fn default_home_sections() -> Vec<Section> {
    vec![
        Section {
            id: "hero".to_string(),
            kind: SectionKind::Hero,
            title: Some("Welcome to the Guild Hall".to_string()),
            enabled: true,
            order: 0,
            content: json!({
                "subtitle": "Compete in tournaments, join a clan and climb the rankings.",
                "cta_label": "Join now",
                "cta_link": "/register",
            }),
        },
        Section {
            id: "features".to_string(),
            kind: SectionKind::Features,
            title: Some("What you can do".to_string()),
            enabled: true,
            order: 1,
            content: json!({
                "items": [
                    { "title": "Tournaments", "description": "Register for upcoming brackets." },
                    { "title": "Clans", "description": "Team up and share a tag." },
                    { "title": "Forum", "description": "Discuss strategies and news." },
                ]
            }),
        },
        Section {
            id: "stats".to_string(),
            kind: SectionKind::Stats,
            title: Some("Community".to_string()),
            enabled: true,
            order: 2,
            content: json!({ "show_users": true, "show_clans": true, "show_tournaments": true }),
        },
        Section {
            id: "tournaments".to_string(),
            kind: SectionKind::Tournaments,
            title: Some("Upcoming tournaments".to_string()),
            enabled: true,
            order: 3,
            content: json!({ "limit": 3 }),
        },
        Section {
            id: "news".to_string(),
            kind: SectionKind::News,
            title: Some("Latest news".to_string()),
            enabled: true,
            order: 4,
            content: json!({ "category": "news", "limit": 3 }),
        },
        Section {
            id: "cta".to_string(),
            kind: SectionKind::Cta,
            title: Some("Ready to play?".to_string()),
            enabled: true,
            order: 5,
            content: json!({ "label": "Create an account", "link": "/register" }),
        },
    ]
}
