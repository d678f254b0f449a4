use serde::{Deserialize, Serialize};

use super::event::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    #[default]
    All,
    Parties,
    Sports,
    Greek,
    Concerts,
    Other,
}

const PARTY_WORDS: &[&str] = &["party", "afterparty", "bash", "mixer", "kickoff", "bonfire"];
const SPORT_WORDS: &[&str] = &[
    "hockey",
    "basketball",
    "soccer",
    "tennis",
    "softball",
    "lacrosse",
    "swim",
];
const GREEK_WORDS: &[&str] = &["alpha", "beta", "gamma", "delta", "sigma", "kappa", "zeta"];
const CONCERT_WORDS: &[&str] = &["concert", "dj", "music", "band"];

impl EventCategory {
    pub const ALL: [EventCategory; 6] = [
        EventCategory::All,
        EventCategory::Parties,
        EventCategory::Sports,
        EventCategory::Greek,
        EventCategory::Concerts,
        EventCategory::Other,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            EventCategory::All => "All",
            EventCategory::Parties => "Parties",
            EventCategory::Sports => "Sports",
            EventCategory::Greek => "Greek Life",
            EventCategory::Concerts => "Concerts",
            EventCategory::Other => "Other",
        }
    }

    /// Keyword classification over title and description. Never returns `All`.
    pub fn for_event(event: &Event) -> EventCategory {
        let text = format!("{} {}", event.title, event.description).to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|w| text.contains(w));

        if mentions(PARTY_WORDS) {
            EventCategory::Parties
        } else if mentions(SPORT_WORDS) {
            EventCategory::Sports
        } else if mentions(GREEK_WORDS) {
            EventCategory::Greek
        } else if mentions(CONCERT_WORDS) {
            EventCategory::Concerts
        } else {
            EventCategory::Other
        }
    }

    pub fn matches(self, event: &Event) -> bool {
        self == EventCategory::All || EventCategory::for_event(event) == self
    }
}
