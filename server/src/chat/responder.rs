//! Rule-based answers to chat questions about events.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::models::Event;

const NEXT_TRIGGERS: &[&str] = &["next", "soon", "upcoming"];
const ENTRY_SEPARATOR: &str = "\n\n";

/// What a query is asking for. Triggers are checked in declaration order and
/// the first hit wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Next,
    Today,
    Tomorrow,
    Search,
}

impl Intent {
    pub fn classify(query: &str) -> Intent {
        let lower = query.to_lowercase();
        if NEXT_TRIGGERS.iter().any(|t| lower.contains(t)) {
            Intent::Next
        } else if lower.contains("today") {
            Intent::Today
        } else if lower.contains("tomorrow") {
            Intent::Tomorrow
        } else {
            Intent::Search
        }
    }
}

#[derive(Debug, Clone)]
pub struct Responder {
    tz: Tz,
}

impl Responder {
    /// Calendar days ("today", "tomorrow") are evaluated in `tz`.
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Always returns non-empty text.
    pub fn respond(&self, query: &str, events: &[Event], now: DateTime<Utc>) -> String {
        if events.is_empty() {
            return "No events available right now.".to_string();
        }

        match Intent::classify(query) {
            Intent::Next => match next_event(events, now) {
                Some(event) => format!(
                    "The next event is {} — {}\n📅 {}",
                    event.title,
                    event.description,
                    self.format_date(event.date)
                ),
                None => "No upcoming events found.".to_string(),
            },
            Intent::Today => {
                let today = self.local_day(now);
                self.day_listing(events_on(events, today, self.tz), "No events today.")
            }
            Intent::Tomorrow => {
                let tomorrow = self.local_day(now).succ_opt();
                let matches = tomorrow
                    .map(|day| events_on(events, day, self.tz))
                    .unwrap_or_default();
                self.day_listing(matches, "No events tomorrow.")
            }
            Intent::Search => {
                let matches = search(events, query);
                if matches.is_empty() {
                    return format!(
                        "I couldn't find any events matching '{query}'. Try another word."
                    );
                }
                matches
                    .iter()
                    .map(|e| {
                        format!(
                            "• {}\n   {}\n   📅 {}",
                            e.title,
                            e.description,
                            self.format_date(e.date)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(ENTRY_SEPARATOR)
            }
        }
    }

    pub fn local_day(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    pub fn format_date(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.tz)
            .format("%b %-d, %Y at %-I:%M %p")
            .to_string()
    }

    fn day_listing(&self, matches: Vec<&Event>, empty_message: &str) -> String {
        if matches.is_empty() {
            return empty_message.to_string();
        }
        matches
            .iter()
            .map(|e| format!("• {}\n   {}", e.title, e.description))
            .collect::<Vec<_>>()
            .join(ENTRY_SEPARATOR)
    }
}

/// Earliest event strictly after `now`.
pub fn next_event(events: &[Event], now: DateTime<Utc>) -> Option<&Event> {
    events
        .iter()
        .filter(|e| e.date > now)
        .min_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)))
}

/// Events whose local calendar day in `tz` is `day`, ordered by date then id.
pub fn events_on(events: &[Event], day: NaiveDate, tz: Tz) -> Vec<&Event> {
    let mut matches: Vec<&Event> = events
        .iter()
        .filter(|e| e.date.with_timezone(&tz).date_naive() == day)
        .collect();
    matches.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    matches
}

/// Case-insensitive substring match against title or description, in list order.
pub fn search<'a>(events: &'a [Event], query: &str) -> Vec<&'a Event> {
    let needle = query.to_lowercase();
    events
        .iter()
        .filter(|e| {
            e.title.to_lowercase().contains(&needle)
                || e.description.to_lowercase().contains(&needle)
        })
        .collect()
}
