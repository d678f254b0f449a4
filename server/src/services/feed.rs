use std::cmp::Reverse;

use crate::models::{Event, EventCategory};

pub const TRENDING_LIMIT: usize = 6;

/// Events in `category`, date ascending.
pub fn filter_by_category(events: &[Event], category: EventCategory) -> Vec<Event> {
    let mut matches: Vec<Event> = events
        .iter()
        .filter(|e| category.matches(e))
        .cloned()
        .collect();
    matches.sort_by_key(|e| e.date);
    matches
}

/// Most-attended events first, newer first on equal RSVPs. Falls back to the
/// whole list when the category has no events.
pub fn trending(events: &[Event], category: EventCategory, limit: usize) -> Vec<Event> {
    let mut base = filter_by_category(events, category);
    if base.is_empty() {
        base = events.to_vec();
    }
    base.sort_by_key(|e| (Reverse(e.rsvp_count()), Reverse(e.date)));
    base.truncate(limit);
    base
}

/// Case-insensitive title match; a blank query returns everything.
pub fn search_titles(events: &[Event], query: &str) -> Vec<Event> {
    let query = query.trim();
    if query.is_empty() {
        return events.to_vec();
    }
    let needle = query.to_lowercase();
    events
        .iter()
        .filter(|e| e.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
