use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::geo::Coordinate;

/// A campus event as stored by the hosted backend.
///
/// Counters are maintained server-side and may be absent on freshly created
/// rows; use the accessors, which read an absent counter as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rsvps: Option<i32>,
    pub upvote_count: Option<i32>,
    pub downvote_count: Option<i32>,
}

impl Event {
    pub fn new(title: impl Into<String>, description: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            date,
            latitude: None,
            longitude: None,
            rsvps: None,
            upvote_count: None,
            downvote_count: None,
        }
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        }
    }

    pub fn rsvp_count(&self) -> i64 {
        i64::from(self.rsvps.unwrap_or(0))
    }

    pub fn net_votes(&self) -> i64 {
        i64::from(self.upvote_count.unwrap_or(0)) - i64::from(self.downvote_count.unwrap_or(0))
    }
}

/// Fields the client supplies when creating an event. The backend assigns
/// the identifier and counters.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub coordinate: Option<Coordinate>,
}
