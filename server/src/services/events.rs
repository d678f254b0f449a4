use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use super::ports::{EventBackend, Geocoder};
use super::store::ChangeNotifier;
use crate::models::{Coordinate, Event, EventDraft};
use crate::utils::AppError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

impl Address {
    /// "street, city, state" with blank parts left out.
    pub fn query(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.street, &self.city, &self.state]
            .into_iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
    pub address: Option<Address>,
}

/// Validates, geocodes and creates an event, then asks the store to refresh.
///
/// Geocoding is best effort: a failed or empty lookup creates the event
/// without coordinates.
pub async fn create_event(
    backend: &dyn EventBackend,
    geocoder: &dyn Geocoder,
    notifier: &ChangeNotifier,
    request: NewEvent,
) -> Result<Event, AppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::ValidationError("Title is required.".to_string()));
    }

    let coordinate = match request.address.as_ref().and_then(Address::query) {
        Some(query) => locate(geocoder, &query).await,
        None => None,
    };

    let draft = EventDraft {
        title: title.to_string(),
        description: request.description.trim().to_string(),
        date: request.date,
        coordinate,
    };
    let event = backend.create_event(&draft).await?;
    info!(event_id = %event.id, title = %event.title, located = coordinate.is_some(), "Event created");

    notifier.notify();
    Ok(event)
}

async fn locate(geocoder: &dyn Geocoder, query: &str) -> Option<Coordinate> {
    match geocoder.geocode(query).await {
        Ok(Some(coordinate)) if coordinate.is_valid() => Some(coordinate),
        Ok(Some(coordinate)) => {
            warn!(address = %query, ?coordinate, "Geocoder returned an out-of-range coordinate");
            None
        }
        Ok(None) => {
            warn!(address = %query, "Address not found, creating event without location");
            None
        }
        Err(e) => {
            warn!(address = %query, error = %e, "Geocoding failed, creating event without location");
            None
        }
    }
}
